/*!
The 2C02 master palette: 64 fixed colours addressed by the bytes stored
in palette RAM.
*/

/// One output pixel colour.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[rustfmt::skip]
pub const MASTER_PALETTE: [Rgb; 64] = [
    Rgb::new( 84,  84,  84), Rgb::new(  0,  30, 116), Rgb::new(  8,  16, 144), Rgb::new( 48,   0, 136),
    Rgb::new( 68,   0, 100), Rgb::new( 92,   0,  48), Rgb::new( 84,   4,   0), Rgb::new( 60,  24,   0),
    Rgb::new( 32,  42,   0), Rgb::new(  8,  58,   0), Rgb::new(  0,  64,   0), Rgb::new(  0,  60,   0),
    Rgb::new(  0,  50,  60), Rgb::new(  0,   0,   0), Rgb::new(  0,   0,   0), Rgb::new(  0,   0,   0),

    Rgb::new(152, 150, 152), Rgb::new(  8,  76, 196), Rgb::new( 48,  50, 236), Rgb::new( 92,  30, 228),
    Rgb::new(136,  20, 176), Rgb::new(160,  20, 100), Rgb::new(152,  34,  32), Rgb::new(120,  60,   0),
    Rgb::new( 84,  90,   0), Rgb::new( 40, 114,   0), Rgb::new(  8, 124,   0), Rgb::new(  0, 118,  40),
    Rgb::new(  0, 102, 120), Rgb::new(  0,   0,   0), Rgb::new(  0,   0,   0), Rgb::new(  0,   0,   0),

    Rgb::new(236, 238, 236), Rgb::new( 76, 154, 236), Rgb::new(120, 124, 236), Rgb::new(176,  98, 236),
    Rgb::new(228,  84, 236), Rgb::new(236,  88, 180), Rgb::new(236, 106, 100), Rgb::new(212, 136,  32),
    Rgb::new(160, 170,   0), Rgb::new(116, 196,   0), Rgb::new( 76, 208,  32), Rgb::new( 56, 204, 108),
    Rgb::new( 56, 180, 204), Rgb::new( 60,  60,  60), Rgb::new(  0,   0,   0), Rgb::new(  0,   0,   0),

    Rgb::new(236, 238, 236), Rgb::new(168, 204, 236), Rgb::new(188, 188, 236), Rgb::new(212, 178, 236),
    Rgb::new(236, 174, 236), Rgb::new(236, 174, 212), Rgb::new(236, 180, 176), Rgb::new(228, 196, 144),
    Rgb::new(204, 210, 120), Rgb::new(180, 222, 120), Rgb::new(168, 226, 144), Rgb::new(152, 226, 180),
    Rgb::new(160, 214, 228), Rgb::new(160, 162, 160), Rgb::new(  0,   0,   0), Rgb::new(  0,   0,   0),
];
