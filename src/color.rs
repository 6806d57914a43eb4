//! Palette-to-luminance mapping
//!
//! The panel is 1-bit, so colors survive only as background shades.
//! Every color source (ANSI 16, 256-color palette, direct RGB) collapses
//! to an 8-bit luminance that the renderer dithers at blit time.

/// Approximate luminance (0-255) for the standard 16-color ANSI palette.
///
/// Taken unchanged from the firmware this display profile was tuned on;
/// indices 8 and 9 are both 128 and render identically.
pub const ANSI_LUMINANCE: [u8; 16] = [
    0,   // 0: black
    76,  // 1: red
    149, // 2: green
    226, // 3: yellow
    29,  // 4: blue
    105, // 5: magenta
    178, // 6: cyan
    200, // 7: white (light gray)
    128, // 8: bright black (dark gray)
    128, // 9: bright red
    192, // 10: bright green
    255, // 11: bright yellow
    80,  // 12: bright blue
    160, // 13: bright magenta
    224, // 14: bright cyan
    255, // 15: bright white
];

/// Luminance of an RGB color, integer-weighted (77R + 150G + 29B) / 256
pub fn luminance_rgb(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 77 + g as u32 * 150 + b as u32 * 29) >> 8) as u8
}

/// Luminance for a 256-color palette index
pub fn luminance_256(index: u8) -> u8 {
    match index {
        // Standard 16 colors
        0..=15 => ANSI_LUMINANCE[index as usize],
        // 216-color cube (6x6x6)
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx / 6) % 6;
            let b = idx % 6;
            // Map 0-5 to 0, 95, 135, 175, 215, 255
            let to_val = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            luminance_rgb(to_val(r), to_val(g), to_val(b))
        }
        // Grayscale ramp (24 levels)
        232..=255 => 8 + (index - 232) * 10,
    }
}
