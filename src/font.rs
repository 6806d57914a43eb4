//! Glyph lookup
//!
//! Font data lives outside the core (it is generated into the firmware
//! image); the renderer only needs a bitmap per codepoint. Glyph bitmaps
//! are `FONT_H` rows of `GLYPH_BYTES_PER_ROW` bytes, MSB-first within
//! each byte.

use crate::config::GLYPH_BYTES;

/// Glyph source consumed by the renderer.
pub trait Font {
    /// Bitmap for a codepoint, `GLYPH_BYTES` long. Implementations
    /// return a fallback glyph for codepoints they do not cover.
    fn glyph(&self, codepoint: u16) -> &[u8];
}

/// Hollow-box glyph for codepoints a font does not cover (10x20).
#[rustfmt::skip]
pub const FALLBACK_GLYPH: [u8; GLYPH_BYTES] = [
    0x00, 0x00,
    0xFF, 0xC0,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0x80, 0x40,
    0xFF, 0xC0,
    0x00, 0x00,
];
