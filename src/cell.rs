//! Terminal cell representation
//!
//! Each cell in the grid holds a BMP codepoint, its attribute flags, and
//! a background brightness. On a 1-bit panel there are no foreground
//! colors; background shades are kept as an 8-bit luminance that the
//! renderer dithers down at blit time.

use bitflags::bitflags;

bitflags! {
    /// Cell attribute flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellFlags: u8 {
        const BOLD      = 0b0000_0001;
        const INVERSE   = 0b0000_0010;
        const UNDERLINE = 0b0000_0100;
    }
}

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// BMP codepoint (codepoints above U+FFFF are truncated by the parser)
    pub codepoint: u16,
    /// Attribute flags
    pub attrs: CellFlags,
    /// Background brightness: 0 = black, 255 = white
    pub bg_bright: u8,
}

impl Cell {
    /// A blank cell: space on a white background, no attributes.
    pub const BLANK: Self = Self {
        codepoint: b' ' as u16,
        attrs: CellFlags::empty(),
        bg_bright: 255,
    };

    /// Create a cell with the given codepoint and current attributes
    pub const fn new(codepoint: u16, attrs: CellFlags, bg_bright: u8) -> Self {
        Self {
            codepoint,
            attrs,
            bg_bright,
        }
    }

    /// Reset to the blank cell
    pub fn clear(&mut self) {
        *self = Self::BLANK;
    }

    /// Effective background brightness (handles reverse video)
    pub fn effective_bg(&self) -> u8 {
        if self.attrs.contains(CellFlags::INVERSE) {
            255 - self.bg_bright
        } else {
            self.bg_bright
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}
