//! Compile-time terminal geometry and refresh tuning.
//!
//! Everything here is fixed at build time: the target is a single
//! hardware configuration (800x480 1-bit e-ink panel driven over SPI),
//! so there is no runtime configuration layer.

/// Panel width in pixels (native landscape).
pub const DISPLAY_W: usize = 800;
/// Panel height in pixels.
pub const DISPLAY_H: usize = 480;

/// Font cell width in pixels.
pub const FONT_W: usize = 10;
/// Font cell height in pixels.
pub const FONT_H: usize = 20;

/// Horizontal margin to avoid bezel clipping.
pub const OFFSET_X: usize = 10;

/// Terminal columns (with margin: 10 + 78*10 = 790, leaving 10px right margin).
pub const COLS: usize = (DISPLAY_W - OFFSET_X * 2) / FONT_W;
/// Terminal rows.
pub const ROWS: usize = DISPLAY_H / FONT_H;

/// Tab stops every this many columns.
pub const TAB_WIDTH: usize = 8;

/// Use a windowed partial update for at most this many dirty rows.
pub const DIRTY_ROWS_PARTIAL_MAX: u32 = 5;
/// Full refresh (ghost clearing) every N fast refreshes.
pub const FULL_REFRESH_INTERVAL: u32 = 20;
/// Minimum milliseconds between display refreshes.
pub const MIN_REFRESH_INTERVAL_MS: u64 = 300;

/// Framebuffer bytes per pixel row (1 bit per pixel, MSB first).
pub const FB_STRIDE: usize = DISPLAY_W / 8;
/// Total framebuffer size in bytes.
pub const FB_SIZE: usize = FB_STRIDE * DISPLAY_H;

/// Glyph bitmap bytes per pixel row.
pub const GLYPH_BYTES_PER_ROW: usize = (FONT_W + 7) / 8;
/// Total glyph bitmap size in bytes.
pub const GLYPH_BYTES: usize = GLYPH_BYTES_PER_ROW * FONT_H;
