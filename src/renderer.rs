//! Renderer - blits the screen buffer onto the 1-bit framebuffer
//!
//! Background shades are approximated with 4x4 ordered dithering, and
//! glyphs flip to white on dark backgrounds. Refresh selection is the
//! e-ink latency/ghosting tradeoff: a windowed partial update when few
//! rows changed, a fast full-frame update when many did, and a slow
//! full refresh every `FULL_REFRESH_INTERVAL` fast ones to clear the
//! ghosting those leave behind.

use log::debug;

use crate::config::{
    COLS, DIRTY_ROWS_PARTIAL_MAX, DISPLAY_H, DISPLAY_W, FB_STRIDE, FONT_H, FONT_W,
    FULL_REFRESH_INTERVAL, GLYPH_BYTES_PER_ROW, OFFSET_X, ROWS,
};
use crate::display::{EinkDisplay, RefreshMode};
use crate::font::Font;
use crate::screen::Screen;

/// 4x4 Bayer dithering matrix (threshold values 0-15)
#[rustfmt::skip]
const BAYER_4X4: [[u8; 4]; 4] = [
    [ 0,  8,  2, 10],
    [12,  4, 14,  6],
    [ 3, 11,  1,  9],
    [15,  7, 13,  5],
];

/// Renderer with refresh-policy state
pub struct Renderer {
    /// Fast refreshes since the last ghost-clearing full refresh
    fast_refresh_count: u32,
    /// Cursor position at the previous render, so the stale cursor
    /// block gets overdrawn
    last_cursor: Option<(usize, usize)>,
    cursor_visible: bool,
}

impl Renderer {
    pub const fn new() -> Self {
        Self {
            fast_refresh_count: 0,
            last_cursor: None,
            cursor_visible: true,
        }
    }

    /// Cursor visibility (propagated from the terminal's DECTCEM state)
    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    /// Render all dirty rows and refresh the panel
    pub fn render_dirty<D: EinkDisplay, F: Font>(
        &mut self,
        display: &mut D,
        font: &F,
        screen: &mut Screen,
    ) {
        let mut dirty = screen.dirty_rows();

        // Always include the previous cursor row so the old cursor
        // block gets erased
        if let Some((last_row, _)) = self.last_cursor {
            dirty |= 1 << last_row;
        }
        if dirty == 0 {
            return;
        }

        let dirty_count = dirty.count_ones();

        {
            let fb = display.framebuffer();
            for row in 0..ROWS {
                if dirty & (1 << row) != 0 {
                    self.render_row(fb, font, screen, row);
                }
            }
            self.render_cursor(fb, font, screen);
        }

        if dirty_count > DIRTY_ROWS_PARTIAL_MAX {
            // Many rows changed: full-frame fast refresh
            debug!("fast refresh, {} dirty rows", dirty_count);
            display.display_buffer(RefreshMode::Fast);
        } else {
            // Few rows changed: windowed partial update spanning the
            // dirty rows plus both cursor positions
            let mut min_row = dirty.trailing_zeros() as usize;
            let mut max_row = (31 - dirty.leading_zeros()) as usize;

            let (cursor_row, _) = screen.cursor();
            min_row = min_row.min(cursor_row);
            max_row = max_row.max(cursor_row);
            if let Some((last_row, _)) = self.last_cursor {
                min_row = min_row.min(last_row);
                max_row = max_row.max(last_row);
            }

            display.display_window(
                0,
                (min_row * FONT_H) as u32,
                DISPLAY_W as u32,
                ((max_row - min_row + 1) * FONT_H) as u32,
            );
        }
        self.fast_refresh_count += 1;

        // Periodic full refresh to clear ghosting
        if self.fast_refresh_count >= FULL_REFRESH_INTERVAL {
            debug!("ghost-clearing full refresh");
            display.display_buffer(RefreshMode::Full);
            self.fast_refresh_count = 0;
        }

        self.last_cursor = Some(screen.cursor());
        screen.clear_dirty();
    }

    /// Force a full-screen render and full refresh
    pub fn render_full<D: EinkDisplay, F: Font>(
        &mut self,
        display: &mut D,
        font: &F,
        screen: &mut Screen,
    ) {
        screen.mark_all_dirty();
        {
            let fb = display.framebuffer();
            for row in 0..ROWS {
                self.render_row(fb, font, screen, row);
            }
            self.render_cursor(fb, font, screen);
        }
        display.display_buffer(RefreshMode::Full);
        self.fast_refresh_count = 0;
        self.last_cursor = Some(screen.cursor());
        screen.clear_dirty();
    }

    /// Blit one row of cells
    fn render_row<F: Font>(&self, fb: &mut [u8], font: &F, screen: &Screen, row: usize) {
        for col in 0..COLS {
            let cell = screen.cell(row, col);
            let glyph = font.glyph(cell.codepoint);

            let bg_bright = cell.effective_bg();
            // Flip the glyph on dark backgrounds for readability
            let invert_glyph = bg_bright < 128;

            Self::blit_glyph(
                fb,
                OFFSET_X + col * FONT_W,
                row * FONT_H,
                glyph,
                bg_bright,
                invert_glyph,
            );
        }
    }

    /// Draw the cursor as an inverted block at its current position
    fn render_cursor<F: Font>(&self, fb: &mut [u8], font: &F, screen: &Screen) {
        if !self.cursor_visible {
            return;
        }

        let (row, col) = screen.cursor();
        let cell = screen.cell(row, col);
        let glyph = font.glyph(cell.codepoint);

        // Invert the cell's effective background
        let bg_bright = 255 - cell.effective_bg();
        let invert_glyph = bg_bright < 128;

        Self::blit_glyph(
            fb,
            OFFSET_X + col * FONT_W,
            row * FONT_H,
            glyph,
            bg_bright,
            invert_glyph,
        );
    }

    /// Blit a glyph at a pixel origin. Foreground pixels follow the
    /// glyph inversion; background pixels are Bayer-dithered from the
    /// background brightness.
    fn blit_glyph(
        fb: &mut [u8],
        px: usize,
        py: usize,
        glyph: &[u8],
        bg_bright: u8,
        invert_glyph: bool,
    ) {
        for gy in 0..FONT_H {
            let fb_y = py + gy;
            if fb_y >= DISPLAY_H {
                break;
            }
            for gx in 0..FONT_W {
                let fb_x = px + gx;
                if fb_x >= DISPLAY_W {
                    break;
                }

                // Glyph bit, MSB-first
                let glyph_byte = glyph[gy * GLYPH_BYTES_PER_ROW + gx / 8];
                let is_glyph_pixel = (glyph_byte >> (7 - (gx % 8))) & 1 != 0;

                let draw_black = if is_glyph_pixel {
                    // Foreground: black normally, white on dark backgrounds
                    !invert_glyph
                } else {
                    // Background: dithered. bg 255 -> all white, 0 -> all black
                    let threshold = BAYER_4X4[gy & 3][gx & 3];
                    let level = ((bg_bright as u16 * 17) >> 8) as u8;
                    level <= threshold
                };

                // Framebuffer bit: 1 = white, 0 = black, MSB-first
                let idx = fb_y * FB_STRIDE + fb_x / 8;
                let mask = 1u8 << (7 - (fb_x % 8));
                if draw_black {
                    fb[idx] &= !mask;
                } else {
                    fb[idx] |= mask;
                }
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellFlags;
    use crate::config::{COLS, FB_SIZE};
    use crate::font::FALLBACK_GLYPH;
    use std::vec;
    use std::vec::Vec;

    const SOLID_GLYPH: [u8; crate::config::GLYPH_BYTES] = [0xFF; crate::config::GLYPH_BYTES];
    const BLANK_GLYPH: [u8; crate::config::GLYPH_BYTES] = [0x00; crate::config::GLYPH_BYTES];

    /// Blank glyph for spaces, solid for '#', fallback otherwise
    struct TestFont;

    impl Font for TestFont {
        fn glyph(&self, codepoint: u16) -> &[u8] {
            match codepoint {
                cp if cp == b' ' as u16 => &BLANK_GLYPH,
                cp if cp == b'#' as u16 => &SOLID_GLYPH,
                _ => &FALLBACK_GLYPH,
            }
        }
    }

    struct TestDisplay {
        fb: Vec<u8>,
        buffer_calls: Vec<RefreshMode>,
        window_calls: Vec<(u32, u32, u32, u32)>,
    }

    impl TestDisplay {
        fn new() -> Self {
            Self {
                fb: vec![0; FB_SIZE],
                buffer_calls: Vec::new(),
                window_calls: Vec::new(),
            }
        }

        /// True when the pixel is white
        fn pixel(&self, x: usize, y: usize) -> bool {
            self.fb[y * FB_STRIDE + x / 8] & (1 << (7 - (x % 8))) != 0
        }

        /// Count white pixels within one character cell
        fn white_in_cell(&self, row: usize, col: usize) -> usize {
            let px = OFFSET_X + col * FONT_W;
            let py = row * FONT_H;
            let mut count = 0;
            for gy in 0..FONT_H {
                for gx in 0..FONT_W {
                    if self.pixel(px + gx, py + gy) {
                        count += 1;
                    }
                }
            }
            count
        }
    }

    impl EinkDisplay for TestDisplay {
        fn framebuffer(&mut self) -> &mut [u8] {
            &mut self.fb
        }

        fn display_buffer(&mut self, mode: RefreshMode) {
            self.buffer_calls.push(mode);
        }

        fn display_window(&mut self, x: u32, y: u32, w: u32, h: u32) {
            self.window_calls.push((x, y, w, h));
        }

        fn deep_sleep(&mut self) {}
    }

    const CELL_PIXELS: usize = FONT_W * FONT_H;

    fn rendered(screen: &mut Screen) -> TestDisplay {
        let mut display = TestDisplay::new();
        let mut renderer = Renderer::new();
        renderer.set_cursor_visible(false);
        renderer.render_full(&mut display, &TestFont, screen);
        display
    }

    #[test]
    fn test_white_background_all_white() {
        let mut screen = Screen::new();
        let display = rendered(&mut screen);
        assert_eq!(display.white_in_cell(3, 3), CELL_PIXELS);
    }

    #[test]
    fn test_black_background_all_black() {
        let mut screen = Screen::new();
        screen.set_cursor(3, 3);
        screen.set_bg_bright(0);
        screen.put_char(b' ' as u16);
        let display = rendered(&mut screen);
        assert_eq!(display.white_in_cell(3, 3), 0);
    }

    #[test]
    fn test_mid_gray_dithers() {
        let mut screen = Screen::new();
        screen.set_cursor(3, 3);
        screen.set_bg_bright(128);
        screen.put_char(b' ' as u16);
        let display = rendered(&mut screen);
        let white = display.white_in_cell(3, 3);
        assert!(white > 0 && white < CELL_PIXELS, "white = {}", white);
        // Level 8 against the 4x4 matrix blacks out exactly half
        assert_eq!(white, CELL_PIXELS / 2);
    }

    #[test]
    fn test_glyph_draws_black_on_white() {
        let mut screen = Screen::new();
        screen.set_cursor(2, 5);
        screen.put_char(b'#' as u16);
        let display = rendered(&mut screen);
        assert_eq!(display.white_in_cell(2, 5), 0);
    }

    #[test]
    fn test_inverse_flips_solid_glyph_to_white() {
        let mut screen = Screen::new();
        screen.set_cursor(2, 5);
        screen.set_attr(CellFlags::INVERSE);
        screen.put_char(b'#' as u16);
        let display = rendered(&mut screen);
        // Effective bg is black, so the solid glyph renders white
        assert_eq!(display.white_in_cell(2, 5), CELL_PIXELS);
    }

    #[test]
    fn test_cursor_draws_inverted_block() {
        let mut screen = Screen::new();
        screen.set_cursor(4, 7);
        let mut display = TestDisplay::new();
        let mut renderer = Renderer::new();
        renderer.render_full(&mut display, &TestFont, &mut screen);
        // Blank cell, white bg: the cursor block flips it to black
        assert_eq!(display.white_in_cell(4, 7), 0);
        // Neighbor stays white
        assert_eq!(display.white_in_cell(4, 8), CELL_PIXELS);
    }

    #[test]
    fn test_hidden_cursor_not_drawn() {
        let mut screen = Screen::new();
        screen.set_cursor(4, 7);
        let mut display = TestDisplay::new();
        let mut renderer = Renderer::new();
        renderer.set_cursor_visible(false);
        renderer.render_full(&mut display, &TestFont, &mut screen);
        assert_eq!(display.white_in_cell(4, 7), CELL_PIXELS);
    }

    #[test]
    fn test_partial_window_covers_dirty_and_cursor() {
        let mut screen = Screen::new();
        let mut display = TestDisplay::new();
        let mut renderer = Renderer::new();
        // Settle the initial all-dirty state
        renderer.render_full(&mut display, &TestFont, &mut screen);
        display.window_calls.clear();
        display.buffer_calls.clear();

        screen.set_cursor(6, 0);
        screen.put_char(b'x' as u16);
        renderer.render_dirty(&mut display, &TestFont, &mut screen);

        assert_eq!(display.buffer_calls.len(), 0);
        assert_eq!(display.window_calls.len(), 1);
        let (x, y, w, h) = display.window_calls[0];
        assert_eq!(x, 0);
        assert_eq!(w, DISPLAY_W as u32);
        // Rows 0 (stale cursor from render_full) through 6
        assert_eq!(y, 0);
        assert_eq!(h, (7 * FONT_H) as u32);
    }

    #[test]
    fn test_many_dirty_rows_use_fast_refresh() {
        let mut screen = Screen::new();
        let mut display = TestDisplay::new();
        let mut renderer = Renderer::new();
        renderer.render_full(&mut display, &TestFont, &mut screen);
        display.buffer_calls.clear();
        display.window_calls.clear();

        for row in 0..8 {
            screen.set_cursor(row, 0);
            screen.put_char(b'y' as u16);
        }
        renderer.render_dirty(&mut display, &TestFont, &mut screen);

        assert_eq!(display.window_calls.len(), 0);
        assert_eq!(display.buffer_calls, [RefreshMode::Fast]);
    }

    #[test]
    fn test_nothing_dirty_nothing_refreshed() {
        let mut screen = Screen::new();
        screen.clear_dirty();
        let mut display = TestDisplay::new();
        let mut renderer = Renderer::new();
        renderer.render_dirty(&mut display, &TestFont, &mut screen);
        assert!(display.buffer_calls.is_empty());
        assert!(display.window_calls.is_empty());
    }

    #[test]
    fn test_stale_cursor_row_rerendered() {
        let mut screen = Screen::new();
        let mut display = TestDisplay::new();
        let mut renderer = Renderer::new();
        screen.set_cursor(2, 2);
        renderer.render_full(&mut display, &TestFont, &mut screen);
        assert_eq!(display.white_in_cell(2, 2), 0);

        // Cursor moves without any cell mutation; the old block must go
        screen.set_cursor(9, 0);
        renderer.render_dirty(&mut display, &TestFont, &mut screen);
        assert_eq!(display.white_in_cell(2, 2), CELL_PIXELS);
        assert_eq!(display.white_in_cell(9, 0), 0);

        let (_, y, _, h) = *display.window_calls.last().unwrap();
        assert_eq!(y, (2 * FONT_H) as u32);
        assert_eq!(h, (8 * FONT_H) as u32);
    }

    #[test]
    fn test_periodic_full_refresh() {
        let mut screen = Screen::new();
        let mut display = TestDisplay::new();
        let mut renderer = Renderer::new();
        renderer.render_full(&mut display, &TestFont, &mut screen);
        display.buffer_calls.clear();

        for i in 0..FULL_REFRESH_INTERVAL {
            screen.set_cursor((i as usize) % ROWS, 0);
            screen.put_char(b'z' as u16);
            renderer.render_dirty(&mut display, &TestFont, &mut screen);
        }
        assert_eq!(
            display
                .buffer_calls
                .iter()
                .filter(|m| **m == RefreshMode::Full)
                .count(),
            1
        );
        assert_eq!(display.buffer_calls.last(), Some(&RefreshMode::Full));
    }

    #[test]
    fn test_render_full_resets_fast_counter() {
        let mut screen = Screen::new();
        let mut display = TestDisplay::new();
        let mut renderer = Renderer::new();

        for i in 0..FULL_REFRESH_INTERVAL - 1 {
            screen.set_cursor((i as usize) % ROWS, 0);
            screen.put_char(b'z' as u16);
            renderer.render_dirty(&mut display, &TestFont, &mut screen);
        }
        renderer.render_full(&mut display, &TestFont, &mut screen);
        display.buffer_calls.clear();

        // The counter restarted: the next render stays fast/windowed
        screen.set_cursor(0, 0);
        screen.put_char(b'q' as u16);
        renderer.render_dirty(&mut display, &TestFont, &mut screen);
        assert!(!display.buffer_calls.contains(&RefreshMode::Full));
    }

    #[test]
    fn test_rightmost_column_inside_framebuffer() {
        let mut screen = Screen::new();
        screen.set_cursor(0, COLS - 1);
        screen.set_bg_bright(0);
        screen.put_char(b' ' as u16);
        let display = rendered(&mut screen);
        assert_eq!(display.white_in_cell(0, COLS - 1), 0);
        // The margin right of the last cell is untouched (still black
        // from the zeroed test framebuffer, never written white)
        let margin_x = OFFSET_X + COLS * FONT_W;
        assert!(!display.pixel(margin_x, 0));
    }
}
