//! Terminal state - cursor, attributes, scroll region
//!
//! Tracks everything that affects where and how the next character
//! lands. Movement is clamped so the cursor can never leave the grid,
//! and every movement clears the deferred-wrap flag.

use crate::cell::CellFlags;
use crate::config::{COLS, ROWS, TAB_WIDTH};

/// Terminal state
pub struct TermState {
    /// Cursor row, always `< ROWS`
    pub row: usize,
    /// Cursor column, always `< COLS`
    pub col: usize,

    /// Attributes applied to newly written cells
    pub attrs: CellFlags,
    /// Background brightness applied to newly written cells
    pub bg_bright: u8,

    /// Scroll region, inclusive rows
    pub scroll_top: usize,
    pub scroll_bottom: usize,

    /// Deferred wrap: a character was just written at the last column;
    /// the wrap happens when the next character arrives
    pub wrap_pending: bool,

    // Save slot shared by DECSC/DECRC and CSI s/u
    saved_row: usize,
    saved_col: usize,

    // Cursor saved when entering the alternate screen
    alt_saved_row: usize,
    alt_saved_col: usize,
}

impl TermState {
    pub const fn new() -> Self {
        Self {
            row: 0,
            col: 0,
            attrs: CellFlags::empty(),
            bg_bright: 255,
            scroll_top: 0,
            scroll_bottom: ROWS - 1,
            wrap_pending: false,
            saved_row: 0,
            saved_col: 0,
            alt_saved_row: 0,
            alt_saved_col: 0,
        }
    }

    // === Cursor movement ===

    /// Place the cursor, clamping to the grid
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        self.row = row.min(ROWS - 1);
        self.col = col.min(COLS - 1);
        self.wrap_pending = false;
    }

    pub fn cursor_up(&mut self, n: usize) {
        self.row = self.row.saturating_sub(n);
        self.wrap_pending = false;
    }

    pub fn cursor_down(&mut self, n: usize) {
        self.row = (self.row + n).min(ROWS - 1);
        self.wrap_pending = false;
    }

    pub fn cursor_forward(&mut self, n: usize) {
        self.col = (self.col + n).min(COLS - 1);
        self.wrap_pending = false;
    }

    pub fn cursor_back(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
        self.wrap_pending = false;
    }

    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.wrap_pending = false;
    }

    /// Advance to the next tab stop (fixed stops every TAB_WIDTH columns)
    pub fn tab(&mut self) {
        self.col = (((self.col / TAB_WIDTH) + 1) * TAB_WIDTH).min(COLS - 1);
        self.wrap_pending = false;
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        }
        self.wrap_pending = false;
    }

    // === Save/restore ===

    /// Save (row, col) into the shared slot
    pub fn save_cursor(&mut self) {
        self.saved_row = self.row;
        self.saved_col = self.col;
    }

    /// Restore from the shared slot, clamped; drops any pending wrap
    pub fn restore_cursor(&mut self) {
        self.row = self.saved_row.min(ROWS - 1);
        self.col = self.saved_col.min(COLS - 1);
        self.wrap_pending = false;
    }

    /// Save the cursor on entry to the alternate screen
    pub fn save_alt_cursor(&mut self) {
        self.alt_saved_row = self.row;
        self.alt_saved_col = self.col;
    }

    /// Restore the cursor saved at alternate-screen entry
    pub fn restore_alt_cursor(&mut self) {
        self.row = self.alt_saved_row.min(ROWS - 1);
        self.col = self.alt_saved_col.min(COLS - 1);
    }

    // === Scroll region ===

    /// Set the scroll region; a degenerate range is ignored.
    /// Returns true (with the cursor homed) when accepted.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) -> bool {
        let bottom = bottom.min(ROWS - 1);
        if top >= bottom {
            return false;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        self.row = 0;
        self.col = 0;
        self.wrap_pending = false;
        true
    }

    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = ROWS - 1;
    }

    // === Attributes ===

    pub fn set_attr(&mut self, attr: CellFlags) {
        self.attrs |= attr;
    }

    pub fn clear_attr(&mut self, attr: CellFlags) {
        self.attrs &= !attr;
    }

    pub fn reset_attrs(&mut self) {
        self.attrs = CellFlags::empty();
        self.bg_bright = 255;
    }
}

impl Default for TermState {
    fn default() -> Self {
        Self::new()
    }
}
