//! Screen buffer - grid, cursor, and alternate screen combined
//!
//! This is the mutation surface the escape-sequence dispatcher drives.
//! Every operation keeps the cursor inside the grid and marks the rows
//! it touches dirty. Writing uses the deferred-wrap discipline: a
//! character placed in the last column does not wrap the cursor until
//! the next character arrives, so line-ending control sequences still
//! act on the row they were aimed at.

use crate::cell::{Cell, CellFlags};
use crate::config::{COLS, ROWS};
use crate::grid::{CellArray, Grid};
use crate::state::TermState;

/// Screen buffer: active grid plus cursor/attribute state and the
/// alternate-screen backing store.
pub struct Screen {
    grid: Grid,
    state: TermState,
    /// Backing store for whichever screen is not active
    backing: CellArray,
    alt_active: bool,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            grid: Grid::new(),
            state: TermState::new(),
            backing: [[Cell::BLANK; COLS]; ROWS],
            alt_active: false,
        }
    }

    // === Writing ===

    /// Write a codepoint at the cursor and advance, wrapping/scrolling
    /// as needed
    pub fn put_char(&mut self, codepoint: u16) {
        if self.state.wrap_pending {
            self.state.wrap_pending = false;
            self.state.col = 0;
            self.line_feed();
        }
        self.grid.set(
            self.state.row,
            self.state.col,
            Cell::new(codepoint, self.state.attrs, self.state.bg_bright),
        );
        self.state.col += 1;
        if self.state.col >= COLS {
            self.state.col = COLS - 1;
            self.state.wrap_pending = true;
        }
    }

    // === Cursor ===

    pub fn set_cursor(&mut self, row: usize, col: usize) {
        self.state.set_cursor(row, col);
    }

    pub fn cursor_up(&mut self, n: usize) {
        self.state.cursor_up(n);
    }

    pub fn cursor_down(&mut self, n: usize) {
        self.state.cursor_down(n);
    }

    pub fn cursor_forward(&mut self, n: usize) {
        self.state.cursor_forward(n);
    }

    pub fn cursor_back(&mut self, n: usize) {
        self.state.cursor_back(n);
    }

    pub fn carriage_return(&mut self) {
        self.state.carriage_return();
    }

    pub fn tab(&mut self) {
        self.state.tab();
    }

    pub fn backspace(&mut self) {
        self.state.backspace();
    }

    /// Move down one row; at the scroll-region bottom the region scrolls
    /// up instead. The column is left alone (CR is a separate operation).
    pub fn line_feed(&mut self) {
        if self.state.row == self.state.scroll_bottom {
            self.grid.scroll_region_up(self.state.scroll_top, self.state.scroll_bottom, 1);
        } else if self.state.row < ROWS - 1 {
            self.state.row += 1;
        }
    }

    /// Move up one row; at the scroll-region top the region scrolls down
    pub fn reverse_index(&mut self) {
        if self.state.row == self.state.scroll_top {
            self.grid.scroll_region_down(self.state.scroll_top, self.state.scroll_bottom, 1);
        } else if self.state.row > 0 {
            self.state.row -= 1;
        }
    }

    pub fn save_cursor(&mut self) {
        self.state.save_cursor();
    }

    pub fn restore_cursor(&mut self) {
        self.state.restore_cursor();
    }

    // === Erase ===

    /// Erase within the cursor row: 0 = cursor to end, 1 = start through
    /// cursor, 2 = whole row
    pub fn erase_line(&mut self, mode: u16) {
        let (row, col) = (self.state.row, self.state.col);
        match mode {
            0 => self.grid.clear_span(row, col, COLS),
            1 => self.grid.clear_span(row, 0, col + 1),
            2 => self.grid.clear_row(row),
            _ => {}
        }
    }

    /// Erase within the display: 0 = cursor to end, 1 = start through
    /// cursor, 2 = everything. The cursor does not move.
    pub fn erase_display(&mut self, mode: u16) {
        match mode {
            0 => {
                self.erase_line(0);
                for row in self.state.row + 1..ROWS {
                    self.grid.clear_row(row);
                }
            }
            1 => {
                for row in 0..self.state.row {
                    self.grid.clear_row(row);
                }
                self.erase_line(1);
            }
            2 => self.grid.clear_all(),
            _ => {}
        }
    }

    // === Scrolling ===

    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        self.state.set_scroll_region(top, bottom);
    }

    /// Scroll the scroll region up by n
    pub fn scroll_up(&mut self, n: usize) {
        self.grid.scroll_region_up(self.state.scroll_top, self.state.scroll_bottom, n);
    }

    /// Scroll the scroll region down by n
    pub fn scroll_down(&mut self, n: usize) {
        self.grid.scroll_region_down(self.state.scroll_top, self.state.scroll_bottom, n);
    }

    /// Insert n blank lines at the cursor row; ignored outside the
    /// scroll region
    pub fn insert_lines(&mut self, n: usize) {
        if self.state.row < self.state.scroll_top || self.state.row > self.state.scroll_bottom {
            return;
        }
        self.grid.scroll_region_down(self.state.row, self.state.scroll_bottom, n);
    }

    /// Delete n lines at the cursor row; ignored outside the scroll region
    pub fn delete_lines(&mut self, n: usize) {
        if self.state.row < self.state.scroll_top || self.state.row > self.state.scroll_bottom {
            return;
        }
        self.grid.scroll_region_up(self.state.row, self.state.scroll_bottom, n);
    }

    pub fn insert_chars(&mut self, n: usize) {
        self.grid.insert_chars(self.state.row, self.state.col, n);
    }

    pub fn delete_chars(&mut self, n: usize) {
        self.grid.delete_chars(self.state.row, self.state.col, n);
    }

    pub fn erase_chars(&mut self, n: usize) {
        self.grid.erase_chars(self.state.row, self.state.col, n);
    }

    // === Alternate screen ===

    /// Switch between the primary and alternate screens. Entering the
    /// alternate screen stashes the primary grid and presents a cleared
    /// one; leaving restores the stashed grid and the entry cursor.
    /// No-op when already on the requested screen.
    pub fn switch_screen(&mut self, alt: bool) {
        if alt == self.alt_active {
            return;
        }
        if alt {
            self.state.save_alt_cursor();
            self.grid.save_into(&mut self.backing);
            self.grid.clear_all();
            self.state.row = 0;
            self.state.col = 0;
        } else {
            self.grid.load_from(&self.backing);
            self.state.restore_alt_cursor();
        }
        self.state.reset_scroll_region();
        self.state.wrap_pending = false;
        self.alt_active = alt;
    }

    pub fn is_alt_screen(&self) -> bool {
        self.alt_active
    }

    // === Attributes ===

    pub fn set_attr(&mut self, attr: CellFlags) {
        self.state.set_attr(attr);
    }

    pub fn clear_attr(&mut self, attr: CellFlags) {
        self.state.clear_attr(attr);
    }

    pub fn reset_attrs(&mut self) {
        self.state.reset_attrs();
    }

    pub fn set_bg_bright(&mut self, brightness: u8) {
        self.state.bg_bright = brightness;
    }

    // === Access ===

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.grid.cell(row, col)
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.state.row, self.state.col)
    }

    pub fn wrap_pending(&self) -> bool {
        self.state.wrap_pending
    }

    pub fn scroll_region(&self) -> (usize, usize) {
        (self.state.scroll_top, self.state.scroll_bottom)
    }

    pub fn current_attrs(&self) -> CellFlags {
        self.state.attrs
    }

    pub fn current_bg_bright(&self) -> u8 {
        self.state.bg_bright
    }

    // === Dirty tracking ===

    pub fn dirty_rows(&self) -> u32 {
        self.grid.dirty_rows()
    }

    pub fn mark_all_dirty(&mut self) {
        self.grid.mark_all_dirty();
    }

    pub fn clear_dirty(&mut self) {
        self.grid.clear_dirty();
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}
