//! Console - ties terminal and renderer into the firmware loop
//!
//! The top-level loop drains serial input, polls buttons, then calls
//! `render_if_due` with a monotonic timestamp. Rendering is gated on
//! the dirty set and on a minimum interval between panel refreshes;
//! an e-ink refresh takes long enough that back-to-back updates would
//! starve input draining.

use crate::config::MIN_REFRESH_INTERVAL_MS;
use crate::display::{EinkDisplay, RefreshMode};
use crate::font::Font;
use crate::renderer::Renderer;
use crate::terminal::{HostLink, Terminal};

/// Escape sequences reported to the host for the physical buttons.
pub mod keys {
    pub const UP: &[u8] = b"\x1b[A";
    pub const DOWN: &[u8] = b"\x1b[B";
    pub const RIGHT: &[u8] = b"\x1b[C";
    pub const LEFT: &[u8] = b"\x1b[D";
    pub const CONFIRM: &[u8] = b"\r";
    pub const BACK: &[u8] = b"\x1b";
}

/// Terminal plus renderer with refresh-rate limiting
pub struct Console {
    terminal: Terminal,
    renderer: Renderer,
    last_refresh_ms: u64,
}

impl Console {
    pub fn new() -> Self {
        Self {
            terminal: Terminal::new(),
            renderer: Renderer::new(),
            last_refresh_ms: 0,
        }
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal {
        &mut self.terminal
    }

    /// Feed host output into the terminal
    pub fn write<H: HostLink>(&mut self, bytes: &[u8], host: &mut H) {
        self.terminal.process_bytes(bytes, host);
    }

    /// Render dirty rows if anything changed and the minimum refresh
    /// interval has elapsed. Returns true when a refresh was issued.
    pub fn render_if_due<D: EinkDisplay, F: Font>(
        &mut self,
        now_ms: u64,
        display: &mut D,
        font: &F,
    ) -> bool {
        if self.terminal.screen.dirty_rows() == 0 {
            return false;
        }
        if now_ms.saturating_sub(self.last_refresh_ms) < MIN_REFRESH_INTERVAL_MS {
            return false;
        }
        self.renderer
            .set_cursor_visible(self.terminal.cursor_visible());
        self.renderer
            .render_dirty(display, font, &mut self.terminal.screen);
        self.last_refresh_ms = now_ms;
        true
    }

    /// Full-screen render plus ghost-clearing refresh (button combo)
    pub fn force_full_refresh<D: EinkDisplay, F: Font>(&mut self, display: &mut D, font: &F) {
        self.renderer
            .set_cursor_visible(self.terminal.cursor_visible());
        self.renderer
            .render_full(display, font, &mut self.terminal.screen);
    }

    /// Mark the whole screen for redraw at the next render
    pub fn invalidate(&mut self) {
        self.terminal.screen.mark_all_dirty();
    }

    /// Blank the panel and put it into deep sleep (power-off path)
    pub fn prepare_sleep<D: EinkDisplay>(&mut self, display: &mut D) {
        display.clear_screen(0xFF);
        display.display_buffer(RefreshMode::Full);
        display.deep_sleep();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FB_SIZE, MIN_REFRESH_INTERVAL_MS};
    use std::vec;
    use std::vec::Vec;

    struct NullHost;

    impl HostLink for NullHost {
        fn send(&mut self, _bytes: &[u8]) {}
    }

    struct TestFont;

    impl Font for TestFont {
        fn glyph(&self, _codepoint: u16) -> &[u8] {
            &crate::font::FALLBACK_GLYPH
        }
    }

    struct TestDisplay {
        fb: Vec<u8>,
        refreshes: usize,
        sleeps: usize,
    }

    impl TestDisplay {
        fn new() -> Self {
            Self {
                fb: vec![0; FB_SIZE],
                refreshes: 0,
                sleeps: 0,
            }
        }
    }

    impl EinkDisplay for TestDisplay {
        fn framebuffer(&mut self) -> &mut [u8] {
            &mut self.fb
        }

        fn display_buffer(&mut self, _mode: RefreshMode) {
            self.refreshes += 1;
        }

        fn display_window(&mut self, _x: u32, _y: u32, _w: u32, _h: u32) {
            self.refreshes += 1;
        }

        fn deep_sleep(&mut self) {
            self.sleeps += 1;
        }
    }

    #[test]
    fn test_render_respects_min_interval() {
        let mut console = Console::new();
        let mut display = TestDisplay::new();

        // Fresh screen is fully dirty, so the first call renders
        assert!(console.render_if_due(1000, &mut display, &TestFont));

        console.write(b"hi", &mut NullHost);
        // Too soon after the last refresh
        assert!(!console.render_if_due(
            1000 + MIN_REFRESH_INTERVAL_MS - 1,
            &mut display,
            &TestFont
        ));
        // Interval elapsed
        assert!(console.render_if_due(1000 + MIN_REFRESH_INTERVAL_MS, &mut display, &TestFont));
    }

    #[test]
    fn test_render_skips_clean_screen() {
        let mut console = Console::new();
        let mut display = TestDisplay::new();
        assert!(console.render_if_due(1000, &mut display, &TestFont));
        let after_first = display.refreshes;

        // Nothing changed: no refresh regardless of elapsed time
        assert!(!console.render_if_due(1_000_000, &mut display, &TestFont));
        assert_eq!(display.refreshes, after_first);
    }

    #[test]
    fn test_invalidate_forces_render() {
        let mut console = Console::new();
        let mut display = TestDisplay::new();
        assert!(console.render_if_due(1000, &mut display, &TestFont));
        console.invalidate();
        assert!(console.render_if_due(1_000_000, &mut display, &TestFont));
    }

    #[test]
    fn test_prepare_sleep_blanks_and_sleeps() {
        let mut console = Console::new();
        let mut display = TestDisplay::new();
        console.prepare_sleep(&mut display);
        assert!(display.fb.iter().all(|&b| b == 0xFF));
        assert_eq!(display.sleeps, 1);
        assert!(display.refreshes >= 1);
    }

    #[test]
    fn test_key_sequences() {
        assert_eq!(keys::UP, b"\x1b[A");
        assert_eq!(keys::CONFIRM, b"\r");
        assert_eq!(keys::BACK, b"\x1b");
    }
}
