//! Terminal - combines parser and screen buffer
//!
//! Feeds host bytes through the parser and applies the resulting events
//! to the screen. This is also where CSI/SGR parameters get their
//! defaults and where the two report sequences (cursor position, device
//! attributes) are written back to the host.

use core::fmt::{self, Write};

use log::trace;

use crate::cell::CellFlags;
use crate::color::{luminance_256, luminance_rgb, ANSI_LUMINANCE};
use crate::config::ROWS;
use crate::parser::{Event, Params, Parser};
use crate::screen::Screen;

/// Byte sink towards the host (the serial transport in the firmware).
pub trait HostLink {
    fn send(&mut self, bytes: &[u8]);
}

/// Fixed-capacity reply buffer for the short report sequences
struct Reply {
    buf: [u8; 16],
    len: usize,
}

impl Reply {
    const fn new() -> Self {
        Self {
            buf: [0; 16],
            len: 0,
        }
    }

    fn bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Write for Reply {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        if self.len + bytes.len() > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }
}

/// Terminal emulator
pub struct Terminal {
    /// Screen buffer
    pub screen: Screen,
    /// ANSI parser
    parser: Parser,
    /// DECTCEM cursor visibility
    cursor_visible: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            screen: Screen::new(),
            parser: Parser::new(),
            cursor_visible: true,
        }
    }

    /// Check if the cursor is visible (CSI ?25 h/l)
    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Process a single byte of host output
    pub fn process_byte<H: HostLink>(&mut self, byte: u8, host: &mut H) {
        if let Some(event) = self.parser.advance(byte) {
            self.handle_event(event, host);
        }
    }

    /// Process a slice of bytes
    pub fn process_bytes<H: HostLink>(&mut self, bytes: &[u8], host: &mut H) {
        for &byte in bytes {
            self.process_byte(byte, host);
        }
    }

    fn handle_event<H: HostLink>(&mut self, event: Event, host: &mut H) {
        match event {
            Event::Print(cp) => self.screen.put_char(cp),
            Event::Execute(byte) => self.execute(byte),
            Event::Csi {
                params,
                final_byte,
                private,
            } => {
                if private {
                    self.handle_csi_private(&params, final_byte);
                } else {
                    self.handle_csi(&params, final_byte, host);
                }
            }
            Event::EscDispatch(byte) => self.handle_esc(byte),
        }
    }

    /// Execute a control character
    fn execute(&mut self, byte: u8) {
        match byte {
            0x08 => self.screen.backspace(),
            0x09 => self.screen.tab(),
            // LF, VT, FF all index down
            0x0A | 0x0B | 0x0C => self.screen.line_feed(),
            0x0D => self.screen.carriage_return(),
            _ => {}
        }
    }

    /// Handle ESC single-byte commands
    fn handle_esc(&mut self, byte: u8) {
        match byte {
            b'D' => self.screen.line_feed(),
            b'M' => self.screen.reverse_index(),
            b'7' => self.screen.save_cursor(),
            b'8' => self.screen.restore_cursor(),
            b'c' => {
                // RIS - full reset
                self.screen.erase_display(2);
                self.screen.set_cursor(0, 0);
                self.screen.reset_attrs();
                self.screen.set_scroll_region(0, ROWS - 1);
            }
            _ => {}
        }
    }

    /// Handle CSI sequence
    fn handle_csi<H: HostLink>(&mut self, params: &Params, cmd: u8, host: &mut H) {
        let n = params.get(0, 1) as usize;
        let (row, col) = self.screen.cursor();

        match cmd {
            b'A' => self.screen.cursor_up(n),
            b'B' => self.screen.cursor_down(n),
            b'C' => self.screen.cursor_forward(n),
            b'D' => self.screen.cursor_back(n),
            b'E' => {
                // CNL - cursor next line
                self.screen.cursor_down(n);
                self.screen.carriage_return();
            }
            b'F' => {
                // CPL - cursor previous line
                self.screen.cursor_up(n);
                self.screen.carriage_return();
            }
            b'G' => {
                // CHA - cursor horizontal absolute
                self.screen.set_cursor(row, params.get(0, 1) as usize - 1);
            }
            b'H' | b'f' => {
                // CUP / HVP
                self.screen.set_cursor(
                    params.get(0, 1) as usize - 1,
                    params.get(1, 1) as usize - 1,
                );
            }
            b'J' => self.screen.erase_display(params.get(0, 0)),
            b'K' => self.screen.erase_line(params.get(0, 0)),
            b'L' => self.screen.insert_lines(n),
            b'M' => self.screen.delete_lines(n),
            b'P' => self.screen.delete_chars(n),
            b'@' => self.screen.insert_chars(n),
            b'S' => self.screen.scroll_up(n),
            b'T' => self.screen.scroll_down(n),
            b'd' => {
                // VPA - vertical position absolute
                self.screen.set_cursor(params.get(0, 1) as usize - 1, col);
            }
            b'm' => self.handle_sgr(params),
            b'r' => {
                // DECSTBM
                self.screen.set_scroll_region(
                    params.get(0, 1) as usize - 1,
                    params.get(1, ROWS as u16) as usize - 1,
                );
            }
            b'n' => {
                // DSR - cursor position report
                if params.get(0, 0) == 6 {
                    let mut reply = Reply::new();
                    let _ = write!(reply, "\x1b[{};{}R", row + 1, col + 1);
                    host.send(reply.bytes());
                }
            }
            b's' => self.screen.save_cursor(),
            b'u' => self.screen.restore_cursor(),
            b'X' => self.screen.erase_chars(n),
            b'c' => {
                // DA - VT100 with no options
                host.send(b"\x1b[?1;0c");
            }
            _ => {
                trace!("unhandled CSI final {:#04x}", cmd);
            }
        }
    }

    /// Handle private CSI sequences (ESC [ ?)
    fn handle_csi_private(&mut self, params: &Params, cmd: u8) {
        let mode = params.get(0, 0);
        match cmd {
            b'h' => match mode {
                25 => self.cursor_visible = true,
                47 | 1047 | 1049 => {
                    if mode == 1049 {
                        self.screen.save_cursor();
                    }
                    self.screen.switch_screen(true);
                }
                _ => {}
            },
            b'l' => match mode {
                25 => self.cursor_visible = false,
                47 | 1047 | 1049 => {
                    self.screen.switch_screen(false);
                    if mode == 1049 {
                        self.screen.restore_cursor();
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    /// Handle SGR (attributes; colors collapse to luminance)
    fn handle_sgr(&mut self, params: &Params) {
        if params.is_empty() {
            self.screen.reset_attrs();
            return;
        }

        let mut i = 0;
        while i < params.len() {
            let p = params.value(i);
            match p {
                0 => self.screen.reset_attrs(),
                1 => self.screen.set_attr(CellFlags::BOLD),
                // Dim has no 1-bit rendering; drop bold instead
                2 => self.screen.clear_attr(CellFlags::BOLD),
                4 => self.screen.set_attr(CellFlags::UNDERLINE),
                7 => self.screen.set_attr(CellFlags::INVERSE),
                22 => self.screen.clear_attr(CellFlags::BOLD),
                24 => self.screen.clear_attr(CellFlags::UNDERLINE),
                27 => self.screen.clear_attr(CellFlags::INVERSE),

                // Foreground colors have no visual effect on a 1-bit panel
                30..=37 | 39 => {}

                // Background colors map to brightness
                40..=47 => self
                    .screen
                    .set_bg_bright(ANSI_LUMINANCE[p as usize - 40]),
                49 => self.screen.set_bg_bright(255),

                // Bright foreground: bold as a contrast proxy
                90..=97 => self.screen.set_attr(CellFlags::BOLD),

                // Bright background
                100..=107 => self
                    .screen
                    .set_bg_bright(ANSI_LUMINANCE[p as usize - 100 + 8]),

                // Extended foreground: 38;5;N or 38;2;R;G;B
                38 => {
                    if params.value(i + 1) == 5 && i + 1 < params.len() {
                        if i + 2 < params.len() {
                            let n = params.value(i + 2);
                            if (8..16).contains(&n) {
                                self.screen.set_attr(CellFlags::BOLD);
                            }
                        }
                        i += 2;
                    } else if params.value(i + 1) == 2 && i + 1 < params.len() {
                        if i + 4 < params.len() {
                            let lum = luminance_rgb(
                                params.value(i + 2) as u8,
                                params.value(i + 3) as u8,
                                params.value(i + 4) as u8,
                            );
                            if lum > 150 {
                                self.screen.set_attr(CellFlags::BOLD);
                            }
                        }
                        i += 4;
                    }
                }

                // Extended background: 48;5;N or 48;2;R;G;B
                48 => {
                    if params.value(i + 1) == 5 && i + 1 < params.len() {
                        if i + 2 < params.len() {
                            self.screen
                                .set_bg_bright(luminance_256(params.value(i + 2) as u8));
                        }
                        i += 2;
                    } else if params.value(i + 1) == 2 && i + 1 < params.len() {
                        if i + 4 < params.len() {
                            self.screen.set_bg_bright(luminance_rgb(
                                params.value(i + 2) as u8,
                                params.value(i + 3) as u8,
                                params.value(i + 4) as u8,
                            ));
                        }
                        i += 4;
                    }
                }

                _ => {}
            }
            i += 1;
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}
