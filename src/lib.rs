//! inkterm - ANSI/VT100 terminal emulator core for 1-bit e-ink panels
//!
//! Consumes a byte stream of escape sequences and renders a fixed
//! 78x24 character grid onto an 800x480 1-bit framebuffer, dithering
//! background shades and picking refresh strategies that hide e-ink
//! latency and ghosting.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Console                                                     │
//! │  - input drain, refresh-rate limiting, sleep path            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Terminal                                                    │
//! │  - ANSI parser, CSI/SGR dispatch, host reports               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Screen                                                      │
//! │  - cell grid, cursor, scroll region, alt screen, dirty rows  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Renderer                                                    │
//! │  - glyph blit, Bayer dithering, partial/full refresh policy  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  EinkDisplay / Font (traits)                                 │
//! │  - panel driver and glyph data supplied by the firmware      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core is single-threaded and never blocks: the owning firmware
//! loop alternates between feeding bytes and invoking the renderer.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod cell;
pub mod color;
pub mod config;
pub mod console;
pub mod display;
pub mod font;
pub mod grid;
pub mod parser;
pub mod renderer;
pub mod screen;
pub mod state;
pub mod terminal;

pub use cell::{Cell, CellFlags};
pub use console::Console;
pub use display::{EinkDisplay, RefreshMode};
pub use font::Font;
pub use grid::Grid;
pub use parser::{Event, Params, Parser};
pub use renderer::Renderer;
pub use screen::Screen;
pub use state::TermState;
pub use terminal::{HostLink, Terminal};
