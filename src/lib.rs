//! vtmodel - headless terminal screen model
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  bytes → vte::Parser → Performer         │
//! │                          ↓               │
//! │          Handlers (control/CSI/ESC/...)  │
//! │                          ↓               │
//! │  Emulator: screens, modes, tabs, colors  │
//! │                          ↓               │
//! │  replies / encoded input → ReplyReader   │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ```
//! use vtmodel::{Terminal, TerminalOptions};
//!
//! let mut term = Terminal::new(TerminalOptions {
//!     cols: 10,
//!     rows: 2,
//!     ..TerminalOptions::default()
//! });
//! term.write(b"hello\r\n\x1b[1mworld").unwrap();
//! assert_eq!(term.text(), "hello\nworld");
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod terminal;
pub mod utils;

pub use error::{Error, Result};
pub use terminal::callbacks::{Callbacks, Damage};
pub use terminal::cell::{Cell, CellAttrs, Color, Hyperlink, Style};
pub use terminal::colors::{ColorScheme, DynamicColor};
pub use terminal::cursor::CursorStyle;
pub use terminal::emulator::Emulator;
pub use terminal::handlers::{Csi, CsiKey, Dcs, Esc, Handler, Handlers, Osc, Params};
pub use terminal::input::{Key, Modifiers, MouseAction, MouseButton, MouseEvent};
pub use terminal::reply::ReplyReader;
pub use terminal::sync::SyncTerminal;
pub use terminal::{Terminal, TerminalOptions};
pub use utils::Rgb;
