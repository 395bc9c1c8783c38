//! Terminal emulation
//!
//! Core module integrating the VT parser, the handler registry and the
//! emulator state to form a headless terminal.

pub mod buffer;
pub mod callbacks;
pub mod cell;
pub mod charset;
pub mod colors;
pub mod cursor;
pub mod emulator;
pub mod handlers;
pub mod input;
pub mod modes;
pub mod parser;
pub mod render;
pub mod reply;
pub mod screen;
pub mod scrollback;
pub mod sync;
pub mod tabstops;
pub mod width;

use std::io::{self, Read};

use log::{debug, trace};

use buffer::Rect;
use callbacks::Callbacks;
use cell::Cell;
use colors::DynamicColor;
use cursor::CursorStyle;
use emulator::Emulator;
use handlers::{Csi, CsiKey, Dcs, Esc, Handler, Handlers, Osc};
use input::{Key, Modifiers, MouseEvent};
use parser::{PendingDcs, Performer};
use reply::ReplyReader;
use scrollback::Scrollback;

use crate::error::{Error, Result};
use crate::utils::Rgb;

pub use emulator::Options as TerminalOptions;

/// Headless terminal
pub struct Terminal {
    emu: Emulator,
    handlers: Handlers,
    /// VT parser
    vt_parser: vte::Parser,
    /// DCS string in progress (survives across writes)
    pending_dcs: Option<PendingDcs>,
    reader: ReplyReader,
    closed: bool,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new(TerminalOptions::default())
    }
}

impl Terminal {
    /// Create a terminal with the built-in action set
    pub fn new(options: TerminalOptions) -> Self {
        Self::with_handlers(options, Handlers::with_defaults())
    }

    /// Create a terminal with a custom registry (e.g. `Handlers::new()`
    /// for a bare one)
    pub fn with_handlers(options: TerminalOptions, handlers: Handlers) -> Self {
        let (writer, reader) = reply::pipe(options.reply_buffer_size);
        debug!(
            "Terminal created: {}x{}, scrollback {}",
            options.cols, options.rows, options.scrollback_lines
        );
        Self {
            emu: Emulator::new(options, writer),
            handlers,
            vt_parser: vte::Parser::new(),
            pending_dcs: None,
            reader,
            closed: false,
        }
    }

    // ========== Byte streams ==========

    /// Feed application output through the parser
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.closed {
            return Err(Error::Closed);
        }
        trace!("write: {} bytes", data.len());
        let mut performer = Performer::new(&mut self.emu, &self.handlers, &mut self.pending_dcs);
        for &byte in data {
            self.vt_parser.advance(&mut performer, byte);
        }
        Ok(data.len())
    }

    /// Read host-bound bytes (replies and encoded input). Blocks while
    /// nothing is queued; `Ok(0)` after close once drained.
    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }

    /// Independent handle on the host-bound stream, for a reader thread
    pub fn reply_reader(&self) -> ReplyReader {
        self.reader.clone()
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.emu.resize(cols, rows);
    }

    /// Close the terminal: further writes fail, readers see end-of-stream
    pub fn close(&mut self) {
        if !self.closed {
            debug!("Terminal closed");
            self.closed = true;
            self.emu.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ========== Host input ==========

    pub fn send_key(&mut self, key: Key, mods: Modifiers) -> Result<()> {
        let bytes = input::encode_key(key, mods, self.emu.modes());
        self.emu.send(&bytes)
    }

    /// Encode a mouse event; nothing is sent unless a tracking mode wants it
    pub fn send_mouse(&mut self, event: MouseEvent) -> Result<()> {
        match input::encode_mouse(&event, self.emu.modes()) {
            Some(bytes) => self.emu.send(&bytes),
            None => Ok(()),
        }
    }

    pub fn send_text(&mut self, text: &str) -> Result<()> {
        self.emu.send(text.as_bytes())
    }

    /// Focus change, reported only with focus events (1004) enabled
    pub fn send_focus(&mut self, focused: bool) -> Result<()> {
        match input::encode_focus(focused, self.emu.modes()) {
            Some(bytes) => self.emu.send(bytes),
            None => Ok(()),
        }
    }

    /// Paste, bracketed when 2004 is enabled
    pub fn paste(&mut self, text: &str) -> Result<()> {
        let bytes = input::encode_paste(text, self.emu.modes());
        self.emu.send(&bytes)
    }

    // ========== Colors ==========

    pub fn color(&self, which: DynamicColor) -> Rgb {
        self.emu.colors().get(which)
    }

    pub fn set_color(&mut self, which: DynamicColor, color: Rgb) {
        self.emu.colors_mut().set(which, color);
    }

    pub fn reset_color(&mut self, which: DynamicColor) {
        self.emu.colors_mut().reset(which);
    }

    pub fn indexed_color(&self, idx: u8) -> Rgb {
        self.emu.colors().indexed(idx)
    }

    pub fn set_indexed_color(&mut self, idx: u8, color: Rgb) {
        self.emu.colors_mut().set_indexed(idx, color);
    }

    pub fn reset_indexed_color(&mut self, idx: u8) {
        self.emu.colors_mut().reset_indexed(idx);
    }

    // ========== Inspection ==========

    pub fn width(&self) -> usize {
        self.emu.width()
    }

    pub fn height(&self) -> usize {
        self.emu.height()
    }

    /// Active screen with SGR styling, one line per row
    pub fn render(&self) -> String {
        render::render_styled(&self.emu.screen().buffer)
    }

    /// Active screen as plain text, one line per row
    pub fn text(&self) -> String {
        render::render_plain(&self.emu.screen().buffer)
    }

    /// Plain text of each row of the active screen
    pub fn lines(&self) -> Vec<String> {
        let buffer = &self.emu.screen().buffer;
        (0..buffer.height()).map(|y| buffer.row_text(y)).collect()
    }

    pub fn cell_at(&self, x: usize, y: usize) -> Option<Cell> {
        self.emu.screen().buffer.cell(x, y).cloned()
    }

    pub fn cursor_position(&self) -> (usize, usize) {
        self.emu.cursor_position()
    }

    pub fn cursor_visible(&self) -> bool {
        !self.emu.screen().cursor.hidden
    }

    /// Shape and steady flag
    pub fn cursor_style(&self) -> (CursorStyle, bool) {
        let cursor = &self.emu.screen().cursor;
        (cursor.style, cursor.steady)
    }

    pub fn is_alt_screen(&self) -> bool {
        self.emu.is_alt_screen()
    }

    pub fn scroll_rect(&self) -> Rect {
        self.emu.screen().scroll_rect()
    }

    /// Rows changed since the last `clear_touched`
    pub fn touched_lines(&self) -> Vec<usize> {
        self.emu.screen().buffer.touched_lines()
    }

    pub fn clear_touched(&mut self) {
        self.emu.screen_mut().buffer.clear_touched();
    }

    /// Primary screen history, oldest first
    pub fn scrollback(&self) -> Option<&Scrollback> {
        self.emu.primary().scrollback()
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback().map(|s| s.len()).unwrap_or(0)
    }

    pub fn scrollback_lines(&self) -> Vec<String> {
        self.scrollback().map(|s| s.lines()).unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.emu.title()
    }

    pub fn icon_name(&self) -> &str {
        self.emu.icon_name()
    }

    pub fn emulator(&self) -> &Emulator {
        &self.emu
    }

    pub fn emulator_mut(&mut self) -> &mut Emulator {
        &mut self.emu
    }

    // ========== Extension ==========

    pub fn set_callbacks<C: Callbacks + 'static>(&mut self, callbacks: C) {
        self.emu.set_callbacks(Box::new(callbacks));
    }

    /// Handle a control byte (tried before the built-in handler)
    pub fn register_control<H: Handler<u8> + 'static>(&mut self, byte: u8, handler: H) {
        self.handlers.control.register(byte, handler);
    }

    pub fn register_csi<H: Handler<Csi> + 'static>(&mut self, key: CsiKey, handler: H) {
        self.handlers.csi.register(key, handler);
    }

    pub fn register_esc<H: Handler<Esc> + 'static>(&mut self, key: Esc, handler: H) {
        self.handlers.esc.register(key, handler);
    }

    pub fn register_osc<H: Handler<Osc> + 'static>(&mut self, command: u32, handler: H) {
        self.handlers.osc.register(command, handler);
    }

    pub fn register_dcs<H: Handler<Dcs> + 'static>(&mut self, key: CsiKey, handler: H) {
        self.handlers.dcs.register(key, handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn term(cols: usize, rows: usize) -> Terminal {
        Terminal::new(TerminalOptions {
            cols,
            rows,
            ..TerminalOptions::default()
        })
    }

    #[test]
    fn test_write_after_close_fails() {
        let mut t = term(5, 1);
        t.write(b"x").unwrap();
        t.close();
        assert!(matches!(t.write(b"y"), Err(Error::Closed)));
        assert!(matches!(t.send_text("a"), Err(Error::Closed)));
        let mut buf = [0u8; 4];
        assert_eq!(t.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_returns_queued_replies() {
        let mut t = term(5, 1);
        t.write(b"\x1b[5n").unwrap();
        let mut buf = [0u8; 16];
        let n = t.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"\x1b[0n");
    }

    #[test]
    fn test_sequence_split_across_writes() {
        let mut t = term(10, 2);
        t.write(b"\x1b[2").unwrap();
        t.write(b";3Hx\x1bP$").unwrap();
        t.write(b"qm\x1b").unwrap();
        t.write(b"\\").unwrap();
        assert_eq!(t.cell_at(2, 1).map(|c| c.ch()), Some('x'));
        assert_eq!(t.reply_reader().try_read_all(), b"\x1bP1$r0m\x1b\\".to_vec());
    }

    #[test]
    fn test_registered_handler_overrides_builtin() {
        let mut t = term(10, 2);
        t.register_csi(CsiKey::plain(b'H'), |_: &mut Emulator, csi: &Csi| {
            // Only intercept CUP with a row of 7
            csi.params.raw(0) == Some(7)
        });
        t.write(b"\x1b[7;7H").unwrap();
        assert_eq!(t.cursor_position(), (0, 0));
        t.write(b"\x1b[2;2H").unwrap();
        assert_eq!(t.cursor_position(), (1, 1));
    }

    #[test]
    fn test_custom_osc_handler() {
        let mut t = term(10, 2);
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&seen);
        t.register_osc(1337, move |_: &mut Emulator, osc: &Osc| {
            if let Ok(mut s) = sink.lock() {
                *s = osc.payload.clone().unwrap_or_default();
            }
            true
        });
        t.write(b"\x1b]1337;hello\x07").unwrap();
        assert_eq!(seen.lock().unwrap().as_str(), "hello");
    }

    #[test]
    fn test_bare_registry_ignores_sequences() {
        let mut t = Terminal::with_handlers(
            TerminalOptions {
                cols: 5,
                rows: 2,
                ..TerminalOptions::default()
            },
            Handlers::new(),
        );
        t.write(b"ab\x1b[2;2Hc\r\n").unwrap();
        assert_eq!(t.lines(), vec!["abc", ""]);
    }

    #[test]
    fn test_touched_lines() {
        let mut t = term(5, 3);
        t.clear_touched();
        t.write(b"\x1b[3;1Hx").unwrap();
        assert_eq!(t.touched_lines(), vec![2]);
        t.clear_touched();
        assert!(t.touched_lines().is_empty());
    }

    #[test]
    fn test_render_styled() {
        let mut t = term(6, 1);
        t.write(b"a\x1b[31mb\x1b[0mc").unwrap();
        assert_eq!(t.render(), "a\x1b[0;31mb\x1b[0mc");
        assert_eq!(t.text(), "abc");
    }
}
