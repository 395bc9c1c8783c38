//! Thread-shareable terminal
//!
//! Readers take a shared lock, mutations (write, resize, input) an
//! exclusive one. Replies are read through a `ReplyReader` obtained up
//! front so a reader thread never contends with the writer.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::cell::Cell;
use super::input::{Key, Modifiers, MouseEvent};
use super::reply::ReplyReader;
use super::{Terminal, TerminalOptions};
use crate::error::Result;

pub struct SyncTerminal {
    inner: RwLock<Terminal>,
    reader: ReplyReader,
}

impl SyncTerminal {
    pub fn new(options: TerminalOptions) -> Self {
        Self::from_terminal(Terminal::new(options))
    }

    pub fn from_terminal(terminal: Terminal) -> Self {
        let reader = terminal.reply_reader();
        Self {
            inner: RwLock::new(terminal),
            reader,
        }
    }

    /// Shared access; a poisoned lock is recovered since terminal state is
    /// valid after every completed byte
    pub fn read_lock(&self) -> RwLockReadGuard<'_, Terminal> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn write_lock(&self) -> RwLockWriteGuard<'_, Terminal> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn reply_reader(&self) -> ReplyReader {
        self.reader.clone()
    }

    // ========== Mutations ==========

    pub fn write(&self, data: &[u8]) -> Result<usize> {
        self.write_lock().write(data)
    }

    pub fn resize(&self, cols: usize, rows: usize) {
        self.write_lock().resize(cols, rows);
    }

    pub fn send_key(&self, key: Key, mods: Modifiers) -> Result<()> {
        self.write_lock().send_key(key, mods)
    }

    pub fn send_mouse(&self, event: MouseEvent) -> Result<()> {
        self.write_lock().send_mouse(event)
    }

    pub fn send_text(&self, text: &str) -> Result<()> {
        self.write_lock().send_text(text)
    }

    pub fn send_focus(&self, focused: bool) -> Result<()> {
        self.write_lock().send_focus(focused)
    }

    pub fn paste(&self, text: &str) -> Result<()> {
        self.write_lock().paste(text)
    }

    pub fn close(&self) {
        self.write_lock().close();
    }

    // ========== Snapshots ==========

    pub fn text(&self) -> String {
        self.read_lock().text()
    }

    pub fn render(&self) -> String {
        self.read_lock().render()
    }

    pub fn cell_at(&self, x: usize, y: usize) -> Option<Cell> {
        self.read_lock().cell_at(x, y)
    }

    pub fn cursor_position(&self) -> (usize, usize) {
        self.read_lock().cursor_position()
    }

    pub fn title(&self) -> String {
        self.read_lock().title().to_string()
    }
}

impl From<Terminal> for SyncTerminal {
    fn from(terminal: Terminal) -> Self {
        Self::from_terminal(terminal)
    }
}
