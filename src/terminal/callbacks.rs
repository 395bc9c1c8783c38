//! Host notifications
//!
//! Implement only the methods you care about; every method defaults to a
//! no-op.

use super::buffer::Rect;
use super::cursor::CursorStyle;

/// Area of the active screen that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// One cell (wide characters report their head)
    Cell { x: usize, y: usize },
    /// Rectangle, exclusive right/bottom
    Rect(Rect),
    /// Rectangle contents moved vertically by `dy` rows (negative = up)
    Scroll { rect: Rect, dy: isize },
    /// Everything (screen switch, reset, resize)
    Screen,
}

/// Observer injected into the terminal
pub trait Callbacks: Send + Sync {
    /// BEL
    fn bell(&mut self) {}

    /// OSC 0/2
    fn title(&mut self, _title: &str) {}

    /// OSC 0/1
    fn icon_name(&mut self, _name: &str) {}

    /// Alternate screen entered (`true`) or left
    fn alt_screen(&mut self, _active: bool) {}

    /// Cursor moved to (x, y)
    fn cursor_position(&mut self, _x: usize, _y: usize) {}

    /// DECTCEM
    fn cursor_visibility(&mut self, _visible: bool) {}

    /// DECSCUSR
    fn cursor_style(&mut self, _style: CursorStyle, _steady: bool) {}

    /// OSC 7
    fn working_directory(&mut self, _url: &str) {}

    fn damage(&mut self, _damage: Damage) {}
}

/// Callbacks that ignore everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallbacks;

impl Callbacks for NoopCallbacks {}
