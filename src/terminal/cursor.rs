//! Cursor state

use std::sync::Arc;

use super::cell::{Hyperlink, Style};

/// Cursor shape (DECSCUSR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Block,
    Underline,
    Bar,
}

impl CursorStyle {
    /// Map a DECSCUSR parameter to (shape, steady). `None` for unknown values.
    pub fn from_decscusr(param: u16) -> Option<(CursorStyle, bool)> {
        match param {
            0 | 1 => Some((CursorStyle::Block, false)),
            2 => Some((CursorStyle::Block, true)),
            3 => Some((CursorStyle::Underline, false)),
            4 => Some((CursorStyle::Underline, true)),
            5 => Some((CursorStyle::Bar, false)),
            6 => Some((CursorStyle::Bar, true)),
            _ => None,
        }
    }

    /// Inverse of `from_decscusr` (never returns 0)
    pub fn to_decscusr(self, steady: bool) -> u16 {
        let base = match self {
            CursorStyle::Block => 1,
            CursorStyle::Underline => 3,
            CursorStyle::Bar => 5,
        };
        if steady {
            base + 1
        } else {
            base
        }
    }
}

/// Cursor position plus everything applied to newly written cells.
/// Saved and restored as a whole by DECSC/DECRC.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
    /// Style for new cells
    pub pen: Style,
    /// Active hyperlink (OSC 8)
    pub link: Option<Arc<Hyperlink>>,
    pub hidden: bool,
    pub style: CursorStyle,
    /// Blinking disabled
    pub steady: bool,
}

impl Cursor {
    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }
}
