//! Screen: one buffer with its cursor, saved cursor, scroll rectangle and
//! (primary only) scrollback.
//!
//! Coordinates are 0-based. The scroll rectangle has exclusive right/bottom
//! edges and defaults to the whole buffer.

use super::buffer::{Buffer, Rect};
use super::cell::Cell;
use super::cursor::Cursor;
use super::scrollback::Scrollback;

#[derive(Debug, Clone)]
pub struct Screen {
    pub buffer: Buffer,
    pub cursor: Cursor,
    pub saved: Cursor,
    scroll: Rect,
    scrollback: Option<Scrollback>,
}

impl Screen {
    /// `scrollback` is the history capacity; `None` for the alternate screen
    pub fn new(width: usize, height: usize, scrollback: Option<usize>) -> Self {
        let buffer = Buffer::new(width, height);
        let scroll = buffer.bounds();
        Self {
            buffer,
            cursor: Cursor::default(),
            saved: Cursor::default(),
            scroll,
            scrollback: scrollback.map(Scrollback::new),
        }
    }

    pub fn width(&self) -> usize {
        self.buffer.width()
    }

    pub fn height(&self) -> usize {
        self.buffer.height()
    }

    pub fn scroll_rect(&self) -> Rect {
        self.scroll
    }

    pub fn scrollback(&self) -> Option<&Scrollback> {
        self.scrollback.as_ref()
    }

    pub fn clear_scrollback(&mut self) {
        if let Some(sb) = self.scrollback.as_mut() {
            sb.clear();
        }
    }

    /// Blank cell carrying the pen's background
    pub fn blank(&self) -> Cell {
        Cell::blank_with_bg(self.cursor.pen.bg)
    }

    pub fn cursor_in_scroll_rect(&self) -> bool {
        self.scroll.contains(self.cursor.x, self.cursor.y)
    }

    // ========== Margins ==========

    /// DECSTBM with 0-based inclusive rows. Rejects `top >= bottom`.
    pub fn set_vertical_margins(&mut self, top: usize, bottom: usize) -> bool {
        let bottom = bottom.min(self.height() - 1);
        if top >= bottom {
            return false;
        }
        self.scroll.top = top;
        self.scroll.bottom = bottom + 1;
        true
    }

    /// DECSLRM with 0-based inclusive columns. Rejects `left >= right`.
    pub fn set_horizontal_margins(&mut self, left: usize, right: usize) -> bool {
        let right = right.min(self.width() - 1);
        if left >= right {
            return false;
        }
        self.scroll.left = left;
        self.scroll.right = right + 1;
        true
    }

    pub fn reset_horizontal_margins(&mut self) {
        self.scroll.left = 0;
        self.scroll.right = self.width();
    }

    pub fn reset_margins(&mut self) {
        self.scroll = self.buffer.bounds();
    }

    // ========== Cursor ==========

    /// Place the cursor. With `margins_relative`, (x, y) are offsets from
    /// the scroll rectangle origin and the result is clamped to the
    /// rectangle; otherwise clamped to the buffer. Returns whether the
    /// position changed.
    pub fn set_cursor(&mut self, x: usize, y: usize, margins_relative: bool) -> bool {
        let (nx, ny) = if margins_relative {
            let r = self.scroll;
            (
                r.left.saturating_add(x).min(r.right - 1),
                r.top.saturating_add(y).min(r.bottom - 1),
            )
        } else {
            (x.min(self.width() - 1), y.min(self.height() - 1))
        };
        let moved = (nx, ny) != (self.cursor.x, self.cursor.y);
        self.cursor.x = nx;
        self.cursor.y = ny;
        moved
    }

    /// Relative move, clamped to the scroll rectangle when the cursor
    /// starts inside it, else to the buffer.
    pub fn move_cursor(&mut self, dx: isize, dy: isize) -> bool {
        let bounds = if self.cursor_in_scroll_rect() {
            self.scroll
        } else {
            self.buffer.bounds()
        };
        let x = offset_clamped(self.cursor.x, dx, bounds.left, bounds.right - 1);
        let y = offset_clamped(self.cursor.y, dy, bounds.top, bounds.bottom - 1);
        self.set_cursor(x, y, false)
    }

    /// Move down one line, scrolling the rectangle when on its bottom line.
    /// Returns whether a scroll happened.
    pub fn index(&mut self) -> bool {
        let r = self.scroll;
        let (x, y) = (self.cursor.x, self.cursor.y);
        if y + 1 == r.bottom && x >= r.left && x < r.right {
            self.scroll_up(1);
            true
        } else {
            self.cursor.y = (y + 1).min(self.height() - 1);
            false
        }
    }

    /// Move up one line, scrolling the rectangle down when on its top line.
    pub fn reverse_index(&mut self) -> bool {
        let r = self.scroll;
        let (x, y) = (self.cursor.x, self.cursor.y);
        if y == r.top && x >= r.left && x < r.right {
            self.scroll_down(1);
            true
        } else {
            self.cursor.y = y.saturating_sub(1);
            false
        }
    }

    /// Returns whether the column changed
    pub fn carriage_return(&mut self, origin: bool) -> bool {
        let x = if origin || self.cursor_in_scroll_rect() {
            self.scroll.left
        } else {
            0
        };
        let moved = x != self.cursor.x;
        self.cursor.x = x;
        moved
    }

    pub fn save_cursor(&mut self) {
        self.saved = self.cursor.clone();
    }

    /// Restore the saved cursor, clamped to the current size. Returns
    /// whether the position changed.
    pub fn restore_cursor(&mut self) -> bool {
        let before = (self.cursor.x, self.cursor.y);
        self.cursor = self.saved.clone();
        self.cursor.x = self.cursor.x.min(self.width() - 1);
        self.cursor.y = self.cursor.y.min(self.height() - 1);
        (self.cursor.x, self.cursor.y) != before
    }

    // ========== Scrolling ==========

    /// Whether scrolling the rectangle up feeds the scrollback
    fn captures_scrollback(&self) -> bool {
        self.scrollback.is_some()
            && self.scroll.top == 0
            && self.scroll.left == 0
            && self.scroll.right == self.width()
    }

    /// Scroll the rectangle up by `n`
    pub fn scroll_up(&mut self, n: usize) {
        let r = self.scroll;
        let n = n.min(r.height());
        if n == 0 {
            return;
        }
        if self.captures_scrollback() {
            if let Some(sb) = self.scrollback.as_mut() {
                for y in r.top..r.top + n {
                    if let Some(row) = self.buffer.row(y) {
                        sb.push(row);
                    }
                }
            }
        }
        let blank = self.blank();
        self.buffer.delete_lines(r, r.top, n, &blank);
    }

    /// Scroll the rectangle down by `n`
    pub fn scroll_down(&mut self, n: usize) {
        let r = self.scroll;
        let blank = self.blank();
        self.buffer.insert_lines(r, r.top, n, &blank);
    }

    // ========== Line / character editing ==========

    /// IL. No-op unless the cursor is inside the scroll rectangle; moves the
    /// cursor to the left margin on success.
    pub fn insert_lines(&mut self, n: usize) -> bool {
        if !self.cursor_in_scroll_rect() {
            return false;
        }
        let blank = self.blank();
        self.buffer.insert_lines(self.scroll, self.cursor.y, n, &blank);
        self.cursor.x = self.scroll.left;
        true
    }

    /// DL. Same conditions as `insert_lines`. With `capture`, lines deleted
    /// at the top margin go to the scrollback like a scroll-up would.
    pub fn delete_lines(&mut self, n: usize, capture: bool) -> bool {
        if !self.cursor_in_scroll_rect() {
            return false;
        }
        if capture && self.cursor.y == self.scroll.top {
            self.scroll_up(n);
        } else {
            let blank = self.blank();
            self.buffer.delete_lines(self.scroll, self.cursor.y, n, &blank);
        }
        self.cursor.x = self.scroll.left;
        true
    }

    /// ICH
    pub fn insert_chars(&mut self, n: usize) -> bool {
        if !self.cursor_in_scroll_rect() {
            return false;
        }
        let blank = self.blank();
        self.buffer
            .insert_cells(self.scroll, self.cursor.x, self.cursor.y, n, &blank);
        true
    }

    /// DCH
    pub fn delete_chars(&mut self, n: usize) -> bool {
        if !self.cursor_in_scroll_rect() {
            return false;
        }
        let blank = self.blank();
        self.buffer
            .delete_cells(self.scroll, self.cursor.x, self.cursor.y, n, &blank);
        true
    }

    /// ECH: blank `n` cells from the cursor, no shifting
    pub fn erase_chars(&mut self, n: usize) -> Rect {
        let (x, y) = (self.cursor.x, self.cursor.y);
        let rect = Rect::new(x, y, (x + n.max(1)).min(self.width()), y + 1);
        let blank = self.blank();
        self.buffer.fill(rect, &blank);
        rect
    }

    // ========== Erase ==========

    /// ED. Returns the erased area, `None` for an unknown mode.
    pub fn erase_display(&mut self, mode: u16) -> Option<Rect> {
        let (x, y) = (self.cursor.x, self.cursor.y);
        let (w, h) = (self.width(), self.height());
        let blank = self.blank();
        match mode {
            0 => {
                self.buffer.fill(Rect::new(x, y, w, y + 1), &blank);
                self.buffer.fill(Rect::new(0, y + 1, w, h), &blank);
                Some(Rect::new(0, y, w, h))
            }
            1 => {
                self.buffer.fill(Rect::new(0, 0, w, y), &blank);
                self.buffer.fill(Rect::new(0, y, x + 1, y + 1), &blank);
                Some(Rect::new(0, 0, w, y + 1))
            }
            2 => {
                self.buffer.fill(Rect::full(w, h), &blank);
                Some(Rect::full(w, h))
            }
            3 => {
                self.buffer.fill(Rect::full(w, h), &blank);
                self.clear_scrollback();
                Some(Rect::full(w, h))
            }
            _ => None,
        }
    }

    /// EL
    pub fn erase_line(&mut self, mode: u16) -> Option<Rect> {
        let (x, y) = (self.cursor.x, self.cursor.y);
        let w = self.width();
        let rect = match mode {
            0 => Rect::new(x, y, w, y + 1),
            1 => Rect::new(0, y, x + 1, y + 1),
            2 => Rect::new(0, y, w, y + 1),
            _ => return None,
        };
        let blank = self.blank();
        self.buffer.fill(rect, &blank);
        Some(rect)
    }

    /// Clear the whole buffer with default blanks
    pub fn clear(&mut self) {
        self.buffer.clear(self.buffer.bounds());
    }

    // ========== Resize ==========

    /// Resize the buffer and reset margins. Cursor placement is left to the
    /// caller.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.buffer.resize(width, height);
        self.scroll = self.buffer.bounds();
        self.cursor.x = self.cursor.x.min(self.width() - 1);
        self.cursor.y = self.cursor.y.min(self.height() - 1);
        self.saved.x = self.saved.x.min(self.width() - 1);
        self.saved.y = self.saved.y.min(self.height() - 1);
    }

    /// Full reset: blank buffer, default cursor, full margins, empty history
    pub fn reset(&mut self) {
        self.clear();
        self.cursor = Cursor::default();
        self.saved = Cursor::default();
        self.reset_margins();
        self.clear_scrollback();
    }
}

fn offset_clamped(pos: usize, delta: isize, min: usize, max: usize) -> usize {
    let target = pos as isize + delta;
    target.clamp(min as isize, max as isize) as usize
}
