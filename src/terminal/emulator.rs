//! Emulator state machine
//!
//! Owns both screens, the mode table, tab stops, charsets and colors, and
//! implements every operation the escape-sequence handlers perform. Handlers
//! (built-in or host-registered) receive `&mut Emulator` and call into the
//! public methods here.

use std::sync::Arc;

use log::{debug, info, trace, warn};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use super::buffer::Rect;
use super::callbacks::{Callbacks, Damage, NoopCallbacks};
use super::cell::{Cell, Hyperlink, Style};
use super::charset::Charsets;
use super::colors::{ColorScheme, Colors};
use super::cursor::CursorStyle;
use super::modes::{Mode, ModeState, Modes};
use super::reply::ReplyWriter;
use super::screen::Screen;
use super::tabstops::TabStops;
use super::width::{char_width, char_to_smolstr, cluster_width};
use crate::constants::{
    DEFAULT_COLS, DEFAULT_MAX_DCS_PAYLOAD, DEFAULT_REPLY_BUFFER, DEFAULT_ROWS, DEFAULT_SCROLLBACK,
    DEFAULT_TAB_WIDTH,
};
use crate::error::Result;

const PRIMARY: usize = 0;
const ALTERNATE: usize = 1;

/// Construction parameters
#[derive(Debug, Clone)]
pub struct Options {
    pub cols: usize,
    pub rows: usize,
    /// Primary screen history capacity (0 disables scrollback)
    pub scrollback_lines: usize,
    pub tab_width: usize,
    /// Capacity of the host-bound reply pipe in bytes
    pub reply_buffer_size: usize,
    /// DCS payloads longer than this are dropped
    pub max_dcs_payload: usize,
    pub colors: ColorScheme,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            scrollback_lines: DEFAULT_SCROLLBACK,
            tab_width: DEFAULT_TAB_WIDTH,
            reply_buffer_size: DEFAULT_REPLY_BUFFER,
            max_dcs_payload: DEFAULT_MAX_DCS_PAYLOAD,
            colors: ColorScheme::default(),
        }
    }
}

/// Where the last printed cluster went, and the state right after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PrintMark {
    x: usize,
    y: usize,
    cursor: (usize, usize),
    phantom: bool,
    screen: usize,
}

pub struct Emulator {
    screens: [Screen; 2],
    active: usize,
    modes: Modes,
    tabs: TabStops,
    charsets: Charsets,
    colors: Colors,
    /// Pending wrap: the last print filled the last column
    phantom: bool,
    /// Last single-width character printed (REP)
    last_char: Option<char>,
    last_print: Option<PrintMark>,
    title: String,
    icon_name: String,
    working_directory: Option<String>,
    reply: ReplyWriter,
    callbacks: Box<dyn Callbacks>,
    options: Options,
}

impl Emulator {
    pub fn new(options: Options, reply: ReplyWriter) -> Self {
        let cols = options.cols.max(1);
        let rows = options.rows.max(1);
        Self {
            screens: [
                Screen::new(cols, rows, Some(options.scrollback_lines)),
                Screen::new(cols, rows, None),
            ],
            active: PRIMARY,
            modes: Modes::new(),
            tabs: TabStops::new(cols, options.tab_width),
            charsets: Charsets::default(),
            colors: Colors::new(options.colors.clone()),
            phantom: false,
            last_char: None,
            last_print: None,
            title: String::new(),
            icon_name: String::new(),
            working_directory: None,
            reply,
            callbacks: Box::new(NoopCallbacks),
            options,
        }
    }

    // ========== Accessors ==========

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Active screen
    pub fn screen(&self) -> &Screen {
        &self.screens[self.active]
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screens[self.active]
    }

    pub fn primary(&self) -> &Screen {
        &self.screens[PRIMARY]
    }

    pub fn is_alt_screen(&self) -> bool {
        self.active == ALTERNATE
    }

    pub fn width(&self) -> usize {
        self.screen().width()
    }

    pub fn height(&self) -> usize {
        self.screen().height()
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn tabs(&self) -> &TabStops {
        &self.tabs
    }

    pub fn charsets_mut(&mut self) -> &mut Charsets {
        &mut self.charsets
    }

    pub fn colors(&self) -> &Colors {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut Colors {
        &mut self.colors
    }

    pub fn phantom(&self) -> bool {
        self.phantom
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    /// Cursor position on the active screen (0-based x, y)
    pub fn cursor_position(&self) -> (usize, usize) {
        self.screen().cursor.position()
    }

    /// Pen applied to new cells
    pub fn pen(&self) -> &Style {
        &self.screen().cursor.pen
    }

    pub fn pen_mut(&mut self) -> &mut Style {
        &mut self.screen_mut().cursor.pen
    }

    pub fn set_callbacks(&mut self, callbacks: Box<dyn Callbacks>) {
        self.callbacks = callbacks;
    }

    pub fn callbacks_mut(&mut self) -> &mut dyn Callbacks {
        self.callbacks.as_mut()
    }

    pub fn damage(&mut self, damage: Damage) {
        self.callbacks.damage(damage);
    }

    // ========== Replies ==========

    /// Queue bytes for the host. Dropped (with a warning) once closed.
    pub fn reply(&mut self, data: &[u8]) {
        trace!("reply: {:?}", String::from_utf8_lossy(data));
        if self.reply.write_all(data).is_err() {
            warn!("reply dropped, pipe closed ({} bytes)", data.len());
        }
    }

    pub fn reply_str(&mut self, data: &str) {
        self.reply(data.as_bytes());
    }

    /// Queue encoded input for the host, failing once the pipe is closed
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        trace!("send: {} bytes", data.len());
        self.reply.write_all(data)
    }

    /// Close the host-bound pipe
    pub fn close(&mut self) {
        self.reply.close();
    }

    // ========== Printing ==========

    /// Print one character: extends the previous cluster when possible,
    /// otherwise writes a new cell with wrap and insert-mode handling.
    pub fn print(&mut self, ch: char) {
        if self.extend_cluster(ch) {
            return;
        }
        self.print_char(ch);
    }

    fn print_char(&mut self, ch: char) {
        let ch = if (ch as u32) < 0x100 {
            self.charsets.translate(ch)
        } else {
            ch
        };
        let width = match char_width(ch) {
            None => return,
            Some(0) => {
                trace!("dropping zero-width U+{:04X} with no base", ch as u32);
                return;
            }
            Some(w) => w.min(2),
        };

        let autowrap = self.modes.autowrap();
        if self.phantom && autowrap {
            self.wrap_line();
        }
        self.phantom = false;

        let (left, right) = self.line_span();
        let y = self.screen().cursor.y;
        let mut x = self.screen().cursor.x;

        if width == 2 && x + 1 >= right {
            if autowrap && right - left >= 2 {
                let blank = self.screen().blank();
                self.screen_mut().buffer.fill(Rect::new(x, y, right, y + 1), &blank);
                self.wrap_line();
                x = self.screen().cursor.x;
            } else {
                x = right.saturating_sub(2).max(left);
                self.screen_mut().cursor.x = x;
            }
        }
        let y = self.screen().cursor.y;

        if self.modes.insert() {
            let blank = self.screen().blank();
            self.screen_mut()
                .buffer
                .insert_cells(Rect::new(left, y, right, y + 1), x, y, width, &blank);
        }

        let cursor = &self.screen().cursor;
        let cell = Cell {
            content: char_to_smolstr(ch),
            width: width as u8,
            style: cursor.pen,
            link: cursor.link.clone(),
        };
        self.screen_mut().buffer.set_cell(x, y, cell);
        self.callbacks.damage(Damage::Cell { x, y });

        if x + width >= right {
            self.screen_mut().cursor.x = right - 1;
            self.phantom = autowrap;
        } else {
            self.screen_mut().cursor.x = x + width;
        }
        self.last_char = (width == 1).then_some(ch);
        self.last_print = Some(PrintMark {
            x,
            y,
            cursor: self.screen().cursor.position(),
            phantom: self.phantom,
            screen: self.active,
        });
    }

    /// Merge `ch` into the previously printed cluster if the cursor has not
    /// moved since and the result is still one grapheme.
    fn extend_cluster(&mut self, ch: char) -> bool {
        let Some(mark) = self.last_print else {
            return false;
        };
        if mark.screen != self.active
            || mark.cursor != self.screen().cursor.position()
            || mark.phantom != self.phantom
        {
            return false;
        }
        let Some(cell) = self.screen().buffer.cell(mark.x, mark.y) else {
            return false;
        };
        if cell.content.is_empty() || cell.is_placeholder() {
            return false;
        }
        let mut combined = cell.content.to_string();
        combined.push(ch);
        if combined.graphemes(true).count() != 1 {
            return false;
        }
        let combined: String = combined.nfc().collect();
        let old_width = cell.width;
        let new_width = cluster_width(&combined);
        self.screen_mut()
            .buffer
            .replace_cluster(mark.x, mark.y, &combined, new_width);
        self.callbacks.damage(Damage::Cell {
            x: mark.x,
            y: mark.y,
        });

        // Cluster grew into a second cell: advance past it
        let grew = self
            .screen()
            .buffer
            .cell(mark.x, mark.y)
            .map(|c| c.width == 2 && old_width == 1)
            .unwrap_or(false);
        if grew {
            let (_, right) = self.line_span();
            if mark.x + 2 >= right {
                self.screen_mut().cursor.x = right - 1;
                self.phantom = self.modes.autowrap();
            } else {
                self.screen_mut().cursor.x = mark.x + 2;
                self.phantom = false;
            }
            self.last_char = None;
            self.last_print = Some(PrintMark {
                cursor: self.screen().cursor.position(),
                phantom: self.phantom,
                ..mark
            });
        }
        true
    }

    /// REP: print the last single-width character `n` more times
    pub fn repeat_last(&mut self, n: usize) {
        let Some(ch) = self.last_char else {
            return;
        };
        for _ in 0..n.min(self.width() * self.height()) {
            self.print_char(ch);
        }
    }

    /// Columns printing may use on the cursor row: the horizontal margins
    /// when the cursor is between them, else the whole line.
    fn line_span(&self) -> (usize, usize) {
        let screen = self.screen();
        let r = screen.scroll_rect();
        let x = screen.cursor.x;
        if x >= r.left && x < r.right {
            (r.left, r.right)
        } else {
            (0, screen.width())
        }
    }

    /// Deferred wrap: next line, first column
    fn wrap_line(&mut self) {
        self.index();
        let origin = self.modes.origin();
        self.screen_mut().carriage_return(origin);
    }

    // ========== Cursor movement ==========

    fn notify_cursor(&mut self) {
        let (x, y) = self.cursor_position();
        self.callbacks.cursor_position(x, y);
    }

    /// Absolute positioning (0-based), relative to the scroll rectangle in
    /// origin mode
    pub fn goto(&mut self, x: usize, y: usize) {
        self.phantom = false;
        let origin = self.modes.origin();
        if self.screen_mut().set_cursor(x, y, origin) {
            self.notify_cursor();
        }
    }

    /// Column only (CHA, HPA)
    pub fn goto_col(&mut self, x: usize) {
        let y = self.cursor_row_origin_relative();
        self.goto(x, y);
    }

    /// Row only (VPA)
    pub fn goto_row(&mut self, y: usize) {
        let x = self.cursor_col_origin_relative();
        self.goto(x, y);
    }

    fn cursor_row_origin_relative(&self) -> usize {
        let s = self.screen();
        if self.modes.origin() {
            s.cursor.y.saturating_sub(s.scroll_rect().top)
        } else {
            s.cursor.y
        }
    }

    fn cursor_col_origin_relative(&self) -> usize {
        let s = self.screen();
        if self.modes.origin() {
            s.cursor.x.saturating_sub(s.scroll_rect().left)
        } else {
            s.cursor.x
        }
    }

    /// Relative movement
    pub fn move_cursor(&mut self, dx: isize, dy: isize) {
        self.phantom = false;
        if self.screen_mut().move_cursor(dx, dy) {
            self.notify_cursor();
        }
    }

    pub fn index(&mut self) {
        self.phantom = false;
        let row = self.screen().cursor.y;
        if self.screen_mut().index() {
            let rect = self.screen().scroll_rect();
            self.last_print = None;
            self.callbacks.damage(Damage::Scroll { rect, dy: -1 });
        } else if self.screen().cursor.y != row {
            self.notify_cursor();
        }
    }

    pub fn reverse_index(&mut self) {
        self.phantom = false;
        let row = self.screen().cursor.y;
        if self.screen_mut().reverse_index() {
            let rect = self.screen().scroll_rect();
            self.last_print = None;
            self.callbacks.damage(Damage::Scroll { rect, dy: 1 });
        } else if self.screen().cursor.y != row {
            self.notify_cursor();
        }
    }

    pub fn carriage_return(&mut self) {
        self.phantom = false;
        let origin = self.modes.origin();
        if self.screen_mut().carriage_return(origin) {
            self.notify_cursor();
        }
    }

    /// LF/VT/FF: index, plus carriage return under LNM
    pub fn linefeed(&mut self) {
        self.index();
        if self.modes.linefeed_newline() {
            self.carriage_return();
        }
    }

    /// NEL
    pub fn next_line(&mut self) {
        self.index();
        self.carriage_return();
    }

    pub fn backspace(&mut self) {
        self.move_cursor(-1, 0);
    }

    // ========== Tabs ==========

    /// HT / CHT: forward `n` stops, clamped to the right margin
    pub fn tab_forward(&mut self, n: usize) {
        self.phantom = false;
        let screen = self.screen();
        let r = screen.scroll_rect();
        let mut x = screen.cursor.x;
        let limit = if x < r.right {
            r.right - 1
        } else {
            screen.width() - 1
        };
        for _ in 0..n {
            let next = self.tabs.next(x).min(limit);
            if next == x {
                break;
            }
            x = next;
        }
        let y = screen.cursor.y;
        if self.screen_mut().set_cursor(x, y, false) {
            self.notify_cursor();
        }
    }

    /// CBT: back `n` stops, clamped to the left margin in origin mode
    pub fn tab_backward(&mut self, n: usize) {
        self.phantom = false;
        let screen = self.screen();
        let limit = if self.modes.origin() {
            screen.scroll_rect().left
        } else {
            0
        };
        let mut x = screen.cursor.x;
        for _ in 0..n {
            let prev = self.tabs.prev(x).max(limit);
            if prev == x {
                break;
            }
            x = prev;
        }
        let y = screen.cursor.y;
        if self.screen_mut().set_cursor(x, y, false) {
            self.notify_cursor();
        }
    }

    /// HTS
    pub fn set_tab_stop(&mut self) {
        let x = self.screen().cursor.x;
        self.tabs.set(x);
    }

    /// TBC: 0 = at cursor, 3 = all. Returns `false` for other values.
    pub fn clear_tab_stop(&mut self, mode: u16) -> bool {
        match mode {
            0 => {
                let x = self.screen().cursor.x;
                self.tabs.clear(x);
            }
            3 => self.tabs.clear_all(),
            _ => return false,
        }
        true
    }

    // ========== Erase ==========

    pub fn erase_display(&mut self, mode: u16) -> bool {
        self.phantom = false;
        match self.screen_mut().erase_display(mode) {
            Some(rect) => {
                self.last_print = None;
                self.callbacks.damage(Damage::Rect(rect));
                true
            }
            None => false,
        }
    }

    pub fn erase_line(&mut self, mode: u16) -> bool {
        self.phantom = false;
        match self.screen_mut().erase_line(mode) {
            Some(rect) => {
                self.last_print = None;
                self.callbacks.damage(Damage::Rect(rect));
                true
            }
            None => false,
        }
    }

    /// ECH
    pub fn erase_chars(&mut self, n: usize) {
        self.phantom = false;
        let rect = self.screen_mut().erase_chars(n);
        self.last_print = None;
        self.callbacks.damage(Damage::Rect(rect));
    }

    // ========== Line / character editing ==========

    fn damage_band(&mut self) {
        let screen = self.screen();
        let r = screen.scroll_rect();
        let y = screen.cursor.y;
        self.last_print = None;
        self.callbacks
            .damage(Damage::Rect(Rect::new(r.left, y, r.right, r.bottom)));
    }

    pub fn insert_lines(&mut self, n: usize) {
        if self.screen_mut().insert_lines(n) {
            self.phantom = false;
            self.damage_band();
        }
    }

    pub fn delete_lines(&mut self, n: usize) {
        if self.screen_mut().delete_lines(n, false) {
            self.phantom = false;
            self.damage_band();
        }
    }

    pub fn insert_chars(&mut self, n: usize) {
        if self.screen_mut().insert_chars(n) {
            self.phantom = false;
            let screen = self.screen();
            let (x, y) = screen.cursor.position();
            let right = screen.scroll_rect().right;
            self.last_print = None;
            self.callbacks
                .damage(Damage::Rect(Rect::new(x, y, right, y + 1)));
        }
    }

    pub fn delete_chars(&mut self, n: usize) {
        if self.screen_mut().delete_chars(n) {
            self.phantom = false;
            let screen = self.screen();
            let (x, y) = screen.cursor.position();
            let right = screen.scroll_rect().right;
            self.last_print = None;
            self.callbacks
                .damage(Damage::Rect(Rect::new(x, y, right, y + 1)));
        }
    }

    /// SU: top margin, delete `n` lines (feeding the scrollback), restore
    pub fn scroll_up(&mut self, n: usize) {
        let saved = self.screen().cursor.position();
        let top = self.screen().scroll_rect().top;
        let left = self.screen().scroll_rect().left;
        self.screen_mut().set_cursor(left, top, false);
        self.screen_mut().delete_lines(n, true);
        self.screen_mut().set_cursor(saved.0, saved.1, false);
        let rect = self.screen().scroll_rect();
        self.last_print = None;
        self.callbacks.damage(Damage::Scroll {
            rect,
            dy: -(n as isize),
        });
    }

    /// SD: top margin, insert `n` lines, restore
    pub fn scroll_down(&mut self, n: usize) {
        let saved = self.screen().cursor.position();
        let top = self.screen().scroll_rect().top;
        let left = self.screen().scroll_rect().left;
        self.screen_mut().set_cursor(left, top, false);
        self.screen_mut().insert_lines(n);
        self.screen_mut().set_cursor(saved.0, saved.1, false);
        let rect = self.screen().scroll_rect();
        self.last_print = None;
        self.callbacks.damage(Damage::Scroll {
            rect,
            dy: n as isize,
        });
    }

    // ========== Margins ==========

    /// DECSTBM with 0-based inclusive rows; homes the cursor on success
    pub fn set_vertical_margins(&mut self, top: usize, bottom: usize) -> bool {
        if !self.screen_mut().set_vertical_margins(top, bottom) {
            return false;
        }
        self.goto(0, 0);
        true
    }

    /// DECSLRM with 0-based inclusive columns; needs DECLRMM
    pub fn set_horizontal_margins(&mut self, left: usize, right: usize) -> bool {
        if !self.modes.left_right_margins() {
            return false;
        }
        if !self.screen_mut().set_horizontal_margins(left, right) {
            return false;
        }
        self.goto(0, 0);
        true
    }

    // ========== Save / restore ==========

    pub fn save_cursor(&mut self) {
        self.screen_mut().save_cursor();
    }

    pub fn restore_cursor(&mut self) {
        self.phantom = false;
        if self.screen_mut().restore_cursor() {
            self.notify_cursor();
        }
    }

    // ========== Attributes ==========

    pub fn set_hyperlink(&mut self, link: Option<Hyperlink>) {
        self.screen_mut().cursor.link = link.map(Arc::new);
    }

    pub fn set_cursor_style(&mut self, style: CursorStyle, steady: bool) {
        let cursor = &mut self.screen_mut().cursor;
        cursor.style = style;
        cursor.steady = steady;
        self.callbacks.cursor_style(style, steady);
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.callbacks.title(title);
    }

    pub fn set_icon_name(&mut self, name: &str) {
        self.icon_name = name.to_string();
        self.callbacks.icon_name(name);
    }

    pub fn set_working_directory(&mut self, url: &str) {
        self.working_directory = Some(url.to_string());
        self.callbacks.working_directory(url);
    }

    pub fn bell(&mut self) {
        self.callbacks.bell();
    }

    // ========== Modes ==========

    pub fn mode_state(&self, mode: Mode) -> ModeState {
        self.modes.get(mode)
    }

    /// SM/RM/DECSET/DECRST for one mode, with side effects. Returns
    /// `false` for unrecognized modes.
    pub fn set_mode(&mut self, mode: Mode, on: bool) -> bool {
        if !self.modes.set(mode, on) {
            trace!("unrecognized mode {:?}", mode);
            return false;
        }
        debug!("mode {:?} -> {}", mode, if on { "set" } else { "reset" });
        match mode {
            Mode::Dec(6) => self.goto(0, 0),
            Mode::Dec(12) => {
                let style = self.screen().cursor.style;
                self.set_cursor_style(style, !on);
            }
            Mode::Dec(25) => {
                self.screen_mut().cursor.hidden = !on;
                self.callbacks.cursor_visibility(on);
            }
            Mode::Dec(47) | Mode::Dec(1047) => self.switch_screen(on, false),
            Mode::Dec(1048) => {
                if on {
                    self.save_cursor();
                } else {
                    self.restore_cursor();
                }
            }
            Mode::Dec(1049) => self.switch_screen(on, true),
            Mode::Dec(69) if !on => {
                for screen in self.screens.iter_mut() {
                    screen.reset_horizontal_margins();
                }
            }
            _ => {}
        }
        true
    }

    /// Enter or leave the alternate screen. Entering clears it; with
    /// `save_cursor` the primary cursor is saved on entry and restored on
    /// exit.
    fn switch_screen(&mut self, alt: bool, save_cursor: bool) {
        let target = if alt { ALTERNATE } else { PRIMARY };
        if target == self.active {
            return;
        }
        self.phantom = false;
        self.last_print = None;
        if alt {
            if save_cursor {
                self.screens[PRIMARY].save_cursor();
            }
            let cursor = self.screens[PRIMARY].cursor.clone();
            let alt_screen = &mut self.screens[ALTERNATE];
            alt_screen.clear();
            alt_screen.reset_margins();
            alt_screen.cursor = cursor;
        } else {
            let cursor = self.screens[ALTERNATE].cursor.clone();
            let primary = &mut self.screens[PRIMARY];
            if save_cursor {
                primary.restore_cursor();
            } else {
                primary.cursor = cursor;
            }
        }
        self.active = target;
        self.screen_mut().buffer.touch_all();
        debug!("{} alternate screen", if alt { "entered" } else { "left" });
        self.callbacks.alt_screen(alt);
        self.callbacks.damage(Damage::Screen);
        self.notify_cursor();
    }

    // ========== Reports ==========

    /// CPR (`CSI row ; col R`) or DECXCPR (`CSI row ; col ; 1 R`)
    pub fn report_cursor_position(&mut self, extended: bool) {
        let row = self.cursor_row_origin_relative() + 1;
        let col = self.cursor_col_origin_relative() + 1;
        let report = if extended {
            format!("\x1b[{};{};1R", row, col)
        } else {
            format!("\x1b[{};{}R", row, col)
        };
        self.reply_str(&report);
    }

    // ========== Resets ==========

    /// RIS
    pub fn reset(&mut self) {
        debug!("full reset");
        let was_alt = self.is_alt_screen();
        self.modes.reset();
        for screen in self.screens.iter_mut() {
            screen.reset();
        }
        self.active = PRIMARY;
        self.charsets.reset();
        self.tabs.reset();
        self.colors.reset_all();
        self.phantom = false;
        self.last_char = None;
        self.last_print = None;
        self.title.clear();
        self.icon_name.clear();
        self.working_directory = None;
        if was_alt {
            self.callbacks.alt_screen(false);
        }
        self.callbacks.cursor_visibility(true);
        self.callbacks.damage(Damage::Screen);
        self.notify_cursor();
    }

    /// DECSTR
    pub fn soft_reset(&mut self) {
        debug!("soft reset");
        for mode in [
            Mode::Ansi(2),
            Mode::Ansi(4),
            Mode::Dec(1),
            Mode::Dec(6),
            Mode::Dec(7),
            Mode::Dec(66),
        ] {
            self.modes.set(mode, false);
        }
        self.modes.set(Mode::Dec(25), true);
        self.callbacks.cursor_visibility(true);
        self.charsets.reset();
        self.phantom = false;
        let screen = self.screen_mut();
        screen.reset_margins();
        screen.cursor.pen = Style::default();
        screen.cursor.hidden = false;
        screen.cursor.link = None;
        screen.saved = Default::default();
    }

    /// DECALN: fill with `E`, reset margins, home the cursor
    pub fn screen_alignment(&mut self) {
        let screen = self.screen_mut();
        screen.reset_margins();
        let bounds = screen.buffer.bounds();
        screen
            .buffer
            .fill(bounds, &Cell::new("E", 1, Style::default(), None));
        self.last_print = None;
        self.goto(0, 0);
        self.callbacks.damage(Damage::Screen);
    }

    // ========== Resize ==========

    pub fn resize(&mut self, cols: usize, rows: usize) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        if cols == self.width() && rows == self.height() {
            return;
        }
        info!(
            "Terminal resize: {}x{} -> {}x{}",
            self.width(),
            self.height(),
            cols,
            rows
        );
        // A pending wrap means the cursor logically sits one column further
        let active = self.active;
        if self.phantom {
            let x = self.screens[active].cursor.x;
            if x < cols - 1 {
                self.screens[active].cursor.x = x + 1;
                self.phantom = false;
            }
        }
        for screen in self.screens.iter_mut() {
            screen.resize(cols, rows);
        }
        self.tabs.resize(cols);
        self.last_print = None;
        self.callbacks.damage(Damage::Screen);
        self.notify_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::reply::pipe;

    fn emulator(cols: usize, rows: usize) -> Emulator {
        let (writer, _reader) = pipe(1024);
        Emulator::new(
            Options {
                cols,
                rows,
                ..Options::default()
            },
            writer,
        )
    }

    fn print_str(emu: &mut Emulator, s: &str) {
        for ch in s.chars() {
            emu.print(ch);
        }
    }

    fn text(emu: &Emulator) -> Vec<String> {
        (0..emu.height())
            .map(|y| emu.screen().buffer.row_text(y))
            .collect()
    }

    #[test]
    fn test_print_sets_phantom_at_last_column() {
        let mut emu = emulator(4, 2);
        print_str(&mut emu, "abcd");
        assert_eq!(emu.cursor_position(), (3, 0));
        assert!(emu.phantom());
        emu.print('e');
        assert_eq!(text(&emu), vec!["abcd", "e"]);
        assert_eq!(emu.cursor_position(), (1, 1));
    }

    #[test]
    fn test_phantom_survives_mode_change_but_not_movement() {
        let mut emu = emulator(4, 2);
        print_str(&mut emu, "abcd");
        emu.set_mode(Mode::Ansi(4), false);
        emu.pen_mut().attrs = crate::terminal::cell::CellAttrs::BOLD;
        assert!(emu.phantom());
        emu.move_cursor(-1, 0);
        assert!(!emu.phantom());
    }

    #[test]
    fn test_no_autowrap_overwrites_last_column() {
        let mut emu = emulator(3, 2);
        emu.set_mode(Mode::Dec(7), false);
        print_str(&mut emu, "abcde");
        assert_eq!(text(&emu), vec!["abe", ""]);
        assert!(!emu.phantom());
    }

    #[test]
    fn test_wide_char_wraps_when_not_fitting() {
        let mut emu = emulator(3, 2);
        print_str(&mut emu, "ab中");
        assert_eq!(text(&emu), vec!["ab", "中"]);
        assert_eq!(emu.cursor_position(), (2, 1));
    }

    #[test]
    fn test_combining_mark_merges() {
        let mut emu = emulator(5, 1);
        print_str(&mut emu, "e\u{301}x");
        let cell = emu.screen().buffer.cell(0, 0).cloned().unwrap_or_default();
        assert_eq!(cell.content, "\u{e9}");
        assert_eq!(text(&emu), vec!["\u{e9}x"]);
    }

    #[test]
    fn test_no_merge_after_cursor_moved() {
        let mut emu = emulator(5, 1);
        print_str(&mut emu, "e");
        emu.goto(3, 0);
        emu.print('\u{301}');
        let cell = emu.screen().buffer.cell(0, 0).cloned().unwrap_or_default();
        assert_eq!(cell.content, "e");
    }

    #[test]
    fn test_variation_selector_widens() {
        let mut emu = emulator(5, 1);
        print_str(&mut emu, "\u{2764}\u{FE0F}x");
        let cell = emu.screen().buffer.cell(0, 0).cloned().unwrap_or_default();
        assert_eq!(cell.width, 2);
        assert_eq!(emu.screen().buffer.cell(2, 0).map(|c| c.ch()), Some('x'));
    }

    #[test]
    fn test_flag_pair_is_one_cell() {
        let mut emu = emulator(6, 1);
        print_str(&mut emu, "🇯🇵🇺🇸");
        assert_eq!(emu.screen().buffer.cell(0, 0).map(|c| c.content.to_string()), Some("🇯🇵".to_string()));
        assert_eq!(emu.screen().buffer.cell(2, 0).map(|c| c.content.to_string()), Some("🇺🇸".to_string()));
        assert_eq!(emu.cursor_position(), (4, 0));
    }

    #[test]
    fn test_insert_mode_shifts() {
        let mut emu = emulator(5, 1);
        print_str(&mut emu, "abc");
        emu.goto(0, 0);
        emu.set_mode(Mode::Ansi(4), true);
        emu.print('x');
        assert_eq!(text(&emu), vec!["xabc"]);
    }

    #[test]
    fn test_repeat_last() {
        let mut emu = emulator(5, 1);
        emu.print('a');
        emu.repeat_last(3);
        assert_eq!(text(&emu), vec!["aaaa"]);
    }

    #[test]
    fn test_alt_screen_preserves_primary() {
        let mut emu = emulator(4, 2);
        print_str(&mut emu, "ab");
        emu.set_mode(Mode::Dec(1049), true);
        assert!(emu.is_alt_screen());
        assert_eq!(text(&emu), vec!["", ""]);
        print_str(&mut emu, "zz");
        emu.set_mode(Mode::Dec(1049), false);
        assert_eq!(text(&emu), vec!["ab", ""]);
        assert_eq!(emu.cursor_position(), (2, 0));
    }

    #[test]
    fn test_origin_mode_goto() {
        let mut emu = emulator(10, 10);
        emu.set_vertical_margins(2, 5);
        emu.set_mode(Mode::Dec(6), true);
        assert_eq!(emu.cursor_position(), (0, 2));
        emu.goto(3, 100);
        assert_eq!(emu.cursor_position(), (3, 5));
    }

    #[test]
    fn test_tab_forward_and_back() {
        let mut emu = emulator(20, 1);
        emu.tab_forward(1);
        assert_eq!(emu.cursor_position(), (8, 0));
        emu.tab_forward(5);
        assert_eq!(emu.cursor_position(), (19, 0));
        emu.tab_backward(1);
        assert_eq!(emu.cursor_position(), (16, 0));
        emu.tab_backward(9);
        assert_eq!(emu.cursor_position(), (0, 0));
    }

    #[test]
    fn test_resize_with_phantom_advances() {
        let mut emu = emulator(4, 2);
        print_str(&mut emu, "abcd");
        emu.resize(8, 2);
        assert_eq!(emu.cursor_position(), (4, 0));
        assert!(!emu.phantom());
        assert_eq!(emu.tabs().iter().collect::<Vec<_>>(), Vec::<usize>::new());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut emu = emulator(4, 2);
        print_str(&mut emu, "abcdefgh\u{0}");
        emu.set_mode(Mode::Ansi(4), true);
        emu.set_title("x");
        emu.reset();
        assert_eq!(text(&emu), vec!["", ""]);
        assert!(!emu.modes().insert());
        assert_eq!(emu.title(), "");
        assert_eq!(emu.cursor_position(), (0, 0));
    }
}
