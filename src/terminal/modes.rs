//! Terminal modes (ANSI + DEC private)
//!
//! Two independent numeric namespaces: ANSI modes set with `CSI Pm h` and
//! DEC private modes set with `CSI ? Pm h`. Numbers outside the tables
//! below are not recognized and cannot be set.

use bitflags::bitflags;

bitflags! {
    /// DEC private mode flags (DECSET/DECRST)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DecModes: u32 {
        /// DECCKM (1): application cursor keys
        const APPLICATION_CURSOR = 1 << 0;
        /// DECCOLM (3): 132 column mode (recorded only)
        const COLUMN_132 = 1 << 1;
        /// DECSCNM (5): reverse video
        const REVERSE_VIDEO = 1 << 2;
        /// DECOM (6): origin mode
        const ORIGIN = 1 << 3;
        /// DECAWM (7): auto-wrap
        const AUTOWRAP = 1 << 4;
        /// X10 mouse reporting (9)
        const MOUSE_X10 = 1 << 5;
        /// Blinking cursor (12)
        const CURSOR_BLINK = 1 << 6;
        /// DECTCEM (25): cursor visible
        const CURSOR_VISIBLE = 1 << 7;
        /// Alternate screen (47)
        const ALT_SCREEN_LEGACY = 1 << 8;
        /// DECNKM (66): application keypad
        const APPLICATION_KEYPAD = 1 << 9;
        /// DECLRMM (69): left/right margins
        const LEFT_RIGHT_MARGIN = 1 << 10;
        /// Mouse button tracking (1000)
        const MOUSE_BUTTON = 1 << 11;
        /// Mouse cell motion tracking (1002)
        const MOUSE_CELL_MOTION = 1 << 12;
        /// Mouse all motion tracking (1003)
        const MOUSE_ALL_MOTION = 1 << 13;
        /// Focus reporting (1004)
        const FOCUS_EVENTS = 1 << 14;
        /// UTF-8 mouse coordinates (1005)
        const MOUSE_UTF8 = 1 << 15;
        /// SGR mouse coordinates (1006)
        const MOUSE_SGR = 1 << 16;
        /// urxvt mouse coordinates (1015)
        const MOUSE_URXVT = 1 << 17;
        /// SGR pixel mouse coordinates (1016)
        const MOUSE_SGR_PIXELS = 1 << 18;
        /// Alternate screen with clear (1047)
        const ALT_SCREEN = 1 << 19;
        /// Save/restore cursor (1048)
        const SAVE_CURSOR = 1 << 20;
        /// Alternate screen with cursor save (1049)
        const ALT_SCREEN_SAVE = 1 << 21;
        /// Bracketed paste (2004)
        const BRACKETED_PASTE = 1 << 22;
        /// Synchronized output (2026)
        const SYNC_OUTPUT = 1 << 23;
        /// Grapheme cluster mode (2027)
        const GRAPHEME_CLUSTER = 1 << 24;
    }
}

bitflags! {
    /// ANSI mode flags (SM/RM)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnsiModes: u8 {
        /// KAM (2): keyboard locked
        const KEYBOARD_LOCK = 1 << 0;
        /// IRM (4): insert mode
        const INSERT = 1 << 1;
        /// SRM (12): send/receive, local echo off
        const SEND_RECEIVE = 1 << 2;
        /// LNM (20): linefeed also returns the carriage
        const LINEFEED_NEWLINE = 1 << 3;
    }
}

/// Mode identifier in one of the two namespaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Ansi(u16),
    Dec(u16),
}

/// Answer to a mode query (DECRQM report values)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeState {
    NotRecognized,
    Set,
    Reset,
}

impl ModeState {
    /// `Pm` value of a DECRPM reply
    pub fn report_value(self) -> u8 {
        match self {
            ModeState::NotRecognized => 0,
            ModeState::Set => 1,
            ModeState::Reset => 2,
        }
    }
}

/// Mode table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modes {
    pub dec: DecModes,
    pub ansi: AnsiModes,
}

impl Default for Modes {
    fn default() -> Self {
        Self::new()
    }
}

impl Modes {
    /// Power-on defaults: DECAWM, DECTCEM and SRM set
    pub fn new() -> Self {
        Self {
            dec: DecModes::AUTOWRAP | DecModes::CURSOR_VISIBLE,
            ansi: AnsiModes::SEND_RECEIVE,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Tri-state lookup
    pub fn get(&self, mode: Mode) -> ModeState {
        let state = match mode {
            Mode::Ansi(n) => ansi_flag(n).map(|f| self.ansi.contains(f)),
            Mode::Dec(n) => dec_flag(n).map(|f| self.dec.contains(f)),
        };
        match state {
            None => ModeState::NotRecognized,
            Some(true) => ModeState::Set,
            Some(false) => ModeState::Reset,
        }
    }

    /// Write a mode. Returns `false` if the number is not recognized.
    pub fn set(&mut self, mode: Mode, enabled: bool) -> bool {
        match mode {
            Mode::Ansi(n) => match ansi_flag(n) {
                Some(f) => self.ansi.set(f, enabled),
                None => return false,
            },
            Mode::Dec(n) => match dec_flag(n) {
                Some(f) => self.dec.set(f, enabled),
                None => return false,
            },
        }
        true
    }

    pub fn is_set(&self, mode: Mode) -> bool {
        self.get(mode) == ModeState::Set
    }

    // ========== Accessors for modes the emulator consults ==========

    #[inline]
    pub fn origin(&self) -> bool {
        self.dec.contains(DecModes::ORIGIN)
    }

    #[inline]
    pub fn autowrap(&self) -> bool {
        self.dec.contains(DecModes::AUTOWRAP)
    }

    #[inline]
    pub fn insert(&self) -> bool {
        self.ansi.contains(AnsiModes::INSERT)
    }

    #[inline]
    pub fn linefeed_newline(&self) -> bool {
        self.ansi.contains(AnsiModes::LINEFEED_NEWLINE)
    }

    #[inline]
    pub fn left_right_margins(&self) -> bool {
        self.dec.contains(DecModes::LEFT_RIGHT_MARGIN)
    }

    #[inline]
    pub fn application_cursor(&self) -> bool {
        self.dec.contains(DecModes::APPLICATION_CURSOR)
    }

    #[inline]
    pub fn application_keypad(&self) -> bool {
        self.dec.contains(DecModes::APPLICATION_KEYPAD)
    }

    #[inline]
    pub fn bracketed_paste(&self) -> bool {
        self.dec.contains(DecModes::BRACKETED_PASTE)
    }

    #[inline]
    pub fn focus_events(&self) -> bool {
        self.dec.contains(DecModes::FOCUS_EVENTS)
    }

    #[inline]
    pub fn mouse_sgr(&self) -> bool {
        self.dec.contains(DecModes::MOUSE_SGR)
    }

    #[inline]
    pub fn mouse_urxvt(&self) -> bool {
        self.dec.contains(DecModes::MOUSE_URXVT)
    }

    #[inline]
    pub fn mouse_utf8(&self) -> bool {
        self.dec.contains(DecModes::MOUSE_UTF8)
    }

    /// Any mouse tracking mode enabled
    pub fn mouse_tracking(&self) -> bool {
        self.dec.intersects(
            DecModes::MOUSE_X10
                | DecModes::MOUSE_BUTTON
                | DecModes::MOUSE_CELL_MOTION
                | DecModes::MOUSE_ALL_MOTION,
        )
    }
}

fn dec_flag(mode: u16) -> Option<DecModes> {
    let flag = match mode {
        1 => DecModes::APPLICATION_CURSOR,
        3 => DecModes::COLUMN_132,
        5 => DecModes::REVERSE_VIDEO,
        6 => DecModes::ORIGIN,
        7 => DecModes::AUTOWRAP,
        9 => DecModes::MOUSE_X10,
        12 => DecModes::CURSOR_BLINK,
        25 => DecModes::CURSOR_VISIBLE,
        47 => DecModes::ALT_SCREEN_LEGACY,
        66 => DecModes::APPLICATION_KEYPAD,
        69 => DecModes::LEFT_RIGHT_MARGIN,
        1000 => DecModes::MOUSE_BUTTON,
        1002 => DecModes::MOUSE_CELL_MOTION,
        1003 => DecModes::MOUSE_ALL_MOTION,
        1004 => DecModes::FOCUS_EVENTS,
        1005 => DecModes::MOUSE_UTF8,
        1006 => DecModes::MOUSE_SGR,
        1015 => DecModes::MOUSE_URXVT,
        1016 => DecModes::MOUSE_SGR_PIXELS,
        1047 => DecModes::ALT_SCREEN,
        1048 => DecModes::SAVE_CURSOR,
        1049 => DecModes::ALT_SCREEN_SAVE,
        2004 => DecModes::BRACKETED_PASTE,
        2026 => DecModes::SYNC_OUTPUT,
        2027 => DecModes::GRAPHEME_CLUSTER,
        _ => return None,
    };
    Some(flag)
}

fn ansi_flag(mode: u16) -> Option<AnsiModes> {
    let flag = match mode {
        2 => AnsiModes::KEYBOARD_LOCK,
        4 => AnsiModes::INSERT,
        12 => AnsiModes::SEND_RECEIVE,
        20 => AnsiModes::LINEFEED_NEWLINE,
        _ => return None,
    };
    Some(flag)
}
