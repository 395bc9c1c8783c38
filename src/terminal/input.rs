//! Host input encoding
//!
//! Keys, mouse events, focus changes and pastes are turned into the byte
//! sequences an application running in the terminal expects, according to
//! the current mode table (DECCKM, DECKPAM, mouse tracking, bracketed
//! paste, focus reporting).

use bitflags::bitflags;

use super::modes::{DecModes, Modes};
use crate::constants::{
    FOCUS_IN, FOCUS_OUT, PASTE_END, PASTE_START, UTF8_MOUSE_MAX, X10_MOUSE_MAX,
};

bitflags! {
    /// Modifier keys held during an event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT = 1 << 1;
        const CTRL = 1 << 2;
    }
}

impl Modifiers {
    /// xterm modifier parameter (1 + bitmask)
    fn code(self) -> u8 {
        1 + self.bits()
    }
}

/// Logical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    /// F1..=F12
    F(u8),
    KeypadEnter,
}

// ========== Keyboard ==========

/// Encode a key press
pub fn encode_key(key: Key, mods: Modifiers, modes: &Modes) -> Vec<u8> {
    let has_mods = !mods.is_empty();
    let mod_code = mods.code();

    // Cursor keys
    if let Some(cursor_char) = match key {
        Key::Up => Some('A'),
        Key::Down => Some('B'),
        Key::Right => Some('C'),
        Key::Left => Some('D'),
        Key::Home => Some('H'),
        Key::End => Some('F'),
        _ => None,
    } {
        return if has_mods {
            format!("\x1b[1;{}{}", mod_code, cursor_char).into_bytes()
        } else if modes.application_cursor() {
            format!("\x1bO{}", cursor_char).into_bytes()
        } else {
            format!("\x1b[{}", cursor_char).into_bytes()
        };
    }

    // Insert/Delete/PageUp/PageDown
    if let Some(code) = match key {
        Key::Insert => Some(2),
        Key::Delete => Some(3),
        Key::PageUp => Some(5),
        Key::PageDown => Some(6),
        _ => None,
    } {
        return if has_mods {
            format!("\x1b[{};{}~", code, mod_code).into_bytes()
        } else {
            format!("\x1b[{}~", code).into_bytes()
        };
    }

    if let Key::F(n) = key {
        return encode_function_key(n, has_mods, mod_code);
    }

    let base: Vec<u8> = match key {
        Key::Enter if modes.linefeed_newline() => b"\r\n".to_vec(),
        Key::Enter => b"\r".to_vec(),
        Key::KeypadEnter if modes.application_keypad() => b"\x1bOM".to_vec(),
        Key::KeypadEnter => b"\r".to_vec(),
        Key::Tab if mods.contains(Modifiers::SHIFT) => return b"\x1b[Z".to_vec(),
        Key::Tab => b"\t".to_vec(),
        Key::Backspace if mods.contains(Modifiers::CTRL) => vec![0x08],
        Key::Backspace => vec![0x7f],
        Key::Escape => vec![0x1b],
        Key::Char(ch) => {
            if mods.contains(Modifiers::CTRL) {
                match ctrl_code(ch) {
                    Some(code) => vec![code],
                    None => encode_char(ch),
                }
            } else {
                encode_char(ch)
            }
        }
        _ => Vec::new(),
    };

    // Alt: ESC prefix
    if mods.contains(Modifiers::ALT) && !base.is_empty() {
        let mut out = vec![0x1b];
        out.extend(base);
        return out;
    }
    base
}

fn encode_char(ch: char) -> Vec<u8> {
    let mut buf = [0u8; 4];
    ch.encode_utf8(&mut buf).as_bytes().to_vec()
}

/// ASCII control code for Ctrl+`ch`
fn ctrl_code(ch: char) -> Option<u8> {
    match ch {
        'a'..='z' => Some(ch as u8 - b'a' + 1),
        'A'..='Z' => Some(ch as u8 - b'A' + 1),
        ' ' | '@' | '2' => Some(0x00),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '7' | '/' => Some(0x1f),
        '8' | '?' => Some(0x7f),
        _ => None,
    }
}

/// Function key escape sequences
fn encode_function_key(n: u8, has_mods: bool, mod_code: u8) -> Vec<u8> {
    // F1-F4: SS3 format (no modifiers) or CSI 1;{mod}P/Q/R/S (with modifiers)
    if let Some(ch) = match n {
        1 => Some('P'),
        2 => Some('Q'),
        3 => Some('R'),
        4 => Some('S'),
        _ => None,
    } {
        return if has_mods {
            format!("\x1b[1;{}{}", mod_code, ch).into_bytes()
        } else {
            format!("\x1bO{}", ch).into_bytes()
        };
    }

    // F5-F12: CSI {code}~ format
    let code = match n {
        5 => 15,
        6 => 17,
        7 => 18,
        8 => 19,
        9 => 20,
        10 => 21,
        11 => 23,
        12 => 24,
        _ => return Vec::new(),
    };
    if has_mods {
        format!("\x1b[{};{}~", code, mod_code).into_bytes()
    } else {
        format!("\x1b[{}~", code).into_bytes()
    }
}

// ========== Mouse ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    /// Motion with no button held
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Press,
    Release,
    Motion,
}

/// Mouse event at a 0-based cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub button: MouseButton,
    pub action: MouseAction,
    pub x: usize,
    pub y: usize,
    pub mods: Modifiers,
}

impl MouseEvent {
    pub fn new(button: MouseButton, action: MouseAction, x: usize, y: usize) -> Self {
        Self {
            button,
            action,
            x,
            y,
            mods: Modifiers::empty(),
        }
    }
}

/// Active tracking level, highest wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tracking {
    None,
    X10,
    Normal,
    ButtonEvent,
    AnyEvent,
}

fn tracking(modes: &Modes) -> Tracking {
    if modes.dec.contains(DecModes::MOUSE_ALL_MOTION) {
        Tracking::AnyEvent
    } else if modes.dec.contains(DecModes::MOUSE_CELL_MOTION) {
        Tracking::ButtonEvent
    } else if modes.dec.contains(DecModes::MOUSE_BUTTON) {
        Tracking::Normal
    } else if modes.dec.contains(DecModes::MOUSE_X10) {
        Tracking::X10
    } else {
        Tracking::None
    }
}

/// Encode a mouse event, or `None` when the tracking mode does not report it
pub fn encode_mouse(event: &MouseEvent, modes: &Modes) -> Option<Vec<u8>> {
    let level = tracking(modes);
    let wheel = matches!(event.button, MouseButton::WheelUp | MouseButton::WheelDown);
    let reported = match event.action {
        MouseAction::Press => level >= Tracking::X10 && !(wheel && level == Tracking::X10),
        // X10 mode doesn't send release events
        MouseAction::Release => level >= Tracking::Normal && !wheel,
        MouseAction::Motion => match level {
            Tracking::AnyEvent => true,
            Tracking::ButtonEvent => event.button != MouseButton::None,
            _ => false,
        },
    };
    if !reported {
        return None;
    }

    let sgr = modes.mouse_sgr();
    let mut cb: u8 = match event.button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::None => 3,
        MouseButton::WheelUp => 64,
        MouseButton::WheelDown => 65,
    };
    // Normal format: button 3 means release
    if event.action == MouseAction::Release && !sgr {
        cb = 3;
    }
    if event.action == MouseAction::Motion {
        cb += 32;
    }
    if level != Tracking::X10 {
        if event.mods.contains(Modifiers::SHIFT) {
            cb += 4;
        }
        if event.mods.contains(Modifiers::ALT) {
            cb += 8;
        }
        if event.mods.contains(Modifiers::CTRL) {
            cb += 16;
        }
    }

    if sgr {
        let suffix = if event.action == MouseAction::Release {
            'm'
        } else {
            'M'
        };
        return Some(format!("\x1b[<{};{};{}{}", cb, event.x + 1, event.y + 1, suffix).into_bytes());
    }
    if modes.mouse_urxvt() {
        return Some(format!("\x1b[{};{};{}M", cb as u32 + 32, event.x + 1, event.y + 1).into_bytes());
    }
    if modes.mouse_utf8() {
        let mut out = vec![0x1b, b'[', b'M'];
        push_utf8_value(&mut out, cb as usize + 32);
        for pos in [event.x, event.y] {
            push_utf8_value(&mut out, (pos + 1).min(UTF8_MOUSE_MAX) + 32);
        }
        return Some(out);
    }
    let cx = (event.x + 1).min(X10_MOUSE_MAX) as u8;
    let cy = (event.y + 1).min(X10_MOUSE_MAX) as u8;
    Some(vec![0x1b, b'[', b'M', cb + 32, cx + 32, cy + 32])
}

/// 1005 field: the offset value as a UTF-8 encoded code point
fn push_utf8_value(out: &mut Vec<u8>, value: usize) {
    let ch = char::from_u32(value as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
    let mut buf = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
}

// ========== Focus / paste ==========

/// Focus report, only while focus reporting (1004) is enabled
pub fn encode_focus(focused: bool, modes: &Modes) -> Option<&'static [u8]> {
    if !modes.focus_events() {
        return None;
    }
    Some(if focused { FOCUS_IN } else { FOCUS_OUT }.as_bytes())
}

/// Paste text, wrapped in bracketed-paste markers when 2004 is enabled.
/// An embedded end marker is removed so the paste cannot terminate early.
pub fn encode_paste(text: &str, modes: &Modes) -> Vec<u8> {
    if !modes.bracketed_paste() {
        return text.as_bytes().to_vec();
    }
    let body = text.replace(PASTE_END, "");
    let mut out = Vec::with_capacity(body.len() + PASTE_START.len() + PASTE_END.len());
    out.extend_from_slice(PASTE_START.as_bytes());
    out.extend_from_slice(body.as_bytes());
    out.extend_from_slice(PASTE_END.as_bytes());
    out
}
