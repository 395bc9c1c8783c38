//! End-to-end terminal scenarios driven through the public byte interface.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use vtmodel::{
    Callbacks, CursorStyle, Damage, Key, Modifiers, MouseAction, MouseButton, MouseEvent,
    Terminal, TerminalOptions,
};

fn term(cols: usize, rows: usize) -> Terminal {
    Terminal::new(TerminalOptions {
        cols,
        rows,
        ..TerminalOptions::default()
    })
}

fn term_with_scrollback(cols: usize, rows: usize, scrollback_lines: usize) -> Terminal {
    Terminal::new(TerminalOptions {
        cols,
        rows,
        scrollback_lines,
        ..TerminalOptions::default()
    })
}

/// Drain everything the terminal queued for the host
fn host_bytes(t: &Terminal) -> Vec<u8> {
    t.reply_reader().try_read_all()
}

// ========== Pending wrap ==========

#[test]
fn phantom_wrap_defers_line_advance() {
    let mut t = term(10, 2);
    t.write(b"A\x1b[10G ").unwrap();
    // Last column filled: still on row 0 until the next printable
    assert_eq!(t.cursor_position(), (9, 0));
    t.write(b"BC").unwrap();
    assert_eq!(t.lines(), vec!["A", "BC"]);
    assert_eq!(t.cursor_position(), (2, 1));
}

#[test]
fn phantom_cleared_by_cursor_movement() {
    let mut t = term(10, 2);
    t.write(b"0123456789\x1b[5GX").unwrap();
    assert_eq!(t.lines(), vec!["0123X56789", ""]);
    assert_eq!(t.cursor_position(), (5, 0));
}

#[test]
fn phantom_survives_sgr() {
    let mut t = term(4, 2);
    t.write(b"abcd\x1b[1mX").unwrap();
    assert_eq!(t.lines(), vec!["abcd", "X"]);
}

#[test]
fn phantom_cleared_by_erase() {
    let mut t = term(4, 2);
    t.write(b"abcd\x1b[KX").unwrap();
    // EL 0 at column 3 erases 'd' and the next print overwrites in place
    assert_eq!(t.lines(), vec!["abcX", ""]);
}

// ========== Scroll regions & margins ==========

#[test]
fn scroll_up_inside_region_leaves_outside_rows() {
    let mut t = term(5, 3);
    t.write(b"a\r\nb\r\nc").unwrap();
    t.write(b"\x1b[2;3r\x1b[1;3H").unwrap();
    let before = t.cursor_position();
    t.write(b"\x1b[S").unwrap();
    assert_eq!(t.lines(), vec!["a", "c", ""]);
    assert_eq!(t.cursor_position(), before);
}

#[test]
fn left_right_margins_bound_delete_line() {
    let mut t = term(8, 2);
    t.write(b"ABC123\r\ndefghi").unwrap();
    t.write(b"\x1b[?69h\x1b[2;4s\x1b[1;2H\x1b[M").unwrap();
    assert_eq!(t.lines(), vec!["Aefg23", "d   hi"]);
}

#[test]
fn delete_line_outside_margins_is_ignored() {
    let mut t = term(8, 2);
    t.write(b"ABC123\r\ndefghi").unwrap();
    t.write(b"\x1b[?69h\x1b[2;4s\x1b[1;6H\x1b[M").unwrap();
    assert_eq!(t.lines(), vec!["ABC123", "defghi"]);
}

#[test]
fn insert_then_delete_lines_restores_rows_above_band() {
    let mut t = term(3, 6);
    t.write(b"a\r\nb\r\nc\r\nd\r\ne\r\nf").unwrap();
    t.write(b"\x1b[2;5r\x1b[3;1H\x1b[L\x1b[M").unwrap();
    // Only the region's last row is lost to the round trip
    assert_eq!(t.lines(), vec!["a", "b", "c", "d", "", "f"]);
}

#[test]
fn cup_clamps_to_screen() {
    let mut t = term(10, 5);
    t.write(b"\x1b[100;100H").unwrap();
    assert_eq!(t.cursor_position(), (9, 4));
    t.write(b"\x1b[0;0H").unwrap();
    assert_eq!(t.cursor_position(), (0, 0));
}

// ========== Scrollback ==========

#[test]
fn scrollback_keeps_newest_rows() {
    let mut t = term_with_scrollback(5, 2, 3);
    t.write(b"0\r\n1\r\n2\r\n3\r\n4\r\n5\r\n6\r\n7\r\n8\r\n9").unwrap();
    assert_eq!(t.scrollback_len(), 3);
    assert_eq!(t.scrollback_lines(), vec!["5", "6", "7"]);
    assert_eq!(t.lines(), vec!["8", "9"]);
}

#[test]
fn erase_display_2_and_3_on_scrollback() {
    let mut t = term_with_scrollback(5, 2, 100);
    t.write(b"a\r\nb\r\nc\r\nd").unwrap();
    assert_eq!(t.scrollback_len(), 2);

    t.write(b"\x1b[2J").unwrap();
    assert_eq!(t.scrollback_len(), 2);
    assert_eq!(t.lines(), vec!["", ""]);

    t.write(b"\x1b[3J").unwrap();
    assert_eq!(t.scrollback_len(), 0);
    t.write(b"\x1b[2J\x1b[3J\x1b[2J").unwrap();
    assert_eq!(t.scrollback_len(), 0);
}

#[test]
fn scroll_region_not_captured() {
    let mut t = term_with_scrollback(5, 3, 100);
    t.write(b"a\r\nb\r\nc\x1b[2;3r\x1b[3;1H\n\n").unwrap();
    assert_eq!(t.scrollback_len(), 0);
    assert_eq!(t.lines(), vec!["a", "", ""]);
}

#[test]
fn alternate_screen_has_no_scrollback() {
    let mut t = term_with_scrollback(5, 2, 100);
    t.write(b"main\x1b[?1049h").unwrap();
    t.write(b"x\r\ny\r\nz\r\n").unwrap();
    assert_eq!(t.scrollback_len(), 0);
    t.write(b"\x1b[?1049l").unwrap();
    assert_eq!(t.lines(), vec!["main", ""]);
}

// ========== Wide characters ==========

#[test]
fn wide_char_overwrite_clears_both_halves() {
    let mut t = term(6, 1);
    t.write("中文".as_bytes()).unwrap();
    t.write(b"\x1b[2Gx").unwrap();
    assert_eq!(t.lines(), vec![" x文"]);
    let head = t.cell_at(2, 0).unwrap();
    assert_eq!(head.width, 2);
    assert!(t.cell_at(3, 0).unwrap().is_placeholder());
}

#[test]
fn wide_char_at_right_edge_wraps() {
    let mut t = term(5, 2);
    t.write("abcd中".as_bytes()).unwrap();
    assert_eq!(t.lines(), vec!["abcd", "中"]);
    assert_eq!(t.cursor_position(), (2, 1));
}

// ========== Host input round trips ==========

/// Encoded key bytes act exactly like the literal sequence
#[test]
fn key_encoding_round_trips() {
    let cases: &[(Key, Modifiers, &[u8])] = &[
        (Key::Up, Modifiers::empty(), b"\x1b[A"),
        (Key::Down, Modifiers::empty(), b"\x1b[B"),
        (Key::Right, Modifiers::empty(), b"\x1b[C"),
        (Key::Left, Modifiers::empty(), b"\x1b[D"),
        (Key::Home, Modifiers::empty(), b"\x1b[H"),
        (Key::Tab, Modifiers::empty(), b"\t"),
        (Key::Tab, Modifiers::SHIFT, b"\x1b[Z"),
        (Key::Enter, Modifiers::empty(), b"\r"),
        (Key::Char('x'), Modifiers::empty(), b"x"),
        (Key::Up, Modifiers::CTRL, b"\x1b[1;5A"),
    ];
    for &(key, mods, literal) in cases {
        let mut source = term(20, 5);
        source.send_key(key, mods).unwrap();
        let encoded = host_bytes(&source);
        assert_eq!(encoded, literal.to_vec(), "{:?} {:?}", key, mods);

        let mut via_event = term(20, 5);
        let mut via_literal = term(20, 5);
        for t in [&mut via_event, &mut via_literal] {
            t.write(b"\x1b[3;10H").unwrap();
        }
        via_event.write(&encoded).unwrap();
        via_literal.write(literal).unwrap();
        assert_eq!(via_event.cursor_position(), via_literal.cursor_position());
        assert_eq!(via_event.text(), via_literal.text());
    }
}

#[test]
fn application_cursor_keys_follow_decckm() {
    let mut t = term(10, 2);
    t.write(b"\x1b[?1h").unwrap();
    t.send_key(Key::Up, Modifiers::empty()).unwrap();
    assert_eq!(host_bytes(&t), b"\x1bOA".to_vec());
    t.write(b"\x1b[?1l").unwrap();
    t.send_key(Key::Up, Modifiers::empty()).unwrap();
    assert_eq!(host_bytes(&t), b"\x1b[A".to_vec());
}

#[test]
fn mouse_encoding_round_trips() {
    let mut t = term(10, 5);
    let click = MouseEvent::new(MouseButton::Left, MouseAction::Press, 2, 1);

    // Nothing reported until an application asks for it
    t.send_mouse(click).unwrap();
    assert!(host_bytes(&t).is_empty());

    t.write(b"\x1b[?1000h\x1b[?1006h").unwrap();
    t.send_mouse(click).unwrap();
    let encoded = host_bytes(&t);
    assert_eq!(encoded, b"\x1b[<0;3;2M".to_vec());

    let mut via_event = term(10, 5);
    let mut via_literal = term(10, 5);
    via_event.write(&encoded).unwrap();
    via_literal.write(b"\x1b[<0;3;2M").unwrap();
    assert_eq!(via_event.text(), via_literal.text());
    assert_eq!(via_event.cursor_position(), via_literal.cursor_position());
}

#[test]
fn bracketed_paste_and_focus() {
    let mut t = term(10, 2);
    t.paste("hi").unwrap();
    t.send_focus(true).unwrap();
    assert_eq!(host_bytes(&t), b"hi".to_vec());

    t.write(b"\x1b[?2004h\x1b[?1004h").unwrap();
    t.paste("hi").unwrap();
    t.send_focus(false).unwrap();
    assert_eq!(host_bytes(&t), b"\x1b[200~hi\x1b[201~\x1b[O".to_vec());
}

// ========== Resets and resize ==========

#[test]
fn full_reset_restores_defaults() {
    let mut t = term_with_scrollback(5, 2, 10);
    t.write(b"a\r\nb\r\nc\x1b[?25l\x1b]2;title\x07\x1b[4h").unwrap();
    t.write(b"\x1bc").unwrap();
    assert_eq!(t.lines(), vec!["", ""]);
    assert_eq!(t.scrollback_len(), 0);
    assert!(t.cursor_visible());
    assert_eq!(t.cursor_position(), (0, 0));
    t.write(b"ab\x1b[1Gx").unwrap();
    // Insert mode is off again
    assert_eq!(t.lines(), vec!["xb", ""]);
}

#[test]
fn resize_keeps_overlap_and_clamps_cursor() {
    let mut t = term(10, 4);
    t.write(b"hello\r\nworld\x1b[4;10H").unwrap();
    t.resize(4, 2);
    assert_eq!(t.lines(), vec!["hell", "worl"]);
    assert_eq!(t.cursor_position(), (3, 1));
    t.resize(6, 3);
    assert_eq!(t.lines(), vec!["hell", "worl", ""]);
}

// ========== Host notifications ==========

/// Records every notification except per-cell and rect damage
#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl Callbacks for Recorder {
    fn bell(&mut self) {
        self.push("bell".into());
    }

    fn title(&mut self, title: &str) {
        self.push(format!("title {}", title));
    }

    fn icon_name(&mut self, name: &str) {
        self.push(format!("icon {}", name));
    }

    fn alt_screen(&mut self, active: bool) {
        self.push(format!("alt {}", active));
    }

    fn cursor_position(&mut self, x: usize, y: usize) {
        self.push(format!("cur {} {}", x, y));
    }

    fn cursor_visibility(&mut self, visible: bool) {
        self.push(format!("visible {}", visible));
    }

    fn cursor_style(&mut self, style: CursorStyle, steady: bool) {
        self.push(format!("style {:?} {}", style, steady));
    }

    fn working_directory(&mut self, url: &str) {
        self.push(format!("cwd {}", url));
    }

    fn damage(&mut self, damage: Damage) {
        match damage {
            Damage::Screen => self.push("damage screen".into()),
            Damage::Scroll { rect, dy } => self.push(format!(
                "damage scroll {}..{} {}",
                rect.top, rect.bottom, dy
            )),
            Damage::Cell { .. } | Damage::Rect(_) => {}
        }
    }
}

fn recorded_term(cols: usize, rows: usize) -> (Terminal, Recorder) {
    let mut t = term(cols, rows);
    let recorder = Recorder::default();
    t.set_callbacks(recorder.clone());
    (t, recorder)
}

#[test]
fn cursor_notification_only_on_change() {
    let (mut t, events) = recorded_term(10, 2);
    // Already at the origin: CR, DECRC, CUP home and CHA 1 are no-ops
    t.write(b"\r\x1b8\x1b[H\x1b[1G").unwrap();
    assert_eq!(events.take(), Vec::<String>::new());

    t.write(b"\x1b[2;3H\x1b[2;3H").unwrap();
    assert_eq!(events.take(), vec!["cur 2 1"]);

    // Reverse index moves up; a second one at the top scrolls instead
    t.write(b"\x1bM\x1bM").unwrap();
    assert_eq!(events.take(), vec!["cur 2 0", "damage scroll 0..2 1"]);

    t.write(b"\x1b7\x1b[2;1H\x1b8\x1b8\r\r").unwrap();
    assert_eq!(events.take(), vec!["cur 0 1", "cur 2 0", "cur 0 0"]);
}

#[test]
fn notifications_for_titles_bell_and_cursor_state() {
    let (mut t, events) = recorded_term(10, 3);
    t.write(b"\x07\x1b]0;both\x07\x1b]1;icon\x07\x1b]2;win\x1b\\").unwrap();
    t.write(b"\x1b[?25l\x1b[?25h\x1b[6 q\x1b]7;file://host/tmp\x07").unwrap();
    assert_eq!(
        events.take(),
        vec![
            "bell",
            "icon both",
            "title both",
            "icon icon",
            "title win",
            "visible false",
            "visible true",
            "style Bar true",
            "cwd file://host/tmp",
        ]
    );
}

#[test]
fn notifications_for_alternate_screen_and_scroll() {
    let (mut t, events) = recorded_term(10, 3);
    t.write(b"\x1b[2;3H").unwrap();
    events.take();

    t.write(b"\x1b[?1049h").unwrap();
    assert_eq!(events.take(), vec!["alt true", "damage screen", "cur 2 1"]);

    t.write(b"\x1b[3;1H\n").unwrap();
    assert_eq!(events.take(), vec!["cur 0 2", "damage scroll 0..3 -1"]);

    t.write(b"\x1b[2;3r\x1b[3;1H\n").unwrap();
    let scrolled = events.take();
    assert_eq!(scrolled.last().map(String::as_str), Some("damage scroll 1..3 -1"));

    t.write(b"\x1b[?1049l").unwrap();
    assert_eq!(events.take(), vec!["alt false", "damage screen", "cur 2 1"]);

    // Already on the primary screen: nothing happens
    t.write(b"\x1b[?1049l").unwrap();
    assert_eq!(events.take(), Vec::<String>::new());
}
