//! ESC sequences

use super::{Esc, Registry};
use crate::terminal::charset::Charset;
use crate::terminal::emulator::Emulator;
use crate::terminal::modes::Mode;

fn reg<F>(reg: &mut Registry<Esc, Esc>, key: Esc, f: F)
where
    F: Fn(&mut Emulator, &Esc) -> bool + Send + Sync + 'static,
{
    reg.register(key, f);
}

pub(super) fn register(r: &mut Registry<Esc, Esc>) {
    // DECSC / DECRC
    reg(r, Esc::plain(b'7'), |emu, _| {
        emu.save_cursor();
        true
    });
    reg(r, Esc::plain(b'8'), |emu, _| {
        emu.restore_cursor();
        true
    });
    // IND / NEL / HTS / RI
    reg(r, Esc::plain(b'D'), |emu, _| {
        emu.index();
        true
    });
    reg(r, Esc::plain(b'E'), |emu, _| {
        emu.next_line();
        true
    });
    reg(r, Esc::plain(b'H'), |emu, _| {
        emu.set_tab_stop();
        true
    });
    reg(r, Esc::plain(b'M'), |emu, _| {
        emu.reverse_index();
        true
    });
    // RIS
    reg(r, Esc::plain(b'c'), |emu, _| {
        emu.reset();
        true
    });
    // DECKPAM / DECKPNM
    reg(r, Esc::plain(b'='), |emu, _| emu.set_mode(Mode::Dec(66), true));
    reg(r, Esc::plain(b'>'), |emu, _| emu.set_mode(Mode::Dec(66), false));

    // ========== Character sets ==========

    // SS2 / SS3
    reg(r, Esc::plain(b'N'), |emu, _| {
        emu.charsets_mut().single_shift(2);
        true
    });
    reg(r, Esc::plain(b'O'), |emu, _| {
        emu.charsets_mut().single_shift(3);
        true
    });
    // LS2 / LS3 into GL
    reg(r, Esc::plain(b'n'), |emu, _| {
        emu.charsets_mut().lock_gl(2);
        true
    });
    reg(r, Esc::plain(b'o'), |emu, _| {
        emu.charsets_mut().lock_gl(3);
        true
    });
    // LS1R / LS2R / LS3R into GR
    for (final_byte, slot) in [(b'~', 1), (b'}', 2), (b'|', 3)] {
        reg(r, Esc::plain(final_byte), move |emu, _| {
            emu.charsets_mut().lock_gr(slot);
            true
        });
    }
    // SCS: designate G0..G3
    for (slot, intermediate) in [b'(', b')', b'*', b'+'].into_iter().enumerate() {
        for final_byte in [b'B', b'0', b'A'] {
            reg(r, Esc::new(intermediate, final_byte), move |emu, esc| {
                match Charset::from_final(esc.final_byte) {
                    Some(charset) => {
                        emu.charsets_mut().designate(slot, charset);
                        true
                    }
                    None => false,
                }
            });
        }
    }

    // DECALN
    reg(r, Esc::new(b'#', b'8'), |emu, _| {
        emu.screen_alignment();
        true
    });
}

#[cfg(test)]
mod tests {
    use crate::terminal::{Terminal, TerminalOptions};
    use pretty_assertions::assert_eq;

    fn term(cols: usize, rows: usize) -> Terminal {
        Terminal::new(TerminalOptions {
            cols,
            rows,
            ..TerminalOptions::default()
        })
    }

    #[test]
    fn test_save_restore_cursor_and_pen() {
        let mut t = term(10, 5);
        t.write(b"\x1b[3;4H\x1b[1m\x1b7\x1b[H\x1b[0m\x1b8x").unwrap();
        assert_eq!(t.cursor_position(), (4, 2));
        let cell = t.cell_at(3, 2).unwrap_or_default();
        assert!(cell
            .style
            .attrs
            .contains(crate::terminal::cell::CellAttrs::BOLD));
    }

    #[test]
    fn test_reverse_index_scrolls_at_top() {
        let mut t = term(3, 3);
        t.write(b"a\r\nb\x1b[H\x1bM").unwrap();
        assert_eq!(t.lines(), vec!["", "a", "b"]);
    }

    #[test]
    fn test_dec_special_graphics() {
        let mut t = term(10, 1);
        t.write(b"\x1b(0lqk\x1b(Bx").unwrap();
        assert_eq!(t.text(), "\u{250c}\u{2500}\u{2510}x");
    }

    #[test]
    fn test_uk_charset_and_single_shift() {
        let mut t = term(10, 1);
        t.write(b"\x1b*A\x1bN#\x1b(A#").unwrap();
        assert_eq!(t.text(), "\u{a3}\u{a3}");
    }

    #[test]
    fn test_decaln_fills_screen() {
        let mut t = term(3, 2);
        t.write(b"\x1b[2;2H\x1b#8").unwrap();
        assert_eq!(t.lines(), vec!["EEE", "EEE"]);
        assert_eq!(t.cursor_position(), (0, 0));
    }

    #[test]
    fn test_keypad_mode() {
        let mut t = term(3, 2);
        t.write(b"\x1b=").unwrap();
        assert!(t.emulator().modes().application_keypad());
        t.write(b"\x1b>").unwrap();
        assert!(!t.emulator().modes().application_keypad());
    }

    #[test]
    fn test_ris_clears_scrollback() {
        let mut t = term(3, 2);
        t.write(b"a\r\nb\r\nc\r\nd").unwrap();
        assert_eq!(t.scrollback_len(), 2);
        t.write(b"\x1bc").unwrap();
        assert_eq!(t.scrollback_len(), 0);
        assert_eq!(t.lines(), vec!["", ""]);
    }
}
