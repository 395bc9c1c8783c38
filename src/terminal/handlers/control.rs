//! C0 and C1 control characters

use super::Registry;
use crate::terminal::emulator::Emulator;

const BEL: u8 = 0x07;
const BS: u8 = 0x08;
const HT: u8 = 0x09;
const LF: u8 = 0x0a;
const VT: u8 = 0x0b;
const FF: u8 = 0x0c;
const CR: u8 = 0x0d;
const SO: u8 = 0x0e;
const SI: u8 = 0x0f;

const IND: u8 = 0x84;
const NEL: u8 = 0x85;
const HTS: u8 = 0x88;
const RI: u8 = 0x8d;
const SS2: u8 = 0x8e;
const SS3: u8 = 0x8f;

pub(super) fn register(reg: &mut Registry<u8, u8>) {
    reg.register(BEL, |emu: &mut Emulator, _: &u8| {
        emu.bell();
        true
    });
    reg.register(BS, |emu: &mut Emulator, _: &u8| {
        emu.backspace();
        true
    });
    reg.register(HT, |emu: &mut Emulator, _: &u8| {
        emu.tab_forward(1);
        true
    });
    for byte in [LF, VT, FF] {
        reg.register(byte, |emu: &mut Emulator, _: &u8| {
            emu.linefeed();
            true
        });
    }
    reg.register(CR, |emu: &mut Emulator, _: &u8| {
        emu.carriage_return();
        true
    });
    // Shift out / shift in: G1 / G0 into GL
    reg.register(SO, |emu: &mut Emulator, _: &u8| {
        emu.charsets_mut().lock_gl(1);
        true
    });
    reg.register(SI, |emu: &mut Emulator, _: &u8| {
        emu.charsets_mut().lock_gl(0);
        true
    });

    // C1
    reg.register(IND, |emu: &mut Emulator, _: &u8| {
        emu.index();
        true
    });
    reg.register(NEL, |emu: &mut Emulator, _: &u8| {
        emu.next_line();
        true
    });
    reg.register(HTS, |emu: &mut Emulator, _: &u8| {
        emu.set_tab_stop();
        true
    });
    reg.register(RI, |emu: &mut Emulator, _: &u8| {
        emu.reverse_index();
        true
    });
    reg.register(SS2, |emu: &mut Emulator, _: &u8| {
        emu.charsets_mut().single_shift(2);
        true
    });
    reg.register(SS3, |emu: &mut Emulator, _: &u8| {
        emu.charsets_mut().single_shift(3);
        true
    });
}

#[cfg(test)]
mod tests {
    use crate::terminal::{Terminal, TerminalOptions};

    fn term(cols: usize, rows: usize) -> Terminal {
        Terminal::new(TerminalOptions {
            cols,
            rows,
            ..TerminalOptions::default()
        })
    }

    #[test]
    fn test_cr_lf_bs() {
        let mut t = term(10, 3);
        t.write(b"abc\r\nd\x08e").unwrap();
        assert_eq!(t.text(), "abc\ne\n");
        assert_eq!(t.cursor_position(), (1, 1));
    }

    #[test]
    fn test_linefeed_newline_mode() {
        let mut t = term(10, 3);
        t.write(b"\x1b[20hab\ncd").unwrap();
        assert_eq!(t.text(), "ab\ncd\n");
    }

    #[test]
    fn test_shift_out_uses_g1() {
        let mut t = term(10, 1);
        t.write(b"\x1b)0\x0eq\x0fq").unwrap();
        assert_eq!(t.text(), "\u{2500}q");
    }

    #[test]
    fn test_c1_controls_via_utf8() {
        let mut t = term(10, 3);
        // NEL encoded as U+0085
        t.write("ab\u{85}c".as_bytes()).unwrap();
        assert_eq!(t.text(), "ab\nc\n");
        assert_eq!(t.cursor_position(), (1, 1));
    }
}
