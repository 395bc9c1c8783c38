//! CSI sequences

use log::trace;

use super::{apply_sgr, Csi, CsiKey, Registry};
use crate::constants::{DA1_RESPONSE, DA2_RESPONSE, DSR_OK_RESPONSE};
use crate::terminal::cursor::CursorStyle;
use crate::terminal::emulator::Emulator;
use crate::terminal::modes::Mode;

/// Count parameter (zero or missing -> 1)
fn count(csi: &Csi, idx: usize) -> usize {
    csi.params.get(idx, 1) as usize
}

/// 1-based coordinate parameter converted to 0-based
fn coord(csi: &Csi, idx: usize) -> usize {
    count(csi, idx) - 1
}

fn reg<F>(reg: &mut Registry<CsiKey, Csi>, key: CsiKey, f: F)
where
    F: Fn(&mut Emulator, &Csi) -> bool + Send + Sync + 'static,
{
    reg.register(key, f);
}

pub(super) fn register(r: &mut Registry<CsiKey, Csi>) {
    // ========== Cursor movement ==========

    // CUU
    reg(r, CsiKey::plain(b'A'), |emu, csi| {
        emu.move_cursor(0, -(count(csi, 0) as isize));
        true
    });
    // CUD
    reg(r, CsiKey::plain(b'B'), |emu, csi| {
        emu.move_cursor(0, count(csi, 0) as isize);
        true
    });
    // CUF
    reg(r, CsiKey::plain(b'C'), |emu, csi| {
        emu.move_cursor(count(csi, 0) as isize, 0);
        true
    });
    // CUB
    reg(r, CsiKey::plain(b'D'), |emu, csi| {
        emu.move_cursor(-(count(csi, 0) as isize), 0);
        true
    });
    // CNL
    reg(r, CsiKey::plain(b'E'), |emu, csi| {
        emu.move_cursor(0, count(csi, 0) as isize);
        emu.carriage_return();
        true
    });
    // CPL
    reg(r, CsiKey::plain(b'F'), |emu, csi| {
        emu.move_cursor(0, -(count(csi, 0) as isize));
        emu.carriage_return();
        true
    });
    // CHA and HPA
    for final_byte in [b'G', b'`'] {
        reg(r, CsiKey::plain(final_byte), |emu, csi| {
            emu.goto_col(coord(csi, 0));
            true
        });
    }
    // CUP and HVP
    for final_byte in [b'H', b'f'] {
        reg(r, CsiKey::plain(final_byte), |emu, csi| {
            emu.goto(coord(csi, 1), coord(csi, 0));
            true
        });
    }
    // VPA
    reg(r, CsiKey::plain(b'd'), |emu, csi| {
        emu.goto_row(coord(csi, 0));
        true
    });
    // HPR
    reg(r, CsiKey::plain(b'a'), |emu, csi| {
        emu.move_cursor(count(csi, 0) as isize, 0);
        true
    });
    // VPR
    reg(r, CsiKey::plain(b'e'), |emu, csi| {
        emu.move_cursor(0, count(csi, 0) as isize);
        true
    });

    // ========== Tabs ==========

    // CHT
    reg(r, CsiKey::plain(b'I'), |emu, csi| {
        emu.tab_forward(count(csi, 0));
        true
    });
    // CBT
    reg(r, CsiKey::plain(b'Z'), |emu, csi| {
        emu.tab_backward(count(csi, 0));
        true
    });
    // TBC
    reg(r, CsiKey::plain(b'g'), |emu, csi| {
        emu.clear_tab_stop(csi.params.raw(0).unwrap_or(0))
    });

    // ========== Erase / edit ==========

    // ED and DECSED
    for marker in [0, b'?'] {
        reg(r, CsiKey::private(marker, b'J'), |emu, csi| {
            emu.erase_display(csi.params.raw(0).unwrap_or(0))
        });
    }
    // EL and DECSEL
    for marker in [0, b'?'] {
        reg(r, CsiKey::private(marker, b'K'), |emu, csi| {
            emu.erase_line(csi.params.raw(0).unwrap_or(0))
        });
    }
    // IL
    reg(r, CsiKey::plain(b'L'), |emu, csi| {
        emu.insert_lines(count(csi, 0));
        true
    });
    // DL
    reg(r, CsiKey::plain(b'M'), |emu, csi| {
        emu.delete_lines(count(csi, 0));
        true
    });
    // ICH
    reg(r, CsiKey::plain(b'@'), |emu, csi| {
        emu.insert_chars(count(csi, 0));
        true
    });
    // DCH
    reg(r, CsiKey::plain(b'P'), |emu, csi| {
        emu.delete_chars(count(csi, 0));
        true
    });
    // ECH
    reg(r, CsiKey::plain(b'X'), |emu, csi| {
        emu.erase_chars(count(csi, 0));
        true
    });
    // SU
    reg(r, CsiKey::plain(b'S'), |emu, csi| {
        emu.scroll_up(count(csi, 0));
        true
    });
    // SD
    reg(r, CsiKey::plain(b'T'), |emu, csi| {
        emu.scroll_down(count(csi, 0));
        true
    });
    // REP
    reg(r, CsiKey::plain(b'b'), |emu, csi| {
        emu.repeat_last(count(csi, 0));
        true
    });

    // ========== Attributes ==========

    // SGR
    reg(r, CsiKey::plain(b'm'), |emu, csi| {
        apply_sgr(emu.pen_mut(), &csi.params);
        true
    });
    // DECSCUSR
    reg(r, CsiKey::intermediate(b' ', b'q'), |emu, csi| {
        match CursorStyle::from_decscusr(csi.params.raw(0).unwrap_or(0)) {
            Some((style, steady)) => {
                emu.set_cursor_style(style, steady);
                true
            }
            None => false,
        }
    });

    // ========== Modes ==========

    // SM / RM
    for (final_byte, on) in [(b'h', true), (b'l', false)] {
        reg(r, CsiKey::plain(final_byte), move |emu, csi| {
            set_modes(emu, csi, Mode::Ansi, on)
        });
        reg(r, CsiKey::private(b'?', final_byte), move |emu, csi| {
            set_modes(emu, csi, Mode::Dec, on)
        });
    }
    // DECRQM
    reg(r, CsiKey::intermediate(b'$', b'p'), |emu, csi| {
        report_mode(emu, csi, Mode::Ansi, "")
    });
    reg(r, CsiKey::new(b'?', b'$', b'p'), |emu, csi| {
        report_mode(emu, csi, Mode::Dec, "?")
    });
    // DECSTR
    reg(r, CsiKey::intermediate(b'!', b'p'), |emu, _| {
        emu.soft_reset();
        true
    });

    // ========== Margins / save & restore ==========

    // DECSTBM
    reg(r, CsiKey::plain(b'r'), |emu, csi| {
        let height = emu.height();
        let top = coord(csi, 0);
        let bottom = (csi.params.get(1, height as u16) as usize).min(height) - 1;
        emu.set_vertical_margins(top, bottom)
    });
    // SCOSC, then DECSLRM which takes precedence while DECLRMM is set
    reg(r, CsiKey::plain(b's'), |emu, _| {
        emu.save_cursor();
        true
    });
    reg(r, CsiKey::plain(b's'), |emu, csi| {
        if !emu.modes().left_right_margins() {
            return false;
        }
        let width = emu.width();
        let left = coord(csi, 0);
        let right = (csi.params.get(1, width as u16) as usize).min(width) - 1;
        if !emu.set_horizontal_margins(left, right) {
            trace!("DECSLRM rejected: {}..{}", left, right);
        }
        true
    });
    // SCORC
    reg(r, CsiKey::plain(b'u'), |emu, _| {
        emu.restore_cursor();
        true
    });

    // ========== Reports ==========

    // DA1
    reg(r, CsiKey::plain(b'c'), |emu, csi| {
        if csi.params.raw(0).unwrap_or(0) != 0 {
            return false;
        }
        emu.reply_str(DA1_RESPONSE);
        true
    });
    // DA2
    reg(r, CsiKey::private(b'>', b'c'), |emu, csi| {
        if csi.params.raw(0).unwrap_or(0) != 0 {
            return false;
        }
        emu.reply_str(DA2_RESPONSE);
        true
    });
    // DSR
    reg(r, CsiKey::plain(b'n'), |emu, csi| match csi.params.raw(0) {
        Some(5) => {
            emu.reply_str(DSR_OK_RESPONSE);
            true
        }
        Some(6) => {
            emu.report_cursor_position(false);
            true
        }
        _ => false,
    });
    // DECXCPR
    reg(r, CsiKey::private(b'?', b'n'), |emu, csi| match csi.params.raw(0) {
        Some(6) => {
            emu.report_cursor_position(true);
            true
        }
        _ => false,
    });
    // XTWINOPS: text area size in characters
    reg(r, CsiKey::plain(b't'), |emu, csi| match csi.params.raw(0) {
        Some(18) => {
            let report = format!("\x1b[8;{};{}t", emu.height(), emu.width());
            emu.reply_str(&report);
            true
        }
        _ => false,
    });
}

fn set_modes(emu: &mut Emulator, csi: &Csi, kind: fn(u16) -> Mode, on: bool) -> bool {
    let mut recognized = false;
    for param in csi.params.iter() {
        if let Some(&n) = param.first() {
            recognized |= emu.set_mode(kind(n), on);
        }
    }
    recognized
}

fn report_mode(emu: &mut Emulator, csi: &Csi, kind: fn(u16) -> Mode, marker: &str) -> bool {
    let Some(n) = csi.params.raw(0) else {
        return false;
    };
    let value = emu.mode_state(kind(n)).report_value();
    let report = format!("\x1b[{}{};{}$y", marker, n, value);
    emu.reply_str(&report);
    true
}
