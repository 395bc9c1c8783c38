//! DCS requests: XTGETTCAP and DECRQSS

use log::trace;

use super::{CsiKey, Dcs, Registry};
use crate::constants::TERM_NAME;
use crate::terminal::emulator::Emulator;

pub(super) fn register(r: &mut Registry<CsiKey, Dcs>) {
    r.register(
        CsiKey::intermediate(b'+', b'q'),
        |emu: &mut Emulator, dcs: &Dcs| handle_xtgettcap(emu, &dcs.data),
    );
    r.register(
        CsiKey::intermediate(b'$', b'q'),
        |emu: &mut Emulator, dcs: &Dcs| handle_decrqss(emu, &dcs.data),
    );
}

/// XTGETTCAP (DCS + q Pt ST)
/// Pt is a `;`-separated list of hex-encoded capability names.
/// Reply: DCS 1 + r Pt = Pv ST when known, DCS 0 + r Pt ST otherwise.
fn handle_xtgettcap(emu: &mut Emulator, data: &[u8]) -> bool {
    let query = String::from_utf8_lossy(data);
    trace!("XTGETTCAP: query={}", query);

    let mut response = Vec::new();
    for hex_cap in query.split(';').filter(|c| !c.is_empty()) {
        let name = hex_decode(hex_cap.as_bytes());
        let name = String::from_utf8_lossy(&name);
        match termcap_value(&name) {
            Some(value) => {
                response.extend_from_slice(b"\x1bP1+r");
                response.extend_from_slice(hex_cap.as_bytes());
                response.push(b'=');
                response.extend_from_slice(&hex_encode(value.as_bytes()));
                response.extend_from_slice(b"\x1b\\");
            }
            None => {
                trace!("XTGETTCAP: unknown capability: {}", name);
                response.extend_from_slice(b"\x1bP0+r");
                response.extend_from_slice(hex_cap.as_bytes());
                response.extend_from_slice(b"\x1b\\");
            }
        }
    }
    if response.is_empty() {
        return false;
    }
    emu.reply(&response);
    true
}

fn termcap_value(cap: &str) -> Option<&'static str> {
    let value = match cap {
        "TN" | "name" => TERM_NAME,
        "Co" | "colors" => "256",
        "RGB" => "8/8/8",
        "Tc" => "",
        "Smulx" => "\x1b[4:%p1%dm",
        "Setulc" => "\x1b[58:2::%p1%{65536}%/%d:%p1%{256}%/%{255}%&%d:%p1%{255}%&%d%;m",
        "Ss" => "\x1b[%p1%d q",
        "Se" => "\x1b[2 q",
        "BE" => "\x1b[?2004h",
        "BD" => "\x1b[?2004l",
        "PS" => "\x1b[200~",
        "PE" => "\x1b[201~",
        "fe" => "\x1b[?1004h",
        "fd" => "\x1b[?1004l",
        "kxIN" => "\x1b[I",
        "kxOUT" => "\x1b[O",
        _ => return None,
    };
    Some(value)
}

/// DECRQSS (DCS $ q Pt ST) for SGR, DECSTBM, DECSLRM and DECSCUSR.
/// Reply: DCS 1 $ r Pt ST when valid, DCS 0 $ r ST otherwise.
fn handle_decrqss(emu: &mut Emulator, data: &[u8]) -> bool {
    let screen = emu.screen();
    let rect = screen.scroll_rect();
    let setting = match data {
        b"m" => Some(format!("{}m", emu.pen().sgr_params())),
        b"r" => Some(format!("{};{}r", rect.top + 1, rect.bottom)),
        b"s" => Some(format!("{};{}s", rect.left + 1, rect.right)),
        b" q" => {
            let cursor = &screen.cursor;
            Some(format!("{} q", cursor.style.to_decscusr(cursor.steady)))
        }
        _ => None,
    };
    let reply = match setting {
        Some(setting) => format!("\x1bP1$r{}\x1b\\", setting),
        None => {
            trace!("DECRQSS: unsupported {:?}", String::from_utf8_lossy(data));
            "\x1bP0$r\x1b\\".to_string()
        }
    };
    emu.reply_str(&reply);
    true
}

// ========== Hex encode/decode ==========

fn hex_encode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len() * 2);
    for &byte in input {
        output.push(b"0123456789ABCDEF"[(byte >> 4) as usize]);
        output.push(b"0123456789ABCDEF"[(byte & 0x0F) as usize]);
    }
    output
}

fn hex_decode(input: &[u8]) -> Vec<u8> {
    fn nibble(c: u8) -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'A'..=b'F' => Some(c - b'A' + 10),
            b'a'..=b'f' => Some(c - b'a' + 10),
            _ => None,
        }
    }
    input
        .chunks_exact(2)
        .filter_map(|pair| Some((nibble(pair[0])? << 4) | nibble(pair[1])?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::{Terminal, TerminalOptions};
    use pretty_assertions::assert_eq;

    fn term() -> Terminal {
        Terminal::new(TerminalOptions {
            cols: 10,
            rows: 5,
            ..TerminalOptions::default()
        })
    }

    fn replies(t: &Terminal) -> String {
        String::from_utf8_lossy(&t.reply_reader().try_read_all()).into_owned()
    }

    #[test]
    fn test_hex_roundtrip() {
        assert_eq!(hex_encode(b"TN"), b"544E".to_vec());
        assert_eq!(hex_decode(b"544e"), b"TN".to_vec());
        assert_eq!(hex_decode(b"5G4E"), b"N".to_vec());
    }

    #[test]
    fn test_xtgettcap() {
        let mut t = term();
        t.write(b"\x1bP+q544E;787878\x1b\\").unwrap();
        let expected = format!(
            "\x1bP1+r544E={}\x1b\\\x1bP0+r787878\x1b\\",
            String::from_utf8_lossy(&hex_encode(TERM_NAME.as_bytes()))
        );
        assert_eq!(replies(&t), expected);
    }

    #[test]
    fn test_decrqss_sgr_and_margins() {
        let mut t = term();
        t.write(b"\x1b[1;31m\x1bP$qm\x1b\\").unwrap();
        assert_eq!(replies(&t), "\x1bP1$r0;1;31m\x1b\\");
        t.write(b"\x1b[2;4r\x1bP$qr\x1b\\").unwrap();
        assert_eq!(replies(&t), "\x1bP1$r2;4r\x1b\\");
        t.write(b"\x1bP$qs\x1b\\").unwrap();
        assert_eq!(replies(&t), "\x1bP1$r1;10s\x1b\\");
    }

    #[test]
    fn test_decrqss_cursor_style_and_invalid() {
        let mut t = term();
        t.write(b"\x1b[4 q\x1bP$q q\x1b\\\x1bP$qz\x1b\\").unwrap();
        assert_eq!(replies(&t), "\x1bP1$r4 q\x1b\\\x1bP0$r\x1b\\");
    }
}
