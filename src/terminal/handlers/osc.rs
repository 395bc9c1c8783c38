//! OSC commands

use log::trace;

use super::{Osc, Registry};
use crate::terminal::cell::Hyperlink;
use crate::terminal::colors::DynamicColor;
use crate::terminal::emulator::Emulator;
use crate::utils::parse_osc_color;

fn reg<F>(reg: &mut Registry<u32, Osc>, command: u32, f: F)
where
    F: Fn(&mut Emulator, &Osc) -> bool + Send + Sync + 'static,
{
    reg.register(command, f);
}

pub(super) fn register(r: &mut Registry<u32, Osc>) {
    // Title and icon name
    reg(r, 0, |emu, osc| match title_text(osc) {
        Some(text) => {
            emu.set_icon_name(text);
            emu.set_title(text);
            true
        }
        None => false,
    });
    reg(r, 1, |emu, osc| match title_text(osc) {
        Some(text) => {
            emu.set_icon_name(text);
            true
        }
        None => false,
    });
    reg(r, 2, |emu, osc| match title_text(osc) {
        Some(text) => {
            emu.set_title(text);
            true
        }
        None => false,
    });

    reg(r, 4, handle_palette);
    reg(r, 104, handle_palette_reset);

    // Current directory: ESC ] 7 ; file://host/path ST
    reg(r, 7, |emu, osc| match osc.payload.as_deref() {
        Some(url) if !url.is_empty() => {
            trace!("OSC 7: current directory = {}", url);
            emu.set_working_directory(url);
            true
        }
        _ => false,
    });

    reg(r, 8, handle_hyperlink);

    for command in [10, 11, 12] {
        reg(r, command, handle_dynamic_color);
    }
    for command in [110, 111, 112] {
        reg(r, command, |emu, osc| match DynamicColor::from_osc(osc.command) {
            Some(which) => {
                emu.colors_mut().reset(which);
                true
            }
            None => false,
        });
    }
}

/// Title payloads are a single field; `2;a;b` is declined
fn title_text(osc: &Osc) -> Option<&str> {
    osc.payload.as_deref().filter(|text| !text.contains(';'))
}

/// ESC ] 8 ; params ; URI ST (empty URI closes the link)
fn handle_hyperlink(emu: &mut Emulator, osc: &Osc) -> bool {
    let Some(payload) = osc.payload.as_deref() else {
        return false;
    };
    let (params, uri) = payload.split_once(';').unwrap_or(("", payload));
    if uri.is_empty() {
        emu.set_hyperlink(None);
        return true;
    }
    let id = params
        .split(':')
        .find_map(|p| p.strip_prefix("id="))
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string());
    emu.set_hyperlink(Some(Hyperlink {
        id,
        url: uri.to_string(),
    }));
    true
}

/// ESC ] 4 ; index ; spec [; index ; spec ...] ST, where spec `?` queries
fn handle_palette(emu: &mut Emulator, osc: &Osc) -> bool {
    let Some(payload) = osc.payload.as_deref() else {
        return false;
    };
    let mut parts = payload.split(';');
    while let (Some(index), Some(spec)) = (parts.next(), parts.next()) {
        let Ok(index) = index.parse::<u8>() else {
            trace!("OSC 4: bad index {:?}", index);
            continue;
        };
        if spec == "?" {
            let color = emu.colors().indexed(index);
            let reply = format!("\x1b]4;{};{}\x1b\\", index, color.to_x11());
            emu.reply_str(&reply);
        } else if let Some(color) = parse_osc_color(spec) {
            emu.colors_mut().set_indexed(index, color);
        } else {
            trace!("OSC 4: bad color {:?}", spec);
        }
    }
    true
}

/// ESC ] 104 [; index ...] ST
fn handle_palette_reset(emu: &mut Emulator, osc: &Osc) -> bool {
    match osc.payload.as_deref() {
        None | Some("") => emu.colors_mut().reset_palette(),
        Some(list) => {
            for index in list.split(';').filter_map(|i| i.parse::<u8>().ok()) {
                emu.colors_mut().reset_indexed(index);
            }
        }
    }
    true
}

/// ESC ] 10 ; spec [; spec ...] ST. Extra specs continue with the next
/// dynamic color (10 -> 11 -> 12).
fn handle_dynamic_color(emu: &mut Emulator, osc: &Osc) -> bool {
    let Some(payload) = osc.payload.as_deref() else {
        return false;
    };
    for (offset, spec) in payload.split(';').enumerate() {
        let Some(which) = DynamicColor::from_osc(osc.command + offset as u32) else {
            break;
        };
        if spec == "?" {
            let color = emu.colors().get(which);
            let reply = format!("\x1b]{};{}\x1b\\", which.osc_number(), color.to_x11());
            emu.reply_str(&reply);
        } else if let Some(color) = parse_osc_color(spec) {
            emu.colors_mut().set(which, color);
        } else {
            trace!("OSC {}: bad color {:?}", which.osc_number(), spec);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use crate::terminal::colors::DynamicColor;
    use crate::terminal::{Terminal, TerminalOptions};
    use crate::utils::{Rgb, DEFAULT_PALETTE};
    use pretty_assertions::assert_eq;

    fn term() -> Terminal {
        Terminal::new(TerminalOptions {
            cols: 10,
            rows: 2,
            ..TerminalOptions::default()
        })
    }

    fn replies(t: &Terminal) -> String {
        String::from_utf8_lossy(&t.reply_reader().try_read_all()).into_owned()
    }

    #[test]
    fn test_title_and_icon() {
        let mut t = term();
        t.write(b"\x1b]0;both\x07").unwrap();
        assert_eq!(t.title(), "both");
        assert_eq!(t.icon_name(), "both");
        // More than one field: declined, title unchanged
        t.write(b"\x1b]2;a;b\x1b\\\x1b]1;icon\x07").unwrap();
        assert_eq!(t.title(), "both");
        assert_eq!(t.icon_name(), "icon");
        t.write(b"\x1b]2;plain\x07").unwrap();
        assert_eq!(t.title(), "plain");
        // No payload: ignored
        t.write(b"\x1b]2\x07").unwrap();
        assert_eq!(t.title(), "plain");
    }

    #[test]
    fn test_dynamic_color_query_and_set() {
        let mut t = term();
        t.write(b"\x1b]10;?\x07").unwrap();
        assert_eq!(replies(&t), "\x1b]10;rgb:ffff/ffff/ffff\x1b\\");
        t.write(b"\x1b]11;#102030\x07\x1b]11;?\x07").unwrap();
        assert_eq!(replies(&t), "\x1b]11;rgb:1010/2020/3030\x1b\\");
        assert_eq!(t.color(DynamicColor::Background), Rgb::new(0x10, 0x20, 0x30));
        t.write(b"\x1b]111\x07").unwrap();
        assert_eq!(t.color(DynamicColor::Background), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_dynamic_color_chain() {
        let mut t = term();
        t.write(b"\x1b]10;#010101;#020202;?\x07").unwrap();
        assert_eq!(t.color(DynamicColor::Foreground), Rgb::new(1, 1, 1));
        assert_eq!(t.color(DynamicColor::Background), Rgb::new(2, 2, 2));
        assert_eq!(replies(&t), "\x1b]12;rgb:ffff/ffff/ffff\x1b\\");
    }

    #[test]
    fn test_palette_set_query_reset() {
        let mut t = term();
        t.write(b"\x1b]4;1;rgb:ff/00/00;2;?\x07").unwrap();
        assert_eq!(t.indexed_color(1), Rgb::new(0xff, 0, 0));
        assert_eq!(
            replies(&t),
            format!("\x1b]4;2;{}\x1b\\", DEFAULT_PALETTE[2].to_x11())
        );
        t.write(b"\x1b]104;1\x07").unwrap();
        assert_eq!(t.indexed_color(1), DEFAULT_PALETTE[1]);
    }

    #[test]
    fn test_hyperlink_applies_to_printed_cells() {
        let mut t = term();
        t.write(b"\x1b]8;id=x1;https://example.com\x1b\\ab\x1b]8;;\x1b\\c").unwrap();
        let a = t.cell_at(0, 0).unwrap_or_default();
        let link = a.link.expect("link on first cell");
        assert_eq!(link.url, "https://example.com");
        assert_eq!(link.id.as_deref(), Some("x1"));
        assert!(t.cell_at(2, 0).unwrap_or_default().link.is_none());
    }

    #[test]
    fn test_working_directory() {
        let mut t = term();
        t.write(b"\x1b]7;file://host/tmp\x07").unwrap();
        assert_eq!(t.emulator().working_directory(), Some("file://host/tmp"));
    }
}
