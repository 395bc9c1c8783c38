//! SGR (Select Graphic Rendition)

use std::iter::Peekable;

use log::trace;

use super::Params;
use crate::terminal::cell::{CellAttrs, Color, Style, UnderlineStyle};

/// Apply an SGR parameter list to a pen. Unknown codes are ignored.
pub fn apply_sgr(pen: &mut Style, params: &Params) {
    // No parameters -> reset
    if params.is_empty() {
        *pen = Style::default();
        return;
    }

    let mut iter = params.iter().peekable();

    while let Some(param) = iter.next() {
        // Colon-separated sub-parameters
        if param.len() > 1 {
            apply_subparams(pen, param);
            continue;
        }

        let code = param.first().copied().unwrap_or(0);
        match code {
            0 => *pen = Style::default(),
            1 => pen.attrs.insert(CellAttrs::BOLD),
            2 => pen.attrs.insert(CellAttrs::DIM),
            3 => pen.attrs.insert(CellAttrs::ITALIC),
            4 => pen.underline = UnderlineStyle::Single,
            5 => pen.attrs.insert(CellAttrs::BLINK),
            6 => pen.attrs.insert(CellAttrs::RAPID_BLINK),
            7 => pen.attrs.insert(CellAttrs::INVERSE),
            8 => pen.attrs.insert(CellAttrs::HIDDEN),
            9 => pen.attrs.insert(CellAttrs::STRIKE),
            21 => pen.underline = UnderlineStyle::Double,
            22 => pen.attrs.remove(CellAttrs::BOLD | CellAttrs::DIM),
            23 => pen.attrs.remove(CellAttrs::ITALIC),
            24 => pen.underline = UnderlineStyle::None,
            25 => pen.attrs.remove(CellAttrs::BLINK | CellAttrs::RAPID_BLINK),
            27 => pen.attrs.remove(CellAttrs::INVERSE),
            28 => pen.attrs.remove(CellAttrs::HIDDEN),
            29 => pen.attrs.remove(CellAttrs::STRIKE),
            30..=37 => pen.fg = Color::Indexed((code - 30) as u8),
            38 => {
                if let Some(color) = parse_extended_color(&mut iter) {
                    pen.fg = color;
                }
            }
            39 => pen.fg = Color::Default,
            40..=47 => pen.bg = Color::Indexed((code - 40) as u8),
            48 => {
                if let Some(color) = parse_extended_color(&mut iter) {
                    pen.bg = color;
                }
            }
            49 => pen.bg = Color::Default,
            53 => pen.attrs.insert(CellAttrs::OVERLINE),
            55 => pen.attrs.remove(CellAttrs::OVERLINE),
            58 => {
                if let Some(color) = parse_extended_color(&mut iter) {
                    pen.underline_color = Some(color);
                }
            }
            59 => pen.underline_color = None,
            90..=97 => pen.fg = Color::Indexed((code - 90 + 8) as u8),
            100..=107 => pen.bg = Color::Indexed((code - 100 + 8) as u8),
            _ => trace!("Unhandled SGR: {}", code),
        }
    }
}

/// `38;5;n` or `38;2;r;g;b`
fn parse_extended_color<'a, I>(iter: &mut Peekable<I>) -> Option<Color>
where
    I: Iterator<Item = &'a [u16]>,
{
    let mode = iter.next()?.first().copied()?;
    match mode {
        5 => {
            let idx = iter.next()?.first().copied()?;
            Some(Color::Indexed(clamp_u8(idx)))
        }
        2 => {
            let r = iter.next()?.first().copied()?;
            let g = iter.next()?.first().copied()?;
            let b = iter.next()?.first().copied()?;
            Some(Color::Rgb(clamp_u8(r), clamp_u8(g), clamp_u8(b)))
        }
        _ => None,
    }
}

/// `4:n`, `38:2:r:g:b`, `38:2:cs:r:g:b`, `38:5:n` (and 48/58)
fn apply_subparams(pen: &mut Style, subparams: &[u16]) {
    match subparams.first().copied() {
        Some(4) => {
            pen.underline = match subparams.get(1).copied().unwrap_or(1) {
                0 => UnderlineStyle::None,
                1 => UnderlineStyle::Single,
                2 => UnderlineStyle::Double,
                3 => UnderlineStyle::Curly,
                4 => UnderlineStyle::Dotted,
                5 => UnderlineStyle::Dashed,
                _ => UnderlineStyle::Single,
            };
        }
        Some(38) => {
            if let Some(color) = parse_colon_color(subparams) {
                pen.fg = color;
            }
        }
        Some(48) => {
            if let Some(color) = parse_colon_color(subparams) {
                pen.bg = color;
            }
        }
        Some(58) => {
            if let Some(color) = parse_colon_color(subparams) {
                pen.underline_color = Some(color);
            }
        }
        _ => trace!("Unhandled SGR sub-parameters: {:?}", subparams),
    }
}

fn parse_colon_color(subparams: &[u16]) -> Option<Color> {
    match subparams.get(1).copied()? {
        5 => Some(Color::Indexed(clamp_u8(subparams.get(2).copied()?))),
        2 => {
            let rgb = match subparams.len() {
                // Leading colorspace id is ignored
                n if n >= 6 => &subparams[3..6],
                5 => &subparams[2..5],
                _ => return None,
            };
            Some(Color::Rgb(clamp_u8(rgb[0]), clamp_u8(rgb[1]), clamp_u8(rgb[2])))
        }
        _ => None,
    }
}

fn clamp_u8(v: u16) -> u8 {
    v.min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(list: &[&[u16]]) -> Params {
        Params(list.iter().map(|p| p.to_vec()).collect())
    }

    fn sgr(list: &[&[u16]]) -> Style {
        let mut pen = Style::default();
        apply_sgr(&mut pen, &params(list));
        pen
    }

    #[test]
    fn test_basic_attributes() {
        let pen = sgr(&[&[1], &[3], &[4], &[31], &[104]]);
        assert!(pen.attrs.contains(CellAttrs::BOLD | CellAttrs::ITALIC));
        assert_eq!(pen.underline, UnderlineStyle::Single);
        assert_eq!(pen.fg, Color::Indexed(1));
        assert_eq!(pen.bg, Color::Indexed(12));
    }

    #[test]
    fn test_reset_and_empty() {
        let mut pen = sgr(&[&[1], &[32]]);
        apply_sgr(&mut pen, &Params::default());
        assert_eq!(pen, Style::default());
        let mut pen = sgr(&[&[7]]);
        apply_sgr(&mut pen, &params(&[&[0]]));
        assert_eq!(pen, Style::default());
    }

    #[test]
    fn test_extended_semicolon_forms() {
        let pen = sgr(&[&[38], &[5], &[196], &[48], &[2], &[1], &[2], &[3]]);
        assert_eq!(pen.fg, Color::Indexed(196));
        assert_eq!(pen.bg, Color::Rgb(1, 2, 3));
    }

    #[test]
    fn test_extended_colon_forms() {
        let pen = sgr(&[&[38, 2, 10, 20, 30], &[48, 2, 0, 4, 5, 6], &[58, 5, 9]]);
        assert_eq!(pen.fg, Color::Rgb(10, 20, 30));
        assert_eq!(pen.bg, Color::Rgb(4, 5, 6));
        assert_eq!(pen.underline_color, Some(Color::Indexed(9)));
    }

    #[test]
    fn test_underline_styles_and_color_reset() {
        let mut pen = sgr(&[&[4, 3], &[58], &[2], &[9], &[8], &[7]]);
        assert_eq!(pen.underline, UnderlineStyle::Curly);
        assert_eq!(pen.underline_color, Some(Color::Rgb(9, 8, 7)));
        apply_sgr(&mut pen, &params(&[&[59], &[24]]));
        assert_eq!(pen.underline_color, None);
        assert_eq!(pen.underline, UnderlineStyle::None);
    }

    #[test]
    fn test_unknown_codes_ignored() {
        let pen = sgr(&[&[1], &[66], &[200], &[32]]);
        assert!(pen.attrs.contains(CellAttrs::BOLD));
        assert_eq!(pen.fg, Color::Indexed(2));
    }

    #[test]
    fn test_truncated_extended_color_is_ignored() {
        let pen = sgr(&[&[38], &[2], &[1]]);
        assert_eq!(pen.fg, Color::Default);
    }

    #[test]
    fn test_roundtrip_through_sgr_params() {
        let pen = sgr(&[&[1], &[4, 2], &[38, 2, 1, 2, 3], &[100], &[58, 5, 17]]);
        let text = pen.sgr_params();
        let reparsed: Vec<Vec<u16>> = text
            .split(';')
            .map(|p| p.split(':').map(|v| v.parse().unwrap()).collect())
            .collect();
        let mut again = Style::default();
        apply_sgr(&mut again, &Params(reparsed));
        assert_eq!(again, pen);
    }
}
