//! Cell model
//!
//! A cell holds one grapheme cluster plus the style and hyperlink it was
//! written with. Wide characters occupy a head cell (width 2) followed by a
//! placeholder cell (width 0).

use std::sync::Arc;

use bitflags::bitflags;
use smol_str::SmolStr;

/// Text color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Terminal default (foreground or background depending on use)
    #[default]
    Default,
    /// 256-color palette index
    Indexed(u8),
    /// True Color (24bit RGB)
    Rgb(u8, u8, u8),
}

/// Underline style (CSI 4:x m)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnderlineStyle {
    #[default]
    None,
    /// Single line (CSI 4 m or CSI 4:1 m)
    Single,
    /// Double line (CSI 4:2 m or CSI 21 m)
    Double,
    /// Wavy line (CSI 4:3 m)
    Curly,
    /// Dotted line (CSI 4:4 m)
    Dotted,
    /// Dashed line (CSI 4:5 m)
    Dashed,
}

bitflags! {
    /// Cell character attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellAttrs: u16 {
        const BOLD      = 0b0000_0000_0001;
        const DIM       = 0b0000_0000_0010;
        const ITALIC    = 0b0000_0000_0100;
        const BLINK     = 0b0000_0000_1000;
        const RAPID_BLINK = 0b0000_0001_0000;
        const INVERSE   = 0b0000_0010_0000;
        const HIDDEN    = 0b0000_0100_0000;
        const STRIKE    = 0b0000_1000_0000;
        const OVERLINE  = 0b0001_0000_0000;
    }
}

/// Drawing attributes (the cursor's pen and every cell's style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
    pub underline: UnderlineStyle,
    /// Underline color (CSI 58) - uses foreground color if None
    pub underline_color: Option<Color>,
}

impl Style {
    /// True when nothing differs from the default style
    pub fn is_default(&self) -> bool {
        *self == Style::default()
    }

    /// Encode as an SGR sequence that reproduces this style from a reset pen.
    pub fn to_sgr(&self) -> String {
        format!("\x1b[{}m", self.sgr_params())
    }

    /// SGR parameter list (`0;1;31`) reproducing this style from a reset
    pub fn sgr_params(&self) -> String {
        let mut codes: Vec<String> = vec!["0".to_string()];
        let flags = [
            (CellAttrs::BOLD, "1"),
            (CellAttrs::DIM, "2"),
            (CellAttrs::ITALIC, "3"),
            (CellAttrs::BLINK, "5"),
            (CellAttrs::RAPID_BLINK, "6"),
            (CellAttrs::INVERSE, "7"),
            (CellAttrs::HIDDEN, "8"),
            (CellAttrs::STRIKE, "9"),
            (CellAttrs::OVERLINE, "53"),
        ];
        for (flag, code) in flags {
            if self.attrs.contains(flag) {
                codes.push(code.to_string());
            }
        }
        match self.underline {
            UnderlineStyle::None => {}
            UnderlineStyle::Single => codes.push("4".to_string()),
            UnderlineStyle::Double => codes.push("4:2".to_string()),
            UnderlineStyle::Curly => codes.push("4:3".to_string()),
            UnderlineStyle::Dotted => codes.push("4:4".to_string()),
            UnderlineStyle::Dashed => codes.push("4:5".to_string()),
        }
        push_color(&mut codes, self.fg, 30, 90, 38);
        push_color(&mut codes, self.bg, 40, 100, 48);
        if let Some(color) = self.underline_color {
            match color {
                Color::Default => {}
                Color::Indexed(i) => codes.push(format!("58;5;{}", i)),
                Color::Rgb(r, g, b) => codes.push(format!("58;2;{};{};{}", r, g, b)),
            }
        }
        codes.join(";")
    }
}

fn push_color(codes: &mut Vec<String>, color: Color, base: u8, bright: u8, extended: u8) {
    match color {
        Color::Default => {}
        Color::Indexed(i) if i < 8 => codes.push((base + i).to_string()),
        Color::Indexed(i) if i < 16 => codes.push((bright + i - 8).to_string()),
        Color::Indexed(i) => codes.push(format!("{};5;{}", extended, i)),
        Color::Rgb(r, g, b) => codes.push(format!("{};2;{};{};{}", extended, r, g, b)),
    }
}

/// Hyperlink information (OSC 8)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hyperlink {
    /// Link ID (optional)
    pub id: Option<String>,
    /// URL
    pub url: String,
}

/// Data for one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Grapheme cluster (empty for wide-character placeholders)
    pub content: SmolStr,
    /// Display width: 1=half-width, 2=full-width head, 0=placeholder
    pub width: u8,
    pub style: Style,
    /// Hyperlink (OSC 8)
    pub link: Option<Arc<Hyperlink>>,
}

/// Static space character for default cells
static SPACE: SmolStr = SmolStr::new_inline(" ");
static EMPTY: SmolStr = SmolStr::new_inline("");

impl Cell {
    /// Blank cell (space with default style)
    pub fn blank() -> Cell {
        Cell {
            content: SPACE.clone(),
            width: 1,
            style: Style::default(),
            link: None,
        }
    }

    /// Blank cell carrying a background color (erase with BCE)
    pub fn blank_with_bg(bg: Color) -> Cell {
        let mut cell = Cell::blank();
        cell.style.bg = bg;
        cell
    }

    /// Cell holding a grapheme cluster
    pub fn new(content: &str, width: u8, style: Style, link: Option<Arc<Hyperlink>>) -> Cell {
        Cell {
            content: SmolStr::new(content),
            width,
            style,
            link,
        }
    }

    /// Placeholder following the head of a wide character
    pub fn placeholder(style: Style, link: Option<Arc<Hyperlink>>) -> Cell {
        Cell {
            content: EMPTY.clone(),
            width: 0,
            style,
            link,
        }
    }

    /// Whether this is the trailing half of a wide character
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.width == 0
    }

    /// Whether this is the leading half of a wide character
    #[inline]
    pub fn is_wide(&self) -> bool {
        self.width > 1
    }

    /// Whether the cell shows nothing (space or placeholder, default style)
    pub fn is_blank(&self) -> bool {
        (self.content == " " || self.content.is_empty())
            && self.style.is_default()
            && self.link.is_none()
    }

    /// First character of the cluster (space for placeholders)
    pub fn ch(&self) -> char {
        self.content.chars().next().unwrap_or(' ')
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::blank()
    }
}
