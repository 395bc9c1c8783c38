//! Color table (256 indexed colors plus dynamic colors)

use crate::utils::color::{Rgb, DEFAULT_PALETTE};

/// Dynamic colors addressed by OSC 10/11/12
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicColor {
    Foreground,
    Background,
    Cursor,
}

impl DynamicColor {
    /// OSC command number that sets this color
    pub fn osc_number(self) -> u32 {
        match self {
            DynamicColor::Foreground => 10,
            DynamicColor::Background => 11,
            DynamicColor::Cursor => 12,
        }
    }

    pub fn from_osc(num: u32) -> Option<DynamicColor> {
        match num {
            10 | 110 => Some(DynamicColor::Foreground),
            11 | 111 => Some(DynamicColor::Background),
            12 | 112 => Some(DynamicColor::Cursor),
            _ => None,
        }
    }
}

/// Configured defaults that resets return to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub foreground: Rgb,
    pub background: Rgb,
    pub cursor: Rgb,
    pub palette: [Rgb; 256],
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            foreground: Rgb::new(255, 255, 255),
            background: Rgb::new(0, 0, 0),
            cursor: Rgb::new(255, 255, 255),
            palette: DEFAULT_PALETTE,
        }
    }
}

/// Live colors
#[derive(Debug, Clone)]
pub struct Colors {
    scheme: ColorScheme,
    palette: [Rgb; 256],
    foreground: Rgb,
    background: Rgb,
    cursor: Rgb,
}

impl Colors {
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            palette: scheme.palette,
            foreground: scheme.foreground,
            background: scheme.background,
            cursor: scheme.cursor,
            scheme,
        }
    }

    pub fn get(&self, which: DynamicColor) -> Rgb {
        match which {
            DynamicColor::Foreground => self.foreground,
            DynamicColor::Background => self.background,
            DynamicColor::Cursor => self.cursor,
        }
    }

    pub fn set(&mut self, which: DynamicColor, color: Rgb) {
        match which {
            DynamicColor::Foreground => self.foreground = color,
            DynamicColor::Background => self.background = color,
            DynamicColor::Cursor => self.cursor = color,
        }
    }

    /// Restore the configured default
    pub fn reset(&mut self, which: DynamicColor) {
        let color = match which {
            DynamicColor::Foreground => self.scheme.foreground,
            DynamicColor::Background => self.scheme.background,
            DynamicColor::Cursor => self.scheme.cursor,
        };
        self.set(which, color);
    }

    pub fn indexed(&self, idx: u8) -> Rgb {
        self.palette[idx as usize]
    }

    pub fn set_indexed(&mut self, idx: u8, color: Rgb) {
        self.palette[idx as usize] = color;
    }

    pub fn reset_indexed(&mut self, idx: u8) {
        self.palette[idx as usize] = self.scheme.palette[idx as usize];
    }

    pub fn reset_palette(&mut self) {
        self.palette = self.scheme.palette;
    }

    /// Restore everything (RIS)
    pub fn reset_all(&mut self) {
        *self = Colors::new(self.scheme.clone());
    }
}

impl Default for Colors {
    fn default() -> Self {
        Colors::new(ColorScheme::default())
    }
}
