//! Color parsing and formatting utilities
//!
//! Shared by the configuration layer and the OSC color handlers.

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// X11 form used in OSC replies: `rgb:rrrr/gggg/bbbb`
    pub fn to_x11(self) -> String {
        format!(
            "rgb:{:04x}/{:04x}/{:04x}",
            self.r as u16 * 257,
            self.g as u16 * 257,
            self.b as u16 * 257
        )
    }

    /// `RRGGBB` hex form used in config files
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Default 256-color palette (xterm values, compile-time generated)
const fn generate_palette() -> [Rgb; 256] {
    let mut palette = [Rgb::new(0, 0, 0); 256];

    // Helper for 6x6x6 color cube value
    const fn cube_val(v: u8) -> u8 {
        if v == 0 { 0 } else { 55 + 40 * v }
    }

    // Standard 16 colors (ANSI)
    palette[0] = Rgb::new(0, 0, 0);          // black
    palette[1] = Rgb::new(205, 0, 0);        // red
    palette[2] = Rgb::new(0, 205, 0);        // green
    palette[3] = Rgb::new(205, 205, 0);      // yellow
    palette[4] = Rgb::new(0, 0, 238);        // blue
    palette[5] = Rgb::new(205, 0, 205);      // magenta
    palette[6] = Rgb::new(0, 205, 205);      // cyan
    palette[7] = Rgb::new(229, 229, 229);    // white
    palette[8] = Rgb::new(127, 127, 127);    // bright black
    palette[9] = Rgb::new(255, 0, 0);        // bright red
    palette[10] = Rgb::new(0, 255, 0);       // bright green
    palette[11] = Rgb::new(255, 255, 0);     // bright yellow
    palette[12] = Rgb::new(92, 92, 255);     // bright blue
    palette[13] = Rgb::new(255, 0, 255);     // bright magenta
    palette[14] = Rgb::new(0, 255, 255);     // bright cyan
    palette[15] = Rgb::new(255, 255, 255);   // bright white

    // 216-color cube (16-231)
    let mut i = 16usize;
    while i < 232 {
        let n = (i - 16) as u8;
        palette[i] = Rgb::new(cube_val(n / 36), cube_val((n / 6) % 6), cube_val(n % 6));
        i += 1;
    }

    // Grayscale (232-255)
    let mut i = 232usize;
    while i < 256 {
        let v = (8 + 10 * (i - 232)) as u8;
        palette[i] = Rgb::new(v, v, v);
        i += 1;
    }

    palette
}

pub static DEFAULT_PALETTE: [Rgb; 256] = generate_palette();

/// Parse 6-digit hex color (e.g., "ff0000")
/// Also supports 3-digit short format (e.g., "f00")
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb::new(r, g, b))
        }
        3 => {
            // Short format: expand F -> FF
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(Rgb::new(r, g, b))
        }
        _ => None,
    }
}

/// Parse OSC color specification formats.
///
/// Supported formats:
/// - rgb:R/G/B with 1-4 hex digits per component (X11 format)
/// - #RRGGBB and #RGB
pub fn parse_osc_color(s: &str) -> Option<Rgb> {
    if let Some(hex) = s.strip_prefix('#') {
        parse_hex_color(hex)
    } else if let Some(rgb) = s.strip_prefix("rgb:") {
        let parts: Vec<&str> = rgb.split('/').collect();
        if parts.len() != 3 {
            return None;
        }

        // Scale every component width to 8 bits
        let parse_component = |s: &str| -> Option<u8> {
            let v = u16::from_str_radix(s, 16).ok()?;
            match s.len() {
                4 => Some((v >> 8) as u8),
                3 => Some((v >> 4) as u8),
                2 => Some(v as u8),
                1 => Some((v as u8) * 17),
                _ => None,
            }
        };

        Some(Rgb::new(
            parse_component(parts[0])?,
            parse_component(parts[1])?,
            parse_component(parts[2])?,
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("ff0000"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_hex_color("#00ff00"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(parse_hex_color("f00"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_hex_color("invalid"), None);
        assert_eq!(parse_hex_color("ééé"), None);
    }

    #[test]
    fn test_parse_osc_color() {
        assert_eq!(parse_osc_color("#ff0000"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_osc_color("rgb:ff/00/00"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_osc_color("rgb:ffff/0000/8080"), Some(Rgb::new(255, 0, 128)));
        assert_eq!(parse_osc_color("rgb:f/0/0"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(parse_osc_color("rgb:ff/00"), None);
        assert_eq!(parse_osc_color("red"), None);
    }

    #[test]
    fn test_x11_format() {
        assert_eq!(Rgb::new(255, 0, 128).to_x11(), "rgb:ffff/0000/8080");
        assert_eq!(Rgb::new(0x12, 0x34, 0x56).to_hex(), "123456");
    }

    #[test]
    fn test_default_palette() {
        assert_eq!(DEFAULT_PALETTE[1], Rgb::new(205, 0, 0));
        assert_eq!(DEFAULT_PALETTE[16], Rgb::new(0, 0, 0));
        assert_eq!(DEFAULT_PALETTE[231], Rgb::new(255, 255, 255));
        assert_eq!(DEFAULT_PALETTE[255], Rgb::new(238, 238, 238));
    }
}
