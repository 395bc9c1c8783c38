//! Configuration file management
//!
//! Loads TOML configuration files and provides terminal settings.
//! Default config path: ~/.config/vtmodel/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_MAX_DCS_PAYLOAD, DEFAULT_REPLY_BUFFER, DEFAULT_SCROLLBACK, DEFAULT_TAB_WIDTH,
};
use crate::terminal::colors::ColorScheme;
use crate::terminal::TerminalOptions;
use crate::utils::{parse_hex_color, Rgb, DEFAULT_PALETTE};

/// Environment variable overriding the config location
pub const CONFIG_ENV: &str = "VTMODEL_CONFIG";

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Terminal settings
    pub terminal: TerminalConfig,
    /// Color scheme settings
    pub colors: ColorsConfig,
}

/// Terminal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Scrollback line count (0 disables history)
    pub scrollback_lines: usize,
    /// Default tab stop interval
    pub tab_width: usize,
    /// Host-bound reply pipe capacity in bytes
    pub reply_buffer_size: usize,
    /// Largest DCS payload kept, in bytes
    pub max_dcs_payload: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            scrollback_lines: DEFAULT_SCROLLBACK,
            tab_width: DEFAULT_TAB_WIDTH,
            reply_buffer_size: DEFAULT_REPLY_BUFFER,
            max_dcs_payload: DEFAULT_MAX_DCS_PAYLOAD,
        }
    }
}

/// Color scheme settings
/// Colors are specified as RRGGBB hex strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub foreground: String,
    pub background: String,
    pub cursor: String,
    /// Color 0: Black
    pub black: String,
    /// Color 1: Red
    pub red: String,
    /// Color 2: Green
    pub green: String,
    /// Color 3: Yellow
    pub yellow: String,
    /// Color 4: Blue
    pub blue: String,
    /// Color 5: Magenta
    pub magenta: String,
    /// Color 6: Cyan
    pub cyan: String,
    /// Color 7: White
    pub white: String,
    /// Color 8: Bright Black (Gray)
    pub bright_black: String,
    /// Color 9: Bright Red
    pub bright_red: String,
    /// Color 10: Bright Green
    pub bright_green: String,
    /// Color 11: Bright Yellow
    pub bright_yellow: String,
    /// Color 12: Bright Blue
    pub bright_blue: String,
    /// Color 13: Bright Magenta
    pub bright_magenta: String,
    /// Color 14: Bright Cyan
    pub bright_cyan: String,
    /// Color 15: Bright White
    pub bright_white: String,
}

/// xterm defaults, matching the built-in palette
impl Default for ColorsConfig {
    fn default() -> Self {
        let scheme = ColorScheme::default();
        let ansi = |i: usize| DEFAULT_PALETTE[i].to_hex();
        Self {
            foreground: scheme.foreground.to_hex(),
            background: scheme.background.to_hex(),
            cursor: scheme.cursor.to_hex(),
            black: ansi(0),
            red: ansi(1),
            green: ansi(2),
            yellow: ansi(3),
            blue: ansi(4),
            magenta: ansi(5),
            cyan: ansi(6),
            white: ansi(7),
            bright_black: ansi(8),
            bright_red: ansi(9),
            bright_green: ansi(10),
            bright_yellow: ansi(11),
            bright_blue: ansi(12),
            bright_magenta: ansi(13),
            bright_cyan: ansi(14),
            bright_white: ansi(15),
        }
    }
}

impl ColorsConfig {
    /// Parse one entry, falling back (with a warning) on malformed values
    fn parse_color(name: &str, hex: &str, fallback: Rgb) -> Rgb {
        parse_hex_color(hex).unwrap_or_else(|| {
            warn!("Invalid color for {}: {:?}, using {}", name, hex, fallback.to_hex());
            fallback
        })
    }

    fn ansi(&self) -> [(&'static str, &str); 16] {
        [
            ("black", self.black.as_str()),
            ("red", self.red.as_str()),
            ("green", self.green.as_str()),
            ("yellow", self.yellow.as_str()),
            ("blue", self.blue.as_str()),
            ("magenta", self.magenta.as_str()),
            ("cyan", self.cyan.as_str()),
            ("white", self.white.as_str()),
            ("bright_black", self.bright_black.as_str()),
            ("bright_red", self.bright_red.as_str()),
            ("bright_green", self.bright_green.as_str()),
            ("bright_yellow", self.bright_yellow.as_str()),
            ("bright_blue", self.bright_blue.as_str()),
            ("bright_magenta", self.bright_magenta.as_str()),
            ("bright_cyan", self.bright_cyan.as_str()),
            ("bright_white", self.bright_white.as_str()),
        ]
    }

    /// Build the emulator's color scheme. Indices 16-255 keep their
    /// built-in values.
    pub fn to_scheme(&self) -> ColorScheme {
        let defaults = ColorScheme::default();
        let mut palette = DEFAULT_PALETTE;
        for (i, (name, hex)) in self.ansi().into_iter().enumerate() {
            palette[i] = Self::parse_color(name, hex, DEFAULT_PALETTE[i]);
        }
        ColorScheme {
            foreground: Self::parse_color("foreground", &self.foreground, defaults.foreground),
            background: Self::parse_color("background", &self.background, defaults.background),
            cursor: Self::parse_color("cursor", &self.cursor, defaults.cursor),
            palette,
        }
    }
}

impl Config {
    /// Find the config file:
    /// 1. VTMODEL_CONFIG environment variable
    /// 2. ~/.config/vtmodel/config.toml
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
            warn!("{} points to missing file: {}", CONFIG_ENV, path);
        }

        default_config_path().filter(|p| p.exists())
    }

    /// Load configuration, falling back to built-in defaults when no file
    /// exists or it fails to parse
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid TOML")?;
        Ok(config)
    }

    /// Serialize to TOML (for template generation)
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Terminal options for a `cols` x `rows` terminal
    pub fn to_options(&self, cols: usize, rows: usize) -> TerminalOptions {
        TerminalOptions {
            cols,
            rows,
            scrollback_lines: self.terminal.scrollback_lines,
            tab_width: self.terminal.tab_width,
            reply_buffer_size: self.terminal.reply_buffer_size,
            max_dcs_payload: self.terminal.max_dcs_payload,
            colors: self.colors.to_scheme(),
        }
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vtmodel").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [terminal]
            scrollback_lines = 50

            [colors]
            red = "ff0000"
            "#,
        )
        .unwrap();
        assert_eq!(config.terminal.scrollback_lines, 50);
        assert_eq!(config.terminal.tab_width, DEFAULT_TAB_WIDTH);

        let options = config.to_options(100, 30);
        assert_eq!((options.cols, options.rows), (100, 30));
        assert_eq!(options.colors.palette[1], Rgb::new(255, 0, 0));
        assert_eq!(options.colors.palette[2], DEFAULT_PALETTE[2]);
        assert_eq!(options.colors.palette[200], DEFAULT_PALETTE[200]);
    }

    #[test]
    fn test_invalid_color_falls_back() {
        let config = Config::from_toml("[colors]\nforeground = \"nothex\"\n").unwrap();
        let scheme = config.colors.to_scheme();
        assert_eq!(scheme.foreground, ColorScheme::default().foreground);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(Config::from_toml("[terminal\nscrollback_lines = ").is_err());
    }

    #[test]
    fn test_defaults_match_builtin_scheme() {
        assert_eq!(Config::default().colors.to_scheme(), ColorScheme::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.terminal.tab_width = 4;
        let text = config.to_toml().unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.terminal.tab_width, 4);
    }
}
