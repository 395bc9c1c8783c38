//! Utility functions shared across vtmodel

pub mod color;

pub use color::{parse_hex_color, parse_osc_color, Rgb, DEFAULT_PALETTE};
