//! Global constants for vtmodel
//!
//! Defaults and protocol strings shared by the emulator, the config layer
//! and the replay binary.

// ============================================================================
// Terminal Defaults
// ============================================================================

/// Default terminal width in cells
pub const DEFAULT_COLS: usize = 80;

/// Default terminal height in cells
pub const DEFAULT_ROWS: usize = 24;

/// Default scrollback capacity in lines
pub const DEFAULT_SCROLLBACK: usize = 10_000;

/// Default tab stop interval
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Default capacity of the host-bound reply pipe (bytes)
pub const DEFAULT_REPLY_BUFFER: usize = 64 * 1024;

/// Default maximum DCS payload (bytes)
pub const DEFAULT_MAX_DCS_PAYLOAD: usize = 1024 * 1024;

// ============================================================================
// Device Reports
// ============================================================================

/// Primary device attributes: VT220 with ANSI color
pub const DA1_RESPONSE: &str = "\x1b[?62;22c";

/// Secondary device attributes: VT220, firmware 10, ROM 0
pub const DA2_RESPONSE: &str = "\x1b[>1;10;0c";

/// Operating status: no malfunction
pub const DSR_OK_RESPONSE: &str = "\x1b[0n";

/// Terminal name reported through XTGETTCAP
pub const TERM_NAME: &str = "xterm-256color";

// ============================================================================
// Bracketed Paste / Focus
// ============================================================================

pub const PASTE_START: &str = "\x1b[200~";
pub const PASTE_END: &str = "\x1b[201~";
pub const FOCUS_IN: &str = "\x1b[I";
pub const FOCUS_OUT: &str = "\x1b[O";

/// Highest coordinate representable in X10 mouse reports (255 - 32)
pub const X10_MOUSE_MAX: usize = 223;

/// Highest coordinate in UTF-8 (1005) mouse reports (2047 - 32)
pub const UTF8_MOUSE_MAX: usize = 2015;
