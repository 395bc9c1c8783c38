//! Text snapshots of a screen
//!
//! `render_styled` re-encodes cell styles as SGR so the output can be
//! replayed into another terminal; `render_plain` is just the text.

use super::buffer::Buffer;
use super::cell::{Cell, Style};

/// One line per row, trailing blanks trimmed
pub fn render_plain(buffer: &Buffer) -> String {
    (0..buffer.height())
        .map(|y| buffer.row_text(y))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per row with SGR sequences at every style change. Each styled
/// line ends with a reset.
pub fn render_styled(buffer: &Buffer) -> String {
    let mut out = String::new();
    for y in 0..buffer.height() {
        if y > 0 {
            out.push('\n');
        }
        if let Some(row) = buffer.row(y) {
            render_row(&mut out, row);
        }
    }
    out
}

/// Styled rendering of a single row (also used for scrollback lines)
pub fn render_row(out: &mut String, row: &[Cell]) {
    // Trailing default blanks carry nothing
    let end = row
        .iter()
        .rposition(|c| !c.is_blank())
        .map(|i| i + 1)
        .unwrap_or(0);

    let mut current = Style::default();
    for cell in &row[..end] {
        if cell.is_placeholder() {
            continue;
        }
        if cell.style != current {
            out.push_str(&cell.style.to_sgr());
            current = cell.style;
        }
        if cell.content.is_empty() {
            out.push(' ');
        } else {
            out.push_str(&cell.content);
        }
    }
    if !current.is_default() {
        out.push_str("\x1b[0m");
    }
}
