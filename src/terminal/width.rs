//! Display width of characters and grapheme clusters

use smol_str::SmolStr;
use unicode_width::UnicodeWidthChar;

/// Emoji presentation code points drawn two cells wide regardless of
/// what unicode-width reports
pub fn is_emoji_codepoint(cp: u32) -> bool {
    matches!(cp,
        0x1F300..=0x1F5FF |  // Miscellaneous Symbols and Pictographs
        0x1F600..=0x1F64F |  // Emoticons
        0x1F680..=0x1F6FF |  // Transport and Map Symbols
        0x1F900..=0x1F9FF |  // Supplemental Symbols and Pictographs
        0x1FA70..=0x1FAFF |  // Symbols and Pictographs Extended-A
        0x1F1E6..=0x1F1FF    // Regional Indicator Symbols (flags)
    )
}

/// Width of a single character: `None` for controls, 0 for combining marks
pub fn char_width(ch: char) -> Option<usize> {
    if is_emoji_codepoint(ch as u32) {
        return Some(2);
    }
    ch.width()
}

/// Width of a whole cluster: the base character's width, forced to 2 by
/// an emoji variation selector
pub fn cluster_width(cluster: &str) -> u8 {
    let mut chars = cluster.chars();
    let Some(base) = chars.next() else {
        return 0;
    };
    if cluster.contains('\u{FE0F}') {
        return 2;
    }
    char_width(base).unwrap_or(1).clamp(1, 2) as u8
}

pub fn is_regional_indicator(ch: char) -> bool {
    (0x1F1E6..=0x1F1FF).contains(&(ch as u32))
}

pub fn char_to_smolstr(ch: char) -> SmolStr {
    let mut buf = [0u8; 4];
    let s = ch.encode_utf8(&mut buf);
    SmolStr::new(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_width() {
        assert_eq!(char_width('a'), Some(1));
        assert_eq!(char_width('中'), Some(2));
        assert_eq!(char_width('\u{301}'), Some(0));
        assert_eq!(char_width('😀'), Some(2));
        assert_eq!(char_width('\x07'), None);
    }

    #[test]
    fn test_cluster_width() {
        assert_eq!(cluster_width("e\u{301}"), 1);
        assert_eq!(cluster_width("❤\u{FE0F}"), 2);
        assert_eq!(cluster_width("🇯🇵"), 2);
        assert_eq!(cluster_width("👨\u{200D}👩"), 2);
        assert_eq!(cluster_width(""), 0);
    }
}
