//! Character sets (G0-G3 designation, locking and single shifts)

/// DEC Special Graphics, 0x5f..=0x7e
static DEC_SPECIAL: [char; 32] = [
    ' ', '◆', '▒', '␉', '␌', '␍', '␊', '°', '±', '␤', '␋', '┘', '┐', '┌', '└', '┼', '⎺', '⎻',
    '─', '⎼', '⎽', '├', '┤', '┴', '┬', '│', '≤', '≥', 'π', '≠', '£', '·',
];

/// Charset that can be designated into a G slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// US ASCII (identity)
    #[default]
    Ascii,
    /// DEC Special Graphics (line drawing)
    DecSpecial,
    /// United Kingdom: `#` becomes `£`
    Uk,
}

impl Charset {
    /// Charset for a designation final byte (`ESC ( B` etc.)
    pub fn from_final(byte: u8) -> Option<Charset> {
        match byte {
            b'B' => Some(Charset::Ascii),
            b'0' => Some(Charset::DecSpecial),
            b'A' => Some(Charset::Uk),
            _ => None,
        }
    }

    /// Translate a 7-bit code; `None` keeps the input unchanged
    fn map(self, code: u8) -> Option<char> {
        match self {
            Charset::Ascii => None,
            Charset::DecSpecial => match code {
                0x5f..=0x7e => Some(DEC_SPECIAL[(code - 0x5f) as usize]),
                _ => None,
            },
            Charset::Uk => (code == b'#').then_some('£'),
        }
    }
}

/// G0-G3 slots plus GL/GR selectors and the pending single shift
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charsets {
    slots: [Charset; 4],
    gl: usize,
    gr: usize,
    single_shift: Option<usize>,
}

impl Default for Charsets {
    fn default() -> Self {
        Self {
            slots: [Charset::Ascii; 4],
            gl: 0,
            gr: 2,
            single_shift: None,
        }
    }
}

impl Charsets {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Designate `charset` into slot G`slot`
    pub fn designate(&mut self, slot: usize, charset: Charset) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = charset;
        }
    }

    /// Locking shift into GL (SI = 0, SO = 1, LS2, LS3)
    pub fn lock_gl(&mut self, slot: usize) {
        if slot < 4 {
            self.gl = slot;
        }
    }

    /// Locking shift into GR (LS1R, LS2R, LS3R)
    pub fn lock_gr(&mut self, slot: usize) {
        if slot < 4 {
            self.gr = slot;
        }
    }

    /// SS2 / SS3: next single-byte character only
    pub fn single_shift(&mut self, slot: usize) {
        if slot < 4 {
            self.single_shift = Some(slot);
        }
    }

    pub fn slot(&self, slot: usize) -> Charset {
        self.slots.get(slot).copied().unwrap_or_default()
    }

    pub fn gl(&self) -> usize {
        self.gl
    }

    pub fn gr(&self) -> usize {
        self.gr
    }

    /// Translate one single-byte printable character. Consumes the pending
    /// single shift.
    pub fn translate(&mut self, ch: char) -> char {
        let code = ch as u32;
        if code >= 0x100 {
            return ch;
        }
        let slot = match self.single_shift.take() {
            Some(slot) => slot,
            None if code < 0x80 => self.gl,
            None => self.gr,
        };
        self.slots[slot].map((code & 0x7f) as u8).unwrap_or(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_identity() {
        let mut cs = Charsets::default();
        assert_eq!(cs.translate('q'), 'q');
        assert_eq!(cs.translate('é'), 'é');
    }

    #[test]
    fn test_dec_special_in_g0() {
        let mut cs = Charsets::default();
        cs.designate(0, Charset::DecSpecial);
        assert_eq!(cs.translate('q'), '─');
        assert_eq!(cs.translate('x'), '│');
        assert_eq!(cs.translate('A'), 'A');
    }

    #[test]
    fn test_shift_out_and_in() {
        let mut cs = Charsets::default();
        cs.designate(1, Charset::DecSpecial);
        cs.lock_gl(1);
        assert_eq!(cs.translate('l'), '┌');
        cs.lock_gl(0);
        assert_eq!(cs.translate('l'), 'l');
    }

    #[test]
    fn test_single_shift_applies_once() {
        let mut cs = Charsets::default();
        cs.designate(2, Charset::Uk);
        cs.single_shift(2);
        assert_eq!(cs.translate('#'), '£');
        assert_eq!(cs.translate('#'), '#');
    }
}
