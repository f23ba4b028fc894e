use crate::io::Glyph;

pub const MAX_INPUT_DIGITS: usize = 4;

/// Digits typed so far, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    digits: heapless::String<MAX_INPUT_DIGITS>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a digit. Returns false when the value is not a decimal digit
    /// or the buffer is already full.
    pub fn push_digit(&mut self, digit: u8) -> bool {
        let Some(ch) = char::from_digit(u32::from(digit), 10) else {
            return false;
        };
        self.digits.push(ch).is_ok()
    }

    pub fn clear(&mut self) {
        self.digits.clear();
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.digits.len() >= MAX_INPUT_DIGITS
    }

    pub fn as_str(&self) -> &str {
        self.digits.as_str()
    }

    /// Right-aligned partial input, so "001" reads as " 001" rather than
    /// losing its leading zeros.
    pub fn glyphs(&self) -> [Glyph; MAX_INPUT_DIGITS] {
        let mut glyphs = [Glyph::Blank; MAX_INPUT_DIGITS];
        let offset = MAX_INPUT_DIGITS - self.digits.len();
        for (slot, byte) in glyphs[offset..].iter_mut().zip(self.digits.bytes()) {
            *slot = Glyph::Digit(byte - b'0');
        }
        glyphs
    }
}
