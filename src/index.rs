use serde::{Deserialize, Serialize};

/// Unit that span offsets and lengths are counted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OffsetUnit {
    /// UTF-16 code units, as used by the chat platform
    #[default]
    Utf16,
    /// Unicode scalar values
    Char,
    /// UTF-8 bytes
    Byte,
}

impl OffsetUnit {
    fn width(self, ch: char) -> usize {
        match self {
            OffsetUnit::Utf16 => ch.len_utf16(),
            OffsetUnit::Char => 1,
            OffsetUnit::Byte => ch.len_utf8(),
        }
    }

    /// Length of `text` in this unit.
    pub fn measure(self, text: &str) -> usize {
        match self {
            OffsetUnit::Utf16 => text.encode_utf16().count(),
            OffsetUnit::Char => text.chars().count(),
            OffsetUnit::Byte => text.len(),
        }
    }
}

/// Maps unit offsets into byte offsets of a borrowed string.
///
/// An offset that lands inside a multi-unit character resolves to the
/// start of that character, so every slice stays on a char boundary.
pub(crate) struct TextIndex<'a> {
    text: &'a str,
    // boundaries[unit] = byte offset; one trailing entry for the end
    boundaries: Vec<usize>,
}

impl<'a> TextIndex<'a> {
    pub fn new(text: &'a str, unit: OffsetUnit) -> Self {
        let mut boundaries = Vec::with_capacity(text.len() + 1);
        for (byte, ch) in text.char_indices() {
            for _ in 0..unit.width(ch) {
                boundaries.push(byte);
            }
        }
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// Text length in units.
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Slice between two unit offsets, clamped to the text.
    pub fn slice(&self, from: usize, to: usize) -> &'a str {
        let start = self.byte_offset(from);
        let end = self.byte_offset(to).max(start);
        &self.text[start..end]
    }

    fn byte_offset(&self, unit: usize) -> usize {
        self.boundaries[unit.min(self.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_each_unit() {
        let text = "a😀é";
        assert_eq!(OffsetUnit::Utf16.measure(text), 4);
        assert_eq!(OffsetUnit::Char.measure(text), 3);
        assert_eq!(OffsetUnit::Byte.measure(text), 7);
    }

    #[test]
    fn utf16_slices_around_surrogate_pairs() {
        let index = TextIndex::new("a😀b", OffsetUnit::Utf16);
        assert_eq!(index.len(), 4);
        assert_eq!(index.slice(1, 3), "😀");
        assert_eq!(index.slice(3, 4), "b");
    }

    #[test]
    fn offsets_inside_a_character_snap_to_its_start() {
        let index = TextIndex::new("a😀b", OffsetUnit::Utf16);
        assert_eq!(index.slice(0, 2), "a");
        assert_eq!(index.slice(2, 4), "😀b");
    }

    #[test]
    fn slices_clamp_past_the_end() {
        let index = TextIndex::new("abc", OffsetUnit::Char);
        assert_eq!(index.slice(1, 99), "bc");
        assert_eq!(index.slice(50, 99), "");
    }
}
