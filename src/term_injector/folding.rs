// WHY: case-insensitive search needs a lowercased view, but lowercasing can change
// byte length ('İ' becomes two chars), so positions must be mapped back explicitly

use std::ops::Range;

/// Lowercase a string one char at a time
/// WHY: keys and haystack must fold identically; `str::to_lowercase` applies
/// context-sensitive rules (final sigma) that per-char folding of the haystack would not
pub fn fold(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.chars() {
        folded.extend(ch.to_lowercase());
    }
    folded
}

/// Lowercased view of a buffer with a byte map back into the original
#[derive(Debug, Clone)]
pub struct FoldedText {
    folded: String,
    /// origin[i] = original byte offset of the char that produced folded byte i;
    /// one trailing entry maps folded.len() to the original length
    origin: Vec<usize>,
}

impl FoldedText {
    pub fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len() + 1);

        for (offset, ch) in text.char_indices() {
            let before = folded.len();
            folded.extend(ch.to_lowercase());
            origin.extend(std::iter::repeat(offset).take(folded.len() - before));
        }
        origin.push(text.len());

        Self { folded, origin }
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// First folded offset whose source char starts at or after `original`
    pub fn folded_offset(&self, original: usize) -> usize {
        self.origin
            .partition_point(|&o| o < original)
            .min(self.folded.len())
    }

    /// Translate a non-empty folded span into the original span that produced it
    pub fn original_span(&self, text: &str, folded: Range<usize>) -> Range<usize> {
        let start = self.origin[folded.start];
        if folded.end <= folded.start {
            return start..start;
        }
        // End of the original char that produced the last folded byte
        let last = self.origin[folded.end - 1];
        let last_len = text[last..].chars().next().map_or(0, char::len_utf8);
        start..last + last_len
    }
}
