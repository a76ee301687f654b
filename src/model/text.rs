//! Text content: an ordered sequence of lines.
//!
//! Each line retains its own terminator, so encoding is plain concatenation
//! and a document without a trailing newline round-trips byte-for-byte.
//! Decoding is total: bytes are interpreted as UTF-8 with invalid sequences
//! replaced, never rejected. Lines have no identity beyond position and
//! content.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TextDocument
// ---------------------------------------------------------------------------

/// An ordered sequence of lines, terminators included.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocument {
    lines: Vec<String>,
}

impl TextDocument {
    /// Build a document from pre-split lines.
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Split raw bytes into lines after every `\n`; a trailing fragment
    /// without a terminator becomes the final line. Invalid UTF-8 is
    /// replaced, not rejected.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        Self {
            lines: text.split_inclusive('\n').map(String::from).collect(),
        }
    }

    /// Concatenate the lines back into bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.lines.iter().map(String::len).sum());
        for line in &self.lines {
            out.extend_from_slice(line.as_bytes());
        }
        out
    }

    /// The lines, in order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` for an empty document.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_document() {
        let doc = TextDocument::from_bytes(b"");
        assert!(doc.is_empty());
        assert_eq!(doc.to_bytes(), b"");
    }

    #[test]
    fn splits_after_each_newline() {
        let doc = TextDocument::from_bytes(b"a\nb\nc\n");
        assert_eq!(doc.lines(), &["a\n", "b\n", "c\n"]);
    }

    #[test]
    fn keeps_unterminated_final_fragment() {
        let doc = TextDocument::from_bytes(b"a\nb");
        assert_eq!(doc.lines(), &["a\n", "b"]);
    }

    #[test]
    fn single_line_without_newline() {
        let doc = TextDocument::from_bytes(b"only");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.lines(), &["only"]);
    }

    #[test]
    fn blank_lines_survive() {
        let doc = TextDocument::from_bytes(b"\n\n");
        assert_eq!(doc.lines(), &["\n", "\n"]);
    }

    #[test]
    fn roundtrip_preserves_bytes() {
        let inputs: &[&[u8]] = &[b"", b"x", b"x\n", b"a\nb\nc", b"a\n\nb\n", b"\n"];
        for input in inputs {
            let doc = TextDocument::from_bytes(input);
            assert_eq!(doc.to_bytes(), *input, "roundtrip failed for {input:?}");
        }
    }

    #[test]
    fn invalid_utf8_degrades_to_replacement() {
        let doc = TextDocument::from_bytes(&[0xff, 0xfe, b'\n', b'o', b'k']);
        assert_eq!(doc.len(), 2);
        assert!(doc.lines()[0].contains('\u{fffd}'));
        assert_eq!(doc.lines()[1], "ok");
    }

    #[test]
    fn from_lines_roundtrips() {
        let lines = vec!["a\n".to_owned(), "b".to_owned()];
        let doc = TextDocument::from_lines(lines.clone());
        assert_eq!(doc.lines(), &lines[..]);
        assert_eq!(doc.to_bytes(), b"a\nb");
    }
}
