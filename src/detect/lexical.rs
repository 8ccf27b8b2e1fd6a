//! Shallow lexical classification of build-script text.
//!
//! The detector consults this map before emitting a finding: matches inside
//! comments or single-line string literals are suppressed (documentation and
//! embedded examples must not fire), while matches inside multi-line strings
//! are kept but flagged so the classifier can penalize them.
//!
//! This is deliberately not a parser. It tracks just enough state to answer
//! "what kind of text is at this position": line comments (`//`), block
//! comments (`/* */`), single-line string literals (`'…'`, `"…"`), and
//! multi-line strings (`'''…'''`, `"""…"""`). Block comments and multi-line
//! strings carry their state across lines.

/// Classification of one byte position in a scanned file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    Code,
    Comment,
    StringLiteral,
    MultilineString,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    BlockComment,
    TripleSingle,
    TripleDouble,
}

/// Per-byte classification for an entire file.
pub struct LexicalMap {
    lines: Vec<Vec<TextKind>>,
}

impl LexicalMap {
    pub fn build(content: &str) -> Self {
        let mut state = ScanState::Code;
        let mut lines = Vec::new();

        for line in content.lines() {
            let (kinds, next_state) = classify_line(line.as_bytes(), state);
            lines.push(kinds);
            state = next_state;
        }

        Self { lines }
    }

    /// Kind at a 1-based line and 0-based byte column. Out-of-range
    /// positions read as code so callers never suppress on bad input.
    pub fn kind_at(&self, line: usize, column: usize) -> TextKind {
        self.lines
            .get(line.wrapping_sub(1))
            .and_then(|kinds| kinds.get(column))
            .copied()
            .unwrap_or(TextKind::Code)
    }
}

fn classify_line(bytes: &[u8], mut state: ScanState) -> (Vec<TextKind>, ScanState) {
    let len = bytes.len();
    let mut kinds = vec![TextKind::Code; len];
    let mut i = 0;

    while i < len {
        match state {
            ScanState::BlockComment => {
                if bytes[i..].starts_with(b"*/") {
                    fill(&mut kinds, i, i + 2, TextKind::Comment);
                    state = ScanState::Code;
                    i += 2;
                } else {
                    kinds[i] = TextKind::Comment;
                    i += 1;
                }
            }
            ScanState::TripleSingle | ScanState::TripleDouble => {
                let delim: &[u8] = if state == ScanState::TripleSingle {
                    b"'''"
                } else {
                    b"\"\"\""
                };
                if bytes[i..].starts_with(delim) {
                    fill(&mut kinds, i, i + 3, TextKind::MultilineString);
                    state = ScanState::Code;
                    i += 3;
                } else if bytes[i] == b'\\' {
                    let end = (i + 2).min(len);
                    fill(&mut kinds, i, end, TextKind::MultilineString);
                    i = end;
                } else {
                    kinds[i] = TextKind::MultilineString;
                    i += 1;
                }
            }
            ScanState::Code => {
                if bytes[i..].starts_with(b"//") {
                    fill(&mut kinds, i, len, TextKind::Comment);
                    i = len;
                } else if bytes[i..].starts_with(b"/*") {
                    fill(&mut kinds, i, i + 2, TextKind::Comment);
                    state = ScanState::BlockComment;
                    i += 2;
                } else if bytes[i..].starts_with(b"'''") {
                    fill(&mut kinds, i, i + 3, TextKind::MultilineString);
                    state = ScanState::TripleSingle;
                    i += 3;
                } else if bytes[i..].starts_with(b"\"\"\"") {
                    fill(&mut kinds, i, i + 3, TextKind::MultilineString);
                    state = ScanState::TripleDouble;
                    i += 3;
                } else if bytes[i] == b'\'' || bytes[i] == b'"' {
                    let end = scan_quoted(bytes, i);
                    fill(&mut kinds, i, end, TextKind::StringLiteral);
                    i = end;
                } else {
                    i += 1;
                }
            }
        }
    }

    (kinds, state)
}

/// Scan a single-line quoted literal starting at `start`, honoring
/// backslash escapes. Returns the index one past the closing quote, or the
/// end of line for an unterminated literal (state resets at EOL).
fn scan_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let len = bytes.len();
    let mut i = start + 1;

    while i < len {
        if bytes[i] == b'\\' {
            i += 2;
        } else if bytes[i] == quote {
            return i + 1;
        } else {
            i += 1;
        }
    }
    len
}

fn fill(kinds: &mut [TextKind], start: usize, end: usize, kind: TextKind) {
    let end = end.min(kinds.len());
    for slot in &mut kinds[start..end] {
        *slot = kind;
    }
}
