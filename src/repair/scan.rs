//! Quote-aware scanning shared by the repair passes
//!
//! Every character-level pass walks its input once, feeding each character
//! through [`ScanState::advance`] so that delimiters inside string literals are
//! never mistaken for structure. An escaped quote (`\"`) never terminates a string.

/// Which characters open a string literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSet {
    /// Only `"` delimits strings
    Double,
    /// Both `"` and `'` delimit strings (before single quotes are promoted)
    Both,
}

impl QuoteSet {
    pub fn opens(self, c: char) -> bool {
        match self {
            Self::Double => c == '"',
            Self::Both => c == '"' || c == '\'',
        }
    }
}

/// Position of the scanner relative to string literals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Outside any string literal
    Normal,
    /// Inside a string opened by the given quote character
    InString(char),
    /// Right after a backslash inside a string
    Escaped(char),
}

impl ScanState {
    /// State after consuming `c`
    pub fn advance(self, c: char, quotes: QuoteSet) -> Self {
        match self {
            Self::Normal if quotes.opens(c) => Self::InString(c),
            Self::Normal => Self::Normal,
            Self::InString(q) if c == '\\' => Self::Escaped(q),
            Self::InString(q) if c == q => Self::Normal,
            Self::InString(q) => Self::InString(q),
            Self::Escaped(q) => Self::InString(q),
        }
    }

    pub fn is_normal(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Characters that continue an identifier-like token
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Last non-whitespace character before `index`
pub fn prev_significant(chars: &[char], index: usize) -> Option<char> {
    chars[..index.min(chars.len())]
        .iter()
        .rev()
        .find(|c| !c.is_whitespace())
        .copied()
}

/// First non-whitespace character at or after `index`
pub fn next_significant(chars: &[char], index: usize) -> Option<char> {
    chars
        .get(index..)?
        .iter()
        .find(|c| !c.is_whitespace())
        .copied()
}

/// First character at or after `index` that is not a space or tab.
/// Line breaks are returned, not skipped.
pub fn next_inline(chars: &[char], index: usize) -> Option<char> {
    chars
        .get(index..)?
        .iter()
        .find(|c| !matches!(c, ' ' | '\t'))
        .copied()
}

/// Count unmatched `{`/`[` and `}`/`]` outside string literals.
///
/// Returns `(curly_open - curly_close, square_open - square_close)`.
pub fn bracket_balance(input: &str) -> (i64, i64) {
    let mut state = ScanState::Normal;
    let (mut curly, mut square) = (0i64, 0i64);
    for c in input.chars() {
        if state.is_normal() {
            match c {
                '{' => curly += 1,
                '}' => curly -= 1,
                '[' => square += 1,
                ']' => square -= 1,
                _ => {}
            }
        }
        state = state.advance(c, QuoteSet::Double);
    }
    (curly, square)
}
