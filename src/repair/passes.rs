//! Text-rewrite passes of the repair pipeline
//!
//! Each pass is a pure `fn(&str) -> String`. A pass that cannot classify a
//! token with confidence leaves it exactly as it found it, so "the output
//! differs from the input" is a reliable signal that the pass fixed something.

use super::scan::{self, QuoteSet, ScanState};

const INVISIBLE: [char; 5] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

/// Barewords the later value passes own; quoting them would hide them
const RESERVED_WORDS: [&str; 15] = [
    "true",
    "false",
    "null",
    "undefined",
    "NaN",
    "Infinity",
    "None",
    "True",
    "False",
    "TRUE",
    "FALSE",
    "NULL",
    "Null",
    "nil",
    "NIL",
];

fn closer_for(opener: char) -> char {
    if opener == '{' { '}' } else { ']' }
}

fn opener_for(closer: char) -> char {
    if closer == '}' { '{' } else { '[' }
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

// ---------------------------------------------------------------------------
// Encoding and whitespace
// ---------------------------------------------------------------------------

/// Drop a leading byte-order mark
pub fn strip_bom(input: &str) -> String {
    input.strip_prefix('\u{FEFF}').unwrap_or(input).to_string()
}

/// Drop zero-width spaces, joiners and word joiners
pub fn strip_invisible_chars(input: &str) -> String {
    input.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

/// Drop control characters other than line breaks and tabs
pub fn strip_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Map non-breaking and typographic spaces to an ASCII space
pub fn normalize_unicode_spaces(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}'
            | '\u{3000}' => ' ',
            other => other,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

fn find_pair(chars: &[char], from: usize, first: char, second: char) -> Option<usize> {
    (from..chars.len().saturating_sub(1)).find(|&k| chars[k] == first && chars[k + 1] == second)
}

fn skip_to_line_end(chars: &[char], mut index: usize) -> usize {
    while index < chars.len() && chars[index] != '\n' {
        index += 1;
    }
    index
}

fn trim_trailing_blanks(out: &mut String) {
    let keep = out.trim_end_matches([' ', '\t']).len();
    out.truncate(keep);
}

/// Remove `/* ... */` comments. An unterminated block is left alone.
pub fn strip_block_comments(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if state.is_normal() && c == '/' && chars.get(i + 1) == Some(&'*') {
            match find_pair(&chars, i + 2, '*', '/') {
                Some(end) => {
                    i = end + 2;
                    continue;
                }
                None => {
                    out.extend(&chars[i..]);
                    break;
                }
            }
        }
        state = state.advance(c, QuoteSet::Both);
        out.push(c);
        i += 1;
    }
    out
}

/// Remove `// ...` comments up to the end of the line.
///
/// `//` glued to a word or a colon (`http://`) is not a comment.
pub fn strip_line_comments(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if state.is_normal()
            && c == '/'
            && chars.get(i + 1) == Some(&'/')
            && !(i > 0 && (chars[i - 1].is_alphanumeric() || chars[i - 1] == ':'))
        {
            i = skip_to_line_end(&chars, i);
            trim_trailing_blanks(&mut out);
            continue;
        }
        state = state.advance(c, QuoteSet::Both);
        out.push(c);
        i += 1;
    }
    out
}

fn is_hash_comment(chars: &[char], index: usize) -> bool {
    let line_start = chars[..index]
        .iter()
        .rposition(|&c| c == '\n')
        .map_or(0, |p| p + 1);
    if chars[line_start..index].iter().all(|c| c.is_whitespace()) {
        return true;
    }
    let after_space = index > 0 && chars[index - 1].is_whitespace();
    after_space && !matches!(scan::prev_significant(chars, index), Some(':' | '['))
}

/// Remove `# ...` comments at line start or after a completed token.
///
/// A `#` right after a colon is a value (`#fff`), not a comment.
pub fn strip_hash_comments(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if state.is_normal() && c == '#' && is_hash_comment(&chars, i) {
            i = skip_to_line_end(&chars, i);
            trim_trailing_blanks(&mut out);
            continue;
        }
        state = state.advance(c, QuoteSet::Both);
        out.push(c);
        i += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

/// Map curly and low-9 quotes to their ASCII forms
pub fn normalize_smart_quotes(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            other => other,
        })
        .collect()
}

fn closes_value(chars: &[char], index: usize) -> bool {
    matches!(
        scan::next_inline(chars, index),
        None | Some(',' | ':' | '}' | ']' | '\n' | '\r')
    )
}

fn find_single_quote_close(chars: &[char], from: usize) -> Option<usize> {
    let mut k = from;
    while k < chars.len() {
        match chars[k] {
            '\\' => k += 2,
            '\n' => return None,
            '\'' if closes_value(chars, k + 1) => return Some(k),
            _ => k += 1,
        }
    }
    None
}

fn push_promoted(out: &mut String, content: &[char]) {
    let mut k = 0;
    while k < content.len() {
        let c = content[k];
        if c == '\\' {
            match content.get(k + 1) {
                Some('\'') => out.push('\''),
                Some(&next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
            k += 2;
            continue;
        }
        if c == '"' {
            out.push_str("\\\"");
        } else {
            out.push(c);
        }
        k += 1;
    }
}

/// Turn `'...'` literals into `"..."` literals.
///
/// Only a single quote in an opening position (start, after `{ [ , :`) whose
/// matching quote sits right before `, : } ]` or a line end is promoted.
/// Apostrophes anywhere else are left untouched.
pub fn promote_single_quotes(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if state.is_normal()
            && c == '\''
            && matches!(
                scan::prev_significant(&chars, i),
                None | Some('{' | '[' | ',' | ':')
            )
            && let Some(end) = find_single_quote_close(&chars, i + 1)
        {
            out.push('"');
            push_promoted(&mut out, &chars[i + 1..end]);
            out.push('"');
            i = end + 1;
            continue;
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
        i += 1;
    }
    out
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn ident_end(chars: &[char], from: usize) -> usize {
    let mut k = from;
    while k < chars.len() && (scan::is_word_char(chars[k]) || chars[k] == '-') {
        k += 1;
    }
    k
}

/// Quote identifier keys: `{name: 1}` becomes `{"name": 1}`
pub fn quote_bare_keys(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut state = ScanState::Normal;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if state.is_normal() && is_ident_start(c) && in_key_position(&chars, i) {
            let end = ident_end(&chars, i);
            if scan::next_significant(&chars, end) == Some(':') {
                out.push('"');
                out.extend(&chars[i..end]);
                out.push('"');
            } else {
                out.extend(&chars[i..end]);
            }
            i = end;
            continue;
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
        i += 1;
    }
    out
}

/// After `{` or `,`, or at the start of a line that follows a complete value
/// (the comma is inserted later by `insert_missing_commas`).
fn in_key_position(chars: &[char], index: usize) -> bool {
    match scan::prev_significant(chars, index) {
        Some('{' | ',') => true,
        Some(prev) if prev == '}' || prev == ']' || prev == '"' || prev.is_ascii_alphanumeric() => {
            starts_line(chars, index)
        }
        _ => false,
    }
}

fn starts_line(chars: &[char], index: usize) -> bool {
    let mut j = index;
    while j > 0 && matches!(chars[j - 1], ' ' | '\t') {
        j -= 1;
    }
    j > 0 && matches!(chars[j - 1], '\n' | '\r')
}

fn closes_string(chars: &[char], index: usize) -> bool {
    matches!(
        scan::next_inline(chars, index),
        None | Some(',' | ':' | '}' | ']' | '\n' | '\r' | '"')
    )
}

/// Escape double quotes that sit in the middle of a string value.
///
/// A quote inside a string only terminates it when it is followed by
/// structural punctuation, a line break, or the end of input.
pub fn escape_inner_quotes(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 8);
    let mut state = ScanState::Normal;
    for (i, &c) in chars.iter().enumerate() {
        if state == ScanState::InString('"') && c == '"' && !closes_string(&chars, i + 1) {
            out.push_str("\\\"");
            continue;
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
    }
    out
}

/// Escape raw line breaks and tabs found inside string literals
pub fn escape_string_control_chars(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    let mut state = ScanState::Normal;
    for c in input.chars() {
        match (state, c) {
            (ScanState::InString(_), '\n') => out.push_str("\\n"),
            (ScanState::InString(_), '\r') => out.push_str("\\r"),
            (ScanState::InString(_), '\t') => out.push_str("\\t"),
            (ScanState::Escaped(_), '\n') => out.push('n'),
            (ScanState::Escaped(_), '\r') => out.push('r'),
            (ScanState::Escaped(_), '\t') => out.push('t'),
            _ => out.push(c),
        }
        state = state.advance(c, QuoteSet::Double);
    }
    out
}

fn in_value_position(chars: &[char], index: usize, container: Option<&char>) -> bool {
    match scan::prev_significant(chars, index) {
        Some(':') | Some('[') => true,
        Some(',') => container == Some(&'['),
        _ => false,
    }
}

fn starts_bare_value(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '{' | '[' | '}' | ']' | ',' | ':')
}

fn bare_value_end(chars: &[char], from: usize) -> usize {
    let mut k = from;
    while k < chars.len() && !matches!(chars[k], ',' | '}' | ']' | '\n' | '\r' | '"' | '{' | '[') {
        k += 1;
    }
    k
}

fn should_quote(token: &str) -> bool {
    let Some(first) = token.chars().next() else {
        return false;
    };
    !(first.is_ascii_digit()
        || matches!(first, '-' | '+' | '.' | '\'' | '\u{2026}')
        || RESERVED_WORDS.contains(&token)
        || token.contains('\\'))
}

/// Quote bareword values: `{"mood": happy}` becomes `{"mood": "happy"}`.
///
/// Literals, numbers, ellipses and anything that runs into a quote or an
/// opening bracket are left for later passes.
pub fn quote_bare_values(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut state = ScanState::Normal;
    let mut stack: Vec<char> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if state.is_normal() {
            match c {
                '{' | '[' => stack.push(c),
                '}' | ']' => {
                    stack.pop();
                }
                _ if starts_bare_value(c) && in_value_position(&chars, i, stack.last()) => {
                    let end = bare_value_end(&chars, i);
                    let raw = collect(&chars[i..end]);
                    let token = raw.trim_end();
                    let clean_end = !matches!(chars.get(end), Some('"' | '{' | '['));
                    if clean_end && should_quote(token) {
                        out.push('"');
                        out.push_str(token);
                        out.push('"');
                        out.push_str(&raw[token.len()..]);
                    } else {
                        out.push_str(&raw);
                    }
                    i = end;
                    continue;
                }
                _ => {}
            }
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
        i += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

fn replace_bare_words(
    input: &str,
    absorb_sign: bool,
    replace: impl Fn(&str) -> Option<&'static str>,
) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if state.is_normal()
            && (c.is_alphabetic() || c == '_')
            && (i == 0 || !(scan::is_word_char(chars[i - 1]) || chars[i - 1] == '.'))
        {
            let mut end = i;
            while end < chars.len() && scan::is_word_char(chars[end]) {
                end += 1;
            }
            let word = collect(&chars[i..end]);
            match replace(&word) {
                Some(replacement) => {
                    if absorb_sign && (out.ends_with('-') || out.ends_with('+')) {
                        out.pop();
                    }
                    out.push_str(replacement);
                }
                None => out.push_str(&word),
            }
            i = end;
            continue;
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
        i += 1;
    }
    out
}

/// `undefined` becomes `null`
pub fn normalize_undefined(input: &str) -> String {
    replace_bare_words(input, false, |word| (word == "undefined").then_some("null"))
}

/// `NaN`, `Infinity` and signed infinities become `null`
pub fn normalize_nan_infinity(input: &str) -> String {
    replace_bare_words(input, true, |word| {
        matches!(word, "NaN" | "Infinity").then_some("null")
    })
}

/// Python, Ruby and shouting spellings of null and booleans
pub fn normalize_literal_spellings(input: &str) -> String {
    replace_bare_words(input, false, |word| match word {
        "None" | "NULL" | "Null" | "nil" | "NIL" => Some("null"),
        "True" | "TRUE" => Some("true"),
        "False" | "FALSE" => Some("false"),
        _ => None,
    })
}

/// `.5` becomes `0.5`, `-.5` becomes `-0.5`
pub fn fix_leading_decimal(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);
    let mut state = ScanState::Normal;
    for (i, &c) in chars.iter().enumerate() {
        if state.is_normal()
            && c == '.'
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())
            && !(i > 0 && (scan::is_word_char(chars[i - 1]) || chars[i - 1] == '.'))
        {
            out.push('0');
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
    }
    out
}

/// `5.` becomes `5.0`
pub fn fix_trailing_decimal(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);
    let mut state = ScanState::Normal;
    for (i, &c) in chars.iter().enumerate() {
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
        if state.is_normal()
            && c == '.'
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && !chars
                .get(i + 1)
                .is_some_and(|n| scan::is_word_char(*n) || *n == '.')
            && number_start_is_clean(&chars, i - 1)
        {
            out.push('0');
        }
    }
    out
}

fn number_start_is_clean(chars: &[char], last_digit: usize) -> bool {
    let mut k = last_digit;
    while k > 0 && chars[k - 1].is_ascii_digit() {
        k -= 1;
    }
    k == 0 || !(scan::is_word_char(chars[k - 1]) || chars[k - 1] == '.')
}

// ---------------------------------------------------------------------------
// Structural punctuation
// ---------------------------------------------------------------------------

fn drop_commas_after(input: &str, drop_after: impl Fn(Option<char>) -> bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut last_sig: Option<char> = None;
    for c in input.chars() {
        if state.is_normal() && c == ',' && drop_after(last_sig) {
            continue;
        }
        let was_normal = state.is_normal();
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
        if !c.is_whitespace() && (was_normal || state.is_normal()) {
            last_sig = Some(c);
        }
    }
    out
}

/// `,,` (with optional whitespace between) becomes `,`
pub fn collapse_double_commas(input: &str) -> String {
    drop_commas_after(input, |last| last == Some(','))
}

/// `[, 1]` becomes `[ 1]`
pub fn remove_leading_commas(input: &str) -> String {
    drop_commas_after(input, |last| matches!(last, Some('{' | '[')))
}

/// `[1, 2,]` becomes `[1, 2]`
pub fn remove_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    for (i, &c) in chars.iter().enumerate() {
        if state.is_normal()
            && c == ','
            && matches!(scan::next_significant(&chars, i + 1), Some('}' | ']'))
        {
            continue;
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
    }
    out
}

fn ends_value(body: &str) -> bool {
    match body.chars().last() {
        Some('"' | '}' | ']') => true,
        Some(c) if c.is_ascii_digit() => true,
        Some(_) => ["true", "false", "null"]
            .iter()
            .any(|word| body.ends_with(word)),
        None => false,
    }
}

/// Insert the comma between two values separated only by a line break,
/// and between two adjacent containers (`} {`).
pub fn insert_missing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    let mut state = ScanState::Normal;
    for c in input.chars() {
        if state.is_normal() && matches!(c, '"' | '{' | '[') {
            let body_len = out.trim_end().len();
            let body = &out[..body_len];
            let gap = &out[body_len..];
            let adjacent_containers =
                matches!(body.chars().last(), Some('}' | ']')) && matches!(c, '{' | '[');
            if ends_value(body) && (gap.contains('\n') || adjacent_containers) {
                out.insert(body_len, ',');
            }
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Bracket balance
// ---------------------------------------------------------------------------

/// Drop closers that do not match the innermost open bracket
pub fn fix_extra_brackets(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut stack: Vec<char> = Vec::new();
    for c in input.chars() {
        if state.is_normal() {
            match c {
                '{' | '[' => stack.push(c),
                '}' | ']' => {
                    if stack.last() == Some(&opener_for(c)) {
                        stack.pop();
                    } else {
                        continue;
                    }
                }
                _ => {}
            }
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
    }
    out
}

/// Close whatever is still open at the end of input.
///
/// An unterminated final string is closed first; a trailing comma is dropped
/// and a dangling key or colon is completed with `null` before the closers
/// are appended in nesting order.
pub fn fix_unclosed_brackets(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut state = ScanState::Normal;
    let mut stack: Vec<char> = Vec::new();
    let mut last_string_start: Option<usize> = None;
    for (i, &c) in chars.iter().enumerate() {
        if state.is_normal() {
            match c {
                '{' | '[' => stack.push(c),
                '}' | ']' => {
                    if stack.last() == Some(&opener_for(c)) {
                        stack.pop();
                    }
                }
                '"' => last_string_start = Some(i),
                _ => {}
            }
        }
        state = state.advance(c, QuoteSet::Double);
    }

    let unterminated = !state.is_normal();
    if stack.is_empty() && !unterminated {
        return input.to_string();
    }

    let mut out = input.to_string();
    if unterminated {
        if let ScanState::Escaped(_) = state {
            out.pop();
        }
        out.push('"');
    } else {
        let keep = out.trim_end().len();
        out.truncate(keep);
        if out.ends_with(',') {
            out.pop();
            let keep = out.trim_end().len();
            out.truncate(keep);
        }
        if out.ends_with(':') {
            out.push_str(" null");
        }
    }

    let dangling_key = stack.last() == Some(&'{')
        && out.ends_with('"')
        && last_string_start
            .is_some_and(|start| matches!(scan::prev_significant(&chars, start), Some('{' | ',')));
    if dangling_key {
        out.push_str(": null");
    }

    for &opener in stack.iter().rev() {
        out.push(closer_for(opener));
    }
    out
}

// ---------------------------------------------------------------------------
// Miscellaneous
// ---------------------------------------------------------------------------

/// An ellipsis standing in for a value becomes `null`
pub fn replace_ellipsis(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if state.is_normal() {
            let end = if c == '\u{2026}' {
                Some(i + 1)
            } else if c == '.' && chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') {
                let mut k = i;
                while k < chars.len() && chars[k] == '.' {
                    k += 1;
                }
                Some(k)
            } else {
                None
            };
            if let Some(end) = end
                && matches!(scan::prev_significant(&chars, i), Some(':' | '[' | ','))
                && matches!(scan::next_significant(&chars, end), None | Some(',' | '}' | ']'))
            {
                out.push_str("null");
                i = end;
                continue;
            }
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
        i += 1;
    }
    out
}

/// `0x1F` becomes `31`, `0o17` becomes `15`
pub fn convert_radix_literals(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Normal;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if state.is_normal()
            && c == '0'
            && (i == 0 || !(scan::is_word_char(chars[i - 1]) || chars[i - 1] == '.'))
        {
            let radix = match chars.get(i + 1) {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                let mut end = i + 2;
                while end < chars.len() && chars[end].is_digit(radix) {
                    end += 1;
                }
                let terminated = !chars.get(end).is_some_and(|n| scan::is_word_char(*n));
                if end > i + 2
                    && terminated
                    && let Ok(value) = u64::from_str_radix(&collect(&chars[i + 2..end]), radix)
                {
                    out.push_str(&value.to_string());
                    i = end;
                    continue;
                }
            }
        }
        state = state.advance(c, QuoteSet::Double);
        out.push(c);
        i += 1;
    }
    out
}
