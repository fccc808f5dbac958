//! JSON syntax repair for model output
//!
//! [`repair`] never fails. Valid JSON is returned untouched; anything else
//! goes through the ordered pass table in [`PASSES`] and is parsed again. If
//! that still fails, the first top-level `{...}` span is cut out (and closed if
//! it runs off the end) and parsed on its own.
//!
//! The pass order matters: later passes assume the earlier ones already ran.
//! 1. encoding and whitespace cleanup
//! 2. comment stripping
//! 3. quote normalization
//! 4. value normalization
//! 5. structural punctuation
//! 6. bracket balance
//! 7. miscellaneous literals

use serde::Serialize;
use serde_json::Value;

pub mod passes;
pub mod scan;


use scan::{QuoteSet, ScanState};

/// A named text-rewrite step of the repair pipeline
#[derive(Debug, Clone, Copy)]
pub struct RepairPass {
    /// Name recorded in the audit trail when the pass changes its input
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

macro_rules! pass {
    ($name:ident) => {
        RepairPass {
            name: stringify!($name),
            apply: passes::$name,
        }
    };
}

/// The fixed, ordered repair pipeline
pub const PASSES: &[RepairPass] = &[
    pass!(strip_bom),
    pass!(strip_invisible_chars),
    pass!(strip_control_chars),
    pass!(normalize_unicode_spaces),
    pass!(strip_block_comments),
    pass!(strip_line_comments),
    pass!(strip_hash_comments),
    pass!(normalize_smart_quotes),
    pass!(promote_single_quotes),
    pass!(quote_bare_keys),
    pass!(escape_inner_quotes),
    pass!(escape_string_control_chars),
    pass!(quote_bare_values),
    pass!(normalize_undefined),
    pass!(normalize_nan_infinity),
    pass!(normalize_literal_spellings),
    pass!(fix_leading_decimal),
    pass!(fix_trailing_decimal),
    pass!(collapse_double_commas),
    pass!(remove_leading_commas),
    pass!(remove_trailing_commas),
    pass!(insert_missing_commas),
    pass!(fix_extra_brackets),
    pass!(fix_unclosed_brackets),
    pass!(replace_ellipsis),
    pass!(convert_radix_literals),
];

/// Audit name recorded when the fallback object extraction succeeds
pub const EXTRACT_OBJECT: &str = "extract_object";

/// Outcome of one repair attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepairResult {
    /// Parsed value; `None` is the only failure signal
    pub parsed: Option<Value>,
    /// Text after all fixes were applied
    pub fixed: String,
    /// Names of the passes that changed the text, in order
    pub fixes: Vec<String>,
    /// Parse error of the last attempt, when nothing could be parsed
    pub error: Option<String>,
}

impl RepairResult {
    pub fn is_ok(&self) -> bool {
        self.parsed.is_some()
    }
}

/// Repair near-JSON text into a parsed value
pub fn repair(raw: &str) -> RepairResult {
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return RepairResult {
            parsed: Some(parsed),
            fixed: raw.to_string(),
            fixes: Vec::new(),
            error: None,
        };
    }

    let mut fixed = raw.trim().to_string();
    let mut fixes = Vec::new();
    for pass in PASSES {
        let next = (pass.apply)(&fixed);
        if next != fixed {
            log::trace!("repair pass {} changed the payload", pass.name);
            fixes.push(pass.name.to_string());
            fixed = next;
        }
    }

    let error = match serde_json::from_str::<Value>(&fixed) {
        Ok(parsed) => {
            return RepairResult {
                parsed: Some(parsed),
                fixed,
                fixes,
                error: None,
            };
        }
        Err(err) => err.to_string(),
    };

    if let Some(candidate) = extract_first_object(&fixed)
        && candidate != fixed
        && let Ok(parsed) = serde_json::from_str::<Value>(&candidate)
    {
        log::trace!("repair fell back to the first top-level object");
        fixes.push(EXTRACT_OBJECT.to_string());
        return RepairResult {
            parsed: Some(parsed),
            fixed: candidate,
            fixes,
            error: None,
        };
    }

    RepairResult {
        parsed: None,
        fixed,
        fixes,
        error: Some(error),
    }
}

/// Cut out the first top-level `{...}` span.
///
/// Depth counting ignores brackets inside strings. An unterminated span is
/// completed with a closing quote (if a string is open) and the missing closers.
pub fn extract_first_object(text: &str) -> Option<String> {
    let mut state = ScanState::Normal;
    let mut start: Option<usize> = None;
    let mut stack: Vec<char> = Vec::new();

    for (offset, c) in text.char_indices() {
        if state.is_normal() {
            match c {
                '{' => {
                    if start.is_none() {
                        start = Some(offset);
                    }
                    stack.push('}');
                }
                '[' if start.is_some() => stack.push(']'),
                '}' | ']' if start.is_some() => {
                    if stack.last() == Some(&c) {
                        stack.pop();
                    }
                    if stack.is_empty() {
                        let begin = start?;
                        return Some(text[begin..offset + c.len_utf8()].to_string());
                    }
                }
                _ => {}
            }
        }
        state = state.advance(c, QuoteSet::Double);
    }

    let begin = start?;
    let mut span = text[begin..].trim_end().to_string();
    match state {
        ScanState::Normal => {}
        ScanState::Escaped(_) => {
            span.pop();
            span.push('"');
        }
        ScanState::InString(_) => span.push('"'),
    }
    if span.ends_with(',') {
        span.pop();
    }
    while let Some(closer) = stack.pop() {
        span.push(closer);
    }
    Some(span)
}
