//! Scene directive extraction
//!
//! Finds the embedded scene block in a model response, repairs and normalizes
//! its payload, and returns the narrative with the block cut out. Extraction
//! never fails: a response without a usable block yields its trimmed text.

use crate::repair::{self, RepairResult};
use crate::types::SceneDirective;
use crate::validate;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

#[cfg(test)]
mod tests;

/// Delimiter styles recognized around a scene payload, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Delimiter {
    /// ```` ```scene ... ``` ````
    SceneFence,
    /// ```` ```json ```` fence whose first line is `// scene` or `# scene`
    CommentedJsonFence,
    /// `[scene] ... [/scene]`
    BracketTag,
    /// `<scene> ... </scene>`
    XmlTag,
    /// ```` ```scene ```` fence cut off before its closing backticks
    UnterminatedFence,
}

impl Delimiter {
    pub const ALL: [Delimiter; 5] = [
        Delimiter::SceneFence,
        Delimiter::CommentedJsonFence,
        Delimiter::BracketTag,
        Delimiter::XmlTag,
        Delimiter::UnterminatedFence,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            Delimiter::SceneFence => &SCENE_FENCE,
            Delimiter::CommentedJsonFence => &COMMENTED_JSON_FENCE,
            Delimiter::BracketTag => &BRACKET_TAG,
            Delimiter::XmlTag => &XML_TAG,
            Delimiter::UnterminatedFence => &UNTERMINATED_FENCE,
        }
    }
}

static SCENE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```[ \t]*scene[ \t]*\r?\n(?P<body>.*?)```").expect("valid scene fence pattern")
});

static COMMENTED_JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```[ \t]*json[ \t]*\r?\n[ \t]*(?://|#)[ \t]*scene[ \t]*\r?\n(?P<body>.*?)```")
        .expect("valid json fence pattern")
});

static BRACKET_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\[scene\](?P<body>.*?)\[/scene\]").expect("valid bracket tag pattern")
});

static XML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<scene>(?P<body>.*?)</scene>").expect("valid xml tag pattern")
});

static UNTERMINATED_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```[ \t]*scene[ \t]*\r?\n(?P<body>.*)\z").expect("valid open fence pattern")
});

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid blank run pattern"));

/// Result of scanning one model response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    /// Response text with the scene block removed
    pub narrative: String,
    /// Normalized directive, `None` when no block was found or it could not be repaired
    pub directive: Option<SceneDirective>,
    /// Interior of the matched block, empty when nothing matched
    pub raw_payload: String,
    pub delimiter: Option<Delimiter>,
    /// Repair audit of the payload, when a block was found
    pub repair: Option<RepairResult>,
}

/// Extract the scene directive from a model response
///
/// The first delimiter style (in [`Delimiter::ALL`] order) that matches wins.
/// When its payload cannot be repaired the response is treated as having no
/// block at all: the narrative is the whole trimmed response.
pub fn extract(response: &str) -> Extraction {
    for delimiter in Delimiter::ALL {
        let Some(captures) = delimiter.pattern().captures(response) else {
            continue;
        };
        let Some(block) = captures.get(0) else {
            continue;
        };
        let raw_payload = captures
            .name("body")
            .map_or("", |body| body.as_str())
            .trim()
            .to_string();

        let result = repair::repair(&raw_payload);
        let Some(parsed) = &result.parsed else {
            log::debug!(
                "scene block ({delimiter:?}) could not be repaired: {}",
                result.error.as_deref().unwrap_or("unknown error")
            );
            return Extraction {
                narrative: response.trim().to_string(),
                directive: None,
                raw_payload,
                delimiter: Some(delimiter),
                repair: Some(result),
            };
        };

        let directive = validate::normalize(parsed);
        let narrative = tidy(&format!(
            "{}{}",
            &response[..block.start()],
            &response[block.end()..]
        ));
        return Extraction {
            narrative,
            directive: Some(directive),
            raw_payload,
            delimiter: Some(delimiter),
            repair: Some(result),
        };
    }

    Extraction {
        narrative: response.trim().to_string(),
        directive: None,
        raw_payload: String::new(),
        delimiter: None,
        repair: None,
    }
}

/// Check whether a response contains any recognized scene block
pub fn contains_directive(response: &str) -> bool {
    Delimiter::ALL
        .iter()
        .any(|delimiter| delimiter.pattern().is_match(response))
}

/// Remove every recognized scene block, valid or not
pub fn strip_directive(response: &str) -> String {
    let mut text = response.to_string();
    for delimiter in Delimiter::ALL {
        text = delimiter.pattern().replace_all(&text, "").into_owned();
    }
    tidy(&text)
}

/// Collapse the blank-line runs a removed block leaves behind, then trim
fn tidy(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").trim().to_string()
}
