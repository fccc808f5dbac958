//! Directive validation and normalization
//!
//! [`normalize`] turns whatever JSON value came out of repair into a well-formed
//! [`SceneDirective`]. It is total: unusable fields are dropped, never reported.

use crate::types::{
    CharacterAction, CharacterDirective, ChoiceDirective, Position, SceneCues, SceneDirective,
};
use serde_json::{Map, Value};

/// Normalize a parsed payload into a directive
///
/// Scene cues are read from the `scene` object, falling back to flat
/// top-level keys (`{"background": "park"}`) when the object is absent.
pub fn normalize(raw: &Value) -> SceneDirective {
    let Some(root) = raw.as_object() else {
        log::debug!("scene payload is not an object, ignoring it");
        return SceneDirective::default();
    };

    SceneDirective {
        scene: normalize_scene(root),
        characters: normalize_characters(root.get("characters")),
        choices: normalize_choices(root.get("choices")),
    }
}

fn normalize_scene(root: &Map<String, Value>) -> SceneCues {
    let nested = root.get("scene").and_then(Value::as_object);
    let cue = |key: &str| {
        nested
            .and_then(|scene| clean_text(scene.get(key)))
            .or_else(|| clean_text(root.get(key)))
    };

    SceneCues {
        background: cue("background"),
        music: cue("music"),
        sfx: cue("sfx"),
        location: cue("location"),
    }
}

fn normalize_characters(raw: Option<&Value>) -> Vec<CharacterDirective> {
    let entries: Vec<&Value> = match raw {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            let fields = entry.as_object()?;
            let Some(name) = clean_name(fields.get("name")) else {
                log::debug!("dropping character entry without a usable name");
                return None;
            };
            Some(CharacterDirective {
                name,
                expression: clean_text(fields.get("expression")),
                outfit: clean_text(fields.get("outfit")),
                position: coerce_position(fields.get("position")),
                action: fields
                    .get("action")
                    .and_then(Value::as_str)
                    .and_then(CharacterAction::parse),
            })
        })
        .collect()
}

fn normalize_choices(raw: Option<&Value>) -> Vec<ChoiceDirective> {
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(_) => {
                let text = clean_text(Some(item))?;
                Some(ChoiceDirective::new(text.clone(), text))
            }
            Value::Object(fields) => {
                let label = clean_text(fields.get("label")).or_else(|| clean_text(fields.get("text")))?;
                let prompt = clean_text(fields.get("prompt")).unwrap_or_else(|| label.clone());
                Some(ChoiceDirective::new(label, prompt))
            }
            _ => None,
        })
        .collect()
}

/// Absent, null, the string "null" and blank strings all mean "no value".
/// Numbers are accepted and rendered as text.
fn clean_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => non_blank(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn clean_name(value: Option<&Value>) -> Option<String> {
    value?.as_str().and_then(non_blank)
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Missing position keeps the current one; anything unrecognized is center.
fn coerce_position(value: Option<&Value>) -> Option<Position> {
    match value? {
        Value::Null => None,
        Value::String(text) => {
            let text = non_blank(text)?;
            Some(Position::parse(&text).unwrap_or(Position::Center))
        }
        _ => Some(Position::Center),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_scene_object() {
        let directive = normalize(&json!({
            "scene": {"background": "park", "music": "calm", "sfx": "door", "location": "Town"},
            "characters": [{"name": "Luna", "expression": "joy", "position": "left", "action": "enters"}],
            "choices": [{"label": "Wave", "prompt": "I wave at Luna."}]
        }));

        assert_eq!(directive.scene.background.as_deref(), Some("park"));
        assert_eq!(directive.scene.sfx.as_deref(), Some("door"));
        assert_eq!(directive.scene.location.as_deref(), Some("Town"));
        assert_eq!(
            directive.characters,
            vec![
                CharacterDirective::new("Luna")
                    .with_expression("joy")
                    .with_position(Position::Left)
                    .with_action(CharacterAction::Enters)
            ]
        );
        assert_eq!(directive.choices, vec![ChoiceDirective::new("Wave", "I wave at Luna.")]);
    }

    #[test]
    fn flat_scene_keys_are_accepted() {
        let directive = normalize(&json!({"background": "cafe", "music": "jazz"}));
        assert_eq!(directive.scene.background.as_deref(), Some("cafe"));
        assert_eq!(directive.scene.music.as_deref(), Some("jazz"));
    }

    #[test]
    fn nested_cue_wins_over_flat_key() {
        let directive = normalize(&json!({"background": "flat", "scene": {"background": "nested"}}));
        assert_eq!(directive.scene.background.as_deref(), Some("nested"));
    }

    #[test]
    fn null_like_values_mean_absent() {
        let directive = normalize(&json!({
            "scene": {"background": null, "music": "null", "sfx": "   ", "location": true},
            "characters": [{"name": "Luna", "expression": "NULL", "outfit": "", "position": null}]
        }));

        assert!(directive.scene.is_empty());
        assert_eq!(directive.characters, vec![CharacterDirective::new("Luna")]);
    }

    #[test]
    fn normalization_is_total() {
        for raw in [
            json!(null),
            json!(42),
            json!("scene"),
            json!([1, 2, 3]),
            json!({}),
            json!({"scene": 5, "characters": "Luna", "choices": {"label": "x"}}),
        ] {
            let directive = normalize(&raw);
            assert!(directive.is_empty(), "expected empty directive from {raw}");
        }
    }

    #[test]
    fn unusable_character_entries_are_dropped() {
        let directive = normalize(&json!({
            "characters": [
                null, 1, "Luna", {"name": ""}, {"name": 5}, {"expression": "joy"},
                {"name": "  Sol  ", "position": "top", "action": "dance"}
            ]
        }));

        assert_eq!(directive.characters.len(), 1);
        let sol = &directive.characters[0];
        assert_eq!(sol.name, "Sol");
        assert_eq!(sol.position, Some(Position::Center));
        assert_eq!(sol.action, None);
    }

    #[test]
    fn position_and_action_are_case_insensitive() {
        let directive = normalize(&json!({
            "characters": [{"name": "Luna", "position": "RIGHT", "action": "Exits"}]
        }));
        assert_eq!(directive.characters[0].position, Some(Position::Right));
        assert_eq!(directive.characters[0].action, Some(CharacterAction::Exits));
    }

    #[test]
    fn single_character_object_is_accepted() {
        let directive = normalize(&json!({"characters": {"name": "Luna"}}));
        assert_eq!(directive.characters, vec![CharacterDirective::new("Luna")]);
    }

    #[test]
    fn choice_shorthands() {
        let directive = normalize(&json!({
            "choices": [
                "Run away",
                {"label": "Stay"},
                {"text": "Hide", "prompt": "I hide behind the tree."},
                {"prompt": "no label"},
                7,
                "  "
            ]
        }));

        assert_eq!(
            directive.choices,
            vec![
                ChoiceDirective::new("Run away", "Run away"),
                ChoiceDirective::new("Stay", "Stay"),
                ChoiceDirective::new("Hide", "I hide behind the tree."),
            ]
        );
    }

    #[test]
    fn numbers_are_accepted_as_text() {
        let directive = normalize(&json!({"scene": {"location": 221}}));
        assert_eq!(directive.scene.location.as_deref(), Some("221"));
    }
}
