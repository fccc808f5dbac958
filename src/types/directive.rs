//! Scene directive types
//!
//! A directive is the validated, normalized form of the payload a model embeds
//! in its response. It describes what should change, never what is current.

use crate::types::scene::Position;
use serde::{Deserialize, Serialize};

/// Transition a character directive requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterAction {
    Enters,
    Exits,
    Speaks,
}

impl CharacterAction {
    /// Parse a wire value, case-insensitively. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "enters" => Some(Self::Enters),
            "exits" => Some(Self::Exits),
            "speaks" => Some(Self::Speaks),
            _ => None,
        }
    }
}

/// Scene-level cues of a directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SceneCues {
    pub background: Option<String>,
    pub music: Option<String>,
    /// One-shot sound effect, never persisted
    pub sfx: Option<String>,
    pub location: Option<String>,
}

impl SceneCues {
    pub fn is_empty(&self) -> bool {
        self.background.is_none()
            && self.music.is_none()
            && self.sfx.is_none()
            && self.location.is_none()
    }
}

/// Requested change for a single character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDirective {
    pub name: String,
    pub expression: Option<String>,
    pub outfit: Option<String>,
    /// `None` keeps the character where it stands
    pub position: Option<Position>,
    /// `None` means "no transition, just an update"
    pub action: Option<CharacterAction>,
}

impl CharacterDirective {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: None,
            outfit: None,
            position: None,
            action: None,
        }
    }

    pub fn with_action(mut self, action: CharacterAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_outfit(mut self, outfit: impl Into<String>) -> Self {
        self.outfit = Some(outfit.into());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// A suggested continuation offered to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDirective {
    /// Short text shown on the button
    pub label: String,
    /// Text injected as the next user turn when chosen
    pub prompt: String,
}

impl ChoiceDirective {
    pub fn new(label: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prompt: prompt.into(),
        }
    }
}

/// Normalized directive for one model turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SceneDirective {
    pub scene: SceneCues,
    pub characters: Vec<CharacterDirective>,
    pub choices: Vec<ChoiceDirective>,
}

impl SceneDirective {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the directive requests nothing at all
    pub fn is_empty(&self) -> bool {
        self.scene.is_empty() && self.characters.is_empty() && self.choices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parse_accepts_known_values_only() {
        assert_eq!(CharacterAction::parse("Enters"), Some(CharacterAction::Enters));
        assert_eq!(CharacterAction::parse("exits"), Some(CharacterAction::Exits));
        assert_eq!(CharacterAction::parse("speaks "), Some(CharacterAction::Speaks));
        assert_eq!(CharacterAction::parse("dances"), None);
    }

    #[test]
    fn builder_sets_fields() {
        let directive = CharacterDirective::new("Luna")
            .with_action(CharacterAction::Enters)
            .with_expression("joy")
            .with_position(Position::Left);

        assert_eq!(directive.name, "Luna");
        assert_eq!(directive.expression.as_deref(), Some("joy"));
        assert_eq!(directive.outfit, None);
        assert_eq!(directive.position, Some(Position::Left));
        assert_eq!(directive.action, Some(CharacterAction::Enters));
    }

    #[test]
    fn empty_directive() {
        let mut directive = SceneDirective::new();
        assert!(directive.is_empty());
        directive.choices.push(ChoiceDirective::new("Go", "I go"));
        assert!(!directive.is_empty());
    }
}
