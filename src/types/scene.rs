//! Persistent scene state
//!
//! `SceneState` is the snapshot of what is currently on stage. Only the
//! reconciliation engine writes it; everything else reads a clone.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default expression for a character that never received one
pub const DEFAULT_EXPRESSION: &str = "neutral";

/// Default outfit for a character that never received one
pub const DEFAULT_OUTFIT: &str = "default";

/// Horizontal stage slot of a character sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    #[default]
    Center,
    Right,
}

impl Position {
    /// Parse a wire value, case-insensitively. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A character currently on stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterState {
    /// Identity key, unique within `SceneState::characters`
    pub name: String,
    pub expression: String,
    pub outfit: String,
    pub position: Position,
}

impl CharacterState {
    /// Create a character with default expression, outfit and position
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: DEFAULT_EXPRESSION.to_string(),
            outfit: DEFAULT_OUTFIT.to_string(),
            position: Position::default(),
        }
    }
}

/// Everything currently presented on stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SceneState {
    /// Current background; `None` means the default backdrop
    pub background: Option<String>,
    /// Currently playing music track
    pub music: Option<String>,
    /// Characters on stage, in a stable order
    pub characters: Vec<CharacterState>,
    /// Free-text location label, independent of the background
    pub location: Option<String>,
}

impl SceneState {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an on-stage character by name
    pub fn character(&self, name: &str) -> Option<&CharacterState> {
        self.characters.iter().find(|c| c.name == name)
    }

    /// Check whether a character is on stage
    pub fn is_present(&self, name: &str) -> bool {
        self.character(name).is_some()
    }

    /// Check whether nothing is set at all
    pub fn is_empty(&self) -> bool {
        self.background.is_none()
            && self.music.is_none()
            && self.characters.is_empty()
            && self.location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_parse_is_case_insensitive() {
        assert_eq!(Position::parse("LEFT"), Some(Position::Left));
        assert_eq!(Position::parse(" right "), Some(Position::Right));
        assert_eq!(Position::parse("middle"), None);
    }

    #[test]
    fn new_character_uses_defaults() {
        let character = CharacterState::new("Luna");
        assert_eq!(character.expression, "neutral");
        assert_eq!(character.outfit, "default");
        assert_eq!(character.position, Position::Center);
    }

    #[test]
    fn scene_lookup_by_name() {
        let mut scene = SceneState::new();
        assert!(scene.is_empty());
        scene.characters.push(CharacterState::new("Luna"));
        assert!(scene.is_present("Luna"));
        assert!(!scene.is_present("Sol"));
        assert!(!scene.is_empty());
    }
}
