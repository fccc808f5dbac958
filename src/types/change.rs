//! Change events dispatched to rendering collaborators

use crate::types::scene::CharacterState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Character attribute that a `CharacterUpdate` touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterField {
    Expression,
    Outfit,
    Position,
}

/// A discrete, fire-and-forget scene change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChangeEvent {
    BackgroundChange { value: String },
    MusicChange { value: String },
    LocationChange { value: String },
    /// One-shot, re-fires on every directive that carries it
    SfxPlay { value: String },
    CharacterEnter { character: CharacterState },
    CharacterExit { name: String },
    CharacterUpdate {
        character: CharacterState,
        changed: Vec<CharacterField>,
    },
}

impl ChangeEvent {
    /// Wire name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BackgroundChange { .. } => "background-change",
            Self::MusicChange { .. } => "music-change",
            Self::LocationChange { .. } => "location-change",
            Self::SfxPlay { .. } => "sfx-play",
            Self::CharacterEnter { .. } => "character-enter",
            Self::CharacterExit { .. } => "character-exit",
            Self::CharacterUpdate { .. } => "character-update",
        }
    }

    /// Whether this event is one-shot and not reflected in scene state
    pub fn is_one_shot(&self) -> bool {
        matches!(self, Self::SfxPlay { .. })
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackgroundChange { value }
            | Self::MusicChange { value }
            | Self::LocationChange { value }
            | Self::SfxPlay { value } => write!(f, "{}: {}", self.kind(), value),
            Self::CharacterEnter { character } => write!(
                f,
                "{}: {} ({}, {}, {})",
                self.kind(),
                character.name,
                character.expression,
                character.outfit,
                character.position
            ),
            Self::CharacterExit { name } => write!(f, "{}: {}", self.kind(), name),
            Self::CharacterUpdate { character, changed } => {
                let fields: Vec<&str> = changed
                    .iter()
                    .map(|field| match field {
                        CharacterField::Expression => "expression",
                        CharacterField::Outfit => "outfit",
                        CharacterField::Position => "position",
                    })
                    .collect();
                write!(f, "{}: {} [{}]", self.kind(), character.name, fields.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kebab_case_tag() {
        let event = ChangeEvent::BackgroundChange {
            value: "park".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "background-change");
        assert_eq!(json["value"], "park");
        assert_eq!(event.kind(), "background-change");
    }

    #[test]
    fn only_sfx_is_one_shot() {
        let sfx = ChangeEvent::SfxPlay {
            value: "door".to_string(),
        };
        let exit = ChangeEvent::CharacterExit {
            name: "Luna".to_string(),
        };
        assert!(sfx.is_one_shot());
        assert!(!exit.is_one_shot());
    }

    #[test]
    fn display_lists_changed_fields() {
        let event = ChangeEvent::CharacterUpdate {
            character: CharacterState::new("Luna"),
            changed: vec![CharacterField::Expression, CharacterField::Position],
        };
        assert_eq!(
            event.to_string(),
            "character-update: Luna [expression, position]"
        );
    }
}
