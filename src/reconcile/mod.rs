//! Scene reconciliation
//!
//! Diffs a directive against the current scene state and produces the new
//! state plus the minimal ordered list of change events. [`reconcile`] is pure;
//! [`SceneStage`] owns the current state and swaps it in one step.

use crate::types::{
    CharacterAction, CharacterDirective, CharacterField, CharacterState, ChangeEvent,
    ChoiceDirective, SceneDirective, SceneState,
};
use serde::Serialize;


/// Outcome of reconciling one directive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub new_state: SceneState,
    /// Events in dispatch order: scene cues first, then characters in directive order,
    /// at most one event per name
    pub changes: Vec<ChangeEvent>,
    /// Choices of the directive, passed through for the choice protocol
    pub choices: Vec<ChoiceDirective>,
}

/// Compute the next scene state and the events that lead to it
///
/// Absent fields keep their prior value. An event is emitted only for a real
/// difference, so applying the same directive twice yields no events the
/// second time, except for the one-shot sound effect.
pub fn reconcile(directive: &SceneDirective, state: &SceneState) -> Reconciliation {
    let mut next = state.clone();
    let mut changes = Vec::new();
    let cues = &directive.scene;

    if let Some(value) = set_if_changed(&mut next.background, cues.background.as_ref()) {
        changes.push(ChangeEvent::BackgroundChange { value });
    }
    if let Some(value) = set_if_changed(&mut next.music, cues.music.as_ref()) {
        changes.push(ChangeEvent::MusicChange { value });
    }
    if let Some(value) = set_if_changed(&mut next.location, cues.location.as_ref()) {
        changes.push(ChangeEvent::LocationChange { value });
    }
    if let Some(value) = &cues.sfx {
        changes.push(ChangeEvent::SfxPlay {
            value: value.clone(),
        });
    }

    for character in &collapse_repeated_names(&directive.characters) {
        if let Some(event) = reconcile_character(&mut next.characters, character) {
            changes.push(event);
        }
    }

    Reconciliation {
        new_state: next,
        changes,
        choices: directive.choices.clone(),
    }
}

/// One entry per name, at the position of its first mention.
///
/// Later entries overwrite the fields they carry, and the last entry's action
/// stands, so one directive never both enters and removes a character.
fn collapse_repeated_names(characters: &[CharacterDirective]) -> Vec<CharacterDirective> {
    let mut collapsed: Vec<CharacterDirective> = Vec::with_capacity(characters.len());
    for character in characters {
        let Some(earlier) = collapsed.iter_mut().find(|c| c.name == character.name) else {
            collapsed.push(character.clone());
            continue;
        };
        if character.expression.is_some() {
            earlier.expression = character.expression.clone();
        }
        if character.outfit.is_some() {
            earlier.outfit = character.outfit.clone();
        }
        if character.position.is_some() {
            earlier.position = character.position;
        }
        earlier.action = character.action;
    }
    collapsed
}

fn set_if_changed(slot: &mut Option<String>, requested: Option<&String>) -> Option<String> {
    let value = requested?;
    if slot.as_ref() == Some(value) {
        return None;
    }
    *slot = Some(value.clone());
    Some(value.clone())
}

fn reconcile_character(
    cast: &mut Vec<CharacterState>,
    directive: &CharacterDirective,
) -> Option<ChangeEvent> {
    let index = cast.iter().position(|c| c.name == directive.name);

    match (directive.action, index) {
        (Some(CharacterAction::Exits), Some(index)) => {
            let removed = cast.remove(index);
            Some(ChangeEvent::CharacterExit { name: removed.name })
        }
        // exiting someone who is not on stage changes nothing
        (Some(CharacterAction::Exits), None) => None,
        (_, None) => {
            let mut character = CharacterState::new(directive.name.clone());
            merge(&mut character, directive);
            cast.push(character.clone());
            Some(ChangeEvent::CharacterEnter { character })
        }
        (_, Some(index)) => {
            let character = &mut cast[index];
            let changed = merge(character, directive);
            if changed.is_empty() {
                None
            } else {
                Some(ChangeEvent::CharacterUpdate {
                    character: character.clone(),
                    changed,
                })
            }
        }
    }
}

/// Apply the present fields of a directive, returning which ones differed
fn merge(character: &mut CharacterState, directive: &CharacterDirective) -> Vec<CharacterField> {
    let mut changed = Vec::new();

    if let Some(expression) = &directive.expression
        && *expression != character.expression
    {
        character.expression = expression.clone();
        changed.push(CharacterField::Expression);
    }
    if let Some(outfit) = &directive.outfit
        && *outfit != character.outfit
    {
        character.outfit = outfit.clone();
        changed.push(CharacterField::Outfit);
    }
    if let Some(position) = directive.position
        && position != character.position
    {
        character.position = position;
        changed.push(CharacterField::Position);
    }

    changed
}

/// Owner of the current scene state
///
/// All reconciliation goes through [`SceneStage::apply`], which replaces the
/// state only after the whole directive has been reconciled.
#[derive(Debug, Clone, Default)]
pub struct SceneStage {
    state: SceneState,
}

impl SceneStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: SceneState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Reconcile a directive and commit the resulting state
    pub fn apply(&mut self, directive: &SceneDirective) -> Reconciliation {
        let reconciliation = reconcile(directive, &self.state);
        self.state = reconciliation.new_state.clone();
        reconciliation
    }

    /// Restore the initial empty scene, e.g. when the conversation changes
    pub fn reset(&mut self) {
        self.state = SceneState::new();
    }
}
