//! Core types for the enshutsu library
//!
//! This module contains the data model shared by the pipeline stages:
//! - Scene: persistent on-stage state (background, music, characters, location)
//! - Directive: the normalized scene-change request carried by one model turn
//! - Change: discrete events handed to rendering collaborators

pub mod change;
pub mod directive;
pub mod scene;

pub use change::{ChangeEvent, CharacterField};
pub use directive::{
    CharacterAction, CharacterDirective, ChoiceDirective, SceneCues, SceneDirective,
};
pub use scene::{CharacterState, Position, SceneState};
