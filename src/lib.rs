//! # enshutsu
//!
//! A scene director for model-driven visual novels. A language model embeds a
//! small JSON scene block in each response; this library finds it, repairs
//! whatever is broken about it, normalizes it into a [`SceneDirective`] and
//! reconciles it against the current [`SceneState`] into a minimal list of
//! [`ChangeEvent`]s for the renderers.
//!
//! Alongside the pipeline it provides the prompt template macros that tell the
//! model what is on stage, and the interactive choice protocol that turns the
//! model's suggested continuations into the next user turn.
//!
//! ## Quick Start
//!
//! ```rust
//! use enshutsu::{SceneState, extract, reconcile};
//!
//! let response = "Luna waves.\n```scene\n{characters: [{name: 'Luna', action: 'enters',}]}\n```";
//!
//! let extraction = extract(response);
//! assert_eq!(extraction.narrative, "Luna waves.");
//!
//! let directive = extraction.directive.expect("scene block");
//! let result = reconcile(&directive, &SceneState::new());
//! assert_eq!(result.changes.len(), 1);
//! assert!(result.new_state.is_present("Luna"));
//! ```
//!
//! ## Turn Processing
//!
//! ```rust
//! use enshutsu::{Director, DirectorConfig};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut director = Director::new(DirectorConfig::default());
//! let outcome = director
//!     .process_turn("<scene>{\"scene\": {\"background\": \"park\"}}</scene> It is sunny.")
//!     .await;
//!
//! assert_eq!(outcome.narrative, "It is sunny.");
//! assert_eq!(director.state().background.as_deref(), Some("park"));
//! # }
//! ```

pub mod choice;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod director;
pub mod error;
pub mod extract;
pub mod infrastructure;
pub mod macros;
pub mod reconcile;
pub mod repair;
pub mod storage;
pub mod types;
pub mod validate;

pub use choice::{ChoiceOutcome, ChoicePhase, ChoicePresenter, ChoiceSelection, ChoiceSession};
pub use collaborators::{AssetLookup, ChangeSink, EmotionClassifier};
pub use config::{DirectorConfig, NpcProfile};
pub use director::{Director, TurnOutcome};
pub use error::{ChoiceError, CollaboratorError, ConfigError};
pub use extract::{Extraction, contains_directive, extract, strip_directive};
pub use macros::{MacroContext, MacroEngine, MacroKey, MacroResolution, MacroResolver};
pub use reconcile::{Reconciliation, SceneStage, reconcile};
pub use repair::{RepairResult, repair};
pub use types::{
    ChangeEvent, CharacterAction, CharacterDirective, CharacterState, ChoiceDirective, Position,
    SceneDirective, SceneState,
};
pub use validate::normalize;
