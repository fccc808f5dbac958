//! Turn processing
//!
//! The [`Director`] runs one model response through the whole pipeline:
//! extraction (with repair and normalization), expression classification,
//! reconciliation against the owned scene state and event dispatch.

use crate::choice::{ChoicePresenter, ChoiceSelection};
use crate::collaborators::{AssetLookup, ChangeSink, EmotionClassifier, classify_or_fallback};
use crate::config::DirectorConfig;
use crate::extract::{self, Extraction};
use crate::macros::MacroContext;
use crate::reconcile::SceneStage;
use crate::types::{
    CharacterAction, ChangeEvent, ChoiceDirective, SceneDirective, SceneState,
};
use serde::Serialize;
use std::sync::Arc;

/// Everything one processed turn produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    /// Response text with the scene block removed
    pub narrative: String,
    /// Directive as applied, after classification filled in expressions
    pub directive: Option<SceneDirective>,
    pub changes: Vec<ChangeEvent>,
    pub choices: Vec<ChoiceDirective>,
}

/// Owns the scene state and drives the pipeline turn by turn
pub struct Director {
    config: DirectorConfig,
    stage: SceneStage,
    classifier: Option<Arc<dyn EmotionClassifier>>,
    sinks: Vec<Arc<dyn ChangeSink>>,
}

impl Director {
    pub fn new(config: DirectorConfig) -> Self {
        Self::with_state(config, SceneState::new())
    }

    /// Resume from a saved scene
    pub fn with_state(config: DirectorConfig, state: SceneState) -> Self {
        Self {
            config,
            stage: SceneStage::with_state(state),
            classifier: None,
            sinks: Vec::new(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn EmotionClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn ChangeSink>) {
        self.sinks.push(sink);
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn state(&self) -> &SceneState {
        self.stage.state()
    }

    /// Forget the current scene, e.g. when the conversation changes
    pub fn reset(&mut self) {
        log::debug!("scene state reset");
        self.stage.reset();
    }

    /// Context for resolving prompt macros against the current scene
    pub fn macro_context<'a>(&'a self, assets: &'a dyn AssetLookup) -> MacroContext<'a> {
        MacroContext {
            config: &self.config,
            scene: self.stage.state(),
            assets,
        }
    }

    /// Process one model response
    ///
    /// A response without a usable scene block leaves the state untouched and
    /// produces no events.
    pub async fn process_turn(&mut self, response: &str) -> TurnOutcome {
        let Extraction {
            narrative,
            directive,
            ..
        } = extract::extract(response);

        let Some(mut directive) = directive else {
            return TurnOutcome {
                narrative,
                directive: None,
                changes: Vec::new(),
                choices: Vec::new(),
            };
        };

        if directive.choices.len() > self.config.max_choices {
            log::debug!(
                "keeping {} of {} offered choices",
                self.config.max_choices,
                directive.choices.len()
            );
            directive.choices.truncate(self.config.max_choices);
        }
        self.fill_expressions(&mut directive, &narrative).await;

        let reconciliation = self.stage.apply(&directive);
        self.dispatch(&reconciliation.changes);

        TurnOutcome {
            narrative,
            directive: Some(directive),
            changes: reconciliation.changes,
            choices: reconciliation.choices,
        }
    }

    /// Offer choices and wait for the answer
    ///
    /// Returns `None` without presenting when a session is already open.
    pub async fn await_choice(
        &self,
        presenter: &ChoicePresenter,
        choices: Vec<ChoiceDirective>,
    ) -> Option<ChoiceSelection> {
        if presenter.is_visible() {
            log::debug!("choice session already open, not presenting another");
            return None;
        }
        match presenter.present(choices) {
            Ok(session) => session.wait().await,
            Err(err) => {
                log::debug!("could not present choices: {err}");
                None
            }
        }
    }

    /// Ask the classifier for the expression of whoever speaks without one
    ///
    /// A lone character in the directive counts as the speaker.
    async fn fill_expressions(&self, directive: &mut SceneDirective, narrative: &str) {
        if !self.config.classify_expressions || narrative.is_empty() {
            return;
        }
        let Some(classifier) = &self.classifier else {
            return;
        };

        let sole = directive.characters.len() == 1;
        let mut label: Option<String> = None;
        for character in directive.characters.iter_mut() {
            let speaking = character.action == Some(CharacterAction::Speaks)
                || (sole && character.action != Some(CharacterAction::Exits));
            if !speaking || character.expression.is_some() {
                continue;
            }
            if label.is_none() {
                label = Some(
                    classify_or_fallback(
                        classifier.as_ref(),
                        narrative,
                        &self.config.fallback_expression,
                        self.config.asset_timeout(),
                    )
                    .await,
                );
            }
            character.expression = label.clone();
        }
    }

    fn dispatch(&self, changes: &[ChangeEvent]) {
        for event in changes {
            log::debug!("dispatching {event}");
            for sink in &self.sinks {
                sink.dispatch(event);
            }
        }
    }
}
