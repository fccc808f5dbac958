//! Choice flow tests
//! Drives a processed turn's choices through the choice protocol

use enshutsu::{ChoicePhase, ChoicePresenter, ChoiceSelection, Director, DirectorConfig};
use std::time::Duration;

const RESPONSE: &str = "Luna looks at you expectantly.\n```scene\n{\"choices\": [{\"label\": \"Stay\", \"prompt\": \"I stay with Luna.\"}, {\"label\": \"Leave\", \"prompt\": \"I head for the door.\"}]}\n```";

#[cfg(test)]
mod choice_flow_tests {
    use super::*;

    /// Integration test: user types free text instead of picking
    /// Metric: resolves with the text and the custom flag
    #[tokio::test]
    async fn test_custom_text_becomes_next_turn() {
        let mut director = Director::new(DirectorConfig::default());
        let outcome = director.process_turn(RESPONSE).await;
        assert_eq!(outcome.choices.len(), 2);

        let presenter = ChoicePresenter::new(director.config().choice_timeout());
        let input = presenter.clone();
        let answer = tokio::spawn(async move {
            while !input.is_visible() {
                tokio::task::yield_now().await;
            }
            input.submit_custom("I leave the room").unwrap();
        });

        let selection = director.await_choice(&presenter, outcome.choices).await;
        answer.await.unwrap();

        assert_eq!(
            selection,
            Some(ChoiceSelection {
                text: "I leave the room".to_string(),
                is_custom: true,
                index: None,
            })
        );
    }

    /// Integration test: nobody answers
    /// Metric: resolves with nothing after the configured timeout
    #[tokio::test(start_paused = true)]
    async fn test_timeout_resolves_with_nothing() {
        let config = DirectorConfig {
            choice_timeout_secs: 10,
            ..DirectorConfig::default()
        };
        let mut director = Director::new(config);
        let outcome = director.process_turn(RESPONSE).await;

        let presenter = ChoicePresenter::new(director.config().choice_timeout());
        let started = tokio::time::Instant::now();
        let selection = director.await_choice(&presenter, outcome.choices).await;

        assert_eq!(selection, None);
        assert_eq!(presenter.phase(), ChoicePhase::TimedOut);
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    /// Integration test: a session is already open
    /// Metric: a second request is ignored instead of replacing the first
    #[tokio::test]
    async fn test_open_session_is_not_replaced() {
        let mut director = Director::new(DirectorConfig::default());
        let outcome = director.process_turn(RESPONSE).await;

        let presenter = ChoicePresenter::new(Duration::from_secs(60));
        let first = presenter.present(outcome.choices.clone()).unwrap();

        assert_eq!(director.await_choice(&presenter, outcome.choices).await, None);
        assert!(presenter.is_visible());

        presenter.select(0).unwrap();
        assert_eq!(first.wait().await.unwrap().text, "I stay with Luna.");
    }
}
