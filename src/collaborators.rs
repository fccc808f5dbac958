//! External collaborator interfaces
//!
//! The pipeline talks to three outside services: an emotion classifier, an
//! asset lookup and the renderers that consume change events. Failures of the
//! first two degrade to a fallback; they never reach the caller.

use crate::error::CollaboratorError;
use crate::types::ChangeEvent;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Classifies narrative text into an expression label
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<String, CollaboratorError>;
}

/// Lists the assets available for backgrounds and characters
#[async_trait]
pub trait AssetLookup: Send + Sync {
    async fn list_backgrounds(&self) -> Result<Vec<String>, CollaboratorError>;

    async fn list_expressions(&self, character_id: &str) -> Result<Vec<String>, CollaboratorError>;

    async fn list_outfits(&self, character_id: &str) -> Result<Vec<String>, CollaboratorError>;
}

/// Receives change events, fire-and-forget
pub trait ChangeSink: Send + Sync {
    fn dispatch(&self, event: &ChangeEvent);
}

/// Asset lookup with nothing in it
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

#[async_trait]
impl AssetLookup for NoAssets {
    async fn list_backgrounds(&self) -> Result<Vec<String>, CollaboratorError> {
        Ok(Vec::new())
    }

    async fn list_expressions(&self, _character_id: &str) -> Result<Vec<String>, CollaboratorError> {
        Ok(Vec::new())
    }

    async fn list_outfits(&self, _character_id: &str) -> Result<Vec<String>, CollaboratorError> {
        Ok(Vec::new())
    }
}

/// Await an asset listing, degrading failures and timeouts to an empty list
pub async fn list_or_empty<F>(what: &str, timeout: Duration, lookup: F) -> Vec<String>
where
    F: Future<Output = Result<Vec<String>, CollaboratorError>>,
{
    let result = tokio::time::timeout(timeout, lookup)
        .await
        .unwrap_or_else(|_| Err(CollaboratorError::timed_out("asset lookup", timeout)));
    match result {
        Ok(items) => items,
        Err(err) => {
            log::warn!("listing {what}: {err}");
            Vec::new()
        }
    }
}

/// Classify text, degrading failures, timeouts and blank labels to `fallback`
pub async fn classify_or_fallback(
    classifier: &dyn EmotionClassifier,
    text: &str,
    fallback: &str,
    timeout: Duration,
) -> String {
    let result = tokio::time::timeout(timeout, classifier.classify(text))
        .await
        .unwrap_or_else(|_| Err(CollaboratorError::timed_out("emotion classifier", timeout)));
    match result {
        Ok(label) if !label.trim().is_empty() => label.trim().to_string(),
        Ok(_) => fallback.to_string(),
        Err(err) => {
            log::warn!("using expression '{fallback}': {err}");
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<String, CollaboratorError>);

    #[async_trait]
    impl EmotionClassifier for Fixed {
        async fn classify(&self, _text: &str) -> Result<String, CollaboratorError> {
            self.0.clone()
        }
    }

    struct Slow;

    #[async_trait]
    impl EmotionClassifier for Slow {
        async fn classify(&self, _text: &str) -> Result<String, CollaboratorError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("joy".to_string())
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn classifier_label_is_trimmed() {
        let label = classify_or_fallback(&Fixed(Ok(" joy ".to_string())), "yay", "neutral", TIMEOUT).await;
        assert_eq!(label, "joy");
    }

    #[tokio::test]
    async fn classifier_failure_falls_back() {
        let classifier = Fixed(Err(CollaboratorError::unavailable("classifier", "offline")));
        let label = classify_or_fallback(&classifier, "yay", "neutral", TIMEOUT).await;
        assert_eq!(label, "neutral");
    }

    #[tokio::test]
    async fn blank_label_falls_back() {
        let label = classify_or_fallback(&Fixed(Ok("  ".to_string())), "yay", "calm", TIMEOUT).await;
        assert_eq!(label, "calm");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_classifier_times_out() {
        let label = classify_or_fallback(&Slow, "yay", "neutral", TIMEOUT).await;
        assert_eq!(label, "neutral");
    }

    #[tokio::test]
    async fn failed_listing_is_empty() {
        let items = list_or_empty("backgrounds", TIMEOUT, async {
            Err(CollaboratorError::failed("assets", "disk on fire"))
        })
        .await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn no_assets_lists_nothing() {
        let items = list_or_empty("backgrounds", TIMEOUT, NoAssets.list_backgrounds()).await;
        assert!(items.is_empty());
        assert!(NoAssets.list_outfits("Luna").await.unwrap().is_empty());
    }
}
