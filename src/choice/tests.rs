//! Tests for the choice protocol

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn two_choices() -> Vec<ChoiceDirective> {
    vec![
        ChoiceDirective::new("Stay", "I stay with Luna."),
        ChoiceDirective::new("Run", "I run for the door."),
    ]
}

const TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Default)]
struct CountingView {
    shown: AtomicUsize,
    hidden: AtomicUsize,
}

impl ChoiceView for CountingView {
    fn show(&self, _choices: &[ChoiceDirective]) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hidden.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn custom_text_resolves_as_custom() {
    let presenter = ChoicePresenter::new(TIMEOUT);
    let session = presenter.present(two_choices()).unwrap();

    presenter.submit_custom("I leave the room").unwrap();

    assert_eq!(
        session.wait().await,
        Some(ChoiceSelection {
            text: "I leave the room".to_string(),
            is_custom: true,
            index: None,
        })
    );
    assert_eq!(presenter.phase(), ChoicePhase::Resolved);
    assert!(!presenter.is_visible());
}

#[tokio::test]
async fn selecting_an_offer_yields_its_prompt() {
    let presenter = ChoicePresenter::new(TIMEOUT);
    let session = presenter.present(two_choices()).unwrap();
    assert_eq!(presenter.offered().len(), 2);

    presenter.select(1).unwrap();

    let selection = session.wait().await.unwrap();
    assert_eq!(selection.text, "I run for the door.");
    assert!(!selection.is_custom);
    assert_eq!(selection.index, Some(1));
}

#[tokio::test]
async fn answer_from_another_task() {
    let presenter = ChoicePresenter::new(TIMEOUT);
    let session = presenter.present(two_choices()).unwrap();

    let input = presenter.clone();
    let handle = tokio::spawn(async move {
        tokio::task::yield_now().await;
        input.select(0)
    });

    assert_eq!(session.wait().await.unwrap().text, "I stay with Luna.");
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn unanswered_session_times_out() {
    let view = Arc::new(CountingView::default());
    let presenter = ChoicePresenter::with_view(Duration::from_secs(30), view.clone());
    let session = presenter.present(two_choices()).unwrap();

    assert_eq!(session.wait_outcome().await, ChoiceOutcome::TimedOut);
    assert_eq!(presenter.phase(), ChoicePhase::TimedOut);
    assert!(!presenter.is_visible());
    assert_eq!(view.shown.load(Ordering::SeqCst), 1);
    assert_eq!(view.hidden.load(Ordering::SeqCst), 1);

    assert_eq!(presenter.select(0), Err(ChoiceError::NotAwaiting));
}

#[tokio::test(start_paused = true)]
async fn answer_before_deadline_wins() {
    let presenter = ChoicePresenter::new(Duration::from_secs(30));
    let session = presenter.present(two_choices()).unwrap();

    let input = presenter.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(29)).await;
        input.submit_custom("just in time").unwrap();
    });

    let outcome = session.wait_outcome().await;
    assert!(matches!(outcome, ChoiceOutcome::Selected(ref s) if s.text == "just in time"));
    assert_eq!(presenter.phase(), ChoicePhase::Resolved);
}

#[tokio::test]
async fn dismissal_resolves_with_nothing() {
    let view = Arc::new(CountingView::default());
    let presenter = ChoicePresenter::with_view(TIMEOUT, view.clone());
    let session = presenter.present(two_choices()).unwrap();

    presenter.dismiss().unwrap();

    assert_eq!(session.wait().await, None);
    assert_eq!(presenter.phase(), ChoicePhase::Dismissed);
    assert_eq!(view.hidden.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn only_one_session_at_a_time() {
    let presenter = ChoicePresenter::new(TIMEOUT);
    let first = presenter.present(two_choices()).unwrap();

    assert!(matches!(
        presenter.present(two_choices()),
        Err(ChoiceError::AlreadyAwaiting)
    ));

    presenter.select(0).unwrap();
    assert!(first.wait().await.is_some());

    let second = presenter.present(two_choices()).unwrap();
    presenter.dismiss().unwrap();
    assert!(second.wait().await.is_none());
}

#[test]
fn caller_errors() {
    let presenter = ChoicePresenter::new(TIMEOUT);
    assert_eq!(presenter.select(0), Err(ChoiceError::NotAwaiting));
    assert_eq!(presenter.dismiss(), Err(ChoiceError::NotAwaiting));
    assert_eq!(presenter.phase(), ChoicePhase::Idle);

    let _session = presenter.present(two_choices()).unwrap();
    assert_eq!(
        presenter.select(5),
        Err(ChoiceError::InvalidIndex { index: 5, len: 2 })
    );
    assert_eq!(presenter.submit_custom("   "), Err(ChoiceError::EmptyText));
    assert!(presenter.is_visible());
}

#[tokio::test]
async fn free_text_only_session() {
    let presenter = ChoicePresenter::new(TIMEOUT);
    let session = presenter.present(Vec::new()).unwrap();

    assert_eq!(
        presenter.select(0),
        Err(ChoiceError::InvalidIndex { index: 0, len: 0 })
    );
    presenter.submit_custom("Hello?").unwrap();
    assert_eq!(session.wait().await.unwrap().text, "Hello?");
}

#[tokio::test(start_paused = true)]
async fn session_left_unawaited_still_times_out() {
    let view = Arc::new(CountingView::default());
    let presenter = ChoicePresenter::with_view(Duration::from_secs(30), view.clone());
    let _session = presenter.present(two_choices()).unwrap();

    tokio::time::sleep(Duration::from_secs(31)).await;

    assert_eq!(presenter.phase(), ChoicePhase::TimedOut);
    assert!(!presenter.is_visible());
    assert_eq!(view.hidden.load(Ordering::SeqCst), 1);
    assert!(presenter.present(two_choices()).is_ok());
}

#[tokio::test(start_paused = true)]
async fn cancelled_wait_releases_the_session() {
    let view = Arc::new(CountingView::default());
    let presenter = ChoicePresenter::with_view(Duration::from_secs(30), view.clone());
    let session = presenter.present(two_choices()).unwrap();

    let waiter = tokio::spawn(session.wait());
    tokio::task::yield_now().await;
    waiter.abort();
    assert!(waiter.await.unwrap_err().is_cancelled());

    assert_eq!(presenter.phase(), ChoicePhase::Dismissed);
    assert!(!presenter.is_visible());
    assert_eq!(view.hidden.load(Ordering::SeqCst), 1);

    let next = presenter.present(two_choices()).unwrap();
    presenter.select(1).unwrap();
    assert_eq!(next.wait().await.unwrap().index, Some(1));
}

#[tokio::test]
async fn stale_handle_does_not_dismiss_a_newer_session() {
    let presenter = ChoicePresenter::new(TIMEOUT);
    let first = presenter.present(two_choices()).unwrap();
    presenter.dismiss().unwrap();

    let second = presenter.present(two_choices()).unwrap();
    drop(first);

    assert!(presenter.is_visible());
    presenter.select(0).unwrap();
    assert!(second.wait().await.is_some());
}
