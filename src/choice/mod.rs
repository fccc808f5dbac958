//! Interactive choice protocol
//!
//! A [`ChoicePresenter`] offers the directive's choices plus a free-text entry
//! and resolves exactly once: with a selection, a dismissal, or a timeout.
//! At most one session awaits input at a time. The deadline starts when the
//! session is presented, so a session nobody waits on still times out, and a
//! session handle dropped before an answer dismisses itself.

use crate::error::ChoiceError;
use crate::types::ChoiceDirective;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[cfg(test)]
mod tests;

/// What the user picked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceSelection {
    /// Text to inject as the next user turn
    pub text: String,
    pub is_custom: bool,
    /// Index of the offered choice, `None` for free text
    pub index: Option<usize>,
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ChoiceOutcome {
    Selected(ChoiceSelection),
    Dismissed,
    TimedOut,
}

impl ChoiceOutcome {
    pub fn into_selection(self) -> Option<ChoiceSelection> {
        match self {
            ChoiceOutcome::Selected(selection) => Some(selection),
            ChoiceOutcome::Dismissed | ChoiceOutcome::TimedOut => None,
        }
    }
}

/// Lifecycle of the presenter; every terminal phase accepts a new session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChoicePhase {
    Idle,
    Awaiting,
    Resolved,
    Dismissed,
    TimedOut,
}

/// UI surface that displays the offered choices
///
/// Called while the presenter holds its lock; implementations must not call
/// back into the presenter.
pub trait ChoiceView: Send + Sync {
    fn show(&self, choices: &[ChoiceDirective]);

    /// Release whatever `show` put on screen
    fn hide(&self);
}

struct Pending {
    id: u64,
    choices: Vec<ChoiceDirective>,
    sender: oneshot::Sender<ChoiceOutcome>,
    deadline: Option<JoinHandle<()>>,
}

struct Inner {
    pending: Option<Pending>,
    phase: ChoicePhase,
    sessions: u64,
}

/// Presents choices and routes the user's answer to the waiting session
///
/// Clones share the same session, so input handlers can hold their own copy.
#[derive(Clone)]
pub struct ChoicePresenter {
    inner: Arc<Mutex<Inner>>,
    timeout: Duration,
    view: Option<Arc<dyn ChoiceView>>,
}

impl ChoicePresenter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                pending: None,
                phase: ChoicePhase::Idle,
                sessions: 0,
            })),
            timeout,
            view: None,
        }
    }

    pub fn with_view(timeout: Duration, view: Arc<dyn ChoiceView>) -> Self {
        Self {
            view: Some(view),
            ..Self::new(timeout)
        }
    }

    /// Whether a session is currently awaiting input
    pub fn is_visible(&self) -> bool {
        self.inner.lock().pending.is_some()
    }

    pub fn phase(&self) -> ChoicePhase {
        self.inner.lock().phase
    }

    /// Choices of the awaiting session, empty when idle
    pub fn offered(&self) -> Vec<ChoiceDirective> {
        self.inner
            .lock()
            .pending
            .as_ref()
            .map(|pending| pending.choices.clone())
            .unwrap_or_default()
    }

    /// Open a session; the returned handle resolves when the user answers
    ///
    /// Inside a tokio runtime the deadline runs on its own task from this
    /// point on. Outside one it only runs while the session is awaited.
    pub fn present(&self, choices: Vec<ChoiceDirective>) -> Result<ChoiceSession, ChoiceError> {
        let (sender, receiver) = oneshot::channel();
        let mut inner = self.inner.lock();
        if inner.pending.is_some() {
            return Err(ChoiceError::AlreadyAwaiting);
        }
        inner.sessions += 1;
        let id = inner.sessions;
        if let Some(view) = &self.view {
            view.show(&choices);
        }
        inner.pending = Some(Pending {
            id,
            choices,
            sender,
            deadline: self.spawn_deadline(id),
        });
        inner.phase = ChoicePhase::Awaiting;
        drop(inner);

        Ok(ChoiceSession {
            id,
            receiver,
            timeout: self.timeout,
            presenter: self.clone(),
        })
    }

    fn spawn_deadline(&self, id: u64) -> Option<JoinHandle<()>> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        let presenter = self.clone();
        Some(handle.spawn(async move {
            tokio::time::sleep(presenter.timeout).await;
            presenter.expire(id);
        }))
    }

    /// Pick one of the offered choices by index
    pub fn select(&self, index: usize) -> Result<(), ChoiceError> {
        let mut inner = self.inner.lock();
        let pending = inner.pending.as_ref().ok_or(ChoiceError::NotAwaiting)?;
        let choice = pending
            .choices
            .get(index)
            .ok_or(ChoiceError::InvalidIndex {
                index,
                len: pending.choices.len(),
            })?;
        let selection = ChoiceSelection {
            text: choice.prompt.clone(),
            is_custom: false,
            index: Some(index),
        };
        self.finish(&mut inner, ChoiceOutcome::Selected(selection), ChoicePhase::Resolved);
        Ok(())
    }

    /// Answer with free text instead of an offered choice
    pub fn submit_custom(&self, text: impl Into<String>) -> Result<(), ChoiceError> {
        let text: String = text.into();
        let text = text.trim();
        let mut inner = self.inner.lock();
        if inner.pending.is_none() {
            return Err(ChoiceError::NotAwaiting);
        }
        if text.is_empty() {
            return Err(ChoiceError::EmptyText);
        }
        let selection = ChoiceSelection {
            text: text.to_string(),
            is_custom: true,
            index: None,
        };
        self.finish(&mut inner, ChoiceOutcome::Selected(selection), ChoicePhase::Resolved);
        Ok(())
    }

    /// Close the session without an answer
    pub fn dismiss(&self) -> Result<(), ChoiceError> {
        let mut inner = self.inner.lock();
        if inner.pending.is_none() {
            return Err(ChoiceError::NotAwaiting);
        }
        self.finish(&mut inner, ChoiceOutcome::Dismissed, ChoicePhase::Dismissed);
        Ok(())
    }

    /// Time out session `id` if it is still the one awaiting input
    fn expire(&self, id: u64) {
        let mut inner = self.inner.lock();
        if inner.pending.as_ref().is_some_and(|pending| pending.id == id) {
            log::debug!("choice session timed out after {:?}", self.timeout);
            self.finish(&mut inner, ChoiceOutcome::TimedOut, ChoicePhase::TimedOut);
        }
    }

    /// Dismiss session `id` whose handle went away before an answer
    fn abandon(&self, id: u64) {
        let mut inner = self.inner.lock();
        if inner.pending.as_ref().is_some_and(|pending| pending.id == id) {
            log::debug!("choice session dropped while awaiting input");
            self.finish(&mut inner, ChoiceOutcome::Dismissed, ChoicePhase::Dismissed);
        }
    }

    fn finish(&self, inner: &mut Inner, outcome: ChoiceOutcome, phase: ChoicePhase) {
        if let Some(pending) = inner.pending.take() {
            if let Some(deadline) = pending.deadline {
                deadline.abort();
            }
            // the session may already be gone; the outcome is then simply dropped
            let _ = pending.sender.send(outcome);
        }
        inner.phase = phase;
        if let Some(view) = &self.view {
            view.hide();
        }
    }
}

/// Handle to one presented session
///
/// Dropping it before an answer arrives dismisses the session.
pub struct ChoiceSession {
    id: u64,
    receiver: oneshot::Receiver<ChoiceOutcome>,
    timeout: Duration,
    presenter: ChoicePresenter,
}

impl ChoiceSession {
    /// Wait for the answer; `None` on dismissal or timeout
    pub async fn wait(self) -> Option<ChoiceSelection> {
        self.wait_outcome().await.into_selection()
    }

    /// Wait for the answer and report how the session ended
    pub async fn wait_outcome(mut self) -> ChoiceOutcome {
        let answer = tokio::time::timeout(self.timeout, &mut self.receiver).await;
        match answer {
            Ok(Ok(outcome)) => outcome,
            // sender dropped without an answer
            Ok(Err(_)) => ChoiceOutcome::Dismissed,
            Err(_) => self.expire(),
        }
    }

    fn expire(&mut self) -> ChoiceOutcome {
        self.presenter.expire(self.id);
        // either the timeout just sent, or an answer landed in the same instant
        self.receiver
            .try_recv()
            .unwrap_or(ChoiceOutcome::TimedOut)
    }
}

impl Drop for ChoiceSession {
    fn drop(&mut self) {
        self.presenter.abandon(self.id);
    }
}
