//! Draft reply generation.
//!
//! A `ResponseGenerator` turns an email into reply text. The `DraftDesk`
//! runs generators in the background, tracks the per-email generation
//! state and commits drafts back into the corpus.

mod desk;
mod openai;
mod template;

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;

use crate::email::{Email, EmailId};

pub use desk::DraftDesk;
pub use openai::OpenAiGenerator;
pub use template::TemplateGenerator;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenerationError {
    #[error("generation timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),
    #[error("upstream generator failed: {0}")]
    Upstream(String),
    #[error("generation was cancelled")]
    Cancelled,
}

impl GenerationError {
    fn reason(&self) -> FailureReason {
        match self {
            GenerationError::Timeout(_) => FailureReason::Timeout,
            _ => FailureReason::Upstream,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("no email with id `{0}`")]
    UnknownEmail(EmailId),
    #[error("draft text is empty")]
    EmptyDraft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Timeout,
    Upstream,
}

/// Where a generation for one email currently stands.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationState {
    Idle,
    Pending { started_at: DateTime<Utc> },
    Succeeded { text: String },
    Failed { reason: FailureReason, message: String },
    Cancelled,
}

impl GenerationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, GenerationState::Pending { .. })
    }
}

/// Notifications for whoever is presenting drafts (toasts and the like).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftEvent {
    Regenerated { email_id: EmailId },
    GenerationFailed { email_id: EmailId, message: String },
    Saved { email_id: EmailId },
}

#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produce reply text for `email`. Repeated calls may return different
    /// text.
    async fn generate(&self, email: &Email) -> Result<String, GenerationError>;

    fn name(&self) -> &'static str;
}

pub type SharedGenerator = Arc<dyn ResponseGenerator>;

async fn cancelled(mut signal: watch::Receiver<bool>) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            // Sender is gone so cancellation can no longer happen
            pending::<()>().await;
        }
    }
}

/// Run `generator` once, racing it against `timeout` and the `cancel`
/// signal. Blank output counts as an upstream failure.
pub async fn run_generation(
    generator: &dyn ResponseGenerator,
    email: &Email,
    timeout: Duration,
    cancel: watch::Receiver<bool>,
) -> Result<String, GenerationError> {
    let text = tokio::select! {
        // Cancellation wins over a result that is ready in the same poll
        biased;
        _ = cancelled(cancel) => return Err(GenerationError::Cancelled),
        result = tokio::time::timeout(timeout, generator.generate(email)) => match result {
            Ok(outcome) => outcome?,
            Err(_) => return Err(GenerationError::Timeout(timeout)),
        },
    };

    if text.trim().is_empty() {
        return Err(GenerationError::Upstream(format!(
            "{} returned an empty response",
            generator.name()
        )));
    }
    Ok(text)
}
