use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use super::{
    DraftError, DraftEvent, GenerationError, GenerationState, SharedGenerator, run_generation,
};
use crate::email::{CorpusStore, Email, EmailId};

const EVENT_CAPACITY: usize = 64;

struct Job {
    generation_id: Uuid,
    state: GenerationState,
    cancel: Option<watch::Sender<bool>>,
}

/// Owns draft writes and background generation for every email in a
/// corpus store.
///
/// Only the most recently started generation for an email may apply its
/// result. Anything older, or anything that finishes after a cancel, is
/// dropped.
#[derive(Clone)]
pub struct DraftDesk {
    store: Arc<CorpusStore>,
    generator: SharedGenerator,
    jobs: Arc<Mutex<HashMap<EmailId, Job>>>,
    events: broadcast::Sender<DraftEvent>,
}

impl DraftDesk {
    pub fn new(store: Arc<CorpusStore>, generator: SharedGenerator) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            generator,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    pub fn store(&self) -> &Arc<CorpusStore> {
        &self.store
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DraftEvent> {
        self.events.subscribe()
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<EmailId, Job>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: DraftEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn lookup(&self, id: &str) -> Result<Arc<Email>, DraftError> {
        self.store
            .snapshot()
            .get(id)
            .cloned()
            .ok_or_else(|| DraftError::UnknownEmail(id.to_string()))
    }

    /// Commit `text` as the draft for `id`. A generation still pending for
    /// the same email is cancelled so it cannot overwrite the saved text.
    pub fn save(&self, id: &str, text: &str) -> Result<Arc<Email>, DraftError> {
        if text.trim().is_empty() {
            return Err(DraftError::EmptyDraft);
        }
        let mut jobs = self.jobs();
        let email = self
            .store
            .set_draft(id, text.to_string())
            .ok_or_else(|| DraftError::UnknownEmail(id.to_string()))?;
        if let Some(job) = jobs.get_mut(id).filter(|job| job.state.is_pending()) {
            if let Some(cancel) = job.cancel.take() {
                let _ = cancel.send(true);
            }
            job.state = GenerationState::Cancelled;
            tracing::info!(
                "Cancelled generation {} for email {} in favor of a saved draft",
                job.generation_id,
                id
            );
        }
        drop(jobs);

        tracing::info!("Saved draft for email {}", id);
        self.emit(DraftEvent::Saved {
            email_id: id.to_string(),
        });
        Ok(email)
    }

    pub fn state(&self, id: &str) -> Result<GenerationState, DraftError> {
        self.lookup(id)?;
        Ok(self
            .jobs()
            .get(id)
            .map(|job| job.state.clone())
            .unwrap_or(GenerationState::Idle))
    }

    /// Start generating a draft for `id` in the background and return the
    /// pending state. A generation already in flight for the same email is
    /// cancelled.
    pub fn start_generation(
        &self,
        id: &str,
        timeout: Duration,
    ) -> Result<GenerationState, DraftError> {
        let email = self.lookup(id)?;
        let generation_id = Uuid::new_v4();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let state = GenerationState::Pending {
            started_at: Utc::now(),
        };

        {
            let mut jobs = self.jobs();
            if let Some(previous) = jobs.get(id) {
                if let Some(cancel) = &previous.cancel {
                    tracing::debug!(
                        "Superseding generation {} for email {}",
                        previous.generation_id,
                        id
                    );
                    let _ = cancel.send(true);
                }
            }
            jobs.insert(
                id.to_string(),
                Job {
                    generation_id,
                    state: state.clone(),
                    cancel: Some(cancel_tx),
                },
            );
        }

        tracing::info!(
            "Generating draft for email {} with {} (generation {})",
            id,
            self.generator.name(),
            generation_id
        );

        let desk = self.clone();
        tokio::spawn(async move {
            let outcome =
                run_generation(desk.generator.as_ref(), &email, timeout, cancel_rx).await;
            desk.finish(&email.id, generation_id, outcome);
        });

        Ok(state)
    }

    /// Abandon the in-flight generation for `id`. A result that arrives
    /// later is discarded.
    pub fn cancel(&self, id: &str) -> Result<GenerationState, DraftError> {
        self.lookup(id)?;
        let mut jobs = self.jobs();
        let Some(job) = jobs.get_mut(id) else {
            return Ok(GenerationState::Idle);
        };
        if job.state.is_pending() {
            if let Some(cancel) = job.cancel.take() {
                let _ = cancel.send(true);
            }
            job.state = GenerationState::Cancelled;
            tracing::info!("Cancelled generation {} for email {}", job.generation_id, id);
        }
        Ok(job.state.clone())
    }

    fn finish(&self, id: &str, generation_id: Uuid, outcome: Result<String, GenerationError>) {
        let mut jobs = self.jobs();
        let Some(job) = jobs.get_mut(id) else {
            return;
        };
        if job.generation_id != generation_id || !job.state.is_pending() {
            tracing::debug!("Discarding stale generation {} for email {}", generation_id, id);
            return;
        }
        job.cancel = None;

        match outcome {
            Ok(text) => {
                if self.store.set_draft(id, text.clone()).is_none() {
                    // The record vanished from the corpus while generating
                    tracing::warn!("Dropping generated draft for unknown email {}", id);
                    jobs.remove(id);
                    return;
                }
                job.state = GenerationState::Succeeded { text };
                tracing::info!("Generated draft for email {}", id);
                self.emit(DraftEvent::Regenerated {
                    email_id: id.to_string(),
                });
            }
            Err(GenerationError::Cancelled) => {
                job.state = GenerationState::Cancelled;
            }
            Err(e) => {
                tracing::error!("Draft generation for email {} failed: {}", id, e);
                let message = e.to_string();
                job.state = GenerationState::Failed {
                    reason: e.reason(),
                    message: message.clone(),
                };
                self.emit(DraftEvent::GenerationFailed {
                    email_id: id.to_string(),
                    message,
                });
            }
        }
    }
}
