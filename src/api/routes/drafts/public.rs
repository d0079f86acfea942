//! Public types for the drafts API
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::email::{Email, EmailId};
use crate::responder::GenerationState;

#[derive(Deserialize)]
pub struct SaveDraftRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct SaveDraftResponse {
    pub email: Arc<Email>,
}

#[derive(Deserialize)]
pub struct GenerateQuery {
    pub timeout_secs: Option<u64>,
}

#[derive(Serialize)]
pub struct GenerationResponse {
    pub email_id: EmailId,
    pub generator: &'static str,
    #[serde(flatten)]
    pub state: GenerationState,
}
