//! API routes module

pub mod analytics;
pub mod drafts;
pub mod emails;
mod events;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

pub(crate) type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Dashboard analytics
        .nest("/analytics", analytics::router())
        // Email browsing plus draft editing and generation
        .nest("/emails", emails::router().merge(drafts::router()))
        // Draft change notifications
        .nest("/events", events::router())
}
