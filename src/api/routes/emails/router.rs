//! Router for the emails API

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Router,
    extract::{Path, State},
    response::Json,
};
use axum_extra::extract::Query;
use http::StatusCode;

use super::public;
use crate::api::public::ApiError;
use crate::api::routes::SharedState;
use crate::email::Email;
use crate::query::{EmailQuery, filter_emails, recent_first};

/// List emails matching the search term and priority filter
async fn list_emails(
    State(state): State<SharedState>,
    Query(params): Query<public::EmailListQuery>,
) -> Json<public::EmailListResponse> {
    let query = EmailQuery::new(params.search.as_deref(), params.priority.unwrap_or_default());
    let corpus = state.store().snapshot();
    Json(filter_emails(&*corpus, &query).into())
}

/// Most recently received emails first
async fn recent_emails(
    State(state): State<SharedState>,
    Query(params): Query<public::RecentQuery>,
) -> Json<public::EmailListResponse> {
    let limit = params.limit.unwrap_or(public::DEFAULT_RECENT_LIMIT);
    let corpus = state.store().snapshot();
    Json(recent_first(&*corpus, limit).into())
}

async fn get_email(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Arc<Email>>, ApiError> {
    let corpus = state.store().snapshot();
    corpus.get(&id).cloned().map(Json).ok_or_else(|| {
        ApiError::new(StatusCode::NOT_FOUND, anyhow!("Email {} not found", id))
    })
}

/// Create the emails router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", axum::routing::get(list_emails))
        .route("/recent", axum::routing::get(recent_emails))
        .route("/{id}", axum::routing::get(get_email))
}
