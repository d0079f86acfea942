//! Router for editing and generating draft responses

use std::time::Duration;

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
};
use axum_extra::extract::Query;
use http::StatusCode;

use super::public;
use crate::api::public::{ApiError, draft_error};
use crate::api::routes::SharedState;
use crate::responder::GenerationState;

fn generation_response(
    state: &SharedState,
    id: String,
    generation: GenerationState,
) -> Json<public::GenerationResponse> {
    Json(public::GenerationResponse {
        email_id: id,
        generator: state.desk.generator_name(),
        state: generation,
    })
}

/// Replace the draft for an email with user edited text
async fn save_draft(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::SaveDraftRequest>,
) -> Result<Json<public::SaveDraftResponse>, ApiError> {
    let email = state.desk.save(&id, &payload.text).map_err(draft_error)?;
    Ok(Json(public::SaveDraftResponse { email }))
}

/// Kick off draft generation in the background
async fn start_generation(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<public::GenerateQuery>,
) -> Result<(StatusCode, Json<public::GenerationResponse>), ApiError> {
    let timeout = match params.timeout_secs {
        Some(0) => return Err(ApiError::bad_request("timeout_secs must be positive")),
        Some(secs) => Duration::from_secs(secs),
        None => state.config.generation_timeout,
    };
    let generation = state
        .desk
        .start_generation(&id, timeout)
        .map_err(draft_error)?;
    Ok((
        StatusCode::ACCEPTED,
        generation_response(&state, id, generation),
    ))
}

async fn generation_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::GenerationResponse>, ApiError> {
    let generation = state.desk.state(&id).map_err(draft_error)?;
    Ok(generation_response(&state, id, generation))
}

async fn cancel_generation(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::GenerationResponse>, ApiError> {
    let generation = state.desk.cancel(&id).map_err(draft_error)?;
    Ok(generation_response(&state, id, generation))
}

/// Create the drafts router, mounted alongside the emails router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/{id}/draft", axum::routing::put(save_draft))
        .route(
            "/{id}/generate",
            axum::routing::post(start_generation)
                .get(generation_status)
                .delete(cancel_generation),
        )
}
