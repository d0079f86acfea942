//! Router for the analytics API

use std::time::Duration;

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;
use chrono::Utc;

use super::public;
use crate::analytics::Aggregator;
use crate::api::public::ApiError;
use crate::api::routes::SharedState;

/// Compute a snapshot of the current corpus
async fn get_analytics(
    State(state): State<SharedState>,
    Query(params): Query<public::AnalyticsQuery>,
) -> Result<Json<public::AnalyticsResponse>, ApiError> {
    let aggregator = match params.window_hours {
        Some(0) => return Err(ApiError::bad_request("window_hours must be positive")),
        Some(hours) => match hours.checked_mul(60 * 60) {
            Some(secs) => Aggregator::new(Duration::from_secs(secs)),
            None => return Err(ApiError::bad_request("window_hours is too large")),
        },
        None => state.aggregator,
    };

    let corpus = state.store().snapshot();
    let snapshot = aggregator.snapshot(&corpus, Utc::now());
    tracing::debug!(
        "Computed analytics over {} emails ({} recent)",
        snapshot.total_emails,
        snapshot.recent_count
    );

    Ok(Json(snapshot.into()))
}

/// Create the analytics router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(get_analytics))
}
