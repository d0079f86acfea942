//! Server sent events for draft changes

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt as _};

use crate::api::routes::SharedState;

/// Stream draft events to the client. Subscribers that fall behind skip
/// the events they missed rather than disconnecting.
async fn draft_events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.desk.subscribe()).filter_map(|msg| match msg {
        Ok(event) => match Event::default().json_data(&event) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!("Failed to encode draft event: {}", e);
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("Event subscriber lagged, skipped {} events", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::default()
            .text("keep-alive")
            .interval(Duration::from_secs(15)),
    )
}

/// Create the events router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(draft_events))
}
