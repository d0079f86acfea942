use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::api::state::AppState;
use crate::core::{AppConfig, init_tracing, server_directives};
use crate::responder::DraftEvent;

pub fn app(shared_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        // API routes
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

/// Log every draft change until the desk shuts down.
fn spawn_event_log(state: &AppState) {
    let mut events = state.desk.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(DraftEvent::Regenerated { email_id }) => {
                    tracing::info!("Draft regenerated for email {}", email_id)
                }
                Ok(DraftEvent::GenerationFailed { email_id, message }) => {
                    tracing::warn!("Draft generation failed for email {}: {}", email_id, message)
                }
                Ok(DraftEvent::Saved { email_id }) => {
                    tracing::info!("Draft saved for email {}", email_id)
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event log lagged, skipped {} events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> anyhow::Result<()> {
    init_tracing(&server_directives());

    let corpus = config.load_corpus().context("Failed to load email corpus")?;
    let generator = config.response_generator();
    tracing::info!("Drafts are generated with the {} generator", generator.name());

    let app_state = AppState::new(corpus, generator, config);
    let shared_state = Arc::new(app_state);
    spawn_event_log(&shared_state);
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
