pub mod config;
pub use config::{AppConfig, GeneratorKind};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter for the API server. axum logs rejections from built-in
/// extractors with the `axum::rejection` target, at `TRACE` level.
pub fn server_directives() -> String {
    format!(
        "{}=debug,tower_http=debug,axum::rejection=trace",
        env!("CARGO_CRATE_NAME")
    )
}

/// Default filter for one-shot commands.
pub const CLI_DIRECTIVES: &str = "triage=info";

/// Install the global `tracing` subscriber writing to stderr, leaving
/// stdout to command output. `RUST_LOG` takes precedence over
/// `default_directives`.
pub fn init_tracing(default_directives: &str) {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    // Tests and repeated CLI invocations in one process may install twice
    if let Err(e) = result {
        tracing::debug!("Tracing already initialized: {}", e);
    }
}
