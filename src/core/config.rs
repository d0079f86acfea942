use std::env;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::analytics::DEFAULT_RECENCY_WINDOW;
use crate::email::{Corpus, IngestError};
use crate::responder::{OpenAiGenerator, SharedGenerator, TemplateGenerator};

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorKind {
    Template,
    Openai,
}

impl FromStr for GeneratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "template" => Ok(GeneratorKind::Template),
            "openai" => Ok(GeneratorKind::Openai),
            other => Err(format!("unknown generator: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub corpus_path: Option<String>,
    pub recency_window: Duration,
    pub generation_timeout: Duration,
    pub generator: GeneratorKind,
    pub template_delay: Duration,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub openai_model: String,
}

/// Read `key` and parse it, falling back to `default` when the variable is
/// unset or unparseable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, value);
            default
        }),
        Err(_) => default,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let corpus_path = env::var("TRIAGE_CORPUS_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty());
        let recency_window_hours = env_or(
            "TRIAGE_RECENCY_WINDOW_HOURS",
            DEFAULT_RECENCY_WINDOW.as_secs() / 3600,
        );
        let generation_timeout_secs = env_or("TRIAGE_GENERATION_TIMEOUT_SECS", 30u64);
        let generator = env_or("TRIAGE_GENERATOR", GeneratorKind::Template);
        let template_delay_ms = env_or("TRIAGE_TEMPLATE_DELAY_MS", 2000u64);
        let openai_api_hostname = env::var("TRIAGE_OPENAI_API_HOSTNAME")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key =
            env::var("OPENAI_API_KEY").unwrap_or_else(|_| "thiswontworkforopenai".to_string());
        let openai_model =
            env::var("TRIAGE_OPENAI_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string());

        Self {
            corpus_path,
            recency_window: Duration::from_secs(recency_window_hours.max(1).saturating_mul(3600)),
            generation_timeout: Duration::from_secs(generation_timeout_secs.max(1)),
            generator,
            template_delay: Duration::from_millis(template_delay_ms),
            openai_api_hostname,
            openai_api_key,
            openai_model,
        }
    }
}

impl AppConfig {
    /// Load the corpus from `corpus_path`, or the bundled sample emails
    /// when no path is configured.
    pub fn load_corpus(&self) -> Result<Corpus, IngestError> {
        let corpus = match &self.corpus_path {
            Some(path) => Corpus::load(Path::new(path))?,
            None => Corpus::seed(),
        };
        if corpus.excluded() > 0 {
            tracing::warn!(
                "Loaded {} emails, excluded {} malformed records",
                corpus.len(),
                corpus.excluded()
            );
        } else {
            tracing::info!("Loaded {} emails", corpus.len());
        }
        Ok(corpus)
    }

    pub fn response_generator(&self) -> SharedGenerator {
        match self.generator {
            GeneratorKind::Template => Arc::new(TemplateGenerator::new(self.template_delay)),
            GeneratorKind::Openai => Arc::new(OpenAiGenerator::new(
                &self.openai_api_hostname,
                &self.openai_api_key,
                &self.openai_model,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 5] = [
        "TRIAGE_CORPUS_PATH",
        "TRIAGE_RECENCY_WINDOW_HOURS",
        "TRIAGE_GENERATION_TIMEOUT_SECS",
        "TRIAGE_GENERATOR",
        "TRIAGE_TEMPLATE_DELAY_MS",
    ];

    fn clear_env() {
        for key in KEYS {
            // SAFETY: env tests are serialized with `#[serial]`
            unsafe { env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn it_uses_defaults() {
        clear_env();
        let config = AppConfig::default();
        assert_eq!(config.corpus_path, None);
        assert_eq!(config.recency_window, Duration::from_secs(86_400));
        assert_eq!(config.generation_timeout, Duration::from_secs(30));
        assert_eq!(config.generator, GeneratorKind::Template);
        assert_eq!(config.template_delay, Duration::from_millis(2000));
        assert_eq!(config.response_generator().name(), "template");
        assert_eq!(config.load_corpus().unwrap().len(), 5);
    }

    #[test]
    #[serial]
    fn it_reads_overrides() {
        clear_env();
        unsafe {
            env::set_var("TRIAGE_CORPUS_PATH", "/tmp/emails.json");
            env::set_var("TRIAGE_RECENCY_WINDOW_HOURS", "48");
            env::set_var("TRIAGE_GENERATOR", "OpenAI");
        }
        let config = AppConfig::default();
        clear_env();

        assert_eq!(config.corpus_path.as_deref(), Some("/tmp/emails.json"));
        assert_eq!(config.recency_window, Duration::from_secs(48 * 3600));
        assert_eq!(config.generator, GeneratorKind::Openai);
        assert_eq!(config.response_generator().name(), "openai");
    }

    #[test]
    #[serial]
    fn it_ignores_invalid_numbers() {
        clear_env();
        unsafe {
            env::set_var("TRIAGE_GENERATION_TIMEOUT_SECS", "soon");
            env::set_var("TRIAGE_RECENCY_WINDOW_HOURS", "0");
        }
        let config = AppConfig::default();
        clear_env();

        assert_eq!(config.generation_timeout, Duration::from_secs(30));
        // A zero window is raised to one hour
        assert_eq!(config.recency_window, Duration::from_secs(3600));
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    #[serial]
    fn it_warns_about_invalid_values() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        clear_env();
        unsafe { env::set_var("TRIAGE_GENERATION_TIMEOUT_SECS", "soon") };
        tracing::subscriber::with_default(subscriber, AppConfig::default);
        clear_env();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("Ignoring invalid value for TRIAGE_GENERATION_TIMEOUT_SECS"));
    }

    #[test]
    #[serial]
    fn it_loads_corpus_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emails.json");
        std::fs::write(
            &path,
            r#"[{"id":"a","sender":"x@y.com","subject":"s","body":"b","receivedAt":"2024-01-15T09:30:00Z","priority":"low","sentiment":"neutral"},{"id":""}]"#,
        )
        .unwrap();

        clear_env();
        unsafe { env::set_var("TRIAGE_CORPUS_PATH", path.to_str().unwrap()) };
        let config = AppConfig::default();
        clear_env();

        let corpus = config.load_corpus().unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.excluded(), 1);
    }
}
