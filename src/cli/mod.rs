use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

pub mod analytics;
pub mod draft;
pub mod list;
pub mod serve;

use crate::core::{AppConfig, CLI_DIRECTIVES, GeneratorKind, init_tracing, server_directives};
use crate::query::PriorityFilter;

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,

        /// Path to a JSON array of emails, defaults to the sample inbox
        #[arg(long)]
        corpus: Option<String>,

        /// Override TRIAGE_GENERATOR
        #[arg(long, value_enum)]
        generator: Option<GeneratorKind>,
    },
    /// Print the dashboard analytics for the corpus
    Analytics {
        #[arg(long)]
        corpus: Option<String>,
        /// Override the recency window
        #[arg(long)]
        window_hours: Option<u64>,
        /// Evaluate recency as of this RFC 3339 timestamp instead of now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// List emails matching a search term and priority
    List {
        #[arg(long)]
        corpus: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "all")]
        priority: PriorityFilter,
        /// Only show the most recent emails, newest first
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Generate a draft response for one email
    Draft {
        #[arg(long)]
        id: String,
        #[arg(long)]
        corpus: Option<String>,
        #[arg(long)]
        timeout_secs: Option<u64>,
        #[arg(long, value_enum)]
        generator: Option<GeneratorKind>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    /// Default log filter for the chosen command.
    fn log_directives(&self) -> String {
        match self.command {
            Some(Command::Serve { .. }) => server_directives(),
            _ => CLI_DIRECTIVES.to_string(),
        }
    }
}

/// Environment config with the `--corpus` flag applied on top.
fn config_with_corpus(corpus: Option<String>) -> AppConfig {
    let mut config = AppConfig::default();
    if corpus.is_some() {
        config.corpus_path = corpus;
    }
    config
}

fn with_generator(mut config: AppConfig, generator: Option<GeneratorKind>) -> AppConfig {
    if let Some(generator) = generator {
        config.generator = generator;
    }
    config
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Config parsing logs its warnings, so the subscriber goes first
    init_tracing(&args.log_directives());

    // Handle each sub command
    match args.command {
        Some(Command::Serve {
            host,
            port,
            corpus,
            generator,
        }) => {
            let config = with_generator(config_with_corpus(corpus), generator);
            serve::run(host, port, config).await?;
        }
        Some(Command::Analytics {
            corpus,
            window_hours,
            now,
        }) => {
            analytics::run(config_with_corpus(corpus), window_hours, now)?;
        }
        Some(Command::List {
            corpus,
            search,
            priority,
            recent,
        }) => {
            list::run(config_with_corpus(corpus), search, priority, recent)?;
        }
        Some(Command::Draft {
            id,
            corpus,
            timeout_secs,
            generator,
        }) => {
            let config = with_generator(config_with_corpus(corpus), generator);
            draft::run(config, &id, timeout_secs).await?;
        }
        None => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn it_picks_log_directives_per_command() {
        let cli = Cli::try_parse_from(["triage", "serve"]).unwrap();
        assert_eq!(cli.log_directives(), server_directives());

        let cli = Cli::try_parse_from(["triage", "analytics", "--window-hours", "48"]).unwrap();
        assert_eq!(cli.log_directives(), "triage=info");
    }

    #[test]
    #[serial]
    fn it_lets_the_generator_flag_win() {
        let cli = Cli::try_parse_from(["triage", "draft", "--id", "1", "--generator", "openai"])
            .unwrap();
        let Some(Command::Draft { generator, .. }) = cli.command else {
            panic!("expected the draft command");
        };
        assert_eq!(generator, Some(GeneratorKind::Openai));

        let config = with_generator(AppConfig::default(), generator);
        assert_eq!(config.response_generator().name(), "openai");
        assert!(Cli::try_parse_from(["triage", "serve", "--generator", "magic"]).is_err());
    }

    #[test]
    #[serial]
    fn it_lets_the_corpus_flag_win() {
        let config = config_with_corpus(Some("/tmp/inbox.json".to_string()));
        assert_eq!(config.corpus_path.as_deref(), Some("/tmp/inbox.json"));
    }
}
