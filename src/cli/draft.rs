use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde_json::json;
use tokio::sync::watch;

use crate::core::AppConfig;
use crate::responder::run_generation;

pub async fn run(config: AppConfig, id: &str, timeout_secs: Option<u64>) -> Result<()> {
    let timeout = match timeout_secs {
        Some(0) => bail!("--timeout-secs must be positive"),
        Some(secs) => Duration::from_secs(secs),
        None => config.generation_timeout,
    };
    let corpus = config.load_corpus()?;
    let email = corpus
        .get(id)
        .ok_or_else(|| anyhow!("Email {} not found", id))?;
    let generator = config.response_generator();

    // Nothing cancels a one-shot run, the sender only has to outlive it
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let draft = run_generation(generator.as_ref(), email, timeout, cancel_rx).await?;

    println!(
        "{}",
        json!({
            "emailId": email.id,
            "generator": generator.name(),
            "draft": draft,
        })
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[tokio::test]
    #[serial]
    async fn it_rejects_a_zero_timeout() {
        let err = run(AppConfig::default(), "1", Some(0)).await.unwrap_err();
        assert!(err.to_string().contains("--timeout-secs must be positive"));
    }

    #[tokio::test]
    #[serial]
    async fn it_rejects_unknown_emails() {
        let err = run(AppConfig::default(), "missing", Some(1)).await.unwrap_err();
        assert!(err.to_string().contains("Email missing not found"));
    }
}
