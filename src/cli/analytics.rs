use std::time::Duration;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::analytics::Aggregator;
use crate::core::AppConfig;

pub fn run(config: AppConfig, window_hours: Option<u64>, now: Option<DateTime<Utc>>) -> Result<()> {
    let window = match window_hours {
        Some(0) => bail!("--window-hours must be positive"),
        Some(hours) => match hours.checked_mul(60 * 60) {
            Some(secs) => Duration::from_secs(secs),
            None => bail!("--window-hours is too large"),
        },
        None => config.recency_window,
    };
    let corpus = config.load_corpus()?;
    let snapshot = Aggregator::new(window).snapshot(&corpus, now.unwrap_or_else(Utc::now));

    println!(
        "{}",
        json!({
            "analytics": snapshot,
            "sentimentShares": snapshot.sentiment_shares(),
            "urgencySeries": snapshot.urgency_series(),
        })
    );
    Ok(())
}
