use anyhow::Result;
use serde_json::json;

use crate::core::AppConfig;
use crate::query::{EmailQuery, PriorityFilter, filter_emails, recent_first};

pub fn run(
    config: AppConfig,
    search: Option<String>,
    priority: PriorityFilter,
    recent: Option<usize>,
) -> Result<()> {
    let corpus = config.load_corpus()?;
    let query = EmailQuery::new(search.as_deref(), priority);
    let mut emails = filter_emails(&corpus, &query);
    if let Some(limit) = recent {
        emails = recent_first(&emails, limit);
    }

    println!(
        "{}",
        json!({
            "search": search,
            "priority": priority,
            "total": emails.len(),
            "emails": emails,
        })
    );
    Ok(())
}
