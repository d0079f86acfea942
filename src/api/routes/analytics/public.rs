//! Public types for the analytics API
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsSnapshot, SentimentShares, SeriesPoint};

/// Query parameters for the analytics snapshot
#[derive(Deserialize)]
pub struct AnalyticsQuery {
    pub window_hours: Option<u64>,
}

/// Snapshot plus the series the dashboard charts are drawn from
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    #[serde(flatten)]
    pub snapshot: AnalyticsSnapshot,
    pub sentiment_shares: SentimentShares,
    pub urgency_series: Vec<SeriesPoint>,
}

impl From<AnalyticsSnapshot> for AnalyticsResponse {
    fn from(snapshot: AnalyticsSnapshot) -> Self {
        Self {
            sentiment_shares: snapshot.sentiment_shares(),
            urgency_series: snapshot.urgency_series(),
            snapshot,
        }
    }
}
