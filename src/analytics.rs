//! Summary statistics over a corpus snapshot.
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::email::{Corpus, Email, Priority, Sentiment};

pub const DEFAULT_RECENCY_WINDOW: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBreakdown {
    fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PriorityBreakdown {
    pub urgent: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityBreakdown {
    fn record(&mut self, priority: Priority) {
        match priority {
            Priority::Urgent => self.urgent += 1,
            Priority::High => self.high += 1,
            Priority::Medium => self.medium += 1,
            Priority::Low => self.low += 1,
        }
    }

    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::Urgent => self.urgent,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}

/// Aggregate counts for a corpus at one instant. Never stored; recompute
/// it whenever it is needed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_emails: usize,
    pub urgent_count: usize,
    pub non_urgent_count: usize,
    pub sentiment_breakdown: SentimentBreakdown,
    pub priority_breakdown: PriorityBreakdown,
    pub recent_count: usize,
    pub excluded_count: usize,
    pub window_secs: u64,
    pub computed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub name: &'static str,
    pub value: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SentimentShares {
    pub positive: u8,
    pub neutral: u8,
    pub negative: u8,
}

fn percent(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u8
}

impl AnalyticsSnapshot {
    /// Whole-number percentage of each sentiment, as shown on the
    /// sentiment chart labels.
    pub fn sentiment_shares(&self) -> SentimentShares {
        let SentimentBreakdown {
            positive,
            neutral,
            negative,
        } = self.sentiment_breakdown;
        SentimentShares {
            positive: percent(positive, self.total_emails),
            neutral: percent(neutral, self.total_emails),
            negative: percent(negative, self.total_emails),
        }
    }

    pub fn urgency_series(&self) -> Vec<SeriesPoint> {
        vec![
            SeriesPoint {
                name: "Urgent",
                value: self.urgent_count,
            },
            SeriesPoint {
                name: "Non-Urgent",
                value: self.non_urgent_count,
            },
        ]
    }
}

/// Age of a record relative to `now`. Timestamps in the future count as
/// age zero.
fn age(received_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - received_at).to_std().unwrap_or(Duration::ZERO)
}

/// Compute a snapshot in a single pass over `emails`.
pub fn aggregate<'a, I>(emails: I, now: DateTime<Utc>, window: Duration) -> AnalyticsSnapshot
where
    I: IntoIterator<Item = &'a Email>,
{
    let mut snapshot = AnalyticsSnapshot {
        window_secs: window.as_secs(),
        computed_at: now,
        ..Default::default()
    };

    for email in emails {
        snapshot.total_emails += 1;
        if email.priority == Priority::Urgent {
            snapshot.urgent_count += 1;
        } else {
            snapshot.non_urgent_count += 1;
        }
        snapshot.priority_breakdown.record(email.priority);
        snapshot.sentiment_breakdown.record(email.sentiment);
        if age(email.received_at, now) <= window {
            snapshot.recent_count += 1;
        }
    }

    snapshot
}

/// Computes snapshots with a fixed recency window.
#[derive(Clone, Copy, Debug)]
pub struct Aggregator {
    window: Duration,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_RECENCY_WINDOW)
    }
}

impl Aggregator {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn snapshot(&self, corpus: &Corpus, now: DateTime<Utc>) -> AnalyticsSnapshot {
        let mut snapshot = aggregate(corpus.iter().map(|e| e.as_ref()), now, self.window);
        snapshot.excluded_count = corpus.excluded();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn email(id: &str, priority: Priority, sentiment: Sentiment, received_at: DateTime<Utc>) -> Email {
        Email {
            id: id.to_string(),
            sender: format!("{}@example.com", id),
            subject: format!("Subject {}", id),
            body: format!("Body {}", id),
            received_at,
            priority,
            sentiment,
            tags: vec![],
            contact_info: None,
            draft_response: None,
            is_read: false,
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn five_records() -> Vec<Email> {
        let now = noon();
        vec![
            email("1", Priority::Urgent, Sentiment::Negative, now),
            email("2", Priority::Medium, Sentiment::Neutral, now),
            email("3", Priority::Low, Sentiment::Positive, now),
            email("4", Priority::High, Sentiment::Negative, now),
            email("5", Priority::Medium, Sentiment::Positive, now),
        ]
    }

    #[test]
    fn it_counts_the_five_record_scenario() {
        let emails = five_records();
        let snapshot = aggregate(&emails, noon(), DEFAULT_RECENCY_WINDOW);

        assert_eq!(snapshot.total_emails, 5);
        assert_eq!(snapshot.urgent_count, 1);
        assert_eq!(snapshot.non_urgent_count, 4);
        assert_eq!(
            snapshot.sentiment_breakdown,
            SentimentBreakdown {
                positive: 2,
                neutral: 1,
                negative: 2
            }
        );
        assert_eq!(snapshot.priority_breakdown.get(Priority::Medium), 2);
        assert_eq!(snapshot.recent_count, 5);
    }

    #[test]
    fn it_returns_zeros_for_an_empty_corpus() {
        let snapshot = aggregate(&Vec::<Email>::new(), noon(), DEFAULT_RECENCY_WINDOW);
        assert_eq!(snapshot.total_emails, 0);
        assert_eq!(snapshot.urgent_count, 0);
        assert_eq!(snapshot.non_urgent_count, 0);
        assert_eq!(snapshot.sentiment_breakdown, SentimentBreakdown::default());
        assert_eq!(snapshot.priority_breakdown, PriorityBreakdown::default());
        assert_eq!(snapshot.recent_count, 0);
        assert_eq!(
            snapshot.sentiment_shares(),
            SentimentShares {
                positive: 0,
                neutral: 0,
                negative: 0
            }
        );
    }

    #[test]
    fn it_keeps_partitions_consistent() {
        let now = noon();
        let mut emails = Vec::new();
        for i in 0..40 {
            let priority = Priority::ALL[i % 4];
            let sentiment = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative][i % 3];
            let received = now - chrono::Duration::hours(i as i64 * 3);
            emails.push(email(&i.to_string(), priority, sentiment, received));
        }

        for n in 0..emails.len() {
            let snapshot = aggregate(&emails[..n], now, DEFAULT_RECENCY_WINDOW);
            assert_eq!(snapshot.urgent_count + snapshot.non_urgent_count, snapshot.total_emails);
            assert_eq!(snapshot.sentiment_breakdown.total(), snapshot.total_emails);
            let by_priority: usize = Priority::ALL
                .iter()
                .map(|p| snapshot.priority_breakdown.get(*p))
                .sum();
            assert_eq!(by_priority, snapshot.total_emails);
        }
    }

    #[test]
    fn it_counts_future_timestamps_as_recent() {
        let now = noon();
        let emails = vec![email(
            "skewed",
            Priority::Low,
            Sentiment::Neutral,
            now + chrono::Duration::minutes(1),
        )];
        let snapshot = aggregate(&emails, now, DEFAULT_RECENCY_WINDOW);
        assert_eq!(snapshot.recent_count, 1);
    }

    #[test]
    fn it_includes_the_window_boundary() {
        let now = noon();
        let emails = vec![
            email("edge", Priority::Low, Sentiment::Neutral, now - chrono::Duration::hours(24)),
            email(
                "stale",
                Priority::Low,
                Sentiment::Neutral,
                now - chrono::Duration::hours(24) - chrono::Duration::seconds(1),
            ),
        ];
        let snapshot = aggregate(&emails, now, DEFAULT_RECENCY_WINDOW);
        assert_eq!(snapshot.recent_count, 1);
        assert_eq!(snapshot.window_secs, 86_400);
    }

    #[test]
    fn it_respects_a_custom_window() {
        let now = noon();
        let emails = vec![
            email("a", Priority::Low, Sentiment::Neutral, now - chrono::Duration::minutes(30)),
            email("b", Priority::Low, Sentiment::Neutral, now - chrono::Duration::hours(2)),
        ];
        let aggregator = Aggregator::new(Duration::from_secs(60 * 60));
        let snapshot = aggregator.snapshot(&Corpus::from_emails(emails), now);
        assert_eq!(snapshot.recent_count, 1);
    }

    #[test]
    fn it_summarizes_the_seed_corpus() {
        // 17:00 puts the 2024-01-14T16:30 record just outside the window
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 17, 0, 0).unwrap();
        let snapshot = Aggregator::default().snapshot(&Corpus::seed(), now);

        assert_eq!(snapshot.total_emails, 5);
        assert_eq!(snapshot.urgent_count, 1);
        assert_eq!(snapshot.recent_count, 4);
        assert_eq!(snapshot.excluded_count, 0);
        assert_eq!(
            snapshot.sentiment_shares(),
            SentimentShares {
                positive: 40,
                neutral: 20,
                negative: 40
            }
        );
        assert_eq!(
            snapshot.urgency_series(),
            vec![
                SeriesPoint {
                    name: "Urgent",
                    value: 1
                },
                SeriesPoint {
                    name: "Non-Urgent",
                    value: 4
                },
            ]
        );
    }
}
