//! Free-text search and priority filtering over a corpus.
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::email::{Email, Priority};

#[derive(Debug, Error, PartialEq)]
#[error("unknown priority filter `{0}`, expected one of all, urgent, high, medium, low")]
pub struct QueryError(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn matches(&self, priority: Priority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(p) => *p == priority,
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str("all"),
            PriorityFilter::Only(p) => write!(f, "{}", p),
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if normalized == "all" {
            return Ok(PriorityFilter::All);
        }
        normalized
            .parse::<Priority>()
            .map(PriorityFilter::Only)
            .map_err(|_| QueryError(s.to_string()))
    }
}

impl Serialize for PriorityFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PriorityFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A search term plus a priority filter. A record matches when the term
/// is found in its subject, sender or body (ignoring case) and its priority
/// passes the filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmailQuery {
    needle: String,
    priority: PriorityFilter,
}

impl EmailQuery {
    pub fn new(search: Option<&str>, priority: PriorityFilter) -> Self {
        Self {
            needle: search.unwrap_or_default().to_lowercase(),
            priority,
        }
    }

    pub fn search(term: &str) -> Self {
        Self::new(Some(term), PriorityFilter::All)
    }

    pub fn priority(priority: PriorityFilter) -> Self {
        Self::new(None, priority)
    }

    pub fn matches(&self, email: &Email) -> bool {
        self.priority.matches(email.priority) && self.matches_text(email)
    }

    fn matches_text(&self, email: &Email) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        [&email.subject, &email.sender, &email.body]
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

/// Return the records that match `query`, in the order they were given.
pub fn filter_emails<'a, I>(emails: I, query: &EmailQuery) -> Vec<Arc<Email>>
where
    I: IntoIterator<Item = &'a Arc<Email>>,
{
    emails
        .into_iter()
        .filter(|email| query.matches(email))
        .cloned()
        .collect()
}

/// Newest records first, ties kept in corpus order, at most `limit`.
pub fn recent_first<'a, I>(emails: I, limit: usize) -> Vec<Arc<Email>>
where
    I: IntoIterator<Item = &'a Arc<Email>>,
{
    let mut out: Vec<Arc<Email>> = emails.into_iter().cloned().collect();
    // Stable sort keeps corpus order for equal timestamps
    out.sort_by_key(|email| Reverse(email.received_at));
    out.truncate(limit);
    out
}
