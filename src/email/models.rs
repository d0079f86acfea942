//! Email records as they exist after classification.
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type EmailId = String;

/// Severity assigned by the classifier. Ordered so that `Urgent` is the
/// greatest value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Urgent,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "urgent" => Ok(Priority::Urgent),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// A classified support email.
///
/// Everything except `draft_response` is fixed once the record enters a
/// corpus. Drafts change through `Corpus::with_draft`, which produces a new
/// record rather than touching this one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: EmailId,
    pub sender: String,
    pub subject: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
    pub priority: Priority,
    pub sentiment: Sentiment,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_response: Option<String>,
    #[serde(default)]
    pub is_read: bool,
}

impl Email {
    /// Sender address without the domain, e.g. `sarah.johnson` for
    /// `sarah.johnson@company.com`.
    pub fn sender_local_part(&self) -> &str {
        self.sender.split('@').next().unwrap_or(&self.sender)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidInput {
    #[error("record is missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("record has a blank id")]
    BlankId,
    #[error("duplicate id `{0}`")]
    DuplicateId(EmailId),
}

/// Ingestion form of an email. Every field is optional so one malformed
/// record can be rejected on its own instead of failing a whole batch.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEmail {
    pub id: Option<String>,
    pub sender: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub contact_info: Option<ContactInfo>,
    pub draft_response: Option<String>,
    pub is_read: Option<bool>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, InvalidInput> {
    value.ok_or(InvalidInput::MissingField { field })
}

impl TryFrom<RawEmail> for Email {
    type Error = InvalidInput;

    fn try_from(raw: RawEmail) -> Result<Self, Self::Error> {
        let id = required(raw.id, "id")?;
        if id.trim().is_empty() {
            return Err(InvalidInput::BlankId);
        }

        Ok(Email {
            id,
            sender: required(raw.sender, "sender")?,
            subject: required(raw.subject, "subject")?,
            body: required(raw.body, "body")?,
            received_at: required(raw.received_at, "receivedAt")?,
            priority: required(raw.priority, "priority")?,
            sentiment: required(raw.sentiment, "sentiment")?,
            tags: raw.tags,
            contact_info: raw.contact_info,
            draft_response: raw.draft_response,
            is_read: raw.is_read.unwrap_or(false),
        })
    }
}
