//! Public types for the emails API
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::email::Email;
use crate::query::PriorityFilter;

pub const DEFAULT_RECENT_LIMIT: usize = 3;

#[derive(Deserialize)]
pub struct EmailListQuery {
    pub search: Option<String>,
    pub priority: Option<PriorityFilter>,
}

#[derive(Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct EmailListResponse {
    pub emails: Vec<Arc<Email>>,
    pub total: usize,
}

impl From<Vec<Arc<Email>>> for EmailListResponse {
    fn from(emails: Vec<Arc<Email>>) -> Self {
        Self {
            total: emails.len(),
            emails,
        }
    }
}
