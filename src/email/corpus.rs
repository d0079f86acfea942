//! In-memory corpus snapshots and the copy-on-write store that hands
//! them out.
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use super::models::{Email, EmailId, InvalidInput, RawEmail};

const SEED_EMAILS: &str = include_str!("../../data/mock_emails.json");

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read corpus file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("corpus is not a JSON array of records: {0}")]
    Format(#[from] serde_json::Error),
}

/// An immutable collection of emails at one point in time.
///
/// Records are shared behind `Arc` so that deriving a new corpus (e.g. after
/// saving a draft) only allocates the record that changed.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    emails: Vec<Arc<Email>>,
    index: HashMap<EmailId, usize>,
    excluded: usize,
}

impl Corpus {
    /// Build a corpus from raw ingestion records. Malformed records and
    /// duplicate ids are skipped and counted instead of failing the batch.
    pub fn from_raw<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RawEmail>,
    {
        let mut corpus = Corpus::default();
        for (position, raw) in records.into_iter().enumerate() {
            match Email::try_from(raw).and_then(|email| corpus.push(email)) {
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!("Skipping record at position {}: {}", position, e);
                    corpus.excluded += 1;
                }
            }
        }
        corpus
    }

    /// Build a corpus from records that are already well formed.
    pub fn from_emails<I>(emails: I) -> Self
    where
        I: IntoIterator<Item = Email>,
    {
        let mut corpus = Corpus::default();
        for email in emails {
            if let Err(e) = corpus.push(email) {
                tracing::warn!("Skipping record: {}", e);
                corpus.excluded += 1;
            }
        }
        corpus
    }

    pub fn from_json(json: &str) -> Result<Self, IngestError> {
        let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut raws = Vec::with_capacity(records.len());
        let mut unreadable = 0;
        for value in records {
            match serde_json::from_value::<RawEmail>(value) {
                Ok(raw) => raws.push(raw),
                Err(e) => {
                    // Wrong field types land here, e.g. an unknown priority
                    tracing::warn!("Skipping unreadable record: {}", e);
                    unreadable += 1;
                }
            }
        }
        let mut corpus = Corpus::from_raw(raws);
        corpus.excluded += unreadable;
        Ok(corpus)
    }

    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let json = fs::read_to_string(path).map_err(|source| IngestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Corpus::from_json(&json)
    }

    /// The bundled mock support emails.
    pub fn seed() -> Self {
        Corpus::from_json(SEED_EMAILS).expect("Bundled seed emails are valid JSON")
    }

    fn push(&mut self, email: Email) -> Result<(), InvalidInput> {
        if self.index.contains_key(&email.id) {
            return Err(InvalidInput::DuplicateId(email.id));
        }
        self.index.insert(email.id.clone(), self.emails.len());
        self.emails.push(Arc::new(email));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Email>> {
        self.index.get(id).map(|i| &self.emails[*i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Email>> {
        self.emails.iter()
    }

    pub fn emails(&self) -> &[Arc<Email>] {
        &self.emails
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Number of records rejected while this corpus was built.
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Derive a new corpus where `id` carries `draft` as its response.
    /// Returns `None` when no record has that id.
    pub fn with_draft(&self, id: &str, draft: String) -> Option<Corpus> {
        let position = *self.index.get(id)?;
        let mut updated = (*self.emails[position]).clone();
        updated.draft_response = Some(draft);

        let mut next = self.clone();
        next.emails[position] = Arc::new(updated);
        Some(next)
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Arc<Email>;
    type IntoIter = std::slice::Iter<'a, Arc<Email>>;

    fn into_iter(self) -> Self::IntoIter {
        self.emails.iter()
    }
}

/// Holds the current corpus. Readers take a snapshot and never block
/// writers for longer than an `Arc` clone; writers swap in a new corpus.
#[derive(Debug, Default)]
pub struct CorpusStore {
    current: RwLock<Arc<Corpus>>,
}

impl CorpusStore {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            current: RwLock::new(Arc::new(corpus)),
        }
    }

    pub fn snapshot(&self) -> Arc<Corpus> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Replace the draft for `id` and return the updated record.
    pub fn set_draft(&self, id: &str, draft: String) -> Option<Arc<Email>> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let next = guard.with_draft(id, draft)?;
        let email = next.get(id).cloned();
        *guard = Arc::new(next);
        email
    }
}
