//! Support email records and the corpus that holds them.

mod corpus;
mod models;

pub use corpus::{Corpus, CorpusStore, IngestError};
pub use models::{ContactInfo, Email, EmailId, InvalidInput, Priority, RawEmail, Sentiment};
