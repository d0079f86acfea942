use std::sync::Arc;

use crate::analytics::Aggregator;
use crate::core::AppConfig;
use crate::email::{Corpus, CorpusStore};
use crate::responder::{DraftDesk, SharedGenerator};

pub struct AppState {
    pub desk: DraftDesk,
    pub aggregator: Aggregator,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(corpus: Corpus, generator: SharedGenerator, config: AppConfig) -> Self {
        let store = Arc::new(CorpusStore::new(corpus));
        Self {
            desk: DraftDesk::new(store, generator),
            aggregator: Aggregator::new(config.recency_window),
            config,
        }
    }

    pub fn store(&self) -> &CorpusStore {
        self.desk.store()
    }
}
