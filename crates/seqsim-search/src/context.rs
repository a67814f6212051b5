//! Process-wide collaborators, acquired once and shared read-only.

use std::sync::Arc;

use seqsim_core::{CandidateStore, Error, Scaler, SqliteCorpus, StandardScaler};

use crate::config::Config;

/// The loaded scaler and the open corpus.
///
/// Built once before the first prediction and shared through an [`Arc`].
/// Neither collaborator is mutated after construction, so predictions read
/// them without locking. Dropping the context releases both.
#[derive(Debug, Clone)]
pub struct SearchContext {
    scaler: Arc<dyn Scaler>,
    store: Arc<dyn CandidateStore>,
}

impl SearchContext {
    /// Wrap already-constructed collaborators (stubs in tests, custom
    /// stores).
    #[must_use]
    pub fn new(scaler: Arc<dyn Scaler>, store: Arc<dyn CandidateStore>) -> Self {
        Self { scaler, store }
    }

    /// Load the scaler artifact and open the corpus named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] if either collaborator is
    /// unavailable. Anything acquired before the failure is released.
    pub fn init(config: &Config) -> seqsim_core::Result<Self> {
        log::info!("Initializing search context");
        let scaler = StandardScaler::load(&config.scaler_path)?;
        let store = SqliteCorpus::open(&config.database_path)?;
        let stats = store.stats().map_err(|e| {
            Error::Initialization(format!(
                "cannot read corpus {}: {e}",
                config.database_path.display()
            ))
        })?;
        log::info!(
            "Search context ready: {} reference entries (lengths {}..={})",
            stats.entries,
            stats.min_length.unwrap_or(0),
            stats.max_length.unwrap_or(0)
        );
        Ok(Self::new(Arc::new(scaler), Arc::new(store)))
    }

    #[must_use]
    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    #[must_use]
    pub fn store(&self) -> &dyn CandidateStore {
        self.store.as_ref()
    }

    /// Release the collaborators.
    ///
    /// Other clones of the context keep them alive until they are dropped
    /// too.
    pub fn shutdown(self) {
        log::info!(
            "Shutting down search context ({} other holders of the corpus)",
            Arc::strong_count(&self.store) - 1
        );
        drop(self);
    }
}
