//! The prediction pipeline: extract → scale → select candidates → rank.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use seqsim_core::alphabet::residue_count;
use seqsim_core::features::extract;

use crate::config::Config;
use crate::context::SearchContext;
use crate::error::{Result, SearchError};
use crate::ranker::{Deadline, EuclideanRanker, Ranker};
use crate::result::{Prediction, PredictionId, Timing};
use crate::source::{CandidateSource, FullScan, LengthWindow, SearchMode};

/// Answers "which reference proteins look like this sequence?".
///
/// Stateless per call: a `Predictor` can be shared across threads and
/// serve concurrent predictions.
#[derive(Debug, Clone)]
pub struct Predictor {
    context: SearchContext,
    ranker: Arc<dyn Ranker>,
    fast: Arc<dyn CandidateSource>,
    exhaustive: Arc<dyn CandidateSource>,
    deadline: Option<Duration>,
}

impl Predictor {
    /// A predictor with the default window, scan limits and similarity scale.
    #[must_use]
    pub fn new(context: SearchContext) -> Self {
        Self {
            context,
            ranker: Arc::new(EuclideanRanker::default()),
            fast: Arc::new(LengthWindow::default()),
            exhaustive: Arc::new(FullScan::default()),
            deadline: None,
        }
    }

    /// A predictor tuned by `config`. Invalid settings are rejected here
    /// rather than surfacing later as empty searches.
    pub fn from_config(context: SearchContext, config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self::new(context)
            .with_ranker(Arc::new(EuclideanRanker::new(config.similarity()?)))
            .with_fast_source(Arc::new(config.length_window()?))
            .with_exhaustive_source(Arc::new(config.full_scan()))
            .with_deadline(config.search_deadline()))
    }

    #[must_use]
    pub fn with_ranker(mut self, ranker: Arc<dyn Ranker>) -> Self {
        self.ranker = ranker;
        self
    }

    #[must_use]
    pub fn with_fast_source(mut self, source: Arc<dyn CandidateSource>) -> Self {
        self.fast = source;
        self
    }

    #[must_use]
    pub fn with_exhaustive_source(mut self, source: Arc<dyn CandidateSource>) -> Self {
        self.exhaustive = source;
        self
    }

    /// Bound the scan-and-score stage of every prediction.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn context(&self) -> &SearchContext {
        &self.context
    }

    /// The candidate source used for `mode`.
    #[must_use]
    pub fn source_for(&self, mode: SearchMode) -> &dyn CandidateSource {
        match mode {
            SearchMode::Fast => self.fast.as_ref(),
            SearchMode::Exhaustive => self.exhaustive.as_ref(),
        }
    }

    /// Find the `top_n` closest reference entries to `sequence`.
    ///
    /// `sequence` is expected to be cleaned by the caller. Fails with
    /// [`SearchError::NoCandidates`] rather than returning an empty result
    /// when the selected source yields nothing.
    pub fn predict(&self, sequence: &str, top_n: usize, mode: SearchMode) -> Result<Prediction> {
        self.run(sequence, top_n, self.source_for(mode), Some(mode))
    }

    /// Like [`Predictor::predict`] with an arbitrary candidate source.
    pub fn predict_with(
        &self,
        sequence: &str,
        top_n: usize,
        source: &dyn CandidateSource,
    ) -> Result<Prediction> {
        self.run(sequence, top_n, source, None)
    }

    /// Run [`Predictor::predict`] on the blocking thread pool so async
    /// callers are not stalled by scanning.
    pub async fn predict_async(
        self: Arc<Self>,
        sequence: String,
        top_n: usize,
        mode: SearchMode,
    ) -> Result<Prediction> {
        tokio::task::spawn_blocking(move || self.predict(&sequence, top_n, mode))
            .await
            .map_err(|e| SearchError::Worker(e.to_string()))?
    }

    fn run(
        &self,
        sequence: &str,
        top_n: usize,
        source: &dyn CandidateSource,
        mode: Option<SearchMode>,
    ) -> Result<Prediction> {
        let started = Instant::now();
        let id = PredictionId::new();

        if top_n == 0 {
            return Err(SearchError::InvalidRequest(
                "top_n must be at least 1".to_string(),
            ));
        }

        let raw = extract(sequence)?;
        let query_length = residue_count(sequence);
        log::debug!("[{id}] extracted features for {query_length} residues");

        let scaled = self.context.scaler().transform(&raw)?;
        log::debug!("[{id}] scaled features");

        let search_started = Instant::now();
        let strategy = source.describe(query_length);
        let ranking = {
            let mut candidates = source.candidates(self.context.store(), query_length)?;
            let deadline = self.deadline.map(Deadline::after);
            self.ranker.rank(&scaled, &mut candidates, top_n, deadline)?
        };
        let search_elapsed = search_started.elapsed();

        if ranking.scored == 0 {
            log::info!("[{id}] no candidates in {strategy}");
            return Err(SearchError::NoCandidates { strategy });
        }

        let timing = Timing::new(started.elapsed(), search_elapsed);
        log::info!(
            "[{id}] {} search ranked {} candidates from {strategy}: \
             {} results in {:.1} ms (search {:.1} ms)",
            mode.map_or_else(|| "custom".to_string(), |m| m.to_string()),
            ranking.scored,
            ranking.results.len(),
            timing.total_ms,
            timing.search_ms
        );

        Ok(Prediction {
            id,
            created_at: Utc::now(),
            query_length,
            mode,
            strategy,
            candidates_scored: ranking.scored,
            results: ranking.results,
            timing,
        })
    }
}
