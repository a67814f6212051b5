//! Error types for the search pipeline.

use thiserror::Error;

use seqsim_core::ScalingError;

/// Errors that can occur while answering a prediction.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query sequence has nothing to extract features from.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// The scaler rejected the query features.
    #[error("scaling failed: {0}")]
    Scaling(#[from] ScalingError),

    /// The request itself is unusable (e.g. `top_n == 0`).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The candidate source produced nothing to rank.
    #[error("no candidates found in {strategy}")]
    NoCandidates { strategy: String },

    /// The scan-and-score loop ran past its deadline.
    #[error("search deadline of {budget_ms} ms exceeded after scoring {scored} candidates")]
    DeadlineExceeded { budget_ms: u128, scored: usize },

    /// A distance came out as NaN or infinite.
    #[error("non-finite distance to entry {id}")]
    NonFiniteDistance { id: String },

    /// The corpus failed after initialization.
    #[error("corpus unavailable: {0}")]
    Corpus(#[source] seqsim_core::Error),

    /// A blocking worker panicked or was cancelled.
    #[error("worker failed: {0}")]
    Worker(String),
}

impl SearchError {
    /// Returns `true` when only this request failed; the pipeline stays
    /// healthy and later requests may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DegenerateInput(_)
                | Self::Scaling(_)
                | Self::InvalidRequest(_)
                | Self::NoCandidates { .. }
                | Self::DeadlineExceeded { .. }
        )
    }

    /// Returns `true` when the error means no candidates matched.
    pub fn is_no_candidates(&self) -> bool {
        matches!(self, Self::NoCandidates { .. })
    }
}

impl From<seqsim_core::Error> for SearchError {
    fn from(err: seqsim_core::Error) -> Self {
        match err {
            seqsim_core::Error::DegenerateInput(message) => Self::DegenerateInput(message),
            other => Self::Corpus(other),
        }
    }
}

/// Convenience alias for pipeline results.
pub type Result<T> = std::result::Result<T, SearchError>;
