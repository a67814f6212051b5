//! Candidate generation strategies.
//!
//! A [`CandidateSource`] decides which corpus entries are worth ranking for a
//! query. Ranking never depends on the strategy, so new ones (hash buckets,
//! spatial indices) can be added without touching [`crate::ranker`].

use serde::{Deserialize, Serialize};
use std::fmt;

use seqsim_core::{CandidateStore, CandidateStream, ScanFilter};

use crate::error::{Result, SearchError};

/// Default scan bound in fast mode.
pub const DEFAULT_FAST_LIMIT: usize = 50_000;

/// Default scan bound in exhaustive mode.
pub const DEFAULT_EXHAUSTIVE_LIMIT: usize = 100_000;

/// Slack on the ratio bounds so that e.g. `0.8 * 20` lands on 16.
const RATIO_EPSILON: f64 = 1e-9;

/// Produces the entries to rank for a query of a given length.
pub trait CandidateSource: Send + Sync + fmt::Debug {
    /// Open a lazy stream of candidates.
    fn candidates<'a>(
        &self,
        store: &'a dyn CandidateStore,
        query_length: usize,
    ) -> Result<CandidateStream<'a>>;

    /// Human-readable description of what was scanned, for logs and
    /// "no candidates" errors.
    fn describe(&self, query_length: usize) -> String;
}

/// Search mode requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Length-windowed approximate search.
    #[default]
    Fast,
    /// Bounded full scan.
    Exhaustive,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => f.write_str("fast"),
            Self::Exhaustive => f.write_str("exhaustive"),
        }
    }
}

/// Scan entries whose stored length lies within `[lower * len, upper * len]`.
///
/// Homologs tend to have similar lengths, so this shrinks the candidate set
/// by roughly an order of magnitude. Homologs whose length diverges beyond
/// the window are missed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthWindow {
    lower: f64,
    upper: f64,
    limit: usize,
}

impl LengthWindow {
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidRequest`] unless
    /// `0 <= lower <= 1 <= upper` and both are finite.
    pub fn new(lower: f64, upper: f64, limit: usize) -> Result<Self> {
        if !(lower.is_finite() && upper.is_finite() && lower >= 0.0 && lower <= 1.0 && upper >= 1.0)
        {
            return Err(SearchError::InvalidRequest(format!(
                "length window ratios must satisfy 0 <= lower <= 1 <= upper, got [{lower}, {upper}]"
            )));
        }
        Ok(Self {
            lower,
            upper,
            limit,
        })
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Inclusive integer length bounds for a query of `query_length`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn bounds(&self, query_length: usize) -> (u32, u32) {
        let len = query_length as f64;
        let to_u32 = |v: f64| v.clamp(0.0, f64::from(u32::MAX)) as u32;
        (
            to_u32((len * self.lower - RATIO_EPSILON).ceil()),
            to_u32((len * self.upper + RATIO_EPSILON).floor()),
        )
    }
}

impl Default for LengthWindow {
    fn default() -> Self {
        Self {
            lower: 0.8,
            upper: 1.2,
            limit: DEFAULT_FAST_LIMIT,
        }
    }
}

impl CandidateSource for LengthWindow {
    fn candidates<'a>(
        &self,
        store: &'a dyn CandidateStore,
        query_length: usize,
    ) -> Result<CandidateStream<'a>> {
        let (min_len, max_len) = self.bounds(query_length);
        Ok(store.scan_by_length_window(min_len, max_len, self.limit)?)
    }

    fn describe(&self, query_length: usize) -> String {
        let (min_len, max_len) = self.bounds(query_length);
        ScanFilter::LengthWindow { min_len, max_len }.to_string()
    }
}

/// Scan the corpus in storage order, up to a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullScan {
    limit: usize,
}

impl FullScan {
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self { limit }
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for FullScan {
    fn default() -> Self {
        Self::new(DEFAULT_EXHAUSTIVE_LIMIT)
    }
}

impl CandidateSource for FullScan {
    fn candidates<'a>(
        &self,
        store: &'a dyn CandidateStore,
        _query_length: usize,
    ) -> Result<CandidateStream<'a>> {
        Ok(store.scan_all(self.limit)?)
    }

    fn describe(&self, _query_length: usize) -> String {
        format!("full scan (first {} entries)", self.limit)
    }
}
