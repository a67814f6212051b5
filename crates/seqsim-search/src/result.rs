//! Shapes returned to callers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use seqsim_core::{EntryId, ReferenceEntry};

use crate::source::SearchMode;

/// One ranked match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub id: EntryId,
    pub name: String,
    pub organism: String,
    pub description: String,
    pub sequence_length: u32,
    /// Leading residues of the matched sequence.
    pub sequence_snippet: String,
    /// Euclidean distance in the standardized space.
    pub distance: f64,
    /// Display score in `[0, 100]`.
    pub similarity: f64,
}

impl SearchResult {
    #[must_use]
    pub fn new(rank: usize, entry: &ReferenceEntry, distance: f64, similarity: f64) -> Self {
        Self {
            rank,
            id: entry.id.clone(),
            name: entry.name.clone(),
            organism: entry.organism.clone(),
            description: entry.description.clone(),
            sequence_length: entry.sequence_length,
            sequence_snippet: entry.snippet(),
            distance,
            similarity,
        }
    }
}

/// Unique identifier for one prediction, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PredictionId(Uuid);

impl PredictionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PredictionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PredictionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wall-clock timings of one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timing {
    /// Whole pipeline, extraction through result shaping.
    pub total_ms: f64,
    /// Candidate retrieval and ranking only.
    pub search_ms: f64,
}

impl Timing {
    #[must_use]
    pub fn new(total: Duration, search: Duration) -> Self {
        Self {
            total_ms: total.as_secs_f64() * 1000.0,
            search_ms: search.as_secs_f64() * 1000.0,
        }
    }
}

/// The answer to one `predict` call.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub id: PredictionId,
    pub created_at: DateTime<Utc>,
    /// Residues in the query after extraction.
    pub query_length: usize,
    pub mode: Option<SearchMode>,
    /// What the candidate source scanned.
    pub strategy: String,
    pub candidates_scored: usize,
    pub results: Vec<SearchResult>,
    pub timing: Timing,
}

impl Prediction {
    /// The closest match, if any.
    #[must_use]
    pub fn best(&self) -> Option<&SearchResult> {
        self.results.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqsim_core::{ScaledFeatureVector, FEATURE_DIM};

    #[test]
    fn test_search_result_copies_display_fields() {
        let entry = ReferenceEntry::new(
            "P69905",
            "Hemoglobin subunit alpha",
            "M".repeat(60),
            ScaledFeatureVector::new([0.0; FEATURE_DIM]).unwrap(),
        )
        .with_organism("Homo sapiens");

        let result = SearchResult::new(1, &entry, 0.5, 95.0);
        assert_eq!(result.rank, 1);
        assert_eq!(result.id.as_str(), "P69905");
        assert_eq!(result.organism, "Homo sapiens");
        assert_eq!(result.sequence_length, 60);
        assert!(result.sequence_snippet.ends_with("..."));
    }

    #[test]
    fn test_timing_in_milliseconds() {
        let timing = Timing::new(Duration::from_millis(120), Duration::from_micros(2500));
        assert!((timing.total_ms - 120.0).abs() < 1e-9);
        assert!((timing.search_ms - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_ids_are_unique() {
        assert_ne!(PredictionId::new(), PredictionId::new());
    }
}
