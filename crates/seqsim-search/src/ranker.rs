//! Scoring and ordering of candidates.
//!
//! Every candidate is scored and kept, then the whole set is sorted. Scan
//! limits keep candidate counts in the tens of thousands, where a full sort
//! is cheap next to the scan itself.

use std::fmt;
use std::time::{Duration, Instant};

use seqsim_core::{ReferenceEntry, ScaledFeatureVector};

use crate::distance::{euclidean, SimilarityScale};
use crate::error::{Result, SearchError};
use crate::result::SearchResult;

/// Candidates scored between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 256;

/// A point in time after which ranking gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    fn check(&self, scored: usize) -> Result<()> {
        if Instant::now() >= self.at {
            return Err(SearchError::DeadlineExceeded {
                budget_ms: self.budget.as_millis(),
                scored,
            });
        }
        Ok(())
    }
}

/// Output of a ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// At most `top_n` results, ascending by distance.
    pub results: Vec<SearchResult>,
    /// How many candidates were scored.
    pub scored: usize,
}

/// Turns a stream of candidates into an ordered top-N.
pub trait Ranker: Send + Sync + fmt::Debug {
    fn rank(
        &self,
        query: &ScaledFeatureVector,
        candidates: &mut dyn Iterator<Item = seqsim_core::Result<ReferenceEntry>>,
        top_n: usize,
        deadline: Option<Deadline>,
    ) -> Result<Ranking>;
}

/// Exact Euclidean ranking with a stable sort: equal distances keep the
/// order in which the candidate source produced them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EuclideanRanker {
    scale: SimilarityScale,
}

impl EuclideanRanker {
    #[must_use]
    pub const fn new(scale: SimilarityScale) -> Self {
        Self { scale }
    }

    #[must_use]
    pub const fn scale(&self) -> SimilarityScale {
        self.scale
    }
}

impl Ranker for EuclideanRanker {
    fn rank(
        &self,
        query: &ScaledFeatureVector,
        candidates: &mut dyn Iterator<Item = seqsim_core::Result<ReferenceEntry>>,
        top_n: usize,
        deadline: Option<Deadline>,
    ) -> Result<Ranking> {
        if top_n == 0 {
            return Err(SearchError::InvalidRequest(
                "top_n must be at least 1".to_string(),
            ));
        }

        let mut scored: Vec<(f64, ReferenceEntry)> = Vec::new();
        for (index, candidate) in candidates.enumerate() {
            if index % DEADLINE_CHECK_INTERVAL == 0 {
                if let Some(deadline) = &deadline {
                    deadline.check(index)?;
                }
            }
            let entry = candidate?;
            let distance = euclidean(query, &entry.features);
            if !distance.is_finite() {
                return Err(SearchError::NonFiniteDistance {
                    id: entry.id.to_string(),
                });
            }
            scored.push((distance, entry));
        }

        let total = scored.len();
        // `sort_by` is stable.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(top_n);

        let results = scored
            .iter()
            .enumerate()
            .map(|(i, (distance, entry))| {
                SearchResult::new(i + 1, entry, *distance, self.scale.similarity(*distance))
            })
            .collect();

        Ok(Ranking {
            results,
            scored: total,
        })
    }
}

/// Rank `candidates` against `query` with the default Euclidean ranker.
///
/// Returns at most `top_n` results, never more than there are candidates.
pub fn search<I>(
    query: &ScaledFeatureVector,
    candidates: I,
    top_n: usize,
) -> Result<Vec<SearchResult>>
where
    I: IntoIterator<Item = ReferenceEntry>,
{
    let mut stream = candidates
        .into_iter()
        .map(Ok::<ReferenceEntry, seqsim_core::Error>);
    EuclideanRanker::default()
        .rank(query, &mut stream, top_n, None)
        .map(|ranking| ranking.results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqsim_core::FEATURE_DIM;

    fn point(x: f64, y: f64) -> ScaledFeatureVector {
        let mut values = [0.0; FEATURE_DIM];
        values[0] = x;
        values[1] = y;
        ScaledFeatureVector::new(values).unwrap()
    }

    fn entry(id: &str, features: ScaledFeatureVector) -> ReferenceEntry {
        ReferenceEntry::new(id, format!("protein {id}"), "MKTAYIAK", features)
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_three_entry_corpus_top_two() {
        // Distances from the origin: far = 5, near = 1, mid = 2.
        let corpus = vec![
            entry("far", point(3.0, 4.0)),
            entry("near", point(1.0, 0.0)),
            entry("mid", point(0.0, 2.0)),
        ];
        let results = search(&point(0.0, 0.0), corpus, 2).unwrap();

        assert_eq!(ids(&results), ["near", "mid"]);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
        assert!((results[0].distance - 1.0).abs() < 1e-12);
        assert!((results[1].distance - 2.0).abs() < 1e-12);
        assert!((results[0].similarity - 90.0).abs() < 1e-9);
        assert!((results[1].similarity - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_results_sorted_and_bounded() {
        let corpus: Vec<_> = (0..50)
            .map(|i| entry(&format!("P{i}"), point(f64::from((i * 37) % 50), 0.0)))
            .collect();

        for top_n in [1, 7, 50, 80] {
            let results = search(&point(0.0, 0.0), corpus.clone(), top_n).unwrap();
            assert!(results.len() <= top_n);
            assert!(results.len() <= corpus.len());
            assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
            assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
        }
    }

    #[test]
    fn test_ties_keep_retrieval_order() {
        let corpus = vec![
            entry("b", point(1.0, 0.0)),
            entry("a", point(0.0, 1.0)),
            entry("c", point(-1.0, 0.0)),
        ];
        let results = search(&point(0.0, 0.0), corpus, 3).unwrap();
        assert_eq!(ids(&results), ["b", "a", "c"]);
    }

    #[test]
    fn test_empty_candidates_yield_empty_ranking() {
        let mut empty = std::iter::empty::<seqsim_core::Result<ReferenceEntry>>();
        let ranking = EuclideanRanker::default()
            .rank(&point(0.0, 0.0), &mut empty, 5, None)
            .unwrap();
        assert!(ranking.results.is_empty());
        assert_eq!(ranking.scored, 0);
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let err = search(&point(0.0, 0.0), vec![entry("a", point(0.0, 0.0))], 0).unwrap_err();
        assert!(matches!(err, SearchError::InvalidRequest(_)));
    }

    #[test]
    fn test_store_error_aborts_ranking() {
        let mut stream = vec![
            Ok(entry("a", point(0.0, 0.0))),
            Err(seqsim_core::Error::InvalidData("broken row".into())),
            Ok(entry("b", point(1.0, 0.0))),
        ]
        .into_iter();
        let err = EuclideanRanker::default()
            .rank(&point(0.0, 0.0), &mut stream, 5, None)
            .unwrap_err();
        assert!(matches!(err, SearchError::Corpus(_)));
    }

    #[test]
    fn test_overflowing_distance_rejected() {
        let huge = point(f64::MAX, f64::MAX);
        let err = search(&point(-f64::MAX, 0.0), vec![entry("huge", huge)], 1).unwrap_err();
        assert!(matches!(err, SearchError::NonFiniteDistance { .. }));
    }

    fn same_point_corpus(size: usize) -> Vec<seqsim_core::Result<ReferenceEntry>> {
        (0..size)
            .map(|i| Ok(entry(&format!("P{i}"), point(0.0, 0.0))))
            .collect()
    }

    #[test]
    fn test_expired_deadline() {
        let corpus = same_point_corpus(10);
        let deadline = Deadline::after(Duration::ZERO);
        let err = EuclideanRanker::default()
            .rank(&point(0.0, 0.0), &mut corpus.into_iter(), 3, Some(deadline))
            .unwrap_err();
        assert!(matches!(err, SearchError::DeadlineExceeded { scored: 0, .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_generous_deadline() {
        let corpus = same_point_corpus(1000);
        let deadline = Deadline::after(Duration::from_secs(60));
        let ranking = EuclideanRanker::default()
            .rank(&point(0.0, 0.0), &mut corpus.into_iter(), 3, Some(deadline))
            .unwrap();
        assert_eq!(ranking.scored, 1000);
        assert_eq!(ranking.results.len(), 3);
    }

    #[test]
    fn test_custom_similarity_scale() {
        let ranker = EuclideanRanker::new(SimilarityScale::new(4.0).unwrap());
        let mut stream = std::iter::once(seqsim_core::Result::Ok(entry("a", point(1.0, 0.0))));
        let ranking = ranker.rank(&point(0.0, 0.0), &mut stream, 1, None).unwrap();
        assert!((ranking.results[0].similarity - 75.0).abs() < 1e-9);
    }
}
