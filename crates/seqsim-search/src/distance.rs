//! Distances in the standardized feature space.

use serde::Serialize;

use seqsim_core::ScaledFeatureVector;

/// Euclidean distance between two standardized vectors.
#[must_use]
pub fn euclidean(a: &ScaledFeatureVector, b: &ScaledFeatureVector) -> f64 {
    a.values()
        .iter()
        .zip(b.values())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Default characteristic distance of the standardized space.
pub const DEFAULT_SIMILARITY_SCALE: f64 = 10.0;

/// Display mapping from distance to a 0–100 similarity score.
///
/// `similarity = clamp(100 * (1 - distance / k), 0, 100)`. The constant `k`
/// is calibrated against the observed distance distribution; the score is a
/// display aid, not a probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityScale {
    k: f64,
}

impl SimilarityScale {
    /// Returns `None` unless `k` is finite and positive.
    #[must_use]
    pub fn new(k: f64) -> Option<Self> {
        (k.is_finite() && k > 0.0).then_some(Self { k })
    }

    #[must_use]
    pub const fn k(&self) -> f64 {
        self.k
    }

    #[must_use]
    pub fn similarity(&self, distance: f64) -> f64 {
        (100.0 * (1.0 - distance / self.k)).clamp(0.0, 100.0)
    }
}

impl Default for SimilarityScale {
    fn default() -> Self {
        Self {
            k: DEFAULT_SIMILARITY_SCALE,
        }
    }
}
