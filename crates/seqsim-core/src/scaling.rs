//! Standardization of raw features into the comparison space.
//!
//! The transform is pretrained elsewhere and shipped as a JSON artifact with
//! per-dimension `mean` and `scale` arrays:
//!
//! ```json
//! { "mean": [ ...27 floats... ], "scale": [ ...27 floats... ] }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::error::{Error, Result};
use crate::model::vector::{FeatureVector, ScaledFeatureVector, FEATURE_DIM, FEATURE_NAMES};

/// A per-call transform failure. The request is rejected; the scaler stays
/// usable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScalingError {
    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("input feature {index} ({name}) is not finite")]
    NonFiniteInput { index: usize, name: &'static str },

    #[error("scaled feature {index} ({name}) is not finite")]
    NonFiniteOutput { index: usize, name: &'static str },
}

/// The standardizing transform behind a narrow capability.
pub trait Scaler: Send + Sync + fmt::Debug {
    fn transform(
        &self,
        raw: &FeatureVector,
    ) -> std::result::Result<ScaledFeatureVector, ScalingError>;
}

#[derive(Debug, Deserialize)]
struct ScalerArtifact {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    n_features_in: Option<usize>,
}

/// Affine standardization `(x - mean) / scale`, one pair per dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardScaler {
    mean: [f64; FEATURE_DIM],
    scale: [f64; FEATURE_DIM],
}

impl StandardScaler {
    /// Build a scaler from explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] when a mean is not finite or a scale is
    /// zero or not finite.
    pub fn new(mean: [f64; FEATURE_DIM], scale: [f64; FEATURE_DIM]) -> Result<Self> {
        for index in 0..FEATURE_DIM {
            if !mean[index].is_finite() {
                return Err(Error::InvalidData(format!(
                    "mean of {} is not finite",
                    FEATURE_NAMES[index]
                )));
            }
            if !scale[index].is_finite() || scale[index] == 0.0 {
                return Err(Error::InvalidData(format!(
                    "scale of {} must be finite and non-zero, got {}",
                    FEATURE_NAMES[index], scale[index]
                )));
            }
        }
        Ok(Self { mean, scale })
    }

    /// The identity map, for tests and stubs.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            mean: [0.0; FEATURE_DIM],
            scale: [1.0; FEATURE_DIM],
        }
    }

    /// Load the scaler artifact at `path`.
    ///
    /// # Errors
    ///
    /// Any failure is an [`Error::Initialization`]: without a transform no
    /// prediction is possible.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Initialization(format!(
                "cannot read scaler artifact {}: {e}",
                path.display()
            ))
        })?;
        let scaler = Self::from_json(&content).map_err(|e| {
            Error::Initialization(format!("scaler artifact {}: {e}", path.display()))
        })?;
        log::info!("Loaded scaler artifact from {}", path.display());
        Ok(scaler)
    }

    /// Parse an artifact from its JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let artifact: ScalerArtifact = serde_json::from_str(content)?;
        if let Some(n) = artifact.n_features_in {
            if n != FEATURE_DIM {
                return Err(Error::InvalidData(format!(
                    "artifact was fitted on {n} features, expected {FEATURE_DIM}"
                )));
            }
        }
        let mean = to_array("mean", &artifact.mean)?;
        let scale = to_array("scale", &artifact.scale)?;
        Self::new(mean, scale)
    }

    #[must_use]
    pub const fn mean(&self) -> &[f64; FEATURE_DIM] {
        &self.mean
    }

    #[must_use]
    pub const fn scale(&self) -> &[f64; FEATURE_DIM] {
        &self.scale
    }

    /// Standardize a plain slice; used where the input length is not
    /// guaranteed by the type.
    pub fn transform_slice(
        &self,
        raw: &[f64],
    ) -> std::result::Result<ScaledFeatureVector, ScalingError> {
        if raw.len() != FEATURE_DIM {
            return Err(ScalingError::DimensionMismatch {
                expected: FEATURE_DIM,
                actual: raw.len(),
            });
        }
        let mut out = [0.0; FEATURE_DIM];
        for (index, slot) in out.iter_mut().enumerate() {
            let x = raw[index];
            if !x.is_finite() {
                return Err(ScalingError::NonFiniteInput {
                    index,
                    name: FEATURE_NAMES[index],
                });
            }
            let scaled = (x - self.mean[index]) / self.scale[index];
            if !scaled.is_finite() {
                return Err(ScalingError::NonFiniteOutput {
                    index,
                    name: FEATURE_NAMES[index],
                });
            }
            *slot = scaled;
        }
        // Every element was checked above.
        ScaledFeatureVector::new(out).map_err(|_| ScalingError::NonFiniteOutput {
            index: 0,
            name: FEATURE_NAMES[0],
        })
    }
}

impl Scaler for StandardScaler {
    fn transform(
        &self,
        raw: &FeatureVector,
    ) -> std::result::Result<ScaledFeatureVector, ScalingError> {
        self.transform_slice(raw.values())
    }
}

fn to_array(field: &str, values: &[f64]) -> Result<[f64; FEATURE_DIM]> {
    values.try_into().map_err(|_| {
        Error::InvalidData(format!(
            "`{field}` has {} values, expected {FEATURE_DIM}",
            values.len()
        ))
    })
}
