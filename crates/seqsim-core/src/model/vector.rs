use serde::Serialize;

use crate::error::{Error, Result};

/// Dimension of every feature vector: log length, 20 residue fractions and
/// 6 group fractions.
pub const FEATURE_DIM: usize = 27;

/// Index of the first residue fraction.
pub const COMPOSITION_OFFSET: usize = 1;

/// Index of the first group fraction.
pub const GROUP_OFFSET: usize = 21;

/// Labels for each feature position, in layout order.
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "log_length",
    "frac_A",
    "frac_C",
    "frac_D",
    "frac_E",
    "frac_F",
    "frac_G",
    "frac_H",
    "frac_I",
    "frac_K",
    "frac_L",
    "frac_M",
    "frac_N",
    "frac_P",
    "frac_Q",
    "frac_R",
    "frac_S",
    "frac_T",
    "frac_V",
    "frac_W",
    "frac_Y",
    "group_hydrophobic",
    "group_positive",
    "group_negative",
    "group_polar",
    "group_aromatic",
    "group_small",
];

/// Raw composition features of one sequence, before standardization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_DIM]);

impl FeatureVector {
    #[must_use]
    pub const fn from_array(values: [f64; FEATURE_DIM]) -> Self {
        Self(values)
    }

    #[must_use]
    pub const fn values(&self) -> &[f64; FEATURE_DIM] {
        &self.0
    }

    /// `ln(1 + len)`.
    #[must_use]
    pub const fn log_length(&self) -> f64 {
        self.0[0]
    }

    /// The 20 per-residue fractions in alphabet order.
    #[must_use]
    pub fn composition(&self) -> &[f64] {
        &self.0[COMPOSITION_OFFSET..GROUP_OFFSET]
    }

    /// The 6 residue-group fractions.
    #[must_use]
    pub fn groups(&self) -> &[f64] {
        &self.0[GROUP_OFFSET..]
    }
}

/// A feature vector in the standardized comparison space.
///
/// Every element is finite. Only these vectors are compared for distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScaledFeatureVector([f64; FEATURE_DIM]);

impl ScaledFeatureVector {
    /// Wrap `values`, rejecting NaN and infinities.
    pub fn new(values: [f64; FEATURE_DIM]) -> Result<Self> {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidData(format!(
                "scaled feature {} ({}) is not finite",
                index, FEATURE_NAMES[index]
            )));
        }
        Ok(Self(values))
    }

    /// Build from a slice that must hold exactly [`FEATURE_DIM`] finite values.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; FEATURE_DIM] = values.try_into().map_err(|_| {
            Error::InvalidData(format!(
                "expected {} features, found {}",
                FEATURE_DIM,
                values.len()
            ))
        })?;
        Self::new(array)
    }

    #[must_use]
    pub const fn values(&self) -> &[f64; FEATURE_DIM] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_vector_rejects_nan() {
        let mut values = [0.0; FEATURE_DIM];
        values[3] = f64::NAN;
        let err = ScaledFeatureVector::new(values).unwrap_err();
        assert!(err.to_string().contains("frac_D"));
    }

    #[test]
    fn test_scaled_vector_from_slice_checks_length() {
        assert!(ScaledFeatureVector::from_slice(&[1.0; 26]).is_err());
        assert!(ScaledFeatureVector::from_slice(&[1.0; 28]).is_err());
        let v = ScaledFeatureVector::from_slice(&[1.0; FEATURE_DIM]).unwrap();
        assert_eq!(v.values()[26], 1.0);
    }

    #[test]
    fn test_feature_vector_sections() {
        let mut values = [0.0; FEATURE_DIM];
        values[0] = 2.0;
        values[GROUP_OFFSET] = 0.5;
        let v = FeatureVector::from_array(values);
        assert_eq!(v.log_length(), 2.0);
        assert_eq!(v.composition().len(), 20);
        assert_eq!(v.groups().len(), 6);
        assert_eq!(v.groups()[0], 0.5);
    }

    #[test]
    fn test_scaled_vector_serializes_as_array() {
        let v = ScaledFeatureVector::new([0.25; FEATURE_DIM]).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: Vec<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), FEATURE_DIM);
    }
}
