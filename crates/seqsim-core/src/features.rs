//! Deterministic composition features for a protein sequence.
//!
//! The layout is fixed because the scaling artifact is keyed by position:
//!
//! | index  | feature                                  |
//! |--------|------------------------------------------|
//! | 0      | `ln(1 + len)`                            |
//! | 1..=20 | fraction of each residue, alphabet order |
//! | 21..=26| fraction of residues in each group       |
//!
//! `len` counts recognized residues only; unknown symbols are skipped.

use crate::alphabet::{residue_index, AMINO_ACIDS, RESIDUE_GROUPS};
use crate::error::{Error, Result};
use crate::model::vector::{FeatureVector, COMPOSITION_OFFSET, FEATURE_DIM, GROUP_OFFSET};

/// Extract the 27 raw features of `sequence`.
///
/// # Errors
///
/// Returns [`Error::DegenerateInput`] when the sequence holds no alphabet
/// residues.
pub fn extract(sequence: &str) -> Result<FeatureVector> {
    let mut counts = [0_u32; AMINO_ACIDS.len()];
    let mut len = 0_u32;
    for index in sequence.bytes().filter_map(residue_index) {
        counts[index] += 1;
        len += 1;
    }

    if len == 0 {
        return Err(Error::DegenerateInput(if sequence.is_empty() {
            "sequence is empty".to_string()
        } else {
            format!(
                "sequence of {} symbols contains no standard residues",
                sequence.len()
            )
        }));
    }

    let total = f64::from(len);
    let mut values = [0.0; FEATURE_DIM];
    values[0] = total.ln_1p();

    for (slot, &count) in values[COMPOSITION_OFFSET..GROUP_OFFSET]
        .iter_mut()
        .zip(&counts)
    {
        *slot = f64::from(count) / total;
    }

    for (slot, group) in values[GROUP_OFFSET..].iter_mut().zip(&RESIDUE_GROUPS) {
        let in_group: u32 = AMINO_ACIDS
            .iter()
            .zip(&counts)
            .filter(|(&residue, _)| group.contains(residue))
            .map(|(_, &count)| count)
            .sum();
        *slot = f64::from(in_group) / total;
    }

    Ok(FeatureVector::from_array(values))
}
