use serde::Serialize;

use crate::model::ids::EntryId;
use crate::model::vector::ScaledFeatureVector;

/// Residues shown in a result snippet before truncation.
pub const SNIPPET_LEN: usize = 50;

/// One record of the reference corpus.
///
/// Entries are produced by corpus tooling and only ever read here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceEntry {
    pub id: EntryId,

    /// Display name (e.g. "Hemoglobin subunit alpha").
    pub name: String,

    /// Full residue sequence.
    pub sequence: String,

    /// Source organism; empty when the corpus has none.
    pub organism: String,

    /// Free-text description; empty when the corpus has none.
    pub description: String,

    /// Stored sequence length, used by length-windowed scans.
    pub sequence_length: u32,

    /// Precomputed standardized features.
    pub features: ScaledFeatureVector,
}

impl ReferenceEntry {
    #[must_use]
    pub fn new(
        id: impl Into<EntryId>,
        name: impl Into<String>,
        sequence: impl Into<String>,
        features: ScaledFeatureVector,
    ) -> Self {
        let sequence = sequence.into();
        let sequence_length = u32::try_from(sequence.len()).unwrap_or(u32::MAX);
        Self {
            id: id.into(),
            name: name.into(),
            sequence,
            organism: String::new(),
            description: String::new(),
            sequence_length,
            features,
        }
    }

    #[must_use]
    pub fn with_organism(mut self, organism: impl Into<String>) -> Self {
        self.organism = organism.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The first [`SNIPPET_LEN`] residues, with `...` when truncated.
    #[must_use]
    pub fn snippet(&self) -> String {
        match self.sequence.get(..SNIPPET_LEN) {
            Some(head) if self.sequence.len() > SNIPPET_LEN => format!("{head}..."),
            _ => self.sequence.clone(),
        }
    }
}
