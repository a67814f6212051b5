//! Read-only access to the reference corpus.
//!
//! A [`CandidateStore`] yields entries lazily in storage order, either all of
//! them or only those whose stored length falls inside a window. Both scans
//! are bounded by a caller-supplied limit.

use serde::Serialize;
use std::fmt;

use crate::error::Result;
use crate::model::ReferenceEntry;

/// A lazy, bounded stream of corpus entries.
pub type CandidateStream<'a> = Box<dyn Iterator<Item = Result<ReferenceEntry>> + 'a>;

/// Which entries a scan visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanFilter {
    /// Every entry, in storage order.
    All,
    /// Entries with `min_len <= sequence_length <= max_len`.
    LengthWindow { min_len: u32, max_len: u32 },
}

impl ScanFilter {
    #[must_use]
    pub const fn matches(&self, sequence_length: u32) -> bool {
        match *self {
            Self::All => true,
            Self::LengthWindow { min_len, max_len } => {
                sequence_length >= min_len && sequence_length <= max_len
            }
        }
    }
}

impl fmt::Display for ScanFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all entries"),
            Self::LengthWindow { min_len, max_len } => {
                write!(f, "length window [{min_len}, {max_len}]")
            }
        }
    }
}

/// Summary of a corpus, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub entries: u64,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
}

/// The read-only reference corpus.
///
/// Implementations must allow concurrent scans from several threads. Nothing
/// here writes to the corpus.
pub trait CandidateStore: Send + Sync + fmt::Debug {
    /// Stream at most `limit` entries matching `filter`, in storage order.
    fn scan(&self, filter: ScanFilter, limit: usize) -> Result<CandidateStream<'_>>;

    fn stats(&self) -> Result<CorpusStats>;

    /// Up to `limit` entries, unfiltered.
    fn scan_all(&self, limit: usize) -> Result<CandidateStream<'_>> {
        self.scan(ScanFilter::All, limit)
    }

    /// Up to `limit` entries with a stored length in `[min_len, max_len]`.
    fn scan_by_length_window(
        &self,
        min_len: u32,
        max_len: u32,
        limit: usize,
    ) -> Result<CandidateStream<'_>> {
        self.scan(ScanFilter::LengthWindow { min_len, max_len }, limit)
    }
}

/// A corpus held in memory. Used by tests and small embedded datasets.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    entries: Vec<ReferenceEntry>,
}

impl MemoryCorpus {
    #[must_use]
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ReferenceEntry> for MemoryCorpus {
    fn from_iter<I: IntoIterator<Item = ReferenceEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl CandidateStore for MemoryCorpus {
    fn scan(&self, filter: ScanFilter, limit: usize) -> Result<CandidateStream<'_>> {
        Ok(Box::new(
            self.entries
                .iter()
                .filter(move |entry| filter.matches(entry.sequence_length))
                .take(limit)
                .cloned()
                .map(Ok),
        ))
    }

    fn stats(&self) -> Result<CorpusStats> {
        let lengths = self.entries.iter().map(|e| e.sequence_length);
        Ok(CorpusStats {
            entries: self.entries.len() as u64,
            min_length: lengths.clone().min(),
            max_length: lengths.max(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ScaledFeatureVector, FEATURE_DIM};

    fn entry(id: &str, len: usize) -> ReferenceEntry {
        ReferenceEntry::new(
            id,
            format!("protein {id}"),
            "A".repeat(len),
            ScaledFeatureVector::new([0.0; FEATURE_DIM]).unwrap(),
        )
    }

    fn corpus() -> MemoryCorpus {
        [("a", 10), ("b", 50), ("c", 100), ("d", 55)]
            .into_iter()
            .map(|(id, len)| entry(id, len))
            .collect()
    }

    fn ids(stream: CandidateStream<'_>) -> Vec<String> {
        stream.map(|e| e.unwrap().id.to_string()).collect()
    }

    #[test]
    fn test_scan_all_keeps_storage_order() {
        assert_eq!(ids(corpus().scan_all(10).unwrap()), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_scan_all_respects_limit() {
        assert_eq!(ids(corpus().scan_all(2).unwrap()), ["a", "b"]);
        assert!(ids(corpus().scan_all(0).unwrap()).is_empty());
    }

    #[test]
    fn test_length_window_is_inclusive() {
        let found = ids(corpus().scan_by_length_window(50, 100, 10).unwrap());
        assert_eq!(found, ["b", "c", "d"]);
    }

    #[test]
    fn test_length_window_limit_applies_after_filter() {
        let found = ids(corpus().scan_by_length_window(50, 100, 2).unwrap());
        assert_eq!(found, ["b", "c"]);
    }

    #[test]
    fn test_empty_window() {
        assert!(ids(corpus().scan_by_length_window(200, 300, 10).unwrap()).is_empty());
        assert!(ids(corpus().scan_by_length_window(60, 40, 10).unwrap()).is_empty());
    }

    #[test]
    fn test_stats() {
        let stats = corpus().stats().unwrap();
        assert_eq!(stats.entries, 4);
        assert_eq!(stats.min_length, Some(10));
        assert_eq!(stats.max_length, Some(100));

        let empty = MemoryCorpus::default().stats().unwrap();
        assert_eq!(empty.min_length, None);
    }

    #[test]
    fn test_filter_display() {
        let filter = ScanFilter::LengthWindow {
            min_len: 16,
            max_len: 24,
        };
        assert_eq!(filter.to_string(), "length window [16, 24]");
    }
}
