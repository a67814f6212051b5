//! FASTA input for batch queries.

use anyhow::{bail, Context, Result};
use bio::io::fasta;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One record, with the sequence lines joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub description: Option<String>,
    pub sequence: String,
}

impl From<&fasta::Record> for FastaRecord {
    fn from(record: &fasta::Record) -> Self {
        Self {
            id: record.id().to_string(),
            description: record.desc().map(str::to_string),
            sequence: String::from_utf8_lossy(record.seq()).into_owned(),
        }
    }
}

/// Read every record from the FASTA file at `path`.
pub fn read_fasta(path: &Path) -> Result<Vec<FastaRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open FASTA file {}", path.display()))?;
    parse_fasta(file).with_context(|| format!("Invalid FASTA file {}", path.display()))
}

/// Parse FASTA from any reader. Fails on the first malformed record.
pub fn parse_fasta<R: Read>(input: R) -> Result<Vec<FastaRecord>> {
    let records = fasta::Reader::new(input)
        .records()
        .enumerate()
        .map(|(i, record)| {
            record
                .map(|r| FastaRecord::from(&r))
                .with_context(|| format!("record {}", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    if records.is_empty() {
        bail!("no FASTA records found");
    }
    Ok(records)
}
