//! Corpus writer for tests.
//!
//! Corpora are produced by external tooling in production. This module
//! exists so tests in this workspace can build small SQLite corpora with the
//! same schema.

use rusqlite::Connection;
use std::path::Path;

use crate::error::Result;
use crate::model::ReferenceEntry;

/// Layout of the `proteins` table as the corpus builder writes it.
pub const CORPUS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS proteins (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    sequence TEXT NOT NULL,
    organism TEXT,
    description TEXT,
    sequence_length INTEGER NOT NULL,
    -- JSON array of 27 floats, already standardized
    features TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_proteins_sequence_length ON proteins(sequence_length);
"#;

/// Create (or extend) a corpus file at `path` holding `entries` in order.
pub fn write_corpus(path: &Path, entries: &[ReferenceEntry]) -> Result<()> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(CORPUS_SCHEMA)?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO proteins (
                id, name, sequence, organism, description, sequence_length, features
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for entry in entries {
            stmt.execute(rusqlite::params![
                entry.id.as_str(),
                entry.name,
                entry.sequence,
                entry.organism,
                entry.description,
                i64::from(entry.sequence_length),
                serde_json::to_string(&entry.features)?,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}
