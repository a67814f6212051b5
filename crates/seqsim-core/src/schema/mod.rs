//! The SQLite corpus: schema and read-only access.

pub mod db;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use db::SqliteCorpus;
