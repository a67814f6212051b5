//! Core domain model for seqsim.
//!
//! This crate defines the residue alphabet, composition feature extraction,
//! the standardizing scaler, reference entries, and read-only access to the
//! SQLite reference corpus.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod alphabet;
pub mod error;
pub mod features;
pub mod model;
pub mod scaling;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use features::extract;
pub use model::{EntryId, FeatureVector, ReferenceEntry, ScaledFeatureVector, FEATURE_DIM};
pub use scaling::{Scaler, ScalingError, StandardScaler};
pub use schema::SqliteCorpus;
pub use store::{CandidateStore, CandidateStream, CorpusStats, MemoryCorpus, ScanFilter};
