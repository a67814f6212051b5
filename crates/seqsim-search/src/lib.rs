//! Nearest-neighbor search over the seqsim reference corpus.
//!
//! A [`Predictor`] turns a protein sequence into a ranked list of the most
//! similar reference entries: composition features are extracted, scaled,
//! compared by Euclidean distance against a selected set of candidates and
//! reported with a bounded similarity percentage.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod context;
pub mod distance;
pub mod error;
pub mod pipeline;
pub mod ranker;
pub mod result;
pub mod source;

pub use config::Config;
pub use context::SearchContext;
pub use distance::{euclidean, SimilarityScale, DEFAULT_SIMILARITY_SCALE};
pub use error::{Result, SearchError};
pub use pipeline::Predictor;
pub use ranker::{search, Deadline, EuclideanRanker, Ranker, Ranking};
pub use result::{Prediction, PredictionId, SearchResult, Timing};
pub use source::{CandidateSource, FullScan, LengthWindow, SearchMode};
