pub mod entry;
pub mod ids;
pub mod vector;

pub use entry::ReferenceEntry;
pub use ids::EntryId;
pub use vector::{FeatureVector, ScaledFeatureVector, FEATURE_DIM, FEATURE_NAMES};
