pub mod config;
pub mod features;
pub mod predict;
pub mod status;

pub use features::show_features;
pub use predict::{run_predict, PredictArgs};
pub use status::show_status;
