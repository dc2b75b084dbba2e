//! Pipeline orchestration for the run command

mod orchestrator;
mod stats;

pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::PipelineStats;
