//! Scheduled worker: summary generation, delivery and run orchestration

pub mod deliver;
pub mod handler;
pub mod pipeline;
pub mod summarize;

// Re-export the main handler for convenience
pub use handler::handler;
pub use pipeline::{Pipeline, PipelineRun, PipelineState, RunOutcome};
