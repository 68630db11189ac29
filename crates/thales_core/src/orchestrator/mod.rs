//! Batch orchestrator for voice/video pairs.
//!
//! Each discovered pair runs through a short pipeline of steps that
//! validate, execute, and record their results. The batch processor
//! drives discovery, the per-pair pipeline, and aggregation.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor::run(directory)
//!     ├── locate_pairs
//!     ├── for each pair: Pipeline
//!     │       ├── Step: Detect
//!     │       └── Step: Report
//!     └── build_summary
//! ```

mod batch;
pub mod digest;
mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use batch::{create_pair_pipeline, BatchProcessor, COMPLETE_TITLE, START_TITLE};
pub use errors::{error_chain, PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{HaltedStep, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{DetectStep, ReportStep};
pub use types::{
    BatchConfig, BatchPhase, BatchRun, Context, PairOutcome, PairResult, PairState, StepOutcome,
};
