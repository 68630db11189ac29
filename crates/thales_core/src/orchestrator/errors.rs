//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Pair → Step → Operation → Detail

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::detection::DetectionError;
use crate::report::ReportError;

/// Pipeline error with pair context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed while processing a pair.
    #[error("Pair '{pair_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        pair_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// The pipeline finished without recording a report.
    #[error("Pair '{pair_name}' finished without a report")]
    Incomplete { pair_name: String },

    /// The batch could not be set up (output directory, config).
    #[error("Batch setup failed: {message}")]
    SetupFailed {
        message: String,
        #[source]
        source: Option<io::Error>,
    },
}

impl PipelineError {
    /// Create a step failed error.
    pub fn step_failed(
        pair_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            pair_name: pair_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    /// Create an incomplete error.
    pub fn incomplete(pair_name: impl Into<String>) -> Self {
        Self::Incomplete {
            pair_name: pair_name.into(),
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(message: impl Into<String>, source: Option<io::Error>) -> Self {
        Self::SetupFailed {
            message: message.into(),
            source,
        }
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// A required file was not found.
    #[error("Required file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The detector failed.
    #[error("Detection failed: {0}")]
    Detection(#[from] DetectionError),

    /// The report could not be built or written.
    #[error("Report failed: {0}")]
    Report(#[from] ReportError),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Render an error and all of its sources, outermost first.
pub fn error_chain(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut current = err.source();
    while let Some(source) = current {
        chain.push(source.to_string());
        current = source.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_chains_context() {
        let step_err = StepError::file_not_found("/data/video_1.mp4");
        let pipeline_err = PipelineError::step_failed("video_1.mp4", "Detect", step_err);

        let msg = pipeline_err.to_string();
        assert!(msg.contains("video_1.mp4"));
        assert!(msg.contains("Detect"));
    }

    #[test]
    fn error_chain_walks_sources() {
        let detection = DetectionError::CommandFailed {
            tool: "thales-detect".to_string(),
            exit_code: 1,
            message: "bad frame".to_string(),
        };
        let err = PipelineError::step_failed("video_2.mp4", "Detect", detection.into());

        let chain = error_chain(&err);
        assert_eq!(chain.len(), 3);
        assert!(chain[0].starts_with("Pair 'video_2.mp4'"));
        assert!(chain[1].starts_with("Detection failed"));
        assert!(chain[2].contains("bad frame"));
    }

    #[test]
    fn setup_error_without_source() {
        let err = PipelineError::setup_failed("interval must be positive", None);
        assert_eq!(error_chain(&err).len(), 1);
    }
}
