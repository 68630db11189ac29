//! Detection result and error types.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while running a detector.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to run {tool}: {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    #[error("Failed to parse output of {tool}: {source}")]
    InvalidOutput {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for detection operations.
pub type DetectionResult<T> = Result<T, DetectionError>;

/// Entities seen in one sampled frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetection {
    /// Position of the frame in the video.
    pub timestamp_seconds: f64,
    /// Entities present in the frame.
    #[serde(default)]
    pub entities: Vec<String>,
}

impl FrameDetection {
    pub fn new(timestamp_seconds: f64, entities: Vec<String>) -> Self {
        Self {
            timestamp_seconds,
            entities,
        }
    }

    /// Whether `entity` was seen in this frame, ignoring surrounding whitespace.
    pub fn contains(&self, entity: &str) -> bool {
        let entity = entity.trim();
        self.entities.iter().any(|e| e.trim() == entity)
    }
}

/// Detection result for one voice/video pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionOutcome {
    /// Seconds between sampled frames.
    #[serde(default)]
    pub interval_seconds: u32,
    /// Entities searched for (from the transcript).
    #[serde(default)]
    pub entities: Vec<String>,
    /// Sampled frames.
    #[serde(default)]
    pub frames: Vec<FrameDetection>,
}

impl DetectionOutcome {
    pub fn new(interval_seconds: u32, entities: Vec<String>, frames: Vec<FrameDetection>) -> Self {
        Self {
            interval_seconds,
            entities,
            frames,
        }
    }

    /// True when no frame was analysed.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
