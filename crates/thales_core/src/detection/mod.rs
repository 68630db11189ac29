//! Entity detection boundary.
//!
//! The detection algorithm itself (frame decoding, image analysis,
//! transcript parsing) lives outside this crate. The orchestrator only
//! sees the [`EntityDetector`] trait, which has three possible results
//! for a pair:
//!
//! - `Ok(Some(outcome))` with analysed frames: usable result
//! - `Ok(None)` or an empty outcome: nothing usable, pair is skipped
//! - `Err(_)`: detection failed, pair is isolated as a failure
//!
//! [`CommandDetector`] is the production implementation; it runs an
//! external program and reads its JSON output.

mod command;
mod types;

pub use command::CommandDetector;
pub use types::{DetectionError, DetectionOutcome, DetectionResult, FrameDetection};

use std::path::Path;

/// Runs entity detection over one voice/video pair.
pub trait EntityDetector: Send + Sync {
    /// Detector name (for logging).
    fn name(&self) -> &str;

    /// Detect entities from `voice_path` in frames of `video_path`,
    /// sampling one frame every `interval_seconds`.
    fn detect(
        &self,
        video_path: &Path,
        voice_path: &Path,
        interval_seconds: u32,
    ) -> DetectionResult<Option<DetectionOutcome>>;
}
