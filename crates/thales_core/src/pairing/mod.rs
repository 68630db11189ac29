//! Voice/video pair discovery.
//!
//! This module scans a source directory for voice transcripts and
//! matches each one with a video file by naming convention:
//!
//! ```text
//! voice_<token>.txt  <->  video_<token>.{mkv,mp4,avi,mov}
//! ```
//!
//! Discovery never fails because of a single file. Voice files whose
//! token cannot be parsed, or that have no video, are reported as
//! skipped and contribute no pair.

mod locator;
mod types;

pub use locator::{is_voice_file_name, locate_pairs, video_candidates};
pub use types::{
    Discovery, InputPair, PairToken, PairingError, PairingResult, SkipReason, SkippedVoiceFile,
};

/// File name prefix of voice transcripts.
pub const VOICE_PREFIX: &str = "voice_";

/// Extension of voice transcripts.
pub const VOICE_EXTENSION: &str = "txt";

/// File name prefix of videos.
pub const VIDEO_PREFIX: &str = "video_";

/// Video extensions probed for a token, highest priority first.
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mkv", "mp4", "avi", "mov"];
