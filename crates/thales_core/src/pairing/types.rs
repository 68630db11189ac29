//! Types produced by pair discovery.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::{VOICE_EXTENSION, VOICE_PREFIX};

/// Errors that prevent a directory from being scanned at all.
#[derive(Error, Debug)]
pub enum PairingError {
    #[error("Source directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read source directory {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for pairing operations.
pub type PairingResult<T> = Result<T, PairingError>;

/// Index token shared by a voice file and its video.
///
/// For `voice_12.txt` the token is `12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairToken(String);

impl PairToken {
    /// Extract the token from a voice file name.
    ///
    /// The extension is dropped and the stem is split on `_`; the token is
    /// the second segment, which may be empty (`voice_.txt` gives `""`).
    /// Returns `None` when there is no second segment.
    pub fn from_voice_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name
            .strip_suffix(VOICE_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(file_name);

        stem.split('_').nth(1).map(|segment| Self(segment.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A voice transcript and the video it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPair {
    /// Token both file names share.
    pub token: PairToken,
    /// Path to the voice transcript.
    pub voice_path: PathBuf,
    /// Path to the selected video.
    pub video_path: PathBuf,
}

impl InputPair {
    pub fn new(token: PairToken, voice_path: PathBuf, video_path: PathBuf) -> Self {
        Self {
            token,
            voice_path,
            video_path,
        }
    }

    /// File name of the voice transcript, for display.
    pub fn voice_name(&self) -> String {
        file_name_lossy(&self.voice_path)
    }

    /// File name of the video, for display.
    pub fn video_name(&self) -> String {
        file_name_lossy(&self.video_path)
    }
}

/// Why a voice file produced no pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No token could be parsed from the file name.
    UnparseableName,
    /// None of the candidate videos exist.
    NoMatchingVideo { token: PairToken },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnparseableName => {
                write!(f, "could not parse a token after '{}'", VOICE_PREFIX)
            }
            SkipReason::NoMatchingVideo { token } => {
                write!(f, "no corresponding video found for token '{}'", token)
            }
        }
    }
}

/// A voice file that was matched by name but skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedVoiceFile {
    pub voice_path: PathBuf,
    pub reason: SkipReason,
}

/// Result of scanning a directory.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Pairs in voice file name order.
    pub pairs: Vec<InputPair>,
    /// Voice files that produced no pair.
    pub skipped: Vec<SkippedVoiceFile>,
}

impl Discovery {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of voice files that matched the naming pattern.
    pub fn voice_files_seen(&self) -> usize {
        self.pairs.len() + self.skipped.len()
    }
}

fn file_name_lossy(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
