//! Pair discovery from a source directory.
//!
//! The directory listing is materialized and sorted before any matching
//! so the resulting order is the same on every platform and filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use super::types::{
    Discovery, InputPair, PairToken, PairingError, PairingResult, SkipReason, SkippedVoiceFile,
};
use super::{VIDEO_EXTENSIONS, VIDEO_PREFIX, VOICE_EXTENSION, VOICE_PREFIX};

/// Check whether a file name follows the `voice_*.txt` pattern.
pub fn is_voice_file_name(name: &str) -> bool {
    name.starts_with(VOICE_PREFIX)
        && name
            .strip_suffix(VOICE_EXTENSION)
            .is_some_and(|rest| rest.ends_with('.') && rest.len() >= VOICE_PREFIX.len() + 1)
}

/// Candidate video paths for a token, in priority order.
pub fn video_candidates(dir: &Path, token: &PairToken) -> Vec<PathBuf> {
    VIDEO_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}{}.{}", VIDEO_PREFIX, token, ext)))
        .collect()
}

/// Find all voice/video pairs in a directory.
///
/// Voice files are processed in ascending file name order. Each one
/// either yields exactly one pair (the first existing video candidate)
/// or a [`SkippedVoiceFile`]. No deduplication is done across tokens.
///
/// # Errors
///
/// Only fails when the directory itself cannot be listed.
pub fn locate_pairs(dir: &Path) -> PairingResult<Discovery> {
    let voice_files = list_voice_files(dir)?;

    tracing::debug!(
        "Found {} voice file(s) in {}",
        voice_files.len(),
        dir.display()
    );

    let mut discovery = Discovery::default();

    for (name, voice_path) in voice_files {
        let token = match PairToken::from_voice_file_name(&name) {
            Some(t) => t,
            None => {
                tracing::warn!("Could not parse number from {}", voice_path.display());
                discovery.skipped.push(SkippedVoiceFile {
                    voice_path,
                    reason: SkipReason::UnparseableName,
                });
                continue;
            }
        };

        let video_path = video_candidates(dir, &token)
            .into_iter()
            .find(|candidate| candidate.is_file());

        match video_path {
            Some(video_path) => {
                let pair = InputPair::new(token, voice_path, video_path);
                tracing::info!("Found pair: {} <-> {}", pair.voice_name(), pair.video_name());
                discovery.pairs.push(pair);
            }
            None => {
                tracing::warn!("No corresponding video found for {}", name);
                discovery.skipped.push(SkippedVoiceFile {
                    voice_path,
                    reason: SkipReason::NoMatchingVideo { token },
                });
            }
        }
    }

    Ok(discovery)
}

/// List `voice_*.txt` regular files, sorted by file name.
fn list_voice_files(dir: &Path) -> PairingResult<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Err(PairingError::DirectoryNotFound(dir.to_path_buf()));
    }

    let read_failed = |source| PairingError::ReadFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_failed)? {
        let entry = entry.map_err(read_failed)?;
        let path = entry.path();

        // Non UTF-8 names cannot follow the naming convention.
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };

        if is_voice_file_name(&name) && path.is_file() {
            files.push((name, path));
        }
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}
