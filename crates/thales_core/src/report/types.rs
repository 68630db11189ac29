//! Report structures and the folds that build them.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::{DetectionOutcome, FrameDetection};

/// Errors raised while building or persisting reports.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// A contiguous span of frames in which an entity was present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start as `HH:MM:SS`.
    pub start: String,
    /// End as `HH:MM:SS`.
    pub end: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub duration_seconds: f64,
}

impl TimeRange {
    /// Range covering sampled frames from `first` to `last`, each frame
    /// standing for `interval` seconds of video.
    pub fn covering(first: f64, last: f64, interval: u32) -> Self {
        let end = last + f64::from(interval);
        Self {
            start: format_timestamp(first),
            end: format_timestamp(end),
            start_seconds: first,
            end_seconds: end,
            duration_seconds: round2(end - first),
        }
    }
}

/// How often an entity appeared among analysed frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceStatistics {
    pub total_frames_analyzed: usize,
    pub frames_with_entity: usize,
    /// Share of frames containing the entity, 0-100.
    pub presence_percentage: f64,
}

impl PresenceStatistics {
    pub fn new(total_frames_analyzed: usize, frames_with_entity: usize) -> Self {
        let presence_percentage = if total_frames_analyzed == 0 {
            0.0
        } else {
            round2(frames_with_entity as f64 / total_frames_analyzed as f64 * 100.0)
        };
        Self {
            total_frames_analyzed,
            frames_with_entity,
            presence_percentage,
        }
    }

    pub fn is_present(&self) -> bool {
        self.frames_with_entity > 0
    }
}

/// Statistics and time ranges for one entity in one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReport {
    pub statistics: PresenceStatistics,
    pub time_ranges: Vec<TimeRange>,
}

impl EntityReport {
    /// Build from frames sorted by timestamp.
    fn from_frames(entity: &str, frames: &[&FrameDetection], interval: u32) -> Self {
        let mut frames_with_entity = 0;
        let mut time_ranges = Vec::new();
        let mut run: Option<(f64, f64)> = None;

        for frame in frames {
            if frame.contains(entity) {
                frames_with_entity += 1;
                run = match run {
                    Some((first, _)) => Some((first, frame.timestamp_seconds)),
                    None => Some((frame.timestamp_seconds, frame.timestamp_seconds)),
                };
            } else if let Some((first, last)) = run.take() {
                time_ranges.push(TimeRange::covering(first, last, interval));
            }
        }
        if let Some((first, last)) = run {
            time_ranges.push(TimeRange::covering(first, last, interval));
        }

        Self {
            statistics: PresenceStatistics::new(frames.len(), frames_with_entity),
            time_ranges,
        }
    }
}

/// Detection report for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerPairReport {
    /// Video file name.
    pub video_file: String,
    /// Video path as given to the detector.
    pub video_path: PathBuf,
    /// Seconds between analysed frames.
    pub interval_seconds: u32,
    pub total_frames_analyzed: usize,
    /// Per-entity results, keyed by entity name.
    pub entities: BTreeMap<String, EntityReport>,
}

impl PerPairReport {
    /// Fold a detection outcome into a report.
    ///
    /// Every entity that was searched for or seen in a frame gets an
    /// entry, including entities that were never present.
    pub fn from_outcome(video_path: &Path, outcome: &DetectionOutcome) -> Self {
        let mut frames: Vec<&FrameDetection> = outcome.frames.iter().collect();
        frames.sort_by(|a, b| a.timestamp_seconds.total_cmp(&b.timestamp_seconds));

        let names: BTreeSet<&str> = outcome
            .entities
            .iter()
            .chain(frames.iter().flat_map(|f| f.entities.iter()))
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect();

        let entities = names
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    EntityReport::from_frames(name, &frames, outcome.interval_seconds),
                )
            })
            .collect();

        Self {
            video_file: video_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| video_path.display().to_string()),
            video_path: video_path.to_path_buf(),
            interval_seconds: outcome.interval_seconds,
            total_frames_analyzed: frames.len(),
            entities,
        }
    }

    /// Entities present in at least one frame.
    pub fn present_entities(&self) -> Vec<String> {
        self.entities
            .iter()
            .filter(|(_, report)| report.statistics.is_present())
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Short per-video line of the batch summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub video_file: String,
    pub frames_analyzed: usize,
    pub entities_present: Vec<String>,
}

/// Aggregate over all reports of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_videos: usize,
    pub unique_entity_count: usize,
    /// Sorted, distinct entity names across all reports.
    pub all_entities: Vec<String>,
    pub videos: Vec<VideoSummary>,
    /// Videos in which each entity was present.
    pub entity_videos: BTreeMap<String, Vec<String>>,
}

impl BatchSummary {
    /// Fold reports into a summary.
    pub fn from_reports(reports: &[PerPairReport]) -> Self {
        let mut entity_videos: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut videos = Vec::with_capacity(reports.len());

        for report in reports {
            for (name, entity) in &report.entities {
                let seen_in = entity_videos.entry(name.clone()).or_default();
                if entity.statistics.is_present() {
                    seen_in.push(report.video_file.clone());
                }
            }
            videos.push(VideoSummary {
                video_file: report.video_file.clone(),
                frames_analyzed: report.total_frames_analyzed,
                entities_present: report.present_entities(),
            });
        }

        let all_entities: Vec<String> = entity_videos.keys().cloned().collect();

        Self {
            total_videos: reports.len(),
            unique_entity_count: all_entities.len(),
            all_entities,
            videos,
            entity_videos,
        }
    }
}

/// Format seconds as `HH:MM:SS` (fractions are truncated).
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
