//! Core types for the orchestrator.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{Settings, DEFAULT_FRAME_INTERVAL, DEFAULT_OUTPUT_DIR};
use crate::detection::{DetectionOutcome, EntityDetector};
use crate::logging::RunLogger;
use crate::pairing::{InputPair, SkippedVoiceFile};
use crate::report::{
    report_file_name, BatchSummary, PerPairReport, ReportGenerator, SUMMARY_FILE_NAME,
};

use super::errors::PipelineError;

/// Batch settings passed to the orchestrator at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Directory receiving per-pair reports and the summary.
    pub output_dir: PathBuf,
    /// Seconds between analysed video frames.
    pub interval_seconds: u32,
}

impl BatchConfig {
    pub fn new(output_dir: impl Into<PathBuf>, interval_seconds: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            interval_seconds,
        }
    }

    /// Build from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.paths.output_folder,
            settings.detection.interval_seconds,
        )
    }

    /// Where the report for `video_path` is written.
    pub fn report_path(&self, video_path: &Path) -> PathBuf {
        self.output_dir.join(report_file_name(video_path))
    }

    /// Where the batch summary is written.
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(SUMMARY_FILE_NAME)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR, DEFAULT_FRAME_INTERVAL)
    }
}

/// Read-only context passed to pipeline steps for one pair.
///
/// Mutable results go in `PairState`.
pub struct Context<'a> {
    /// Pair being processed.
    pub pair: &'a InputPair,
    /// Batch settings.
    pub config: &'a BatchConfig,
    /// Detection collaborator.
    pub detector: &'a dyn EntityDetector,
    /// Report collaborator.
    pub reports: &'a dyn ReportGenerator,
    /// Run logger.
    pub logger: &'a RunLogger,
}

impl<'a> Context<'a> {
    /// Display name of the pair (the video file name).
    pub fn pair_name(&self) -> String {
        self.pair.video_name()
    }
}

/// Mutable pair state that accumulates results from pipeline steps.
///
/// Steps add their own section and do not overwrite earlier ones.
#[derive(Debug, Clone, Default)]
pub struct PairState {
    /// Detection results (from Detect step).
    pub detection: Option<DetectionOutcome>,
    /// Built report (from Report step).
    pub report: Option<PerPairReport>,
    /// Where the report was written.
    pub report_path: Option<PathBuf>,
}

impl PairState {
    pub fn has_detection(&self) -> bool {
        self.detection.is_some()
    }

    pub fn has_report(&self) -> bool {
        self.report.is_some()
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Nothing usable to continue with; the remaining steps are not run.
    Skipped(String),
}

/// How one pair ended.
#[derive(Debug)]
pub enum PairOutcome {
    /// Report built and persisted.
    Processed {
        report: PerPairReport,
        report_path: PathBuf,
    },
    /// Detector returned nothing usable.
    SkippedEmpty { reason: String },
    /// A step failed; the error chain is the diagnostic.
    Failed(PipelineError),
}

/// A pair together with its outcome.
#[derive(Debug)]
pub struct PairResult {
    pub pair: InputPair,
    pub outcome: PairOutcome,
}

impl PairResult {
    /// The report, if the pair was processed.
    pub fn report(&self) -> Option<&PerPairReport> {
        match &self.outcome {
            PairOutcome::Processed { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self.outcome, PairOutcome::Processed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, PairOutcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, PairOutcome::SkippedEmpty { .. })
    }
}

/// Phases of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Discovering,
    ProcessingPairs,
    Aggregating,
    Done,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchPhase::Idle => "Idle",
            BatchPhase::Discovering => "Discovering",
            BatchPhase::ProcessingPairs => "Processing pairs",
            BatchPhase::Aggregating => "Aggregating",
            BatchPhase::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Everything a batch run produced.
#[derive(Debug)]
pub struct BatchRun {
    /// Number of pairs discovered.
    pub pairs_found: usize,
    /// Voice files that produced no pair.
    pub skipped_voice_files: Vec<SkippedVoiceFile>,
    /// One entry per discovered pair, in processing order.
    pub results: Vec<PairResult>,
    /// Summary, when at least one report was produced and persisted.
    pub summary: Option<BatchSummary>,
    /// Batch-level failure that stopped the run early.
    pub setup_error: Option<PipelineError>,
    /// Phases visited, in order.
    pub phases: Vec<BatchPhase>,
}

impl BatchRun {
    pub(crate) fn new() -> Self {
        Self {
            pairs_found: 0,
            skipped_voice_files: Vec::new(),
            results: Vec::new(),
            summary: None,
            setup_error: None,
            phases: vec![BatchPhase::Idle],
        }
    }

    pub(crate) fn enter(&mut self, phase: BatchPhase) {
        tracing::debug!("Batch phase: {}", phase);
        self.phases.push(phase);
    }

    /// Current phase.
    pub fn phase(&self) -> BatchPhase {
        self.phases.last().copied().unwrap_or(BatchPhase::Idle)
    }

    /// Reports of processed pairs, in processing order.
    pub fn reports(&self) -> impl Iterator<Item = &PerPairReport> {
        self.results.iter().filter_map(|r| r.report())
    }

    pub fn processed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_processed()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }
}
