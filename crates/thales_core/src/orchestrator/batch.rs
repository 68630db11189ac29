//! Batch processor that runs every discovered pair through the pipeline.
//!
//! The processor owns the collaborators (detector, report generator,
//! logger) and drives one run:
//!
//! ```text
//! Idle -> Discovering -> ProcessingPairs -> Aggregating -> Done
//! ```
//!
//! Pairs are processed sequentially in discovery order. A failing pair is
//! reported and the batch moves on; only batch setup problems end a run
//! early, and even then the completion banner is printed.

use std::fs;
use std::path::Path;

use crate::detection::EntityDetector;
use crate::logging::RunLogger;
use crate::pairing::{locate_pairs, InputPair};
use crate::report::{PerPairReport, ReportGenerator};

use super::digest::{report_digest, summary_digest};
use super::errors::{error_chain, PipelineError};
use super::pipeline::Pipeline;
use super::steps::{DetectStep, ReportStep};
use super::types::{
    BatchConfig, BatchPhase, BatchRun, Context, PairOutcome, PairResult, PairState,
};

/// Title printed in the start banner.
pub const START_TITLE: &str = "Thales - Video Entity Detection Pipeline";
/// Title printed in the completion banner.
pub const COMPLETE_TITLE: &str = "Processing complete!";

/// Create the per-pair pipeline: Detect, then Report.
pub fn create_pair_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(DetectStep::new())
        .with_step(ReportStep::new())
}

/// Runs voice/video pairs through detection and reporting.
///
/// # Example
///
/// ```ignore
/// let processor = BatchProcessor::new(
///     BatchConfig::new("reports", 5),
///     Box::new(CommandDetector::new("thales-detect")),
///     Box::new(JsonReportGenerator::new()),
///     logger,
/// );
/// let run = processor.run(Path::new("./data"));
/// println!("{} processed", run.processed_count());
/// ```
pub struct BatchProcessor {
    /// Output directory and frame interval.
    config: BatchConfig,
    /// Detection collaborator.
    detector: Box<dyn EntityDetector>,
    /// Report collaborator.
    reports: Box<dyn ReportGenerator>,
    /// Operator output.
    logger: RunLogger,
    /// Steps run for each pair.
    pipeline: Pipeline,
}

impl BatchProcessor {
    pub fn new(
        config: BatchConfig,
        detector: Box<dyn EntityDetector>,
        reports: Box<dyn ReportGenerator>,
        logger: RunLogger,
    ) -> Self {
        Self {
            config,
            detector,
            reports,
            logger,
            pipeline: create_pair_pipeline(),
        }
    }

    /// Get the batch settings.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Get the run logger.
    pub fn logger(&self) -> &RunLogger {
        &self.logger
    }

    /// Process every pair in `directory` and aggregate the reports.
    ///
    /// Never fails: problems are logged and recorded in the returned
    /// `BatchRun`.
    pub fn run(&self, directory: &Path) -> BatchRun {
        let mut run = BatchRun::new();

        self.logger.banner(Some(START_TITLE));
        self.logger.info("");
        self.logger.info("1. Finding voice/video pairs...");
        run.enter(BatchPhase::Discovering);

        let pairs = match locate_pairs(directory) {
            Ok(discovery) => {
                if !discovery.skipped.is_empty() {
                    tracing::debug!(
                        "{} voice file(s) produced no pair",
                        discovery.skipped.len()
                    );
                }
                run.skipped_voice_files = discovery.skipped;
                discovery.pairs
            }
            Err(e) => {
                self.logger.error(&e.to_string());
                Vec::new()
            }
        };
        run.pairs_found = pairs.len();

        if pairs.is_empty() {
            self.logger.info("No voice/video pairs found!");
            return self.finish(run);
        }

        self.logger
            .info(&format!("Found {} pair(s) to process", pairs.len()));
        self.logger.info("");

        if let Err(e) = self.prepare_output() {
            self.logger.error(&e.to_string());
            run.setup_error = Some(e);
            return self.finish(run);
        }

        run.enter(BatchPhase::ProcessingPairs);
        run.results = self.process_pairs(&pairs);

        let reports: Vec<PerPairReport> = run.reports().cloned().collect();
        if !reports.is_empty() {
            run.enter(BatchPhase::Aggregating);
            self.logger.info("");
            self.logger.banner(Some("Generating summary report..."));

            let destination = self.config.summary_path();
            match self.reports.build_summary(&reports, &destination) {
                Ok(summary) => {
                    self.logger.info("");
                    for line in summary_digest(&summary) {
                        self.logger.info(&line);
                    }
                    run.summary = Some(summary);
                }
                Err(e) => {
                    self.logger
                        .error(&format!("Failed to write summary report: {}", e));
                }
            }
        }

        self.finish(run)
    }

    /// Process pairs in order, one result per pair.
    pub fn process_pairs(&self, pairs: &[InputPair]) -> Vec<PairResult> {
        let total = pairs.len();
        let mut results = Vec::with_capacity(total);

        for (index, pair) in pairs.iter().enumerate() {
            let video_name = pair.video_name();
            let title = format!("Processing pair {}/{}: {}", index + 1, total, video_name);
            self.logger.banner(Some(title.as_str()));

            let outcome = self.process_pair(pair);
            match &outcome {
                PairOutcome::Processed { report, .. } => {
                    self.logger.info("");
                    for line in report_digest(&video_name, report) {
                        self.logger.info(&line);
                    }
                }
                PairOutcome::SkippedEmpty { .. } => {
                    self.logger.warn(&format!(
                        "No detection results for {}",
                        pair.video_path.display()
                    ));
                }
                PairOutcome::Failed(err) => {
                    self.report_failure(pair, err);
                }
            }

            results.push(PairResult {
                pair: pair.clone(),
                outcome,
            });
        }

        results
    }

    /// Run one pair through the pipeline.
    pub fn process_pair(&self, pair: &InputPair) -> PairOutcome {
        let ctx = Context {
            pair,
            config: &self.config,
            detector: self.detector.as_ref(),
            reports: self.reports.as_ref(),
            logger: &self.logger,
        };
        let mut state = PairState::default();

        match self.pipeline.run(&ctx, &mut state) {
            Ok(result) => {
                if let Some(halted) = result.halted {
                    return PairOutcome::SkippedEmpty {
                        reason: halted.reason,
                    };
                }
                match (state.report, state.report_path) {
                    (Some(report), Some(report_path)) => PairOutcome::Processed {
                        report,
                        report_path,
                    },
                    _ => PairOutcome::Failed(PipelineError::incomplete(ctx.pair_name())),
                }
            }
            Err(e) => PairOutcome::Failed(e),
        }
    }

    /// Check the interval and create the output directory.
    fn prepare_output(&self) -> Result<(), PipelineError> {
        if self.config.interval_seconds == 0 {
            return Err(PipelineError::setup_failed(
                "frame interval must be at least 1 second",
                None,
            ));
        }

        fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            PipelineError::setup_failed(
                format!(
                    "cannot create output directory {}",
                    self.config.output_dir.display()
                ),
                Some(e),
            )
        })
    }

    /// Log a failed pair with its full error chain.
    fn report_failure(&self, pair: &InputPair, err: &PipelineError) {
        self.logger.error(&format!(
            "Error processing {}: {}",
            pair.video_path.display(),
            err
        ));

        for cause in error_chain(err).iter().skip(1) {
            self.logger.diagnostic(&format!("caused by: {}", cause));
        }
        self.logger.show_tail(&pair.video_name());
        self.logger.clear_tail();
    }

    /// Print the completion banner and close the run.
    fn finish(&self, mut run: BatchRun) -> BatchRun {
        run.enter(BatchPhase::Done);
        self.logger.info("");
        self.logger.banner(Some(COMPLETE_TITLE));
        self.logger.flush();
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{
        DetectionError, DetectionOutcome, DetectionResult, FrameDetection,
    };
    use crate::logging::LogConfig;
    use crate::pairing::PairToken;
    use crate::report::JsonReportGenerator;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct FailingDetector;

    impl EntityDetector for FailingDetector {
        fn name(&self) -> &str {
            "failing"
        }

        fn detect(&self, _: &Path, _: &Path, _: u32) -> DetectionResult<Option<DetectionOutcome>> {
            Err(DetectionError::CommandFailed {
                tool: "failing".to_string(),
                exit_code: 3,
                message: "model not loaded".to_string(),
            })
        }
    }

    struct TankDetector;

    impl EntityDetector for TankDetector {
        fn name(&self) -> &str {
            "tank"
        }

        fn detect(&self, _: &Path, _: &Path, interval: u32) -> DetectionResult<Option<DetectionOutcome>> {
            Ok(Some(DetectionOutcome::new(
                interval,
                vec!["tank".to_string()],
                vec![FrameDetection::new(0.0, vec!["tank".to_string()])],
            )))
        }
    }

    fn capture() -> (Arc<parking_lot::Mutex<Vec<String>>>, RunLogger) {
        let lines = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = lines.clone();
        let logger = RunLogger::console_only(
            LogConfig::default(),
            Some(Box::new(move |msg: &str| sink.lock().push(msg.to_string()))),
        );
        (lines, logger)
    }

    fn pair_in(dir: &Path, token: &str) -> InputPair {
        let voice = dir.join(format!("voice_{}.txt", token));
        let video = dir.join(format!("video_{}.mp4", token));
        fs::write(&voice, "tank").unwrap();
        fs::write(&video, b"").unwrap();
        InputPair::new(
            PairToken::from_voice_file_name(&format!("voice_{}.txt", token)).unwrap(),
            voice,
            video,
        )
    }

    #[test]
    fn pipeline_has_detect_and_report() {
        assert_eq!(create_pair_pipeline().step_names(), vec!["Detect", "Report"]);
    }

    #[test]
    fn failed_pair_shows_error_chain() {
        let dir = tempdir().unwrap();
        let pair = pair_in(dir.path(), "1");
        let (lines, logger) = capture();
        let processor = BatchProcessor::new(
            BatchConfig::new(dir.path().join("reports"), 5),
            Box::new(FailingDetector),
            Box::new(JsonReportGenerator::new()),
            logger,
        );

        let results = processor.process_pairs(&[pair]);
        assert!(results[0].is_failed());

        let lines = lines.lock();
        assert!(lines.iter().any(|l| l.contains("Error processing")));
        assert!(lines.iter().any(|l| l == "[video_1.mp4/tail]"));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("  caused by:") && l.contains("model not loaded")));
        assert!(processor.logger().get_tail().is_empty());
    }

    #[test]
    fn processed_pair_prints_digest() {
        let dir = tempdir().unwrap();
        let pair = pair_in(dir.path(), "7");
        let (lines, logger) = capture();
        let processor = BatchProcessor::new(
            BatchConfig::new(dir.path().join("reports"), 5),
            Box::new(TankDetector),
            Box::new(JsonReportGenerator::new()),
            logger,
        );
        fs::create_dir_all(&processor.config().output_dir).unwrap();

        let outcome = processor.process_pair(&pair);
        match outcome {
            PairOutcome::Processed { report_path, .. } => assert!(report_path.exists()),
            other => panic!("unexpected outcome: {:?}", other),
        }

        processor.process_pairs(&[pair]);
        let lines = lines.lock();
        assert!(lines.iter().any(|l| l == "Processing pair 1/1: video_7.mp4"));
        assert!(lines.iter().any(|l| l == "Summary for video_7.mp4:"));
    }

    #[test]
    fn zero_interval_is_setup_error() {
        let dir = tempdir().unwrap();
        pair_in(dir.path(), "1");
        let (lines, logger) = capture();
        let processor = BatchProcessor::new(
            BatchConfig::new(dir.path().join("reports"), 0),
            Box::new(TankDetector),
            Box::new(JsonReportGenerator::new()),
            logger,
        );

        let run = processor.run(dir.path());
        assert!(run.setup_error.is_some());
        assert!(run.results.is_empty());
        assert_eq!(run.phase(), BatchPhase::Done);
        assert!(lines.lock().iter().any(|l| l == COMPLETE_TITLE));
    }

    #[test]
    fn missing_directory_is_empty_run() {
        let dir = tempdir().unwrap();
        let (lines, logger) = capture();
        let processor = BatchProcessor::new(
            BatchConfig::new(dir.path().join("reports"), 5),
            Box::new(TankDetector),
            Box::new(JsonReportGenerator::new()),
            logger,
        );

        let run = processor.run(&dir.path().join("nope"));
        assert_eq!(run.pairs_found, 0);
        assert_eq!(
            run.phases,
            vec![BatchPhase::Idle, BatchPhase::Discovering, BatchPhase::Done]
        );
        let lines = lines.lock();
        assert!(lines.iter().any(|l| l == "No voice/video pairs found!"));
        assert_eq!(lines.last().map(String::as_str), Some("=".repeat(60).as_str()));
    }
}
