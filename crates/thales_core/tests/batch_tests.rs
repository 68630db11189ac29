//! End-to-end batch runs over temporary directories with stub detectors.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::tempdir;

use thales_core::detection::{
    DetectionError, DetectionOutcome, DetectionResult, EntityDetector, FrameDetection,
};
use thales_core::logging::{LogConfig, RunLogger};
use thales_core::orchestrator::{BatchConfig, BatchPhase, BatchProcessor, PairOutcome};
use thales_core::report::{
    BatchSummary, JsonReportGenerator, PerPairReport, ReportError, ReportGenerator, ReportResult,
    SUMMARY_FILE_NAME,
};

/// Reports entities named in the voice file, present in every frame.
struct TranscriptDetector {
    fail_on_token: Option<&'static str>,
}

impl EntityDetector for TranscriptDetector {
    fn name(&self) -> &str {
        "transcript"
    }

    fn detect(
        &self,
        video_path: &Path,
        voice_path: &Path,
        interval_seconds: u32,
    ) -> DetectionResult<Option<DetectionOutcome>> {
        if let Some(token) = self.fail_on_token {
            if video_path.to_string_lossy().contains(&format!("video_{}.", token)) {
                return Err(DetectionError::CommandFailed {
                    tool: "transcript".to_string(),
                    exit_code: 2,
                    message: "decoder crashed".to_string(),
                });
            }
        }

        let transcript = fs::read_to_string(voice_path)
            .map_err(|_| DetectionError::InputNotFound(voice_path.to_path_buf()))?;
        let entities: Vec<String> = transcript.split_whitespace().map(String::from).collect();
        let frames = (0..3)
            .map(|i| FrameDetection::new(f64::from(i * interval_seconds), entities.clone()))
            .collect();

        Ok(Some(DetectionOutcome::new(interval_seconds, entities, frames)))
    }
}

/// Never finds anything.
struct EmptyDetector;

impl EntityDetector for EmptyDetector {
    fn name(&self) -> &str {
        "empty"
    }

    fn detect(&self, _: &Path, _: &Path, _: u32) -> DetectionResult<Option<DetectionOutcome>> {
        Ok(None)
    }
}

/// Writes JSON like `JsonReportGenerator` but refuses one video.
struct RefusingReports {
    refused_video: &'static str,
}

impl ReportGenerator for RefusingReports {
    fn build_report(
        &self,
        video_path: &Path,
        outcome: &DetectionOutcome,
        destination: &Path,
    ) -> ReportResult<PerPairReport> {
        if video_path.file_name().is_some_and(|n| n == self.refused_video) {
            return Err(ReportError::Write {
                path: destination.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        JsonReportGenerator::new().build_report(video_path, outcome, destination)
    }

    fn build_summary(
        &self,
        reports: &[PerPairReport],
        destination: &Path,
    ) -> ReportResult<BatchSummary> {
        JsonReportGenerator::new().build_summary(reports, destination)
    }
}

fn write_pair(dir: &Path, token: &str, ext: &str, transcript: &str) {
    fs::write(dir.join(format!("voice_{}.txt", token)), transcript).unwrap();
    fs::write(dir.join(format!("video_{}.{}", token, ext)), b"").unwrap();
}

fn processor(
    output: &Path,
    detector: Box<dyn EntityDetector>,
) -> (BatchProcessor, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let logger = RunLogger::console_only(
        LogConfig::default(),
        Some(Box::new(move |line: &str| sink.lock().push(line.to_string()))),
    );
    let processor = BatchProcessor::new(
        BatchConfig::new(output, 5),
        detector,
        Box::new(JsonReportGenerator::new()),
        logger,
    );
    (processor, lines)
}

#[test]
fn processes_all_pairs_and_writes_summary() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_pair(input.path(), "1", "mp4", "tank");
    write_pair(input.path(), "2", "mkv", "tank helicopter");
    // No matching video.
    fs::write(input.path().join("voice_3.txt"), "jeep").unwrap();

    let (processor, lines) = processor(output.path(), Box::new(TranscriptDetector { fail_on_token: None }));
    let run = processor.run(input.path());

    assert_eq!(run.pairs_found, 2);
    assert_eq!(run.skipped_voice_files.len(), 1);
    assert_eq!(run.processed_count(), 2);
    assert!(output.path().join("video_1_report.json").exists());
    assert!(output.path().join("video_2_report.json").exists());

    let summary = run.summary.as_ref().unwrap();
    assert_eq!(summary.total_videos, 2);
    assert_eq!(summary.all_entities, vec!["helicopter", "tank"]);
    assert_eq!(summary.entity_videos["tank"], vec!["video_1.mp4", "video_2.mkv"]);

    let persisted: BatchSummary =
        serde_json::from_str(&fs::read_to_string(output.path().join(SUMMARY_FILE_NAME)).unwrap())
            .unwrap();
    assert_eq!(&persisted, summary);

    assert_eq!(
        run.phases,
        vec![
            BatchPhase::Idle,
            BatchPhase::Discovering,
            BatchPhase::ProcessingPairs,
            BatchPhase::Aggregating,
            BatchPhase::Done,
        ]
    );

    let lines = lines.lock();
    assert!(lines.iter().any(|l| l == "Found 2 pair(s) to process"));
    assert!(lines.iter().any(|l| l == "  Processed 2 video(s)"));
    assert!(lines.iter().any(|l| l == "  All entities: helicopter, tank"));
    assert!(lines.iter().any(|l| l == "Processing complete!"));
}

#[test]
fn failing_pair_does_not_stop_batch() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_pair(input.path(), "1", "mp4", "tank");
    write_pair(input.path(), "2", "mp4", "artillery");
    write_pair(input.path(), "3", "mp4", "drone");

    let (processor, lines) = processor(
        output.path(),
        Box::new(TranscriptDetector {
            fail_on_token: Some("2"),
        }),
    );
    let run = processor.run(input.path());

    assert_eq!(run.results.len(), 3);
    assert_eq!(run.processed_count(), 2);
    assert_eq!(run.failed_count(), 1);
    assert!(matches!(run.results[1].outcome, PairOutcome::Failed(_)));
    assert!(!output.path().join("video_2_report.json").exists());

    let summary = run.summary.unwrap();
    assert_eq!(summary.total_videos, 2);
    assert_eq!(summary.all_entities, vec!["drone", "tank"]);

    let lines = lines.lock();
    assert!(lines.iter().any(|l| l.contains("decoder crashed")));
    assert!(lines.iter().any(|l| l == "Processing pair 3/3: video_3.mp4"));
}

#[test]
fn empty_results_produce_no_summary() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_pair(input.path(), "1", "avi", "tank");
    write_pair(input.path(), "2", "mov", "tank");

    let (processor, lines) = processor(output.path(), Box::new(EmptyDetector));
    let run = processor.run(input.path());

    assert_eq!(run.skipped_count(), 2);
    assert!(run.summary.is_none());
    assert!(!output.path().join(SUMMARY_FILE_NAME).exists());
    assert!(!run.phases.contains(&BatchPhase::Aggregating));
    assert_eq!(run.phase(), BatchPhase::Done);

    let lines = lines.lock();
    assert_eq!(
        lines
            .iter()
            .filter(|l| l.contains("No detection results for"))
            .count(),
        2
    );
    assert!(lines.iter().any(|l| l == "Processing complete!"));
}

#[test]
fn no_pairs_exits_early_with_banner() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    fs::write(input.path().join("notes.txt"), "ignore me").unwrap();

    let (processor, lines) = processor(
        &output.path().join("reports"),
        Box::new(TranscriptDetector { fail_on_token: None }),
    );
    let run = processor.run(input.path());

    assert_eq!(run.pairs_found, 0);
    assert!(run.results.is_empty());
    assert!(!output.path().join("reports").exists());

    let lines = lines.lock();
    assert!(lines.iter().any(|l| l == "No voice/video pairs found!"));
    assert!(lines.iter().any(|l| l == "Processing complete!"));
}

#[test]
fn one_result_per_pair_in_discovery_order() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    for token in ["10", "2", "1", "b", "a"] {
        write_pair(input.path(), token, "mp4", "tank");
    }

    let (processor, _) = processor(output.path(), Box::new(TranscriptDetector { fail_on_token: None }));
    let run = processor.run(input.path());

    let tokens: Vec<&str> = run.results.iter().map(|r| r.pair.token.as_str()).collect();
    assert_eq!(tokens, vec!["1", "10", "2", "a", "b"]);
    assert_eq!(run.results.len(), run.pairs_found);
}

#[test]
fn reports_match_persisted_json() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_pair(input.path(), "5", "mp4", "tank");

    let (processor, _) = processor(output.path(), Box::new(TranscriptDetector { fail_on_token: None }));
    let run = processor.run(input.path());

    match &run.results[0].outcome {
        PairOutcome::Processed {
            report,
            report_path,
        } => {
            let persisted: PerPairReport =
                serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
            assert_eq!(&persisted, report);
            assert_eq!(report.total_frames_analyzed, 3);
            assert_eq!(report.entities["tank"].time_ranges.len(), 1);
            assert_eq!(report.entities["tank"].time_ranges[0].end, "00:00:15");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn failing_report_does_not_stop_batch() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_pair(input.path(), "1", "mp4", "tank");
    write_pair(input.path(), "2", "mp4", "artillery");
    write_pair(input.path(), "3", "mp4", "drone");

    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let logger = RunLogger::console_only(
        LogConfig::default(),
        Some(Box::new(move |line: &str| sink.lock().push(line.to_string()))),
    );
    let processor = BatchProcessor::new(
        BatchConfig::new(output.path(), 5),
        Box::new(TranscriptDetector { fail_on_token: None }),
        Box::new(RefusingReports {
            refused_video: "video_2.mp4",
        }),
        logger,
    );
    let run = processor.run(input.path());

    assert_eq!(run.results.len(), 3);
    assert!(run.results[0].is_processed());
    assert!(matches!(run.results[1].outcome, PairOutcome::Failed(_)));
    assert!(run.results[2].is_processed());
    assert!(!output.path().join("video_2_report.json").exists());

    let summary = run.summary.unwrap();
    assert_eq!(summary.total_videos, 2);
    assert_eq!(summary.all_entities, vec!["drone", "tank"]);

    let lines = lines.lock();
    assert!(lines.iter().any(|l| l.contains("disk full")));
    assert!(lines.iter().any(|l| l == "Processing complete!"));
}
