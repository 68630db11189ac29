//! Report persistence.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use super::types::{BatchSummary, PerPairReport, ReportError, ReportResult};
use crate::detection::DetectionOutcome;

/// File name of the batch summary inside the output directory.
pub const SUMMARY_FILE_NAME: &str = "summary_report.json";

/// Report file name for a video: `<stem>_report.json`.
pub fn report_file_name(video_path: &Path) -> String {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    format!("{}_report.json", stem)
}

/// Builds and persists reports.
///
/// Both operations are deterministic for identical inputs and persist
/// their result to `destination` as a side effect.
pub trait ReportGenerator: Send + Sync {
    /// Build the report for one video and write it to `destination`.
    fn build_report(
        &self,
        video_path: &Path,
        outcome: &DetectionOutcome,
        destination: &Path,
    ) -> ReportResult<PerPairReport>;

    /// Fold all reports into a summary and write it to `destination`.
    fn build_summary(
        &self,
        reports: &[PerPairReport],
        destination: &Path,
    ) -> ReportResult<BatchSummary>;
}

/// Writes reports as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportGenerator;

impl JsonReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl ReportGenerator for JsonReportGenerator {
    fn build_report(
        &self,
        video_path: &Path,
        outcome: &DetectionOutcome,
        destination: &Path,
    ) -> ReportResult<PerPairReport> {
        let report = PerPairReport::from_outcome(video_path, outcome);
        write_json_atomic(destination, &report)?;
        tracing::debug!("Report saved to {}", destination.display());
        Ok(report)
    }

    fn build_summary(
        &self,
        reports: &[PerPairReport],
        destination: &Path,
    ) -> ReportResult<BatchSummary> {
        let summary = BatchSummary::from_reports(reports);
        write_json_atomic(destination, &summary)?;
        tracing::debug!("Summary saved to {}", destination.display());
        Ok(summary)
    }
}

/// Serialize `value` and write it atomically (temp file, then rename).
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> ReportResult<()> {
    let content = serde_json::to_string_pretty(value)?;

    let write_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    let written = write_and_sync(&temp_path, content.as_bytes())
        .and_then(|()| fs::rename(&temp_path, path));

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(write_err(e));
    }
    Ok(())
}

fn write_and_sync(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;
    file.write_all(b"\n")?;
    file.sync_all()
}
