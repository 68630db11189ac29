//! Per-pair reports and the batch summary.
//!
//! Reports are plain serde structures persisted as pretty JSON:
//!
//! - one `<video_stem>_report.json` per processed pair
//! - one `summary_report.json` per batch
//!
//! The orchestrator talks to this module through [`ReportGenerator`] so
//! the persistence format can be swapped without touching the batch loop.

mod generator;
mod types;

pub use generator::{report_file_name, JsonReportGenerator, ReportGenerator, SUMMARY_FILE_NAME};
pub use types::{
    format_timestamp, BatchSummary, EntityReport, PerPairReport, PresenceStatistics,
    ReportError, ReportResult, TimeRange, VideoSummary,
};
