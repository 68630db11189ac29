//! Pipeline step implementations.
//!
//! Each pair runs Detect, then Report.

mod detect;
mod report;

pub use detect::DetectStep;
pub use report::ReportStep;
