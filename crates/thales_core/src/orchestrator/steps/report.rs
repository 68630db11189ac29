//! Report step - builds and persists the per-pair report.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, PairState, StepOutcome};

/// Report step.
///
/// Writes `<output_dir>/<video stem>_report.json` from the detection
/// results recorded by the Detect step.
pub struct ReportStep;

impl ReportStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReportStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ReportStep {
    fn name(&self) -> &str {
        "Report"
    }

    fn description(&self) -> &str {
        "Build and save the per-video report"
    }

    fn validate_input(&self, _ctx: &Context<'_>, state: &PairState) -> StepResult<()> {
        if !state.has_detection() {
            return Err(StepError::invalid_input("Detect step has not produced results"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context<'_>, state: &mut PairState) -> StepResult<StepOutcome> {
        let detection = state
            .detection
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("Detect step has not produced results"))?;

        let destination = ctx.config.report_path(&ctx.pair.video_path);
        let report = ctx
            .reports
            .build_report(&ctx.pair.video_path, detection, &destination)?;

        ctx.logger
            .debug(&format!("Report saved to {}", destination.display()));

        state.report = Some(report);
        state.report_path = Some(destination);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context<'_>, state: &PairState) -> StepResult<()> {
        if !state.has_report() {
            return Err(StepError::invalid_output("Report was not recorded"));
        }
        match &state.report_path {
            Some(path) if path.exists() => Ok(()),
            Some(path) => Err(StepError::invalid_output(format!(
                "Report was not written to {}",
                path.display()
            ))),
            None => Err(StepError::invalid_output("Report path was not recorded")),
        }
    }
}
