//! Detect step - runs the entity detector on one voice/video pair.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, PairState, StepOutcome};

/// Reason recorded when the detector has nothing usable.
pub(crate) const NO_RESULTS_REASON: &str = "No detection results";

/// Detect step.
///
/// Hands the pair to the configured detector. An absent or empty outcome
/// halts the pair without an error.
pub struct DetectStep;

impl DetectStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DetectStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for DetectStep {
    fn name(&self) -> &str {
        "Detect"
    }

    fn description(&self) -> &str {
        "Detect transcript entities in sampled video frames"
    }

    fn validate_input(&self, ctx: &Context<'_>, _state: &PairState) -> StepResult<()> {
        if ctx.config.interval_seconds == 0 {
            return Err(StepError::invalid_input("Frame interval must be at least 1 second"));
        }
        if !ctx.pair.voice_path.is_file() {
            return Err(StepError::file_not_found(&ctx.pair.voice_path));
        }
        if !ctx.pair.video_path.is_file() {
            return Err(StepError::file_not_found(&ctx.pair.video_path));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context<'_>, state: &mut PairState) -> StepResult<StepOutcome> {
        ctx.logger.debug(&format!(
            "Running detector '{}' every {}s",
            ctx.detector.name(),
            ctx.config.interval_seconds
        ));

        let outcome = ctx.detector.detect(
            &ctx.pair.video_path,
            &ctx.pair.voice_path,
            ctx.config.interval_seconds,
        )?;

        match outcome {
            Some(outcome) if !outcome.is_empty() => {
                ctx.logger.debug(&format!(
                    "Detector analysed {} frame(s) for {} entit(ies)",
                    outcome.frames.len(),
                    outcome.entities.len()
                ));
                state.detection = Some(outcome);
                Ok(StepOutcome::Success)
            }
            _ => Ok(StepOutcome::Skipped(NO_RESULTS_REASON.to_string())),
        }
    }

    fn validate_output(&self, _ctx: &Context<'_>, state: &PairState) -> StepResult<()> {
        if !state.has_detection() {
            return Err(StepError::invalid_output("Detection results were not recorded"));
        }
        Ok(())
    }
}
