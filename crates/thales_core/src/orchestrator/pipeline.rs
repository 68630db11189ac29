//! Pipeline runner that executes steps in sequence.

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, PairState, StepOutcome};

/// Pipeline that runs a sequence of steps for one pair.
///
/// The pipeline executes steps in order, running validation before
/// and after each step. A skipped step halts the pipeline.
pub struct Pipeline {
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Run the pipeline for the pair in `ctx`.
    ///
    /// Executes each step in order:
    /// 1. Run `validate_input`
    /// 2. Run `execute`
    /// 3. Run `validate_output` (if execute returned Success)
    ///
    /// Stops at the first error, or at the first `Skipped` outcome.
    pub fn run(&self, ctx: &Context<'_>, state: &mut PairState) -> PipelineResult<PipelineRunResult> {
        let pair_name = ctx.pair_name();
        let mut result = PipelineRunResult::default();

        for step in &self.steps {
            let step_name = step.name();
            let fail = |e| PipelineError::step_failed(&pair_name, step_name, e);

            ctx.logger.debug(&format!("Validating input for '{}'", step_name));
            step.validate_input(ctx, state).map_err(fail)?;

            ctx.logger
                .debug(&format!("Executing '{}': {}", step_name, step.description()));
            let outcome = step.execute(ctx, state).map_err(fail)?;

            match outcome {
                StepOutcome::Success => {
                    ctx.logger
                        .debug(&format!("Validating output for '{}'", step_name));
                    step.validate_output(ctx, state).map_err(fail)?;
                    result.steps_completed.push(step_name.to_string());
                }
                StepOutcome::Skipped(reason) => {
                    ctx.logger
                        .debug(&format!("{} skipped: {}", step_name, reason));
                    result.halted = Some(HaltedStep {
                        step_name: step_name.to_string(),
                        reason,
                    });
                    break;
                }
            }
        }

        Ok(result)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Step that halted the pipeline with a `Skipped` outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaltedStep {
    pub step_name: String,
    pub reason: String,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineRunResult {
    /// Steps that completed successfully.
    pub steps_completed: Vec<String>,
    /// Set when a step skipped and the rest did not run.
    pub halted: Option<HaltedStep>,
}

impl PipelineRunResult {
    /// Check if every step ran to completion.
    pub fn all_completed(&self) -> bool {
        self.halted.is_none()
    }
}
