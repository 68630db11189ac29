//! External-program detector.
//!
//! Runs the configured detection program once per pair:
//!
//! ```text
//! <command> [args..] --video <video> --voice <voice> --interval <seconds>
//! ```
//!
//! The program prints a JSON [`DetectionOutcome`] on stdout. Blank output
//! or `null` means it found nothing usable.

use std::path::Path;
use std::process::Command;

use super::types::{DetectionError, DetectionOutcome, DetectionResult};
use super::EntityDetector;

/// Detector backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandDetector {
    /// Program to run.
    program: String,
    /// Extra arguments placed before the pair arguments.
    args: Vec<String>,
}

impl CommandDetector {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add leading arguments (builder pattern).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn build_command(&self, video_path: &Path, voice_path: &Path, interval_seconds: u32) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--video")
            .arg(video_path)
            .arg("--voice")
            .arg(voice_path)
            .arg("--interval")
            .arg(interval_seconds.to_string());
        cmd
    }
}

impl EntityDetector for CommandDetector {
    fn name(&self) -> &str {
        &self.program
    }

    fn detect(
        &self,
        video_path: &Path,
        voice_path: &Path,
        interval_seconds: u32,
    ) -> DetectionResult<Option<DetectionOutcome>> {
        for input in [video_path, voice_path] {
            if !input.exists() {
                return Err(DetectionError::InputNotFound(input.to_path_buf()));
            }
        }

        let mut cmd = self.build_command(video_path, voice_path, interval_seconds);
        tracing::debug!("Running detector: {:?}", cmd);

        let output = cmd.output().map_err(|source| DetectionError::SpawnFailed {
            tool: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DetectionError::CommandFailed {
                tool: self.program.clone(),
                exit_code: output.status.code().unwrap_or(-1),
                message: stderr.trim().to_string(),
            });
        }

        parse_outcome(&self.program, &output.stdout, interval_seconds)
    }
}

/// Parse detector stdout into an outcome.
fn parse_outcome(
    tool: &str,
    stdout: &[u8],
    interval_seconds: u32,
) -> DetectionResult<Option<DetectionOutcome>> {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let outcome: Option<DetectionOutcome> =
        serde_json::from_str(text).map_err(|source| DetectionError::InvalidOutput {
            tool: tool.to_string(),
            source,
        })?;

    Ok(outcome.map(|mut o| {
        if o.interval_seconds == 0 {
            o.interval_seconds = interval_seconds;
        }
        o
    }))
}
