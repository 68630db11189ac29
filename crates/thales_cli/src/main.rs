//! Thales binary entry point.
//!
//! Pairs voice transcripts with videos in a directory, runs the configured
//! entity detector over every pair and writes JSON reports.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use thales_core::config::{ConfigManager, Settings};
use thales_core::detection::CommandDetector;
use thales_core::logging::{init_tracing, ConsoleCallback, RunLogger, RunLoggerBuilder};
use thales_core::orchestrator::{BatchConfig, BatchProcessor};
use thales_core::report::JsonReportGenerator;

/// Config file read when `--config` is not given.
const DEFAULT_CONFIG_PATH: &str = ".config/thales.toml";

/// Command-line arguments for thales
#[derive(Parser, Debug)]
#[command(name = "thales")]
#[command(about = "Thales - Process voice transcripts and videos to detect military entities")]
#[command(
    after_help = "Examples:\n  thales                     # Process all files in current directory\n  thales -d ./data           # Process files from data directory\n  thales -i 10 -o ./reports  # 10-second intervals, output to reports/"
)]
#[command(disable_version_flag = true)]
struct Args {
    /// Directory containing voice and video files
    #[arg(short, long, env = "THALES_DIRECTORY")]
    directory: Option<PathBuf>,

    /// Output directory for reports
    #[arg(short, long, env = "THALES_OUTPUT")]
    output: Option<PathBuf>,

    /// Interval between video frames in seconds
    #[arg(short, long, env = "THALES_INTERVAL", value_parser = clap::value_parser!(u32).range(1..))]
    interval: Option<u32>,

    /// Config file (defaults to .config/thales.toml when present)
    #[arg(short, long, env = "THALES_CONFIG")]
    config: Option<PathBuf>,

    /// Write a config file with default values and exit
    #[arg(long)]
    init_config: bool,

    /// Detector command run for each pair
    #[arg(long, env = "THALES_DETECTOR")]
    detector: Option<String>,

    /// Show version and exit
    #[arg(short = 'v', long)]
    version: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("Thales Entity Detection Pipeline v{}", thales_core::version());
        return Ok(());
    }

    if args.init_config {
        let path = config_path(&args);
        let mut manager = ConfigManager::new(&path);
        manager
            .load_or_create()
            .with_context(|| format!("Failed to initialize config {}", path.display()))?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let (settings, ignored_sections) = load_settings(&args)?;
    init_tracing(settings.logging.level);
    if !ignored_sections.is_empty() {
        tracing::warn!(
            "Ignoring unknown config sections: {}",
            ignored_sections.join(", ")
        );
    }

    let directory = args
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.paths.source_folder));
    let config = batch_config(&args, &settings);

    let command = args
        .detector
        .clone()
        .unwrap_or_else(|| settings.detection.command.clone());
    let detector = CommandDetector::new(command).with_args(settings.detection.args.iter());

    tracing::debug!(
        "Source {}, output {}, interval {}s, detector '{}'",
        directory.display(),
        config.output_dir.display(),
        config.interval_seconds,
        detector.program()
    );

    let logger = create_logger(&settings);
    if let Some(path) = logger.log_path() {
        tracing::info!("Run {} logging to {}", logger.run_name(), path.display());
    }

    let processor = BatchProcessor::new(
        config,
        Box::new(detector),
        Box::new(JsonReportGenerator::new()),
        logger,
    );
    let run = processor.run(&directory);

    tracing::debug!(
        "Run finished: {} processed, {} skipped, {} failed",
        run.processed_count(),
        run.skipped_count(),
        run.failed_count()
    );
    processor.logger().close();

    Ok(())
}

/// Config path from `--config`, or the default location.
fn config_path(args: &Args) -> PathBuf {
    args.config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load settings and the unknown config sections that were skipped.
///
/// An explicit `--config` must exist. The default file is only read when
/// present; otherwise built-in defaults apply.
fn load_settings(args: &Args) -> Result<(Settings, Vec<String>)> {
    let path = config_path(args);
    if args.config.is_none() && !path.exists() {
        return Ok((Settings::default(), Vec::new()));
    }

    let mut manager = ConfigManager::new(&path);
    manager
        .load()
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    let ignored = manager.ignored_sections().to_vec();
    Ok((manager.into_settings(), ignored))
}

/// Batch settings from the config, with `-o` and `-i` applied on top.
fn batch_config(args: &Args, settings: &Settings) -> BatchConfig {
    let mut config = BatchConfig::from_settings(settings);
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if let Some(interval) = args.interval {
        config.interval_seconds = interval;
    }
    config
}

/// Run logger printing to stdout, plus a log file when enabled.
fn create_logger(settings: &Settings) -> RunLogger {
    let log_config = settings.logging.to_log_config();
    let run_name = format!("thales_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));

    let mut builder = RunLoggerBuilder::new(run_name)
        .config(log_config.clone())
        .console(console());
    if settings.logging.write_log_file {
        builder = builder.log_dir(&settings.paths.logs_folder);
    }

    builder.build().unwrap_or_else(|e| {
        tracing::warn!(
            "Cannot write log file in {}: {}; logging to console only",
            settings.paths.logs_folder,
            e
        );
        RunLogger::console_only(log_config, Some(console()))
    })
}

fn console() -> ConsoleCallback {
    Box::new(|line: &str| println!("{}", line))
}
