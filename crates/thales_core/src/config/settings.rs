//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};

/// Default output directory for reports.
pub const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Default seconds between analysed frames.
pub const DEFAULT_FRAME_INTERVAL: u32 = 5;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Detector settings.
    #[serde(default)]
    pub detection: DetectionSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Path configuration for sources, reports and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Directory scanned for voice/video pairs.
    #[serde(default = "default_source_folder")]
    pub source_folder: String,

    /// Directory receiving the JSON reports.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_source_folder() -> String {
    ".".to_string()
}

fn default_output_folder() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            source_folder: default_source_folder(),
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSettings {
    /// Seconds between analysed video frames.
    #[serde(default = "default_interval")]
    pub interval_seconds: u32,

    /// External detector program.
    #[serde(default = "default_detector_command")]
    pub command: String,

    /// Arguments passed before the pair arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_interval() -> u32 {
    DEFAULT_FRAME_INTERVAL
}

fn default_detector_command() -> String {
    "thales-detect".to_string()
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            command: default_detector_command(),
            args: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for console and file output.
    #[serde(default)]
    pub level: LogLevel,

    /// Prefix console lines with a timestamp.
    #[serde(default)]
    pub show_timestamps: bool,

    /// Number of diagnostic lines shown after a failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Write a log file per run into the logs folder.
    #[serde(default = "default_true")]
    pub write_log_file: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            show_timestamps: false,
            error_tail: default_error_tail(),
            write_log_file: true,
        }
    }
}

impl LoggingSettings {
    /// Run logger configuration for these settings.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level,
            error_tail: self.error_tail as usize,
            show_timestamps: self.show_timestamps,
        }
    }
}

/// Config sections, used for comments and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Detection,
    Logging,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 3] = [
        ConfigSection::Paths,
        ConfigSection::Detection,
        ConfigSection::Logging,
    ];

    /// TOML table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Detection => "detection",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the table.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Source, report and log directories",
            ConfigSection::Detection => "External entity detector",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}
