//! Per-run logger with console and file output.
//!
//! Each batch run gets its own logger that:
//! - Sends every line to a console callback (if provided)
//! - Writes to a dedicated log file (if a log directory is given)
//! - Maintains a tail buffer of diagnostic lines for failure reports

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{ConsoleCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-run logger with dual output (console + file).
pub struct RunLogger {
    /// Run name for identification.
    run_name: String,
    /// Path to log file, if file output is enabled.
    log_path: Option<PathBuf>,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Console callback for operator output.
    console: Option<ConsoleCallback>,
    /// Logging configuration.
    config: LogConfig,
    /// Recent diagnostic lines.
    tail_buffer: Mutex<VecDeque<String>>,
}

impl RunLogger {
    /// Create a new run logger.
    ///
    /// # Arguments
    /// * `run_name` - Name of the run (used in log filename)
    /// * `log_dir` - Directory to write the log file to, `None` for console only
    /// * `config` - Logging configuration
    /// * `console` - Optional callback receiving each formatted line
    pub fn new(
        run_name: impl Into<String>,
        log_dir: Option<impl AsRef<Path>>,
        config: LogConfig,
        console: Option<ConsoleCallback>,
    ) -> std::io::Result<Self> {
        let run_name = run_name.into();

        let (log_path, writer) = match log_dir {
            Some(dir) => {
                let dir = dir.as_ref();
                fs::create_dir_all(dir)?;
                let path = dir.join(format!("{}.log", sanitize_filename(&run_name)));
                let file = File::create(&path)?;
                (Some(path), Some(BufWriter::new(file)))
            }
            None => (None, None),
        };

        Ok(Self {
            run_name,
            log_path,
            file_writer: Mutex::new(writer),
            console,
            tail_buffer: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            config,
        })
    }

    /// Logger that only writes to the console callback.
    pub fn console_only(config: LogConfig, console: Option<ConsoleCallback>) -> Self {
        Self {
            run_name: "console".to_string(),
            log_path: None,
            file_writer: Mutex::new(None),
            console,
            tail_buffer: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            config,
        }
    }

    /// Get the run name.
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Get the log file path.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        let msg = MessagePrefix::Debug.format(message);
        self.log(LogLevel::Debug, &msg);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a full-width rule, optionally with a title line.
    pub fn banner(&self, title: Option<&str>) {
        let rule = "=".repeat(60);
        self.info(&rule);
        if let Some(title) = title {
            self.info(title);
            self.info(&rule);
        }
    }

    /// Record a diagnostic line.
    ///
    /// Lines only go to the tail buffer; they are printed by `show_tail`.
    pub fn diagnostic(&self, line: &str) {
        let mut buffer = self.tail_buffer.lock();
        if self.config.error_tail == 0 {
            return;
        }
        if buffer.len() >= self.config.error_tail {
            buffer.pop_front();
        }
        buffer.push_back(line.to_string());
    }

    /// Show the tail buffer (typically after an error).
    pub fn show_tail(&self, header: &str) {
        let lines: Vec<String> = self.tail_buffer.lock().iter().cloned().collect();
        if lines.is_empty() {
            return;
        }

        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in &lines {
            self.output(&self.format_message(&format!("  {}", line)));
        }
    }

    /// Clear the tail buffer.
    pub fn clear_tail(&self) {
        self.tail_buffer.lock().clear();
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release resources.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    /// Format a message with timestamp (if enabled).
    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    /// Output a formatted message to file and console.
    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }

        if let Some(ref callback) = self.console {
            callback(formatted);
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sanitize a string to be safe for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            _ => c,
        })
        .collect()
}

/// Builder for creating RunLogger with fluent API.
pub struct RunLoggerBuilder {
    run_name: String,
    log_dir: Option<PathBuf>,
    config: LogConfig,
    console: Option<ConsoleCallback>,
}

impl RunLoggerBuilder {
    /// Create a new builder (console only until `log_dir` is set).
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            log_dir: None,
            config: LogConfig::default(),
            console: None,
        }
    }

    /// Write a log file into this directory.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Set the logging configuration.
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the console callback.
    pub fn console(mut self, callback: ConsoleCallback) -> Self {
        self.console = Some(callback);
        self
    }

    /// Build the RunLogger.
    pub fn build(self) -> std::io::Result<RunLogger> {
        RunLogger::new(self.run_name, self.log_dir, self.config, self.console)
    }
}
