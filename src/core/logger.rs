//! # Activity Logger
//!
//! Appends one timestamped line per accepted message to a log file:
//!
//! ```text
//! 2026-10-17T09:30:12.345+02:00 [INFO] Loaded 21 products
//! ```
//!
//! The file is opened, appended to and closed on every write, so nothing is
//! buffered and external tools can tail or truncate it freely.
//!
//! [`LogBridge`] installs a shared [`Logger`] as the `log` facade backend so
//! the rest of the crate can keep using `debug!`/`info!`/`warn!`/`error!`.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Local, SecondsFormat};

use crate::console::printer::{self, Tone};

/// Log target prefix of this crate; everything else is a dependency.
const CRATE_TARGET: &str = "brainstem";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    #[default]
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    fn tone(&self) -> Tone {
        match self {
            LogLevel::Debug => Tone::Plain,
            LogLevel::Info => Tone::Info,
            LogLevel::Warning => Tone::Warning,
            LogLevel::Error | LogLevel::Critical => Tone::Error,
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        LogLevel::ALL
            .into_iter()
            .find(|level| level.name() == wanted)
            .ok_or_else(|| LoggerError::InvalidLevel(s.to_string()))
    }
}

#[derive(Debug)]
pub enum LoggerError {
    /// The log file or its directory can't be used.
    InvalidConfig(String),
    /// A level name outside DEBUG/INFO/WARNING/ERROR/CRITICAL.
    InvalidLevel(String),
    Io(io::Error),
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerError::InvalidConfig(msg) => write!(f, "invalid log configuration: {msg}"),
            LoggerError::InvalidLevel(level) => write!(
                f,
                "invalid log level '{level}' (expected DEBUG, INFO, WARNING, ERROR or CRITICAL)"
            ),
            LoggerError::Io(e) => write!(f, "log write failed: {e}"),
        }
    }
}

impl std::error::Error for LoggerError {}

#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub log_file: PathBuf,
    pub log_level: LogLevel,
    pub print_to_console: bool,
    pub create_log_directory: bool,
}

impl LoggerOptions {
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
            log_level: LogLevel::Info,
            print_to_console: false,
            create_log_directory: false,
        }
    }
}

#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
    threshold: AtomicU8,
    print_to_console: bool,
}

impl Logger {
    pub fn new(options: LoggerOptions) -> Result<Self, LoggerError> {
        Self::verify_log_file(&options.log_file, options.create_log_directory)?;
        Ok(Self {
            log_file: options.log_file,
            threshold: AtomicU8::new(options.log_level as u8),
            print_to_console: options.print_to_console,
        })
    }

    fn verify_log_file(log_file: &Path, create_log_directory: bool) -> Result<(), LoggerError> {
        if log_file.as_os_str().is_empty() {
            return Err(LoggerError::InvalidConfig("no log file specified".into()));
        }

        if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty())
            && !parent.exists()
        {
            if !create_log_directory {
                return Err(LoggerError::InvalidConfig(format!(
                    "log directory {} does not exist",
                    parent.display()
                )));
            }
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::InvalidConfig(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map(drop)
            .map_err(|e| {
                LoggerError::InvalidConfig(format!("cannot open {}: {e}", log_file.display()))
            })
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::ALL[self.threshold.load(Ordering::Relaxed) as usize]
    }

    pub fn print_to_console(&self) -> bool {
        self.print_to_console
    }

    pub fn set_log_level(&self, level: &str) -> Result<(), LoggerError> {
        let level: LogLevel = level.parse()?;
        self.threshold.store(level as u8, Ordering::Relaxed);
        Ok(())
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.log_level()
    }

    /// Logs `message` at the level named by `level`.
    pub fn log(&self, message: &str, level: &str) -> Result<(), LoggerError> {
        let level: LogLevel = level.parse()?;
        self.write(level, message)
    }

    /// Appends one line if `level` passes the threshold.
    pub fn write(&self, level: LogLevel, message: &str) -> Result<(), LoggerError> {
        if !self.enabled(level) {
            return Ok(());
        }

        let line = format_line(Local::now(), level, message);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .map_err(LoggerError::Io)?;
        writeln!(file, "{line}").map_err(LoggerError::Io)?;

        if self.print_to_console {
            println!("{}", printer::format_line(level.tone(), &line));
        }
        Ok(())
    }

    pub fn debug(&self, message: &str) -> Result<(), LoggerError> {
        self.write(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> Result<(), LoggerError> {
        self.write(LogLevel::Info, message)
    }

    pub fn warning(&self, message: &str) -> Result<(), LoggerError> {
        self.write(LogLevel::Warning, message)
    }

    pub fn error(&self, message: &str) -> Result<(), LoggerError> {
        self.write(LogLevel::Error, message)
    }

    pub fn critical(&self, message: &str) -> Result<(), LoggerError> {
        self.write(LogLevel::Critical, message)
    }
}

/// `<ISO-8601 timestamp> [<LEVEL>] <message>`
pub fn format_line(timestamp: DateTime<Local>, level: LogLevel, message: &str) -> String {
    format!(
        "{} [{}] {}",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, false),
        level,
        message
    )
}

/// Routes `log` facade records into a shared [`Logger`].
///
/// Records from this crate follow the logger's threshold. Dependencies only
/// get through at WARNING and above.
pub struct LogBridge {
    logger: Arc<Logger>,
}

impl LogBridge {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// Makes `logger` the global `log` backend. Fails if one is already set.
    pub fn install(logger: Arc<Logger>) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(Self::new(logger)))?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(())
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let level = LogLevel::from(metadata.level());
        if metadata.target().starts_with(CRATE_TARGET) {
            self.logger.enabled(level)
        } else {
            level >= LogLevel::Warning && self.logger.enabled(level)
        }
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = LogLevel::from(record.level());
        // Nowhere to report a failed log write.
        let _ = self.logger.write(level, &record.args().to_string());
    }

    fn flush(&self) {}
}
