//! Tracing subscriber for framechrome
//!
//! Stdout always, a daily JSON file under the local data dir when enabled.
//! The level filter can be swapped at runtime when settings change.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

const LOG_FILE_PREFIX: &str = "framechrome.log";

lazy_static! {
    static ref LOG_RELOAD_HANDLE: Mutex<Option<Handle<EnvFilter, Registry>>> = Mutex::new(None);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Settings spelling and tracing level for each variant
const LEVELS: [(LogLevel, &str, Option<Level>); 6] = [
    (LogLevel::Off, "Off", None),
    (LogLevel::Error, "Error", Some(Level::ERROR)),
    (LogLevel::Warn, "Warn", Some(Level::WARN)),
    (LogLevel::Info, "Info", Some(Level::INFO)),
    (LogLevel::Debug, "Debug", Some(Level::DEBUG)),
    (LogLevel::Trace, "Trace", Some(Level::TRACE)),
];

impl LogLevel {
    fn entry(self) -> (LogLevel, &'static str, Option<Level>) {
        LEVELS
            .iter()
            .copied()
            .find(|(level, _, _)| *level == self)
            .unwrap_or(LEVELS[0])
    }

    pub fn tracing_level(self) -> Option<Level> {
        self.entry().2
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = if s.eq_ignore_ascii_case("warning") { "warn" } else { s };
        LEVELS
            .iter()
            .find(|(_, label, _)| label.eq_ignore_ascii_case(name))
            .map(|(level, _, _)| *level)
            .ok_or_else(|| format!("Invalid log level: {}", s))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.entry().1)
    }
}

/// Filter directive for a level, scoped to this crate
pub fn filter_directive(log_level: LogLevel) -> String {
    match log_level.tracing_level() {
        Some(lvl) => format!("framechrome={}", lvl.as_str().to_lowercase()),
        None => "off".to_string(),
    }
}

/// `<local data dir>/framechrome/logs`, created on demand
pub fn get_logs_dir() -> Result<PathBuf> {
    let logs_dir = dirs::data_local_dir()
        .context("No local data directory on this platform")?
        .join("framechrome")
        .join("logs");
    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create logs directory: {:?}", logs_dir))?;
    Ok(logs_dir)
}

/// Initialize logging, or reload the level filter when already initialized.
///
/// File logging is decided on the first call only.
pub fn init_logging(log_level: LogLevel, log_to_file: bool) -> Result<()> {
    let level_filter = EnvFilter::try_new(filter_directive(log_level))
        .context("Failed to build log filter")?;

    let mut handle_guard = LOG_RELOAD_HANDLE
        .lock()
        .map_err(|_| anyhow::anyhow!("Log reload handle poisoned"))?;
    if let Some(handle) = handle_guard.as_ref() {
        handle.reload(level_filter).context("Failed to reload log filter")?;
        return Ok(());
    }

    let (filter_layer, reload_handle) = tracing_subscriber::reload::Layer::new(level_filter);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTime::rfc_3339())
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    if log_to_file {
        let logs_dir = get_logs_dir()?;
        let appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, LOG_FILE_PREFIX);
        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(appender)
            .with_timer(LocalTime::rfc_3339())
            .with_current_span(false);

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .with(file_layer)
            .try_init()
            .context("Failed to install log subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .try_init()
            .context("Failed to install log subscriber")?;
    }

    *handle_guard = Some(reload_handle);
    Ok(())
}

fn is_rotated_log(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
}

/// Delete rotated log files last written more than `keep_days` ago.
/// Returns the number deleted.
pub fn cleanup_old_logs(logs_dir: &Path, keep_days: u32) -> Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(u64::from(keep_days) * 86_400))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let expired: Vec<PathBuf> = fs::read_dir(logs_dir)
        .with_context(|| format!("Failed to read logs directory: {:?}", logs_dir))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| is_rotated_log(&entry.path()))
        .filter(|entry| {
            entry
                .metadata()
                .and_then(|m| m.modified())
                .is_ok_and(|modified| modified < cutoff)
        })
        .map(|entry| entry.path())
        .collect();

    let mut deleted = 0;
    for path in expired {
        match fs::remove_file(&path) {
            Ok(()) => deleted += 1,
            Err(e) => tracing::debug!(file = ?path, error = %e, "Could not delete old log"),
        }
    }
    Ok(deleted)
}

/// Run [`cleanup_old_logs`] on the logs dir without blocking startup
pub fn auto_cleanup_old_logs(keep_days: u32) {
    std::thread::spawn(move || {
        let result = get_logs_dir().and_then(|dir| cleanup_old_logs(&dir, keep_days));
        match result {
            Ok(0) => {}
            Ok(count) => tracing::info!(deleted_count = count, "Cleaned up old log files"),
            Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
        }
    });
}
