//! Rolling file logs for the content store.
//!
//! # Responsibility
//! - Start the `flexi_logger` file backend at most once per process.
//! - Route panics through the `log` facade as one sanitized line.
//!
//! # Invariants
//! - A config without `log_dir` leaves file logging off; `log` calls stay no-ops.
//! - Re-initialization with the active level and directory is accepted.
//! - Re-initialization with a different level or directory is rejected.
//! - Initialization never panics.
//! - Content fields never reach log lines; only ids, tables and counts do.

use crate::config::FolioConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "folio";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn matches(&self, level: &str, log_dir: &Path) -> bool {
        self.level == level && self.log_dir == log_dir
    }
}

/// Result of a successful `init_logging` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingOutcome {
    /// No `log_dir` configured.
    Disabled,
    /// This call started the file backend.
    Started,
    /// The backend was already running with the same settings.
    AlreadyActive,
}

#[derive(Debug)]
pub enum LoggingError {
    /// `log_dir` is not absolute.
    RelativeDir(PathBuf),
    /// `log_dir` could not be created.
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// `flexi_logger` refused the settings.
    Backend(FlexiLoggerError),
    /// Logging already runs with other settings.
    Conflict {
        active_level: &'static str,
        active_dir: PathBuf,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{}`", dir.display())
            }
            Self::CreateDir { dir, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                dir.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::Conflict {
                active_level,
                active_dir,
            } => write!(
                f,
                "logging already active at `{}` with level `{active_level}`",
                active_dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Starts file logging for `config`, once per process.
///
/// # Errors
/// - `RelativeDir` / `CreateDir` when `log_dir` is unusable.
/// - `Backend` when `flexi_logger` fails to start.
/// - `Conflict` when a previous call used a different level or directory.
pub fn init_logging(config: &FolioConfig) -> Result<LoggingOutcome, LoggingError> {
    let Some(log_dir) = config.log_dir.as_deref() else {
        return Ok(LoggingOutcome::Disabled);
    };
    if !log_dir.is_absolute() {
        return Err(LoggingError::RelativeDir(log_dir.to_path_buf()));
    }
    let level = config.log_level;

    let mut started = false;
    let active = ACTIVE_LOGGER.get_or_try_init(|| {
        let logger = start_backend(level, log_dir)?;
        started = true;
        Ok::<_, LoggingError>(logger)
    })?;

    if !active.matches(level, log_dir) {
        return Err(LoggingError::Conflict {
            active_level: active.level,
            active_dir: active.log_dir.clone(),
        });
    }
    Ok(if started {
        LoggingOutcome::Started
    } else {
        LoggingOutcome::AlreadyActive
    })
}

fn start_backend(level: &'static str, log_dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
        dir: log_dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level)
        .map_err(LoggingError::Backend)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        // [YYYY-MM-DD HH:MM:SS.ffffff TZ] LEVEL [module] file:line: message
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    install_panic_hook();
    info!(
        "event=logging_init module=logging status=ok level={} log_dir={} version={}",
        level,
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

// Runs inside the one-time backend start, so the hook is installed once.
fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");
        error!(
            "event=panic_captured module=logging status=error location={} payload={}",
            location,
            one_line(payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

/// Flattens `value` to a single line of at most `max_chars` characters.
fn one_line(value: &str, max_chars: usize) -> String {
    let mut line = value
        .chars()
        .take(max_chars)
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect::<String>();
    if value.chars().count() > max_chars {
        line.push_str("...");
    }
    line
}
