use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::{ConfigManager, LogLevel, ShellExtConfig};

/// Configuration for the logging system
pub struct LogConfig {
    /// Directory where log files will be stored
    pub log_dir: PathBuf,
    /// Prefix for log file names
    pub file_prefix: String,
    /// Maximum number of log files to keep (rotation)
    pub max_files: usize,
    /// Default level when RUST_LOG is not set
    pub level: LogLevel,
    /// Write JSON logs to `log_dir`
    pub to_file: bool,
    /// Also print human-readable logs to stdout (never inside Explorer)
    pub stdout: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: ConfigManager::get_log_dir(),
            file_prefix: "pycropper-shellext".to_string(),
            max_files: 5,
            level: LogLevel::Info,
            to_file: true,
            stdout: false,
        }
    }
}

impl LogConfig {
    pub fn from_config(config: &ShellExtConfig) -> Self {
        Self {
            max_files: config.log_max_files,
            level: config.log_level,
            to_file: config.log_to_file,
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, stdout: bool) -> Self {
        self.stdout = stdout;
        self
    }
}

/// Initialize the logging system.
///
/// The DLL runs inside `explorer.exe`, so by default only the rolling JSON file is
/// written. The CLI turns on the stdout layer as well.
///
/// # Log Targets
/// - `shellext::context_menu` - Explorer command handlers and sub-command enumeration
/// - `shellext::legacy` - IContextMenu / IShellExtInit handler
/// - `shellext::dll` - DLL exports and class factory
/// - `launcher` - Child process start and failure reporting
/// - `registration` - Registry install / uninstall
/// - `config` - Configuration loading
/// - `main` - CLI lifecycle
///
/// A subscriber that is already installed (the DLL may be initialized from several
/// entry points) is left in place.
pub fn init_logging(config: LogConfig) -> Result<LogGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let (file_layer, worker_guard) = if config.to_file {
        std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;

        let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
            .rotation(tracing_appender::rolling::Rotation::DAILY)
            .filename_prefix(&config.file_prefix)
            .filename_suffix("log")
            .max_log_files(config.max_files)
            .build(&config.log_dir)
            .context("Failed to create file appender")?;

        // The guard MUST outlive every log call or buffered lines are lost
        let (non_blocking_file, worker_guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .json()
            .with_writer(non_blocking_file)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .with_filter(env_filter.clone());

        (Some(layer), Some(worker_guard))
    } else {
        (None, None)
    };

    let stdout_layer = config.stdout.then(|| {
        fmt::layer()
            .compact()
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(true)
            .with_ansi(true)
            .with_filter(env_filter)
    });

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            target: "main",
            log_dir = %config.log_dir.display(),
            max_files = config.max_files,
            "Logging system initialized"
        );
    }

    Ok(LogGuard {
        _worker_guard: worker_guard,
    })
}

/// Guard that ensures logs are flushed before exit.
/// Wraps the `WorkerGuard` from tracing_appender, which must stay alive as long as
/// file logging is expected to work.
pub struct LogGuard {
    _worker_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        tracing::debug!(target: "main", "Flushing logs before shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_config() {
        let config = LogConfig::default();
        assert_eq!(config.file_prefix, "pycropper-shellext");
        assert_eq!(config.max_files, 5);
        assert!(config.to_file);
        assert!(!config.stdout);
    }

    #[test]
    fn test_from_config() {
        let shell_config = ShellExtConfig {
            log_max_files: 2,
            log_level: LogLevel::Trace,
            log_to_file: false,
            ..ShellExtConfig::default()
        };

        let config = LogConfig::from_config(&shell_config).with_stdout(true);
        assert_eq!(config.max_files, 2);
        assert_eq!(config.level, LogLevel::Trace);
        assert!(!config.to_file);
        assert!(config.stdout);
    }

    #[test]
    fn test_log_directory_creation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let config = LogConfig {
            log_dir: log_dir.clone(),
            file_prefix: "test".to_string(),
            max_files: 3,
            ..LogConfig::default()
        };

        let result = init_logging(config);
        assert!(result.is_ok());
        assert!(log_dir.exists());

        // Keep the guard alive during test
        let _guard = result.unwrap();
    }
}
