use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};

/// Global config manager instance
static CONFIG_MANAGER: OnceLock<ConfigManager> = OnceLock::new();

/// Executable launched when no override is configured
pub const DEFAULT_EXECUTABLE: &str = "cropper.exe";

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Which shell contract the extension is registered against.
///
/// Both variants share one CLSID, so only one of them can be registered at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// `IExplorerCommand` with a tolerance flyout
    #[default]
    ExplorerCommand,
    /// Classic `IContextMenu` + `IShellExtInit` handler with a single item
    LegacyContextMenu,
}

/// Extension configuration stored as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellExtConfig {
    /// Executable name or path of the cropping tool, resolved through PATH when bare
    pub executable: String,
    /// Registered handler variant
    pub handler: HandlerKind,
    /// Icon shown next to the root menu entry
    pub icon_path: Option<String>,
    /// Language/locale setting (e.g., "en", "zh-CN"). None means use system default.
    pub language: Option<String>,
    /// Whether to write logs to file
    pub log_to_file: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: LogLevel,
    /// Maximum number of log files to keep
    pub log_max_files: usize,
}

impl Default for ShellExtConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            handler: HandlerKind::default(),
            icon_path: None,
            language: None,
            log_to_file: true,
            log_level: LogLevel::Info,
            log_max_files: 5,
        }
    }
}

/// Thread-safe configuration holder shared by every COM object in the process
pub struct ConfigManager {
    config: RwLock<ShellExtConfig>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Initialize the global config manager, loading `~/.pycropper/shellext.json`.
    ///
    /// Calling this more than once returns the instance created first.
    pub fn init() -> Result<&'static ConfigManager> {
        if let Some(manager) = CONFIG_MANAGER.get() {
            return Ok(manager);
        }

        let config_path = Self::get_config_path()?;
        let config = Self::load_from_path(&config_path)?;

        let manager = ConfigManager {
            config: RwLock::new(config),
            config_path,
        };

        Ok(CONFIG_MANAGER.get_or_init(|| manager))
    }

    /// Try to get the global config manager instance.
    /// Returns None if `init()` has not been called.
    pub fn try_get() -> Option<&'static ConfigManager> {
        CONFIG_MANAGER.get()
    }

    /// Current configuration, or defaults when the manager was never initialized
    pub fn current() -> ShellExtConfig {
        Self::try_get()
            .map(|manager| manager.get_config())
            .unwrap_or_default()
    }

    /// Base directory for config and logs (~/.pycropper)
    pub fn get_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pycropper")
    }

    fn get_config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to get user home directory")?;
        Ok(home_dir.join(".pycropper").join("shellext.json"))
    }

    /// Load configuration from the specified path, using defaults for missing fields
    fn load_from_path(path: &Path) -> Result<ShellExtConfig> {
        if !path.exists() {
            tracing::info!(target: "config", path = %path.display(), "Config file not found, using defaults");
            return Ok(ShellExtConfig::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: ShellExtConfig =
            serde_json::from_str(&content).context("Failed to parse config file")?;

        tracing::info!(target: "config", path = %path.display(), "Loaded configuration from file");

        Ok(config)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let config = self
            .config
            .read()
            .map_err(|e| anyhow::anyhow!("Failed to acquire read lock on config: {}", e))?;

        let content =
            serde_json::to_string_pretty(&*config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).context("Failed to write config file")?;

        tracing::debug!(target: "config", path = %self.config_path.display(), "Configuration saved");

        Ok(())
    }

    /// Get the current configuration (cloned)
    pub fn get_config(&self) -> ShellExtConfig {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_else(|_| ShellExtConfig::default())
    }

    /// Update the configuration with a closure and persist to disk
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ShellExtConfig),
    {
        {
            let mut config = self
                .config
                .write()
                .map_err(|e| anyhow::anyhow!("Failed to acquire write lock on config: {}", e))?;
            f(&mut config);
        }
        self.save()
    }

    /// Set the registered handler variant
    pub fn set_handler(&self, handler: HandlerKind) -> Result<()> {
        self.update(|config| {
            config.handler = handler;
        })
    }

    /// Get the log directory path
    pub fn get_log_dir() -> PathBuf {
        Self::get_base_dir().join("logs")
    }
}
