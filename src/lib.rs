pub mod config;
pub mod error;
pub mod launcher;
pub mod legacy_menu;
pub mod logging;
pub mod menu;
pub mod registration;
pub mod resolver;
#[cfg(windows)]
pub mod shellext;
pub mod utils;

// Re-export commonly used types
pub use config::{ConfigManager, HandlerKind, ShellExtConfig};
pub use error::ShellExtError;
pub use launcher::{Launcher, Notifier, ProcessSpawner, Spawner};
pub use logging::{LogConfig, LogGuard};
pub use menu::{CommandTag, MenuEntry};
pub use resolver::{InvokeRequest, LaunchRequest, Selection};

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

/// Load configuration, start file logging and pick the UI locale.
///
/// Runs once per process; every COM entry point calls it before doing real work.
/// Failures are logged (when possible) and otherwise ignored so Explorer keeps working
/// with defaults.
pub fn init() {
    utils::app::init_once(|| {
        let config = match ConfigManager::init() {
            Ok(manager) => manager.get_config(),
            Err(_) => ShellExtConfig::default(),
        };

        let guard = logging::init_logging(LogConfig::from_config(&config)).ok();

        let locale = apply_locale(&config);

        tracing::info!(target: "main", locale = %locale, executable = %config.executable, "PyCropper shell extension initialized");
        guard
    });
}

/// Locale to use: the configured language, else the system locale, else English.
pub fn select_locale(configured: Option<&str>, system: Option<String>) -> String {
    configured
        .map(str::trim)
        .filter(|language| !language.is_empty())
        .map(str::to_string)
        .or(system)
        .unwrap_or_else(|| "en".to_string())
}

/// Make the configured (or system) locale the active one and return it.
pub fn apply_locale(config: &ShellExtConfig) -> String {
    let locale = select_locale(config.language.as_deref(), sys_locale::get_locale());
    rust_i18n::set_locale(&locale);
    locale
}
