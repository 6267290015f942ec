use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use crate::logging::LogGuard;

static MODULE_PATH: OnceLock<PathBuf> = OnceLock::new();
static RUNTIME: OnceLock<Mutex<Option<LogGuard>>> = OnceLock::new();

/// Remember where the extension DLL was loaded from.
pub fn init_module_path(path: PathBuf) {
    MODULE_PATH.set(path).ok();
}

pub fn module_path() -> Option<PathBuf> {
    MODULE_PATH.get().cloned()
}

/// Run process-wide initialization exactly once and keep its log guard alive.
pub fn init_once<F>(init: F)
where
    F: FnOnce() -> Option<LogGuard>,
{
    RUNTIME.get_or_init(|| Mutex::new(init()));
}

pub fn is_initialized() -> bool {
    RUNTIME.get().is_some()
}

/// Icon path for the root entry: the configured one, else `pycropper.ico` beside the DLL.
pub fn icon_path(configured: Option<&str>) -> Option<String> {
    if let Some(path) = configured.filter(|p| !p.trim().is_empty()) {
        return Some(path.to_string());
    }

    let icon = module_path()?.parent()?.join("pycropper.ico");
    icon.exists().then(|| icon.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_icon_wins() {
        assert_eq!(
            icon_path(Some("C:\\icons\\crop.ico")),
            Some("C:\\icons\\crop.ico".to_string())
        );
    }

    #[test]
    fn test_blank_icon_is_ignored() {
        // No module path is recorded in unit tests
        assert_eq!(icon_path(Some("  ")), None);
        assert_eq!(icon_path(None), None);
    }

    #[test]
    fn test_init_once_runs_once() {
        let mut calls = 0;
        init_once(|| {
            calls += 1;
            None
        });
        init_once(|| {
            calls += 1;
            None
        });
        assert!(calls <= 1);
        assert!(is_initialized());
    }
}
