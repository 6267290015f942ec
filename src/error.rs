use thiserror::Error;

/// Errors raised by the portable core of the shell extension
#[derive(Error, Debug)]
pub enum ShellExtError {
    /// The cropping tool could not be started
    #[error("failed to start '{executable}': {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    /// A registry key or value could not be written or removed
    #[error("registry operation on '{key}' failed: {message}")]
    Registry { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, ShellExtError>;

#[cfg(windows)]
impl From<ShellExtError> for windows::core::Error {
    fn from(err: ShellExtError) -> Self {
        windows::core::Error::new(windows::Win32::Foundation::E_FAIL, err.to_string().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_names_executable() {
        let err = ShellExtError::Spawn {
            executable: "cropper.exe".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let text = err.to_string();
        assert!(text.contains("cropper.exe"));
        assert!(text.contains("not found"));
    }
}
