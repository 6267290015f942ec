use std::io;
use std::process::{Command, Stdio};

use rust_i18n::t;

use crate::config::DEFAULT_EXECUTABLE;
use crate::error::ShellExtError;
use crate::resolver::{InvokeRequest, LaunchRequest};

/// Starts a program without waiting for it.
pub trait Spawner {
    fn spawn(&self, program: &str, args: &[String]) -> io::Result<()>;
}

/// Shows a blocking error notification to the user.
pub trait Notifier {
    fn notify_error(&self, caption: &str, message: &str);
}

/// Spawns a detached child through `std::process::Command`.
///
/// A bare program name is resolved through the standard search path. Stdio is
/// detached and the child handle is dropped, so the host never waits on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn(&self, program: &str, args: &[String]) -> io::Result<()> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = command.spawn()?;
        tracing::debug!(target: "launcher", pid = child.id(), program, "Child process started");
        Ok(())
    }
}

/// Reports failures to the log only. Used where no desktop is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_error(&self, caption: &str, message: &str) {
        tracing::error!(target: "launcher", caption, "{}", message);
    }
}

/// Launches the cropping tool for a resolved request.
pub struct Launcher<S: Spawner, N: Notifier> {
    executable: String,
    spawner: S,
    notifier: N,
}

impl<N: Notifier> Launcher<ProcessSpawner, N> {
    pub fn with_notifier(executable: impl Into<String>, notifier: N) -> Self {
        Self::new(executable, ProcessSpawner, notifier)
    }
}

impl<S: Spawner, N: Notifier> Launcher<S, N> {
    pub fn new(executable: impl Into<String>, spawner: S, notifier: N) -> Self {
        let executable = executable.into();
        let executable = if executable.trim().is_empty() {
            DEFAULT_EXECUTABLE.to_string()
        } else {
            executable
        };

        Self {
            executable,
            spawner,
            notifier,
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Start the cropper once for `request`.
    ///
    /// A spawn failure is shown to the user and then swallowed; the caller always
    /// continues normally.
    pub fn launch(&self, request: &LaunchRequest) {
        if let Err(err) = self.try_launch(request) {
            tracing::error!(target: "launcher", error = %err, "Failed to launch cropper");
            self.report(&err);
        }
    }

    /// Resolve and launch. Returns the request that was launched, if any.
    pub fn dispatch(&self, invoke: &InvokeRequest) -> Option<LaunchRequest> {
        let Some(request) = invoke.resolve() else {
            tracing::debug!(target: "launcher", tag = ?invoke.tag, "No usable path in selection, nothing to launch");
            return None;
        };

        self.launch(&request);
        Some(request)
    }

    fn try_launch(&self, request: &LaunchRequest) -> Result<(), ShellExtError> {
        tracing::info!(
            target: "launcher",
            executable = %self.executable,
            path = %request.path,
            tolerance = request.tolerance,
            "Launching cropper"
        );

        self.spawner
            .spawn(&self.executable, &request.args())
            .map_err(|source| ShellExtError::Spawn {
                executable: self.executable.clone(),
                source,
            })
    }

    fn report(&self, err: &ShellExtError) {
        let detail = match err {
            ShellExtError::Spawn { source, .. } => source.to_string(),
            other => other.to_string(),
        };
        let executable = &self.executable;
        let message = t!("launchFailedMessage", executable = executable, error = detail);
        self.notifier
            .notify_error(t!("launchFailedCaption").as_ref(), message.as_ref());
    }
}
