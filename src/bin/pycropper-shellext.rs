use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pycropper_shellext::config::{ConfigManager, HandlerKind};
use pycropper_shellext::launcher::{Launcher, LogNotifier};
use pycropper_shellext::menu::{CommandTag, TOLERANCES};
use pycropper_shellext::registration;
use pycropper_shellext::resolver::{InvokeRequest, Selection};
use pycropper_shellext::{LogConfig, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pycropper-shellext", version, about = "Install and exercise the PyCropper Explorer extension")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register the extension DLL for the current user
    Register {
        /// Path to pycropper_shellext.dll
        #[arg(long)]
        dll: PathBuf,
        /// Register the classic IContextMenu handler instead of the Explorer command
        #[arg(long)]
        legacy: bool,
    },
    /// Remove every registry key the extension writes
    Unregister,
    /// Write a .reg file with static per-tolerance verbs
    RenderReg {
        /// Full path of the cropper executable the verbs should run
        #[arg(long)]
        cropper: String,
        /// Output file; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Launch the cropper the same way the context menu does
    Launch {
        path: String,
        #[arg(long, short)]
        tolerance: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::init()
        .context("Failed to load configuration")?
        .get_config();
    let _log_guard = logging::init_logging(LogConfig::from_config(&config).with_stdout(true))
        .context("Failed to initialize logging system")?;
    let locale = pycropper_shellext::apply_locale(&config);
    tracing::debug!(target: "main", locale = %locale, "Locale selected");

    match cli.command {
        Command::Register { dll, legacy } => {
            let handler = if legacy {
                HandlerKind::LegacyContextMenu
            } else {
                HandlerKind::ExplorerCommand
            };
            let dll = dll
                .canonicalize()
                .with_context(|| format!("DLL not found at {}", dll.display()))?;
            register(&dll, handler)?;
            ConfigManager::init()?
                .set_handler(handler)
                .context("Failed to save handler choice")?;
            tracing::info!(target: "main", dll = %dll.display(), ?handler, "Registered");
        }
        Command::Unregister => {
            unregister()?;
            tracing::info!(target: "main", "Unregistered");
        }
        Command::RenderReg { cropper, output } => {
            let rendered = registration::render_reg_file(&cropper);
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(target: "main", path = %path.display(), "Registry file written");
                }
                None => print!("{}", rendered),
            }
        }
        Command::Launch { path, tolerance } => {
            let tag = match tolerance {
                None => CommandTag::Root,
                Some(value) if TOLERANCES.contains(&value) => CommandTag::Tolerance(value),
                Some(value) => bail!("tolerance must be one of {:?}, got {}", TOLERANCES, value),
            };
            let request = InvokeRequest::new(Selection::new([path]), tag);
            let launcher = Launcher::with_notifier(config.executable, LogNotifier);
            if launcher.dispatch(&request).is_none() {
                bail!("no usable path given");
            }
        }
    }

    Ok(())
}

#[cfg(windows)]
fn register(dll: &std::path::Path, handler: HandlerKind) -> Result<()> {
    use pycropper_shellext::shellext::registry::{Win32RegistryStore, notify_association_changed};

    let mut store = Win32RegistryStore::current_user_classes();
    registration::install(&mut store, handler, &dll.display().to_string())?;
    notify_association_changed();
    Ok(())
}

#[cfg(windows)]
fn unregister() -> Result<()> {
    use pycropper_shellext::shellext::registry::{Win32RegistryStore, notify_association_changed};

    let mut store = Win32RegistryStore::current_user_classes();
    registration::uninstall(&mut store)?;
    notify_association_changed();
    Ok(())
}

#[cfg(not(windows))]
fn register(_dll: &std::path::Path, _handler: HandlerKind) -> Result<()> {
    bail!("registration is only supported on Windows")
}

#[cfg(not(windows))]
fn unregister() -> Result<()> {
    bail!("registration is only supported on Windows")
}
