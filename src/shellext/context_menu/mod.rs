// Context menu handlers for Windows Explorer

mod explorer_command;
mod factory;
mod legacy;
mod sub_commands;

pub use explorer_command::CropCommandHandler;
pub use factory::PyCropperClassFactory;
pub use legacy::LegacyContextMenuHandler;
pub use sub_commands::SubCommands;

use crate::config::ConfigManager;
use crate::launcher::Launcher;
use crate::resolver::{InvokeRequest, LaunchRequest};
use crate::shellext::dialog::MessageBoxNotifier;

/// Launch the cropper for an invocation, reporting failures with a message box.
pub(crate) fn run_invoke(request: &InvokeRequest) -> Option<LaunchRequest> {
    let config = ConfigManager::current();
    Launcher::with_notifier(config.executable, MessageBoxNotifier).dispatch(request)
}
