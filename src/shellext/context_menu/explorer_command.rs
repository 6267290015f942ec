use super::{SubCommands, run_invoke};
use crate::config::ConfigManager;
use crate::menu::{CommandState, CommandTag, MenuEntry, command_state};
use crate::resolver::InvokeRequest;
use crate::shellext::dll::ModuleRef;
use crate::shellext::selection::{selection_count, selection_from_items};
use crate::shellext::to_shell_string;
use crate::utils::app;
use windows::{
    Win32::{Foundation::*, System::Com::*, UI::Shell::*},
    core::*,
};

/// One `IExplorerCommand` for both the root entry and every tolerance entry; the
/// [`CommandTag`] decides how it answers.
#[implement(IExplorerCommand)]
pub struct CropCommandHandler {
    entry: MenuEntry,
    icon_path: Option<String>,
    _module: ModuleRef,
}

impl CropCommandHandler {
    pub fn new(tag: CommandTag) -> Self {
        Self::from_entry(MenuEntry::new(tag))
    }

    pub fn root() -> Self {
        Self::new(CommandTag::Root)
    }

    pub fn from_entry(entry: MenuEntry) -> Self {
        let icon_path = match entry.tag {
            CommandTag::Root => app::icon_path(ConfigManager::current().icon_path.as_deref()),
            CommandTag::Tolerance(_) => None,
        };

        Self {
            entry,
            icon_path,
            _module: ModuleRef::new(),
        }
    }
}

impl IExplorerCommand_Impl for CropCommandHandler_Impl {
    fn GetTitle(&self, _items: Option<&IShellItemArray>) -> Result<PWSTR> {
        to_shell_string(&self.entry.title)
    }

    fn GetIcon(&self, _items: Option<&IShellItemArray>) -> Result<PWSTR> {
        match &self.icon_path {
            Some(icon_path) => to_shell_string(icon_path),
            None => Err(Error::from(E_NOTIMPL)),
        }
    }

    fn GetToolTip(&self, _items: Option<&IShellItemArray>) -> Result<PWSTR> {
        to_shell_string(&self.entry.tooltip)
    }

    fn GetCanonicalName(&self) -> Result<GUID> {
        Ok(GUID::from_u128(self.entry.tag.canonical_name()))
    }

    fn GetState(&self, items: Option<&IShellItemArray>, _oktobeslow: BOOL) -> Result<u32> {
        let state = match command_state(selection_count(items)) {
            CommandState::Enabled => ECS_ENABLED,
            CommandState::Hidden => ECS_HIDDEN,
        };
        Ok(state.0 as u32)
    }

    fn Invoke(
        &self,
        selection: Option<&IShellItemArray>,
        _bindctx: Option<&IBindCtx>,
    ) -> Result<()> {
        tracing::debug!(target: "shellext::context_menu", tag = ?self.entry.tag, "Crop command invoked");

        let request = InvokeRequest::new(selection_from_items(selection), self.entry.tag);
        run_invoke(&request);

        Ok(())
    }

    fn GetFlags(&self) -> Result<u32> {
        if self.entry.tag.has_sub_commands() {
            Ok((ECF_DEFAULT.0 | ECF_HASSUBCOMMANDS.0) as u32)
        } else {
            Ok(ECF_DEFAULT.0 as u32)
        }
    }

    fn EnumSubCommands(&self) -> Result<IEnumExplorerCommand> {
        if !self.entry.tag.has_sub_commands() {
            return Err(Error::from(E_NOTIMPL));
        }

        tracing::trace!(target: "shellext::context_menu", "EnumSubCommands called");
        Ok(SubCommands::new().into())
    }
}
