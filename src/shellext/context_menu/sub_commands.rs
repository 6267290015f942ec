use super::CropCommandHandler;
use crate::menu::{EntryCursor, sub_commands};
use crate::shellext::dll::ModuleRef;
use std::sync::{Mutex, PoisonError};
use windows::{
    Win32::{Foundation::*, UI::Shell::*},
    core::*,
};

/// Enumerator over the tolerance flyout entries.
#[implement(IEnumExplorerCommand)]
pub struct SubCommands {
    cursor: Mutex<EntryCursor>,
    _module: ModuleRef,
}

impl SubCommands {
    pub fn new() -> Self {
        Self::with_cursor(EntryCursor::new(sub_commands()))
    }

    fn with_cursor(cursor: EntryCursor) -> Self {
        Self {
            cursor: Mutex::new(cursor),
            _module: ModuleRef::new(),
        }
    }

    fn cursor(&self) -> std::sync::MutexGuard<'_, EntryCursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SubCommands {
    fn default() -> Self {
        Self::new()
    }
}

impl IEnumExplorerCommand_Impl for SubCommands_Impl {
    fn Clone(&self) -> windows::core::Result<IEnumExplorerCommand> {
        tracing::trace!(target: "shellext::context_menu:sub_commands", "Clone called");
        let cursor = self.cursor().clone();
        Ok(ComObject::new(SubCommands::with_cursor(cursor)).to_interface())
    }

    fn Next(
        &self,
        count: u32,
        commands: *mut Option<IExplorerCommand>,
        fetched: *mut u32,
    ) -> HRESULT {
        tracing::trace!(target: "shellext::context_menu:sub_commands", count, "Next called");
        if count > 0 && commands.is_null() {
            return E_POINTER;
        }

        let entries = self.cursor().take(count as usize);
        for (index, entry) in entries.iter().enumerate() {
            let command: IExplorerCommand = CropCommandHandler::from_entry(entry.clone()).into();
            unsafe {
                commands.add(index).write(Some(command));
            }
        }

        let produced = entries.len() as u32;
        if !fetched.is_null() {
            unsafe {
                fetched.write(produced);
            }
        }

        if produced == count { S_OK } else { S_FALSE }
    }

    fn Reset(&self) -> windows::core::Result<()> {
        tracing::trace!(target: "shellext::context_menu:sub_commands", "Reset called");
        self.cursor().reset();
        Ok(())
    }

    fn Skip(&self, count: u32) -> windows::core::Result<()> {
        tracing::trace!(target: "shellext::context_menu:sub_commands", count, "Skip called");
        self.cursor().skip(count as usize);
        Ok(())
    }
}
