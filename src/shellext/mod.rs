// Windows Shell integration: COM objects Explorer loads from this DLL
pub mod context_menu;
pub mod dialog;
pub mod dll;
pub mod registry;
pub mod selection;

use windows::Win32::UI::Shell::SHStrDupW;
use windows::core::*;

use crate::menu::CLSID_PYCROPPER;

// Shared by the Explorer command and the legacy context menu; only one is registered
pub const CLSID_EXPLORER_COMMAND: GUID = GUID::from_u128(CLSID_PYCROPPER);

/// Copy `text` into a CoTaskMem string owned by the caller (Explorer).
pub(crate) fn to_shell_string(text: &str) -> Result<PWSTR> {
    let hstring = HSTRING::from(text);
    unsafe { SHStrDupW(&hstring) }
}
