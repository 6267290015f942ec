use super::run_invoke;
use crate::legacy_menu::{CommandString, Verb, command_string, query_item_count, verb_matches};
use crate::menu::{CommandTag, MenuEntry};
use crate::resolver::{InvokeRequest, Selection};
use crate::shellext::dll::ModuleRef;
use crate::shellext::selection::selection_from_data_object;
use std::sync::{Mutex, PoisonError};
use windows::{
    Win32::{
        Foundation::*,
        System::{Com::*, Registry::HKEY},
        UI::{
            Shell::{Common::ITEMIDLIST, *},
            WindowsAndMessaging::{HMENU, InsertMenuW, MF_BYPOSITION, MF_STRING},
        },
    },
    core::*,
};

const CMIC_MASK_UNICODE: u32 = 0x0000_4000;

/// Classic `IShellExtInit` + `IContextMenu` handler with a single "Crop" item.
///
/// The selection captured in `Initialize` is handed to the resolver as part of an
/// [`InvokeRequest`]; it is never read anywhere else.
#[implement(IShellExtInit, IContextMenu)]
pub struct LegacyContextMenuHandler {
    selection: Mutex<Selection>,
    _module: ModuleRef,
}

impl LegacyContextMenuHandler {
    pub fn new() -> Self {
        Self {
            selection: Mutex::new(Selection::empty()),
            _module: ModuleRef::new(),
        }
    }

    fn selection(&self) -> Selection {
        self.selection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for LegacyContextMenuHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl IShellExtInit_Impl for LegacyContextMenuHandler_Impl {
    fn Initialize(
        &self,
        _pidlfolder: *const ITEMIDLIST,
        pdtobj: Option<&IDataObject>,
        _hkeyprogid: HKEY,
    ) -> Result<()> {
        let selection = selection_from_data_object(pdtobj);
        tracing::debug!(target: "shellext::legacy", count = selection.len(), "Initialize called");
        *self.selection.lock().unwrap_or_else(PoisonError::into_inner) = selection;
        Ok(())
    }
}

impl IContextMenu_Impl for LegacyContextMenuHandler_Impl {
    fn QueryContextMenu(
        &self,
        hmenu: HMENU,
        indexmenu: u32,
        idcmdfirst: u32,
        _idcmdlast: u32,
        uflags: u32,
    ) -> HRESULT {
        let count = query_item_count(self.selection().is_empty(), uflags);
        if count == 0 {
            return HRESULT(0);
        }

        let title = HSTRING::from(MenuEntry::root().title);
        if let Err(e) = unsafe {
            InsertMenuW(
                hmenu,
                indexmenu,
                MF_BYPOSITION | MF_STRING,
                idcmdfirst as usize,
                &title,
            )
        } {
            // Without the item Explorer cannot render our part of the menu
            tracing::error!(target: "shellext::legacy", error = %e, "Failed to insert the PyCropper context menu item");
            return e.code();
        }

        // Success code carries the number of ids used
        HRESULT(count as i32)
    }

    fn InvokeCommand(&self, pici: *const CMINVOKECOMMANDINFO) -> Result<()> {
        if pici.is_null() {
            return Err(Error::from(E_INVALIDARG));
        }

        if !unsafe { is_our_command(pici) } {
            tracing::debug!(target: "shellext::legacy", "InvokeCommand for a foreign verb ignored");
            return Ok(());
        }

        let request = InvokeRequest::new(self.selection(), CommandTag::Root);
        run_invoke(&request);
        Ok(())
    }

    fn GetCommandString(
        &self,
        idcmd: usize,
        utype: u32,
        _preserved: *const u32,
        pszname: PSTR,
        cchmax: u32,
    ) -> Result<()> {
        if pszname.is_null() {
            return Ok(());
        }

        unsafe {
            match command_string(idcmd, utype, cchmax) {
                Some(CommandString::Wide(units)) => {
                    std::ptr::copy_nonoverlapping(units.as_ptr(), pszname.0 as *mut u16, units.len());
                }
                Some(CommandString::Ansi(bytes)) => {
                    std::ptr::copy_nonoverlapping(bytes.as_ptr(), pszname.0, bytes.len());
                }
                None => {}
            }
        }

        Ok(())
    }
}

/// Numeric verb offset 0 or the string verb `pycropper` (ANSI or Unicode).
unsafe fn is_our_command(pici: *const CMINVOKECOMMANDINFO) -> bool {
    let info = unsafe { &*pici };

    // Numeric verbs are passed as MAKEINTRESOURCE: high word zero
    let raw = info.lpVerb.0 as usize;
    if raw >> 16 == 0 {
        return verb_matches(Verb::Offset(raw as u16));
    }

    let verb = if info.cbSize as usize >= std::mem::size_of::<CMINVOKECOMMANDINFOEX>()
        && info.fMask & CMIC_MASK_UNICODE != 0
    {
        let info_ex = unsafe { &*(pici as *const CMINVOKECOMMANDINFOEX) };
        if info_ex.lpVerbW.is_null() {
            unsafe { info.lpVerb.to_string() }.ok()
        } else {
            unsafe { info_ex.lpVerbW.to_string() }.ok()
        }
    } else {
        unsafe { info.lpVerb.to_string() }.ok()
    };

    verb.is_some_and(|verb| verb_matches(Verb::Name(&verb)))
}
