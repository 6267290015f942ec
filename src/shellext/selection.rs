//! Turning what Explorer hands us into a [`Selection`].
//!
//! Marshaling failures never escape: an unreadable array or data object becomes an
//! empty selection, an unreadable item is skipped.

use std::ffi::c_void;

use windows::Win32::Foundation::E_INVALIDARG;
use windows::Win32::System::Com::{
    CoTaskMemFree, DVASPECT_CONTENT, FORMATETC, IDataObject, TYMED_HGLOBAL,
};
use windows::Win32::System::Ole::{CF_HDROP, ReleaseStgMedium};
use windows::Win32::UI::Shell::{DragQueryFileW, HDROP, IShellItemArray, SIGDN_FILESYSPATH};
use windows::core::*;

use crate::legacy_menu::dropped_path;
use crate::resolver::Selection;

/// Number of selected items, 0 when Explorer passes nothing or the count fails.
pub fn selection_count(items: Option<&IShellItemArray>) -> usize {
    let Some(items) = items else {
        return 0;
    };

    unsafe { items.GetCount() }
        .map(|count| count as usize)
        .unwrap_or(0)
}

/// File-system paths of a shell item array, in array order.
pub fn selection_from_items(items: Option<&IShellItemArray>) -> Selection {
    let Some(items) = items else {
        return Selection::empty();
    };

    let count = match unsafe { items.GetCount() } {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(target: "shellext::context_menu", error = %e, "Failed to read selection count");
            return Selection::empty();
        }
    };

    let mut paths = Vec::with_capacity(count as usize);
    for index in 0..count {
        match file_system_path(items, index) {
            Ok(path) => paths.push(path),
            Err(e) => {
                tracing::debug!(target: "shellext::context_menu", index, error = %e, "Skipping item without a file system path");
            }
        }
    }

    Selection::new(paths)
}

fn file_system_path(items: &IShellItemArray, index: u32) -> Result<String> {
    unsafe {
        let item = items.GetItemAt(index)?;
        let name = item.GetDisplayName(SIGDN_FILESYSPATH)?;
        let path = name.to_string();
        CoTaskMemFree(Some(name.0 as *const c_void));
        path.map_err(|_| Error::from(E_INVALIDARG))
    }
}

/// Paths dropped into a `CF_HDROP` data object (legacy `IShellExtInit` path).
pub fn selection_from_data_object(data: Option<&IDataObject>) -> Selection {
    let Some(data) = data else {
        return Selection::empty();
    };

    match read_hdrop(data) {
        Ok(paths) => Selection::new(paths),
        Err(e) => {
            tracing::warn!(target: "shellext::legacy", error = %e, "Failed to read file list from data object");
            Selection::empty()
        }
    }
}

fn read_hdrop(data: &IDataObject) -> Result<Vec<String>> {
    let format = FORMATETC {
        cfFormat: CF_HDROP.0,
        ptd: std::ptr::null_mut(),
        dwAspect: DVASPECT_CONTENT.0 as u32,
        lindex: -1,
        tymed: TYMED_HGLOBAL.0 as u32,
    };

    unsafe {
        let mut medium = data.GetData(&format)?;

        let paths = if medium.tymed != TYMED_HGLOBAL.0 as u32 || medium.u.hGlobal.is_invalid() {
            Vec::new()
        } else {
            drop_paths(HDROP(medium.u.hGlobal.0))
        };

        ReleaseStgMedium(&mut medium);
        Ok(paths)
    }
}

unsafe fn drop_paths(hdrop: HDROP) -> Vec<String> {
    let count = unsafe { DragQueryFileW(hdrop, u32::MAX, None) };
    let mut paths = Vec::with_capacity(count as usize);

    for index in 0..count {
        let len = unsafe { DragQueryFileW(hdrop, index, None) } as usize;
        if len == 0 {
            continue;
        }

        let mut buffer = vec![0u16; len + 1];
        let copied = unsafe { DragQueryFileW(hdrop, index, Some(&mut buffer)) } as usize;
        if let Some(path) = dropped_path(&buffer[..copied.min(len)]) {
            paths.push(path);
        }
    }

    paths
}
