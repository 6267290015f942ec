// DLL entry points Explorer and regsvr32 call into
use std::ffi::c_void;
use std::path::PathBuf;
use std::ptr::null_mut;
use std::sync::atomic::{AtomicU32, Ordering};

use windows::Win32::Foundation::{
    BOOL, CLASS_E_CLASSNOTAVAILABLE, E_POINTER, HMODULE, S_FALSE, S_OK, TRUE,
};
use windows::Win32::System::Com::IClassFactory;
use windows::Win32::System::LibraryLoader::GetModuleFileNameW;
use windows::Win32::System::SystemServices::DLL_PROCESS_ATTACH;
use windows::core::{GUID, HRESULT, Interface};

use super::CLSID_EXPLORER_COMMAND;
use super::context_menu::PyCropperClassFactory;
use super::registry::{Win32RegistryStore, notify_association_changed};
use crate::config::ConfigManager;
use crate::registration;
use crate::utils::app;

static DLL_LOCK_COUNT: AtomicU32 = AtomicU32::new(0);
static OBJECT_COUNT: AtomicU32 = AtomicU32::new(0);

/// Held by every COM object so the DLL is not unloaded while one is alive.
pub struct ModuleRef(());

impl ModuleRef {
    pub fn new() -> Self {
        OBJECT_COUNT.fetch_add(1, Ordering::SeqCst);
        Self(())
    }
}

impl Default for ModuleRef {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModuleRef {
    fn drop(&mut self) {
        OBJECT_COUNT.fetch_sub(1, Ordering::SeqCst);
    }
}

pub(crate) fn lock_server(lock: bool) {
    if lock {
        DLL_LOCK_COUNT.fetch_add(1, Ordering::SeqCst);
    } else {
        // Never wrap below zero on an unbalanced unlock
        let _ = DLL_LOCK_COUNT.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
            count.checked_sub(1)
        });
    }
}

fn module_file_name(module: HMODULE) -> Option<PathBuf> {
    let mut buffer = vec![0u16; 1024];
    loop {
        let len = unsafe { GetModuleFileNameW(module, &mut buffer) } as usize;
        if len == 0 {
            return None;
        }
        if len < buffer.len() {
            return Some(PathBuf::from(String::from_utf16_lossy(&buffer[..len])));
        }
        // Truncated: retry with a larger buffer
        buffer.resize(buffer.len() * 2, 0);
    }
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllMain(module: HMODULE, reason: u32, _reserved: *mut c_void) -> BOOL {
    if reason == DLL_PROCESS_ATTACH {
        if let Some(path) = module_file_name(module) {
            app::init_module_path(path);
        }
    }
    TRUE
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllGetClassObject(
    rclsid: *const GUID,
    riid: *const GUID,
    ppv: *mut *mut c_void,
) -> HRESULT {
    if ppv.is_null() {
        return E_POINTER;
    }
    unsafe {
        *ppv = null_mut();
    }

    if rclsid.is_null() || riid.is_null() {
        return E_POINTER;
    }

    crate::init();

    if unsafe { *rclsid } != CLSID_EXPLORER_COMMAND {
        tracing::debug!(target: "shellext::dll", "DllGetClassObject called for an unknown CLSID");
        return CLASS_E_CLASSNOTAVAILABLE;
    }

    let handler = ConfigManager::current().handler;
    let factory: IClassFactory = PyCropperClassFactory::new(handler).into();
    unsafe { factory.query(riid, ppv) }
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllCanUnloadNow() -> HRESULT {
    if DLL_LOCK_COUNT.load(Ordering::SeqCst) == 0 && OBJECT_COUNT.load(Ordering::SeqCst) == 0 {
        S_OK
    } else {
        S_FALSE
    }
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllRegisterServer() -> HRESULT {
    crate::init();

    let Some(dll_path) = app::module_path() else {
        tracing::error!(target: "registration", "Module path unknown, cannot register");
        return windows::Win32::Foundation::E_UNEXPECTED;
    };

    let handler = ConfigManager::current().handler;
    let mut store = Win32RegistryStore::current_user_classes();
    match registration::install(&mut store, handler, &dll_path.display().to_string()) {
        Ok(()) => {
            notify_association_changed();
            S_OK
        }
        Err(e) => {
            tracing::error!(target: "registration", error = %e, "DllRegisterServer failed");
            windows::core::Error::from(e).code()
        }
    }
}

#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn DllUnregisterServer() -> HRESULT {
    crate::init();

    let mut store = Win32RegistryStore::current_user_classes();
    match registration::uninstall(&mut store) {
        Ok(()) => {
            notify_association_changed();
            S_OK
        }
        Err(e) => {
            tracing::error!(target: "registration", error = %e, "DllUnregisterServer failed");
            windows::core::Error::from(e).code()
        }
    }
}
