use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, WIN32_ERROR};
use windows::Win32::System::Registry::{
    HKEY, HKEY_CURRENT_USER, KEY_WRITE, REG_OPTION_NON_VOLATILE, REG_SZ, RegCloseKey,
    RegCreateKeyExW, RegDeleteTreeW, RegSetValueExW,
};
use windows::Win32::UI::Shell::{SHCNE_ASSOCCHANGED, SHCNF_IDLIST, SHChangeNotify};
use windows::core::{HSTRING, PCWSTR};

use crate::error::{Result, ShellExtError};
use crate::registration::RegistryStore;

/// Registry store rooted at `HKEY_CURRENT_USER\Software\Classes`.
pub struct Win32RegistryStore {
    root: HKEY,
    prefix: &'static str,
}

impl Win32RegistryStore {
    pub fn current_user_classes() -> Self {
        Self {
            root: HKEY_CURRENT_USER,
            prefix: r"Software\Classes",
        }
    }

    fn full_path(&self, key: &str) -> HSTRING {
        HSTRING::from(format!(r"{}\{}", self.prefix, key))
    }
}

fn registry_error(key: &str, status: WIN32_ERROR) -> ShellExtError {
    ShellExtError::Registry {
        key: key.to_string(),
        message: windows::core::Error::from(status.to_hresult()).message(),
    }
}

impl RegistryStore for Win32RegistryStore {
    fn set_string(&mut self, key: &str, name: Option<&str>, data: &str) -> Result<()> {
        let path = self.full_path(key);
        let mut hkey = HKEY::default();

        let status = unsafe {
            RegCreateKeyExW(
                self.root,
                &path,
                0,
                PCWSTR::null(),
                REG_OPTION_NON_VOLATILE,
                KEY_WRITE,
                None,
                &mut hkey,
                None,
            )
        };
        if status.is_err() {
            return Err(registry_error(key, status));
        }

        // REG_SZ data is UTF-16 including the terminating NUL
        let wide: Vec<u16> = data.encode_utf16().chain(std::iter::once(0)).collect();
        let bytes: Vec<u8> = wide.iter().flat_map(|unit| unit.to_le_bytes()).collect();
        let value_name = name.map(HSTRING::from);
        let value_name = value_name
            .as_ref()
            .map(|name| PCWSTR(name.as_ptr()))
            .unwrap_or(PCWSTR::null());

        let status = unsafe { RegSetValueExW(hkey, value_name, 0, REG_SZ, Some(&bytes)) };
        unsafe {
            let _ = RegCloseKey(hkey);
        }

        if status.is_err() {
            return Err(registry_error(key, status));
        }
        Ok(())
    }

    fn delete_tree(&mut self, key: &str) -> Result<()> {
        let path = self.full_path(key);
        let status = unsafe { RegDeleteTreeW(self.root, &path) };

        if status.is_ok() || status == ERROR_FILE_NOT_FOUND {
            Ok(())
        } else {
            Err(registry_error(key, status))
        }
    }
}

/// Ask Explorer to reload file associations after the keys changed.
pub fn notify_association_changed() {
    unsafe {
        SHChangeNotify(SHCNE_ASSOCCHANGED, SHCNF_IDLIST, None, None);
    }
}
