//! Registry layout binding the extension to Explorer.
//!
//! Every key is relative to the per-user classes root
//! (`HKEY_CURRENT_USER\Software\Classes`), so installing needs no elevation.

use crate::config::HandlerKind;
use crate::error::Result;
use crate::menu::{CLSID_PYCROPPER, TOLERANCES};
use rust_i18n::t;

/// Friendly name written under the CLSID key
pub const FRIENDLY_NAME: &str = "PyCropper Shell Extension";

/// `MUIVerb` of the root verb. Registry text does not follow the UI locale.
pub const MENU_VERB_TITLE: &str = "Crop with PyCropper";

/// Verb used by the legacy context menu and the static `.reg` verbs
pub const VERB: &str = "pycropper";

pub const EXPLORER_COMMAND_KEY: &str = r"*\shell\PyCropper";
pub const CONTEXT_MENU_HANDLER_KEY: &str = r"*\shellex\ContextMenuHandlers\PyCropper";

/// Format a u128 as a registry GUID string: `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}`.
pub fn guid_string(value: u128) -> String {
    format!(
        "{{{:08X}-{:04X}-{:04X}-{:04X}-{:012X}}}",
        (value >> 96) as u32,
        (value >> 80) as u16,
        (value >> 64) as u16,
        (value >> 48) as u16,
        value & 0xFFFF_FFFF_FFFF
    )
}

pub fn clsid_string() -> String {
    guid_string(CLSID_PYCROPPER)
}

pub fn clsid_key() -> String {
    format!(r"CLSID\{}", clsid_string())
}

/// One string value to write. `name == None` is the key's default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryValue {
    pub key: String,
    pub name: Option<String>,
    pub data: String,
}

impl RegistryValue {
    fn default_value(key: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
            data: data.into(),
        }
    }

    fn named(key: impl Into<String>, name: &str, data: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: Some(name.to_string()),
            data: data.into(),
        }
    }
}

/// Backend the install plan is applied to.
pub trait RegistryStore {
    /// Create `key` if needed and set one string value on it.
    fn set_string(&mut self, key: &str, name: Option<&str>, data: &str) -> Result<()>;

    /// Delete `key` and everything below it. A missing key is not an error.
    fn delete_tree(&mut self, key: &str) -> Result<()>;
}

/// Values written by `install` for the given handler variant.
pub fn install_plan(handler: HandlerKind, dll_path: &str) -> Vec<RegistryValue> {
    let clsid = clsid_string();
    let clsid_key = clsid_key();
    let server_key = format!(r"{}\InprocServer32", clsid_key);

    let mut values = vec![
        RegistryValue::default_value(clsid_key, FRIENDLY_NAME),
        RegistryValue::default_value(server_key.clone(), dll_path),
        RegistryValue::named(server_key, "ThreadingModel", "Apartment"),
    ];

    match handler {
        HandlerKind::ExplorerCommand => {
            values.push(RegistryValue::named(
                EXPLORER_COMMAND_KEY,
                "MUIVerb",
                MENU_VERB_TITLE,
            ));
            values.push(RegistryValue::named(
                EXPLORER_COMMAND_KEY,
                "ExplorerCommandHandler",
                clsid,
            ));
        }
        HandlerKind::LegacyContextMenu => {
            values.push(RegistryValue::default_value(CONTEXT_MENU_HANDLER_KEY, clsid));
        }
    }

    values
}

/// Keys removed by `uninstall`. Both variants are removed so switching never leaves
/// a stale binding behind.
pub fn uninstall_plan() -> Vec<String> {
    vec![
        EXPLORER_COMMAND_KEY.to_string(),
        CONTEXT_MENU_HANDLER_KEY.to_string(),
        clsid_key(),
    ]
}

/// Register the extension. Any binding of the other variant is removed first.
pub fn install<R: RegistryStore>(store: &mut R, handler: HandlerKind, dll_path: &str) -> Result<()> {
    let stale = match handler {
        HandlerKind::ExplorerCommand => CONTEXT_MENU_HANDLER_KEY,
        HandlerKind::LegacyContextMenu => EXPLORER_COMMAND_KEY,
    };
    store.delete_tree(stale)?;

    for value in install_plan(handler, dll_path) {
        tracing::debug!(target: "registration", key = %value.key, name = ?value.name, "Writing registry value");
        store.set_string(&value.key, value.name.as_deref(), &value.data)?;
    }

    tracing::info!(target: "registration", ?handler, dll = dll_path, "Shell extension registered");
    Ok(())
}

/// Remove every key the extension may have written.
pub fn uninstall<R: RegistryStore>(store: &mut R) -> Result<()> {
    for key in uninstall_plan() {
        tracing::debug!(target: "registration", key = %key, "Deleting registry key");
        store.delete_tree(&key)?;
    }

    tracing::info!(target: "registration", "Shell extension unregistered");
    Ok(())
}

fn escape_reg(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render a `.reg` file with static cascading verbs, one per tolerance.
///
/// This installs the flyout without the DLL: Explorer runs `cropper_path` directly.
/// Verb titles are always English, like the values `install` writes.
pub fn render_reg_file(cropper_path: &str) -> String {
    let root = r"HKEY_CURRENT_USER\Software\Classes\*\shell\PyCropper";

    let mut out = String::from("Windows Registry Editor Version 5.00\r\n\r\n");
    out.push_str(&format!("[{}]\r\n", root));
    out.push_str(&format!("\"MUIVerb\"=\"{}\"\r\n", escape_reg(MENU_VERB_TITLE)));
    out.push_str("\"SubCommands\"=\"\"\r\n\r\n");
    out.push_str(&format!("[{}\\shell]\r\n\r\n", root));

    for (index, value) in TOLERANCES.iter().enumerate() {
        let verb = format!(r"{}\shell\{:02}_{}_{}", root, index, VERB, value);
        out.push_str(&format!("[{}]\r\n", verb));
        out.push_str(&format!(
            "\"MUIVerb\"=\"{}\"\r\n\r\n",
            escape_reg(&t!("toleranceTitle", locale = "en", value = value))
        ));
        out.push_str(&format!("[{}\\command]\r\n", verb));
        out.push_str(&format!(
            "@=\"{}\"\r\n\r\n",
            escape_reg(&format!("\"{}\" -t {} \"%1\"", cropper_path, value))
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Registry stand-in: key -> (value name -> data)
    #[derive(Default, Debug, PartialEq)]
    struct MemoryStore {
        keys: BTreeMap<String, BTreeMap<String, String>>,
    }

    impl RegistryStore for MemoryStore {
        fn set_string(&mut self, key: &str, name: Option<&str>, data: &str) -> Result<()> {
            self.keys
                .entry(key.to_string())
                .or_default()
                .insert(name.unwrap_or("").to_string(), data.to_string());
            Ok(())
        }

        fn delete_tree(&mut self, key: &str) -> Result<()> {
            let prefix = format!("{}\\", key);
            self.keys.retain(|k, _| k != key && !k.starts_with(&prefix));
            Ok(())
        }
    }

    impl MemoryStore {
        fn value(&self, key: &str, name: &str) -> Option<&str> {
            self.keys.get(key)?.get(name).map(String::as_str)
        }
    }

    #[test]
    fn test_clsid_string_format() {
        assert_eq!(clsid_string(), "{7F56439E-2130-4115-A27A-8D562049B848}");
        assert_eq!(clsid_key(), r"CLSID\{7F56439E-2130-4115-A27A-8D562049B848}");
    }

    #[test]
    fn test_install_explorer_command() {
        let mut store = MemoryStore::default();
        install(&mut store, HandlerKind::ExplorerCommand, r"C:\ext\pycropper.dll").unwrap();

        assert_eq!(
            store.value(EXPLORER_COMMAND_KEY, "MUIVerb"),
            Some("Crop with PyCropper")
        );
        assert_eq!(
            store.value(EXPLORER_COMMAND_KEY, "ExplorerCommandHandler"),
            Some("{7F56439E-2130-4115-A27A-8D562049B848}")
        );
        let server = format!(r"{}\InprocServer32", clsid_key());
        assert_eq!(store.value(&server, ""), Some(r"C:\ext\pycropper.dll"));
        assert_eq!(store.value(&server, "ThreadingModel"), Some("Apartment"));
        assert!(!store.keys.contains_key(CONTEXT_MENU_HANDLER_KEY));
    }

    #[test]
    fn test_install_plan_verb_title_is_fixed() {
        let plan = install_plan(HandlerKind::ExplorerCommand, "a.dll");
        let verb = plan
            .iter()
            .find(|v| v.key == EXPLORER_COMMAND_KEY && v.name.as_deref() == Some("MUIVerb"))
            .unwrap();
        assert_eq!(verb.data, MENU_VERB_TITLE);
        assert_eq!(MENU_VERB_TITLE, "Crop with PyCropper");
    }

    #[test]
    fn test_install_legacy_replaces_explorer_command() {
        let mut store = MemoryStore::default();
        install(&mut store, HandlerKind::ExplorerCommand, "a.dll").unwrap();
        install(&mut store, HandlerKind::LegacyContextMenu, "a.dll").unwrap();

        assert_eq!(
            store.value(CONTEXT_MENU_HANDLER_KEY, ""),
            Some("{7F56439E-2130-4115-A27A-8D562049B848}")
        );
        assert!(!store.keys.contains_key(EXPLORER_COMMAND_KEY));
    }

    #[test]
    fn test_install_is_idempotent() {
        let mut once = MemoryStore::default();
        install(&mut once, HandlerKind::ExplorerCommand, "a.dll").unwrap();

        let mut twice = MemoryStore::default();
        install(&mut twice, HandlerKind::ExplorerCommand, "a.dll").unwrap();
        install(&mut twice, HandlerKind::ExplorerCommand, "a.dll").unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_uninstall_removes_everything() {
        let mut store = MemoryStore::default();
        install(&mut store, HandlerKind::ExplorerCommand, "a.dll").unwrap();
        uninstall(&mut store).unwrap();
        assert!(store.keys.is_empty());
    }

    #[test]
    fn test_uninstall_without_install_succeeds() {
        let mut store = MemoryStore::default();
        assert!(uninstall(&mut store).is_ok());
        assert!(uninstall(&mut store).is_ok());
    }

    #[test]
    fn test_render_reg_file() {
        let rendered = render_reg_file(r"C:\Tools\cropper.exe");

        assert!(rendered.starts_with("Windows Registry Editor Version 5.00"));
        assert!(rendered.contains("\"SubCommands\"=\"\""));
        assert!(rendered.contains(r#"@="\"C:\\Tools\\cropper.exe\" -t 50 \"%1\"""#));

        let positions: Vec<usize> = TOLERANCES
            .iter()
            .map(|v| rendered.find(&format!("\"MUIVerb\"=\"Tolerance {}\"", v)).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }
}
