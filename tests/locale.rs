//! Runs in its own process: switching the active locale here cannot disturb the unit
//! tests, which expect English.

use pycropper_shellext::config::{HandlerKind, ShellExtConfig};
use pycropper_shellext::legacy_menu::{CommandString, GCS_HELPTEXTA, command_string};
use pycropper_shellext::menu::MenuEntry;
use pycropper_shellext::registration::{EXPLORER_COMMAND_KEY, install_plan, render_reg_file};

#[test]
fn test_registry_and_ansi_text_stay_english_under_chinese_locale() {
    let config = ShellExtConfig {
        language: Some("zh-CN".to_string()),
        ..ShellExtConfig::default()
    };
    assert_eq!(pycropper_shellext::apply_locale(&config), "zh-CN");
    assert_eq!(MenuEntry::root().title, "使用 PyCropper 裁剪");

    let plan = install_plan(HandlerKind::ExplorerCommand, "a.dll");
    let verb = plan
        .iter()
        .find(|v| v.key == EXPLORER_COMMAND_KEY && v.name.as_deref() == Some("MUIVerb"))
        .unwrap();
    assert_eq!(verb.data, "Crop with PyCropper");

    let rendered = render_reg_file(r"C:\Tools\cropper.exe");
    assert!(rendered.contains("\"MUIVerb\"=\"Crop with PyCropper\""));
    assert!(rendered.contains("\"MUIVerb\"=\"Tolerance 150\""));

    assert_eq!(
        command_string(0, GCS_HELPTEXTA, 260),
        Some(CommandString::Ansi(
            b"Crop selected file with PyCropper\0".to_vec()
        ))
    );
}
