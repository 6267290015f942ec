//! Decisions behind the classic `IContextMenu` item.
//!
//! The COM handler only copies pointers; which verb is ours, how many items to insert and
//! what text to hand back are decided here.

use crate::menu::MenuEntry;
use crate::registration::VERB;
use rust_i18n::t;
use widestring::{U16Str, U16String};

pub const CMF_DEFAULTONLY: u32 = 0x0000_0001;

pub const GCS_VERBA: u32 = 0x0000_0000;
pub const GCS_HELPTEXTA: u32 = 0x0000_0001;
pub const GCS_UNICODE: u32 = 0x0000_0004;
pub const GCS_VERBW: u32 = GCS_VERBA | GCS_UNICODE;
pub const GCS_HELPTEXTW: u32 = GCS_HELPTEXTA | GCS_UNICODE;

/// Verb passed to `InvokeCommand`, either a menu offset or a canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb<'a> {
    Offset(u16),
    Name(&'a str),
}

/// Offset 0 or `pycropper` in any case.
pub fn verb_matches(verb: Verb<'_>) -> bool {
    match verb {
        Verb::Offset(offset) => offset == 0,
        Verb::Name(name) => name.eq_ignore_ascii_case(VERB),
    }
}

/// Number of items `QueryContextMenu` inserts.
pub fn query_item_count(selection_empty: bool, flags: u32) -> u32 {
    if selection_empty || flags & CMF_DEFAULTONLY != 0 {
        0
    } else {
        1
    }
}

/// NUL-terminated text for `GetCommandString`, already cut to the caller's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandString {
    Ansi(Vec<u8>),
    Wide(Vec<u16>),
}

/// Text for `GetCommandString`; `None` means nothing is written.
pub fn command_string(offset: usize, utype: u32, cchmax: u32) -> Option<CommandString> {
    if offset != 0 || cchmax == 0 {
        return None;
    }

    let help = utype & !GCS_UNICODE == GCS_HELPTEXTA;
    let capacity = cchmax as usize - 1;

    if utype & GCS_UNICODE != 0 {
        let text = if help {
            MenuEntry::root().tooltip
        } else {
            VERB.to_string()
        };
        let mut units = U16String::from_str(&text).into_vec();
        units.truncate(capacity);
        units.push(0);
        Some(CommandString::Wide(units))
    } else {
        // ANSI callers always get English
        let text = if help {
            t!("menuTooltip", locale = "en").into_owned()
        } else {
            VERB.to_string()
        };
        let mut bytes: Vec<u8> = text.bytes().filter(u8::is_ascii).collect();
        bytes.truncate(capacity);
        bytes.push(0);
        Some(CommandString::Ansi(bytes))
    }
}

/// One file name from a `CF_HDROP` list; blank names are dropped.
pub fn dropped_path(units: &[u16]) -> Option<String> {
    let path = U16Str::from_slice(units).to_string_lossy();
    if path.trim().is_empty() {
        None
    } else {
        Some(path)
    }
}
