//! Menu model for the PyCropper flyout.
//!
//! Explorer asks for the title, tooltip, state and sub-commands of every entry; all of
//! those answers are pure functions of a [`CommandTag`] and the selection size, so they
//! live here instead of inside the COM objects.

use rust_i18n::t;
use std::sync::Arc;

/// Tolerance values offered in the flyout, in display order.
pub const TOLERANCES: [u32; 4] = [50, 100, 150, 200];

/// Tolerance used when the root entry itself is invoked.
pub const DEFAULT_TOLERANCE: u32 = 100;

/// CLSID of the extension, also reported as the root entry's canonical name.
pub const CLSID_PYCROPPER: u128 = 0x7f56439e_2130_4115_a27a_8d562049b848;

// Low 32 bits are replaced by the tolerance value
const TOLERANCE_CANONICAL_BASE: u128 = 0x5c1e0d2a_6b4f_4e7a_9d3c_1f0a00000000;

/// Identity of a menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandTag {
    Root,
    Tolerance(u32),
}

impl CommandTag {
    /// Tolerance forwarded to the cropper when this entry is invoked.
    pub fn tolerance(&self) -> u32 {
        match self {
            CommandTag::Root => DEFAULT_TOLERANCE,
            CommandTag::Tolerance(value) => *value,
        }
    }

    pub fn has_sub_commands(&self) -> bool {
        matches!(self, CommandTag::Root)
    }

    /// Stable GUID (as u128) Explorer uses to tell entries apart.
    pub fn canonical_name(&self) -> u128 {
        match self {
            CommandTag::Root => CLSID_PYCROPPER,
            CommandTag::Tolerance(value) => TOLERANCE_CANONICAL_BASE | u128::from(*value),
        }
    }
}

/// A display entry of the context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub tag: CommandTag,
    pub title: String,
    pub tooltip: String,
}

impl MenuEntry {
    pub fn new(tag: CommandTag) -> Self {
        let (title, tooltip) = match tag {
            CommandTag::Root => (t!("menuTitle"), t!("menuTooltip")),
            CommandTag::Tolerance(value) => (
                t!("toleranceTitle", value = value),
                t!("toleranceTooltip", value = value),
            ),
        };

        Self {
            tag,
            title: title.into_owned(),
            tooltip: tooltip.into_owned(),
        }
    }

    pub fn root() -> Self {
        Self::new(CommandTag::Root)
    }
}

/// Flyout entries under the root, one per tolerance, in [`TOLERANCES`] order.
pub fn sub_commands() -> Vec<MenuEntry> {
    TOLERANCES
        .iter()
        .map(|value| MenuEntry::new(CommandTag::Tolerance(*value)))
        .collect()
}

/// Read position over a shared entry list. Clones share the entries, not the position.
#[derive(Debug, Clone)]
pub struct EntryCursor {
    entries: Arc<Vec<MenuEntry>>,
    position: usize,
}

impl EntryCursor {
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        Self {
            entries: Arc::new(entries),
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Up to `count` entries from the current position; fewer at the end.
    pub fn take(&mut self, count: usize) -> Vec<MenuEntry> {
        let end = self.position.saturating_add(count).min(self.entries.len());
        let taken = self.entries[self.position..end].to_vec();
        self.position = end;
        taken
    }

    pub fn skip(&mut self, count: usize) {
        self.position = self.position.saturating_add(count).min(self.entries.len());
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }
}

/// Visibility of an entry for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Enabled,
    Hidden,
}

/// Every entry is enabled exactly when something is selected.
pub fn command_state(selection_count: usize) -> CommandState {
    if selection_count > 0 {
        CommandState::Enabled
    } else {
        CommandState::Hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_commands_order_and_count() {
        let entries = sub_commands();
        let tags: Vec<CommandTag> = entries.iter().map(|e| e.tag).collect();
        assert_eq!(
            tags,
            vec![
                CommandTag::Tolerance(50),
                CommandTag::Tolerance(100),
                CommandTag::Tolerance(150),
                CommandTag::Tolerance(200),
            ]
        );

        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Tolerance 50", "Tolerance 100", "Tolerance 150", "Tolerance 200"]
        );
    }

    #[test]
    fn test_cursor_takes_in_order_until_exhausted() {
        let mut cursor = EntryCursor::new(sub_commands());

        let first: Vec<CommandTag> = cursor.take(3).iter().map(|e| e.tag).collect();
        assert_eq!(
            first,
            vec![
                CommandTag::Tolerance(50),
                CommandTag::Tolerance(100),
                CommandTag::Tolerance(150),
            ]
        );

        let rest = cursor.take(3);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].tag, CommandTag::Tolerance(200));
        assert!(cursor.take(1).is_empty());
        assert_eq!(cursor.position(), TOLERANCES.len());
    }

    #[test]
    fn test_cursor_skip_and_reset() {
        let mut cursor = EntryCursor::new(sub_commands());
        cursor.skip(2);
        assert_eq!(cursor.take(1)[0].tag, CommandTag::Tolerance(150));

        cursor.skip(usize::MAX);
        assert_eq!(cursor.position(), TOLERANCES.len());
        assert!(cursor.take(4).is_empty());

        cursor.reset();
        assert_eq!(cursor.take(1)[0].tag, CommandTag::Tolerance(50));
    }

    #[test]
    fn test_cursor_clone_keeps_its_own_position() {
        let mut cursor = EntryCursor::new(sub_commands());
        cursor.skip(1);
        let mut copy = cursor.clone();

        assert_eq!(copy.take(1)[0].tag, CommandTag::Tolerance(100));
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.take(1)[0].tag, CommandTag::Tolerance(100));
    }

    #[test]
    fn test_sub_commands_are_deterministic() {
        assert_eq!(sub_commands(), sub_commands());
    }

    #[test]
    fn test_root_entry_text() {
        let root = MenuEntry::root();
        assert_eq!(root.title, "Crop with PyCropper");
        assert_eq!(root.tooltip, "Crop selected file with PyCropper");
        assert!(root.tag.has_sub_commands());
    }

    #[test]
    fn test_tolerance_values() {
        assert_eq!(CommandTag::Root.tolerance(), DEFAULT_TOLERANCE);
        assert_eq!(CommandTag::Root.tolerance(), 100);
        for value in TOLERANCES {
            assert_eq!(CommandTag::Tolerance(value).tolerance(), value);
            assert!(!CommandTag::Tolerance(value).has_sub_commands());
        }
    }

    #[test]
    fn test_command_state_depends_only_on_count() {
        assert_eq!(command_state(0), CommandState::Hidden);
        assert_eq!(command_state(1), CommandState::Enabled);
        assert_eq!(command_state(7), CommandState::Enabled);
    }

    #[test]
    fn test_canonical_names_are_distinct() {
        let mut names: Vec<u128> = TOLERANCES
            .iter()
            .map(|v| CommandTag::Tolerance(*v).canonical_name())
            .collect();
        names.push(CommandTag::Root.canonical_name());
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
        assert_eq!(CommandTag::Root.canonical_name(), CLSID_PYCROPPER);
    }
}
