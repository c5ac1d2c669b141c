//! Command system for session actions.
//!
//! ## Learning: The Command Pattern
//!
//! Commands encapsulate actions as values:
//! - Actions become first-class values
//! - Can be stored, queued, logged
//! - One entry point ([`Editor::execute`](crate::Editor::execute)) for
//!   menus, shortcuts and scripted edits alike

use crate::block::{BlockId, BlockKind};
use crate::document::{InsertAt, MoveTarget};
use crate::field::{FieldPath, FieldValue};
use crate::keymap::Shortcut;
use crate::storage::TemplateId;

/// Every operation a session understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Block commands
    AddBlock { kind: BlockKind, at: InsertAt },
    DeleteBlock(BlockId),
    MoveBlock { id: BlockId, target: MoveTarget },
    UpdateField { id: BlockId, path: FieldPath, value: FieldValue },
    Select(Option<BlockId>),
    Clear,

    // Clipboard
    CopyBlock(BlockId),
    CopySelected,
    /// Paste after the given block, or at the end
    Paste { after: Option<BlockId> },

    // History
    Undo,
    Redo,

    // Templates
    SaveTemplate { name: String },
    LoadTemplate(TemplateId),
    RemoveTemplate(TemplateId),

    // Persistence
    Flush,
}

impl Command {
    /// Returns the command's display name.
    pub fn display_name(&self) -> &str {
        match self {
            Command::AddBlock { .. } => "Add Block",
            Command::DeleteBlock(_) => "Delete Block",
            Command::MoveBlock { .. } => "Move Block",
            Command::UpdateField { .. } => "Update Field",
            Command::Select(_) => "Select Block",
            Command::Clear => "Clear Document",
            Command::CopyBlock(_) => "Copy Block",
            Command::CopySelected => "Copy",
            Command::Paste { .. } => "Paste",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::SaveTemplate { .. } => "Save Template",
            Command::LoadTemplate(_) => "Load Template",
            Command::RemoveTemplate(_) => "Remove Template",
            Command::Flush => "Save",
        }
    }

    /// Command for a keyboard shortcut, given the current selection.
    ///
    /// `SaveTemplate` has no command form here: it needs a name, which
    /// only the front end can ask for.
    pub fn for_shortcut(shortcut: Shortcut, selected: Option<&BlockId>) -> Option<Self> {
        match shortcut {
            Shortcut::Undo => Some(Command::Undo),
            Shortcut::Redo => Some(Command::Redo),
            Shortcut::CopySelected => Some(Command::CopySelected),
            Shortcut::Paste => Some(Command::Paste {
                after: selected.cloned(),
            }),
            Shortcut::SaveTemplate => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display_name() {
        assert_eq!(Command::Undo.display_name(), "Undo");
        assert_eq!(
            Command::SaveTemplate {
                name: "Launch".to_string()
            }
            .display_name(),
            "Save Template"
        );
    }

    #[test]
    fn test_shortcut_commands() {
        let id = BlockId::from("b_1");
        assert_eq!(
            Command::for_shortcut(Shortcut::Paste, Some(&id)),
            Some(Command::Paste { after: Some(id) })
        );
        assert_eq!(Command::for_shortcut(Shortcut::SaveTemplate, None), None);
    }
}
