//! Serializable editor actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::edit::{ButtonSize, ButtonVariant, IconSize, ResizeHandle};
use crate::tree::{ElementId, ElementType, ItemLayout};

/// One editor action, as sent by the builder UI or stored in a script.
///
/// Serialized with an `action` tag and camelCase fields:
///
/// ```json
/// {"action": "setProperty", "id": "el-1", "path": "styles.color", "value": "red"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    /// Select an element, or clear the selection with `null`.
    Select {
        #[serde(default)]
        id: Option<ElementId>,
    },
    /// Insert a new element from the palette. Without a parent the new
    /// element goes into the selection (if composite) or the root.
    AddElement {
        #[serde(rename = "type")]
        element_type: ElementType,
        #[serde(default)]
        parent: Option<ElementId>,
        #[serde(default)]
        index: Option<usize>,
    },
    Delete {
        id: ElementId,
    },
    Duplicate {
        id: ElementId,
    },
    /// Copy an element's subtree to the clipboard.
    Copy {
        id: ElementId,
    },
    /// Insert a copy of the clipboard.
    Paste {
        #[serde(default)]
        parent: Option<ElementId>,
        #[serde(default)]
        index: Option<usize>,
    },
    MoveUp {
        id: ElementId,
    },
    MoveDown {
        id: ElementId,
    },
    /// Reparent by drop position.
    Move {
        id: ElementId,
        parent: ElementId,
        index: usize,
    },
    Reorder {
        id: ElementId,
        index: usize,
    },
    BringToFront {
        id: ElementId,
    },
    SendToBack {
        id: ElementId,
    },
    ToggleVisibility {
        id: ElementId,
    },
    ToggleLock {
        id: ElementId,
    },
    SetProperty {
        id: ElementId,
        path: String,
        value: Value,
    },
    Resize {
        id: ElementId,
        width: f64,
        height: f64,
        #[serde(default = "default_handle")]
        handle: ResizeHandle,
    },
    AddClass {
        id: ElementId,
        class: String,
    },
    RemoveClass {
        id: ElementId,
        class: String,
    },
    ToggleClass {
        id: ElementId,
        class: String,
    },
    SetClasses {
        id: ElementId,
        classes: String,
    },
    SetGridColumns {
        id: ElementId,
        columns: u32,
    },
    SetBackgroundImage {
        id: ElementId,
        url: String,
    },
    SetOverlay {
        id: ElementId,
        color: String,
        opacity: f64,
    },
    AddRepeaterItem {
        id: ElementId,
    },
    RemoveRepeaterItem {
        id: ElementId,
        index: usize,
    },
    SetRepeaterLayout {
        id: ElementId,
        layout: ItemLayout,
        #[serde(default = "default_items_per_row")]
        items_per_row: u32,
    },
    ButtonVariant {
        id: ElementId,
        variant: ButtonVariant,
    },
    ButtonSize {
        id: ElementId,
        size: ButtonSize,
    },
    IconSize {
        id: ElementId,
        size: IconSize,
    },
    Undo,
    Redo,
}

fn default_handle() -> ResizeHandle {
    ResizeHandle::Se
}

fn default_items_per_row() -> u32 {
    1
}

impl Command {
    /// The `action` tag of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Select { .. } => "select",
            Command::AddElement { .. } => "addElement",
            Command::Delete { .. } => "delete",
            Command::Duplicate { .. } => "duplicate",
            Command::Copy { .. } => "copy",
            Command::Paste { .. } => "paste",
            Command::MoveUp { .. } => "moveUp",
            Command::MoveDown { .. } => "moveDown",
            Command::Move { .. } => "move",
            Command::Reorder { .. } => "reorder",
            Command::BringToFront { .. } => "bringToFront",
            Command::SendToBack { .. } => "sendToBack",
            Command::ToggleVisibility { .. } => "toggleVisibility",
            Command::ToggleLock { .. } => "toggleLock",
            Command::SetProperty { .. } => "setProperty",
            Command::Resize { .. } => "resize",
            Command::AddClass { .. } => "addClass",
            Command::RemoveClass { .. } => "removeClass",
            Command::ToggleClass { .. } => "toggleClass",
            Command::SetClasses { .. } => "setClasses",
            Command::SetGridColumns { .. } => "setGridColumns",
            Command::SetBackgroundImage { .. } => "setBackgroundImage",
            Command::SetOverlay { .. } => "setOverlay",
            Command::AddRepeaterItem { .. } => "addRepeaterItem",
            Command::RemoveRepeaterItem { .. } => "removeRepeaterItem",
            Command::SetRepeaterLayout { .. } => "setRepeaterLayout",
            Command::ButtonVariant { .. } => "buttonVariant",
            Command::ButtonSize { .. } => "buttonSize",
            Command::IconSize { .. } => "iconSize",
            Command::Undo => "undo",
            Command::Redo => "redo",
        }
    }

    /// Whether the command can change the tree (and so records history).
    pub fn mutates_tree(&self) -> bool {
        !matches!(
            self,
            Command::Select { .. } | Command::Copy { .. } | Command::Undo | Command::Redo
        )
    }

    /// Parse a JSON array of commands.
    pub fn parse_script(json: &str) -> crate::Result<Vec<Command>> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_tagged_camel_case() {
        let cmd: Command = serde_json::from_value(json!({
            "action": "setProperty",
            "id": "el-1",
            "path": "styles.padding",
            "value": "10px 20px"
        }))
        .unwrap();
        assert_eq!(
            cmd,
            Command::SetProperty {
                id: "el-1".into(),
                path: "styles.padding".to_string(),
                value: json!("10px 20px"),
            }
        );
        assert_eq!(cmd.name(), "setProperty");
    }

    #[test]
    fn test_field_names_are_camel_case() {
        let cmd = Command::SetRepeaterLayout {
            id: "r".into(),
            layout: ItemLayout::Grid,
            items_per_row: 3,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["action"], "setRepeaterLayout");
        assert_eq!(json["itemsPerRow"], 3);
        assert_eq!(json["layout"], "grid");
    }

    #[test]
    fn test_defaults() {
        let cmd: Command = serde_json::from_str(
            r#"{"action": "resize", "id": "a", "width": 120, "height": 40}"#,
        )
        .unwrap();
        assert!(matches!(cmd, Command::Resize { handle: ResizeHandle::Se, .. }));

        let cmd: Command =
            serde_json::from_str(r#"{"action": "addElement", "type": "heading"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::AddElement {
                element_type: ElementType::Heading,
                parent: None,
                index: None,
            }
        );
    }

    #[test]
    fn test_unit_variants_and_script() {
        let script = Command::parse_script(
            r#"[{"action": "undo"}, {"action": "select", "id": null}, {"action": "redo"}]"#,
        )
        .unwrap();
        assert_eq!(
            script,
            vec![Command::Undo, Command::Select { id: None }, Command::Redo]
        );
        assert!(Command::parse_script(r#"[{"action": "explode"}]"#).is_err());
    }
}
