//! Editor controller.
//!
//! [`Editor`] owns a [`Document`] together with the session state the
//! builder UI needs around it: the selected element, the clipboard and the
//! undo history. All edits go through [`Editor::apply`], which snapshots
//! the tree before every change so it can be undone.
//!
//! # Example
//!
//! ```
//! use blockcanvas::{Command, Editor};
//! use blockcanvas::tree::ElementType;
//!
//! let mut editor = Editor::default();
//! editor
//!     .apply(Command::AddElement { element_type: ElementType::Heading, parent: None, index: None })
//!     .unwrap();
//! assert_eq!(editor.tree().len(), 2);
//!
//! editor.undo();
//! assert_eq!(editor.tree().len(), 1);
//! ```

mod command;
mod history;

pub use command::Command;
pub use history::{DEFAULT_HISTORY_LIMIT, History};

use crate::document::Document;
use crate::edit::ResizeHandle;
use crate::error::Result;
use crate::export::{ExportConfig, HtmlExporter};
use crate::layers::{LayerEntry, layer_list};
use crate::render::{CanvasOutput, CanvasRenderer};
use crate::tree::{ElementId, ElementTree, NodeKey};

/// A document open for editing.
#[derive(Debug, Clone)]
pub struct Editor {
    document: Document,
    selected: Option<ElementId>,
    clipboard: Option<ElementTree>,
    history: History,
    /// Tree as it was when the running gesture started.
    gesture: Option<ElementTree>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl Editor {
    pub fn new(document: Document) -> Self {
        Self::with_history(document, History::new())
    }

    pub fn with_history(document: Document, history: History) -> Self {
        Self {
            document,
            selected: None,
            clipboard: None,
            history,
            gesture: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tree(&self) -> &ElementTree {
        &self.document.tree
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_ref().map(ElementId::as_str)
    }

    /// Select an element, or clear the selection. Returns false (and keeps
    /// the current selection) if the id is unknown.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.selected = None;
                true
            }
            Some(id) if self.document.tree.contains(id) => {
                self.selected = Some(ElementId::from(id));
                true
            }
            Some(id) => {
                log::warn!("cannot select {id}: no such element");
                false
            }
        }
    }

    pub fn clipboard(&self) -> Option<&ElementTree> {
        self.clipboard.as_ref()
    }

    /// Apply one command.
    ///
    /// Returns `Ok(true)` when the tree changed and `Ok(false)` for no-ops,
    /// including commands addressed to elements that no longer exist.
    /// Rejected operations return the error and leave the tree unchanged.
    pub fn apply(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Undo => return Ok(self.undo()),
            Command::Redo => return Ok(self.redo()),
            Command::Select { id } => {
                self.select(id.as_ref().map(ElementId::as_str));
                return Ok(false);
            }
            Command::Copy { id } => {
                self.copy(id.as_str());
                return Ok(false);
            }
            _ => {}
        }

        let name = command.name();
        let before = self.document.tree.clone();
        match self.execute(command) {
            Ok(true) => {
                log::debug!("{name}: applied");
                self.history.record(before);
                Ok(true)
            }
            Ok(false) => {
                log::warn!("{name}: nothing to change");
                Ok(false)
            }
            Err(err) if err.is_not_found() => {
                log::warn!("{name}: {err}");
                self.document.tree = before;
                Ok(false)
            }
            Err(err) => {
                self.document.tree = before;
                Err(err)
            }
        }
    }

    /// Apply commands in order, stopping at the first error. Returns the
    /// number of commands that changed the tree.
    pub fn apply_all(&mut self, commands: impl IntoIterator<Item = Command>) -> Result<usize> {
        let mut changed = 0;
        for command in commands {
            if self.apply(command)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    fn execute(&mut self, command: Command) -> Result<bool> {
        let tree = &mut self.document.tree;
        match command {
            Command::AddElement {
                element_type,
                parent,
                index,
            } => {
                let parent = match parent {
                    Some(parent) => parent,
                    None => self.insertion_parent(),
                };
                let id = self
                    .document
                    .tree
                    .insert_new(&element_type, parent.as_str(), index)?;
                self.selected = Some(id);
                Ok(true)
            }
            Command::Delete { id } => {
                let removed = tree.delete(id.as_str())?;
                if self.selected.as_ref().is_some_and(|s| !tree.contains(s.as_str())) {
                    self.selected = None;
                }
                Ok(removed > 0)
            }
            Command::Duplicate { id } => {
                let copy = tree.duplicate(id.as_str())?;
                self.selected = Some(copy);
                Ok(true)
            }
            Command::Paste { parent, index } => self.paste(parent, index),
            Command::MoveUp { id } => tree.move_up(id.as_str()),
            Command::MoveDown { id } => tree.move_down(id.as_str()),
            Command::Move { id, parent, index } => {
                tree.reparent(id.as_str(), parent.as_str(), index)
            }
            Command::Reorder { id, index } => tree.reorder(id.as_str(), index),
            Command::BringToFront { id } => tree.bring_to_front(id.as_str()),
            Command::SendToBack { id } => tree.send_to_back(id.as_str()),
            Command::ToggleVisibility { id } => tree.toggle_visibility(id.as_str()).map(|_| true),
            Command::ToggleLock { id } => tree.toggle_lock(id.as_str()).map(|_| true),
            Command::SetProperty { id, path, value } => {
                tree.set_property(id.as_str(), &path, &value)
            }
            Command::Resize {
                id,
                width,
                height,
                handle,
            } => tree.resize(id.as_str(), width, height, handle),
            Command::AddClass { id, class } => tree.add_class(id.as_str(), &class),
            Command::RemoveClass { id, class } => tree.remove_class(id.as_str(), &class),
            Command::ToggleClass { id, class } => tree.toggle_class(id.as_str(), &class),
            Command::SetClasses { id, classes } => tree.set_classes(id.as_str(), &classes),
            Command::SetGridColumns { id, columns } => tree.set_grid_columns(id.as_str(), columns),
            Command::SetBackgroundImage { id, url } => {
                tree.set_background_image(id.as_str(), &url)
            }
            Command::SetOverlay { id, color, opacity } => {
                tree.set_overlay(id.as_str(), &color, opacity)
            }
            Command::AddRepeaterItem { id } => tree.add_repeater_item(id.as_str()).map(|_| true),
            Command::RemoveRepeaterItem { id, index } => {
                tree.remove_repeater_item(id.as_str(), index)
            }
            Command::SetRepeaterLayout {
                id,
                layout,
                items_per_row,
            } => tree.set_repeater_layout(id.as_str(), layout, items_per_row),
            Command::ButtonVariant { id, variant } => {
                tree.apply_button_variant(id.as_str(), variant)
            }
            Command::ButtonSize { id, size } => tree.apply_button_size(id.as_str(), size),
            Command::IconSize { id, size } => tree.apply_icon_size(id.as_str(), size),
            Command::Select { .. } | Command::Copy { .. } | Command::Undo | Command::Redo => {
                Ok(false)
            }
        }
    }

    /// Where a palette insert without an explicit parent lands: into the
    /// selection if it accepts children, otherwise into the root.
    fn insertion_parent(&self) -> ElementId {
        let tree = &self.document.tree;
        self.selected
            .as_ref()
            .filter(|id| tree.find(id.as_str()).is_some_and(|n| n.is_composite()))
            .cloned()
            .unwrap_or_else(|| tree.root_node().id.clone())
    }

    fn copy(&mut self, id: &str) {
        let tree = &self.document.tree;
        match tree.key_of(id).and_then(|key| tree.subtree(key)) {
            Some(fragment) => {
                log::debug!("copy: {} element(s) on the clipboard", fragment.len());
                self.clipboard = Some(fragment);
            }
            None => log::warn!("copy: element not found: {id}"),
        }
    }

    /// Paste target when none is given: into a composite selection, after
    /// any other selected element, or at the end of the root.
    fn paste(&mut self, parent: Option<ElementId>, index: Option<usize>) -> Result<bool> {
        let Some(fragment) = self.clipboard.as_ref() else {
            return Ok(false);
        };
        let tree = &mut self.document.tree;
        let (parent, index) = match parent {
            Some(parent) => (parent, index),
            None => {
                let selected = self.selected.as_ref().and_then(|id| tree.key_of(id.as_str()));
                match selected {
                    Some(key) if tree.get(key).is_some_and(|n| n.is_composite()) => {
                        (tree_id(tree, key), index)
                    }
                    Some(key) => match tree.position(key) {
                        Some((parent, pos)) => (tree_id(tree, parent), Some(pos + 1)),
                        None => (tree.root_node().id.clone(), index),
                    },
                    None => (tree.root_node().id.clone(), index),
                }
            }
        };
        let id = tree.paste(fragment, parent.as_str(), index)?;
        self.selected = Some(id);
        Ok(true)
    }

    /// Revert the last change. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let current = self.document.tree.clone();
        let serial = current.serial();
        let Some(mut previous) = self.history.undo(current) else {
            log::warn!("undo: nothing to undo");
            return false;
        };
        // Ids handed out since the snapshot must not be generated again.
        previous.bump_serial(serial);
        self.document.tree = previous;
        self.forget_missing_selection();
        log::debug!("undo: applied");
        true
    }

    /// Re-apply the last undone change.
    pub fn redo(&mut self) -> bool {
        let current = self.document.tree.clone();
        let serial = current.serial();
        let Some(mut next) = self.history.redo(current) else {
            log::warn!("redo: nothing to redo");
            return false;
        };
        next.bump_serial(serial);
        self.document.tree = next;
        self.forget_missing_selection();
        log::debug!("redo: applied");
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn forget_missing_selection(&mut self) {
        let tree = &self.document.tree;
        if self.selected.as_ref().is_some_and(|id| !tree.contains(id.as_str())) {
            self.selected = None;
        }
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Start a gesture whose intermediate updates bypass the history.
    pub fn begin_gesture(&mut self) {
        if self.gesture.is_none() {
            self.gesture = Some(self.document.tree.clone());
        }
    }

    /// Live resize update during a gesture; not recorded in the history.
    pub fn resize_live(
        &mut self,
        id: &str,
        width: f64,
        height: f64,
        handle: ResizeHandle,
    ) -> Result<bool> {
        self.document.tree.resize(id, width, height, handle)
    }

    /// Finish the running gesture, recording it as a single history entry
    /// if it changed the tree.
    pub fn end_gesture(&mut self) -> bool {
        let Some(before) = self.gesture.take() else {
            return false;
        };
        if before == self.document.tree {
            return false;
        }
        self.history.record(before);
        log::debug!("gesture: applied");
        true
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Render the canvas with the current selection.
    pub fn render(&self) -> CanvasOutput {
        CanvasRenderer::new().render(&self.document.tree, self.selected())
    }

    /// Layer panel entries with the current selection.
    pub fn layers(&self) -> Vec<LayerEntry> {
        layer_list(&self.document.tree, self.selected())
    }

    /// Export the document as publishable HTML.
    pub fn export_html(&self, config: ExportConfig) -> String {
        HtmlExporter::with_config(config).export(&self.document)
    }
}

fn tree_id(tree: &ElementTree, key: NodeKey) -> ElementId {
    tree.get(key)
        .map(|n| n.id.clone())
        .unwrap_or_else(|| tree.root_node().id.clone())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::tree::{ElementType, default_root};

    fn editor() -> Editor {
        let tree = ElementTree::new(default_root("root"));
        Editor::new(Document::with_tree(tree))
    }

    fn add(editor: &mut Editor, element_type: ElementType, parent: Option<&str>) -> String {
        editor
            .apply(Command::AddElement {
                element_type,
                parent: parent.map(ElementId::from),
                index: None,
            })
            .unwrap();
        editor.selected().unwrap().to_string()
    }

    #[test]
    fn test_add_selects_new_element() {
        let mut editor = editor();
        let row = add(&mut editor, ElementType::Row, None);
        // Selected composite becomes the default parent
        let heading = add(&mut editor, ElementType::Heading, None);
        let tree = editor.tree();
        let row_key = tree.key_of(&row).unwrap();
        assert_eq!(tree.children(row_key).len(), 1);
        assert_eq!(editor.selected(), Some(heading.as_str()));

        // A leaf selection falls back to the root
        add(&mut editor, ElementType::Text, None);
        assert_eq!(editor.tree().children(NodeKey::ROOT).len(), 2);
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut editor = editor();
        let row = add(&mut editor, ElementType::Row, None);
        let heading = add(&mut editor, ElementType::Heading, Some(&row));
        editor.select(Some(&heading));
        assert!(editor.apply(Command::Delete { id: row.as_str().into() }).unwrap());
        assert_eq!(editor.selected(), None);
        assert_eq!(editor.tree().len(), 1);
    }

    #[test]
    fn test_missing_target_is_a_noop() {
        let mut editor = editor();
        let before = editor.tree().clone();
        assert!(!editor.apply(Command::MoveUp { id: "ghost".into() }).unwrap());
        assert!(!editor.apply(Command::Delete { id: "ghost".into() }).unwrap());
        assert_eq!(editor.tree(), &before);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_rejections_are_errors() {
        let mut editor = editor();
        assert!(matches!(
            editor.apply(Command::Delete { id: "root".into() }),
            Err(Error::RootImmutable)
        ));
        let text = add(&mut editor, ElementType::Text, None);
        assert!(matches!(
            editor.apply(Command::SetProperty {
                id: text.as_str().into(),
                path: "src".to_string(),
                value: json!("x.png"),
            }),
            Err(Error::InvalidProperty { .. })
        ));
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut editor = editor();
        let empty = editor.tree().clone();
        let text = add(&mut editor, ElementType::Text, None);
        let added = editor.tree().clone();
        editor
            .apply(Command::SetProperty {
                id: text.as_str().into(),
                path: "content".to_string(),
                value: json!("Changed"),
            })
            .unwrap();

        assert!(editor.undo());
        assert_eq!(editor.tree(), &added);
        assert!(editor.undo());
        assert_eq!(editor.tree(), &empty);
        assert_eq!(editor.selected(), None);
        assert!(!editor.undo());

        assert!(editor.apply(Command::Redo).unwrap());
        assert_eq!(editor.tree(), &added);
    }

    #[test]
    fn test_undo_never_reuses_ids() {
        let mut editor = editor();
        let first = add(&mut editor, ElementType::Text, None);
        editor.undo();
        let second = add(&mut editor, ElementType::Text, None);
        assert_ne!(first, second);
    }

    #[test]
    fn test_copy_paste_after_selection() {
        let mut editor = editor();
        let a = add(&mut editor, ElementType::Text, None);
        let b = add(&mut editor, ElementType::Text, None);
        assert!(!editor.apply(Command::Paste { parent: None, index: None }).unwrap());

        editor.apply(Command::Copy { id: a.as_str().into() }).unwrap();
        editor.select(Some(&a));
        assert!(editor.apply(Command::Paste { parent: None, index: None }).unwrap());

        let tree = editor.tree();
        let ids: Vec<_> = tree
            .child_nodes(NodeKey::ROOT)
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], a);
        assert!(ids[1].starts_with(&format!("{a}-copy-")));
        assert_eq!(ids[2], b);
        assert_eq!(editor.selected(), Some(ids[1].as_str()));
    }

    #[test]
    fn test_gesture_records_one_entry() {
        let mut editor = editor();
        let image = add(&mut editor, ElementType::Image, None);
        let after_add = editor.tree().clone();

        editor.begin_gesture();
        for width in [120.0, 160.0, 240.0] {
            editor
                .resize_live(&image, width, 100.0, ResizeHandle::E)
                .unwrap();
        }
        assert!(editor.end_gesture());
        assert_eq!(
            editor.tree().find(&image).unwrap().styles.get("width"),
            Some("240px")
        );

        editor.undo();
        assert_eq!(editor.tree(), &after_add);
    }
}
