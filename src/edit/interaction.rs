//! Pointer gestures: drag-and-drop and resize sessions.
//!
//! Sessions hold only gesture state and validate against the tree they are
//! given; every change goes through the [`Editor`] so it lands in the undo
//! history.

use crate::editor::{Command, Editor};
use crate::error::Result;
use crate::tree::{ElementId, ElementTree, ElementType};

use super::{MIN_HEIGHT, MIN_WIDTH, ResizeHandle};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// A new element from the palette.
    Palette(ElementType),
    /// An element already on the canvas.
    Element(ElementId),
}

/// Where a drag would drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub container: ElementId,
    /// Drop position in the container's sequence as drawn.
    pub index: usize,
}

/// A drag in progress.
#[derive(Debug, Clone)]
pub struct DragSession {
    source: DragSource,
    target: Option<DropTarget>,
}

impl DragSession {
    pub fn from_palette(element_type: ElementType) -> Self {
        Self {
            source: DragSource::Palette(element_type),
            target: None,
        }
    }

    pub fn from_element(id: impl Into<ElementId>) -> Self {
        Self {
            source: DragSource::Element(id.into()),
            target: None,
        }
    }

    pub fn source(&self) -> &DragSource {
        &self.source
    }

    pub fn target(&self) -> Option<&DropTarget> {
        self.target.as_ref()
    }

    /// Hover over a drop zone. Returns whether the zone accepts the drop.
    ///
    /// A zone is accepted only in a composite element, and never in the
    /// dragged element itself or one of its descendants. A rejected zone
    /// clears the current target.
    pub fn hover(&mut self, tree: &ElementTree, container: &str, index: usize) -> bool {
        let accepted = Self::accepts(&self.source, tree, container);
        self.target = accepted.then(|| DropTarget {
            container: ElementId::from(container),
            index,
        });
        accepted
    }

    fn accepts(source: &DragSource, tree: &ElementTree, container: &str) -> bool {
        let Some(target) = tree.key_of(container) else {
            return false;
        };
        if !tree.get(target).is_some_and(|n| n.is_composite()) {
            return false;
        }
        match source {
            DragSource::Palette(_) => true,
            DragSource::Element(id) => match tree.key_of(id.as_str()) {
                Some(dragged) => !tree.is_self_or_ancestor(dragged, target),
                None => false,
            },
        }
    }

    /// The pointer left every drop zone.
    pub fn leave(&mut self) {
        self.target = None;
    }

    /// Commit the drop through the editor. Returns whether the tree changed;
    /// a drop without an accepted target does nothing.
    pub fn drop_into(self, editor: &mut Editor) -> Result<bool> {
        let Some(target) = self.target else {
            log::debug!("drop outside any drop zone");
            return Ok(false);
        };
        let command = match self.source {
            DragSource::Palette(element_type) => Command::AddElement {
                element_type,
                parent: Some(target.container),
                index: Some(target.index),
            },
            DragSource::Element(id) => Command::Move {
                id,
                parent: target.container,
                index: target.index,
            },
        };
        editor.apply(command)
    }
}

/// Vertical extent of a drawn child: `(top, height)`.
pub type Extent = (f64, f64);

/// Insertion index for a pointer at `pointer_y` over children with the
/// given extents, in drawn order.
///
/// The pointer drops before the first child whose midpoint lies below it;
/// below every midpoint it drops at the end.
pub fn drop_index(extents: &[Extent], pointer_y: f64) -> usize {
    extents
        .iter()
        .position(|&(top, height)| pointer_y < top + height / 2.0)
        .unwrap_or(extents.len())
}

/// A resize drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    id: ElementId,
    handle: ResizeHandle,
    start_pointer: (f64, f64),
    start_size: (f64, f64),
}

impl ResizeSession {
    /// Start resizing `id` from its drawn size.
    pub fn begin(
        editor: &mut Editor,
        id: impl Into<ElementId>,
        handle: ResizeHandle,
        pointer: (f64, f64),
        size: (f64, f64),
    ) -> Self {
        editor.begin_gesture();
        Self {
            id: id.into(),
            handle,
            start_pointer: pointer,
            start_size: size,
        }
    }

    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }

    /// Size for the pointer at `pointer`, clamped to the minimums. Axes the
    /// handle does not control keep their starting size.
    pub fn size_at(&self, pointer: (f64, f64)) -> (f64, f64) {
        let (start_w, start_h) = self.start_size;
        let width = if self.handle.affects_width() {
            (start_w + pointer.0 - self.start_pointer.0).max(MIN_WIDTH)
        } else {
            start_w
        };
        let height = if self.handle.affects_height() {
            (start_h + pointer.1 - self.start_pointer.1).max(MIN_HEIGHT)
        } else {
            start_h
        };
        (width, height)
    }

    /// Apply the size for `pointer` live, outside the history.
    pub fn update(&self, editor: &mut Editor, pointer: (f64, f64)) -> Result<bool> {
        let (width, height) = self.size_at(pointer);
        editor.resize_live(self.id.as_str(), width, height, self.handle)
    }

    /// End the gesture at `pointer`, recording one history entry.
    pub fn finish(self, editor: &mut Editor, pointer: (f64, f64)) -> Result<bool> {
        let applied = self.update(editor, pointer);
        let recorded = editor.end_gesture();
        applied.map(|_| recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use crate::tree::{ElementKind, ElementNode, NodeKey};

    fn editor() -> Editor {
        let mut tree = ElementTree::new(ElementNode::new("root", ElementKind::Container));
        let row = tree
            .append_child(NodeKey::ROOT, ElementNode::new("row", ElementKind::Row))
            .unwrap();
        tree.append_child(row, ElementNode::new("inner", ElementKind::Column))
            .unwrap();
        tree.append_child(
            NodeKey::ROOT,
            ElementNode::new(
                "t",
                ElementKind::Text {
                    content: "T".to_string(),
                },
            ),
        )
        .unwrap();
        Editor::new(Document::with_tree(tree))
    }

    #[test]
    fn test_drop_index_from_midpoints() {
        let extents = [(0.0, 20.0), (20.0, 40.0), (60.0, 10.0)];
        assert_eq!(drop_index(&extents, -5.0), 0);
        assert_eq!(drop_index(&extents, 9.0), 0);
        assert_eq!(drop_index(&extents, 11.0), 1);
        assert_eq!(drop_index(&extents, 45.0), 2);
        assert_eq!(drop_index(&extents, 66.0), 3);
        assert_eq!(drop_index(&[], 10.0), 0);
    }

    #[test]
    fn test_hover_rejects_leaves_and_descendants() {
        let editor = editor();
        let tree = editor.tree();
        let mut drag = DragSession::from_element("row");
        assert!(!drag.hover(tree, "t", 0));
        assert!(!drag.hover(tree, "row", 0));
        assert!(!drag.hover(tree, "inner", 0));
        assert!(drag.target().is_none());
        assert!(drag.hover(tree, "root", 2));

        let mut palette = DragSession::from_palette(ElementType::Heading);
        assert!(palette.hover(tree, "inner", 0));
        palette.leave();
        assert!(palette.target().is_none());
    }

    #[test]
    fn test_drop_moves_and_inserts() {
        let mut editor = editor();

        let mut drag = DragSession::from_element("t");
        drag.hover(editor.tree(), "inner", 0);
        assert!(drag.drop_into(&mut editor).unwrap());
        let inner = editor.tree().key_of("inner").unwrap();
        assert_eq!(editor.tree().children(inner).len(), 1);

        let mut palette = DragSession::from_palette(ElementType::Button);
        palette.hover(editor.tree(), "root", 0);
        assert!(palette.drop_into(&mut editor).unwrap());
        let first = editor.tree().child_nodes(NodeKey::ROOT).next().unwrap();
        assert_eq!(first.element_type(), ElementType::Button);
        assert_eq!(editor.selected(), Some(first.id.as_str()));

        // No target: nothing happens
        let drag = DragSession::from_element("row");
        assert!(!drag.drop_into(&mut editor).unwrap());
    }

    #[test]
    fn test_resize_session_axes() {
        let mut editor = editor();
        let session = ResizeSession::begin(
            &mut editor,
            "t",
            ResizeHandle::E,
            (100.0, 100.0),
            (200.0, 80.0),
        );
        assert_eq!(session.size_at((150.0, 300.0)), (250.0, 80.0));
        assert_eq!(session.size_at((-500.0, 0.0)), (MIN_WIDTH, 80.0));

        let se = ResizeSession {
            handle: ResizeHandle::Se,
            ..session.clone()
        };
        assert_eq!(se.size_at((100.0, 0.0)), (200.0, MIN_HEIGHT));
    }

    #[test]
    fn test_resize_session_records_once() {
        let mut editor = editor();
        let before = editor.tree().clone();
        let session = ResizeSession::begin(
            &mut editor,
            "t",
            ResizeHandle::Se,
            (0.0, 0.0),
            (100.0, 50.0),
        );
        session.update(&mut editor, (10.0, 10.0)).unwrap();
        session.update(&mut editor, (20.0, 20.0)).unwrap();
        assert!(session.finish(&mut editor, (30.0, 30.0)).unwrap());

        let styles = &editor.tree().find("t").unwrap().styles;
        assert_eq!(styles.get("width"), Some("130px"));
        assert_eq!(styles.get("height"), Some("80px"));

        assert!(editor.undo());
        assert_eq!(editor.tree(), &before);
        assert!(!editor.can_undo());
    }
}
