//! Tree mutations.
//!
//! Every operation addresses its target by element id, validates before
//! touching the tree, and leaves the tree unchanged when it fails:
//! - `Err(Error::NotFound)` when an id is unknown
//! - `Err(Error::RootImmutable)` for structural edits of the root
//! - `Ok(false)` for accepted operations that change nothing (a move at a
//!   sequence boundary, adding a class that is already present)

pub mod interaction;
mod presets;
mod property;

pub use presets::{ButtonSize, ButtonVariant, IconSize};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tree::{ClassList, ElementId, ElementTree, ElementType, IdPolicy, NodeKey};

/// Minimum width a resize may produce, in pixels.
pub const MIN_WIDTH: f64 = 50.0;
/// Minimum height a resize may produce, in pixels.
pub const MIN_HEIGHT: f64 = 30.0;

/// Resize handle being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    /// Right edge: width only.
    E,
    /// Bottom edge: height only.
    S,
    /// Bottom-right corner: both.
    Se,
}

impl ResizeHandle {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "e" => Some(Self::E),
            "s" => Some(Self::S),
            "se" => Some(Self::Se),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::E => "e",
            Self::S => "s",
            Self::Se => "se",
        }
    }

    pub fn affects_width(self) -> bool {
        matches!(self, Self::E | Self::Se)
    }

    pub fn affects_height(self) -> bool {
        matches!(self, Self::S | Self::Se)
    }
}

impl ElementTree {
    /// Key of a non-root element.
    fn require_movable(&self, id: &str) -> Result<NodeKey> {
        let key = self.require(id)?;
        if key == NodeKey::ROOT {
            return Err(Error::RootImmutable);
        }
        Ok(key)
    }

    /// Key of an element that accepts children.
    fn require_container(&self, id: &str) -> Result<NodeKey> {
        let key = self.require(id)?;
        match self.get(key) {
            Some(node) if node.is_composite() => Ok(key),
            _ => Err(Error::NotAContainer(id.to_string())),
        }
    }

    /// Swap an element with its previous sibling.
    pub fn move_up(&mut self, id: &str) -> Result<bool> {
        let key = self.require_movable(id)?;
        let Some((parent, index)) = self.position(key) else {
            return Ok(false);
        };
        if index == 0 {
            return Ok(false);
        }
        self.swap_children(parent, index, index - 1);
        Ok(true)
    }

    /// Swap an element with its next sibling.
    pub fn move_down(&mut self, id: &str) -> Result<bool> {
        let key = self.require_movable(id)?;
        let Some((parent, index)) = self.position(key) else {
            return Ok(false);
        };
        if index + 1 >= self.children(parent).len() {
            return Ok(false);
        }
        self.swap_children(parent, index, index + 1);
        Ok(true)
    }

    /// Deep-copy an element next to the original. Returns the copy's id.
    ///
    /// Every copied node gets a fresh `-copy-` id.
    pub fn duplicate(&mut self, id: &str) -> Result<ElementId> {
        let key = self.require_movable(id)?;
        let (parent, index) = self
            .position(key)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let fragment = self
            .subtree(key)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let copy = self.insert_fragment(parent, index + 1, &fragment, IdPolicy::Copy)?;
        self.id_of(copy)
    }

    /// Remove an element and its subtree. Returns the number of removed
    /// elements.
    pub fn delete(&mut self, id: &str) -> Result<usize> {
        let key = self.require_movable(id)?;
        Ok(self.remove_subtree(key))
    }

    /// Flip `visible`; returns the new value.
    pub fn toggle_visibility(&mut self, id: &str) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        node.visible = !node.visible;
        Ok(node.visible)
    }

    /// Flip `locked`; returns the new value.
    pub fn toggle_lock(&mut self, id: &str) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        node.locked = !node.locked;
        Ok(node.locked)
    }

    /// Move an element into `new_parent` at drop position `index`.
    ///
    /// `index` counts positions in the target sequence as drawn, with the
    /// moved element still in place; an index past the end appends.
    /// Moving into the element itself or one of its descendants fails with
    /// [`Error::WouldCreateCycle`].
    pub fn reparent(&mut self, id: &str, new_parent: &str, index: usize) -> Result<bool> {
        let key = self.require_movable(id)?;
        let target = self.require_container(new_parent)?;
        if self.is_self_or_ancestor(key, target) {
            return Err(Error::WouldCreateCycle {
                id: id.to_string(),
                target: new_parent.to_string(),
            });
        }
        let (old_parent, old_index) = self
            .position(key)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut index = index.min(self.children(target).len());
        if old_parent == target {
            if old_index < index {
                index -= 1;
            }
            if index == old_index {
                return Ok(false);
            }
        }

        self.detach(key);
        self.attach(target, index, key);
        Ok(true)
    }

    /// Move an element to `index` within its own parent.
    ///
    /// The index refers to the sequence with the element removed, clamped
    /// to its end.
    pub fn reorder(&mut self, id: &str, index: usize) -> Result<bool> {
        let key = self.require_movable(id)?;
        let Some((parent, old_index)) = self.position(key) else {
            return Ok(false);
        };
        let index = index.min(self.children(parent).len() - 1);
        if index == old_index {
            return Ok(false);
        }
        self.detach(key);
        self.attach(parent, index, key);
        Ok(true)
    }

    /// Move an element to the end of its parent (drawn on top).
    pub fn bring_to_front(&mut self, id: &str) -> Result<bool> {
        self.reorder(id, usize::MAX)
    }

    /// Move an element to the start of its parent (drawn behind).
    pub fn send_to_back(&mut self, id: &str) -> Result<bool> {
        self.reorder(id, 0)
    }

    /// Insert a new element with the builder's defaults.
    ///
    /// `index` of `None` appends. Returns the new element's id.
    pub fn insert_new(
        &mut self,
        element_type: &ElementType,
        parent: &str,
        index: Option<usize>,
    ) -> Result<ElementId> {
        let parent = self.require_container(parent)?;
        let fragment = self.build_element(element_type);
        self.bump_serial(fragment.serial());
        let key = self.insert_fragment(
            parent,
            index.unwrap_or(usize::MAX),
            &fragment,
            IdPolicy::Keep,
        )?;
        self.id_of(key)
    }

    /// Insert a copy of a clipboard fragment, giving every node a
    /// `-copy-` id. Returns the new top element's id.
    pub fn paste(
        &mut self,
        fragment: &ElementTree,
        parent: &str,
        index: Option<usize>,
    ) -> Result<ElementId> {
        let parent = self.require_container(parent)?;
        let key = self.insert_fragment(
            parent,
            index.unwrap_or(usize::MAX),
            fragment,
            IdPolicy::Copy,
        )?;
        self.id_of(key)
    }

    /// Set `styles.width`/`styles.height` from a resize gesture.
    ///
    /// Only the axes `handle` controls are written; values are clamped to
    /// [`MIN_WIDTH`]/[`MIN_HEIGHT`] and stored as whole pixels.
    pub fn resize(
        &mut self,
        id: &str,
        width: f64,
        height: f64,
        handle: ResizeHandle,
    ) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let mut changed = false;
        if handle.affects_width() {
            let value = pixels(width.max(MIN_WIDTH));
            changed |= node.styles.get("width") != Some(value.as_str());
            node.styles.set("width", value);
        }
        if handle.affects_height() {
            let value = pixels(height.max(MIN_HEIGHT));
            changed |= node.styles.get("height") != Some(value.as_str());
            node.styles.set("height", value);
        }
        Ok(changed)
    }

    pub fn add_class(&mut self, id: &str, class: &str) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(node.classes.add(class))
    }

    pub fn remove_class(&mut self, id: &str, class: &str) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(node.classes.remove(class.trim()))
    }

    /// Toggle a class; always changes the element unless `class` is blank.
    pub fn toggle_class(&mut self, id: &str, class: &str) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        if class.trim().is_empty() {
            return Ok(false);
        }
        node.classes.toggle(class);
        Ok(true)
    }

    /// Replace all classes with a whitespace-separated list.
    pub fn set_classes(&mut self, id: &str, classes: &str) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let classes = ClassList::parse(classes);
        if node.classes == classes {
            return Ok(false);
        }
        node.classes = classes;
        Ok(true)
    }

    fn id_of(&self, key: NodeKey) -> Result<ElementId> {
        self.get(key)
            .map(|n| n.id.clone())
            .ok_or_else(|| Error::NotFound(format!("node #{}", key.0)))
    }
}

/// Whole-pixel CSS length (`"120px"`).
fn pixels(value: f64) -> String {
    format!("{}px", value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ElementKind, ElementNode};

    fn text(id: &str, content: &str) -> ElementNode {
        ElementNode::new(
            id,
            ElementKind::Text {
                content: content.to_string(),
            },
        )
    }

    fn sample() -> ElementTree {
        let mut tree = ElementTree::new(ElementNode::new("root", ElementKind::Container));
        let row = tree
            .append_child(NodeKey::ROOT, ElementNode::new("row", ElementKind::Row))
            .unwrap();
        tree.append_child(row, text("a", "A")).unwrap();
        tree.append_child(row, text("b", "B")).unwrap();
        tree.append_child(NodeKey::ROOT, text("c", "C")).unwrap();
        tree
    }

    fn child_ids(tree: &ElementTree, id: &str) -> Vec<String> {
        let key = tree.key_of(id).unwrap();
        tree.child_nodes(key).map(|n| n.id.to_string()).collect()
    }

    #[test]
    fn test_move_up_and_down() {
        let mut tree = sample();
        assert!(tree.move_down("a").unwrap());
        assert_eq!(child_ids(&tree, "row"), vec!["b", "a"]);
        assert!(!tree.move_down("a").unwrap());
        assert!(tree.move_up("a").unwrap());
        assert_eq!(child_ids(&tree, "row"), vec!["a", "b"]);
        assert!(!tree.move_up("a").unwrap());
    }

    #[test]
    fn test_root_is_protected() {
        let mut tree = sample();
        assert!(matches!(tree.delete("root"), Err(Error::RootImmutable)));
        assert!(matches!(tree.move_up("root"), Err(Error::RootImmutable)));
        assert!(matches!(tree.duplicate("root"), Err(Error::RootImmutable)));
        assert!(matches!(
            tree.reparent("root", "row", 0),
            Err(Error::RootImmutable)
        ));
        assert_eq!(tree, sample());
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let mut tree = sample();
        assert!(tree.move_up("missing").unwrap_err().is_not_found());
        assert!(tree.toggle_lock("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicate_inserts_after_original() {
        let mut tree = sample();
        let copy = tree.duplicate("row").unwrap();
        assert_eq!(copy.as_str(), format!("row-copy-{}", tree.serial() - 2));
        assert_eq!(child_ids(&tree, "root")[1], copy.as_str());
        assert_eq!(tree.len(), 8);
        assert_eq!(child_ids(&tree, copy.as_str()).len(), 2);
    }

    #[test]
    fn test_delete_subtree() {
        let mut tree = sample();
        assert_eq!(tree.delete("row").unwrap(), 3);
        assert_eq!(child_ids(&tree, "root"), vec!["c"]);
    }

    #[test]
    fn test_reparent_positions_as_drawn() {
        let mut tree = sample();
        // Drop between "a" and "b" of the row
        assert!(tree.reparent("c", "row", 1).unwrap());
        assert_eq!(child_ids(&tree, "row"), vec!["a", "c", "b"]);

        // Within the same parent, position 3 is after "b"
        assert!(tree.reparent("a", "row", 3).unwrap());
        assert_eq!(child_ids(&tree, "row"), vec!["c", "b", "a"]);

        // Dropping next to itself changes nothing
        assert!(!tree.reparent("b", "row", 1).unwrap());
        assert!(!tree.reparent("b", "row", 2).unwrap());
    }

    #[test]
    fn test_reparent_rejects_cycles_and_leaves() {
        let mut tree = sample();
        assert!(matches!(
            tree.reparent("row", "row", 0),
            Err(Error::WouldCreateCycle { .. })
        ));
        let inner = tree
            .insert_new(&ElementType::Container, "row", None)
            .unwrap();
        let before = tree.clone();
        assert!(matches!(
            tree.reparent("row", inner.as_str(), 0),
            Err(Error::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            tree.reparent("c", "a", 0),
            Err(Error::NotAContainer(_))
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_reorder_and_stacking() {
        let mut tree = sample();
        tree.insert_new(&ElementType::Separator, "row", None).unwrap();
        assert!(tree.bring_to_front("a").unwrap());
        assert_eq!(child_ids(&tree, "row")[2], "a");
        assert!(tree.send_to_back("a").unwrap());
        assert_eq!(child_ids(&tree, "row")[0], "a");
        assert!(tree.reorder("a", 1).unwrap());
        assert_eq!(child_ids(&tree, "row")[1], "a");
        assert!(!tree.reorder("a", 1).unwrap());
    }

    #[test]
    fn test_insert_new_into_leaf_fails() {
        let mut tree = sample();
        assert!(matches!(
            tree.insert_new(&ElementType::Heading, "a", None),
            Err(Error::NotAContainer(_))
        ));
    }

    #[test]
    fn test_resize_axes_and_clamp() {
        let mut tree = sample();
        tree.resize("a", 200.0, 100.0, ResizeHandle::E).unwrap();
        let styles = &tree.find("a").unwrap().styles;
        assert_eq!(styles.get("width"), Some("200px"));
        assert_eq!(styles.get("height"), None);

        tree.resize("a", 10.0, 5.0, ResizeHandle::Se).unwrap();
        let styles = &tree.find("a").unwrap().styles;
        assert_eq!(styles.get("width"), Some("50px"));
        assert_eq!(styles.get("height"), Some("30px"));

        tree.resize("a", 999.0, 80.4, ResizeHandle::S).unwrap();
        let styles = &tree.find("a").unwrap().styles;
        assert_eq!(styles.get("width"), Some("50px"));
        assert_eq!(styles.get("height"), Some("80px"));
    }

    #[test]
    fn test_class_operations() {
        let mut tree = sample();
        assert!(tree.add_class("a", "lead").unwrap());
        assert!(!tree.add_class("a", "lead").unwrap());
        assert!(tree.toggle_class("a", "muted").unwrap());
        assert_eq!(tree.find("a").unwrap().classes.to_attr(), "lead muted");
        assert!(tree.remove_class("a", "lead").unwrap());
        assert!(tree.set_classes("a", "x  y x").unwrap());
        assert_eq!(tree.find("a").unwrap().classes.to_attr(), "x y");
    }
}
