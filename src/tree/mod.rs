//! Element tree: the content model edited by the visual builder.
//!
//! The tree is an arena of nodes addressed by [`NodeKey`], with an index from
//! [`ElementId`] to key and parent links on every node:
//! - lookups by id are O(1)
//! - sibling moves, deletes and reparenting touch only the affected
//!   parent's child list
//! - cycle checks walk parent links instead of searching the tree
//!
//! # Example
//!
//! ```
//! use blockcanvas::tree::{ElementKind, ElementNode, ElementTree, ElementType};
//!
//! let mut tree = ElementTree::new(ElementNode::new("root", ElementKind::Container));
//! let text = ElementNode::new("a", ElementKind::Text { content: "Hello".into() });
//! tree.append_child(tree.root(), text).unwrap();
//!
//! assert_eq!(tree.len(), 2);
//! assert_eq!(tree.find("a").unwrap().element_type(), ElementType::Text);
//! ```

mod classes;
mod factory;
mod node;
mod styles;

pub use classes::ClassList;
pub use factory::{default_root, new_document_root};
pub use node::{
    Backdrop, DEFAULT_GRID_COLUMNS, ElementId, ElementKind, ElementNode, ElementType, ImageAttrs,
    ItemLayout, MAX_GRID_COLUMNS, NodeKey, SourceAttrs, heading_level,
};
pub use styles::{StyleMap, css_property_name};
pub(crate) use styles::scalar_to_string;

use std::collections::HashMap;

use crate::error::{Error, Result};

/// An arena slot: the node plus its structural links.
#[derive(Debug, Clone)]
struct Slot {
    node: ElementNode,
    parent: Option<NodeKey>,
    /// Child sequence; for a repeater these are its items.
    children: Vec<NodeKey>,
}

/// A rooted tree of [`ElementNode`]s.
#[derive(Debug, Clone)]
pub struct ElementTree {
    /// Arena slots; `None` marks a freed slot. Slot 0 is always the root.
    slots: Vec<Option<Slot>>,
    /// Freed slots available for reuse.
    free: Vec<NodeKey>,
    /// Element id to slot.
    index: HashMap<ElementId, NodeKey>,
    /// Monotonic counter behind generated ids.
    serial: u64,
}

impl ElementTree {
    /// Create a tree containing only `root`.
    pub fn new(root: ElementNode) -> Self {
        let mut index = HashMap::new();
        index.insert(root.id.clone(), NodeKey::ROOT);
        Self {
            slots: vec![Some(Slot {
                node: root,
                parent: None,
                children: Vec::new(),
            })],
            free: Vec::new(),
            index,
            serial: 0,
        }
    }

    /// Get the root node key.
    pub fn root(&self) -> NodeKey {
        NodeKey::ROOT
    }

    pub fn root_node(&self) -> &ElementNode {
        // The root slot is never freed.
        match self.slots.first() {
            Some(Some(slot)) => &slot.node,
            _ => unreachable!("element tree without a root slot"),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// A tree always holds at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    fn slot(&self, key: NodeKey) -> Option<&Slot> {
        self.slots.get(key.index()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, key: NodeKey) -> Option<&mut Slot> {
        self.slots.get_mut(key.index()).and_then(Option::as_mut)
    }

    /// Get a node by key.
    pub fn get(&self, key: NodeKey) -> Option<&ElementNode> {
        self.slot(key).map(|s| &s.node)
    }

    /// Get a mutable node by key.
    ///
    /// The node's `id` must not be changed through this reference; the
    /// index would go stale.
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut ElementNode> {
        self.slot_mut(key).map(|s| &mut s.node)
    }

    /// Look up the key of an element id.
    pub fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    /// Look up the key of an element id, failing with [`Error::NotFound`].
    pub fn require(&self, id: &str) -> Result<NodeKey> {
        self.key_of(id).ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn find(&self, id: &str) -> Option<&ElementNode> {
        self.key_of(id).and_then(|k| self.get(k))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ElementNode> {
        let key = self.key_of(id)?;
        self.get_mut(key)
    }

    /// Child sequence of a node (items, for a repeater).
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.slot(key).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// Iterate over the child nodes of a node.
    pub fn child_nodes(&self, key: NodeKey) -> impl Iterator<Item = &ElementNode> {
        self.children(key).iter().filter_map(|&k| self.get(k))
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.slot(key).and_then(|s| s.parent)
    }

    /// Parent key and index within the parent's sequence.
    pub fn position(&self, key: NodeKey) -> Option<(NodeKey, usize)> {
        let parent = self.parent(key)?;
        let index = self.children(parent).iter().position(|&k| k == key)?;
        Some((parent, index))
    }

    /// Depth of a node (root = 0).
    pub fn depth(&self, key: NodeKey) -> usize {
        let mut depth = 0;
        let mut current = key;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Whether `ancestor` is `key` itself or one of its ancestors.
    pub fn is_self_or_ancestor(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.parent(k);
        }
        false
    }

    /// Iterate over all nodes in pre-order with their depth.
    ///
    /// Unlike the renderer this visits every node, hidden subtrees and the
    /// children of leaf types included.
    pub fn iter_dfs(&self) -> DfsIter<'_> {
        DfsIter {
            tree: self,
            stack: vec![(NodeKey::ROOT, 0)],
        }
    }

    /// Iterate over the element ids of a subtree in pre-order.
    pub fn subtree_ids(&self, key: NodeKey) -> Vec<ElementId> {
        let mut ids = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(slot) = self.slot(k) {
                ids.push(slot.node.id.clone());
                stack.extend(slot.children.iter().rev());
            }
        }
        ids
    }

    // ------------------------------------------------------------------
    // Identifier generation
    // ------------------------------------------------------------------

    /// Current value of the id counter.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Raise the id counter to at least `serial`.
    ///
    /// Used when an older snapshot replaces the live tree, so ids handed out
    /// since the snapshot are not generated again.
    pub fn bump_serial(&mut self, serial: u64) {
        self.serial = self.serial.max(serial);
    }

    /// Generate an element id not present in the tree.
    pub fn fresh_id(&mut self) -> ElementId {
        loop {
            self.serial += 1;
            // Odd multiplier: a bijection on u32, so ids look scattered but
            // never repeat within 2^32 draws.
            let scrambled = (self.serial as u32).wrapping_mul(0x9E37_79B1);
            let id = ElementId::new(format!("el-{scrambled:08x}"));
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    /// Generate the id for a copy of `source` (`<base>-copy-<n>`).
    pub fn copy_id(&mut self, source: &ElementId) -> ElementId {
        let base = source.copy_base().to_string();
        loop {
            self.serial += 1;
            let id = ElementId::new(format!("{base}-copy-{}", self.serial));
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    // ------------------------------------------------------------------
    // Structural primitives
    // ------------------------------------------------------------------

    /// Allocate a detached node and register its id.
    fn alloc(&mut self, node: ElementNode) -> NodeKey {
        let id = node.id.clone();
        let slot = Slot {
            node,
            parent: None,
            children: Vec::new(),
        };
        let key = match self.free.pop() {
            Some(key) => {
                self.slots[key.index()] = Some(slot);
                key
            }
            None => {
                let key = NodeKey(self.slots.len() as u32);
                self.slots.push(Some(slot));
                key
            }
        };
        self.index.insert(id, key);
        key
    }

    /// Append a new node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeKey, node: ElementNode) -> Result<NodeKey> {
        let len = self.children(parent).len();
        self.insert_child(parent, len, node)
    }

    /// Insert a new node into `parent`'s sequence at `index` (clamped).
    ///
    /// Fails if the id is already used in this tree. Any node may receive
    /// children here; whether they are drawn is decided by type.
    pub fn insert_child(
        &mut self,
        parent: NodeKey,
        index: usize,
        node: ElementNode,
    ) -> Result<NodeKey> {
        if self.slot(parent).is_none() {
            return Err(Error::NotFound(format!("node #{}", parent.0)));
        }
        if self.index.contains_key(&node.id) {
            return Err(Error::InvalidValue(
                "id".to_string(),
                format!("{} is already in use", node.id),
            ));
        }
        let key = self.alloc(node);
        self.attach(parent, index, key);
        Ok(key)
    }

    /// Link a detached node into `parent` at `index` (clamped to the end).
    pub(crate) fn attach(&mut self, parent: NodeKey, index: usize, key: NodeKey) {
        if let Some(slot) = self.slot_mut(key) {
            slot.parent = Some(parent);
        }
        if let Some(slot) = self.slot_mut(parent) {
            let index = index.min(slot.children.len());
            slot.children.insert(index, key);
        }
    }

    /// Unlink a node from its parent, keeping it allocated.
    ///
    /// Returns the index it occupied.
    pub(crate) fn detach(&mut self, key: NodeKey) -> Option<usize> {
        let (parent, index) = self.position(key)?;
        if let Some(slot) = self.slot_mut(parent) {
            slot.children.remove(index);
        }
        if let Some(slot) = self.slot_mut(key) {
            slot.parent = None;
        }
        Some(index)
    }

    /// Swap two entries of a node's child sequence.
    pub(crate) fn swap_children(&mut self, parent: NodeKey, a: usize, b: usize) {
        if let Some(slot) = self.slot_mut(parent) {
            slot.children.swap(a, b);
        }
    }

    /// Detach and free a whole subtree. Returns the number of nodes freed.
    pub(crate) fn remove_subtree(&mut self, key: NodeKey) -> usize {
        if key == NodeKey::ROOT {
            return 0;
        }
        self.detach(key);
        let mut freed = 0;
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(slot) = self.slots.get_mut(k.index()).and_then(Option::take) {
                self.index.remove(&slot.node.id);
                stack.extend(slot.children);
                self.free.push(k);
                freed += 1;
            }
        }
        freed
    }

    /// Copy the subtree rooted at `key` into a standalone tree, ids intact.
    pub fn subtree(&self, key: NodeKey) -> Option<ElementTree> {
        let root = self.get(key)?.clone();
        let mut out = ElementTree::new(root);
        let mut stack = vec![(key, NodeKey::ROOT)];
        while let Some((src, dst)) = stack.pop() {
            for &child in self.children(src) {
                if let Some(node) = self.get(child) {
                    let new_key = out.alloc(node.clone());
                    out.attach(dst, usize::MAX, new_key);
                    stack.push((child, new_key));
                }
            }
        }
        out.serial = self.serial;
        Some(out)
    }

    /// Insert a copy of `fragment` into `parent` at `index`.
    ///
    /// With [`IdPolicy::Copy`] every inserted node gets a `-copy-` id; with
    /// [`IdPolicy::Keep`] ids are kept unless they collide with an existing
    /// element, in which case a fresh id is generated.
    pub fn insert_fragment(
        &mut self,
        parent: NodeKey,
        index: usize,
        fragment: &ElementTree,
        policy: IdPolicy,
    ) -> Result<NodeKey> {
        if self.slot(parent).is_none() {
            return Err(Error::NotFound(format!("node #{}", parent.0)));
        }
        let top = self
            .copy_in(fragment, NodeKey::ROOT, policy)
            .ok_or_else(|| Error::NotFound("fragment root".to_string()))?;
        self.attach(parent, index, top);
        Ok(top)
    }

    fn copy_in(
        &mut self,
        fragment: &ElementTree,
        src: NodeKey,
        policy: IdPolicy,
    ) -> Option<NodeKey> {
        let mut node = fragment.get(src)?.clone();
        node.id = match policy {
            IdPolicy::Copy => self.copy_id(&node.id),
            IdPolicy::Keep if self.index.contains_key(&node.id) => self.fresh_id(),
            IdPolicy::Keep => node.id,
        };
        let key = self.alloc(node);
        for &child in fragment.children(src) {
            if let Some(child_key) = self.copy_in(fragment, child, policy) {
                self.attach(key, usize::MAX, child_key);
            }
        }
        Some(key)
    }
}

/// How [`ElementTree::insert_fragment`] assigns ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPolicy {
    /// Keep fragment ids, replacing only colliding ones.
    Keep,
    /// Give every node a `<base>-copy-<n>` id.
    Copy,
}

impl PartialEq for ElementTree {
    /// Structural equality: same nodes in the same shape. Arena layout and
    /// the id counter are ignored.
    fn eq(&self, other: &Self) -> bool {
        fn same(a: &ElementTree, ak: NodeKey, b: &ElementTree, bk: NodeKey) -> bool {
            let (Some(an), Some(bn)) = (a.get(ak), b.get(bk)) else {
                return false;
            };
            let (ac, bc) = (a.children(ak), b.children(bk));
            an == bn
                && ac.len() == bc.len()
                && ac.iter().zip(bc).all(|(&x, &y)| same(a, x, b, y))
        }
        same(self, NodeKey::ROOT, other, NodeKey::ROOT)
    }
}

/// Pre-order iterator over all nodes with their depth.
pub struct DfsIter<'a> {
    tree: &'a ElementTree,
    stack: Vec<(NodeKey, usize)>,
}

impl Iterator for DfsIter<'_> {
    type Item = (NodeKey, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (current, depth) = self.stack.pop()?;

        // Push children in reverse order so they're visited left-to-right
        self.stack.extend(
            self.tree
                .children(current)
                .iter()
                .rev()
                .map(|&k| (k, depth + 1)),
        );

        Some((current, depth))
    }
}
