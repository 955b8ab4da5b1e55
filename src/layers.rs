//! Layer list: the flattened outline of the element tree.
//!
//! Entries come in pre-order with the same depth numbering the canvas
//! renderer uses, descending exactly the sequences the renderer draws.

use serde::Serialize;

use crate::render::plain_text;
use crate::tree::{ElementId, ElementTree, ElementType, NodeKey};

/// One row of the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerEntry {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Scalar content as plain text; empty for composite types.
    pub content: String,
    pub depth: usize,
    pub visible: bool,
    pub locked: bool,
    pub has_children: bool,
    pub selected: bool,
}

/// Options for [`layer_list_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerOptions {
    /// List hidden subtrees too (entries keep `visible: false`).
    pub include_hidden: bool,
}

/// Flatten the drawn part of `tree`.
pub fn layer_list(tree: &ElementTree, selected: Option<&str>) -> Vec<LayerEntry> {
    layer_list_with(tree, selected, LayerOptions::default())
}

/// Flatten `tree` with explicit options.
pub fn layer_list_with(
    tree: &ElementTree,
    selected: Option<&str>,
    options: LayerOptions,
) -> Vec<LayerEntry> {
    let listed = |key: NodeKey| {
        tree.get(key)
            .is_some_and(|n| options.include_hidden || n.visible)
    };

    let mut entries = Vec::with_capacity(tree.len());
    let mut stack = vec![(NodeKey::ROOT, 0)];
    while let Some((key, depth)) = stack.pop() {
        if !listed(key) {
            continue;
        }
        let Some(node) = tree.get(key) else {
            continue;
        };

        let descend = node.is_composite();
        let children: &[NodeKey] = if descend { tree.children(key) } else { &[] };
        entries.push(LayerEntry {
            id: node.id.clone(),
            element_type: node.element_type(),
            content: node.content().map(plain_text).unwrap_or_default(),
            depth,
            visible: node.visible,
            locked: node.locked,
            has_children: children.iter().any(|&k| listed(k)),
            selected: selected == Some(node.id.as_str()),
        });

        // Push children in reverse order so they're visited left-to-right
        stack.extend(children.iter().rev().map(|&k| (k, depth + 1)));
    }
    entries
}
