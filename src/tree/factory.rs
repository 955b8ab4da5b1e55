//! Default elements for insertion from the palette.

use super::node::{ElementId, ElementKind, ElementNode, ElementType};
use super::styles::StyleMap;
use super::{ElementTree, IdPolicy, NodeKey};

/// Root container of a freshly created block document.
pub fn default_root(id: impl Into<ElementId>) -> ElementNode {
    let mut root = ElementNode::new(id, ElementKind::Container);
    root.tag = Some("div".to_string());
    root.classes = ["pd-block", "grid-row"].into_iter().collect();
    root.styles = StyleMap::from([
        ("display", "flex"),
        ("flexDirection", "column"),
        ("alignItems", "center"),
        ("gap", "1rem"),
        ("padding", "2rem"),
    ]);
    root
}

/// A one-node tree holding [`default_root`] with a generated id.
pub fn new_document_root() -> ElementTree {
    let mut scratch = ElementTree::new(default_root(""));
    let id = scratch.fresh_id();
    let mut tree = ElementTree::new(default_root(id));
    tree.bump_serial(scratch.serial());
    tree
}

impl ElementTree {
    /// Build a new element of `element_type` with the builder's defaults.
    ///
    /// Returns a detached fragment whose ids were drawn from this tree's
    /// generator, ready for [`ElementTree::insert_fragment`]. Repeaters come
    /// with three starter items.
    pub fn build_element(&mut self, element_type: &ElementType) -> ElementTree {
        let node = self.default_node(element_type);
        let mut fragment = ElementTree::new(node);
        if *element_type == ElementType::Repeater {
            for _ in 0..3 {
                let item = self.build_repeater_item();
                let inserted =
                    fragment.insert_fragment(NodeKey::ROOT, usize::MAX, &item, IdPolicy::Keep);
                if let Err(err) = inserted {
                    log::warn!("could not add starter repeater item: {err}");
                }
            }
        }
        fragment.bump_serial(self.serial());
        fragment
    }

    /// Build a starter repeater item: a row container with an icon and a
    /// label.
    pub fn build_repeater_item(&mut self) -> ElementTree {
        let mut item = ElementNode::new(self.fresh_id(), ElementKind::Container);
        item.tag = Some("div".to_string());
        item.classes = ["pd-repeater__item"].into_iter().collect();
        item.styles = StyleMap::from([
            ("display", "flex"),
            ("alignItems", "center"),
            ("gap", "1rem"),
            ("padding", "1rem"),
            ("backgroundColor", "#f9fafb"),
            ("borderRadius", "0.5rem"),
        ]);

        let mut icon = ElementNode::new(
            self.fresh_id(),
            ElementKind::Icon {
                icon_class: "pd-icon--check".to_string(),
            },
        );
        icon.tag = Some("span".to_string());
        icon.classes = ["pd-icon", "pd-icon--check"].into_iter().collect();
        icon.styles = StyleMap::from([("fontSize", "1.5rem"), ("color", "#e0ac7e")]);

        let mut label = ElementNode::new(
            self.fresh_id(),
            ElementKind::Text {
                content: "List item".to_string(),
            },
        );
        label.tag = Some("span".to_string());
        label.styles = StyleMap::from([("fontSize", "1rem"), ("color", "#374151")]);

        let mut fragment = ElementTree::new(item);
        for child in [icon, label] {
            // Ids are fresh, so this cannot collide.
            if let Err(err) = fragment.append_child(NodeKey::ROOT, child) {
                log::warn!("could not build repeater item: {err}");
            }
        }
        fragment.bump_serial(self.serial());
        fragment
    }

    fn default_node(&mut self, element_type: &ElementType) -> ElementNode {
        let mut node = ElementNode::new(self.fresh_id(), ElementKind::default_for(element_type));
        node.tag = Some(node.tag_name().to_string());
        let (classes, styles): (&[&str], StyleMap) = match element_type {
            ElementType::Heading => (
                &[],
                StyleMap::from([
                    ("fontWeight", "700"),
                    ("fontSize", "2rem"),
                    ("color", "#000000"),
                    ("textAlign", "center"),
                ]),
            ),
            ElementType::Text => (
                &[],
                StyleMap::from([
                    ("fontSize", "1rem"),
                    ("color", "#333333"),
                    ("textAlign", "left"),
                ]),
            ),
            ElementType::Image => (
                &[],
                StyleMap::from([("maxWidth", "100%"), ("height", "auto")]),
            ),
            ElementType::Button => (
                &["btn", "btn-primary"],
                StyleMap::from([
                    ("display", "inline-block"),
                    ("padding", "0.75rem 1.5rem"),
                    ("backgroundColor", "#e0ac7e"),
                    ("color", "#ffffff"),
                    ("borderRadius", "0.5rem"),
                    ("textDecoration", "none"),
                ]),
            ),
            ElementType::Separator => (
                &[],
                StyleMap::from([
                    ("width", "100%"),
                    ("borderTop", "1px solid #e5e5e5"),
                    ("margin", "1rem 0"),
                ]),
            ),
            ElementType::Container => (
                &[],
                StyleMap::from([
                    ("display", "flex"),
                    ("flexDirection", "column"),
                    ("gap", "1rem"),
                    ("padding", "1rem"),
                ]),
            ),
            ElementType::Row => (
                &[],
                StyleMap::from([
                    ("display", "flex"),
                    ("flexDirection", "row"),
                    ("gap", "1rem"),
                    ("alignItems", "center"),
                ]),
            ),
            ElementType::Column => (
                &[],
                StyleMap::from([
                    ("display", "flex"),
                    ("flexDirection", "column"),
                    ("gap", "1rem"),
                    ("alignItems", "stretch"),
                    ("flex", "1"),
                ]),
            ),
            ElementType::Grid => (
                &[],
                StyleMap::from([
                    ("display", "grid"),
                    ("gridTemplateColumns", "repeat(2, 1fr)"),
                    ("gap", "1rem"),
                    ("padding", "1rem"),
                ]),
            ),
            ElementType::Background => (
                &["relative"],
                StyleMap::from([
                    ("position", "relative"),
                    ("minHeight", "200px"),
                    ("backgroundColor", "#f3f4f6"),
                    ("backgroundSize", "cover"),
                    ("backgroundPosition", "center"),
                ]),
            ),
            ElementType::Repeater => (
                &["pd-repeater"],
                StyleMap::from([
                    ("display", "flex"),
                    ("flexDirection", "column"),
                    ("gap", "1rem"),
                ]),
            ),
            ElementType::Slide => (
                &["pd-slide"],
                StyleMap::from([
                    ("position", "relative"),
                    ("minHeight", "300px"),
                    ("display", "flex"),
                    ("flexDirection", "column"),
                    ("alignItems", "center"),
                    ("justifyContent", "center"),
                    ("padding", "2rem"),
                    ("backgroundSize", "cover"),
                    ("backgroundPosition", "center"),
                ]),
            ),
            ElementType::Icon => (
                &["pd-icon"],
                StyleMap::from([("fontSize", "2rem"), ("color", "#e0ac7e")]),
            ),
            ElementType::Picture
            | ElementType::Source
            | ElementType::RawHtml
            | ElementType::Other(_) => (&[], StyleMap::new()),
        };
        node.classes = classes.iter().copied().collect();
        node.styles = styles;
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_root() {
        let tree = new_document_root();
        let root = tree.root_node();
        assert!(root.id.as_str().starts_with("el-"));
        assert_eq!(root.element_type(), ElementType::Container);
        assert_eq!(root.classes.to_attr(), "pd-block grid-row");
        assert_eq!(root.styles.get("padding"), Some("2rem"));
    }

    #[test]
    fn test_build_heading_defaults() {
        let mut tree = new_document_root();
        let fragment = tree.build_element(&ElementType::Heading);
        let heading = fragment.root_node();
        assert_eq!(heading.tag.as_deref(), Some("h2"));
        assert_eq!(heading.styles.get("fontSize"), Some("2rem"));
        assert_eq!(heading.content(), Some("New heading"));
    }

    #[test]
    fn test_build_repeater_has_three_items() {
        let mut tree = new_document_root();
        let fragment = tree.build_element(&ElementType::Repeater);
        assert_eq!(fragment.children(NodeKey::ROOT).len(), 3);
        // Each item is a container with an icon and a label
        assert_eq!(fragment.len(), 1 + 3 * 3);
    }

    #[test]
    fn test_generated_ids_do_not_collide_with_host() {
        let mut tree = new_document_root();
        let fragment = tree.build_element(&ElementType::Grid);
        let id = fragment.root_node().id.clone();
        assert_ne!(id, tree.root_node().id);
        assert!(fragment.serial() >= tree.serial());
    }
}
