//! Nested JSON form of an element, as persisted by the builder.
//!
//! [`ElementRecord`] mirrors the stored schema field for field; conversion
//! to and from the arena happens in [`ElementTree::from_record`] and
//! [`ElementTree::to_record`].

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::tree::{
    Backdrop, ClassList, ElementId, ElementKind, ElementNode, ElementTree, ElementType,
    ImageAttrs, ItemLayout, NodeKey, SourceAttrs, StyleMap, DEFAULT_GRID_COLUMNS,
    MAX_GRID_COLUMNS, scalar_to_string,
};

/// One stored element with its nested children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "default_type")]
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default)]
    pub classes: ClassList,
    #[serde(default)]
    pub styles: StyleMap,
    #[serde(default)]
    pub children: Vec<ElementRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ElementRecord>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub srcset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub sizes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub button_variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub button_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub icon_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub overlay_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_number")]
    pub overlay_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_count")]
    pub grid_columns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub item_layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_count")]
    pub items_per_row: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_count")]
    pub slide_index: Option<u32>,

    /// Fields this crate does not interpret, kept for the round trip.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_type() -> ElementType {
    ElementType::Container
}

fn default_true() -> bool {
    true
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<serde_json::Value>::deserialize(d)?.and_then(scalar_to_string))
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(d)? {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(lenient_number(d)?
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32))
}

impl ElementRecord {
    /// A bare record of the given type, with every optional field unset.
    pub fn new(id: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            id: id.into(),
            element_type,
            tag: None,
            content: None,
            classes: ClassList::new(),
            styles: StyleMap::new(),
            children: Vec::new(),
            items: Vec::new(),
            visible: true,
            locked: false,
            src: None,
            alt: None,
            srcset: None,
            sizes: None,
            width: None,
            height: None,
            media: None,
            mime_type: None,
            href: None,
            button_variant: None,
            button_size: None,
            icon_class: None,
            background_image: None,
            overlay_color: None,
            overlay_opacity: None,
            grid_columns: None,
            item_layout: None,
            items_per_row: None,
            slide_index: None,
            extra: BTreeMap::new(),
        }
    }

    /// The sequence this record's type draws: `items` for a repeater.
    fn sequence(&self) -> &[ElementRecord] {
        if self.element_type == ElementType::Repeater {
            &self.items
        } else {
            &self.children
        }
    }

    fn clamped_grid_columns(&self) -> u32 {
        let stored = self.grid_columns.unwrap_or(DEFAULT_GRID_COLUMNS);
        let columns = stored.clamp(1, MAX_GRID_COLUMNS);
        if columns != stored {
            log::warn!("grid {} has {stored} columns, using {columns}", self.id);
        }
        columns
    }

    /// Build the node payload (everything but the children).
    fn to_node(&self, id: ElementId) -> ElementNode {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let content = text(&self.content);
        let backdrop = |color: &str, opacity: f64| Backdrop {
            image: text(&self.background_image),
            overlay_color: self.overlay_color.clone().unwrap_or_else(|| color.to_string()),
            overlay_opacity: self.overlay_opacity.unwrap_or(opacity).clamp(0.0, 1.0),
        };

        let kind = match &self.element_type {
            ElementType::Heading => ElementKind::Heading { content },
            ElementType::Text => ElementKind::Text { content },
            ElementType::Image => ElementKind::Image(ImageAttrs {
                src: text(&self.src),
                alt: text(&self.alt),
                srcset: text(&self.srcset),
                sizes: text(&self.sizes),
                width: text(&self.width),
                height: text(&self.height),
            }),
            ElementType::Picture => ElementKind::Picture,
            ElementType::Source => ElementKind::Source(SourceAttrs {
                srcset: text(&self.srcset),
                sizes: text(&self.sizes),
                media: text(&self.media),
                mime_type: text(&self.mime_type),
            }),
            ElementType::Icon => ElementKind::Icon {
                icon_class: text(&self.icon_class),
            },
            ElementType::Button => ElementKind::Button {
                content,
                href: text(&self.href),
                variant: self.button_variant.clone(),
                size: self.button_size.clone(),
            },
            ElementType::Separator => ElementKind::Separator,
            ElementType::Container => ElementKind::Container,
            ElementType::Row => ElementKind::Row,
            ElementType::Column => ElementKind::Column,
            ElementType::Grid => ElementKind::Grid {
                columns: self.clamped_grid_columns(),
            },
            ElementType::Background => ElementKind::Background(backdrop("", 0.5)),
            ElementType::Repeater => ElementKind::Repeater {
                layout: self
                    .item_layout
                    .as_deref()
                    .and_then(ItemLayout::parse)
                    .unwrap_or_default(),
                items_per_row: self.items_per_row.unwrap_or(1).max(1),
            },
            ElementType::Slide => ElementKind::Slide {
                backdrop: backdrop("#000000", 0.3),
                index: self.slide_index.unwrap_or(0),
            },
            ElementType::RawHtml => ElementKind::RawHtml { content },
            ElementType::Other(name) => ElementKind::Other {
                type_name: name.clone(),
                content,
            },
        };

        let mut extra = self.extra.clone();
        // Leaf and composite attributes that have no home in this kind are
        // kept verbatim rather than dropped.
        if self.content.is_some() && kind.content().is_none() {
            extra.insert("content".to_string(), self.content.clone().into());
        }

        ElementNode {
            id,
            tag: self.tag.clone(),
            visible: self.visible,
            locked: self.locked,
            classes: self.classes.clone(),
            styles: self.styles.clone(),
            kind,
            extra,
        }
    }

    fn from_node(node: &ElementNode) -> Self {
        let mut record = ElementRecord::new(node.id.as_str(), node.element_type());
        record.tag = node.tag.clone();
        record.visible = node.visible;
        record.locked = node.locked;
        record.classes = node.classes.clone();
        record.styles = node.styles.clone();
        record.extra = node.extra.clone();

        let some = |s: &str| Some(s.to_string());
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        match &node.kind {
            ElementKind::Heading { content }
            | ElementKind::Text { content }
            | ElementKind::RawHtml { content }
            | ElementKind::Other { content, .. } => {
                record.content = some(content);
            }
            ElementKind::Image(img) => {
                record.src = some(&img.src);
                record.alt = some(&img.alt);
                record.srcset = non_empty(&img.srcset);
                record.sizes = non_empty(&img.sizes);
                record.width = non_empty(&img.width);
                record.height = non_empty(&img.height);
            }
            ElementKind::Source(src) => {
                record.srcset = some(&src.srcset);
                record.sizes = non_empty(&src.sizes);
                record.media = non_empty(&src.media);
                record.mime_type = non_empty(&src.mime_type);
            }
            ElementKind::Icon { icon_class } => record.icon_class = some(icon_class),
            ElementKind::Button {
                content,
                href,
                variant,
                size,
            } => {
                record.content = some(content);
                record.href = some(href);
                record.button_variant = variant.clone();
                record.button_size = size.clone();
            }
            ElementKind::Grid { columns } => record.grid_columns = Some(*columns),
            ElementKind::Background(backdrop) => {
                record.background_image = some(&backdrop.image);
                record.overlay_color = some(&backdrop.overlay_color);
                record.overlay_opacity = Some(backdrop.overlay_opacity);
            }
            ElementKind::Slide { backdrop, index } => {
                record.background_image = some(&backdrop.image);
                record.overlay_color = some(&backdrop.overlay_color);
                record.overlay_opacity = Some(backdrop.overlay_opacity);
                record.slide_index = Some(*index);
            }
            ElementKind::Repeater {
                layout,
                items_per_row,
            } => {
                record.item_layout = some(layout.as_str());
                record.items_per_row = Some(*items_per_row);
            }
            ElementKind::Picture
            | ElementKind::Separator
            | ElementKind::Container
            | ElementKind::Row
            | ElementKind::Column => {}
        }
        if let Some(serde_json::Value::String(content)) = record.extra.remove("content") {
            record.content = Some(content);
        }
        record
    }
}

impl ElementTree {
    /// Build a tree from a stored element.
    ///
    /// Missing or duplicate ids are replaced with generated ones (logged),
    /// so the loaded tree always satisfies the unique-id invariant. A
    /// repeater's `children` and any non-repeater's `items` are ignored with
    /// a warning.
    pub fn from_record(record: &ElementRecord) -> ElementTree {
        let mut seen = HashSet::new();
        let mut scratch = ElementTree::new(ElementNode::new("", ElementKind::Container));

        // First pass: settle ids so the generator never hands out one that
        // appears later in the document.
        let mut ids = Vec::new();
        collect_ids(record, &mut ids);
        let taken: HashSet<&str> = ids.iter().copied().collect();

        let root_id = settle_id(&record.id, &mut seen, &taken, &mut scratch);
        let mut tree = ElementTree::new(record.to_node(root_id));
        let mut stack = vec![(record, NodeKey::ROOT)];
        while let Some((rec, key)) = stack.pop() {
            warn_ignored_sequence(rec);
            for child in rec.sequence() {
                let id = settle_id(&child.id, &mut seen, &taken, &mut scratch);
                match tree.append_child(key, child.to_node(id)) {
                    Ok(child_key) => stack.push((child, child_key)),
                    Err(err) => log::warn!("dropping element {}: {err}", child.id),
                }
            }
        }
        tree.bump_serial(scratch.serial());
        tree
    }

    /// Convert the tree back to its stored nested form.
    pub fn to_record(&self) -> ElementRecord {
        self.record_at(NodeKey::ROOT)
            .unwrap_or_else(|| ElementRecord::new("", ElementType::Container))
    }

    /// Stored form of the subtree rooted at `key`.
    pub fn record_at(&self, key: NodeKey) -> Option<ElementRecord> {
        let node = self.get(key)?;
        let mut record = ElementRecord::from_node(node);
        let children: Vec<_> = self
            .children(key)
            .iter()
            .filter_map(|&k| self.record_at(k))
            .collect();
        if node.element_type() == ElementType::Repeater {
            record.items = children;
        } else {
            record.children = children;
        }
        Some(record)
    }
}

fn collect_ids<'a>(record: &'a ElementRecord, out: &mut Vec<&'a str>) {
    out.push(&record.id);
    for child in record.sequence() {
        collect_ids(child, out);
    }
}

fn settle_id(
    wanted: &str,
    seen: &mut HashSet<String>,
    taken: &HashSet<&str>,
    scratch: &mut ElementTree,
) -> ElementId {
    if !wanted.is_empty() && seen.insert(wanted.to_string()) {
        return ElementId::new(wanted);
    }
    let id = loop {
        let candidate = scratch.fresh_id();
        if !taken.contains(candidate.as_str()) && !seen.contains(candidate.as_str()) {
            break candidate;
        }
    };
    if wanted.is_empty() {
        log::warn!("element without id, assigned {id}");
    } else {
        log::warn!("duplicate element id {wanted}, reassigned {id}");
    }
    seen.insert(id.to_string());
    id
}

fn warn_ignored_sequence(record: &ElementRecord) {
    let ignored = if record.element_type == ElementType::Repeater {
        record.children.len()
    } else {
        record.items.len()
    };
    if ignored > 0 {
        log::warn!(
            "{} element {} carries {ignored} entries in its unused sequence; ignored",
            record.element_type,
            record.id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_tree() {
        let record: ElementRecord = serde_json::from_str(
            r#"{"id":"root","type":"container","children":[{"id":"a","type":"text","content":"Hello"}]}"#,
        )
        .unwrap();
        let tree = ElementTree::from_record(&record);
        assert_eq!(tree.len(), 2);
        let a = tree.find("a").unwrap();
        assert_eq!(a.content(), Some("Hello"));
        assert!(a.visible);
        assert!(!a.locked);
    }

    #[test]
    fn test_duplicate_and_missing_ids_are_repaired() {
        let record: ElementRecord = serde_json::from_str(
            r#"{"id":"root","type":"container","children":[
                {"id":"a","type":"text"},
                {"id":"a","type":"text"},
                {"type":"separator"}
            ]}"#,
        )
        .unwrap();
        let tree = ElementTree::from_record(&record);
        assert_eq!(tree.len(), 4);
        let ids: HashSet<_> = tree.iter_dfs().map(|(k, _)| tree.get(k).unwrap().id.clone()).collect();
        assert_eq!(ids.len(), 4);
        assert!(tree.contains("a"));
    }

    #[test]
    fn test_grid_columns_clamped_on_load() {
        let load = |json: &str| {
            let record: ElementRecord = serde_json::from_str(json).unwrap();
            ElementTree::from_record(&record).root_node().kind.clone()
        };
        assert_eq!(
            load(r#"{"id":"g","type":"grid","gridColumns":4294967295}"#),
            ElementKind::Grid { columns: MAX_GRID_COLUMNS }
        );
        assert_eq!(
            load(r#"{"id":"g","type":"grid","gridColumns":0}"#),
            ElementKind::Grid { columns: 1 }
        );
        assert_eq!(
            load(r#"{"id":"g","type":"grid","gridColumns":"3"}"#),
            ElementKind::Grid { columns: 3 }
        );
    }

    #[test]
    fn test_repeater_uses_items() {
        let record: ElementRecord = serde_json::from_str(
            r#"{"id":"r","type":"repeater","itemLayout":"grid","itemsPerRow":"3",
                "items":[{"id":"i1","type":"container"},{"id":"i2","type":"container"}],
                "children":[]}"#,
        )
        .unwrap();
        let tree = ElementTree::from_record(&record);
        assert_eq!(tree.children(NodeKey::ROOT).len(), 2);
        assert_eq!(
            tree.root_node().kind,
            ElementKind::Repeater {
                layout: ItemLayout::Grid,
                items_per_row: 3
            }
        );

        let back = tree.to_record();
        assert_eq!(back.items.len(), 2);
        assert!(back.children.is_empty());
    }

    #[test]
    fn test_unknown_fields_survive() {
        let json = r#"{"id":"x","type":"testimonial","content":"Hi","data":{"k":"v"},"htmlId":"anchor"}"#;
        let record: ElementRecord = serde_json::from_str(json).unwrap();
        let tree = ElementTree::from_record(&record);
        let back = tree.to_record();
        assert_eq!(back.element_type, ElementType::Other("testimonial".to_string()));
        assert_eq!(back.content.as_deref(), Some("Hi"));
        assert_eq!(back.extra.get("htmlId"), Some(&serde_json::json!("anchor")));
        assert_eq!(back.extra.get("data"), Some(&serde_json::json!({"k": "v"})));
    }

    #[test]
    fn test_overlay_opacity_is_clamped() {
        let record: ElementRecord = serde_json::from_str(
            r##"{"id":"bg","type":"background","overlayColor":"#000","overlayOpacity":4}"##,
        )
        .unwrap();
        let tree = ElementTree::from_record(&record);
        let backdrop = tree.root_node().kind.backdrop().unwrap();
        assert_eq!(backdrop.overlay_opacity, 1.0);
    }
}
