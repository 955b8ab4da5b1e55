//! Property panel edits: dotted-path setters and the typed attribute
//! operations behind the panel's dedicated controls.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::tree::{
    ClassList, ElementId, ElementKind, ElementTree, IdPolicy, ItemLayout, MAX_GRID_COLUMNS,
    NodeKey, scalar_to_string,
};

impl ElementTree {
    /// Set one attribute by dotted path (`content`, `styles.padding`).
    ///
    /// `styles.<key>` writes a single style key without touching the
    /// others; a `null` value removes the key. `classes` replaces the class
    /// list. Other paths must be in the element type's editable set.
    /// Returns whether the stored value changed.
    pub fn set_property(&mut self, id: &str, path: &str, value: &Value) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let element_type = node.element_type();
        let invalid_property = || Error::InvalidProperty {
            path: path.to_string(),
            element_type: element_type.to_string(),
        };

        if let Some(key) = path.strip_prefix("styles.") {
            if key.is_empty() || key.contains('.') {
                return Err(invalid_property());
            }
            return match value {
                Value::Null => Ok(node.styles.remove(key).is_some()),
                _ => {
                    let value = string_value(path, value)?;
                    let changed = node.styles.get(key) != Some(value.as_str());
                    node.styles.set(key, value);
                    Ok(changed)
                }
            };
        }

        if path == "classes" {
            let classes = match value {
                Value::Array(items) => items
                    .iter()
                    .filter_map(|v| scalar_to_string(v.clone()))
                    .collect(),
                _ => ClassList::parse(&string_value(path, value)?),
            };
            let changed = node.classes != classes;
            node.classes = classes;
            return Ok(changed);
        }

        if !element_type.editable_properties().contains(&path) {
            return Err(invalid_property());
        }

        match path {
            "visible" => return Ok(replace(&mut node.visible, bool_value(path, value)?)),
            "locked" => return Ok(replace(&mut node.locked, bool_value(path, value)?)),
            "tag" => {
                let tag = optional_string(path, value)?;
                if let Some(tag) = tag.as_deref().filter(|t| !element_type.accepts_tag(t)) {
                    return Err(Error::InvalidValue(path.to_string(), tag.to_string()));
                }
                return Ok(replace(&mut node.tag, tag));
            }
            "gridColumns" => return self.set_grid_columns(id, count_value(path, value)?),
            "backgroundImage" => return self.set_background_image(id, &string_value(path, value)?),
            _ => {}
        }

        let changed = match (&mut node.kind, path) {
            (kind, "content") => match kind.content_mut() {
                Some(content) => replace(content, string_value(path, value)?),
                None => return Err(invalid_property()),
            },
            (ElementKind::Image(img), _) => {
                let field = match path {
                    "src" => &mut img.src,
                    "alt" => &mut img.alt,
                    "srcset" => &mut img.srcset,
                    "sizes" => &mut img.sizes,
                    "width" => &mut img.width,
                    "height" => &mut img.height,
                    _ => return Err(invalid_property()),
                };
                replace(field, string_value(path, value)?)
            }
            (ElementKind::Source(src), _) => {
                let field = match path {
                    "srcset" => &mut src.srcset,
                    "sizes" => &mut src.sizes,
                    "media" => &mut src.media,
                    "mimeType" => &mut src.mime_type,
                    _ => return Err(invalid_property()),
                };
                replace(field, string_value(path, value)?)
            }
            (ElementKind::Button { href, .. }, "href") => {
                replace(href, string_value(path, value)?)
            }
            (ElementKind::Button { variant, .. }, "buttonVariant") => {
                replace(variant, optional_string(path, value)?)
            }
            (ElementKind::Button { size, .. }, "buttonSize") => {
                replace(size, optional_string(path, value)?)
            }
            (ElementKind::Icon { icon_class }, "iconClass") => {
                replace(icon_class, string_value(path, value)?)
            }
            (ElementKind::Repeater { layout, .. }, "itemLayout") => {
                let text = string_value(path, value)?;
                let parsed = ItemLayout::parse(&text)
                    .ok_or_else(|| Error::InvalidValue(path.to_string(), text))?;
                replace(layout, parsed)
            }
            (ElementKind::Repeater { items_per_row, .. }, "itemsPerRow") => {
                replace(items_per_row, count_value(path, value)?.max(1))
            }
            (ElementKind::Slide { index, .. }, "slideIndex") => {
                replace(index, count_value(path, value)?)
            }
            (kind, "overlayColor" | "overlayOpacity") => {
                let Some(backdrop) = kind.backdrop_mut() else {
                    return Err(invalid_property());
                };
                match path {
                    "overlayColor" => {
                        replace(&mut backdrop.overlay_color, string_value(path, value)?)
                    }
                    _ => {
                        let opacity = number_value(path, value)?.clamp(0.0, 1.0);
                        replace(&mut backdrop.overlay_opacity, opacity)
                    }
                }
            }
            _ => return Err(invalid_property()),
        };
        Ok(changed)
    }

    /// Set a grid's column count and its `gridTemplateColumns` style.
    pub fn set_grid_columns(&mut self, id: &str, columns: u32) -> Result<bool> {
        if !(1..=MAX_GRID_COLUMNS).contains(&columns) {
            return Err(Error::InvalidValue(
                "gridColumns".to_string(),
                format!("{columns} is outside 1..={MAX_GRID_COLUMNS}"),
            ));
        }
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let ElementKind::Grid { columns: current } = &mut node.kind else {
            return Err(Error::InvalidProperty {
                path: "gridColumns".to_string(),
                element_type: node.element_type().to_string(),
            });
        };
        let mut changed = replace(current, columns);
        let template = format!("repeat({columns}, 1fr)");
        changed |= node.styles.get("gridTemplateColumns") != Some(template.as_str());
        node.styles.set("gridTemplateColumns", template);
        Ok(changed)
    }

    /// Set a background or slide image, mirrored into
    /// `styles.backgroundImage`. An empty url clears both.
    pub fn set_background_image(&mut self, id: &str, url: &str) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let element_type = node.element_type();
        let Some(backdrop) = node.kind.backdrop_mut() else {
            return Err(Error::InvalidProperty {
                path: "backgroundImage".to_string(),
                element_type: element_type.to_string(),
            });
        };
        let mut changed = replace(&mut backdrop.image, url.to_string());
        if url.is_empty() {
            changed |= node.styles.remove("backgroundImage").is_some();
        } else {
            let css = format!("url('{}')", url.replace('\'', "%27"));
            changed |= node.styles.get("backgroundImage") != Some(css.as_str());
            node.styles.set("backgroundImage", css);
        }
        Ok(changed)
    }

    /// Set a background or slide overlay; opacity is clamped to `0..=1`.
    pub fn set_overlay(&mut self, id: &str, color: &str, opacity: f64) -> Result<bool> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let element_type = node.element_type();
        let Some(backdrop) = node.kind.backdrop_mut() else {
            return Err(Error::InvalidProperty {
                path: "overlayColor".to_string(),
                element_type: element_type.to_string(),
            });
        };
        let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        let changed = replace(&mut backdrop.overlay_color, color.to_string());
        Ok(replace(&mut backdrop.overlay_opacity, opacity) || changed)
    }

    /// Append a starter item to a repeater. Returns the item's id.
    pub fn add_repeater_item(&mut self, id: &str) -> Result<ElementId> {
        let key = self.require_repeater(id)?;
        let item = self.build_repeater_item();
        self.bump_serial(item.serial());
        let item_key = self.insert_fragment(key, usize::MAX, &item, IdPolicy::Keep)?;
        self.get(item_key)
            .map(|n| n.id.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Remove the repeater item at `index`. The last remaining item is never
    /// removed.
    pub fn remove_repeater_item(&mut self, id: &str, index: usize) -> Result<bool> {
        let key = self.require_repeater(id)?;
        let items = self.children(key);
        if items.len() <= 1 {
            return Ok(false);
        }
        let Some(&item) = items.get(index) else {
            return Ok(false);
        };
        Ok(self.remove_subtree(item) > 0)
    }

    /// Set a repeater's layout. `grid` and `list` also rewrite the display
    /// styles; `carousel` leaves styles to the theme.
    pub fn set_repeater_layout(
        &mut self,
        id: &str,
        layout: ItemLayout,
        items_per_row: u32,
    ) -> Result<bool> {
        let key = self.require_repeater(id)?;
        let Some(node) = self.get_mut(key) else {
            return Err(Error::NotFound(id.to_string()));
        };
        let before = node.clone();
        let items_per_row = items_per_row.max(1);
        node.kind = ElementKind::Repeater {
            layout,
            items_per_row,
        };
        match layout {
            ItemLayout::Grid => {
                node.styles.set("display", "grid");
                node.styles
                    .set("gridTemplateColumns", format!("repeat({items_per_row}, 1fr)"));
                node.styles.remove("flexDirection");
            }
            ItemLayout::List => {
                node.styles.set("display", "flex");
                node.styles.set("flexDirection", "column");
                node.styles.remove("gridTemplateColumns");
            }
            ItemLayout::Carousel => {}
        }
        Ok(*node != before)
    }

    fn require_repeater(&self, id: &str) -> Result<NodeKey> {
        let key = self.require(id)?;
        match self.get(key) {
            Some(node) if matches!(node.kind, ElementKind::Repeater { .. }) => Ok(key),
            Some(node) => Err(Error::InvalidProperty {
                path: "items".to_string(),
                element_type: node.element_type().to_string(),
            }),
            None => Err(Error::NotFound(id.to_string())),
        }
    }
}

/// Store `value` into `slot`, reporting whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn string_value(path: &str, value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        other => scalar_to_string(other.clone())
            .ok_or_else(|| Error::InvalidValue(path.to_string(), other.to_string())),
    }
}

fn optional_string(path: &str, value: &Value) -> Result<Option<String>> {
    let s = string_value(path, value)?;
    Ok((!s.is_empty()).then_some(s))
}

fn bool_value(path: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" || s == "1" => Ok(true),
        Value::String(s) if s == "false" || s == "0" => Ok(false),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|n| n != 0.0)),
        other => Err(Error::InvalidValue(path.to_string(), other.to_string())),
    }
}

fn number_value(path: &str, value: &Value) -> Result<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number
        .filter(|n| n.is_finite())
        .ok_or_else(|| Error::InvalidValue(path.to_string(), value.to_string()))
}

fn count_value(path: &str, value: &Value) -> Result<u32> {
    let n = number_value(path, value)?;
    if n < 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return Err(Error::InvalidValue(path.to_string(), value.to_string()));
    }
    Ok(n as u32)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tree::{Backdrop, ElementNode, ElementType};

    fn sample() -> ElementTree {
        let mut tree = ElementTree::new(ElementNode::new("root", ElementKind::Container));
        tree.append_child(
            NodeKey::ROOT,
            ElementNode::new(
                "a",
                ElementKind::Text {
                    content: "Hello".to_string(),
                },
            ),
        )
        .unwrap();
        tree.append_child(NodeKey::ROOT, ElementNode::new("g", ElementKind::Grid { columns: 2 }))
            .unwrap();
        tree.append_child(
            NodeKey::ROOT,
            ElementNode::new("bg", ElementKind::Background(Backdrop::new("", 0.5))),
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_style_path_passthrough() {
        let mut tree = sample();
        tree.set_property("a", "styles.color", &json!("red")).unwrap();
        assert!(tree.set_property("a", "styles.padding", &json!("10px 20px")).unwrap());
        let styles = &tree.find("a").unwrap().styles;
        assert_eq!(styles.get("padding"), Some("10px 20px"));
        assert_eq!(styles.get("color"), Some("red"));

        // Idempotent
        assert!(!tree.set_property("a", "styles.padding", &json!("10px 20px")).unwrap());

        assert!(tree.set_property("a", "styles.color", &Value::Null).unwrap());
        assert_eq!(tree.find("a").unwrap().styles.get("color"), None);
    }

    #[test]
    fn test_content_and_flags() {
        let mut tree = sample();
        assert!(tree.set_property("a", "content", &json!("<b>Hi</b>")).unwrap());
        assert_eq!(tree.find("a").unwrap().content(), Some("<b>Hi</b>"));
        assert!(tree.set_property("a", "visible", &json!(false)).unwrap());
        assert!(!tree.find("a").unwrap().visible);
        assert!(tree.set_property("a", "tag", &json!("div")).unwrap());
        assert_eq!(tree.find("a").unwrap().tag.as_deref(), Some("div"));
    }

    #[test]
    fn test_paths_outside_editable_set_are_rejected() {
        let mut tree = sample();
        let before = tree.clone();
        for path in ["src", "gridColumns", "id", "styles.", "styles.a.b", "children"] {
            assert!(
                matches!(
                    tree.set_property("a", path, &json!("x")),
                    Err(Error::InvalidProperty { .. })
                ),
                "{path} should be rejected"
            );
        }
        assert_eq!(tree, before);
    }

    #[test]
    fn test_numeric_attributes() {
        let mut tree = sample();
        tree.set_property("g", "gridColumns", &json!("4")).unwrap();
        assert_eq!(tree.find("g").unwrap().kind, ElementKind::Grid { columns: 4 });
        assert!(matches!(
            tree.set_property("g", "gridColumns", &json!("many")),
            Err(Error::InvalidValue(_, _))
        ));
        tree.set_property("bg", "overlayOpacity", &json!(7)).unwrap();
        assert_eq!(
            tree.find("bg").unwrap().kind.backdrop().unwrap().overlay_opacity,
            1.0
        );
    }

    #[test]
    fn test_tag_must_suit_the_type() {
        let mut tree = sample();
        let heading = tree.insert_new(&ElementType::Heading, "root", None).unwrap();
        let before = tree.clone();
        for (id, tag) in [
            ("a", "script"),
            ("a", "iframe"),
            ("a", "textarea"),
            (heading.as_str(), "div"),
            ("g", "style"),
            ("g", "object"),
        ] {
            assert!(
                matches!(
                    tree.set_property(id, "tag", &json!(tag)),
                    Err(Error::InvalidValue(_, _))
                ),
                "{tag} on {id}"
            );
        }
        assert_eq!(tree, before);

        assert!(tree.set_property(heading.as_str(), "tag", &json!("h4")).unwrap());
        assert!(tree.set_property("g", "tag", &json!("section")).unwrap());
        assert!(tree.set_property("a", "tag", &json!("span")).unwrap());
        assert!(tree.set_property("a", "tag", &Value::Null).unwrap());
        assert_eq!(tree.find("a").unwrap().tag_name(), "p");
    }

    #[test]
    fn test_grid_columns_property_is_bounded() {
        let mut tree = sample();
        let before = tree.clone();
        for columns in [json!(0), json!(7), json!(4_294_967_295u64)] {
            assert!(matches!(
                tree.set_property("g", "gridColumns", &columns),
                Err(Error::InvalidValue(_, _))
            ));
        }
        assert_eq!(tree, before);

        assert!(tree.set_property("g", "gridColumns", &json!(6)).unwrap());
        let node = tree.find("g").unwrap();
        assert_eq!(node.kind, ElementKind::Grid { columns: 6 });
        assert_eq!(node.styles.get("gridTemplateColumns"), Some("repeat(6, 1fr)"));
    }

    #[test]
    fn test_background_image_property_matches_operation() {
        let mut by_path = sample();
        let mut by_op = sample();
        assert!(by_path.set_property("bg", "backgroundImage", &json!("/hero.jpg")).unwrap());
        by_op.set_background_image("bg", "/hero.jpg").unwrap();
        assert_eq!(by_path, by_op);
        assert_eq!(
            by_path.find("bg").unwrap().styles.get("backgroundImage"),
            Some("url('/hero.jpg')")
        );
    }

    #[test]
    fn test_grid_columns_preset() {
        let mut tree = sample();
        assert!(tree.set_grid_columns("g", 3).unwrap());
        let node = tree.find("g").unwrap();
        assert_eq!(node.styles.get("gridTemplateColumns"), Some("repeat(3, 1fr)"));
        assert!(tree.set_grid_columns("g", 7).is_err());
        assert!(tree.set_grid_columns("g", 0).is_err());
        assert!(tree.set_grid_columns("a", 2).is_err());
    }

    #[test]
    fn test_background_image_mirrors_style() {
        let mut tree = sample();
        tree.set_background_image("bg", "/hero.jpg").unwrap();
        let node = tree.find("bg").unwrap();
        assert_eq!(node.styles.get("backgroundImage"), Some("url('/hero.jpg')"));
        assert_eq!(node.kind.backdrop().unwrap().image, "/hero.jpg");

        tree.set_background_image("bg", "").unwrap();
        assert_eq!(tree.find("bg").unwrap().styles.get("backgroundImage"), None);
    }

    #[test]
    fn test_overlay_clamped() {
        let mut tree = sample();
        tree.set_overlay("bg", "#000", -2.0).unwrap();
        let backdrop = tree.find("bg").unwrap().kind.backdrop().unwrap().clone();
        assert_eq!(backdrop.overlay_color, "#000");
        assert_eq!(backdrop.overlay_opacity, 0.0);
        assert!(tree.set_overlay("a", "#000", 0.5).is_err());
    }

    #[test]
    fn test_repeater_items() {
        let mut tree = sample();
        let rep = tree
            .insert_new(&ElementType::Repeater, "root", None)
            .unwrap();
        let key = tree.key_of(rep.as_str()).unwrap();
        assert_eq!(tree.children(key).len(), 3);

        tree.add_repeater_item(rep.as_str()).unwrap();
        assert_eq!(tree.children(key).len(), 4);

        for _ in 0..3 {
            assert!(tree.remove_repeater_item(rep.as_str(), 0).unwrap());
        }
        assert!(!tree.remove_repeater_item(rep.as_str(), 0).unwrap());
        assert_eq!(tree.children(key).len(), 1);
        assert!(!tree.remove_repeater_item(rep.as_str(), 9).unwrap());
    }

    #[test]
    fn test_repeater_layout_rewrites_styles() {
        let mut tree = sample();
        let rep = tree
            .insert_new(&ElementType::Repeater, "root", None)
            .unwrap();
        assert!(tree.set_repeater_layout(rep.as_str(), ItemLayout::Grid, 3).unwrap());
        let node = tree.find(rep.as_str()).unwrap();
        assert_eq!(node.styles.get("display"), Some("grid"));
        assert_eq!(node.styles.get("gridTemplateColumns"), Some("repeat(3, 1fr)"));
        assert_eq!(node.styles.get("flexDirection"), None);

        tree.set_repeater_layout(rep.as_str(), ItemLayout::List, 1).unwrap();
        let node = tree.find(rep.as_str()).unwrap();
        assert_eq!(node.styles.get("flexDirection"), Some("column"));
        assert_eq!(node.styles.get("gridTemplateColumns"), None);
    }
}
