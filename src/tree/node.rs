//! Element node types and kinds.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::classes::ClassList;
use super::styles::StyleMap;

/// Stable, user-visible identifier of an element (`el-1a2b3c4d`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id with any `-copy-<n>` suffix removed.
    ///
    /// Copies of copies derive their id from the original, so duplicating
    /// `a-copy-1` yields `a-copy-2` rather than `a-copy-1-copy-2`.
    pub fn copy_base(&self) -> &str {
        match self.0.rfind("-copy-") {
            Some(pos)
                if pos > 0
                    && self.0[pos + 6..].chars().all(|c| c.is_ascii_digit())
                    && self.0.len() > pos + 6 =>
            {
                &self.0[..pos]
            }
            _ => &self.0,
        }
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Arena slot of a node within an [`ElementTree`](super::ElementTree).
///
/// Keys are only meaningful for the tree that produced them and may be
/// recycled after a delete; use [`ElementId`] for anything long-lived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(pub u32);

impl NodeKey {
    /// The root node key (always 0).
    pub const ROOT: NodeKey = NodeKey(0);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The element type tag, as stored in the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementType {
    Heading,
    Text,
    Image,
    Picture,
    Source,
    Icon,
    Button,
    Separator,
    Container,
    Row,
    Column,
    Grid,
    Background,
    Repeater,
    Slide,
    RawHtml,
    /// Any type name the builder does not know. Rendered as a generic
    /// container and written back verbatim.
    Other(String),
}

impl ElementType {
    pub fn parse(name: &str) -> Self {
        match name {
            "heading" => Self::Heading,
            "text" => Self::Text,
            "image" => Self::Image,
            "picture" => Self::Picture,
            "source" => Self::Source,
            "icon" => Self::Icon,
            "button" => Self::Button,
            "separator" => Self::Separator,
            "container" => Self::Container,
            "row" => Self::Row,
            "column" => Self::Column,
            "grid" => Self::Grid,
            "background" => Self::Background,
            "repeater" => Self::Repeater,
            "slide" => Self::Slide,
            "raw-html" => Self::RawHtml,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Heading => "heading",
            Self::Text => "text",
            Self::Image => "image",
            Self::Picture => "picture",
            Self::Source => "source",
            Self::Icon => "icon",
            Self::Button => "button",
            Self::Separator => "separator",
            Self::Container => "container",
            Self::Row => "row",
            Self::Column => "column",
            Self::Grid => "grid",
            Self::Background => "background",
            Self::Repeater => "repeater",
            Self::Slide => "slide",
            Self::RawHtml => "raw-html",
            Self::Other(name) => name,
        }
    }

    /// Whether the type is defined by composing children.
    ///
    /// Only composite types accept drops, and only their sequences are
    /// descended by the renderer and the layer list.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Self::Container
                | Self::Row
                | Self::Column
                | Self::Grid
                | Self::Background
                | Self::Repeater
                | Self::Slide
                | Self::Picture
                | Self::Other(_)
        )
    }

    /// Rows and columns size themselves from their content.
    pub fn is_resizable(&self) -> bool {
        !matches!(self, Self::Row | Self::Column)
    }

    /// Human-readable badge label ("Heading", "Raw-html", ...).
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Top-level attributes the property panel may edit on this type.
    ///
    /// `styles.<key>` paths are editable on every type and are not listed.
    pub fn editable_properties(&self) -> &'static [&'static str] {
        const COMMON: &[&str] = &["tag", "visible", "locked"];
        match self {
            Self::Heading | Self::Text | Self::RawHtml => &["content", "tag", "visible", "locked"],
            Self::Button => &[
                "content",
                "href",
                "buttonVariant",
                "buttonSize",
                "tag",
                "visible",
                "locked",
            ],
            Self::Image => &[
                "src", "alt", "srcset", "sizes", "width", "height", "tag", "visible", "locked",
            ],
            Self::Source => &["srcset", "sizes", "media", "mimeType", "visible", "locked"],
            Self::Icon => &["iconClass", "tag", "visible", "locked"],
            Self::Grid => &["gridColumns", "tag", "visible", "locked"],
            Self::Background => &[
                "backgroundImage",
                "overlayColor",
                "overlayOpacity",
                "tag",
                "visible",
                "locked",
            ],
            Self::Slide => &[
                "backgroundImage",
                "overlayColor",
                "overlayOpacity",
                "slideIndex",
                "tag",
                "visible",
                "locked",
            ],
            Self::Repeater => &["itemLayout", "itemsPerRow", "tag", "visible", "locked"],
            Self::Other(_) => &["content", "tag", "visible", "locked"],
            Self::Picture
            | Self::Separator
            | Self::Container
            | Self::Row
            | Self::Column => COMMON,
        }
    }
}

/// Tags a text element may be written as.
const TEXT_TAGS: &[&str] = &[
    "p", "div", "span", "blockquote", "small", "strong", "em", "label", "figcaption",
];

/// Structural tags for composites and raw HTML blocks.
const BLOCK_TAGS: &[&str] = &[
    "div", "section", "article", "header", "footer", "main", "aside", "nav", "figure", "ul",
    "ol", "li",
];

impl ElementType {
    /// The tag written when none is stored, or the stored one is not allowed.
    pub fn default_tag(&self) -> &'static str {
        match self {
            Self::Heading => "h2",
            Self::Text => "p",
            Self::Image => "img",
            Self::Icon => "span",
            Self::Button => "a",
            Self::Separator => "hr",
            Self::Picture => "picture",
            Self::Source => "source",
            _ => "div",
        }
    }

    /// Whether an element of this type may be written as `tag`.
    ///
    /// Headings take `h1`..`h6`; every other type has a fixed allowlist
    /// that excludes script, style and embedding elements.
    pub fn accepts_tag(&self, tag: &str) -> bool {
        let allowed: &[&str] = match self {
            Self::Heading => return heading_level(tag).is_some(),
            Self::Text => TEXT_TAGS,
            Self::Image => &["img"],
            Self::Picture => &["picture"],
            Self::Source => &["source"],
            Self::Separator => &["hr"],
            Self::Icon => &["span", "i"],
            Self::Button => &["a", "button"],
            _ => BLOCK_TAGS,
        };
        allowed.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Level of an `h1`..`h6` tag.
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag.as_bytes() {
        [b'h' | b'H', level @ b'1'..=b'6'] => Some(level - b'0'),
        _ => None,
    }
}

impl From<String> for ElementType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<ElementType> for String {
    fn from(t: ElementType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of an `<img>` element. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAttrs {
    pub src: String,
    pub alt: String,
    pub srcset: String,
    pub sizes: String,
    pub width: String,
    pub height: String,
}

/// Attributes of a `<source>` element inside a picture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceAttrs {
    pub srcset: String,
    pub sizes: String,
    pub media: String,
    pub mime_type: String,
}

/// Background image plus a flat color overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Backdrop {
    pub image: String,
    pub overlay_color: String,
    /// Overlay opacity in `0.0..=1.0`.
    pub overlay_opacity: f64,
}

impl Backdrop {
    pub fn new(overlay_color: &str, overlay_opacity: f64) -> Self {
        Self {
            image: String::new(),
            overlay_color: overlay_color.to_string(),
            overlay_opacity: overlay_opacity.clamp(0.0, 1.0),
        }
    }

    pub fn has_overlay(&self) -> bool {
        !self.overlay_color.is_empty()
    }
}

/// How a repeater lays out its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemLayout {
    #[default]
    List,
    Grid,
    Carousel,
}

impl ItemLayout {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "list" => Some(Self::List),
            "grid" => Some(Self::Grid),
            "carousel" => Some(Self::Carousel),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Grid => "grid",
            Self::Carousel => "carousel",
        }
    }
}

/// Type-specific payload of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Heading { content: String },
    Text { content: String },
    Image(ImageAttrs),
    Picture,
    Source(SourceAttrs),
    Icon { icon_class: String },
    Button {
        content: String,
        href: String,
        variant: Option<String>,
        size: Option<String>,
    },
    Separator,
    Container,
    Row,
    Column,
    Grid { columns: u32 },
    Background(Backdrop),
    Repeater { layout: ItemLayout, items_per_row: u32 },
    Slide { backdrop: Backdrop, index: u32 },
    RawHtml { content: String },
    Other { type_name: String, content: String },
}

/// Grid column count used when none is stored.
pub const DEFAULT_GRID_COLUMNS: u32 = 2;

/// Largest column count a grid may have.
pub const MAX_GRID_COLUMNS: u32 = 6;

impl ElementKind {
    /// Payload with the builder's defaults for a freshly inserted element.
    pub fn default_for(element_type: &ElementType) -> Self {
        match element_type {
            ElementType::Heading => Self::Heading {
                content: "New heading".to_string(),
            },
            ElementType::Text => Self::Text {
                content: "New text. Click to edit.".to_string(),
            },
            ElementType::Image => Self::Image(ImageAttrs {
                alt: "Image".to_string(),
                ..Default::default()
            }),
            ElementType::Picture => Self::Picture,
            ElementType::Source => Self::Source(SourceAttrs::default()),
            ElementType::Icon => Self::Icon {
                icon_class: "pd-icon--check".to_string(),
            },
            ElementType::Button => Self::Button {
                content: "Button".to_string(),
                href: "#".to_string(),
                variant: None,
                size: None,
            },
            ElementType::Separator => Self::Separator,
            ElementType::Container => Self::Container,
            ElementType::Row => Self::Row,
            ElementType::Column => Self::Column,
            ElementType::Grid => Self::Grid {
                columns: DEFAULT_GRID_COLUMNS,
            },
            ElementType::Background => Self::Background(Backdrop::new("", 0.5)),
            ElementType::Repeater => Self::Repeater {
                layout: ItemLayout::List,
                items_per_row: 1,
            },
            ElementType::Slide => Self::Slide {
                backdrop: Backdrop::new("#000000", 0.3),
                index: 0,
            },
            ElementType::RawHtml => Self::RawHtml {
                content: String::new(),
            },
            ElementType::Other(name) => Self::Other {
                type_name: name.clone(),
                content: String::new(),
            },
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Heading { .. } => ElementType::Heading,
            Self::Text { .. } => ElementType::Text,
            Self::Image(_) => ElementType::Image,
            Self::Picture => ElementType::Picture,
            Self::Source(_) => ElementType::Source,
            Self::Icon { .. } => ElementType::Icon,
            Self::Button { .. } => ElementType::Button,
            Self::Separator => ElementType::Separator,
            Self::Container => ElementType::Container,
            Self::Row => ElementType::Row,
            Self::Column => ElementType::Column,
            Self::Grid { .. } => ElementType::Grid,
            Self::Background(_) => ElementType::Background,
            Self::Repeater { .. } => ElementType::Repeater,
            Self::Slide { .. } => ElementType::Slide,
            Self::RawHtml { .. } => ElementType::RawHtml,
            Self::Other { type_name, .. } => ElementType::Other(type_name.clone()),
        }
    }

    /// Scalar content, for the kinds that carry it.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Heading { content }
            | Self::Text { content }
            | Self::Button { content, .. }
            | Self::RawHtml { content }
            | Self::Other { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Heading { content }
            | Self::Text { content }
            | Self::Button { content, .. }
            | Self::RawHtml { content }
            | Self::Other { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn backdrop(&self) -> Option<&Backdrop> {
        match self {
            Self::Background(b) | Self::Slide { backdrop: b, .. } => Some(b),
            _ => None,
        }
    }

    pub fn backdrop_mut(&mut self) -> Option<&mut Backdrop> {
        match self {
            Self::Background(b) | Self::Slide { backdrop: b, .. } => Some(b),
            _ => None,
        }
    }
}

/// A single element of the content tree, without its children.
///
/// Child sequences live in the owning [`ElementTree`](super::ElementTree);
/// a repeater's sequence holds its items.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub id: ElementId,
    pub tag: Option<String>,
    pub visible: bool,
    pub locked: bool,
    pub classes: ClassList,
    pub styles: StyleMap,
    pub kind: ElementKind,
    /// Fields of the stored element this crate does not interpret.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ElementNode {
    /// Create a visible, unlocked node with no classes or styles.
    pub fn new(id: impl Into<ElementId>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            tag: None,
            visible: true,
            locked: false,
            classes: ClassList::new(),
            styles: StyleMap::new(),
            kind,
            extra: BTreeMap::new(),
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn is_composite(&self) -> bool {
        self.element_type().is_composite()
    }

    pub fn content(&self) -> Option<&str> {
        self.kind.content()
    }

    /// The HTML tag this element is written as. A stored tag the type
    /// does not accept falls back to the type's default.
    pub fn tag_name(&self) -> &str {
        let element_type = self.element_type();
        match self.tag.as_deref() {
            Some(tag) if element_type.accepts_tag(tag) => tag,
            _ => element_type.default_tag(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_roundtrips_names() {
        for name in [
            "heading", "text", "image", "picture", "source", "icon", "button", "separator",
            "container", "row", "column", "grid", "background", "repeater", "slide", "raw-html",
        ] {
            assert_eq!(ElementType::parse(name).as_str(), name);
        }
        assert_eq!(
            ElementType::parse("testimonial"),
            ElementType::Other("testimonial".to_string())
        );
    }

    #[test]
    fn test_composite_classification() {
        assert!(ElementType::Container.is_composite());
        assert!(ElementType::Picture.is_composite());
        assert!(ElementType::Other("x".into()).is_composite());
        assert!(!ElementType::Heading.is_composite());
        assert!(!ElementType::RawHtml.is_composite());
        assert!(!ElementType::Source.is_composite());
    }

    #[test]
    fn test_copy_base() {
        assert_eq!(ElementId::from("a").copy_base(), "a");
        assert_eq!(ElementId::from("a-copy-3").copy_base(), "a");
        assert_eq!(ElementId::from("a-copy-x").copy_base(), "a-copy-x");
        assert_eq!(ElementId::from("a-copy-").copy_base(), "a-copy-");
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h4"), Some(4));
        assert_eq!(heading_level("H1"), Some(1));
        assert_eq!(heading_level("h9"), None);
        assert_eq!(heading_level("h12"), None);
        assert_eq!(heading_level("div"), None);
    }

    #[test]
    fn test_tag_name_rejects_markup() {
        let mut node = ElementNode::new("t", ElementKind::default_for(&ElementType::Text));
        node.tag = Some("p onclick=x".to_string());
        assert_eq!(node.tag_name(), "p");
        node.tag = Some("span".to_string());
        assert_eq!(node.tag_name(), "span");
    }

    #[test]
    fn test_tag_name_falls_back_per_type() {
        let mut heading = ElementNode::new("h", ElementKind::default_for(&ElementType::Heading));
        heading.tag = Some("h5".to_string());
        assert_eq!(heading.tag_name(), "h5");
        heading.tag = Some("div".to_string());
        assert_eq!(heading.tag_name(), "h2");

        let mut text = ElementNode::new("t", ElementKind::default_for(&ElementType::Text));
        for tag in ["script", "style", "iframe", "object", "textarea", "section"] {
            text.tag = Some(tag.to_string());
            assert_eq!(text.tag_name(), "p", "{tag}");
        }

        let mut container = ElementNode::new("c", ElementKind::Container);
        container.tag = Some("SECTION".to_string());
        assert_eq!(container.tag_name(), "SECTION");
        container.tag = Some("script".to_string());
        assert_eq!(container.tag_name(), "div");
    }

    #[test]
    fn test_label() {
        assert_eq!(ElementType::Heading.label(), "Heading");
        assert_eq!(ElementType::RawHtml.label(), "Raw-html");
    }
}
