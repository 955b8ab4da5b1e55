//! Editor canvas renderer.
//!
//! Walks the element tree and emits the HTML shown on the builder canvas:
//! every visible element wrapped in a selectable node carrying its id, type
//! and depth, composite elements with drop zones between their children,
//! and the selected element with its toolbar and resize handles.
//!
//! # Example
//!
//! ```
//! use blockcanvas::Document;
//! use blockcanvas::render::CanvasRenderer;
//!
//! let doc = Document::new();
//! let output = CanvasRenderer::new().render(&doc.tree, None);
//! assert_eq!(output.placements.len(), 1);
//! assert!(output.html.contains("data-depth=\"0\""));
//! ```

pub mod sanitize;

pub use sanitize::{Allowlist, escape_html, is_unsafe_url, plain_text, sanitize, strip_tags};

use serde::Serialize;

use crate::tree::{
    Backdrop, ElementId, ElementKind, ElementNode, ElementTree, MAX_GRID_COLUMNS, NodeKey,
};

/// Configuration for canvas rendering.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Indent output, one element per line.
    pub pretty: bool,
    /// Emit the element type badge on every element.
    pub badges: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            badges: true,
        }
    }
}

/// One element drawn by the renderer, with the depth it was drawn at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub id: ElementId,
    pub depth: usize,
}

/// Result of rendering a tree onto the canvas.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CanvasOutput {
    pub html: String,
    /// Drawn elements in document order.
    pub placements: Vec<Placement>,
}

/// Renderer for the editor canvas.
#[derive(Debug, Clone, Default)]
pub struct CanvasRenderer {
    config: CanvasConfig,
}

impl CanvasRenderer {
    /// Create a CanvasRenderer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a CanvasRenderer with the specified configuration.
    pub fn with_config(config: CanvasConfig) -> Self {
        Self { config }
    }

    /// Render the whole tree, marking `selected` if it is drawn.
    ///
    /// Never fails: unknown types, missing attributes and malformed markup
    /// all degrade to something drawable.
    pub fn render(&self, tree: &ElementTree, selected: Option<&str>) -> CanvasOutput {
        let mut ctx = CanvasContext {
            out: String::new(),
            placements: Vec::new(),
            tree,
            selected,
            config: &self.config,
            indent_level: 0,
        };
        render_element(NodeKey::ROOT, 0, &mut ctx);
        CanvasOutput {
            html: ctx.out,
            placements: ctx.placements,
        }
    }
}

/// Render `tree` with the default configuration.
pub fn render_canvas(tree: &ElementTree, selected: Option<&str>) -> CanvasOutput {
    CanvasRenderer::new().render(tree, selected)
}

struct CanvasContext<'a> {
    out: String,
    placements: Vec<Placement>,
    tree: &'a ElementTree,
    selected: Option<&'a str>,
    config: &'a CanvasConfig,
    indent_level: usize,
}

impl CanvasContext<'_> {
    /// Write one line of markup at the current indentation.
    fn line(&mut self, markup: &str) {
        if self.config.pretty {
            for _ in 0..self.indent_level {
                self.out.push_str("  ");
            }
            self.out.push_str(markup);
            self.out.push('\n');
        } else {
            self.out.push_str(markup);
        }
    }

    fn open(&mut self, markup: &str) {
        self.line(markup);
        self.indent_level += 1;
    }

    fn close(&mut self, markup: &str) {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.line(markup);
    }
}

/// Draw one element and, for composite types, its subtree.
fn render_element(key: NodeKey, depth: usize, ctx: &mut CanvasContext) {
    let tree = ctx.tree;
    let Some(node) = tree.get(key) else {
        return;
    };
    if !node.visible {
        return;
    }

    ctx.placements.push(Placement {
        id: node.id.clone(),
        depth,
    });

    let id = escape_html(node.id.as_str());
    let element_type = node.element_type();
    let is_selected = ctx.selected == Some(node.id.as_str());
    let is_container = element_type.is_composite();

    let mut wrapper_class = String::from("element-node");
    if is_selected {
        wrapper_class.push_str(" is-selected");
    }
    if node.locked {
        wrapper_class.push_str(" is-locked");
    }
    let draggable = if node.locked { "" } else { " draggable=\"true\"" };
    ctx.open(&format!(
        "<div class=\"{wrapper_class}\" data-element-id=\"{id}\" data-element-type=\"{}\" data-depth=\"{depth}\" data-is-container=\"{is_container}\"{draggable}>",
        escape_html(element_type.as_str()),
    ));

    if ctx.config.badges {
        ctx.line(&format!(
            "<div class=\"element-badge\">{}</div>",
            escape_html(&element_type.label())
        ));
    }

    let editable = is_selected && !node.locked;
    if editable {
        render_toolbar(&id, ctx);
    }

    render_body(key, node, depth, ctx);

    if editable && element_type.is_resizable() {
        ctx.open("<div class=\"resize-handles\">");
        for handle in ["e", "s", "se"] {
            ctx.line(&format!(
                "<div class=\"resize-handle resize-handle--{handle}\" data-handle=\"{handle}\" data-element-id=\"{id}\"></div>"
            ));
        }
        ctx.close("</div>");
    }

    ctx.close("</div>");
}

fn render_toolbar(id: &str, ctx: &mut CanvasContext) {
    ctx.open("<div class=\"element-actions\">");
    for (action, title) in [
        ("moveUp", "Move up"),
        ("moveDown", "Move down"),
        ("duplicate", "Duplicate"),
        ("delete", "Delete"),
    ] {
        ctx.line(&format!(
            "<button type=\"button\" data-action=\"{action}\" data-element-id=\"{id}\" title=\"{title}\"></button>"
        ));
    }
    ctx.close("</div>");
}

/// `class` and `style` attributes, each omitted when empty.
fn presentation_attrs(node: &ElementNode, extra_classes: &[&str]) -> String {
    let mut classes: Vec<&str> = node.classes.iter().collect();
    for &class in extra_classes {
        if !classes.contains(&class) {
            classes.push(class);
        }
    }
    let mut attrs = String::new();
    if !classes.is_empty() {
        attrs.push_str(" class=\"");
        attrs.push_str(&escape_html(&classes.join(" ")));
        attrs.push('"');
    }
    let css = node.styles.to_css();
    if !css.is_empty() {
        attrs.push_str(" style=\"");
        attrs.push_str(&escape_html(&css));
        attrs.push('"');
    }
    attrs
}

/// ` name="value"` for non-empty values, nothing otherwise.
fn optional_attr(name: &str, value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!(" {name}=\"{}\"", escape_html(value))
    }
}

fn render_body(key: NodeKey, node: &ElementNode, depth: usize, ctx: &mut CanvasContext) {
    let tree = ctx.tree;
    let tag = node.tag_name();
    match &node.kind {
        ElementKind::Heading { content } | ElementKind::Text { content } => {
            let (allow, placeholder) = match node.kind {
                ElementKind::Heading { .. } => (Allowlist::Inline, "Heading"),
                _ => (Allowlist::Body, "Text"),
            };
            let body = if content.trim().is_empty() {
                format!("<span class=\"canvas-placeholder\">{placeholder}</span>")
            } else {
                sanitize(content, allow)
            };
            ctx.line(&format!(
                "<{tag}{}>{body}</{tag}>",
                presentation_attrs(node, &["wysiwyg-content"])
            ));
        }
        ElementKind::Image(img) => {
            if img.src.is_empty() {
                ctx.open(&format!(
                    "<div{} data-placeholder=\"image\">",
                    presentation_attrs(node, &["image-placeholder"])
                ));
                ctx.line("<p class=\"canvas-placeholder\">Click to add an image</p>");
                ctx.close("</div>");
            } else {
                ctx.line(&format!(
                    "<img{}{}{}{}{}{}{}>",
                    optional_attr("src", &img.src),
                    optional_attr("alt", &img.alt),
                    optional_attr("srcset", &img.srcset),
                    optional_attr("sizes", &img.sizes),
                    optional_attr("width", &img.width),
                    optional_attr("height", &img.height),
                    presentation_attrs(node, &[]),
                ));
            }
        }
        ElementKind::Picture => {
            ctx.open(&format!("<picture{}>", presentation_attrs(node, &[])));
            for &child in tree.children(key) {
                render_element(child, depth + 1, ctx);
            }
            ctx.close("</picture>");
        }
        ElementKind::Source(src) => {
            if !src.srcset.is_empty() {
                ctx.line(&format!(
                    "<source{}{}{}{}>",
                    optional_attr("srcset", &src.srcset),
                    optional_attr("sizes", &src.sizes),
                    optional_attr("media", &src.media),
                    optional_attr("type", &src.mime_type),
                ));
            }
        }
        ElementKind::Icon { icon_class } => {
            let icon_class = if icon_class.is_empty() {
                "pd-icon--check"
            } else {
                icon_class.as_str()
            };
            ctx.line(&format!(
                "<span{}></span>",
                presentation_attrs(node, &[icon_class])
            ));
        }
        ElementKind::Button { content, href, .. } => {
            let label = strip_tags(content);
            let label = if label.trim().is_empty() {
                "Button".to_string()
            } else {
                label
            };
            let href = if href.is_empty() || is_unsafe_url(href) {
                "#"
            } else {
                href.as_str()
            };
            ctx.line(&format!(
                "<a href=\"{}\"{}>{label}</a>",
                escape_html(href),
                presentation_attrs(node, &[])
            ));
        }
        ElementKind::Separator => {
            ctx.line(&format!("<hr{}>", presentation_attrs(node, &[])));
        }
        ElementKind::Container | ElementKind::Row | ElementKind::Column => {
            open_drop_container(node, tag, &[], ctx);
            render_children(key, node, depth, ctx, "Drag elements here");
            ctx.close(&format!("</{tag}>"));
        }
        ElementKind::Grid { columns } => {
            open_drop_container(node, tag, &[], ctx);
            if has_visible_children(tree, key) {
                render_children(key, node, depth, ctx, "");
            } else {
                render_drop_zone(&node.id, 0, ctx);
                for column in 1..=(*columns).clamp(1, MAX_GRID_COLUMNS) {
                    ctx.line(&format!(
                        "<div class=\"grid-placeholder\"><span>Column {column}</span></div>"
                    ));
                }
            }
            ctx.close(&format!("</{tag}>"));
        }
        ElementKind::Background(backdrop) => {
            render_layered(key, node, depth, backdrop, None, ctx);
        }
        ElementKind::Slide { backdrop, index } => {
            render_layered(key, node, depth, backdrop, Some(*index), ctx);
        }
        ElementKind::Repeater { .. } => {
            open_drop_container(node, tag, &[], ctx);
            let items = tree.children(key);
            let mut drawn = false;
            for (index, &item) in items.iter().enumerate() {
                if !tree.get(item).is_some_and(|n| n.visible) {
                    continue;
                }
                drawn = true;
                render_drop_zone(&node.id, index, ctx);
                ctx.open("<div class=\"repeater-item\">");
                ctx.line(&format!(
                    "<div class=\"repeater-index\">{}</div>",
                    index + 1
                ));
                render_element(item, depth + 1, ctx);
                ctx.close("</div>");
            }
            render_drop_zone(&node.id, items.len(), ctx);
            if !drawn {
                ctx.line("<div class=\"canvas-empty\"><span>Add items to the list</span></div>");
            }
            ctx.close(&format!("</{tag}>"));
        }
        ElementKind::RawHtml { content } => {
            ctx.open(&format!("<{tag}{}>", presentation_attrs(node, &[])));
            ctx.line(content);
            ctx.close(&format!("</{tag}>"));
        }
        ElementKind::Other { content, .. } => {
            open_drop_container(node, tag, &[], ctx);
            if has_visible_children(tree, key) {
                render_children(key, node, depth, ctx, "");
            } else {
                render_drop_zone(&node.id, tree.children(key).len(), ctx);
                if !content.is_empty() {
                    ctx.line(&escape_html(content));
                }
            }
            ctx.close(&format!("</{tag}>"));
        }
    }
}

fn has_visible_children(tree: &ElementTree, key: NodeKey) -> bool {
    tree.child_nodes(key).any(|n| n.visible)
}

fn open_drop_container(node: &ElementNode, tag: &str, extra: &[&str], ctx: &mut CanvasContext) {
    let mut classes = vec!["drop-container"];
    classes.extend_from_slice(extra);
    ctx.open(&format!(
        "<{tag}{} data-drop-target=\"{}\">",
        presentation_attrs(node, &classes),
        escape_html(node.id.as_str())
    ));
}

/// Insertion point `index` of `target`'s child sequence.
fn render_drop_zone(target: &ElementId, index: usize, ctx: &mut CanvasContext) {
    ctx.line(&format!(
        "<div class=\"drop-zone\" data-drop-target=\"{}\" data-drop-position=\"{index}\"></div>",
        escape_html(target.as_str())
    ));
}

/// Children at `depth + 1` with a drop zone before each and one after the
/// last. Zone indices are positions in the full sequence, hidden children
/// included.
fn render_children(
    key: NodeKey,
    node: &ElementNode,
    depth: usize,
    ctx: &mut CanvasContext,
    empty_label: &str,
) {
    let tree = ctx.tree;
    let children = tree.children(key);
    let mut drawn = false;
    for (index, &child) in children.iter().enumerate() {
        if !tree.get(child).is_some_and(|n| n.visible) {
            continue;
        }
        drawn = true;
        render_drop_zone(&node.id, index, ctx);
        render_element(child, depth + 1, ctx);
    }
    render_drop_zone(&node.id, children.len(), ctx);
    if !drawn && !empty_label.is_empty() {
        ctx.line(&format!(
            "<div class=\"canvas-empty\"><span>{empty_label}</span></div>"
        ));
    }
}

/// Background and slide: an overlay layer under a separate content layer.
fn render_layered(
    key: NodeKey,
    node: &ElementNode,
    depth: usize,
    backdrop: &Backdrop,
    slide_index: Option<u32>,
    ctx: &mut CanvasContext,
) {
    let tag = node.tag_name();
    open_drop_container(node, tag, &["relative", "overflow-hidden"], ctx);

    if let Some(index) = slide_index {
        ctx.line(&format!(
            "<div class=\"slide-badge\">Slide {}</div>",
            u64::from(index) + 1
        ));
    }
    if backdrop.has_overlay() {
        ctx.line(&format!(
            "<div class=\"canvas-overlay\" style=\"background-color: {}; opacity: {}\"></div>",
            escape_html(&backdrop.overlay_color),
            backdrop.overlay_opacity.clamp(0.0, 1.0)
        ));
    }

    ctx.open("<div class=\"canvas-content\">");
    let empty_label = match (slide_index, backdrop.image.is_empty()) {
        (Some(_), true) => "Add content or set a background",
        (None, true) => "Section with background",
        (_, false) => "Drag elements here",
    };
    render_children(key, node, depth, ctx, empty_label);
    ctx.close("</div>");

    ctx.close(&format!("</{tag}>"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ElementType, ImageAttrs};

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
        tree.append_child(row, text("a", "Hello")).unwrap();
        tree.append_child(NodeKey::ROOT, text("b", "<script>x()</script>World"))
            .unwrap();
        tree
    }

    #[test]
    fn test_placements_follow_document_order() {
        let output = render_canvas(&sample(), None);
        let placed: Vec<_> = output
            .placements
            .iter()
            .map(|p| (p.id.as_str(), p.depth))
            .collect();
        assert_eq!(placed, vec![("root", 0), ("row", 1), ("a", 2), ("b", 1)]);
    }

    #[test]
    fn test_wrapper_attributes() {
        let html = render_canvas(&sample(), None).html;
        assert!(html.contains(
            "data-element-id=\"a\" data-element-type=\"text\" data-depth=\"2\" data-is-container=\"false\" draggable=\"true\""
        ));
        assert!(html.contains("data-element-id=\"row\" data-element-type=\"row\" data-depth=\"1\" data-is-container=\"true\""));
    }

    #[test]
    fn test_text_is_sanitized() {
        let html = render_canvas(&sample(), None).html;
        assert!(html.contains(">World</p>"));
        assert!(!html.contains("script"));
    }

    #[test]
    fn test_drop_zones_cover_every_position() {
        let html = render_canvas(&sample(), None).html;
        for pos in 0..=2 {
            assert!(html.contains(&format!(
                "data-drop-target=\"root\" data-drop-position=\"{pos}\""
            )));
        }
        assert!(!html.contains("data-drop-target=\"root\" data-drop-position=\"3\""));
    }

    #[test]
    fn test_hidden_subtree_is_skipped() {
        let mut tree = sample();
        let row = tree.key_of("row").unwrap();
        tree.get_mut(row).unwrap().visible = false;
        let output = render_canvas(&tree, None);
        assert!(!output.html.contains("data-element-id=\"a\""));
        assert_eq!(output.placements.len(), 2);
    }

    #[test]
    fn test_selection_adds_toolbar_and_handles() {
        let html = render_canvas(&sample(), Some("a")).html;
        assert!(html.contains("is-selected"));
        assert!(html.contains("data-action=\"moveUp\""));
        assert!(html.contains("data-handle=\"se\""));

        // Rows size themselves
        let html = render_canvas(&sample(), Some("row")).html;
        assert!(html.contains("data-action=\"delete\""));
        assert!(!html.contains("data-handle"));
    }

    #[test]
    fn test_locked_element_has_no_affordances() {
        let mut tree = sample();
        tree.find_mut("a").unwrap().locked = true;
        let html = render_canvas(&tree, Some("a")).html;
        assert!(html.contains("is-locked"));
        assert!(!html.contains("data-action"));
        assert!(!html.contains("data-element-id=\"a\" data-element-type=\"text\" data-depth=\"2\" data-is-container=\"false\" draggable"));
    }

    #[test]
    fn test_image_placeholder_and_attributes() {
        let mut tree = ElementTree::new(ElementNode::new("root", ElementKind::Container));
        tree.append_child(
            NodeKey::ROOT,
            ElementNode::new("empty", ElementKind::Image(ImageAttrs::default())),
        )
        .unwrap();
        tree.append_child(
            NodeKey::ROOT,
            ElementNode::new(
                "img",
                ElementKind::Image(ImageAttrs {
                    src: "/a.jpg".to_string(),
                    width: "640".to_string(),
                    ..Default::default()
                }),
            ),
        )
        .unwrap();
        let html = render_canvas(&tree, None).html;
        assert!(html.contains("data-placeholder=\"image\""));
        assert!(html.contains("<img src=\"/a.jpg\" width=\"640\">"));
        assert!(!html.contains("alt=\"\""));
    }

    #[test]
    fn test_empty_grid_renders_column_placeholders() {
        let mut tree = ElementTree::new(ElementNode::new("root", ElementKind::Container));
        tree.append_child(NodeKey::ROOT, ElementNode::new("g", ElementKind::Grid { columns: 3 }))
            .unwrap();
        let html = render_canvas(&tree, None).html;
        assert_eq!(html.matches("grid-placeholder").count(), 3);
    }

    #[test]
    fn test_oversized_grid_placeholders_are_capped() {
        let mut tree = ElementTree::new(ElementNode::new("root", ElementKind::Container));
        tree.append_child(
            NodeKey::ROOT,
            ElementNode::new("g", ElementKind::Grid { columns: u32::MAX }),
        )
        .unwrap();
        let html = render_canvas(&tree, None).html;
        assert_eq!(
            html.matches("grid-placeholder").count(),
            MAX_GRID_COLUMNS as usize
        );
    }

    #[test]
    fn test_disallowed_tag_falls_back_to_type_default() {
        let mut tree = ElementTree::new(ElementNode::new("root", ElementKind::Container));
        let mut node = text("t", "alert(document.cookie)");
        node.tag = Some("script".to_string());
        tree.append_child(NodeKey::ROOT, node).unwrap();
        tree.find_mut("root").unwrap().tag = Some("iframe".to_string());

        let html = render_canvas(&tree, None).html;
        assert!(!html.contains("<script"));
        assert!(!html.contains("<iframe"));
        assert!(html.contains("alert(document.cookie)</p>"));
    }

    #[test]
    fn test_overlay_and_content_layers() {
        let mut tree = ElementTree::new(ElementNode::new(
            "bg",
            ElementKind::Background(Backdrop::new("#112233", 0.4)),
        ));
        tree.append_child(NodeKey::ROOT, text("t", "Inside")).unwrap();
        let html = render_canvas(&tree, None).html;
        let overlay = html.find("canvas-overlay").unwrap();
        let content = html.find("canvas-content").unwrap();
        let child = html.find("data-element-id=\"t\"").unwrap();
        assert!(overlay < content && content < child);
        assert!(html.contains("background-color: #112233; opacity: 0.4"));
    }

    #[test]
    fn test_repeater_badges_are_one_based() {
        let mut tree = ElementTree::new(ElementNode::new(
            "r",
            ElementKind::default_for(&ElementType::Repeater),
        ));
        tree.append_child(NodeKey::ROOT, text("i1", "One")).unwrap();
        tree.append_child(NodeKey::ROOT, text("i2", "Two")).unwrap();
        let output = render_canvas(&tree, None);
        assert!(output.html.contains("<div class=\"repeater-index\">1</div>"));
        assert!(output.html.contains("<div class=\"repeater-index\">2</div>"));
        assert_eq!(output.placements[1].depth, 1);
    }

    #[test]
    fn test_button_label_is_plain_text() {
        let mut tree = ElementTree::new(ElementNode::new("root", ElementKind::Container));
        tree.append_child(
            NodeKey::ROOT,
            ElementNode::new(
                "btn",
                ElementKind::Button {
                    content: "<b>Buy</b> & go".to_string(),
                    href: "javascript:alert(1)".to_string(),
                    variant: None,
                    size: None,
                },
            ),
        )
        .unwrap();
        let html = render_canvas(&tree, None).html;
        assert!(html.contains("<a href=\"#\">Buy &amp; go</a>"));
    }

    #[test]
    fn test_unknown_type_renders_content() {
        let tree = ElementTree::new(ElementNode::new(
            "x",
            ElementKind::Other {
                type_name: "testimonial".to_string(),
                content: "Great <product>".to_string(),
            },
        ));
        let html = render_canvas(&tree, None).html;
        assert!(html.contains("Great &lt;product&gt;"));
        assert!(html.contains("data-element-type=\"testimonial\""));
    }

    #[test]
    fn test_compact_output_has_no_newlines() {
        let renderer = CanvasRenderer::with_config(CanvasConfig {
            pretty: false,
            badges: false,
        });
        let html = renderer.render(&sample(), None).html;
        assert!(!html.contains('\n'));
        assert!(!html.contains("element-badge"));
    }
}
