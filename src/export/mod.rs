//! Clean HTML export for publishing a block.
//!
//! Unlike the canvas renderer, the exporter emits only the content itself:
//! no editor wrappers, badges or drop zones, and no root wrapper. Hidden
//! elements are left out entirely.
//!
//! # Example
//!
//! ```
//! use blockcanvas::Document;
//! use blockcanvas::export::{ExportConfig, HtmlExporter};
//!
//! let json = r#"{
//!     "root": {"id": "root", "type": "container", "children": [
//!         {"id": "h", "type": "heading", "content": "Hello {{name}}"}
//!     ]},
//!     "variables": [{"name": "name", "defaultValue": "world"}]
//! }"#;
//! let doc = Document::from_json(json).unwrap();
//!
//! let html = HtmlExporter::new().export(&doc);
//! assert_eq!(html, "<h2>Hello world</h2>\n");
//!
//! let mut config = ExportConfig::default();
//! config.variables.insert("name".to_string(), "Ada".to_string());
//! assert_eq!(HtmlExporter::with_config(config).export(&doc), "<h2>Hello Ada</h2>\n");
//! ```

use std::collections::BTreeMap;

use memchr::memmem;

use crate::document::Document;
use crate::render::{Allowlist, escape_html, is_unsafe_url, sanitize, strip_tags};
use crate::tree::{ElementKind, ElementNode, ElementTree, NodeKey};

/// Configuration for HTML export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Write element styles as `style` attributes.
    pub inline_styles: bool,
    /// Collapse whitespace and drop it between tags.
    pub minify: bool,
    /// Values for `{{name}}` placeholders, overriding document defaults.
    pub variables: BTreeMap<String, String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            inline_styles: true,
            minify: false,
            variables: BTreeMap::new(),
        }
    }
}

/// Exporter producing publishable HTML from a document.
#[derive(Debug, Clone, Default)]
pub struct HtmlExporter {
    config: ExportConfig,
}

impl HtmlExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new exporter with custom configuration.
    pub fn with_config(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Export the document's content, substituting template variables.
    pub fn export(&self, doc: &Document) -> String {
        let html = self.export_tree(&doc.tree);
        let html = substitute_variables(&html, |name| {
            self.config
                .variables
                .get(name)
                .map(String::as_str)
                .or_else(|| doc.variable_default(name))
        });
        if self.config.minify {
            minify_html(&html)
        } else {
            html
        }
    }

    /// Export a bare tree. Placeholders are left as written.
    pub fn export_tree(&self, tree: &ElementTree) -> String {
        let mut ctx = ExportContext {
            out: String::new(),
            tree,
            config: &self.config,
            indent_level: 0,
        };
        // The root is the editor's block wrapper, not content
        for &child in tree.children(NodeKey::ROOT) {
            walk_node(child, &mut ctx);
        }
        ctx.out
    }
}

struct ExportContext<'a> {
    out: String,
    tree: &'a ElementTree,
    config: &'a ExportConfig,
    indent_level: usize,
}

impl ExportContext<'_> {
    fn indent(&mut self) {
        for _ in 0..self.indent_level {
            self.out.push_str("  ");
        }
    }

    fn line(&mut self, markup: &str) {
        self.indent();
        self.out.push_str(markup);
        self.out.push('\n');
    }
}

fn walk_node(key: NodeKey, ctx: &mut ExportContext) {
    let tree = ctx.tree;
    let Some(node) = tree.get(key) else {
        return;
    };
    if !node.visible {
        return;
    }

    let tag = node.tag_name();
    match &node.kind {
        ElementKind::Heading { content } => {
            let attrs = build_attrs(node, &[], ctx.config);
            ctx.line(&format!(
                "<{tag}{attrs}>{}</{tag}>",
                sanitize(content, Allowlist::Inline)
            ));
        }
        ElementKind::Text { content } => {
            let attrs = build_attrs(node, &[], ctx.config);
            ctx.line(&format!(
                "<{tag}{attrs}>{}</{tag}>",
                sanitize(content, Allowlist::Body)
            ));
        }
        ElementKind::Image(img) => {
            let mut markup = format!(
                "<img src=\"{}\" alt=\"{}\"",
                escape_html(&img.src),
                escape_html(&img.alt)
            );
            for (name, value) in [
                ("srcset", &img.srcset),
                ("sizes", &img.sizes),
                ("width", &img.width),
                ("height", &img.height),
            ] {
                if !value.is_empty() {
                    markup.push_str(&format!(" {name}=\"{}\"", escape_html(value)));
                }
            }
            markup.push_str(" loading=\"lazy\"");
            markup.push_str(&build_attrs(node, &[], ctx.config));
            markup.push('>');
            ctx.line(&markup);
        }
        ElementKind::Source(src) => {
            if src.srcset.is_empty() {
                return;
            }
            let mut markup = format!("<source srcset=\"{}\"", escape_html(&src.srcset));
            for (name, value) in [
                ("sizes", &src.sizes),
                ("media", &src.media),
                ("type", &src.mime_type),
            ] {
                if !value.is_empty() {
                    markup.push_str(&format!(" {name}=\"{}\"", escape_html(value)));
                }
            }
            markup.push('>');
            ctx.line(&markup);
        }
        ElementKind::Icon { icon_class } => {
            let fallback = if icon_class.is_empty() {
                "pd-icon--check"
            } else {
                icon_class.as_str()
            };
            let mut extra = Vec::new();
            if !node.classes.iter().any(|c| c.starts_with("pd-icon--")) {
                extra.push(fallback);
            }
            let attrs = build_attrs(node, &extra, ctx.config);
            ctx.line(&format!("<span{attrs}></span>"));
        }
        ElementKind::Button {
            content,
            href,
            variant,
            ..
        } => {
            let href = if href.is_empty() || is_unsafe_url(href) {
                "#"
            } else {
                href.as_str()
            };
            let label = strip_tags(content);
            let label = if label.trim().is_empty() {
                "Button".to_string()
            } else {
                label
            };
            let variant_class = format!("btn-{}", variant.as_deref().unwrap_or("primary"));
            let mut extra = Vec::new();
            if !node.classes.contains("btn") {
                extra.extend(["btn", variant_class.as_str()]);
            }
            let attrs = build_attrs(node, &extra, ctx.config);
            ctx.line(&format!("<a href=\"{}\"{attrs}>{label}</a>", escape_html(href)));
        }
        ElementKind::Separator => {
            let attrs = build_attrs(node, &[], ctx.config);
            ctx.line(&format!("<hr{attrs}>"));
        }
        ElementKind::RawHtml { content } => {
            if !content.is_empty() {
                ctx.out.push_str(content);
                if !content.ends_with('\n') {
                    ctx.out.push('\n');
                }
            }
        }
        ElementKind::Other { content, .. } if tree.children(key).is_empty() => {
            let attrs = build_attrs(node, &[], ctx.config);
            ctx.line(&format!("<{tag}{attrs}>{}</{tag}>", escape_html(content)));
        }
        // Containers, grids, backgrounds, slides, pictures and repeaters
        _ => {
            let attrs = build_attrs(node, &[], ctx.config);
            let children = tree.children(key);
            if !children.iter().any(|&c| tree.get(c).is_some_and(|n| n.visible)) {
                ctx.line(&format!("<{tag}{attrs}></{tag}>"));
                return;
            }
            ctx.line(&format!("<{tag}{attrs}>"));
            ctx.indent_level += 1;
            for &child in children {
                walk_node(child, ctx);
            }
            ctx.indent_level -= 1;
            ctx.line(&format!("</{tag}>"));
        }
    }
}

/// `class` and (if enabled) `style` attributes; empty ones are omitted.
fn build_attrs(node: &ElementNode, extra_classes: &[&str], config: &ExportConfig) -> String {
    let mut classes: Vec<&str> = node.classes.iter().collect();
    for &class in extra_classes {
        if !classes.contains(&class) {
            classes.push(class);
        }
    }
    let mut attrs = String::new();
    if !classes.is_empty() {
        attrs.push_str(&format!(" class=\"{}\"", escape_html(&classes.join(" "))));
    }
    if config.inline_styles {
        let css = node.styles.to_css();
        if !css.is_empty() {
            attrs.push_str(&format!(" style=\"{}\"", escape_html(&css)));
        }
    }
    attrs
}

/// Replace `{{name}}` placeholders with escaped values from `lookup`.
///
/// Placeholders with an unknown or malformed name are kept as written.
pub fn substitute_variables<'a>(html: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let open = memmem::Finder::new(b"{{");
    let bytes = html.as_bytes();
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(offset) = open.find(&bytes[pos..]) {
        let start = pos + offset;
        let name_start = start + 2;
        let Some(len) = memmem::find(&bytes[name_start..], b"}}") else {
            break;
        };
        let name = &html[name_start..name_start + len];
        out.push_str(&html[pos..start]);

        if is_variable_name(name)
            && let Some(value) = lookup(name)
        {
            out.push_str(&escape_html(value));
            pos = name_start + len + 2;
        } else {
            // Rescan from just after the braces: `{{{{x}}` still finds `{{x}}`
            out.push_str("{{");
            pos = name_start;
        }
    }

    out.push_str(&html[pos..]);
    out
}

fn is_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Collapse whitespace runs to one space, drop whitespace between tags and
/// at either end.
pub fn minify_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pending_space = false;
    for c in html.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() && !(out.ends_with('>') && c == '<') {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}
