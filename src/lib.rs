//! # blockcanvas
//!
//! The model behind a block-based visual description builder: an element
//! tree of headings, text, images, buttons and layout containers, plus
//! everything needed to edit it.
//!
//! ## Features
//!
//! - Load and save block documents as JSON, preserving unknown fields
//! - Render the editor canvas with selection, drop zones and resize handles
//! - Flatten the tree into the layer panel outline
//! - Structural edits, property edits and presets with undo/redo
//! - Export clean, sanitized HTML with template variables
//!
//! ## Quick Start
//!
//! ```
//! use blockcanvas::{Command, Editor};
//! use blockcanvas::export::ExportConfig;
//! use blockcanvas::tree::ElementType;
//!
//! let mut editor = Editor::default();
//! editor.apply(Command::AddElement {
//!     element_type: ElementType::Heading,
//!     parent: None,
//!     index: None,
//! })?;
//!
//! let canvas = editor.render();
//! assert_eq!(canvas.placements.len(), 2);
//!
//! let layers = editor.layers();
//! assert_eq!(layers[1].depth, 1);
//!
//! let html = editor.export_html(ExportConfig::default());
//! assert!(html.starts_with("<h2"));
//! # Ok::<(), blockcanvas::Error>(())
//! ```
//!
//! ## Working with Documents
//!
//! [`Document`] wraps the [`ElementTree`](tree::ElementTree) with its
//! template variables and metadata:
//!
//! ```no_run
//! use blockcanvas::Document;
//!
//! let mut doc = Document::open("block.json")?;
//! let heading = doc.tree.root_node().id.clone();
//! doc.tree.add_class(heading.as_str(), "pd-intro")?;
//! doc.save("block.json")?;
//! # Ok::<(), blockcanvas::Error>(())
//! ```

pub mod document;
pub mod edit;
pub mod editor;
pub mod error;
pub mod export;
pub mod layers;
pub mod render;
pub mod tree;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use document::{Document, ElementRecord, TemplateVariable};
pub use edit::ResizeHandle;
pub use editor::{Command, Editor, History};
pub use error::{Error, Result};
pub use export::{ExportConfig, HtmlExporter};
pub use layers::{LayerEntry, LayerOptions, layer_list, layer_list_with};
pub use render::{CanvasConfig, CanvasOutput, CanvasRenderer, render_canvas};
pub use tree::{ElementId, ElementKind, ElementNode, ElementTree, ElementType};
