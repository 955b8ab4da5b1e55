//! WASM bindings for the browser-side builder.
//!
//! Every function takes and returns JSON strings so the builder UI can keep
//! its document in plain JavaScript objects.

use wasm_bindgen::prelude::*;

use crate::export::{ExportConfig, HtmlExporter};
use crate::{Command, Document, Editor, layer_list, render_canvas};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Render the editor canvas.
///
/// Returns `{"html": ..., "placements": [{"id", "depth"}, ...]}`.
#[wasm_bindgen(js_name = renderCanvas)]
pub fn render_canvas_json(document: &str, selected: Option<String>) -> Result<String, JsValue> {
    let doc = Document::from_json(document).map_err(js_error)?;
    let output = render_canvas(&doc.tree, selected.as_deref());
    serde_json::to_string(&output).map_err(js_error)
}

/// Flatten the document into layer panel entries (JSON array).
#[wasm_bindgen(js_name = layerList)]
pub fn layer_list_json(document: &str, selected: Option<String>) -> Result<String, JsValue> {
    let doc = Document::from_json(document).map_err(js_error)?;
    serde_json::to_string(&layer_list(&doc.tree, selected.as_deref())).map_err(js_error)
}

/// Export publishable HTML.
///
/// `variables` is an optional JSON object of placeholder values.
#[wasm_bindgen(js_name = exportHtml)]
pub fn export_html(
    document: &str,
    variables: Option<String>,
    minify: bool,
) -> Result<String, JsValue> {
    let doc = Document::from_json(document).map_err(js_error)?;
    let variables = match variables {
        Some(json) => serde_json::from_str(&json).map_err(js_error)?,
        None => Default::default(),
    };
    let config = ExportConfig {
        minify,
        variables,
        ..Default::default()
    };
    Ok(HtmlExporter::with_config(config).export(&doc))
}

/// Apply a JSON array of commands and return the updated document.
#[wasm_bindgen(js_name = applyCommands)]
pub fn apply_commands(document: &str, commands: &str) -> Result<String, JsValue> {
    let doc = Document::from_json(document).map_err(js_error)?;
    let script = Command::parse_script(commands).map_err(js_error)?;
    let mut editor = Editor::new(doc);
    editor.apply_all(script).map_err(js_error)?;
    editor.into_document().to_json().map_err(js_error)
}
