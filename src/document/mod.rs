//! Persisted block documents.
//!
//! A [`Document`] wraps the element tree with the metadata stored next to
//! it: a schema version, template variables and document-level classes.
//!
//! ```
//! use blockcanvas::Document;
//!
//! let doc = Document::from_json(
//!     r#"{"version":"1.0","root":{"id":"root","type":"container","children":[]}}"#,
//! )?;
//! assert_eq!(doc.tree.root_node().id.as_str(), "root");
//! # Ok::<(), blockcanvas::Error>(())
//! ```

mod record;

pub use record::ElementRecord;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::{ElementTree, new_document_root};

/// Schema version written by this crate.
pub const DOCUMENT_VERSION: &str = "1.0";

/// A `{{name}}` placeholder declared by the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: String,
    #[serde(default)]
    pub default_value: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TemplateVariable {
    pub fn new(name: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: default_value.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// A block document: the element tree plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub version: String,
    pub tree: ElementTree,
    pub variables: Vec<TemplateVariable>,
    pub css_classes: Vec<String>,
    /// Top-level fields this crate does not interpret.
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// On-disk shape of a [`Document`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFile {
    #[serde(default = "default_version")]
    version: String,
    root: Option<ElementRecord>,
    #[serde(default)]
    variables: Vec<TemplateVariable>,
    #[serde(default)]
    css_classes: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A fresh document holding only the default root block.
    pub fn new() -> Self {
        Self::with_tree(new_document_root())
    }

    pub fn with_tree(tree: ElementTree) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            tree,
            variables: Vec::new(),
            css_classes: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Parse a document from JSON.
    ///
    /// A document without a `root` gets the default root block.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DocumentFile = serde_json::from_str(json)?;
        Ok(Self::from_file(file))
    }

    /// Parse a bare element (no document wrapper) as a document.
    pub fn from_element_json(json: &str) -> Result<Self> {
        let record: ElementRecord = serde_json::from_str(json)?;
        Ok(Self::with_tree(ElementTree::from_record(&record)))
    }

    fn from_file(file: DocumentFile) -> Self {
        let tree = match &file.root {
            Some(record) => ElementTree::from_record(record),
            None => {
                log::warn!("document has no root element, starting from the default block");
                new_document_root()
            }
        };
        if file.version != DOCUMENT_VERSION {
            log::debug!("loading document version {}", file.version);
        }
        Self {
            version: file.version,
            tree,
            variables: file.variables,
            css_classes: file.css_classes,
            extra: file.extra,
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }

    fn to_file(&self) -> DocumentFile {
        DocumentFile {
            version: self.version.clone(),
            root: Some(self.tree.to_record()),
            variables: self.variables.clone(),
            css_classes: self.css_classes.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Read a document from a JSON file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the document to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Default value of a declared template variable.
    pub fn variable_default(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.default_value.as_str())
    }
}
