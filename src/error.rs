//! Error types for blockcanvas operations.

use thiserror::Error;

/// Errors that can occur while loading, editing or saving an element tree.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("element not found: {0}")]
    NotFound(String),

    #[error("operation not permitted on the root element")]
    RootImmutable,

    #[error("cannot move {id} into its own subtree ({target})")]
    WouldCreateCycle { id: String, target: String },

    #[error("element {0} does not accept children")]
    NotAContainer(String),

    #[error("property {path} is not editable on {element_type} elements")]
    InvalidProperty { path: String, element_type: String },

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Error {
    /// Whether this error means the target element no longer exists.
    ///
    /// UI races (an action arriving for an element deleted a moment earlier)
    /// surface as this variant and are treated as no-ops by the editor.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
