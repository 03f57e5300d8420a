//! Error types for editor operations.

use thiserror::Error;

/// Errors returned by editor operations.
///
/// Every operation that returns an error leaves the session untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditorError {
    #[error("No layer selected or layer {0:?} does not exist")]
    InvalidSelection(Option<u32>),
    #[error("Area too small: {width:.0}x{height:.0} (minimum {min:.0})")]
    DegenerateGeometry { width: f64, height: f64, min: f64 },
    #[error("Crop area is outside the layer bounds")]
    OutOfBounds,
    #[error("Cannot delete the last layer")]
    LastLayerDeletion,
    #[error("Document has no layers")]
    EmptyDocument,
    #[error("No edit in progress")]
    NoActiveEdit,
    #[error("Encode error: {0}")]
    Encode(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

impl From<image::ImageError> for EditorError {
    fn from(err: image::ImageError) -> Self {
        EditorError::Encode(err.to_string())
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        EditorError::Config(err.to_string())
    }
}
