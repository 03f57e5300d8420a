//! Strata Render Library
//!
//! Collaborators the editor core leaves to the host: glyph rasterization
//! on top of `ab_glyph` and image decoding on top of `image`.

mod decode;
mod glyphs;

pub use decode::decode_image;
pub use glyphs::GlyphRasterizer;

use thiserror::Error;

/// Errors from the render collaborators.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Font load failed: {0}")]
    FontLoad(String),
    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

impl From<RenderError> for strata_core::EditorError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Decode(msg) => strata_core::EditorError::Decode(msg),
            RenderError::FontLoad(msg) => strata_core::EditorError::Config(msg),
        }
    }
}
