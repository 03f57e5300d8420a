//! Text styling and the rasterizer collaborator used to commit text layers.

use crate::surface::Surface;
use kurbo::Point;
use peniko::Color;

pub const DEFAULT_TEXT: &str = "Your Text";
pub const DEFAULT_FONT_SIZE: f64 = 32.0;
pub const MIN_FONT_SIZE: f64 = 12.0;
pub const MAX_FONT_SIZE: f64 = 200.0;

/// How text is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    /// Font size in pixels.
    pub size: f64,
    pub color: Color,
    pub bold: bool,
    /// Draw a soft drop shadow behind the glyphs.
    pub shadow: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            size: DEFAULT_FONT_SIZE,
            color: Color::WHITE,
            bold: false,
            shadow: false,
        }
    }
}

impl TextStyle {
    /// Same style at another size.
    pub fn with_size(&self, size: f64) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }
}

/// Measures and draws text. Implemented outside the core (e.g. on top of a
/// font rasterizer) so the core stays free of font handling.
pub trait TextRasterizer {
    /// Advance width of `text` in pixels.
    fn measure(&self, text: &str, style: &TextStyle) -> f64;

    /// Draw `text` into `surface` with the top of the line box at `origin`.
    fn draw(&self, surface: &mut Surface, origin: Point, text: &str, style: &TextStyle);
}
