//! Layers: the unit of editing and compositing.

use crate::surface::{FlipDirection, Surface};
use crate::text::TextStyle;
use kurbo::{Point, Rect};

/// Unique layer identifier. Assigned monotonically and never reused.
pub type LayerId = u32;

/// What a layer was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Image,
    Text,
    Overlay,
}

/// Text kept on text layers so it can be inspected after rasterizing.
#[derive(Debug, Clone, PartialEq)]
pub struct TextData {
    pub content: String,
    /// Style with the font size in document pixels.
    pub style: TextStyle,
}

/// A positioned raster layer.
///
/// The layer's size is always the size of its surface. Position is in
/// document space and may lie partly or fully outside the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    pub visible: bool,
    opacity: f64,
    pub x: i32,
    pub y: i32,
    surface: Surface,
    pub text: Option<TextData>,
}

impl Layer {
    /// Create an empty (0x0) visible layer.
    pub fn new(id: LayerId, name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            visible: true,
            opacity: 1.0,
            x: 0,
            y: 0,
            surface: Surface::allocate(0, 0),
            text: None,
        }
    }

    /// Create a layer at the origin owning `surface`.
    pub fn with_surface(id: LayerId, name: impl Into<String>, kind: LayerKind, surface: Surface) -> Self {
        let mut layer = Self::new(id, name, kind);
        layer.surface = surface;
        layer
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Set opacity, clamped to [0, 1].
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Replace the layer's pixels. The layer takes the surface's size.
    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = surface;
    }

    /// Layers without area are neither composited nor manipulable.
    pub fn has_area(&self) -> bool {
        !self.surface.is_empty()
    }

    /// Bounds in document space.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.x as f64,
            self.y as f64,
            self.x as f64 + self.width() as f64,
            self.y as f64 + self.height() as f64,
        )
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Replace the pixels with a layer-local region. The region must lie
    /// within the layer.
    pub fn crop_local(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let region = self.surface.read_pixels(x, y, width, height);
        self.surface = Surface::from_image(region);
    }

    /// Rotate clockwise about the content center. Position is unchanged.
    pub fn rotate(&mut self, degrees: f64) {
        self.surface = self.surface.rotated(degrees);
    }

    pub fn flip(&mut self, direction: FlipDirection) {
        self.surface.flip(direction);
    }
}
