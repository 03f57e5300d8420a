//! Image overlay placement editor.

use super::{Commit, PointerTarget, clamp_rect_origin, grab_offset};
use crate::error::{EditorError, EditorResult};
use crate::history::HistoryIcon;
use crate::layer::{Layer, LayerKind};
use crate::mapper::CoordinateMapper;
use crate::stack::Document;
use crate::surface::Surface;
use kurbo::{Point, Rect, Size, Vec2};

/// Largest initial overlay width as a fraction of the display width.
const MAX_INITIAL_WIDTH: f64 = 0.3;
/// Smallest overlay width while resizing, in interaction units.
const MIN_WIDTH: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OverlayState {
    #[default]
    Idle,
    Dragging {
        grab: Vec2,
    },
    Resizing {
        start: Point,
        start_width: f64,
    },
}

/// An image being placed over the document.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEditor {
    pub image: Surface,
    /// Box in interaction space. Always has the image's aspect ratio.
    pub rect: Rect,
    pub opacity: f64,
    pub state: OverlayState,
}

impl OverlayEditor {
    /// Place `image` centered on the display, scaled down to at most 30% of
    /// the display width.
    pub fn new(image: Surface, display: Rect) -> EditorResult<Self> {
        if image.is_empty() {
            return Err(EditorError::DegenerateGeometry {
                width: image.width() as f64,
                height: image.height() as f64,
                min: 1.0,
            });
        }
        let max_width = display.width() * MAX_INITIAL_WIDTH;
        let scale = (max_width / image.width() as f64).min(1.0);
        let size = Size::new(image.width() as f64 * scale, image.height() as f64 * scale);
        let origin = Point::new(
            display.x0 + (display.width() - size.width) / 2.0,
            display.y0 + (display.height() - size.height) / 2.0,
        );

        Ok(Self {
            image,
            rect: Rect::from_origin_size(origin, size),
            opacity: 1.0,
            state: OverlayState::Idle,
        })
    }

    /// Height over width of the source image.
    pub fn aspect(&self) -> f64 {
        self.image.height() as f64 / self.image.width() as f64
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn pointer_down(&mut self, point: Point, target: PointerTarget) {
        self.state = match target {
            PointerTarget::Handle(_) => OverlayState::Resizing {
                start: point,
                start_width: self.rect.width(),
            },
            PointerTarget::Body => OverlayState::Dragging {
                grab: grab_offset(self.rect, point),
            },
            PointerTarget::Canvas => OverlayState::Idle,
        };
    }

    pub fn pointer_move(&mut self, point: Point, display: Rect) {
        match self.state {
            OverlayState::Idle => {}
            OverlayState::Dragging { grab } => {
                let moved = Rect::from_origin_size(point - grab, self.rect.size());
                self.rect = clamp_rect_origin(moved, display);
            }
            OverlayState::Resizing { start, start_width } => {
                let width = (start_width + point.x - start.x).max(MIN_WIDTH);
                let size = Size::new(width, width * self.aspect());
                self.rect = Rect::from_origin_size(self.rect.origin(), size);
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.state = OverlayState::Idle;
    }

    /// Draw the image at the box's document-space size into a new overlay
    /// layer on top of the stack.
    pub fn commit(&self, doc: &mut Document, display: Rect) -> EditorResult<Commit> {
        let mapper = CoordinateMapper::new(display, doc.canvas_size());
        let target = mapper.rect_to_document(self.rect);
        let width = target.width().round();
        let height = target.height().round();
        if width < 1.0 || height < 1.0 {
            return Err(EditorError::DegenerateGeometry { width, height, min: 1.0 });
        }

        let (width, height) = (width as u32, height as u32);
        let mut surface = Surface::allocate(width, height);
        self.image.draw_into(&mut surface, 0, 0, width, height, 1.0);

        let mut layer = Layer::with_surface(
            doc.layers.next_id(),
            format!("Overlay {}", doc.layers.len()),
            LayerKind::Overlay,
            surface,
        );
        layer.x = target.x0.round() as i32;
        layer.y = target.y0.round() as i32;
        layer.set_opacity(self.opacity);
        doc.layers.push(layer);

        Ok(Commit::new("Insert image", HistoryIcon::Overlay))
    }
}
