//! Crop box editor.

use super::{Commit, PointerTarget, clamp_rect_origin, grab_offset};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::handles::Handle;
use crate::history::HistoryIcon;
use crate::layer::LayerId;
use crate::mapper::CoordinateMapper;
use crate::stack::Document;
use kurbo::{Point, Rect, Size, Vec2};

/// Initial crop box size relative to the layer (or canvas) on screen.
const LAYER_BOX_FRACTION: f64 = 0.6;
const CANVAS_BOX_FRACTION: f64 = 0.9;

/// What a crop applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropTarget {
    /// Crop the pixels of one layer.
    Layer(LayerId),
    /// Crop the canvas; every layer is re-origined.
    Canvas,
}

/// Gesture in progress on the crop box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CropState {
    #[default]
    Idle,
    /// Drawing a new box from an anchor point.
    Drawing { anchor: Point },
    /// Moving the box; `grab` is the pointer offset from the box origin.
    Dragging { grab: Vec2 },
    /// Resizing by a corner; deltas are applied incrementally from `last`.
    Resizing { handle: Handle, last: Point },
}

/// Crop box in interaction space.
#[derive(Debug, Clone, PartialEq)]
pub struct CropEditor {
    pub target: CropTarget,
    pub rect: Rect,
    pub state: CropState,
    handle_min: f64,
    min_size: f64,
}

impl CropEditor {
    /// Start a crop with the default box centered on the display.
    pub fn new(target: CropTarget, display: Rect, doc: &Document, config: &EditorConfig) -> EditorResult<Self> {
        let mapper = CoordinateMapper::new(display, doc.canvas_size());
        let scale = mapper.scale();
        let (content, fraction) = match target {
            CropTarget::Canvas => (doc.canvas_size(), CANVAS_BOX_FRACTION),
            CropTarget::Layer(id) => {
                let layer = doc.layers.get(id).ok_or(EditorError::InvalidSelection(Some(id)))?;
                let size = Size::new(
                    (layer.width() as f64).min(doc.canvas_size().width),
                    (layer.height() as f64).min(doc.canvas_size().height),
                );
                (size, LAYER_BOX_FRACTION)
            }
        };

        let width = content.width / scale.x * fraction;
        let height = content.height / scale.y * fraction;
        let origin = Point::new(
            display.x0 + (display.width() - width) / 2.0,
            display.y0 + (display.height() - height) / 2.0,
        );

        Ok(Self {
            target,
            rect: Rect::from_origin_size(origin, Size::new(width, height)),
            state: CropState::Idle,
            handle_min: config.crop_handle_min,
            min_size: config.crop_min_size,
        })
    }

    /// Begin a gesture at `point`.
    pub fn pointer_down(&mut self, point: Point, target: PointerTarget) {
        self.state = match target {
            PointerTarget::Canvas => {
                self.rect = Rect::from_origin_size(point, Size::ZERO);
                CropState::Drawing { anchor: point }
            }
            PointerTarget::Body => CropState::Dragging {
                grab: grab_offset(self.rect, point),
            },
            PointerTarget::Handle(handle) if handle.is_corner() => CropState::Resizing { handle, last: point },
            // Edge handles are not offered on the crop box.
            PointerTarget::Handle(_) => CropState::Idle,
        };
    }

    /// Continue the gesture. The box is kept inside `display` while drawing
    /// and dragging.
    pub fn pointer_move(&mut self, point: Point, display: Rect) {
        match self.state {
            CropState::Idle => {}
            CropState::Drawing { anchor } => {
                let x = point.x.min(anchor.x).max(display.x0);
                let y = point.y.min(anchor.y).max(display.y0);
                let width = (point.x - anchor.x).abs().min(display.x1 - x);
                let height = (point.y - anchor.y).abs().min(display.y1 - y);
                self.rect = Rect::from_origin_size(Point::new(x, y), Size::new(width.max(0.0), height.max(0.0)));
            }
            CropState::Dragging { grab } => {
                let moved = Rect::from_origin_size(point - grab, self.rect.size());
                self.rect = clamp_rect_origin(moved, display);
            }
            CropState::Resizing { handle, last } => {
                let d = point - last;
                self.resize_by(handle, d);
                self.state = CropState::Resizing { handle, last: point };
            }
        }
    }

    fn resize_by(&mut self, handle: Handle, d: Vec2) {
        let min = self.handle_min;
        let mut x = self.rect.x0;
        let mut y = self.rect.y0;
        let mut width = self.rect.width();
        let mut height = self.rect.height();

        if handle.moves_left() {
            x += d.x;
            width = (width - d.x).max(min);
        } else if handle.moves_right() {
            width = (width + d.x).max(min);
        }
        if handle.moves_top() {
            y += d.y;
            height = (height - d.y).max(min);
        } else if handle.moves_bottom() {
            height = (height + d.y).max(min);
        }
        self.rect = Rect::from_origin_size(Point::new(x, y), Size::new(width, height));
    }

    pub fn pointer_up(&mut self) {
        self.state = CropState::Idle;
    }

    /// Document-space size of the box, rounded, for display.
    pub fn document_size(&self, display: Rect, doc: &Document) -> (u32, u32) {
        let r = CoordinateMapper::new(display, doc.canvas_size()).rect_to_document(self.rect);
        (r.width().round() as u32, r.height().round() as u32)
    }

    /// Apply the crop. Nothing is mutated on error.
    pub fn commit(&self, doc: &mut Document, display: Rect) -> EditorResult<Commit> {
        let mapper = CoordinateMapper::new(display, doc.canvas_size());
        let crop = mapper.rect_to_document(self.rect);
        if crop.width() < self.min_size || crop.height() < self.min_size {
            return Err(EditorError::DegenerateGeometry {
                width: crop.width(),
                height: crop.height(),
                min: self.min_size,
            });
        }

        match self.target {
            CropTarget::Canvas => {
                let width = crop.width().round();
                let height = crop.height().round();
                if width < 1.0 || height < 1.0 {
                    return Err(EditorError::DegenerateGeometry {
                        width,
                        height,
                        min: 1.0,
                    });
                }
                for layer in doc.layers.layers_mut() {
                    layer.x = (layer.x as f64 - crop.x0).round() as i32;
                    layer.y = (layer.y as f64 - crop.y0).round() as i32;
                }
                doc.canvas_width = width as u32;
                doc.canvas_height = height as u32;
                Ok(Commit::new("Crop all", HistoryIcon::CropAll))
            }
            CropTarget::Layer(id) => {
                let layer = doc.layers.get_mut(id).ok_or(EditorError::InvalidSelection(Some(id)))?;
                let region = clamp_to_layer(crop, layer.x, layer.y, layer.width(), layer.height())
                    .ok_or(EditorError::OutOfBounds)?;

                layer.crop_local(region.0, region.1, region.2, region.3);
                layer.x = crop.x0.round() as i32;
                layer.y = crop.y0.round() as i32;
                Ok(Commit::new("Crop layer", HistoryIcon::Crop))
            }
        }
    }
}

/// Layer-local crop region `(x, y, width, height)` for a document-space box.
///
/// The part of the box that hangs off the layer's leading edge is removed
/// from the clamped extent. Returns `None` if nothing remains.
fn clamp_to_layer(crop: Rect, layer_x: i32, layer_y: i32, layer_w: u32, layer_h: u32) -> Option<(u32, u32, u32, u32)> {
    let (x, w) = clamp_axis(crop.x0 - layer_x as f64, crop.width(), layer_w)?;
    let (y, h) = clamp_axis(crop.y0 - layer_y as f64, crop.height(), layer_h)?;
    Some((x, y, w, h))
}

fn clamp_axis(start: f64, extent: f64, layer_extent: u32) -> Option<(u32, u32)> {
    let start = start.round() as i64;
    let extent = extent.round() as i64;
    let clamped_start = start.max(0);
    let lead_in = clamped_start - start;
    let clamped = extent.min(layer_extent as i64 - clamped_start) - lead_in;
    if clamped <= 0 {
        return None;
    }
    Some((clamped_start as u32, clamped as u32))
}
