//! Move and resize editor for the selected layer.

use super::{Commit, PointerTarget};
use crate::error::{EditorError, EditorResult};
use crate::handles::Handle;
use crate::history::HistoryIcon;
use crate::layer::LayerId;
use crate::mapper::CoordinateMapper;
use crate::snap::{SnapEngine, SnapGuide};
use crate::stack::Document;
use crate::surface::Surface;
use kurbo::{Point, Rect, Size};

/// Gesture in progress on the layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    Dragging {
        start: Point,
        layer_start: (i32, i32),
    },
    Resizing {
        handle: Handle,
        start: Point,
        layer_start: (i32, i32),
        start_size: (u32, u32),
        /// Pixels at resize start; every frame rescales from these.
        original: Surface,
    },
}

/// Options that shape a move/resize frame.
#[derive(Debug, Clone, Copy)]
pub struct MoveOptions<'a> {
    /// Snap engine to use while dragging, if snapping is on.
    pub snap: Option<&'a SnapEngine>,
    /// When false, resizing keeps the layer's aspect ratio.
    pub deform: bool,
    /// Minimum layer size per axis.
    pub min_size: f64,
}

/// Moves or resizes one layer.
#[derive(Debug, Clone)]
pub struct MoveEditor {
    pub layer: LayerId,
    pub state: MoveState,
    guides: Vec<SnapGuide>,
}

impl MoveEditor {
    /// Edit `layer`, which must exist and have area.
    pub fn new(layer: LayerId, doc: &Document) -> EditorResult<Self> {
        match doc.layers.get(layer) {
            Some(l) if l.has_area() => Ok(Self {
                layer,
                state: MoveState::Idle,
                guides: Vec::new(),
            }),
            _ => Err(EditorError::InvalidSelection(Some(layer))),
        }
    }

    /// Guides to show for the current drag.
    pub fn guides(&self) -> &[SnapGuide] {
        &self.guides
    }

    /// The layer's box in interaction space.
    pub fn bounds(&self, display: Rect, doc: &Document) -> Option<Rect> {
        let layer = doc.layers.get(self.layer)?;
        Some(CoordinateMapper::new(display, doc.canvas_size()).rect_to_interaction(layer.bounds()))
    }

    pub fn pointer_down(&mut self, point: Point, target: PointerTarget, doc: &Document) -> EditorResult<()> {
        let layer = doc
            .layers
            .get(self.layer)
            .filter(|l| l.has_area())
            .ok_or(EditorError::InvalidSelection(Some(self.layer)))?;
        let layer_start = (layer.x, layer.y);

        self.state = match target {
            PointerTarget::Handle(handle) => MoveState::Resizing {
                handle,
                start: point,
                layer_start,
                start_size: (layer.width(), layer.height()),
                original: layer.surface().clone(),
            },
            PointerTarget::Body | PointerTarget::Canvas => MoveState::Dragging {
                start: point,
                layer_start,
            },
        };
        Ok(())
    }

    /// Apply one pointer frame to the layer.
    pub fn pointer_move(&mut self, point: Point, display: Rect, doc: &mut Document, options: MoveOptions<'_>) {
        let mapper = CoordinateMapper::new(display, doc.canvas_size());
        match &self.state {
            MoveState::Idle => {}
            MoveState::Dragging { start, layer_start } => {
                let d = mapper.delta_to_document(point - *start);
                let mut next = Point::new(
                    (layer_start.0 as f64 + d.x).round(),
                    (layer_start.1 as f64 + d.y).round(),
                );

                self.guides.clear();
                if let Some(engine) = options.snap {
                    let Some(layer) = doc.layers.get(self.layer) else {
                        return;
                    };
                    let size = Size::new(layer.width() as f64, layer.height() as f64);
                    let snapped = engine.compute(
                        next,
                        size,
                        doc.canvas_size(),
                        mapper.scale(),
                        &doc.layers,
                        Some(self.layer),
                    );
                    next = snapped.position;
                    self.guides = snapped.guides;
                }

                if let Some(layer) = doc.layers.get_mut(self.layer) {
                    layer.x = next.x.round() as i32;
                    layer.y = next.y.round() as i32;
                }
            }
            MoveState::Resizing {
                handle,
                start,
                layer_start,
                start_size,
                original,
            } => {
                let d = mapper.delta_to_document(point - *start);
                let rect = resize_rect(*handle, *layer_start, *start_size, d.x, d.y, options);
                let width = rect.width().round() as u32;
                let height = rect.height().round() as u32;
                let scaled = original.scaled(width, height);

                if let Some(layer) = doc.layers.get_mut(self.layer) {
                    layer.set_surface(scaled);
                    layer.x = rect.x0.round() as i32;
                    layer.y = rect.y0.round() as i32;
                }
            }
        }
    }

    /// Abandon the gesture, putting the layer back where it started.
    pub fn cancel(&mut self, doc: &mut Document) {
        self.guides.clear();
        let state = std::mem::take(&mut self.state);
        let Some(layer) = doc.layers.get_mut(self.layer) else {
            return;
        };
        match state {
            MoveState::Idle => {}
            MoveState::Dragging { layer_start, .. } => {
                (layer.x, layer.y) = layer_start;
            }
            MoveState::Resizing {
                layer_start, original, ..
            } => {
                (layer.x, layer.y) = layer_start;
                layer.set_surface(original);
            }
        }
    }

    /// End the gesture. Returns the history entry to record, if a gesture
    /// was in progress.
    pub fn pointer_up(&mut self) -> Option<Commit> {
        self.guides.clear();
        let commit = match self.state {
            MoveState::Idle => None,
            MoveState::Dragging { .. } => Some(Commit::new("Move layer", HistoryIcon::Move)),
            MoveState::Resizing { .. } => Some(Commit::new("Resize layer", HistoryIcon::Move)),
        };
        self.state = MoveState::Idle;
        commit
    }
}

/// New document-space bounds for a handle drag of (`dx`, `dy`) document
/// pixels from the start geometry.
fn resize_rect(handle: Handle, start: (i32, i32), size: (u32, u32), dx: f64, dy: f64, options: MoveOptions<'_>) -> Rect {
    let (start_x, start_y) = (start.0 as f64, start.1 as f64);
    let (start_w, start_h) = (size.0 as f64, size.1 as f64);
    let mut x = start_x;
    let mut y = start_y;
    let mut w = start_w;
    let mut h = start_h;

    if handle.moves_right() {
        w += dx;
    }
    if handle.moves_bottom() {
        h += dy;
    }
    if handle.moves_left() {
        w -= dx;
        x += dx;
    }
    if handle.moves_top() {
        h -= dy;
        y += dy;
    }

    if !options.deform {
        let ratio = start_w / start_h;
        if dx.abs() > dy.abs() {
            h = w / ratio;
            if handle.moves_top() {
                y = start_y + start_h - h;
            }
        } else {
            w = h * ratio;
            if handle.moves_left() {
                x = start_x + start_w - w;
            }
        }
    }

    w = w.max(options.min_size);
    h = h.max(options.min_size);
    Rect::from_origin_size(Point::new(x, y), Size::new(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerKind;

    const DISPLAY: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    fn options(snap: Option<&SnapEngine>, deform: bool) -> MoveOptions<'_> {
        MoveOptions {
            snap,
            deform,
            min_size: 10.0,
        }
    }

    fn doc_with_layer(w: u32, h: u32) -> (Document, LayerId) {
        let mut doc = Document::new(800, 600);
        let id = doc.layers.add_layer("Image 1", LayerKind::Image, Surface::allocate(w, h));
        (doc, id)
    }

    #[test]
    fn test_new_rejects_empty_layer() {
        let (doc, id) = doc_with_layer(0, 0);
        assert!(MoveEditor::new(id, &doc).is_err());
        assert!(MoveEditor::new(99, &doc).is_err());
    }

    #[test]
    fn test_drag_scales_delta() {
        let (mut doc, id) = doc_with_layer(100, 100);
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        let display = Rect::new(0.0, 0.0, 400.0, 300.0);
        editor.pointer_down(Point::new(10.0, 10.0), PointerTarget::Body, &doc).unwrap();
        editor.pointer_move(Point::new(20.0, 15.0), display, &mut doc, options(None, true));
        let layer = doc.layers.get(id).unwrap();
        assert_eq!((layer.x, layer.y), (20, 10));
        assert_eq!(editor.pointer_up(), Some(Commit::new("Move layer", HistoryIcon::Move)));
    }

    #[test]
    fn test_drag_snaps_to_canvas_center() {
        let (mut doc, id) = doc_with_layer(100, 100);
        let engine = SnapEngine::default();
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        editor.pointer_down(Point::new(0.0, 0.0), PointerTarget::Body, &doc).unwrap();
        editor.pointer_move(Point::new(356.0, 120.0), DISPLAY, &mut doc, options(Some(&engine), true));
        assert_eq!(doc.layers.get(id).unwrap().x, 350);
        assert_eq!(editor.guides().len(), 1);

        editor.pointer_up();
        assert!(editor.guides().is_empty());
    }

    #[test]
    fn test_resize_deform() {
        let (mut doc, id) = doc_with_layer(100, 50);
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        editor.pointer_down(Point::new(100.0, 50.0), PointerTarget::Handle(Handle::SE), &doc).unwrap();
        editor.pointer_move(Point::new(140.0, 60.0), DISPLAY, &mut doc, options(None, true));
        let layer = doc.layers.get(id).unwrap();
        assert_eq!((layer.width(), layer.height()), (140, 60));
        assert_eq!(editor.pointer_up(), Some(Commit::new("Resize layer", HistoryIcon::Move)));
    }

    #[test]
    fn test_resize_aspect_locked() {
        let (mut doc, id) = doc_with_layer(100, 50);
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        editor.pointer_down(Point::new(100.0, 50.0), PointerTarget::Handle(Handle::SE), &doc).unwrap();
        editor.pointer_move(Point::new(140.0, 50.0), DISPLAY, &mut doc, options(None, false));
        let layer = doc.layers.get(id).unwrap();
        assert_eq!((layer.width(), layer.height()), (140, 70));
    }

    #[test]
    fn test_resize_aspect_locked_anchors_opposite_edge() {
        let (mut doc, id) = doc_with_layer(100, 50);
        doc.layers.get_mut(id).unwrap().y = 100;
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        editor.pointer_down(Point::new(100.0, 100.0), PointerTarget::Handle(Handle::NE), &doc).unwrap();
        // width drives: 100 -> 160, height 50 -> 80, bottom edge stays at 150
        editor.pointer_move(Point::new(160.0, 95.0), DISPLAY, &mut doc, options(None, false));
        let layer = doc.layers.get(id).unwrap();
        assert_eq!((layer.width(), layer.height()), (160, 80));
        assert_eq!(layer.y + layer.height() as i32, 150);
    }

    #[test]
    fn test_resize_west_shifts_origin() {
        let (mut doc, id) = doc_with_layer(100, 50);
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        editor.pointer_down(Point::new(0.0, 25.0), PointerTarget::Handle(Handle::W), &doc).unwrap();
        editor.pointer_move(Point::new(30.0, 25.0), DISPLAY, &mut doc, options(None, true));
        let layer = doc.layers.get(id).unwrap();
        assert_eq!((layer.x, layer.width()), (30, 70));
    }

    #[test]
    fn test_resize_minimum() {
        let (mut doc, id) = doc_with_layer(100, 50);
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        editor.pointer_down(Point::new(100.0, 50.0), PointerTarget::Handle(Handle::SE), &doc).unwrap();
        editor.pointer_move(Point::new(-50.0, -50.0), DISPLAY, &mut doc, options(None, true));
        let layer = doc.layers.get(id).unwrap();
        assert_eq!((layer.width(), layer.height()), (10, 10));
    }

    #[test]
    fn test_resize_rescales_from_original() {
        let (mut doc, id) = doc_with_layer(100, 50);
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        editor.pointer_down(Point::new(100.0, 50.0), PointerTarget::Handle(Handle::SE), &doc).unwrap();
        editor.pointer_move(Point::new(20.0, 20.0), DISPLAY, &mut doc, options(None, true));
        editor.pointer_move(Point::new(100.0, 50.0), DISPLAY, &mut doc, options(None, true));
        let layer = doc.layers.get(id).unwrap();
        assert_eq!((layer.width(), layer.height()), (100, 50));
        match &editor.state {
            MoveState::Resizing { original, .. } => assert!(layer.surface().shares_pixels(original)),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_cancel_restores_geometry() {
        let (mut doc, id) = doc_with_layer(100, 50);
        let before = doc.layers.get(id).unwrap().clone();
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        editor.pointer_down(Point::new(100.0, 50.0), PointerTarget::Handle(Handle::SE), &doc).unwrap();
        editor.pointer_move(Point::new(180.0, 90.0), DISPLAY, &mut doc, options(None, true));
        editor.cancel(&mut doc);
        assert_eq!(doc.layers.get(id).unwrap(), &before);
        assert_eq!(editor.state, MoveState::Idle);
        assert_eq!(editor.pointer_up(), None);
    }

    #[test]
    fn test_pointer_up_when_idle() {
        let (doc, id) = doc_with_layer(10, 10);
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        assert_eq!(editor.pointer_up(), None);
    }

    #[test]
    fn test_snap_reach_is_measured_on_screen() {
        let (mut doc, id) = doc_with_layer(100, 100);
        let engine = SnapEngine::default();
        // Display at twice the canvas size.
        let display = Rect::new(0.0, 0.0, 1600.0, 1200.0);
        let mut editor = MoveEditor::new(id, &doc).unwrap();
        editor.pointer_down(Point::new(0.0, 0.0), PointerTarget::Body, &doc).unwrap();

        // Center 10 document pixels (20 screen pixels) off the canvas center.
        editor.pointer_move(Point::new(720.0, 240.0), display, &mut doc, options(Some(&engine), true));
        assert_eq!(doc.layers.get(id).unwrap().x, 360);
        assert!(editor.guides().is_empty());

        // Center 5 document pixels (10 screen pixels) off.
        editor.pointer_move(Point::new(710.0, 240.0), display, &mut doc, options(Some(&engine), true));
        assert_eq!(doc.layers.get(id).unwrap().x, 350);
        assert_eq!(editor.guides().len(), 1);
    }
}
