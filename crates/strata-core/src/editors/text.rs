//! Text placement editor.

use super::{Commit, PointerTarget};
use crate::error::{EditorError, EditorResult};
use crate::history::HistoryIcon;
use crate::layer::{Layer, LayerKind, TextData};
use crate::mapper::CoordinateMapper;
use crate::stack::Document;
use crate::surface::Surface;
use crate::text::{DEFAULT_TEXT, MAX_FONT_SIZE, MIN_FONT_SIZE, TextRasterizer, TextStyle};
use kurbo::{Point, Rect, Vec2};

/// Space kept free at the right and bottom of the display while dragging.
const DRAG_MARGIN: Vec2 = Vec2::new(100.0, 50.0);
/// Initial offset of the text from the display center.
const START_OFFSET: Vec2 = Vec2::new(-50.0, -20.0);
/// Characters of the content used in the layer name.
const NAME_PREFIX_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TextState {
    #[default]
    Idle,
    Dragging {
        grab: Vec2,
    },
    /// Horizontal drag on the size handle changes the font size.
    Resizing {
        start: Point,
        start_size: f64,
    },
}

/// Text being placed, with its font size in interaction units.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditor {
    pub content: String,
    pub style: TextStyle,
    /// Top-left of the text box in interaction space.
    pub position: Point,
    pub state: TextState,
}

impl TextEditor {
    pub fn new(display: Rect) -> Self {
        Self {
            content: DEFAULT_TEXT.to_string(),
            style: TextStyle::default(),
            position: display.center() + START_OFFSET,
            state: TextState::Idle,
        }
    }

    pub fn pointer_down(&mut self, point: Point, target: PointerTarget) {
        self.state = match target {
            PointerTarget::Handle(_) => TextState::Resizing {
                start: point,
                start_size: self.style.size,
            },
            PointerTarget::Body => TextState::Dragging {
                grab: point - self.position,
            },
            PointerTarget::Canvas => TextState::Idle,
        };
    }

    pub fn pointer_move(&mut self, point: Point, display: Rect) {
        match self.state {
            TextState::Idle => {}
            TextState::Dragging { grab } => {
                let p = point - grab;
                self.position = Point::new(
                    p.x.min(display.x1 - DRAG_MARGIN.x).max(display.x0),
                    p.y.min(display.y1 - DRAG_MARGIN.y).max(display.y0),
                );
            }
            TextState::Resizing { start, start_size } => {
                let dx = point.x - start.x;
                self.style.size = (start_size + dx / 2.0).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.state = TextState::Idle;
    }

    /// Rasterize the text into a new layer on top of the stack.
    pub fn commit(
        &self,
        doc: &mut Document,
        display: Rect,
        rasterizer: &dyn TextRasterizer,
        padding: u32,
    ) -> EditorResult<Commit> {
        if self.content.is_empty() {
            return Err(EditorError::DegenerateGeometry {
                width: 0.0,
                height: 0.0,
                min: 1.0,
            });
        }

        let mapper = CoordinateMapper::new(display, doc.canvas_size());
        let origin = mapper.to_document(self.position);
        let size = (self.style.size * mapper.scale().x).round().max(1.0);
        let style = self.style.with_size(size);

        let pad = padding as f64;
        let width = rasterizer.measure(&self.content, &style).ceil().max(0.0) as u32 + 2 * padding;
        let height = size as u32 + 2 * padding;
        let mut surface = Surface::allocate(width, height);
        rasterizer.draw(&mut surface, Point::new(pad, pad), &self.content, &style);

        let name: String = self.content.chars().take(NAME_PREFIX_CHARS).collect();
        let mut layer = Layer::with_surface(
            doc.layers.next_id(),
            format!("Text: {name}"),
            LayerKind::Text,
            surface,
        );
        layer.x = origin.x.round() as i32;
        layer.y = origin.y.round() as i32;
        layer.text = Some(TextData {
            content: self.content.clone(),
            style,
        });
        doc.layers.push(layer);

        Ok(Commit::new("Add text", HistoryIcon::Text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::Handle;
    use crate::text::testing::BlockRasterizer;

    const DISPLAY: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    #[test]
    fn test_initial_position() {
        let editor = TextEditor::new(DISPLAY);
        assert_eq!(editor.position, Point::new(350.0, 280.0));
        assert_eq!(editor.content, "Your Text");
    }

    #[test]
    fn test_drag_clamped() {
        let mut editor = TextEditor::new(DISPLAY);
        editor.pointer_down(Point::new(360.0, 290.0), PointerTarget::Body);
        editor.pointer_move(Point::new(900.0, -40.0), DISPLAY);
        assert_eq!(editor.position, Point::new(700.0, 0.0));
    }

    #[test]
    fn test_resize_changes_font_size() {
        let mut editor = TextEditor::new(DISPLAY);
        editor.pointer_down(Point::new(0.0, 0.0), PointerTarget::Handle(Handle::SE));
        editor.pointer_move(Point::new(40.0, 0.0), DISPLAY);
        assert!((editor.style.size - 52.0).abs() < f64::EPSILON);
        editor.pointer_move(Point::new(-1000.0, 0.0), DISPLAY);
        assert!((editor.style.size - MIN_FONT_SIZE).abs() < f64::EPSILON);
        editor.pointer_move(Point::new(1000.0, 0.0), DISPLAY);
        assert!((editor.style.size - MAX_FONT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_commit_creates_text_layer() {
        let mut doc = Document::new(800, 600);
        doc.layers.add_layer("Image 1", LayerKind::Image, Surface::allocate(800, 600));
        let mut editor = TextEditor::new(DISPLAY);
        editor.content = "Hello world, again".to_string();
        editor.position = Point::new(100.0, 50.0);

        let commit = editor.commit(&mut doc, DISPLAY, &BlockRasterizer, 10).unwrap();
        assert_eq!(commit.action, "Add text");

        let layer = doc.layers.selected().unwrap();
        assert_eq!(layer.kind, LayerKind::Text);
        assert_eq!(layer.name, "Text: Hello worl");
        assert_eq!((layer.x, layer.y), (100, 50));
        // 18 chars * 16 px + padding
        assert_eq!((layer.width(), layer.height()), (308, 52));
        assert_eq!(layer.surface().pixel(10, 10).unwrap()[3], 255);
        assert_eq!(layer.surface().pixel(0, 0).unwrap()[3], 0);
    }

    #[test]
    fn test_commit_scales_font_to_document() {
        let mut doc = Document::new(800, 600);
        doc.layers.add_layer("Image 1", LayerKind::Image, Surface::allocate(800, 600));
        let display = Rect::new(0.0, 0.0, 400.0, 300.0);
        let mut editor = TextEditor::new(display);
        editor.position = Point::new(10.0, 10.0);
        editor.commit(&mut doc, display, &BlockRasterizer, 10).unwrap();

        let layer = doc.layers.selected().unwrap();
        assert_eq!((layer.x, layer.y), (20, 20));
        let data = layer.text.as_ref().unwrap();
        assert!((data.style.size - 64.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_commit_empty_rejected() {
        let mut doc = Document::new(800, 600);
        let mut editor = TextEditor::new(DISPLAY);
        editor.content.clear();
        assert!(editor.commit(&mut doc, DISPLAY, &BlockRasterizer, 10).is_err());
        assert!(doc.layers.is_empty());
    }
}
