//! Mapping between interaction space and document space.
//!
//! Interaction space is where pointer events and editor boxes live: the
//! on-screen rectangle the canvas is displayed in. Document space is the
//! canvas pixel grid. The two differ by a per-axis scale and the display
//! origin.

use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Converts points and rectangles between interaction and document space.
///
/// Scale factors are derived from the display rectangle and canvas size on
/// every call, so a mapper stays correct if either changes between events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    /// On-screen rectangle the canvas is displayed in.
    pub display: Rect,
    /// Canvas size in document pixels.
    pub canvas: Size,
}

impl CoordinateMapper {
    pub fn new(display: Rect, canvas: Size) -> Self {
        Self { display, canvas }
    }

    /// Document pixels per interaction unit, per axis.
    pub fn scale(&self) -> Vec2 {
        let sx = if self.display.width() > 0.0 {
            self.canvas.width / self.display.width()
        } else {
            1.0
        };
        let sy = if self.display.height() > 0.0 {
            self.canvas.height / self.display.height()
        } else {
            1.0
        };
        Vec2::new(sx, sy)
    }

    /// Transform from interaction space to document space.
    pub fn transform(&self) -> Affine {
        let scale = self.scale();
        Affine::scale_non_uniform(scale.x, scale.y) * Affine::translate(-self.display.origin().to_vec2())
    }

    /// Transform from document space to interaction space.
    pub fn inverse_transform(&self) -> Affine {
        let scale = self.scale();
        Affine::translate(self.display.origin().to_vec2()) * Affine::scale_non_uniform(1.0 / scale.x, 1.0 / scale.y)
    }

    pub fn to_document(&self, point: Point) -> Point {
        self.transform() * point
    }

    pub fn to_interaction(&self, point: Point) -> Point {
        self.inverse_transform() * point
    }

    /// Scale a delta (no translation) into document space.
    pub fn delta_to_document(&self, delta: Vec2) -> Vec2 {
        let scale = self.scale();
        Vec2::new(delta.x * scale.x, delta.y * scale.y)
    }

    pub fn rect_to_document(&self, rect: Rect) -> Rect {
        Rect::from_points(self.to_document(rect.origin()), self.to_document(Point::new(rect.x1, rect.y1)))
    }

    pub fn rect_to_interaction(&self, rect: Rect) -> Rect {
        Rect::from_points(
            self.to_interaction(rect.origin()),
            self.to_interaction(Point::new(rect.x1, rect.y1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_when_display_matches_canvas() {
        let mapper = CoordinateMapper::new(Rect::new(0.0, 0.0, 800.0, 600.0), Size::new(800.0, 600.0));
        let p = mapper.to_document(Point::new(123.0, 45.0));
        assert!((p.x - 123.0).abs() < f64::EPSILON);
        assert!((p.y - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_uniform_scale() {
        let mapper = CoordinateMapper::new(Rect::new(0.0, 0.0, 400.0, 200.0), Size::new(800.0, 600.0));
        let scale = mapper.scale();
        assert!((scale.x - 2.0).abs() < f64::EPSILON);
        assert!((scale.y - 3.0).abs() < f64::EPSILON);

        let p = mapper.to_document(Point::new(100.0, 100.0));
        assert!((p.x - 200.0).abs() < 1e-10);
        assert!((p.y - 300.0).abs() < 1e-10);
    }

    #[test]
    fn test_display_origin_offset() {
        let mapper = CoordinateMapper::new(Rect::new(50.0, 20.0, 450.0, 320.0), Size::new(800.0, 600.0));
        let p = mapper.to_document(Point::new(50.0, 20.0));
        assert!(p.x.abs() < 1e-10);
        assert!(p.y.abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mapper = CoordinateMapper::new(Rect::new(13.0, 7.0, 613.0, 457.0), Size::new(1920.0, 1080.0));
        let original = Point::new(321.5, 99.25);
        let back = mapper.to_interaction(mapper.to_document(original));
        assert!((back.x - original.x).abs() < 1e-9);
        assert!((back.y - original.y).abs() < 1e-9);
    }

    #[test]
    fn test_rect_to_document() {
        let mapper = CoordinateMapper::new(Rect::new(0.0, 0.0, 400.0, 300.0), Size::new(800.0, 600.0));
        let r = mapper.rect_to_document(Rect::new(10.0, 10.0, 110.0, 60.0));
        assert!((r.width() - 200.0).abs() < 1e-10);
        assert!((r.height() - 100.0).abs() < 1e-10);
        assert!((r.x0 - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_degenerate_display_falls_back_to_unit_scale() {
        let mapper = CoordinateMapper::new(Rect::ZERO, Size::new(800.0, 600.0));
        assert_eq!(mapper.scale(), Vec2::new(1.0, 1.0));
    }
}
