//! Resize handles on editor boxes.

use kurbo::{Point, Rect};

/// Hit tolerance around a handle, in interaction units.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// One of the eight resize handles on a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::NW,
        Handle::N,
        Handle::NE,
        Handle::E,
        Handle::SE,
        Handle::S,
        Handle::SW,
        Handle::W,
    ];

    /// Corner handles, the only ones the crop box offers.
    pub const CORNERS: [Handle; 4] = [Handle::NW, Handle::NE, Handle::SE, Handle::SW];

    /// Parse a short compass name such as `"se"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "n" => Some(Handle::N),
            "s" => Some(Handle::S),
            "e" => Some(Handle::E),
            "w" => Some(Handle::W),
            "ne" => Some(Handle::NE),
            "nw" => Some(Handle::NW),
            "se" => Some(Handle::SE),
            "sw" => Some(Handle::SW),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Handle::N => "n",
            Handle::S => "s",
            Handle::E => "e",
            Handle::W => "w",
            Handle::NE => "ne",
            Handle::NW => "nw",
            Handle::SE => "se",
            Handle::SW => "sw",
        }
    }

    pub fn is_corner(&self) -> bool {
        matches!(self, Handle::NE | Handle::NW | Handle::SE | Handle::SW)
    }

    /// Drags the top edge (and so moves the origin's y).
    pub fn moves_top(&self) -> bool {
        matches!(self, Handle::N | Handle::NE | Handle::NW)
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(self, Handle::S | Handle::SE | Handle::SW)
    }

    /// Drags the left edge (and so moves the origin's x).
    pub fn moves_left(&self) -> bool {
        matches!(self, Handle::W | Handle::NW | Handle::SW)
    }

    pub fn moves_right(&self) -> bool {
        matches!(self, Handle::E | Handle::NE | Handle::SE)
    }

    /// Position of this handle on `rect`.
    pub fn position(&self, rect: Rect) -> Point {
        let cx = (rect.x0 + rect.x1) / 2.0;
        let cy = (rect.y0 + rect.y1) / 2.0;
        let x = if self.moves_left() {
            rect.x0
        } else if self.moves_right() {
            rect.x1
        } else {
            cx
        };
        let y = if self.moves_top() {
            rect.y0
        } else if self.moves_bottom() {
            rect.y1
        } else {
            cy
        };
        Point::new(x, y)
    }

    /// Find the handle of `rect` under `point`, among `candidates`.
    pub fn hit_test(rect: Rect, point: Point, candidates: &[Handle]) -> Option<Handle> {
        candidates
            .iter()
            .copied()
            .find(|h| h.position(rect).distance(point) <= HANDLE_HIT_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Handle::from_name("se"), Some(Handle::SE));
        assert_eq!(Handle::from_name("NW"), Some(Handle::NW));
        assert_eq!(Handle::from_name("x"), None);
        for h in Handle::ALL {
            assert_eq!(Handle::from_name(h.name()), Some(h));
        }
    }

    #[test]
    fn test_edges_moved() {
        assert!(Handle::NW.moves_top() && Handle::NW.moves_left());
        assert!(!Handle::E.moves_top() && Handle::E.moves_right());
        assert!(Handle::S.moves_bottom() && !Handle::S.moves_left());
        assert!(Handle::SE.is_corner());
        assert!(!Handle::N.is_corner());
    }

    #[test]
    fn test_positions() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(Handle::SE.position(rect), Point::new(100.0, 50.0));
        assert_eq!(Handle::N.position(rect), Point::new(50.0, 0.0));
        assert_eq!(Handle::W.position(rect), Point::new(0.0, 25.0));
    }

    #[test]
    fn test_hit_test_respects_candidates() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(Handle::hit_test(rect, Point::new(98.0, 52.0), &Handle::ALL), Some(Handle::SE));
        assert_eq!(Handle::hit_test(rect, Point::new(50.0, 1.0), &Handle::CORNERS), None);
        assert_eq!(Handle::hit_test(rect, Point::new(50.0, 1.0), &Handle::ALL), Some(Handle::N));
    }
}
