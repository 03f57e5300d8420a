//! Interactive geometry editors.
//!
//! Each editor owns a rectangle (or anchor point) in interaction space plus
//! the transient state of the current gesture. Nothing here is recorded in
//! history until a commit converts the box to document space and mutates
//! the document.

mod crop;
mod overlay;
mod text;
mod transform;

pub use crop::{CropEditor, CropState, CropTarget};
pub use overlay::{OverlayEditor, OverlayState};
pub use text::{TextEditor, TextState};
pub use transform::{MoveEditor, MoveOptions, MoveState};

use crate::handles::Handle;
use crate::history::HistoryIcon;
use kurbo::{Point, Rect, Vec2};

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Bare canvas, outside any editor box.
    Canvas,
    /// Inside the active box.
    Body,
    /// On one of the box's resize handles.
    Handle(Handle),
}

/// A committed edit, to be recorded as one history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    pub action: String,
    pub icon: HistoryIcon,
}

impl Commit {
    pub fn new(action: impl Into<String>, icon: HistoryIcon) -> Self {
        Self {
            action: action.into(),
            icon,
        }
    }
}

/// Translate `rect` so it lies inside `bounds` where possible.
pub(crate) fn clamp_rect_origin(rect: Rect, bounds: Rect) -> Rect {
    let x = rect.x0.min(bounds.x1 - rect.width()).max(bounds.x0);
    let y = rect.y0.min(bounds.y1 - rect.height()).max(bounds.y0);
    rect + Vec2::new(x - rect.x0, y - rect.y0)
}

/// Offset from a box's origin to the point that grabbed it.
pub(crate) fn grab_offset(rect: Rect, point: Point) -> Vec2 {
    point - rect.origin()
}
