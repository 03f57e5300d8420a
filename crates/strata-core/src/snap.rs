//! Snap-to-guide alignment for moving layers.
//!
//! A moving layer's center is compared against a list of candidate lines per
//! axis: the canvas edges and center, then the centers of other visible
//! layers. The first candidate within the threshold wins.

use crate::config::DEFAULT_SNAP_THRESHOLD;
use crate::layer::LayerId;
use crate::stack::LayerStack;
use kurbo::{Point, Size, Vec2};

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAxis {
    /// A vertical line at a fixed x.
    Vertical,
    /// A horizontal line at a fixed y.
    Horizontal,
}

/// What a snap candidate was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapTargetKind {
    CanvasEdge,
    CanvasCenter,
    LayerCenter,
}

/// A guide line to display while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapGuide {
    pub axis: GuideAxis,
    /// Document-space coordinate of the line.
    pub position: f64,
    pub kind: SnapTargetKind,
}

/// Result of a snap computation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// Corrected top-left position.
    pub position: Point,
    /// At most one guide per axis.
    pub guides: Vec<SnapGuide>,
}

impl SnapResult {
    pub fn none(position: Point) -> Self {
        Self {
            position,
            guides: Vec::new(),
        }
    }

    pub fn is_snapped(&self) -> bool {
        !self.guides.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    value: f64,
    kind: SnapTargetKind,
}

/// Computes snapped positions against the canvas and other layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapEngine {
    /// Distance in interaction pixels, compared strictly.
    pub threshold: f64,
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SNAP_THRESHOLD,
        }
    }
}

impl SnapEngine {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Snap a `size` box at `position`, both in document space.
    ///
    /// `scale` is document units per interaction unit (see
    /// [`CoordinateMapper::scale`](crate::mapper::CoordinateMapper::scale)),
    /// so the threshold holds steady on screen at any zoom. `moving` is
    /// excluded from the layer candidates, as are hidden layers.
    pub fn compute(
        &self,
        position: Point,
        size: Size,
        canvas: Size,
        scale: Vec2,
        layers: &LayerStack,
        moving: Option<LayerId>,
    ) -> SnapResult {
        let mut xs = canvas_candidates(canvas.width);
        let mut ys = canvas_candidates(canvas.height);
        for layer in layers.layers() {
            if Some(layer.id()) == moving || !layer.visible {
                continue;
            }
            let center = layer.center();
            xs.push(Candidate {
                value: center.x,
                kind: SnapTargetKind::LayerCenter,
            });
            ys.push(Candidate {
                value: center.y,
                kind: SnapTargetKind::LayerCenter,
            });
        }

        let mut result = SnapResult::none(position);
        if let Some(hit) = self.first_within(position.x + size.width / 2.0, self.threshold * scale.x, &xs) {
            result.position.x = hit.value - size.width / 2.0;
            result.guides.push(SnapGuide {
                axis: GuideAxis::Vertical,
                position: hit.value,
                kind: hit.kind,
            });
        }
        if let Some(hit) = self.first_within(position.y + size.height / 2.0, self.threshold * scale.y, &ys) {
            result.position.y = hit.value - size.height / 2.0;
            result.guides.push(SnapGuide {
                axis: GuideAxis::Horizontal,
                position: hit.value,
                kind: hit.kind,
            });
        }
        result
    }

    fn first_within(&self, center: f64, tolerance: f64, candidates: &[Candidate]) -> Option<Candidate> {
        candidates
            .iter()
            .find(|c| (center - c.value).abs() < tolerance)
            .copied()
    }
}

fn canvas_candidates(extent: f64) -> Vec<Candidate> {
    vec![
        Candidate {
            value: 0.0,
            kind: SnapTargetKind::CanvasEdge,
        },
        Candidate {
            value: extent / 2.0,
            kind: SnapTargetKind::CanvasCenter,
        },
        Candidate {
            value: extent,
            kind: SnapTargetKind::CanvasEdge,
        },
    ]
}
