//! Eraser hit testing.
//!
//! Shapes use a coarse circular bound rather than exact intersection.

use crate::geometry::{distance_to_segment, point_distance};
use crate::layer::LayerId;
use crate::shapes::{Element, ElementKind};
use kurbo::Point;
use std::sync::Arc;

/// Text is erased when the cursor is this close to its anchor.
pub const TEXT_ERASE_RADIUS: f64 = 20.0;

/// Minimum line hit distance before the extra slack is added.
const LINE_MIN_REACH: f64 = 5.0;
const LINE_SLACK: f64 = 5.0;

/// Eraser radius for a tool size.
pub fn eraser_radius(size: f64) -> f64 {
    size * 2.0
}

/// Whether the eraser at `pos` with tool size `size` removes `element`.
pub fn hits(element: &Element, pos: Point, size: f64) -> bool {
    let radius = eraser_radius(size);
    match element.kind() {
        ElementKind::Stroke(stroke) => stroke
            .points
            .iter()
            .any(|p| point_distance(p.to_point(), pos) <= radius),
        ElementKind::Rectangle(extent) | ElementKind::Circle(extent) => {
            point_distance(extent.centroid(), pos) < extent.half_extent() + radius
        }
        ElementKind::Line(extent) => {
            distance_to_segment(pos, extent.origin(), extent.far_corner())
                <= size.max(LINE_MIN_REACH) + LINE_SLACK
        }
        ElementKind::Text(text) => point_distance(text.anchor(), pos) < TEXT_ERASE_RADIUS,
    }
}

/// Remove every element on `layer` hit by the eraser. Returns how many went.
pub fn erase(elements: &mut Vec<Arc<Element>>, layer: LayerId, pos: Point, size: f64) -> usize {
    let before = elements.len();
    elements.retain(|e| e.layer_id() != layer || !hits(e, pos, size));
    before - elements.len()
}
