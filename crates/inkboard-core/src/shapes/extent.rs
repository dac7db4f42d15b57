//! Drag extents shared by rectangles, circles and lines.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Origin plus a signed width and height.
///
/// The origin is where the drag began; negative extents mean the drag went
/// left or up. Rectangles and circles fill the box, lines run from the
/// origin to the far corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Extent spanning a drag from `start` to `end`.
    pub fn from_drag(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x - start.x, end.y - start.y)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn far_corner(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn centroid(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half of the larger absolute extent.
    pub fn half_extent(&self) -> f64 {
        self.width.abs().max(self.height.abs()) / 2.0
    }

    /// Normalized bounds.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.origin(), self.far_corner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_drag() {
        let extent = Extent::from_drag(Point::new(100.0, 100.0), Point::new(40.0, 70.0));
        assert!((extent.width + 60.0).abs() < f64::EPSILON);
        assert!((extent.height + 30.0).abs() < f64::EPSILON);

        let bounds = extent.bounds();
        assert!((bounds.x0 - 40.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);

        let c = extent.centroid();
        assert!((c.x - 70.0).abs() < f64::EPSILON);
        assert!((c.y - 85.0).abs() < f64::EPSILON);
        assert!((extent.half_extent() - 30.0).abs() < f64::EPSILON);
    }
}
