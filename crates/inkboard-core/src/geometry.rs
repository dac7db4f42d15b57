//! Geometry kernel: distances, stroke resampling and path recipes.
//!
//! Everything here is stateless. Stroke points are densified by [`resample`]
//! when a stroke is committed, and curve-fitted by [`smooth_path`] every time
//! they are drawn.

use crate::shapes::{DEFAULT_PRESSURE, Element, ElementKind, Extent, StrokePoint};
use kurbo::{BezPath, Ellipse, Point, Shape as _};

/// Tolerance used when flattening kurbo shapes into paths.
const PATH_TOLERANCE: f64 = 0.1;

/// Starting tolerance for [`cap_points`].
const CAP_INITIAL_TOLERANCE: f64 = 0.25;

/// How many times [`cap_points`] doubles its tolerance before decimating.
const CAP_MAX_PASSES: usize = 8;

/// Euclidean distance between two points.
pub fn point_distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Distance from `p` to the segment `v..w`.
pub fn distance_to_segment(p: Point, v: Point, w: Point) -> f64 {
    let segment = w - v;
    let len_sq = segment.hypot2();
    if len_sq == 0.0 {
        return point_distance(p, v);
    }
    let t = ((p - v).dot(segment) / len_sq).clamp(0.0, 1.0);
    point_distance(p, v + segment * t)
}

/// Densify a stroke by inserting evenly spaced interpolants.
///
/// Inputs shorter than three samples come back unchanged. Otherwise the first
/// and last samples are kept as-is, and each pair `(p[i], p[i+1])` for
/// `i in 1..n-2` contributes `floor(d / 2) + 1` samples starting at `p[i]`.
pub fn resample(points: &[StrokePoint]) -> Vec<StrokePoint> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(n * 2);
    out.push(points[0]);
    for pair in points[1..n - 1].windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let steps = (point_distance(a.to_point(), b.to_point()) / 2.0).floor() as usize + 1;
        for step in 0..steps {
            out.push(a.lerp(b, step as f64 / steps as f64));
        }
    }
    out.push(points[n - 1]);
    out
}

/// Ramer-Douglas-Peucker line simplification.
pub fn simplify(points: &[StrokePoint], tolerance: f64) -> Vec<StrokePoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    // Find point with maximum distance from line between first and last
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = distance_to_segment(point.to_point(), first.to_point(), last.to_point());
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = simplify(&points[..=max_index], tolerance);
        let right = simplify(&points[max_index..], tolerance);

        // Junction point appears in both halves
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Bound a stroke to at most `max` samples, keeping both endpoints.
///
/// Simplifies with a doubling tolerance first and falls back to even
/// decimation. A `max` below two disables the cap.
pub fn cap_points(points: Vec<StrokePoint>, max: usize) -> Vec<StrokePoint> {
    if max < 2 || points.len() <= max {
        return points;
    }

    let mut tolerance = CAP_INITIAL_TOLERANCE;
    let mut reduced = points;
    for _ in 0..CAP_MAX_PASSES {
        reduced = simplify(&reduced, tolerance);
        if reduced.len() <= max {
            return reduced;
        }
        tolerance *= 2.0;
    }

    let last = reduced.len() - 1;
    (0..max)
        .map(|i| reduced[i * last / (max - 1)])
        .collect()
}

/// Curve through the midpoints of consecutive samples.
///
/// Each interior sample is used as a quadratic control point ending at the
/// midpoint to the next sample; the path finishes with a line to the last
/// sample.
pub fn smooth_path(points: &[StrokePoint]) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(first.to_point());
    if points.len() == 1 {
        return path;
    }
    for pair in points[1..].windows(2) {
        let (ctrl, next) = (pair[0].to_point(), pair[1].to_point());
        path.quad_to(ctrl, ctrl.midpoint(next));
    }
    if let Some(last) = points.last() {
        path.line_to(last.to_point());
    }
    path
}

/// Per-segment curves and widths for a pressure-sensitive stroke.
///
/// Segment `i` runs from the midpoint before sample `i` to the midpoint after
/// it, bending through the sample, and is `max(1, size * pressure)` wide.
pub fn pressure_segments(points: &[StrokePoint], size: f64) -> Vec<(BezPath, f64)> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    let width = |p: &StrokePoint| {
        let pressure = p.pressure.unwrap_or(DEFAULT_PRESSURE);
        (size * pressure).max(1.0)
    };

    let mut segments = Vec::with_capacity(n - 1);
    let mut start = points[0].to_point();
    for i in 1..n {
        let here = points[i].to_point();
        let mut path = BezPath::new();
        path.move_to(start);
        if i + 1 < n {
            let end = here.midpoint(points[i + 1].to_point());
            path.quad_to(here, end);
            start = end;
        } else {
            path.line_to(here);
        }
        segments.push((path, width(&points[i])));
    }
    segments
}

/// Outline path for rectangles, circles and lines. `None` for strokes and text.
pub fn element_path(element: &Element) -> Option<BezPath> {
    outline_path(element.kind())
}

/// Outline path for an element kind.
pub fn outline_path(kind: &ElementKind) -> Option<BezPath> {
    match kind {
        ElementKind::Rectangle(extent) => Some(rectangle_path(extent)),
        ElementKind::Circle(extent) => Some(circle_path(extent)),
        ElementKind::Line(extent) => {
            let mut path = BezPath::new();
            path.move_to(extent.origin());
            path.line_to(extent.far_corner());
            Some(path)
        }
        ElementKind::Stroke(_) | ElementKind::Text(_) => None,
    }
}

fn rectangle_path(extent: &Extent) -> BezPath {
    // Corners in drag order so negative extents wind the other way.
    let Extent {
        x,
        y,
        width,
        height,
    } = *extent;
    let mut path = BezPath::new();
    path.move_to((x, y));
    path.line_to((x + width, y));
    path.line_to((x + width, y + height));
    path.line_to((x, y + height));
    path.close_path();
    path
}

fn circle_path(extent: &Extent) -> BezPath {
    let radii = (extent.width.abs() / 2.0, extent.height.abs() / 2.0);
    Ellipse::new(extent.centroid(), radii, 0.0).to_path(PATH_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Shape};

    fn pts(coords: &[(f64, f64)]) -> Vec<StrokePoint> {
        coords.iter().map(|&(x, y)| StrokePoint::new(x, y)).collect()
    }

    #[test]
    fn test_distance_to_segment() {
        let v = Point::new(0.0, 0.0);
        let w = Point::new(10.0, 0.0);
        assert!((distance_to_segment(Point::new(5.0, 3.0), v, w) - 3.0).abs() < f64::EPSILON);
        // Beyond the end clamps to the endpoint
        assert!((distance_to_segment(Point::new(13.0, 4.0), v, w) - 5.0).abs() < f64::EPSILON);
        // Degenerate segment
        assert!((distance_to_segment(Point::new(3.0, 4.0), v, v) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resample_short_input_unchanged() {
        let two = pts(&[(0.0, 0.0), (100.0, 0.0)]);
        assert_eq!(resample(&two), two);
        assert!(resample(&[]).is_empty());
    }

    #[test]
    fn test_resample_preserves_endpoints() {
        let input = vec![
            StrokePoint::with_pressure(0.25, 0.5, 0.3),
            StrokePoint::with_pressure(10.0, 0.0, 0.4),
            StrokePoint::with_pressure(20.0, 0.0, 0.6),
            StrokePoint::with_pressure(30.5, 7.25, 0.9),
        ];
        let out = resample(&input);
        assert_eq!(out.first(), input.first());
        assert_eq!(out.last(), input.last());
    }

    #[test]
    fn test_resample_step_count() {
        // Only the interior pair (p1, p2) is densified: d = 10 -> 6 samples.
        let input = pts(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)]);
        let out = resample(&input);
        assert_eq!(out.len(), 1 + 6 + 1);
        assert!((out[1].x - 10.0).abs() < f64::EPSILON);
        assert!((out[2].x - 10.0 - 10.0 / 6.0).abs() < 1e-9);
        assert!((out[7].x - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resample_is_deterministic() {
        let input = pts(&[(0.0, 0.0), (3.0, 4.0), (9.0, 12.0), (9.0, 20.0), (1.0, 1.0)]);
        assert_eq!(resample(&input), resample(&input));
    }

    #[test]
    fn test_resample_interpolates_pressure() {
        let input = vec![
            StrokePoint::with_pressure(0.0, 0.0, 0.0),
            StrokePoint::with_pressure(0.0, 0.0, 0.0),
            StrokePoint::with_pressure(4.0, 0.0, 1.0),
            StrokePoint::with_pressure(8.0, 0.0, 1.0),
        ];
        let out = resample(&input);
        // d = 4 -> 3 steps: pressures 0, 1/3, 2/3
        assert!((out[2].pressure.unwrap() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_simplify() {
        let input = pts(&[(0.0, 0.0), (1.0, 0.1), (2.0, 0.0), (3.0, 0.1), (4.0, 0.0)]);
        let out = simplify(&input, 0.5);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], input[0]);
        assert_eq!(out[1], input[4]);
    }

    #[test]
    fn test_cap_points() {
        let zigzag: Vec<StrokePoint> = (0..1000)
            .map(|i| StrokePoint::new(i as f64, if i % 2 == 0 { 0.0 } else { 50.0 }))
            .collect();
        let capped = cap_points(zigzag.clone(), 100);
        assert!(capped.len() <= 100);
        assert_eq!(capped.first(), zigzag.first());
        assert_eq!(capped.last(), zigzag.last());

        let short = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(cap_points(short.clone(), 100), short);
        assert_eq!(cap_points(zigzag.clone(), 0).len(), zigzag.len());
    }

    #[test]
    fn test_smooth_path_shape() {
        let path = smooth_path(&pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]));
        let els: Vec<PathEl> = path.elements().to_vec();
        assert!(matches!(els[0], PathEl::MoveTo(_)));
        assert!(matches!(els[1], PathEl::QuadTo(c, e) if c == Point::new(10.0, 0.0) && e == Point::new(10.0, 5.0)));
        assert!(matches!(els[2], PathEl::LineTo(p) if p == Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_pressure_segment_widths() {
        let input = vec![
            StrokePoint::with_pressure(0.0, 0.0, 0.5),
            StrokePoint::with_pressure(10.0, 0.0, 0.1),
            StrokePoint::with_pressure(20.0, 0.0, 1.0),
        ];
        let segments = pressure_segments(&input, 4.0);
        assert_eq!(segments.len(), 2);
        // 4 * 0.1 clamps to 1
        assert!((segments[0].1 - 1.0).abs() < f64::EPSILON);
        assert!((segments[1].1 - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_signed_rectangle_path() {
        let kind = ElementKind::Rectangle(Extent::new(10.0, 10.0, -5.0, -5.0));
        let path = outline_path(&kind).unwrap();
        let bbox = path.bounding_box();
        assert!((bbox.x0 - 5.0).abs() < f64::EPSILON);
        assert!((bbox.x1 - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_circle_path_centre() {
        let kind = ElementKind::Circle(Extent::new(0.0, 0.0, -20.0, 10.0));
        let bbox = outline_path(&kind).unwrap().bounding_box();
        assert!((bbox.center().x + 10.0).abs() < 1e-6);
        assert!((bbox.center().y - 5.0).abs() < 1e-6);
        assert!((bbox.width() - 20.0).abs() < 1e-6);
    }
}
