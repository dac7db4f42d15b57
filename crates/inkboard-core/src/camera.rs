//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 5.0;
/// Factor applied by toolbar zoom in/out.
pub const ZOOM_STEP: f64 = 1.2;
/// Wheel factor when scrolling up (zoom in).
pub const WHEEL_ZOOM_IN: f64 = 1.1;
/// Wheel factor when scrolling down (zoom out).
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Camera manages the view transform for the canvas.
///
/// World space is the infinite plane elements live in. Surface space is the
/// drawing surface's own pixels, and screen space is surface space shifted by
/// `origin`, the surface's top-left corner on screen.
///
/// `surface = world * zoom + offset`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in surface pixels.
    pub offset: Vec2,
    /// Current zoom level.
    pub zoom: f64,
    /// Top-left of the drawing surface in screen coordinates.
    #[serde(default)]
    pub origin: Vec2,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            origin: Vec2::ZERO,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// World to surface transform, a single translate + scale.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        ((screen_point - self.origin - self.offset).to_vec2() / self.zoom).to_point()
    }

    /// Convert a world point to surface coordinates.
    pub fn world_to_surface(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.world_to_surface(world_point) + self.origin
    }

    /// Pan the camera by a screen-space delta. The delta is not scaled by zoom.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the world point under `screen_point` fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let world_point = self.screen_to_world(screen_point);
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        // Solve for the pan that maps world_point back onto screen_point.
        self.offset = (screen_point - self.origin).to_vec2() - world_point.to_vec2() * self.zoom;
    }

    /// Wheel zoom anchored at the pointer: scrolling down zooms out.
    pub fn zoom_wheel(&mut self, delta_y: f64, screen_point: Point) {
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            WHEEL_ZOOM_IN
        };
        self.zoom_at(screen_point, factor);
    }

    /// Reset pan and zoom. The surface origin is left as is.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_origin_and_zoom() {
        let mut camera = Camera::new();
        camera.origin = Vec2::new(20.0, 40.0);
        camera.zoom = 2.0;
        let world = camera.screen_to_world(Point::new(120.0, 240.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);

        let surface = camera.world_to_surface(world);
        assert!((surface.x - 100.0).abs() < f64::EPSILON);
        assert!((surface.y - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        for &zoom in &[MIN_ZOOM, 0.37, 1.0, 2.5, MAX_ZOOM] {
            for &(px, py) in &[(0.0, 0.0), (30.0, -20.0), (-812.5, 4096.25)] {
                let mut camera = Camera::new();
                camera.offset = Vec2::new(px, py);
                camera.origin = Vec2::new(7.0, 13.0);
                camera.zoom = zoom;

                let original = Point::new(123.0, -456.0);
                let back = camera.world_to_screen(camera.screen_to_world(original));
                assert!((back.x - original.x).abs() < 1e-9);
                assert!((back.y - original.y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_zoom_keeps_pointer_fixed() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(-40.0, 75.0);
        camera.origin = Vec2::new(10.0, 10.0);
        let pointer = Point::new(333.0, 121.0);

        for factor in [1.2, 1.2, 0.5, 3.0, 0.9, 1.1] {
            let before = camera.screen_to_world(pointer);
            camera.zoom_at(pointer, factor);
            let after = camera.screen_to_world(pointer);
            assert!((before.x - after.x).abs() < 1e-9);
            assert!((before.y - after.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);

        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);

        // Clamped zoom still holds the pointer fixed
        let pointer = Point::new(50.0, 50.0);
        let before = camera.screen_to_world(pointer);
        camera.zoom_at(pointer, 2.0);
        let after = camera.screen_to_world(pointer);
        assert!((before.x - after.x).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_direction() {
        let mut camera = Camera::new();
        camera.zoom_wheel(120.0, Point::ZERO);
        assert!((camera.zoom - WHEEL_ZOOM_OUT).abs() < f64::EPSILON);
        camera.reset();
        camera.zoom_wheel(-120.0, Point::ZERO);
        assert!((camera.zoom - WHEEL_ZOOM_IN).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan_not_scaled() {
        let mut camera = Camera::new();
        camera.zoom = 4.0;
        camera.pan(Vec2::new(10.0, 20.0));
        assert!((camera.offset.x - 10.0).abs() < f64::EPSILON);
        assert!((camera.offset.y - 20.0).abs() < f64::EPSILON);
    }
}
