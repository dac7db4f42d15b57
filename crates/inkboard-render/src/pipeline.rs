//! Per-frame scene construction.
//!
//! Paint order: background, then each visible layer bottom to top with its
//! elements in document order, then the overlay for the gesture in progress.

use crate::renderer::{RenderContext, Renderer};
use crate::scene::{OpSource, Scene};
use inkboard_core::geometry::{outline_path, pressure_segments, smooth_path};
use inkboard_core::shapes::{ElementKind, Freehand, Style, Text};
use inkboard_core::tools::Overlay;
use kurbo::{Affine, BezPath, Cap, Circle, Join, Rect, Shape as _, Stroke};
use peniko::Color;

/// Tolerance when converting circles to paths.
const PATH_TOLERANCE: f64 = 0.1;

/// Eraser indicator outline width in screen pixels.
const ERASER_OUTLINE_PX: f64 = 1.0;

/// Eraser indicator fill alpha.
const ERASER_FILL_ALPHA: f32 = 0.15;

/// Text caret width in screen pixels.
const CARET_PX: f64 = 1.5;

/// Builds a [`Scene`] from a frame snapshot.
#[derive(Debug)]
pub struct ScenePipeline {
    scene: Scene,
    zoom: f64,
}

impl Default for ScenePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenePipeline {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            zoom: 1.0,
        }
    }

    /// The scene built by the last call to [`Renderer::build_scene`].
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    fn render_element(&mut self, source: OpSource, kind: &ElementKind, style: &Style, transform: Affine) {
        let color = style.paint_color();
        match kind {
            ElementKind::Stroke(stroke) => self.render_stroke(source, stroke, style, color, transform),
            ElementKind::Text(text) => self.render_text(source, text, style, color, transform),
            ElementKind::Rectangle(_) | ElementKind::Circle(_) | ElementKind::Line(_) => {
                if let Some(path) = outline_path(kind) {
                    let stroke = Stroke::new(style.size);
                    self.scene.stroke(source, &stroke, transform, color, path);
                }
            }
        }
    }

    fn render_stroke(
        &mut self,
        source: OpSource,
        stroke: &Freehand,
        style: &Style,
        color: Color,
        transform: Affine,
    ) {
        match stroke.points.as_slice() {
            [] => {}
            [only] => {
                // A single sample renders as a dot
                let dot = Circle::new(only.to_point(), (style.size / 2.0).max(0.5));
                self.scene
                    .fill(source, transform, color, dot.to_path(PATH_TOLERANCE));
            }
            points if stroke.has_pressure() => {
                for (path, width) in pressure_segments(points, style.size) {
                    self.scene
                        .stroke(source, &round_stroke(width), transform, color, path);
                }
            }
            points => {
                let path = smooth_path(points);
                self.scene
                    .stroke(source, &round_stroke(style.size), transform, color, path);
            }
        }
    }

    fn render_text(&mut self, source: OpSource, text: &Text, style: &Style, color: Color, transform: Affine) {
        let font_size = Text::font_size(style);
        for (index, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let origin = text.line_origin(index, font_size);
            self.scene
                .text(source, transform, color, origin, font_size, line);
        }
    }

    fn render_overlay(&mut self, overlay: &Overlay, ctx: &RenderContext, transform: Affine) {
        match overlay {
            Overlay::Preview { kind, style } => {
                self.render_element(OpSource::Overlay, kind, style, transform);
            }
            Overlay::Eraser { center, radius } => {
                let circle = Circle::new(*center, *radius).to_path(PATH_TOLERANCE);
                let fill = ctx.eraser_color.multiply_alpha(ERASER_FILL_ALPHA);
                self.scene
                    .fill(OpSource::Overlay, transform, fill, circle.clone());
                // Constant on-screen thickness
                let outline = Stroke::new(ERASER_OUTLINE_PX / self.zoom);
                self.scene
                    .stroke(OpSource::Overlay, &outline, transform, ctx.eraser_color, circle);
            }
            Overlay::TextCaret {
                anchor,
                font_size,
                color,
            } => {
                let mut path = BezPath::new();
                path.move_to(*anchor);
                path.line_to((anchor.x, anchor.y + font_size));
                let stroke = Stroke::new(CARET_PX / self.zoom);
                self.scene
                    .stroke(OpSource::Overlay, &stroke, transform, (*color).into(), path);
            }
        }
    }
}

fn round_stroke(width: f64) -> Stroke {
    Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round)
}

impl Renderer for ScenePipeline {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let frame = ctx.frame;
        self.scene.reset(ctx.viewport_size);
        self.zoom = frame.camera.zoom;

        let viewport = Rect::from_origin_size((0.0, 0.0), ctx.viewport_size);
        self.scene.fill(
            OpSource::Background,
            Affine::IDENTITY,
            self.background_color(ctx),
            viewport.to_path(PATH_TOLERANCE),
        );

        let camera_transform = frame.camera.transform();

        for layer in frame.layers.iter().filter(|l| l.visible) {
            for element in frame.elements_on(layer.id) {
                self.render_element(
                    OpSource::Element(element.id()),
                    element.kind(),
                    element.style(),
                    camera_transform,
                );
            }
        }

        if let Some(overlay) = &frame.overlay {
            self.render_overlay(overlay, ctx, camera_transform);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::DrawKind;
    use inkboard_core::canvas::Canvas;
    use inkboard_core::shapes::{Element, Extent, StrokePoint};
    use inkboard_core::tools::ToolKind;
    use kurbo::{Point, Vec2};

    fn build(canvas: &Canvas) -> Scene {
        let frame = canvas.snapshot();
        let mut pipeline = ScenePipeline::new();
        pipeline.build_scene(&RenderContext::new(&frame));
        pipeline.take_scene()
    }

    fn sized_canvas() -> Canvas {
        let mut canvas = Canvas::new();
        canvas.resize(200.0, 100.0);
        canvas
    }

    #[test]
    fn test_empty_scene_has_background() {
        let scene = build(&sized_canvas());
        assert_eq!(scene.len(), 1);
        let op = &scene.ops()[0];
        assert_eq!(op.source, OpSource::Background);
        assert_eq!(op.transform, Affine::IDENTITY);
    }

    #[test]
    fn test_layer_order_and_visibility() {
        let mut canvas = sized_canvas();
        let bottom = canvas.layers().active_id().unwrap();
        let top = canvas.add_layer();
        let style = Style::default();
        let on_top = canvas
            .commit_element(Element::line(top, style.clone(), Extent::new(0.0, 0.0, 10.0, 0.0)))
            .unwrap();
        canvas.set_active_layer(bottom).unwrap();
        let on_bottom = canvas
            .commit_element(Element::line(bottom, style, Extent::new(0.0, 5.0, 10.0, 0.0)))
            .unwrap();

        let scene = build(&canvas);
        let sources: Vec<OpSource> = scene.ops().iter().map(|op| op.source).collect();
        assert_eq!(
            sources,
            vec![
                OpSource::Background,
                OpSource::Element(on_bottom),
                OpSource::Element(on_top)
            ]
        );

        canvas.toggle_layer_visible(top).unwrap();
        let scene = build(&canvas);
        assert_eq!(scene.ops_for(on_top).count(), 0);
        assert_eq!(scene.ops_for(on_bottom).count(), 1);
    }

    #[test]
    fn test_camera_transform_applied() {
        let mut canvas = sized_canvas();
        canvas.pan_by(Vec2::new(30.0, 40.0));
        canvas.zoom_wheel(-1.0, Point::new(30.0, 40.0));
        let layer = canvas.layers().active_id().unwrap();
        let id = canvas
            .commit_element(Element::rectangle(layer, Style::default(), Extent::new(0.0, 0.0, 20.0, 20.0)))
            .unwrap();

        let scene = build(&canvas);
        let op = scene.ops_for(id).next().unwrap();
        assert_eq!(op.transform, canvas.camera().transform());
    }

    #[test]
    fn test_pressure_stroke_splits_segments() {
        let mut canvas = sized_canvas();
        let layer = canvas.layers().active_id().unwrap();
        let points = vec![
            StrokePoint::with_pressure(0.0, 0.0, 0.2),
            StrokePoint::with_pressure(10.0, 0.0, 0.5),
            StrokePoint::with_pressure(20.0, 0.0, 1.0),
        ];
        let pressured = canvas
            .commit_element(Element::stroke(layer, Style::default(), points))
            .unwrap();
        let plain_points = vec![
            StrokePoint::new(0.0, 10.0),
            StrokePoint::new(10.0, 10.0),
            StrokePoint::new(20.0, 10.0),
        ];
        let plain = canvas
            .commit_element(Element::stroke(layer, Style::default(), plain_points))
            .unwrap();

        let scene = build(&canvas);
        assert_eq!(scene.ops_for(pressured).count(), 2);
        assert_eq!(scene.ops_for(plain).count(), 1);
        let DrawKind::Stroke { style, .. } = &scene.ops_for(pressured).last().unwrap().kind else {
            panic!("expected stroke op");
        };
        assert!((style.width - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drawn_stroke_without_pressure_uses_default_width() {
        let mut canvas = sized_canvas();
        canvas.pointer_down(Point::new(0.0, 0.0), None);
        for x in [10.0, 20.0, 30.0] {
            canvas.pointer_move(Point::new(x, 0.0), None);
        }
        let id = canvas.pointer_up(Point::new(30.0, 0.0)).unwrap();

        let scene = build(&canvas);
        let widths: Vec<f64> = scene
            .ops_for(id)
            .filter_map(|op| match &op.kind {
                DrawKind::Stroke { style, .. } => Some(style.width),
                _ => None,
            })
            .collect();
        assert!(widths.len() > 1);
        assert!(widths.iter().all(|w| (w - 2.5).abs() < f64::EPSILON));
    }

    #[test]
    fn test_text_lines_offset() {
        let mut canvas = sized_canvas();
        let layer = canvas.layers().active_id().unwrap();
        let mut style = Style::default();
        style.size = 4.0;
        let id = canvas
            .commit_element(Element::text(layer, style, Point::new(10.0, 10.0), "one\ntwo".into()))
            .unwrap();

        let scene = build(&canvas);
        let origins: Vec<(Point, f64)> = scene
            .ops_for(id)
            .filter_map(|op| match &op.kind {
                DrawKind::Text {
                    origin, font_size, ..
                } => Some((*origin, *font_size)),
                _ => None,
            })
            .collect();
        assert_eq!(origins.len(), 2);
        assert!((origins[0].1 - 20.0).abs() < f64::EPSILON);
        assert!((origins[1].0.y - 34.0).abs() < 1e-9);
    }

    #[test]
    fn test_eraser_outline_is_zoom_compensated() {
        let mut canvas = sized_canvas();
        canvas.set_tool(ToolKind::Eraser);
        for _ in 0..5 {
            canvas.zoom_in();
        }
        canvas.pointer_move(Point::new(50.0, 50.0), None);

        let zoom = canvas.camera().zoom;
        let scene = build(&canvas);
        let outline = scene
            .ops()
            .iter()
            .filter(|op| op.source == OpSource::Overlay)
            .find_map(|op| match &op.kind {
                DrawKind::Stroke { style, .. } => Some(style.width),
                _ => None,
            })
            .unwrap();
        assert!((outline * zoom - ERASER_OUTLINE_PX).abs() < 1e-9);
    }

    #[test]
    fn test_preview_not_in_document() {
        let mut canvas = sized_canvas();
        canvas.set_tool(ToolKind::Circle);
        canvas.pointer_down(Point::new(10.0, 10.0), None);
        canvas.pointer_move(Point::new(60.0, 40.0), None);

        let scene = build(&canvas);
        assert!(scene.ops().iter().any(|op| op.source == OpSource::Overlay));
        assert!(canvas.document().is_empty());

        canvas.pointer_leave();
        let scene = build(&canvas);
        assert!(scene.ops().iter().all(|op| op.source != OpSource::Overlay));
    }
}
