//! CPU rasterization of a [`Scene`] and PNG export.
//!
//! Ops are painted in order onto a `tiny_skia::Pixmap` with anti-aliasing
//! and non-zero winding, then copied out as straight-alpha RGBA.

use crate::renderer::{RenderResult, RendererError};
use crate::scene::{DrawKind, DrawOp, Scene};
use crate::text::TextShaper;
use image::RgbaImage;
use kurbo::{BezPath, Cap, Join, PathEl};
use peniko::Color;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, StrokeDash, Transform,
};

/// Rasterizes scenes into RGBA images.
#[derive(Debug)]
pub struct RasterRenderer {
    shaper: TextShaper,
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterRenderer {
    /// Rasterizer using a system font for text.
    pub fn new() -> Self {
        Self::with_shaper(TextShaper::from_system())
    }

    pub fn with_shaper(shaper: TextShaper) -> Self {
        Self { shaper }
    }

    pub fn shaper(&self) -> &TextShaper {
        &self.shaper
    }

    /// Paint every op of `scene` into a fresh transparent image.
    pub fn rasterize(&self, scene: &Scene) -> RenderResult<RgbaImage> {
        let size = scene.size();
        let width = size.width.max(0.0).ceil() as u32;
        let height = size.height.max(0.0).ceil() as u32;
        if width == 0 || height == 0 {
            return Err(RendererError::EmptySurface { width, height });
        }
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RendererError::SurfaceTooLarge { width, height })?;

        let has_text = scene
            .ops()
            .iter()
            .any(|op| matches!(op.kind, DrawKind::Text { .. }));
        if has_text && !self.shaper.is_available() {
            log::warn!("No font available, text elements are skipped");
        }

        for op in scene.ops() {
            self.paint_op(&mut pixmap, op);
        }
        log::debug!("Rasterized {} ops at {}x{}", scene.len(), width, height);

        let data: Vec<u8> = pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let c = pixel.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RgbaImage::from_raw(width, height, data)
            .ok_or_else(|| RendererError::Encode("pixel buffer size mismatch".to_string()))
    }

    /// Rasterize and encode as PNG.
    pub fn export_png(&self, scene: &Scene) -> RenderResult<Vec<u8>> {
        let image = self.rasterize(scene)?;
        encode_png(&image)
    }

    fn paint_op(&self, pixmap: &mut Pixmap, op: &DrawOp) {
        let paint = paint(op.color);
        let transform = skia_transform(op);
        match &op.kind {
            DrawKind::Fill(path) => {
                if let Some(path) = skia_path(path) {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
            }
            DrawKind::Stroke { path, style } => {
                if let Some(path) = skia_path(path) {
                    pixmap.stroke_path(&path, &paint, &skia_stroke(style), transform, None);
                }
            }
            DrawKind::Text {
                origin,
                font_size,
                text,
            } => {
                let outline = self.shaper.outline_line(text, *origin, *font_size);
                if let Some(path) = outline.as_ref().and_then(skia_path) {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
            }
        }
    }
}

fn paint(color: Color) -> Paint<'static> {
    let rgba = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    paint
}

fn skia_transform(op: &DrawOp) -> Transform {
    let [a, b, c, d, e, f] = op.transform.as_coeffs().map(|v| v as f32);
    Transform::from_row(a, b, c, d, e, f)
}

/// `None` for paths with no drawable segment.
fn skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let pt = |p: kurbo::Point| (p.x as f32, p.y as f32);
    let mut builder = PathBuilder::new();
    for el in path.iter() {
        match el {
            PathEl::MoveTo(p) => {
                let (x, y) = pt(p);
                builder.move_to(x, y);
            }
            PathEl::LineTo(p) => {
                let (x, y) = pt(p);
                builder.line_to(x, y);
            }
            PathEl::QuadTo(c, p) => {
                let ((cx, cy), (x, y)) = (pt(c), pt(p));
                builder.quad_to(cx, cy, x, y);
            }
            PathEl::CurveTo(c1, c2, p) => {
                let ((x1, y1), (x2, y2), (x, y)) = (pt(c1), pt(c2), pt(p));
                builder.cubic_to(x1, y1, x2, y2, x, y);
            }
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

fn skia_stroke(style: &kurbo::Stroke) -> tiny_skia::Stroke {
    let line_cap = match style.start_cap {
        Cap::Butt => LineCap::Butt,
        Cap::Round => LineCap::Round,
        Cap::Square => LineCap::Square,
    };
    let line_join = match style.join {
        Join::Bevel => LineJoin::Bevel,
        Join::Miter => LineJoin::Miter,
        Join::Round => LineJoin::Round,
    };
    let dashes = style.dash_pattern.iter().map(|d| *d as f32).collect();
    tiny_skia::Stroke {
        width: style.width as f32,
        miter_limit: style.miter_limit as f32,
        line_cap,
        line_join,
        dash: StrokeDash::new(dashes, style.dash_offset as f32),
    }
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| RendererError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::OpSource;
    use kurbo::{Affine, Line, Point, Rect, Shape, Size, Stroke};

    const WHITE: Color = Color::from_rgba8(255, 255, 255, 255);
    const RED: Color = Color::from_rgba8(255, 0, 0, 255);

    fn raster() -> RasterRenderer {
        RasterRenderer::with_shaper(TextShaper::unavailable())
    }

    fn scene_with_background(size: Size) -> Scene {
        let mut scene = Scene::new();
        scene.reset(size);
        let bg = Rect::from_origin_size((0.0, 0.0), size).to_path(0.1);
        scene.fill(OpSource::Background, Affine::IDENTITY, WHITE, bg);
        scene
    }

    #[test]
    fn test_fill_rect_pixels() {
        let mut scene = scene_with_background(Size::new(40.0, 40.0));
        let rect = Rect::new(10.0, 10.0, 30.0, 30.0).to_path(0.1);
        scene.fill(OpSource::Overlay, Affine::IDENTITY, RED, rect);

        let image = raster().rasterize(&scene).unwrap();
        assert_eq!(image.dimensions(), (40, 40));
        assert_eq!(image.get_pixel(20, 20).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(10, 10).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(5, 5).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(30, 30).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_partial_coverage_blends() {
        let mut scene = scene_with_background(Size::new(20.0, 20.0));
        let rect = Rect::new(5.5, 0.0, 15.0, 20.0).to_path(0.1);
        scene.fill(OpSource::Overlay, Affine::IDENTITY, RED, rect);

        let image = raster().rasterize(&scene).unwrap();
        let edge = image.get_pixel(5, 10).0;
        assert_eq!(edge[0], 255);
        assert_eq!(edge[3], 255);
        assert!(edge[1] > 100 && edge[1] < 155);
    }

    #[test]
    fn test_stroke_respects_transform() {
        let mut scene = scene_with_background(Size::new(40.0, 40.0));
        let line = Line::new((2.0, 10.0), (18.0, 10.0)).to_path(0.1);
        scene.stroke(
            OpSource::Overlay,
            &Stroke::new(2.0),
            Affine::scale(2.0),
            RED,
            line,
        );

        let image = raster().rasterize(&scene).unwrap();
        assert_eq!(image.get_pixel(20, 20).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(20, 24).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_translucent_fill_over_background() {
        let mut scene = scene_with_background(Size::new(10.0, 10.0));
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1);
        scene.fill(
            OpSource::Overlay,
            Affine::IDENTITY,
            Color::from_rgba8(0, 0, 255, 128),
            rect,
        );
        let pixel = raster().rasterize(&scene).unwrap().get_pixel(4, 4).0;
        assert_eq!(pixel[2], 255);
        assert_eq!(pixel[3], 255);
        assert!(pixel[0] > 120 && pixel[0] < 135);
    }

    #[test]
    fn test_uncovered_surface_is_transparent() {
        let mut scene = Scene::new();
        scene.reset(Size::new(6.0, 6.0));
        let image = raster().rasterize(&scene).unwrap();
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_text_without_font_is_skipped() {
        let mut scene = scene_with_background(Size::new(40.0, 40.0));
        scene.text(OpSource::Overlay, Affine::IDENTITY, RED, Point::new(2.0, 2.0), 20.0, "hi");
        let image = raster().rasterize(&scene).unwrap();
        assert!(image.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_empty_surface_rejected() {
        let scene = Scene::new();
        assert!(matches!(
            raster().rasterize(&scene),
            Err(RendererError::EmptySurface { width: 0, height: 0 })
        ));
    }

    #[test]
    fn test_export_png_signature() {
        let scene = scene_with_background(Size::new(8.0, 4.0));
        let bytes = raster().export_png(&scene).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
