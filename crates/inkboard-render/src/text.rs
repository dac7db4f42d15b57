//! Text outlines for raster export.
//!
//! A sans-serif face is located with `fontdb`, lines are shaped with
//! `rustybuzz`, and glyph outlines are collected into a kurbo path.

use crate::renderer::{RenderResult, RendererError};
use kurbo::{Affine, BezPath, Point};
use rustybuzz::ttf_parser;

/// Font bytes plus face index within the file.
struct FaceData {
    data: Vec<u8>,
    index: u32,
}

/// Shapes single lines of text into outlines.
#[derive(Default)]
pub struct TextShaper {
    face: Option<FaceData>,
}

impl std::fmt::Debug for TextShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextShaper")
            .field("available", &self.is_available())
            .finish()
    }
}

impl TextShaper {
    /// Look up a system sans-serif face, falling back to any face at all.
    ///
    /// Without system fonts the shaper is still usable; text just produces
    /// no outlines.
    pub fn from_system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let query = fontdb::Query {
            families: &[fontdb::Family::SansSerif],
            ..Default::default()
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|face| face.id));
        let face = id.and_then(|id| {
            db.with_face_data(id, |data, index| FaceData {
                data: data.to_vec(),
                index,
            })
        });
        if face.is_none() {
            log::warn!("no system font found; text will not be rasterized");
        }
        Self { face }
    }

    /// A shaper with no font. Text is skipped.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Use a specific font file.
    pub fn from_font_data(data: Vec<u8>, index: u32) -> RenderResult<Self> {
        if rustybuzz::Face::from_slice(&data, index).is_none() {
            return Err(RendererError::Font("unparseable font data".to_string()));
        }
        Ok(Self {
            face: Some(FaceData { data, index }),
        })
    }

    pub fn is_available(&self) -> bool {
        self.face.is_some()
    }

    /// Outline of one line of text, top-left at `origin`.
    pub fn outline_line(&self, text: &str, origin: Point, font_size: f64) -> Option<BezPath> {
        let face_data = self.face.as_ref()?;
        let face = rustybuzz::Face::from_slice(&face_data.data, face_data.index)?;

        let scale = font_size / f64::from(face.units_per_em());
        let ascent = f64::from(face.ascender()) * scale;

        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        let glyphs = rustybuzz::shape(&face, &[], buffer);

        let mut path = BezPath::new();
        let mut pen_x = 0.0;
        for (info, pos) in glyphs.glyph_infos().iter().zip(glyphs.glyph_positions()) {
            let x = origin.x + (pen_x + f64::from(pos.x_offset)) * scale;
            let y = origin.y + ascent - f64::from(pos.y_offset) * scale;
            // Font units are y-up
            let transform = Affine::new([scale, 0.0, 0.0, -scale, x, y]);
            let mut bridge = PathBridge {
                path: &mut path,
                transform,
            };
            // glyph ids from rustybuzz always fit in u16
            let glyph = ttf_parser::GlyphId(info.glyph_id as u16);
            face.outline_glyph(glyph, &mut bridge);
            pen_x += f64::from(pos.x_advance);
        }
        Some(path)
    }
}

/// Feeds ttf outline events into a kurbo path.
struct PathBridge<'a> {
    path: &'a mut BezPath,
    transform: Affine,
}

impl PathBridge<'_> {
    fn point(&self, x: f32, y: f32) -> Point {
        self.transform * Point::new(f64::from(x), f64::from(y))
    }
}

impl ttf_parser::OutlineBuilder for PathBridge<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.point(x1, y1), self.point(x, y));
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.point(x1, y1), self.point(x2, y2), self.point(x, y));
        self.path.curve_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}
