//! Text elements.

use super::Style;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Smallest font size a text element renders at.
pub const MIN_FONT_SIZE: f64 = 12.0;

/// Baseline-to-baseline distance as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

/// Font size per unit of style size.
const SIZE_TO_FONT: f64 = 5.0;

/// Average advance used for bounds when no font metrics are available.
const APPROX_CHAR_WIDTH: f64 = 0.6;

/// Multi-line text, top-anchored at `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "text")]
    pub content: String,
}

impl Text {
    pub fn new(anchor: Point, content: String) -> Self {
        Self {
            x: anchor.x,
            y: anchor.y,
            content,
        }
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Lines split on `\n`. A trailing newline starts an empty last line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
    }

    /// Font size for a given style.
    pub fn font_size(style: &Style) -> f64 {
        (style.size * SIZE_TO_FONT).max(MIN_FONT_SIZE)
    }

    /// Top-left of line `index`.
    pub fn line_origin(&self, index: usize, font_size: f64) -> Point {
        Point::new(self.x, self.y + index as f64 * LINE_HEIGHT * font_size)
    }

    /// Approximate bounds from character counts.
    pub fn bounds(&self, style: &Style) -> Rect {
        let font_size = Self::font_size(style);
        let (count, widest) = self
            .lines()
            .fold((0usize, 0usize), |(n, w), line| (n + 1, w.max(line.chars().count())));
        let width = widest as f64 * font_size * APPROX_CHAR_WIDTH;
        let height = count.max(1) as f64 * font_size * LINE_HEIGHT;
        Rect::new(self.x, self.y, self.x + width, self.y + height)
    }
}
