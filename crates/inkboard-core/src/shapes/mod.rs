//! Element definitions for the whiteboard.
//!
//! An [`Element`] is one committed drawable: a freehand stroke, an outline
//! shape (rectangle, circle, line) or a block of text. Elements never change
//! kind after creation and carry the style that was current when they were
//! committed.

mod extent;
mod freehand;
mod text;

pub use extent::Extent;
pub use freehand::{DEFAULT_PRESSURE, Freehand, StrokePoint};
pub use text::{LINE_HEIGHT, MIN_FONT_SIZE, Text};

use crate::layer::LayerId;
use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Alpha applied to highlighter strokes.
pub const HIGHLIGHTER_ALPHA: u8 = 128;

/// Serializable color representation (RGBA8), stored as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{raw}`")))
    }
}

/// Style snapshot carried by every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Stroke (or text) color.
    pub color: SerializableColor,
    /// Stroke width, shared by outlines and scaled for text.
    pub size: f64,
    /// Highlighter strokes render translucent.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_highlighter: bool,
}

impl Style {
    pub const DEFAULT_SIZE: f64 = 5.0;

    pub fn new(color: SerializableColor, size: f64) -> Self {
        Self {
            color,
            size,
            is_highlighter: false,
        }
    }

    /// The color to paint with, after highlighter translucency.
    pub fn paint_color(&self) -> Color {
        let mut color = self.color;
        if self.is_highlighter {
            color.a = color.a.min(HIGHLIGHTER_ALPHA);
        }
        color.into()
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(SerializableColor::black(), Self::DEFAULT_SIZE)
    }
}

/// Kind-specific geometry of an element, tagged by `type` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Stroke(Freehand),
    Rectangle(Extent),
    Circle(Extent),
    Line(Extent),
    Text(Text),
}

impl ElementKind {
    /// Name of the kind as written to documents.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Stroke(_) => "stroke",
            ElementKind::Rectangle(_) => "rectangle",
            ElementKind::Circle(_) => "circle",
            ElementKind::Line(_) => "line",
            ElementKind::Text(_) => "text",
        }
    }

    /// Axis-aligned bounds in world space.
    pub fn bounds(&self, style: &Style) -> Rect {
        match self {
            ElementKind::Stroke(s) => s.bounds(),
            ElementKind::Rectangle(e) | ElementKind::Circle(e) | ElementKind::Line(e) => e.bounds(),
            ElementKind::Text(t) => t.bounds(style),
        }
    }
}

/// A committed drawable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    id: ElementId,
    pub(crate) layer_id: LayerId,
    style: Style,
    #[serde(flatten)]
    kind: ElementKind,
}

impl Element {
    /// Create an element with a fresh identity.
    pub fn new(layer_id: LayerId, style: Style, kind: ElementKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer_id,
            style,
            kind,
        }
    }

    pub fn stroke(layer_id: LayerId, style: Style, points: Vec<StrokePoint>) -> Self {
        Self::new(layer_id, style, ElementKind::Stroke(Freehand::from_points(points)))
    }

    pub fn rectangle(layer_id: LayerId, style: Style, extent: Extent) -> Self {
        Self::new(layer_id, style, ElementKind::Rectangle(extent))
    }

    pub fn circle(layer_id: LayerId, style: Style, extent: Extent) -> Self {
        Self::new(layer_id, style, ElementKind::Circle(extent))
    }

    pub fn line(layer_id: LayerId, style: Style, extent: Extent) -> Self {
        Self::new(layer_id, style, ElementKind::Line(extent))
    }

    pub fn text(layer_id: LayerId, style: Style, anchor: Point, content: String) -> Self {
        Self::new(layer_id, style, ElementKind::Text(Text::new(anchor, content)))
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn layer_id(&self) -> LayerId {
        self.layer_id
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn bounds(&self) -> Rect {
        self.kind.bounds(&self.style)
    }

    /// Copy of this element moved onto another layer, keeping its identity.
    pub(crate) fn rehomed(&self, layer_id: LayerId) -> Self {
        Self {
            layer_id,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_roundtrip() {
        let color = SerializableColor::from_hex("#ff8000").unwrap();
        assert_eq!(color, SerializableColor::new(255, 128, 0, 255));
        assert_eq!(color.to_hex(), "#ff8000");

        let short = SerializableColor::from_hex("#0f0").unwrap();
        assert_eq!(short, SerializableColor::new(0, 255, 0, 255));

        let translucent = SerializableColor::from_hex("#00000080").unwrap();
        assert_eq!(translucent.a, 128);
        assert_eq!(translucent.to_hex(), "#00000080");

        assert!(SerializableColor::from_hex("red").is_none());
        assert!(SerializableColor::from_hex("#12345").is_none());
    }

    #[test]
    fn test_element_json_is_tagged() {
        let layer = Uuid::new_v4();
        let rect = Element::rectangle(layer, Style::default(), Extent::new(0.0, 0.0, 10.0, -5.0));
        let json = serde_json::to_value(&rect).unwrap();

        assert_eq!(json["type"], "rectangle");
        assert_eq!(json["layerId"], layer.to_string());
        assert_eq!(json["width"], 10.0);
        assert_eq!(json["height"], -5.0);
        assert_eq!(json["style"]["color"], "#000000");
        assert!(json.get("points").is_none());
        assert!(json.get("text").is_none());

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, rect);
    }

    #[test]
    fn test_element_kind_fields_absent_for_other_kinds() {
        let layer = Uuid::new_v4();
        let text = Element::text(layer, Style::default(), Point::new(1.0, 2.0), "hi".into());
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"], "hi");
        assert!(json.get("width").is_none());
        assert!(json.get("points").is_none());
    }

    #[test]
    fn test_highlighter_paint_color() {
        let mut style = Style::default();
        assert_eq!(style.paint_color().to_rgba8().a, 255);
        style.is_highlighter = true;
        assert_eq!(style.paint_color().to_rgba8().a, HIGHLIGHTER_ALPHA);
    }

    #[test]
    fn test_rehomed_keeps_identity() {
        let rect = Element::rectangle(Uuid::new_v4(), Style::default(), Extent::new(0.0, 0.0, 1.0, 1.0));
        let target = Uuid::new_v4();
        let moved = rect.rehomed(target);
        assert_eq!(moved.id(), rect.id());
        assert_eq!(moved.layer_id(), target);
    }
}
