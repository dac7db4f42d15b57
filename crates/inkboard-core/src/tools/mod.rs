//! Tool system for the whiteboard.
//!
//! The [`ToolManager`] turns pointer samples into gestures and, when a gesture
//! ends, into at most one element. It never touches the document; the canvas
//! decides whether a produced element is committed.

use crate::eraser::eraser_radius;
use crate::geometry::{cap_points, resample};
use crate::layer::LayerId;
use crate::shapes::{
    DEFAULT_PRESSURE, Element, ElementKind, Extent, Freehand, SerializableColor, StrokePoint,
    Style, Text,
};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Shapes whose drag is shorter than this on both axes are discarded.
pub const MIN_SHAPE_SIZE: f64 = 5.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    Highlighter,
    Eraser,
    Rectangle,
    Circle,
    Line,
    Text,
    Pan,
}

impl ToolKind {
    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Pen,
            ToolKind::Highlighter,
            ToolKind::Eraser,
            ToolKind::Rectangle,
            ToolKind::Circle,
            ToolKind::Line,
            ToolKind::Text,
            ToolKind::Pan,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Pen => "Pen",
            ToolKind::Highlighter => "Highlighter",
            ToolKind::Eraser => "Eraser",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Line => "Line",
            ToolKind::Text => "Text",
            ToolKind::Pan => "Pan",
        }
    }

    /// Whether the tool writes to the active layer.
    pub fn edits_document(&self) -> bool {
        !matches!(self, ToolKind::Pan)
    }

    fn shape_kind(&self, extent: Extent) -> Option<ElementKind> {
        match self {
            ToolKind::Rectangle => Some(ElementKind::Rectangle(extent)),
            ToolKind::Circle => Some(ElementKind::Circle(extent)),
            ToolKind::Line => Some(ElementKind::Line(extent)),
            _ => None,
        }
    }
}

/// The interaction in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pen or highlighter samples captured so far, in world space.
    Drawing { points: Vec<StrokePoint> },
    /// Shape drag in world space.
    Shaping { start: Point, current: Point },
    /// Eraser pass; the cursor is in world space.
    Erasing { cursor: Point },
    /// Camera drag; `last` is in screen space.
    Panning { last: Point },
    /// Waiting for text at a world-space anchor.
    EditingText { anchor: Point },
}

/// Transient drawing for the gesture in progress. Never part of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Live element preview (stroke or shape).
    Preview { kind: ElementKind, style: Style },
    /// Eraser indicator, world space.
    Eraser { center: Point, radius: f64 },
    /// Caret at a pending text anchor.
    TextCaret {
        anchor: Point,
        font_size: f64,
        color: SerializableColor,
    },
}

/// Manages the current tool and its state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current gesture.
    pub gesture: Gesture,
    /// Style applied to new elements.
    pub style: Style,
    /// Last known pointer position in world space, for the eraser indicator.
    hover: Option<Point>,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool, dropping any gesture.
    pub fn set_tool(&mut self, tool: ToolKind) -> Gesture {
        self.current_tool = tool;
        self.cancel()
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    pub fn is_editing_text(&self) -> bool {
        matches!(self.gesture, Gesture::EditingText { .. })
    }

    /// Style snapshot for an element made by the current tool.
    pub fn element_style(&self) -> Style {
        Style {
            is_highlighter: self.current_tool == ToolKind::Highlighter,
            ..self.style.clone()
        }
    }

    /// Begin a gesture at a pointer position.
    pub fn begin(&mut self, world: Point, screen: Point, pressure: Option<f64>) {
        self.hover = Some(world);
        self.gesture = match self.current_tool {
            ToolKind::Pen | ToolKind::Highlighter => Gesture::Drawing {
                points: vec![sample(world, pressure)],
            },
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Line => Gesture::Shaping {
                start: world,
                current: world,
            },
            ToolKind::Eraser => Gesture::Erasing { cursor: world },
            ToolKind::Pan => Gesture::Panning { last: screen },
            ToolKind::Text => Gesture::EditingText { anchor: world },
        };
    }

    /// Feed a pointer move. Returns the screen delta while panning.
    pub fn update(&mut self, world: Point, screen: Point, pressure: Option<f64>) -> Option<Vec2> {
        self.hover = Some(world);
        match &mut self.gesture {
            Gesture::Drawing { points } => {
                points.push(sample(world, pressure));
                None
            }
            Gesture::Shaping { current, .. } => {
                *current = world;
                None
            }
            Gesture::Erasing { cursor } => {
                *cursor = world;
                None
            }
            Gesture::Panning { last } => {
                let delta = screen - *last;
                *last = screen;
                Some(delta)
            }
            Gesture::Idle | Gesture::EditingText { .. } => None,
        }
    }

    /// Finish the gesture, producing the element it drew if it is big enough.
    ///
    /// Strokes are resampled and capped to `max_points`. A pending text edit is
    /// left open; it ends through [`ToolManager::submit_text`].
    pub fn end(&mut self, world: Point, layer: LayerId, max_points: usize) -> Option<Element> {
        if self.is_editing_text() {
            return None;
        }
        let style = self.element_style();
        match std::mem::take(&mut self.gesture) {
            Gesture::Drawing { points } => {
                if points.len() < 2 {
                    log::debug!("stroke discarded: {} sample(s)", points.len());
                    return None;
                }
                let points = cap_points(resample(&points), max_points);
                Some(Element::stroke(layer, style, points))
            }
            Gesture::Shaping { start, .. } => {
                let delta = world - start;
                if delta.x.abs() < MIN_SHAPE_SIZE && delta.y.abs() < MIN_SHAPE_SIZE {
                    log::debug!("shape discarded: drag {:.1}x{:.1}", delta.x, delta.y);
                    return None;
                }
                let kind = self.current_tool.shape_kind(Extent::from_drag(start, world))?;
                Some(Element::new(layer, style, kind))
            }
            _ => None,
        }
    }

    /// Complete a text edit. Whitespace-only text produces nothing.
    pub fn submit_text(&mut self, content: &str, layer: LayerId) -> Option<Element> {
        let Gesture::EditingText { anchor } = self.gesture else {
            return None;
        };
        self.gesture = Gesture::Idle;
        if content.trim().is_empty() {
            return None;
        }
        Some(Element::text(layer, self.style.clone(), anchor, content.to_string()))
    }

    /// Abandon the gesture, returning what was in progress.
    pub fn cancel(&mut self) -> Gesture {
        std::mem::take(&mut self.gesture)
    }

    /// Forget the hover position (pointer left the surface).
    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    /// Overlay for the current gesture, if any.
    pub fn overlay(&self) -> Option<Overlay> {
        match &self.gesture {
            Gesture::Drawing { points } => Some(Overlay::Preview {
                kind: ElementKind::Stroke(Freehand::from_points(resample(points))),
                style: self.element_style(),
            }),
            Gesture::Shaping { start, current } => {
                let kind = self
                    .current_tool
                    .shape_kind(Extent::from_drag(*start, *current))?;
                Some(Overlay::Preview {
                    kind,
                    style: self.element_style(),
                })
            }
            Gesture::Erasing { cursor } => Some(self.eraser_overlay(*cursor)),
            Gesture::EditingText { anchor } => Some(Overlay::TextCaret {
                anchor: *anchor,
                font_size: Text::font_size(&self.style),
                color: self.style.color,
            }),
            Gesture::Idle if self.current_tool == ToolKind::Eraser => {
                self.hover.map(|p| self.eraser_overlay(p))
            }
            Gesture::Idle | Gesture::Panning { .. } => None,
        }
    }

    fn eraser_overlay(&self, center: Point) -> Overlay {
        Overlay::Eraser {
            center,
            radius: eraser_radius(self.style.size),
        }
    }
}

/// Pointer samples always carry pressure; devices without it get the default.
fn sample(world: Point, pressure: Option<f64>) -> StrokePoint {
    StrokePoint::with_pressure(world.x, world.y, pressure.unwrap_or(DEFAULT_PRESSURE))
}
