//! Backend-neutral display list.

use inkboard_core::shapes::ElementId;
use kurbo::{Affine, BezPath, Point, Size, Stroke};
use peniko::Color;

/// What produced a draw op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpSource {
    Background,
    Element(ElementId),
    Overlay,
}

/// Geometry of a draw op, in the op's local space.
#[derive(Debug, Clone)]
pub enum DrawKind {
    /// Non-zero fill.
    Fill(BezPath),
    Stroke { path: BezPath, style: Stroke },
    /// One line of text, top-left at `origin`.
    Text {
        origin: Point,
        font_size: f64,
        text: String,
    },
}

/// A single draw command.
#[derive(Debug, Clone)]
pub struct DrawOp {
    pub source: OpSource,
    /// Local to surface transform.
    pub transform: Affine,
    pub color: Color,
    pub kind: DrawKind,
}

/// Ordered draw commands for one frame, painted first to last.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    ops: Vec<DrawOp>,
    size: Size,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all ops and set the surface size.
    pub fn reset(&mut self, size: Size) {
        self.ops.clear();
        self.size = size;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn fill(&mut self, source: OpSource, transform: Affine, color: Color, path: BezPath) {
        self.ops.push(DrawOp {
            source,
            transform,
            color,
            kind: DrawKind::Fill(path),
        });
    }

    pub fn stroke(
        &mut self,
        source: OpSource,
        style: &Stroke,
        transform: Affine,
        color: Color,
        path: BezPath,
    ) {
        self.ops.push(DrawOp {
            source,
            transform,
            color,
            kind: DrawKind::Stroke {
                path,
                style: style.clone(),
            },
        });
    }

    pub fn text(
        &mut self,
        source: OpSource,
        transform: Affine,
        color: Color,
        origin: Point,
        font_size: f64,
        text: &str,
    ) {
        self.ops.push(DrawOp {
            source,
            transform,
            color,
            kind: DrawKind::Text {
                origin,
                font_size,
                text: text.to_string(),
            },
        });
    }

    /// Ops produced by one element, in paint order.
    pub fn ops_for(&self, id: ElementId) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(move |op| op.source == OpSource::Element(id))
    }
}
