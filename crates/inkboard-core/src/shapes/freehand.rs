//! Freehand strokes.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Pressure assumed when the input device reports none.
pub const DEFAULT_PRESSURE: f64 = 0.5;

/// A sampled pen position, optionally with pressure in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: None,
        }
    }

    pub fn with_pressure(x: f64, y: f64, pressure: f64) -> Self {
        Self {
            x,
            y,
            pressure: Some(pressure.clamp(0.0, 1.0)),
        }
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Linear interpolation. Pressure is interpolated only when both ends carry it.
    pub fn lerp(self, other: StrokePoint, t: f64) -> StrokePoint {
        let pressure = match (self.pressure, other.pressure) {
            (Some(a), Some(b)) => Some(a + (b - a) * t),
            (a, _) => a,
        };
        StrokePoint {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            pressure,
        }
    }
}

impl From<Point> for StrokePoint {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// A freehand stroke: an ordered, non-empty list of samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub points: Vec<StrokePoint>,
}

impl Freehand {
    pub fn from_points(points: Vec<StrokePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when any sample carries a pressure value.
    pub fn has_pressure(&self) -> bool {
        self.points.iter().any(|p| p.pressure.is_some())
    }

    pub fn bounds(&self) -> Rect {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(Rect::from_points(first.to_point(), first.to_point()), |acc, p| {
            acc.union_pt(p.to_point())
        })
    }
}
