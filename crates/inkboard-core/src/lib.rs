//! Inkboard Core Library
//!
//! Platform-agnostic data structures and logic for the Inkboard whiteboard:
//! the element model, view transform, history, eraser and tool state.

pub mod camera;
pub mod canvas;
pub mod eraser;
pub mod geometry;
pub mod history;
pub mod layer;
pub mod shapes;
pub mod storage;
pub mod tools;

pub use camera::Camera;
pub use canvas::{Canvas, CanvasDocument, CanvasError, CanvasSettings, FrameSnapshot};
pub use history::History;
pub use layer::{Layer, LayerId, LayerStack};
pub use shapes::{Element, ElementId, ElementKind, SerializableColor, Style};
pub use tools::{Gesture, Overlay, ToolKind, ToolManager};
