//! Inkboard Render Library
//!
//! Turns canvas frame snapshots into backend-neutral scenes, schedules
//! frame rebuilds, and rasterizes scenes to images for PNG export.

mod pipeline;
mod raster;
mod renderer;
mod scene;
mod scheduler;
mod text;

pub use pipeline::ScenePipeline;
pub use raster::{encode_png, RasterRenderer};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use scene::{DrawKind, DrawOp, OpSource, Scene};
pub use scheduler::{RenderScheduler, DEFAULT_FRAME_RATE};
pub use text::TextShaper;
