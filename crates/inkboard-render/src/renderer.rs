//! Renderer trait abstraction.

use inkboard_core::canvas::FrameSnapshot;
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Surface has no area: {width}x{height}")]
    EmptySurface { width: u32, height: u32 },
    #[error("Surface too large: {width}x{height}")]
    SurfaceTooLarge { width: u32, height: u32 },
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Font error: {0}")]
    Font(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Everything the frame draws, captured at the start of the tick.
    pub frame: &'a FrameSnapshot,
    /// Viewport size in pixels.
    pub viewport_size: Size,
    /// Background color.
    pub background_color: Color,
    /// Eraser indicator color.
    pub eraser_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context sized to the frame's viewport.
    pub fn new(frame: &'a FrameSnapshot) -> Self {
        Self {
            frame,
            viewport_size: frame.viewport,
            background_color: Color::from_rgba8(255, 255, 255, 255),
            eraser_color: Color::from_rgba8(239, 68, 68, 255),
        }
    }

    /// Override the viewport size.
    pub fn with_viewport(mut self, size: Size) -> Self {
        self.viewport_size = size;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the eraser indicator color.
    pub fn with_eraser_color(mut self, color: Color) -> Self {
        self.eraser_color = color;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the scene for a frame.
    ///
    /// Called once per tick whether or not anything changed.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
