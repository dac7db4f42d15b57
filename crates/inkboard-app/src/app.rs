//! Core application state and lifecycle.
//!
//! [`App`] is the headless session a windowing shell would wrap: it owns the
//! canvas, the render loop objects and the raster backend, and applies
//! [`UiAction`]s one at a time.

use crate::actions::UiAction;
use crate::shortcuts::{Command, ShortcutRegistry};
use inkboard_core::canvas::{
    Canvas, CanvasDocument, CanvasError, CanvasSettings, MAX_STROKE_POINTS,
};
use inkboard_core::history::MAX_UNDO_HISTORY;
use inkboard_core::layer::LayerId;
use inkboard_core::shapes::SerializableColor;
use inkboard_core::storage::{
    FileStorage, MemoryStorage, Storage, StorageError, read_document, write_document,
};
use inkboard_render::{
    DEFAULT_FRAME_RATE, RasterRenderer, RenderContext, RenderScheduler, Renderer, RendererError,
    ScenePipeline,
};
use kurbo::{Point, Vec2};
use peniko::Color;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Config(#[source] serde_json::Error),
    #[error("invalid script: {0}")]
    Script(#[source] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub width: f64,
    pub height: f64,
    /// Background colour as CSS hex.
    pub background: String,
    pub zoom_step: f64,
    pub history_capacity: usize,
    pub max_stroke_points: usize,
    pub frame_rate: u32,
    /// Name Ctrl+S saves under in document storage.
    pub document_name: String,
    /// Document storage directory. `None` uses the per-user data directory.
    pub storage_dir: Option<PathBuf>,
    /// Where Ctrl+E writes.
    pub export_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            background: "#ffffff".to_string(),
            zoom_step: inkboard_core::camera::ZOOM_STEP,
            history_capacity: MAX_UNDO_HISTORY,
            max_stroke_points: MAX_STROKE_POINTS,
            frame_rate: DEFAULT_FRAME_RATE,
            document_name: "untitled".to_string(),
            storage_dir: None,
            export_path: PathBuf::from("inkboard.png"),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).map_err(AppError::Config)
    }

    pub fn canvas_settings(&self) -> CanvasSettings {
        CanvasSettings {
            history_capacity: self.history_capacity.max(1),
            max_stroke_points: self.max_stroke_points,
            zoom_step: self.zoom_step,
        }
    }

    /// Open the configured document storage.
    ///
    /// Falls back to memory so a session can still run when the directory
    /// cannot be created.
    pub fn open_storage(&self) -> Box<dyn Storage> {
        let opened = match &self.storage_dir {
            Some(dir) => FileStorage::new(dir.clone()),
            None => FileStorage::default_location(),
        };
        match opened {
            Ok(storage) => {
                log::debug!("Document storage at {}", storage.dir().display());
                Box::new(storage)
            }
            Err(e) => {
                log::warn!("{e}; documents will not outlive this session");
                Box::new(MemoryStorage::new())
            }
        }
    }

    /// Parsed background colour, white when unparseable.
    pub fn background_color(&self) -> Color {
        match SerializableColor::from_hex(&self.background) {
            Some(color) => color.into(),
            None => {
                log::warn!("Invalid background colour {:?}, using white", self.background);
                Color::from_rgba8(255, 255, 255, 255)
            }
        }
    }
}

/// Result of applying one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    /// Valid but had no effect.
    Ignored,
    /// Destructive action refused; resend with `confirmed: true`.
    NeedsConfirmation,
}

impl From<bool> for ActionOutcome {
    fn from(applied: bool) -> Self {
        if applied {
            ActionOutcome::Done
        } else {
            ActionOutcome::Ignored
        }
    }
}

/// A headless whiteboard session.
pub struct App {
    config: AppConfig,
    background: Color,
    canvas: Canvas,
    pipeline: ScenePipeline,
    raster: RasterRenderer,
    scheduler: RenderScheduler,
    storage: Box<dyn Storage>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let storage = config.open_storage();
        Self::with_backends(config, RasterRenderer::new(), storage)
    }

    pub fn with_backends(
        config: AppConfig,
        raster: RasterRenderer,
        storage: Box<dyn Storage>,
    ) -> Self {
        let mut canvas = Canvas::with_settings(config.canvas_settings());
        canvas.resize(config.width, config.height);
        let mut scheduler = RenderScheduler::new(config.frame_rate);
        scheduler.resize();
        Self {
            background: config.background_color(),
            config,
            canvas,
            pipeline: ScenePipeline::new(),
            raster,
            scheduler,
            storage,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn pipeline(&self) -> &ScenePipeline {
        &self.pipeline
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut RenderScheduler {
        &mut self.scheduler
    }

    /// Names of the documents in storage, sorted.
    pub fn stored_documents(&self) -> AppResult<Vec<String>> {
        Ok(self.storage.list()?)
    }

    /// Build the next frame if the scheduler wants one.
    pub fn tick(&mut self) -> bool {
        let frame = self.canvas.snapshot();
        let ctx = RenderContext::new(&frame).with_background(self.background);
        self.scheduler.tick(&mut self.pipeline, &ctx)
    }

    /// Replay a JSON array of actions, ticking after each one.
    pub fn run_script(&mut self, json: &str) -> AppResult<Vec<ActionOutcome>> {
        let actions = UiAction::parse_script(json).map_err(AppError::Script)?;
        log::info!("Running script with {} actions", actions.len());
        self.scheduler.start();
        let outcomes: AppResult<Vec<_>> = actions
            .iter()
            .map(|action| {
                let outcome = self.apply(action);
                self.tick();
                outcome
            })
            .collect();
        self.scheduler.stop();
        outcomes
    }

    /// Apply a single action to the canvas.
    pub fn apply(&mut self, action: &UiAction) -> AppResult<ActionOutcome> {
        log::debug!("Applying {:?}", action);
        let canvas = &mut self.canvas;
        let outcome = match action {
            UiAction::SetTool { tool } => {
                canvas.set_tool(*tool);
                ActionOutcome::Done
            }
            UiAction::SetColor { color } => match SerializableColor::from_hex(color) {
                Some(color) => {
                    canvas.set_color(color);
                    ActionOutcome::Done
                }
                None => {
                    log::warn!("Ignoring invalid colour {color:?}");
                    ActionOutcome::Ignored
                }
            },
            UiAction::SetSize { size } => canvas.set_size(*size).into(),
            UiAction::Undo => canvas.undo().into(),
            UiAction::Redo => canvas.redo().into(),
            UiAction::Clear { confirmed } => match canvas.clear(*confirmed) {
                Ok(cleared) => cleared.into(),
                Err(CanvasError::ConfirmationRequired) => ActionOutcome::NeedsConfirmation,
                Err(e) => return Err(e.into()),
            },
            UiAction::Save { path } => {
                write_document(path, canvas.document())?;
                ActionOutcome::Done
            }
            UiAction::Load { path, confirmed } => {
                replace_document(canvas, *confirmed, || read_document(path))?
            }
            UiAction::SaveLocal { name } => {
                self.storage.save(name, canvas.document())?;
                ActionOutcome::Done
            }
            UiAction::LoadLocal { name, confirmed } => {
                replace_document(canvas, *confirmed, || self.storage.load(name))?
            }
            UiAction::DeleteLocal { name } => {
                if !self.storage.exists(name)? {
                    return Ok(ActionOutcome::Ignored);
                }
                self.storage.delete(name)?;
                ActionOutcome::Done
            }
            UiAction::ExportPng { path } => {
                self.export_png_to(path)?;
                ActionOutcome::Done
            }
            UiAction::ZoomIn => {
                canvas.zoom_in();
                ActionOutcome::Done
            }
            UiAction::ZoomOut => {
                canvas.zoom_out();
                ActionOutcome::Done
            }
            UiAction::ZoomWheel { delta_y, x, y } => {
                canvas.zoom_wheel(*delta_y, Point::new(*x, *y));
                ActionOutcome::Done
            }
            UiAction::Pan { dx, dy } => {
                canvas.pan_by(Vec2::new(*dx, *dy));
                ActionOutcome::Done
            }
            UiAction::PointerDown { x, y, pressure } => {
                canvas.pointer_down(Point::new(*x, *y), *pressure).into()
            }
            UiAction::PointerMove { x, y, pressure } => {
                canvas.pointer_move(Point::new(*x, *y), *pressure);
                ActionOutcome::Done
            }
            UiAction::PointerUp { x, y } => canvas.pointer_up(Point::new(*x, *y)).is_some().into(),
            UiAction::PointerLeave => {
                canvas.pointer_leave();
                ActionOutcome::Done
            }
            UiAction::SubmitText { text } => canvas.submit_text(text).is_some().into(),
            UiAction::CancelText => canvas.cancel_text().into(),
            UiAction::AddLayer => {
                canvas.add_layer();
                ActionOutcome::Done
            }
            UiAction::DeleteLayer { index } => {
                self.with_layer(*index, |canvas, id| canvas.delete_layer(id).map(|_| true))?
            }
            UiAction::SetActiveLayer { index } => {
                self.with_layer(*index, |canvas, id| canvas.set_active_layer(id).map(|_| true))?
            }
            UiAction::ToggleLayerVisible { index } => {
                self.with_layer(*index, |canvas, id| canvas.toggle_layer_visible(id).map(|_| true))?
            }
            UiAction::ToggleLayerLock { index } => {
                self.with_layer(*index, |canvas, id| canvas.toggle_layer_lock(id).map(|_| true))?
            }
            UiAction::Resize { width, height } => {
                canvas.resize(*width, *height);
                self.scheduler.resize();
                ActionOutcome::Done
            }
        };
        Ok(outcome)
    }

    /// Translate a key press through the shortcut registry and apply it.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool) -> AppResult<ActionOutcome> {
        let Some(command) = ShortcutRegistry::lookup(key, ctrl, shift) else {
            return Ok(ActionOutcome::Ignored);
        };
        let action = match command {
            Command::Tool(tool) => UiAction::SetTool { tool },
            Command::Undo => UiAction::Undo,
            Command::Redo => UiAction::Redo,
            Command::Save => UiAction::SaveLocal {
                name: self.config.document_name.clone(),
            },
            Command::ExportPng => UiAction::ExportPng {
                path: self.config.export_path.clone(),
            },
            Command::ZoomIn => UiAction::ZoomIn,
            Command::ZoomOut => UiAction::ZoomOut,
            Command::Cancel => {
                let cancelled_text = self.canvas.cancel_text();
                self.canvas.pointer_leave();
                return Ok(cancelled_text.into());
            }
        };
        self.apply(&action)
    }

    /// Rasterize the current view to PNG bytes.
    pub fn export_png(&mut self) -> AppResult<Vec<u8>> {
        let frame = self.canvas.snapshot();
        let ctx = RenderContext::new(&frame).with_background(self.background);
        let mut pipeline = ScenePipeline::new();
        pipeline.build_scene(&ctx);
        Ok(self.raster.export_png(pipeline.scene())?)
    }

    pub fn export_png_to(&mut self, path: &Path) -> AppResult<()> {
        let png = self.export_png()?;
        std::fs::write(path, &png)?;
        log::info!("Exported PNG to: {:?}", path);
        Ok(())
    }

    /// Size the viewport to the document's content plus `padding` and reset
    /// the view so all of it is visible at 100% zoom.
    pub fn fit_to_content(&mut self, padding: f64) -> bool {
        let Some(bounds) = self.canvas.document().bounds() else {
            return false;
        };
        self.canvas.reset_view();
        self.canvas
            .resize(bounds.width() + 2.0 * padding, bounds.height() + 2.0 * padding);
        self.canvas
            .pan_by(Vec2::new(padding - bounds.x0, padding - bounds.y0));
        self.scheduler.resize();
        true
    }

    fn with_layer(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Canvas, LayerId) -> Result<bool, CanvasError>,
    ) -> AppResult<ActionOutcome> {
        let Some(id) = self.canvas.layers().layers().get(index).map(|l| l.id) else {
            log::warn!("No layer at index {index}");
            return Ok(ActionOutcome::Ignored);
        };
        match f(&mut self.canvas, id) {
            Ok(applied) => Ok(applied.into()),
            Err(CanvasError::LastLayer) => {
                log::warn!("Cannot delete the last layer");
                Ok(ActionOutcome::Ignored)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Swap in a document read by `read`, asking first when content would be lost.
fn replace_document(
    canvas: &mut Canvas,
    confirmed: bool,
    read: impl FnOnce() -> Result<CanvasDocument, StorageError>,
) -> AppResult<ActionOutcome> {
    if !canvas.document().is_empty() && !confirmed {
        return Ok(ActionOutcome::NeedsConfirmation);
    }
    canvas.load_document(read()?);
    Ok(ActionOutcome::Done)
}
