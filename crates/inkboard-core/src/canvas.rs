//! Canvas document and state management.
//!
//! [`Canvas`] owns the document, camera, tool state and history, and exposes
//! the command surface the UI drives. Every element mutation a user can see
//! ends in exactly one history commit.

use crate::camera::Camera;
use crate::eraser;
use crate::history::{History, MAX_UNDO_HISTORY, Snapshot};
use crate::layer::{Layer, LayerError, LayerId, LayerStack};
use crate::shapes::{Element, ElementId, SerializableColor};
use crate::tools::{Gesture, Overlay, ToolKind, ToolManager};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Schema version written to saved documents.
pub const DOCUMENT_VERSION: u32 = 1;

/// Default cap on samples kept per committed stroke.
pub const MAX_STROKE_POINTS: usize = 4096;

/// Errors surfaced by canvas commands.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    #[error("target layer is missing, locked or hidden")]
    InvalidTargetLayer,
    #[error("cannot delete the last remaining layer")]
    LastLayer,
    #[error("no layer with that id")]
    UnknownLayer,
    #[error("this action discards the current document and needs confirmation")]
    ConfirmationRequired,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<LayerError> for CanvasError {
    fn from(err: LayerError) -> Self {
        match err {
            LayerError::LastLayer => CanvasError::LastLayer,
            LayerError::UnknownLayer => CanvasError::UnknownLayer,
        }
    }
}

/// On-disk document shape, borrowed for saving.
#[derive(Serialize)]
struct DocumentFileRef<'a> {
    version: u32,
    elements: &'a [Arc<Element>],
    layers: &'a [Layer],
}

/// On-disk document shape, owned for loading.
#[derive(Deserialize)]
struct DocumentFile {
    #[serde(default)]
    version: Option<u32>,
    elements: Vec<Element>,
    #[serde(default)]
    layers: Option<Vec<Layer>>,
}

/// The elements and layers of a whiteboard.
///
/// Element order is paint order within a layer; layer order is paint order
/// across layers.
#[derive(Debug, Clone, Default)]
pub struct CanvasDocument {
    elements: Vec<Arc<Element>>,
    layers: LayerStack,
}

impl CanvasDocument {
    /// Create a new empty document with one layer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[Arc<Element>] {
        &self.elements
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().map(|e| &**e).find(|e| e.id() == id)
    }

    /// Elements on one layer, in paint order.
    pub fn elements_on(&self, layer: LayerId) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .map(|e| &**e)
            .filter(move |e| e.layer_id() == layer)
    }

    /// Bounding box of all elements.
    pub fn bounds(&self) -> Option<Rect> {
        self.elements
            .iter()
            .map(|e| e.bounds())
            .reduce(|acc, b| acc.union(b))
    }

    /// Serialize to the JSON document format.
    pub fn to_json(&self) -> Result<String, CanvasError> {
        let file = DocumentFileRef {
            version: DOCUMENT_VERSION,
            elements: &self.elements,
            layers: self.layers.layers(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Parse the JSON document format.
    ///
    /// `elements` must be present and a list. Missing or empty `layers` get a
    /// single default layer, and elements pointing at unknown layers move to
    /// the first layer.
    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| CanvasError::MalformedDocument(e.to_string()))?;
        match value.get("elements") {
            Some(serde_json::Value::Array(_)) => {}
            Some(_) => {
                return Err(CanvasError::MalformedDocument(
                    "`elements` is not a list".to_string(),
                ));
            }
            None => {
                return Err(CanvasError::MalformedDocument(
                    "missing `elements`".to_string(),
                ));
            }
        }
        let file: DocumentFile = serde_json::from_value(value)
            .map_err(|e| CanvasError::MalformedDocument(e.to_string()))?;
        if let Some(version) = file.version.filter(|v| *v != DOCUMENT_VERSION) {
            log::warn!("document version {version} read as version {DOCUMENT_VERSION}");
        }

        let layers = LayerStack::from_layers(file.layers.unwrap_or_default());
        let fallback = layers.first().map(|l| l.id);
        let elements = file
            .elements
            .into_iter()
            .map(|element| match fallback {
                Some(first) if !layers.contains(element.layer_id()) => {
                    Arc::new(element.rehomed(first))
                }
                _ => Arc::new(element),
            })
            .collect();

        Ok(Self { elements, layers })
    }

    fn snapshot(&self) -> Snapshot {
        self.elements.iter().cloned().collect()
    }
}

/// Tunables for a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSettings {
    /// History entries kept.
    pub history_capacity: usize,
    /// Samples kept per committed stroke.
    pub max_stroke_points: usize,
    /// Factor for toolbar zoom in/out.
    pub zoom_step: f64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            history_capacity: MAX_UNDO_HISTORY,
            max_stroke_points: MAX_STROKE_POINTS,
            zoom_step: crate::camera::ZOOM_STEP,
        }
    }
}

/// Immutable view of everything one frame needs.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub elements: Snapshot,
    pub layers: Vec<Layer>,
    pub camera: Camera,
    pub overlay: Option<Overlay>,
    pub viewport: Size,
}

impl FrameSnapshot {
    /// Elements on one layer, in paint order.
    pub fn elements_on(&self, layer: LayerId) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .map(|e| &**e)
            .filter(move |e| e.layer_id() == layer)
    }
}

/// The whiteboard: document, view, tools and history.
#[derive(Debug, Clone)]
pub struct Canvas {
    document: CanvasDocument,
    camera: Camera,
    tools: ToolManager,
    history: History,
    settings: CanvasSettings,
    viewport: Size,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create an empty canvas with default settings.
    pub fn new() -> Self {
        Self::with_settings(CanvasSettings::default())
    }

    pub fn with_settings(settings: CanvasSettings) -> Self {
        let document = CanvasDocument::new();
        let history = History::with_capacity(document.snapshot(), settings.history_capacity);
        Self {
            document,
            camera: Camera::new(),
            tools: ToolManager::new(),
            history,
            settings,
            viewport: Size::ZERO,
        }
    }

    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn layers(&self) -> &LayerStack {
        &self.document.layers
    }

    // --- Pointer input ---

    /// Start a gesture. Returns `false` when nothing started.
    ///
    /// Drawing tools need a visible, unlocked active layer; panning always
    /// works. A pending text edit blocks new gestures.
    pub fn pointer_down(&mut self, screen: Point, pressure: Option<f64>) -> bool {
        if self.tools.is_editing_text() {
            return false;
        }
        if self.tools.current_tool.edits_document() && !self.document.layers.accepts_commits() {
            log::warn!("pointer down ignored: active layer is locked or hidden");
            return false;
        }
        let world = self.camera.screen_to_world(screen);
        self.tools.begin(world, screen, pressure);
        if let Gesture::Erasing { cursor } = self.tools.gesture {
            self.erase_at(cursor);
        }
        true
    }

    /// Feed a pointer move, whether or not a gesture is active.
    pub fn pointer_move(&mut self, screen: Point, pressure: Option<f64>) {
        let world = self.camera.screen_to_world(screen);
        if let Some(delta) = self.tools.update(world, screen, pressure) {
            self.camera.pan(delta);
        }
        if let Gesture::Erasing { cursor } = self.tools.gesture {
            self.erase_at(cursor);
        }
    }

    /// Finish the gesture. Returns the id of a committed element, if any.
    pub fn pointer_up(&mut self, screen: Point) -> Option<ElementId> {
        if let Gesture::Erasing { .. } = self.tools.gesture {
            self.tools.cancel();
            self.commit_live("erase");
            return None;
        }
        let world = self.camera.screen_to_world(screen);
        let Some(layer) = self.document.layers.active_id() else {
            self.tools.cancel();
            return None;
        };
        let element = self
            .tools
            .end(world, layer, self.settings.max_stroke_points)?;
        self.commit_element(element).ok()
    }

    /// Pointer left the surface: discard the gesture without committing.
    ///
    /// Eraser removals made during the gesture are rolled back. A pending
    /// text edit stays open.
    pub fn pointer_leave(&mut self) {
        self.tools.clear_hover();
        if !self.tools.is_editing_text() {
            self.abort_gesture();
        }
    }

    /// Commit the pending text edit.
    pub fn submit_text(&mut self, content: &str) -> Option<ElementId> {
        let layer = self.document.layers.active_id()?;
        let element = self.tools.submit_text(content, layer)?;
        self.commit_element(element).ok()
    }

    /// Abandon the pending text edit. Returns whether one was open.
    pub fn cancel_text(&mut self) -> bool {
        if !self.tools.is_editing_text() {
            return false;
        }
        self.tools.cancel();
        true
    }

    /// Append an element and record it in history.
    ///
    /// Rejected when the element's layer is missing, locked or hidden.
    pub fn commit_element(&mut self, element: Element) -> Result<ElementId, CanvasError> {
        let accepted = self
            .document
            .layers
            .get(element.layer_id())
            .is_some_and(|l| l.visible && !l.locked);
        if !accepted {
            log::warn!("{} not committed: invalid target layer", element.kind().name());
            return Err(CanvasError::InvalidTargetLayer);
        }
        let id = element.id();
        log::debug!("commit {} {}", element.kind().name(), id);
        self.document.elements.push(Arc::new(element));
        self.history.commit(self.document.snapshot());
        Ok(id)
    }

    // --- History ---

    /// Step back. Returns `false` at the oldest entry.
    pub fn undo(&mut self) -> bool {
        self.abort_gesture();
        match self.history.undo() {
            Some(snapshot) => {
                self.document.elements = snapshot.to_vec();
                true
            }
            None => false,
        }
    }

    /// Step forward. Returns `false` at the newest entry.
    pub fn redo(&mut self) -> bool {
        self.abort_gesture();
        match self.history.redo() {
            Some(snapshot) => {
                self.document.elements = snapshot.to_vec();
                true
            }
            None => false,
        }
    }

    // --- Document ---

    /// Remove every element. Needs confirmation unless the canvas is empty.
    ///
    /// Returns whether anything was removed.
    pub fn clear(&mut self, confirmed: bool) -> Result<bool, CanvasError> {
        if self.document.elements.is_empty() {
            return Ok(false);
        }
        if !confirmed {
            return Err(CanvasError::ConfirmationRequired);
        }
        self.abort_gesture();
        self.document.elements.clear();
        self.history.commit(self.document.snapshot());
        log::info!("canvas cleared");
        Ok(true)
    }

    pub fn to_json(&self) -> Result<String, CanvasError> {
        self.document.to_json()
    }

    /// Replace the document from JSON.
    ///
    /// Needs confirmation when the current document has elements. On any
    /// error the current document is left untouched.
    pub fn load_json(&mut self, json: &str, confirmed: bool) -> Result<(), CanvasError> {
        if !self.document.elements.is_empty() && !confirmed {
            return Err(CanvasError::ConfirmationRequired);
        }
        let document = CanvasDocument::from_json(json)?;
        self.load_document(document);
        Ok(())
    }

    /// Replace the document, resetting camera and history.
    pub fn load_document(&mut self, document: CanvasDocument) {
        self.tools.cancel();
        self.camera.reset();
        self.history.reset(document.snapshot());
        log::info!(
            "loaded document: {} element(s), {} layer(s)",
            document.len(),
            document.layers.len()
        );
        self.document = document;
    }

    // --- View ---

    pub fn zoom_in(&mut self) {
        self.camera.zoom_at(self.viewport_center(), self.settings.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.camera
            .zoom_at(self.viewport_center(), 1.0 / self.settings.zoom_step);
    }

    /// Wheel zoom anchored at the pointer.
    pub fn zoom_wheel(&mut self, delta_y: f64, pointer: Point) {
        self.camera.zoom_wheel(delta_y, pointer);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.camera.pan(delta);
    }

    /// Back to 100% zoom with no pan.
    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width.max(0.0), height.max(0.0));
    }

    /// Place the drawing surface's top-left corner in screen space.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.camera.origin = origin;
    }

    fn viewport_center(&self) -> Point {
        Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0) + self.camera.origin
    }

    // --- Layers ---

    /// Add a layer on top and make it active.
    pub fn add_layer(&mut self) -> LayerId {
        self.document.layers.add()
    }

    /// Delete a layer and every element on it, in the live set and in history.
    pub fn delete_layer(&mut self, id: LayerId) -> Result<(), CanvasError> {
        self.document.layers.remove(id)?;
        self.abort_gesture();
        self.document.elements.retain(|e| e.layer_id() != id);
        self.history.retain(|e| e.layer_id() != id);
        log::info!("deleted layer {id}");
        Ok(())
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> Result<(), CanvasError> {
        Ok(self.document.layers.set_active(id)?)
    }

    pub fn toggle_layer_visible(&mut self, id: LayerId) -> Result<bool, CanvasError> {
        Ok(self.document.layers.toggle_visible(id)?)
    }

    pub fn toggle_layer_lock(&mut self, id: LayerId) -> Result<bool, CanvasError> {
        Ok(self.document.layers.toggle_lock(id)?)
    }

    // --- Tools & style ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.abort_gesture();
        self.tools.set_tool(tool);
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.tools.style.color = color;
    }

    /// Set the tool size. Non-positive or non-finite sizes are ignored.
    pub fn set_size(&mut self, size: f64) -> bool {
        if !size.is_finite() || size <= 0.0 {
            log::warn!("ignoring tool size {size}");
            return false;
        }
        self.tools.style.size = size;
        true
    }

    /// Immutable copy of what the next frame draws.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            elements: self.document.snapshot(),
            layers: self.document.layers.layers().to_vec(),
            camera: self.camera.clone(),
            overlay: self.tools.overlay(),
            viewport: self.viewport,
        }
    }

    // --- Internals ---

    fn erase_at(&mut self, cursor: Point) {
        if !self.document.layers.accepts_commits() {
            return;
        }
        let Some(layer) = self.document.layers.active_id() else {
            return;
        };
        let removed = eraser::erase(
            &mut self.document.elements,
            layer,
            cursor,
            self.tools.style.size,
        );
        if removed > 0 {
            log::debug!("eraser removed {removed} element(s)");
        }
    }

    /// Commit the live set if it drifted from the history cursor.
    fn commit_live(&mut self, reason: &str) {
        let current = self.history.current();
        let unchanged = current.len() == self.document.elements.len()
            && current
                .iter()
                .zip(&self.document.elements)
                .all(|(a, b)| Arc::ptr_eq(a, b));
        if !unchanged {
            log::debug!("commit {reason}");
            self.history.commit(self.document.snapshot());
        }
    }

    /// Drop the gesture in progress, restoring any live eraser removals.
    fn abort_gesture(&mut self) {
        if let Gesture::Erasing { .. } = self.tools.cancel() {
            self.document.elements = self.history.current().to_vec();
        }
    }
}
