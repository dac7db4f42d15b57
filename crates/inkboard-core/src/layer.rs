//! Layers and the active-layer invariant.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for layers.
pub type LayerId = Uuid;

/// A named, paint-ordered group of elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

fn default_true() -> bool {
    true
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            locked: false,
        }
    }
}

/// Errors from structural layer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    #[error("cannot delete the last remaining layer")]
    LastLayer,
    #[error("no layer with that id")]
    UnknownLayer,
}

/// Ordered layers (bottom to top) plus the active layer.
///
/// The active id always names a layer in the stack. It is only `None` when
/// the stack is empty, which the public API never produces.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStack {
    layers: Vec<Layer>,
    active: Option<LayerId>,
    /// Number used for the next generated name. Never decreases.
    next_number: usize,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStack {
    /// A stack holding a single default layer, which is active.
    pub fn new() -> Self {
        Self::from_layers(Vec::new())
    }

    /// Build a stack from loaded layers. An empty list gets a default layer.
    /// The first layer becomes active.
    pub fn from_layers(mut layers: Vec<Layer>) -> Self {
        if layers.is_empty() {
            layers.push(Layer::new("Layer 1"));
        }
        let active = layers.first().map(|l| l.id);
        let next_number = layers.len() + 1;
        Self {
            layers,
            active,
            next_number,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn first(&self) -> Option<&Layer> {
        self.layers.first()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn active_id(&self) -> Option<LayerId> {
        self.active
    }

    pub fn active(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.get(id))
    }

    /// Whether new elements may be committed to the active layer.
    pub fn accepts_commits(&self) -> bool {
        self.active().is_some_and(|l| l.visible && !l.locked)
    }

    /// Append a new layer on top and make it active.
    pub fn add(&mut self) -> LayerId {
        let layer = Layer::new(self.next_name());
        let id = layer.id;
        self.layers.push(layer);
        self.active = Some(id);
        id
    }

    /// Remove a layer. At least one layer must remain.
    ///
    /// Removing the active layer activates the topmost remaining layer.
    pub fn remove(&mut self, id: LayerId) -> Result<Layer, LayerError> {
        let index = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(LayerError::UnknownLayer)?;
        if self.layers.len() <= 1 {
            return Err(LayerError::LastLayer);
        }
        let removed = self.layers.remove(index);
        if self.active == Some(id) {
            self.active = self.layers.last().map(|l| l.id);
        }
        Ok(removed)
    }

    pub fn set_active(&mut self, id: LayerId) -> Result<(), LayerError> {
        if !self.contains(id) {
            return Err(LayerError::UnknownLayer);
        }
        self.active = Some(id);
        Ok(())
    }

    /// Flip visibility, returning the new state.
    pub fn toggle_visible(&mut self, id: LayerId) -> Result<bool, LayerError> {
        let layer = self.get_mut(id)?;
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }

    /// Flip the lock, returning the new state.
    pub fn toggle_lock(&mut self, id: LayerId) -> Result<bool, LayerError> {
        let layer = self.get_mut(id)?;
        layer.locked = !layer.locked;
        Ok(layer.locked)
    }

    /// Next "Layer N" name not already taken.
    fn next_name(&mut self) -> String {
        loop {
            let name = format!("Layer {}", self.next_number);
            self.next_number += 1;
            if !self.layers.iter().any(|l| l.name == name) {
                return name;
            }
        }
    }

    fn get_mut(&mut self, id: LayerId) -> Result<&mut Layer, LayerError> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(LayerError::UnknownLayer)
    }
}
