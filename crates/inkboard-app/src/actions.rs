//! Discrete commands forwarded by the UI shell.
//!
//! Scripts for `inkboard run` are JSON arrays of these, for example
//! `{"action": "setTool", "tool": "rectangle"}`. Layers are addressed by
//! their index in paint order, bottom first.

use inkboard_core::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Actions that can be triggered by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UiAction {
    /// Change the current tool.
    SetTool { tool: ToolKind },
    /// Change the drawing colour (CSS hex).
    SetColor { color: String },
    /// Change the tool size.
    SetSize { size: f64 },
    Undo,
    Redo,
    /// Remove every element.
    Clear {
        #[serde(default)]
        confirmed: bool,
    },
    /// Write the document as JSON.
    Save { path: PathBuf },
    /// Replace the document from a JSON file.
    Load {
        path: PathBuf,
        #[serde(default)]
        confirmed: bool,
    },
    /// Store the document under a name in document storage.
    SaveLocal { name: String },
    /// Replace the document from document storage.
    LoadLocal {
        name: String,
        #[serde(default)]
        confirmed: bool,
    },
    /// Remove a stored document.
    DeleteLocal { name: String },
    /// Rasterize the current view to a PNG file.
    ExportPng { path: PathBuf },
    ZoomIn,
    ZoomOut,
    /// Wheel zoom anchored at a screen point.
    ZoomWheel { delta_y: f64, x: f64, y: f64 },
    /// Pan by a screen-space delta.
    Pan { dx: f64, dy: f64 },
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        pressure: Option<f64>,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        pressure: Option<f64>,
    },
    PointerUp { x: f64, y: f64 },
    PointerLeave,
    /// Commit the pending text edit.
    SubmitText { text: String },
    CancelText,
    AddLayer,
    DeleteLayer { index: usize },
    SetActiveLayer { index: usize },
    ToggleLayerVisible { index: usize },
    ToggleLayerLock { index: usize },
    /// Resize the drawing surface.
    Resize { width: f64, height: f64 },
}

impl UiAction {
    /// Parse a script: a JSON array of actions.
    pub fn parse_script(json: &str) -> serde_json::Result<Vec<UiAction>> {
        serde_json::from_str(json)
    }

    /// Whether the action discards document content without confirmation.
    pub fn needs_confirmation(&self) -> bool {
        matches!(
            self,
            UiAction::Clear { confirmed: false }
                | UiAction::Load {
                    confirmed: false,
                    ..
                }
                | UiAction::LoadLocal {
                    confirmed: false,
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = r##"[
            {"action": "setTool", "tool": "rectangle"},
            {"action": "setColor", "color": "#ff0000"},
            {"action": "pointerDown", "x": 10, "y": 20},
            {"action": "pointerMove", "x": 30, "y": 40, "pressure": 0.7},
            {"action": "pointerUp", "x": 30, "y": 40},
            {"action": "zoomWheel", "deltaY": -1, "x": 0, "y": 0},
            {"action": "clear"},
            {"action": "undo"}
        ]"##;
        let actions = UiAction::parse_script(script).unwrap();
        assert_eq!(actions.len(), 8);
        assert_eq!(
            actions[0],
            UiAction::SetTool {
                tool: ToolKind::Rectangle
            }
        );
        assert_eq!(
            actions[3],
            UiAction::PointerMove {
                x: 30.0,
                y: 40.0,
                pressure: Some(0.7)
            }
        );
        assert_eq!(
            actions[5],
            UiAction::ZoomWheel {
                delta_y: -1.0,
                x: 0.0,
                y: 0.0
            }
        );
        assert!(actions[6].needs_confirmation());
        assert!(!actions[7].needs_confirmation());
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(UiAction::parse_script(r#"[{"action": "selectAll"}]"#).is_err());
    }
}
