//! Inkboard Application
//!
//! The headless application shell: configuration, the action surface a UI
//! forwards, keyboard shortcuts, and integration of core and render.

mod actions;
mod app;
mod shortcuts;

pub use actions::UiAction;
pub use app::{ActionOutcome, App, AppConfig, AppError, AppResult};
pub use shortcuts::{Command, Shortcut, ShortcutRegistry};
