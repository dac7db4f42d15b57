//! Keyboard shortcut registry and documentation.

use inkboard_core::tools::ToolKind;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tool(ToolKind),
    Undo,
    Redo,
    Save,
    ExportPng,
    ZoomIn,
    ZoomOut,
    /// Abort the gesture or text edit in progress.
    Cancel,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub command: Command,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        command: Command,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.key.eq_ignore_ascii_case(key) && self.ctrl == ctrl && self.shift == shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("P", false, false, Command::Tool(ToolKind::Pen), "Pen"),
            Shortcut::new("H", false, false, Command::Tool(ToolKind::Highlighter), "Highlighter"),
            Shortcut::new("E", false, false, Command::Tool(ToolKind::Eraser), "Eraser"),
            Shortcut::new("R", false, false, Command::Tool(ToolKind::Rectangle), "Rectangle"),
            Shortcut::new("C", false, false, Command::Tool(ToolKind::Circle), "Circle"),
            Shortcut::new("L", false, false, Command::Tool(ToolKind::Line), "Line"),
            Shortcut::new("T", false, false, Command::Tool(ToolKind::Text), "Text"),
            Shortcut::new("Space", false, false, Command::Tool(ToolKind::Pan), "Pan"),
            Shortcut::new("Z", true, false, Command::Undo, "Undo"),
            Shortcut::new("Z", true, true, Command::Redo, "Redo"),
            Shortcut::new("Y", true, false, Command::Redo, "Redo"),
            Shortcut::new("S", true, false, Command::Save, "Save"),
            Shortcut::new("E", true, false, Command::ExportPng, "Export to PNG"),
            Shortcut::new("+", false, false, Command::ZoomIn, "Zoom in"),
            Shortcut::new("=", false, false, Command::ZoomIn, "Zoom in"),
            Shortcut::new("-", false, false, Command::ZoomOut, "Zoom out"),
            Shortcut::new("Escape", false, false, Command::Cancel, "Cancel current action"),
        ]
    }

    /// Find the command bound to a key press.
    pub fn lookup(key: &str, ctrl: bool, shift: bool) -> Option<Command> {
        Self::all()
            .into_iter()
            .find(|s| s.matches(key, ctrl, shift))
            .map(|s| s.command)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
