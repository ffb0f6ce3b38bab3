//! Enumerations for TUI state management.

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq)]
pub enum AppState {
    /// Picking the task to act on.
    TaskPicker,
    /// Top-level action menu for the selected task.
    ActionMenu,
    /// A nested submenu (assignee, status, priority, parent, list).
    Submenu,
    /// Due-date text prompt.
    DatePrompt,
    /// Destructive-delete confirmation dialog.
    ConfirmDelete,
}
