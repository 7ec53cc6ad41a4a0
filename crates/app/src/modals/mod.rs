//! Modal dialogs for the application.

pub mod settings_dialog;

pub use settings_dialog::SettingsDialog;

use egui::Context;

/// Trait for modal dialogs.
pub trait Modal {
    /// Update and render the modal. Returns true if the modal should close.
    fn update(&mut self, ctx: &Context) -> bool;

    /// Returns true if the modal is currently open.
    fn is_open(&self) -> bool;

    /// Close the modal.
    fn close(&mut self);
}

/// Result from a modal dialog.
#[derive(Debug, Clone)]
pub enum ModalResult<T> {
    /// User hasn't made a decision yet
    Pending,
    /// User confirmed/submitted
    Confirmed(T),
    /// User cancelled
    Cancelled,
}

impl<T> ModalResult<T> {
    pub fn take_value(self) -> Option<T> {
        match self {
            ModalResult::Confirmed(v) => Some(v),
            _ => None,
        }
    }
}
