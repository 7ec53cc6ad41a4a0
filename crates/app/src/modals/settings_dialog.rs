//! Settings panel: server address, wake word, verbose and dark mode.
//!
//! Edits happen on a draft copy. Save hands the draft back as
//! `ModalResult::Confirmed`; Cancel or Escape throws it away. "Delete logs"
//! is reported separately and leaves the dialog open.

use super::{Modal, ModalResult};
use egui::{Align2, Area, Context, Id, Key, RichText, TextEdit, Vec2};
use shared::settings::ConnectionSettings;

pub struct SettingsDialog {
    is_open: bool,
    draft: ConnectionSettings,
    result: ModalResult<ConnectionSettings>,
    delete_logs_requested: bool,
    id: Id,
}

impl SettingsDialog {
    pub fn new(id: impl std::hash::Hash) -> Self {
        Self {
            is_open: false,
            draft: ConnectionSettings::default(),
            result: ModalResult::Pending,
            delete_logs_requested: false,
            id: Id::new(id),
        }
    }

    /// Open the dialog pre-filled with the current settings.
    pub fn open_with(&mut self, current: &ConnectionSettings) {
        self.is_open = true;
        self.draft = current.clone();
        self.result = ModalResult::Pending;
        self.delete_logs_requested = false;
    }

    pub fn take_result(&mut self) -> ModalResult<ConnectionSettings> {
        std::mem::replace(&mut self.result, ModalResult::Pending)
    }

    pub fn take_delete_logs_request(&mut self) -> bool {
        std::mem::take(&mut self.delete_logs_requested)
    }

    pub fn request_delete_logs(&mut self) {
        self.delete_logs_requested = true;
    }

    /// Confirm the current draft and close.
    pub fn submit(&mut self) {
        self.result = ModalResult::Confirmed(self.draft.clone());
        self.is_open = false;
    }
}

impl Modal for SettingsDialog {
    fn update(&mut self, ctx: &Context) -> bool {
        if !self.is_open() {
            return false;
        }

        let mut cancel_clicked = false;
        let mut save_clicked = false;
        let mut delete_clicked = false;

        Area::new(self.id.with("overlay"))
            .anchor(Align2::LEFT_TOP, Vec2::ZERO)
            .show(ctx, |ui| {
                let screen_rect = ctx.screen_rect();
                ui.allocate_response(screen_rect.size(), egui::Sense::click());
                ui.painter()
                    .rect_filled(screen_rect, 0.0, egui::Color32::from_black_alpha(160));
            });

        egui::Window::new("Settings")
            .id(self.id.with("window"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.set_min_width(320.0);
                ui.add_space(8.0);

                egui::Grid::new(self.id.with("fields"))
                    .num_columns(2)
                    .spacing([12.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Server IP address");
                        ui.add(
                            TextEdit::singleline(&mut self.draft.server_address)
                                .hint_text("192.168.1.5")
                                .desired_width(180.0),
                        );
                        ui.end_row();

                        ui.label("Wake word");
                        ui.add(
                            TextEdit::singleline(&mut self.draft.wake_word)
                                .hint_text("computer")
                                .desired_width(180.0),
                        );
                        ui.end_row();

                        ui.label("Verbose");
                        ui.checkbox(&mut self.draft.verbose, "Stream responses");
                        ui.end_row();

                        ui.label("Dark mode");
                        ui.checkbox(&mut self.draft.dark_mode, "");
                        ui.end_row();
                    });

                ui.add_space(12.0);

                if ui
                    .button(RichText::new("🗑 Delete logs").color(egui::Color32::from_rgb(200, 60, 60)))
                    .clicked()
                {
                    delete_clicked = true;
                }

                ui.add_space(12.0);
                ui.separator();

                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancel_clicked = true;
                    }

                    ui.add_space(8.0);

                    if ui.button("Save").clicked() {
                        save_clicked = true;
                    }
                });
            });

        if delete_clicked {
            self.request_delete_logs();
        }

        if save_clicked {
            self.submit();
            return true;
        }

        if cancel_clicked || ctx.input(|i| i.key_pressed(Key::Escape)) {
            self.close();
            return true;
        }

        false
    }

    fn is_open(&self) -> bool {
        self.is_open
    }

    fn close(&mut self) {
        self.is_open = false;
        self.result = ModalResult::Cancelled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> ConnectionSettings {
        ConnectionSettings {
            server_address: "10.0.0.2".into(),
            wake_word: "jarvis".into(),
            verbose: false,
            dark_mode: true,
        }
    }

    #[test]
    fn test_settings_dialog_creation() {
        let dialog = SettingsDialog::new("test");
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_submit_returns_edited_draft() {
        let mut dialog = SettingsDialog::new("test");
        dialog.open_with(&current());
        dialog.draft.server_address = "192.168.1.5".into();
        dialog.draft.verbose = true;
        dialog.submit();

        assert!(!dialog.is_open());
        let saved = dialog.take_result().take_value().unwrap();
        assert_eq!(saved.server_address, "192.168.1.5");
        assert!(saved.verbose);
        assert_eq!(saved.wake_word, "jarvis");
        assert!(matches!(dialog.take_result(), ModalResult::Pending));
    }

    #[test]
    fn test_close_discards_draft() {
        let mut dialog = SettingsDialog::new("test");
        dialog.open_with(&current());
        dialog.draft.wake_word = "computer".into();
        dialog.close();

        assert!(dialog.take_result().take_value().is_none());

        dialog.open_with(&current());
        assert_eq!(dialog.draft.wake_word, "jarvis");
    }

    #[test]
    fn test_delete_logs_request_is_taken_once() {
        let mut dialog = SettingsDialog::new("test");
        dialog.open_with(&current());
        dialog.request_delete_logs();
        assert!(dialog.take_delete_logs_request());
        assert!(!dialog.take_delete_logs_request());
        assert!(dialog.is_open());
    }
}
