use eframe::egui;
use egui::RichText;
use parking_lot::Mutex;
use shared::theme::{self, Palette, Rgb};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::Instant;

mod log_view;
mod modals;
mod sequencer;
mod state;
mod types;
mod utils;

use log_view::LogView;
use modals::Modal;
use state::Worker;
use types::{AppState, BackgroundEvent, Effect};

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (tx, rx) = channel();
    let mut worker = match Worker::new(tx) {
        Ok(worker) => worker,
        Err(e) => {
            tracing::error!("failed to start async runtime: {:#}", e);
            std::process::exit(1);
        }
    };
    let (state, startup_effects) = AppState::new(utils::settings_store());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 760.0])
            .with_min_inner_size([320.0, 480.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "My-LLM",
        options,
        Box::new(move |cc| {
            worker.set_repaint_context(cc.egui_ctx.clone());
            for effect in startup_effects {
                worker.dispatch(effect);
            }
            Box::new(MyLlmApp {
                state: Arc::new(Mutex::new(state)),
                events: rx,
                worker,
            })
        }),
    )
}

struct MyLlmApp {
    state: Arc<Mutex<AppState>>,
    events: Receiver<BackgroundEvent>,
    worker: Worker,
}

impl eframe::App for MyLlmApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut effects: Vec<Effect> = Vec::new();
        let mut s = self.state.lock();

        // Fold in finished probes and generations (non-blocking)
        while let Ok(event) = self.events.try_recv() {
            s.apply_event(event);
        }

        let dark = s.settings.dark_mode;
        let palette = theme::palette(dark);
        apply_style(ctx, palette, dark);

        // Top bar: title + settings trigger
        egui::TopBottomPanel::top("top_bar")
            .frame(bar_frame(palette, egui::Margin::symmetric(16.0, 12.0)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(
                        RichText::new("My-LLM")
                            .size(20.0)
                            .strong()
                            .color(color(palette.text)),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add(
                                egui::Button::new(
                                    RichText::new("⚙").size(22.0).color(color(palette.text)),
                                )
                                .frame(false),
                            )
                            .on_hover_text("Settings")
                            .clicked()
                        {
                            let current = s.settings.clone();
                            s.settings_dialog.open_with(&current);
                        }
                    });
                });
            });

        // Bottom bar: server status
        egui::TopBottomPanel::bottom("status_bar")
            .frame(bar_frame(palette, egui::Margin::same(16.0)))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    let status = s.server_status;
                    let response = ui.label(
                        RichText::new(status.label())
                            .size(16.0)
                            .strong()
                            .color(color(theme::status_color(status))),
                    );
                    if !s.available_models.is_empty() {
                        response.on_hover_text(format!("Models: {}", s.available_models.join(", ")));
                    }
                    if let Some(warning) = s.model_warning() {
                        ui.label(RichText::new(warning).small().color(color(palette.log_text)));
                    }
                });
            });

        let scroll_to_end = s.log.take_scroll(Instant::now());
        if s.log.scroll_pending() {
            ctx.request_repaint_after(log_view::SCROLL_DELAY);
        }

        // Log pane with the send row underneath
        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(color(palette.background))
                    .inner_margin(egui::Margin::same(16.0)),
            )
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(color(palette.card))
                    .rounding(egui::Rounding::same(8.0))
                    .inner_margin(egui::Margin::same(8.0))
                    .show(ui, |ui| {
                        ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                            if let Some(effect) = render_send_row(ui, &mut s, palette) {
                                effects.push(effect);
                            }
                            ui.add_space(8.0);
                            ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                                render_log(ui, &s.log, palette, scroll_to_end);
                            });
                        });
                    });
            });

        s.settings_dialog.update(ctx);
        if s.settings_dialog.take_delete_logs_request() {
            s.delete_logs();
        }
        if let Some(new_settings) = s.settings_dialog.take_result().take_value() {
            effects.extend(s.save_settings(new_settings));
        }
        drop(s);

        for effect in effects {
            self.worker.dispatch(effect);
        }
    }
}

fn color(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

fn apply_style(ctx: &egui::Context, palette: &Palette, dark: bool) {
    let mut style = (*ctx.style()).clone();
    style.visuals = if dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    style.visuals.panel_fill = color(palette.background);
    style.visuals.window_fill = color(palette.card);
    style.visuals.extreme_bg_color = color(palette.input_background);
    style.visuals.override_text_color = Some(color(palette.text));
    style.visuals.window_rounding = egui::Rounding::same(12.0);
    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    ctx.set_style(style);
}

fn bar_frame(palette: &Palette, margin: egui::Margin) -> egui::Frame {
    egui::Frame::none()
        .fill(color(palette.card))
        .inner_margin(margin)
        .stroke(egui::Stroke::new(1.0, color(palette.border)))
}

fn render_log(ui: &mut egui::Ui, log: &LogView, palette: &Palette, scroll_to_end: bool) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            let mut last = None;
            for entry in log.entries() {
                let response = ui
                    .add(
                        egui::Label::new(
                            RichText::new(entry.text())
                                .size(13.0)
                                .color(color(palette.log_text)),
                        )
                        .selectable(true)
                        .wrap(true),
                    )
                    .on_hover_text(entry.formatted_time());
                last = Some(response);
            }
            if scroll_to_end {
                if let Some(response) = last {
                    response.scroll_to_me(Some(egui::Align::Max));
                }
            }
        });
}

/// Text input + send button. Returns the request to start, if any.
fn render_send_row(ui: &mut egui::Ui, s: &mut AppState, palette: &Palette) -> Option<Effect> {
    let mut effect = None;
    ui.horizontal(|ui| {
        let busy = s.is_busy();
        let reserved = if busy { 84.0 } else { 60.0 };
        let input = ui.add(
            egui::TextEdit::singleline(&mut s.input_text)
                .hint_text("Type a message...")
                .text_color(color(palette.input_text))
                .desired_width((ui.available_width() - reserved).max(80.0)),
        );
        let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        let clicked = ui
            .add(
                egui::Button::new(RichText::new("Send").color(egui::Color32::WHITE))
                    .fill(color(palette.button))
                    .rounding(egui::Rounding::same(16.0)),
            )
            .clicked();

        if busy {
            ui.spinner();
        }

        if submitted || clicked {
            effect = s.submit_prompt();
            input.request_focus();
        }
    });
    effect
}
