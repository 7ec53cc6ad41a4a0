//! Core types for the My-LLM app
//!
//! `AppState` owns everything the screen shows. It is only changed through
//! the action handlers below; handlers that need network I/O return an
//! [`Effect`] for the shell to start, and results come back as a
//! [`BackgroundEvent`].

use providers::{Assembled, ProbeReport};
use shared::agent_api::{GenerateRequest, DEFAULT_MODEL};
use shared::settings::ConnectionSettings;
use shared::status::ServerStatus;
use shared::store::KeyValueStore;

use crate::log_view::LogView;
use crate::modals::SettingsDialog;
use crate::sequencer::{RequestId, ResponseSequencer};

pub const NO_ADDRESS_MESSAGE: &str = "No IP address set. Please configure in settings.";

/// I/O requested by an action handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Probe reachability of `address`.
    Probe { ticket: u64, address: String },
    /// Send a generation request to `address`.
    Generate {
        id: RequestId,
        address: String,
        request: GenerateRequest,
    },
}

/// Result from background network work
#[derive(Debug)]
pub enum BackgroundEvent {
    ProbeFinished { ticket: u64, report: ProbeReport },
    GenerationFinished {
        id: RequestId,
        outcome: Result<Assembled, String>,
    },
}

/// Main application state
pub struct AppState {
    pub settings: ConnectionSettings,
    pub server_status: ServerStatus,
    /// Models reported by the last successful probe
    pub available_models: Vec<String>,
    pub log: LogView,
    /// Current input text
    pub input_text: String,
    pub settings_dialog: SettingsDialog,
    /// Only the probe holding this ticket may settle `server_status`
    probe_ticket: u64,
    probe_in_flight: bool,
    sequencer: ResponseSequencer,
    store: Box<dyn KeyValueStore + Send>,
}

impl AppState {
    /// Load settings from `store` and start the first reachability check.
    pub fn new(store: Box<dyn KeyValueStore + Send>) -> (Self, Vec<Effect>) {
        let mut log = LogView::new();
        let settings = match ConnectionSettings::load(&store) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("failed to load settings, using defaults: {}", e);
                log.append(format!("Failed to load settings: {}", e));
                ConnectionSettings::default()
            }
        };
        tracing::info!(
            address = %settings.server_address,
            verbose = settings.verbose,
            "settings loaded"
        );

        let mut state = Self {
            settings,
            server_status: ServerStatus::Checking,
            available_models: Vec::new(),
            log,
            input_text: String::new(),
            settings_dialog: SettingsDialog::new("settings_dialog"),
            probe_ticket: 0,
            probe_in_flight: false,
            sequencer: ResponseSequencer::new(),
            store,
        };
        let effects = state.address_changed().into_iter().collect();
        (state, effects)
    }

    /// Restart the probe cycle for the current address.
    fn address_changed(&mut self) -> Option<Effect> {
        self.probe_ticket += 1;
        self.available_models.clear();

        match self.settings.address() {
            None => {
                self.server_status = ServerStatus::Offline;
                self.probe_in_flight = false;
                None
            }
            Some(address) => {
                self.server_status = ServerStatus::Checking;
                self.probe_in_flight = true;
                Some(Effect::Probe {
                    ticket: self.probe_ticket,
                    address: address.to_string(),
                })
            }
        }
    }

    /// Send the typed prompt. Whitespace-only input is ignored.
    pub fn submit_prompt(&mut self) -> Option<Effect> {
        if self.input_text.trim().is_empty() {
            return None;
        }
        let prompt = std::mem::take(&mut self.input_text);

        let Some(address) = self.settings.address() else {
            self.log.append(NO_ADDRESS_MESSAGE);
            return None;
        };
        let address = address.to_string();

        self.log.append(format!("Sent: {}", prompt));
        let id = self.sequencer.issue();
        tracing::info!(id, %address, stream = self.settings.verbose, "sending prompt");
        Some(Effect::Generate {
            id,
            address,
            request: GenerateRequest::new(prompt, self.settings.verbose),
        })
    }

    /// Apply and persist new settings from the settings panel.
    pub fn save_settings(&mut self, new: ConnectionSettings) -> Option<Effect> {
        let address_changed = new.server_address != self.settings.server_address;
        if address_changed {
            // Replies from the old server must not wait on requests that may never finish.
            for ready in self.sequencer.release_all() {
                self.log.append(ready);
            }
        }
        self.settings = new;

        match self.settings.save(&mut self.store) {
            Ok(()) => self.log.append("Settings saved."),
            Err(e) => {
                tracing::error!("failed to save settings: {}", e);
                self.log.append(format!("Failed to save settings: {}", e));
            }
        }

        if address_changed {
            self.address_changed()
        } else {
            None
        }
    }

    pub fn delete_logs(&mut self) {
        self.log.clear();
    }

    /// Fold a finished background task back into the state.
    pub fn apply_event(&mut self, event: BackgroundEvent) {
        match event {
            BackgroundEvent::ProbeFinished { ticket, report } => {
                if ticket != self.probe_ticket {
                    tracing::debug!(ticket, current = self.probe_ticket, "dropping stale probe");
                    return;
                }
                tracing::info!(status = ?report.status, models = report.models.len(), "probe finished");
                self.server_status = report.status;
                self.available_models = report.models;
                self.probe_in_flight = false;
            }
            BackgroundEvent::GenerationFinished { id, outcome } => {
                let line = outcome_line(outcome);
                for ready in self.sequencer.complete(id, line) {
                    self.log.append(ready);
                }
            }
        }
    }

    /// Whether a probe or generation request is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.probe_in_flight || self.sequencer.in_flight() > 0
    }

    /// Warning shown next to the status when the server lacks our model.
    pub fn model_warning(&self) -> Option<String> {
        if self.server_status != ServerStatus::Online || self.available_models.is_empty() {
            return None;
        }
        if self.available_models.iter().any(|m| m == DEFAULT_MODEL) {
            None
        } else {
            Some(format!("{} not installed", DEFAULT_MODEL))
        }
    }
}

fn outcome_line(outcome: Result<Assembled, String>) -> String {
    match outcome {
        Ok(Assembled { text, error: Some(error) }) if text.is_empty() => {
            format!("Ollama error: {}", error)
        }
        Ok(assembled) => format!("Ollama final response: {}", assembled.text),
        Err(e) => format!("Connection failed: {}", e),
    }
}
