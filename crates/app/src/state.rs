//! Background network work for the My-LLM app
//!
//! Effects returned by `AppState` handlers are started here on a shared
//! tokio runtime. Each task reports back over a channel that the UI drains
//! once per frame.

use crate::types::{BackgroundEvent, Effect};
use crate::sequencer::RequestId;
use eframe::egui;
use providers::OllamaClient;
use shared::agent_api::GenerateRequest;
use std::sync::mpsc::Sender;

pub struct Worker {
    runtime: tokio::runtime::Runtime,
    tx: Sender<BackgroundEvent>,
    repaint: Option<egui::Context>,
}

impl Worker {
    pub fn new(tx: Sender<BackgroundEvent>) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("my-llm-io")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            tx,
            repaint: None,
        })
    }

    /// Wake the UI whenever a task finishes.
    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    pub fn dispatch(&self, effect: Effect) {
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        self.runtime.spawn(async move {
            let event = match effect {
                Effect::Probe { ticket, address } => {
                    run_probe(OllamaClient::for_address(&address), ticket).await
                }
                Effect::Generate {
                    id,
                    address,
                    request,
                } => run_generation(OllamaClient::for_address(&address), id, request).await,
            };
            if tx.send(event).is_err() {
                tracing::debug!("UI closed before background result arrived");
                return;
            }
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }
}

async fn run_probe(client: OllamaClient, ticket: u64) -> BackgroundEvent {
    tracing::debug!(ticket, base = client.base_url(), "probing server");
    let report = client.probe().await;
    BackgroundEvent::ProbeFinished { ticket, report }
}

async fn run_generation(
    client: OllamaClient,
    id: RequestId,
    request: GenerateRequest,
) -> BackgroundEvent {
    let outcome = client.generate(&request).await.map_err(|e| {
        tracing::warn!(id, "generation request failed: {:#}", e);
        format!("{:#}", e)
    });
    BackgroundEvent::GenerationFinished { id, outcome }
}
