use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use shared::agent_api::{GenerateRecord, GenerateRequest, OLLAMA_PORT};
use shared::status::ServerStatus;
use std::sync::LazyLock;
use std::time::Duration;

/// Generation requests have no overall timeout; replies can take minutes.
static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(2)
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Upper bound on a probe so the status never stays `Checking`.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub status: ServerStatus,
    /// Models listed by `/api/tags`; empty when offline or unparseable.
    pub models: Vec<String>,
}

impl ProbeReport {
    pub fn offline() -> Self {
        Self {
            status: ServerStatus::Offline,
            models: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Text assembled from a `/api/generate` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembled {
    /// All `response` fragments in line order, trimmed.
    pub text: String,
    /// First `error` reported by the server, if any.
    pub error: Option<String>,
}

/// Concatenate the `response` fragments of a JSON-lines body.
///
/// Blank lines are ignored and lines that are not valid records are skipped.
pub fn assemble_response(body: &str) -> Assembled {
    let mut text = String::new();
    let mut error = None;

    for line in body.split('\n').filter(|l| !l.is_empty()) {
        match serde_json::from_str::<GenerateRecord>(line) {
            Ok(record) => {
                if let Some(fragment) = record.response {
                    text.push_str(&fragment);
                }
                if error.is_none() {
                    error = record.error;
                }
            }
            Err(e) => {
                tracing::debug!("skipping unparseable response line: {}", e);
            }
        }
    }

    Assembled {
        text: text.trim().to_string(),
        error,
    }
}

pub struct OllamaClient {
    http: Client,
    base: String,
    probe_timeout: Duration,
}

impl OllamaClient {
    /// Client for `http://{address}:11434`.
    pub fn for_address(address: &str) -> Self {
        Self::with_base_url(format!("http://{}:{}", address.trim(), OLLAMA_PORT))
    }

    pub fn with_base_url(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            http: SHARED_HTTP.clone(),
            base: base.trim_end_matches('/').to_string(),
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `GET /api/tags`: any 2xx is online, everything else offline.
    pub async fn probe(&self) -> ProbeReport {
        let url = format!("{}/api/tags", self.base);
        let resp = match self.http.get(&url).timeout(self.probe_timeout).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::info!("probe of {} failed: {}", url, e);
                return ProbeReport::offline();
            }
        };

        if !resp.status().is_success() {
            tracing::info!("probe of {} returned {}", url, resp.status());
            return ProbeReport::offline();
        }

        let models = match resp.text().await {
            Ok(body) => serde_json::from_str::<TagsResponse>(&body)
                .map(|tags| tags.models.into_iter().map(|m| m.name).collect())
                .unwrap_or_default(),
            Err(e) => {
                tracing::debug!("could not read /api/tags body: {}", e);
                Vec::new()
            }
        };

        ProbeReport {
            status: ServerStatus::Online,
            models,
        }
    }

    /// `POST /api/generate` and assemble the reply.
    ///
    /// Only transport failures are errors. A non-2xx reply is still read and
    /// assembled, which surfaces Ollama's `{"error": ...}` body.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<Assembled> {
        let url = format!("{}/api/generate", self.base);
        let resp = self.http.post(&url).json(request).send().await?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| anyhow!("failed to read response body: {}", e))?;
        if !status.is_success() {
            tracing::warn!("ollama returned {} for {}", status, url);
        }

        let mut assembled = assemble_response(&body);
        if !status.is_success() && assembled.text.is_empty() && assembled.error.is_none() {
            assembled.error = Some(format!("ollama error: {}", status));
        }
        Ok(assembled)
    }
}
