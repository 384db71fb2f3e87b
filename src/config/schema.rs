use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

// ── Top-level config ──────────────────────────────────────────────

/// Configuration for a document-chat session.
///
/// The `[webhooks]` and `[registry]` sections are required; everything else
/// falls back to the defaults of the hosted pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub webhooks: WebhooksConfig,

    pub registry: RegistryConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub narrator: NarratorConfig,
}

// ── Webhooks ─────────────────────────────────────────────────────

/// Pipeline endpoints. Both are full URLs including any path segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhooksConfig {
    /// Endpoint that receives `{ "pdfLink": ... }` and runs ingestion.
    pub ingest_url: String,
    /// Endpoint that answers questions against the ingested document.
    pub chat_url: String,
}

impl Default for WebhooksConfig {
    fn default() -> Self {
        Self {
            ingest_url: String::new(),
            chat_url: String::new(),
        }
    }
}

// ── Registry ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the PostgREST-style API (no trailing `/rest/v1`).
    pub base_url: String,
    /// Anon/service key sent as `apikey` and bearer token.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Table of ingested documents.
    #[serde(default = "default_documents_table")]
    pub documents_table: String,
    /// Table holding chunk vectors, cleaned up best-effort on delete.
    #[serde(default = "default_vectors_table")]
    pub vectors_table: String,
    /// Cadence of the change-watch poll.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_documents_table() -> String {
    "active_session_files".into()
}

fn default_vectors_table() -> String {
    "documents".into()
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            documents_table: default_documents_table(),
            vectors_table: default_vectors_table(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

// ── Timing ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How long a failed upload keeps showing `Error` before reverting to
    /// `Idle`.
    #[serde(default = "default_error_revert_ms")]
    pub error_revert_ms: u64,
    /// Per-request timeout on the HTTP client. Bounds a whole webhook
    /// call, so it must leave room for a full ingestion run.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// TCP connect timeout on the HTTP client.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_error_revert_ms() -> u64 {
    8_000
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            error_revert_ms: default_error_revert_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

// ── Progress narrator ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarratorConfig {
    /// Stage captions cycled while ingestion runs. Cosmetic only.
    #[serde(default = "default_narrator_stages")]
    pub stages: Vec<String>,
    /// Dwell time per caption before advancing.
    #[serde(default = "default_narrator_period_ms")]
    pub period_ms: u64,
}

fn default_narrator_stages() -> Vec<String> {
    vec![
        "Analizando estructura del documento...".into(),
        "Dividiendo en chunks de texto...".into(),
        "Generando embeddings vectoriales...".into(),
        "Guardando en base de datos vectorial...".into(),
        "Configurando memoria del agente...".into(),
    ]
}

fn default_narrator_period_ms() -> u64 {
    2_500
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            stages: default_narrator_stages(),
            period_ms: default_narrator_period_ms(),
        }
    }
}

// ── Config impl ──────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            webhooks: WebhooksConfig::default(),
            registry: RegistryConfig::default(),
            timing: TimingConfig::default(),
            narrator: NarratorConfig::default(),
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Apply environment variable overrides to config.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DOCENT_INGEST_URL") {
            if !url.is_empty() {
                self.webhooks.ingest_url = url;
            }
        }

        if let Ok(url) = std::env::var("DOCENT_CHAT_URL") {
            if !url.is_empty() {
                self.webhooks.chat_url = url;
            }
        }

        if let Ok(url) = std::env::var("DOCENT_REGISTRY_URL") {
            if !url.is_empty() {
                self.registry.base_url = url;
            }
        }

        if let Ok(key) = std::env::var("DOCENT_REGISTRY_KEY") {
            if !key.is_empty() {
                self.registry.api_key = Some(key);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("webhooks.ingest_url", &self.webhooks.ingest_url)?;
        validate_url("webhooks.chat_url", &self.webhooks.chat_url)?;
        validate_url("registry.base_url", &self.registry.base_url)?;

        if self.narrator.stages.is_empty() {
            return Err(ConfigError::Validation(
                "narrator.stages must not be empty".into(),
            ));
        }
        if self.narrator.period_ms == 0 {
            return Err(ConfigError::Validation(
                "narrator.period_ms must be >= 1".into(),
            ));
        }
        if self.registry.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "registry.poll_interval_ms must be >= 1".into(),
            ));
        }
        if self.timing.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timing.request_timeout_secs must be >= 1".into(),
            ));
        }
        if self.timing.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timing.connect_timeout_secs must be >= 1".into(),
            ));
        }

        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} must be set")));
    }
    Url::parse(value).map_err(|e| ConfigError::Validation(format!("{field}: {e}")))?;
    Ok(())
}
