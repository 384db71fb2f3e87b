use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `docent`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum DocentError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Document registry ────────────────────────────────────────────────
    #[error("registry: {0}")]
    Registry(#[from] RegistryError),

    // ── Ingestion pipeline ───────────────────────────────────────────────
    #[error("ingestion: {0}")]
    Ingestion(#[from] IngestionError),

    // ── Chat webhook ─────────────────────────────────────────────────────
    #[error("chat: {0}")]
    Chat(#[from] ChatError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Registry errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("registry replied with status {status}")]
    Http { status: u16 },

    #[error("failed to decode registry row: {0}")]
    Decode(String),
}

// ─── Ingestion errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ingestion endpoint replied with status {status}")]
    Http { status: u16 },

    #[error("pipeline rejected the document (status {status:?})")]
    Rejected { status: String },
}

// ─── Chat errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat endpoint replied with status {status}")]
    Http { status: u16 },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, DocentError>;
