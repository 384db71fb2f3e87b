use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One processed document as the remote registry stores it.
///
/// A row only exists after the external ingestion workflow reported success,
/// so every document here is queryable through the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub file_url: String,
    pub processed_at: DateTime<Utc>,
}

/// A change observed on the remote document collection.
///
/// Consumers treat every variant as "refresh needed"; the payload exists for
/// logging and diagnostics, not for incremental state patching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryChange {
    Inserted(Document),
    Updated(Document),
    Deleted { id: i64 },
}
