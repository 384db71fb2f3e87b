use super::types::Document;
use super::watch::ChangeFeed;
use crate::error::RegistryError;
use async_trait::async_trait;

/// Remote store of processed-document metadata.
///
/// Shared between the session and its background reconciler, so all methods
/// take `&self`.
#[async_trait]
pub trait Registry: Send + Sync {
    /// All known documents, most recently processed first. An empty remote
    /// collection yields an empty list, not an error.
    async fn list_documents(&self) -> Result<Vec<Document>, RegistryError>;

    /// Removes a document row by id, then attempts best-effort cleanup of the
    /// vector records tagged with the document's filename. The cleanup
    /// failing is logged and never turns a successful delete into an error.
    async fn delete_document(&self, document: &Document) -> Result<(), RegistryError>;

    /// Opens a stream of change events for the document collection. Backing
    /// resources are released when the returned feed drops.
    fn watch_changes(&self) -> ChangeFeed;
}
