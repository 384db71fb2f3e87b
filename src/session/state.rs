//! State carried by a live session and the snapshot handed to callers.

use crate::conversation::{Conversation, ConversationStore, Message};
use crate::registry::Document;
use serde::{Deserialize, Serialize};

/// Ingestion axis of the session state machine.
///
/// `Uploading` is reserved for a hosting shell that transfers the raw file
/// somewhere reachable before handing its URL to [`upload_document`]; the
/// flows in this crate move straight from `Idle` to `Processing`.
///
/// [`upload_document`]: crate::session::Session::upload_document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IngestStatus {
    Idle,
    Uploading,
    Processing,
    Ready,
    Error,
}

/// Point-in-time view of the session, safe to hand to presentation code.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub status: IngestStatus,
    /// True while a chat turn is in flight. Independent of `status`.
    pub thinking: bool,
    /// Current narrator caption, empty when no ingestion is running.
    pub loading_stage: String,
    /// Known documents, most recently processed first.
    pub documents: Vec<Document>,
    pub active_document: Option<Document>,
    pub conversation_id: String,
    pub messages: Vec<Message>,
    /// Example questions suggested by the pipeline for the active document.
    pub suggestions: Vec<String>,
}

/// The mutable half of a session, guarded by the controller's lock.
pub(crate) struct SessionState {
    pub(crate) status: IngestStatus,
    pub(crate) thinking: bool,
    pub(crate) documents: Vec<Document>,
    pub(crate) active: Option<Document>,
    /// The conversation being rendered. Mirrored into `store` keyed by the
    /// active document before every switch away.
    pub(crate) conversation: Conversation,
    pub(crate) suggestions: Vec<String>,
    pub(crate) store: ConversationStore,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self {
            status: IngestStatus::Idle,
            thinking: false,
            documents: Vec::new(),
            active: None,
            conversation: Conversation::new(),
            suggestions: Vec::new(),
            store: ConversationStore::new(),
        }
    }

    pub(crate) fn snapshot(&self, loading_stage: String) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            thinking: self.thinking,
            loading_stage,
            documents: self.documents.clone(),
            active_document: self.active.clone(),
            conversation_id: self.conversation.id.clone(),
            messages: self.conversation.messages.clone(),
            suggestions: self.suggestions.clone(),
        }
    }
}
