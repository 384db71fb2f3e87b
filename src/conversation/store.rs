use super::types::Conversation;
use std::collections::HashMap;

/// Per-document conversation threads, keyed by registry row id.
///
/// Purely in-memory. A thread parked here survives switching away and comes
/// back verbatim when its document becomes active again; dropping the owning
/// session discards everything.
#[derive(Debug, Default)]
pub struct ConversationStore {
    threads: HashMap<i64, Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, document_id: i64) -> Option<&Conversation> {
        self.threads.get(&document_id)
    }

    /// Parks a thread under a document id. Last write wins.
    pub fn put(&mut self, document_id: i64, conversation: Conversation) {
        self.threads.insert(document_id, conversation);
    }

    pub fn remove(&mut self, document_id: i64) -> Option<Conversation> {
        self.threads.remove(&document_id)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
