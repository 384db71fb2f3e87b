//! The session controller.
//!
//! One [`Session`] owns everything a front end needs to chat with
//! ingested documents: the document list, the active document, its
//! conversation, and the ingestion status. All mutation goes through the
//! operations here; presentation code reads [`SessionSnapshot`]s and
//! re-renders when the revision counter moves.

use super::state::{IngestStatus, SessionSnapshot, SessionState};
use crate::chat::{ChatClient, ERROR_REPLY};
use crate::config::{Config, NarratorConfig, TimingConfig};
use crate::conversation::{Conversation, Message};
use crate::error::{DocentError, Result};
use crate::ingest::{IngestClient, IngestReport, StageNarrator};
use crate::registry::{Document, Registry, RestRegistry};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use url::Url;

/// Live session over one pipeline and one registry.
///
/// Created with [`Session::start`], torn down by dropping: the drop stops
/// the change pump and with it the registry watch. Cheap snapshot reads
/// and a revision watch channel are the only things exposed to rendering
/// code; state is never handed out by reference.
pub struct Session {
    inner: Arc<SessionInner>,
    pump: JoinHandle<()>,
}

struct SessionInner {
    registry: Arc<dyn Registry>,
    ingest: IngestClient,
    chat: ChatClient,
    timing: TimingConfig,
    narrator: NarratorConfig,
    state: RwLock<SessionState>,
    stage: watch::Sender<String>,
    revision: watch::Sender<u64>,
}

// ─── Construction and teardown ──────────────────────────────────────────────

impl Session {
    /// Start a session against the registry named in the config.
    ///
    /// The initial document fetch happens before this returns: if the
    /// registry already has documents, the most recently processed one is
    /// active and the session is `Ready`. A failed fetch degrades to an
    /// empty list rather than an error.
    pub async fn start(config: Config) -> Result<Session> {
        let registry = Arc::new(RestRegistry::new(&config.registry, &config.timing));
        Self::with_registry(config, registry).await
    }

    /// Start a session with a caller-supplied registry implementation.
    pub async fn with_registry(config: Config, registry: Arc<dyn Registry>) -> Result<Session> {
        config.validate()?;
        let Config {
            webhooks,
            timing,
            narrator,
            ..
        } = config;

        let (stage, _) = watch::channel(String::new());
        let (revision, _) = watch::channel(0u64);

        let inner = Arc::new(SessionInner {
            registry,
            ingest: IngestClient::new(webhooks.ingest_url, &timing),
            chat: ChatClient::new(webhooks.chat_url, &timing),
            timing,
            narrator,
            state: RwLock::new(SessionState::new()),
            stage,
            revision,
        });

        inner.reconcile_documents(true).await;

        let pump_inner = inner.clone();
        let pump = tokio::spawn(async move {
            run_change_pump(pump_inner).await;
        });

        Ok(Session { inner, pump })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

// ─── Reads ──────────────────────────────────────────────────────────────────

impl Session {
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.read().await;
        state.snapshot(self.inner.stage.borrow().clone())
    }

    /// Revision counter bumped after every state change. Watch it and pull
    /// a fresh [`Session::snapshot`] on each change.
    pub fn updates(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Live narrator captions. Carries the empty string while no
    /// ingestion is running.
    pub fn stage_updates(&self) -> watch::Receiver<String> {
        self.inner.stage.subscribe()
    }
}

// ─── Operations ─────────────────────────────────────────────────────────────

impl Session {
    /// Hand a document URL to the ingestion pipeline and adopt the result.
    ///
    /// The current conversation is cleared and a fresh conversation id
    /// minted before any network traffic, so the new document never
    /// inherits stale history. On success the registry is re-fetched and
    /// its newest entry becomes active with status `Ready`. On any
    /// failure, including a URL that does not parse (no request is issued
    /// then), the status shows `Error` and reverts to `Idle` after the
    /// configured delay.
    pub async fn upload_document(&self, url: &str) {
        self.inner.run_upload(url).await;
    }

    /// Run one chat turn against the active document.
    ///
    /// The user turn is appended before the request is issued; the
    /// assistant turn is appended when it settles. Failures never escape:
    /// a failed turn appends a fixed apology instead. Blank input and
    /// sessions that are not `Ready` are ignored.
    pub async fn send_message(&self, content: &str) {
        let text = content.trim();
        if text.is_empty() {
            tracing::debug!("chat turn ignored: empty message");
            return;
        }

        let turn = {
            let mut state = self.inner.state.write().await;
            if state.status != IngestStatus::Ready {
                tracing::debug!("chat turn ignored: session not ready");
                return;
            }
            let Some(filename) = state.active.as_ref().map(|d| d.filename.clone()) else {
                tracing::debug!("chat turn ignored: no active document");
                return;
            };
            state.conversation.messages.push(Message::user(text));
            state.thinking = true;
            (state.conversation.id.clone(), filename)
        };
        self.inner.touch();

        let (conversation_id, filename) = turn;
        let reply = match self
            .inner
            .chat
            .send(&conversation_id, text, Some(&filename))
            .await
        {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!("chat turn failed: {error}");
                ERROR_REPLY.to_string()
            }
        };

        {
            let mut state = self.inner.state.write().await;
            state.conversation.messages.push(Message::assistant(reply));
            state.thinking = false;
        }
        self.inner.touch();
    }

    /// Make another known document active, restoring its saved
    /// conversation or starting a fresh one.
    ///
    /// The outgoing conversation is saved under the outgoing document's
    /// key first, so switching away and back reproduces it exactly.
    /// Unknown ids are ignored.
    pub async fn switch_document(&self, id: i64) {
        {
            let mut guard = self.inner.state.write().await;
            let state = &mut *guard;
            let Some(target) = state.documents.iter().find(|d| d.id == id).cloned() else {
                return;
            };

            if let Some(previous) = &state.active {
                state.store.put(previous.id, state.conversation.clone());
            }
            state.conversation = state
                .store
                .get(id)
                .cloned()
                .unwrap_or_else(Conversation::new);
            state.active = Some(target);
            state.status = IngestStatus::Ready;
        }
        self.inner.touch();
    }

    /// Delete a document from the registry along with its conversation.
    ///
    /// If the deleted document was active the session drops back to
    /// `Idle` with no active document and no messages. The document list
    /// is re-fetched afterwards either way. Registry rejections are
    /// returned to the caller; ids not in the known list are ignored.
    pub async fn delete_document(&self, id: i64) -> Result<()> {
        let target = {
            let state = self.inner.state.read().await;
            state.documents.iter().find(|d| d.id == id).cloned()
        };
        let Some(target) = target else {
            return Ok(());
        };

        self.inner.registry.delete_document(&target).await?;

        {
            let mut guard = self.inner.state.write().await;
            let state = &mut *guard;
            state.store.remove(id);
            if state.active.as_ref().is_some_and(|d| d.id == id) {
                state.active = None;
                state.conversation = Conversation::new();
                state.suggestions.clear();
                state.status = IngestStatus::Idle;
            }
        }
        self.inner.touch();

        self.inner.reconcile_documents(false).await;
        Ok(())
    }

    /// Wipe the active conversation and mint a new conversation id.
    ///
    /// The active document, the document list and the ingestion status
    /// stay as they are.
    pub async fn reset_conversation(&self) {
        {
            let mut guard = self.inner.state.write().await;
            let state = &mut *guard;
            state.conversation = Conversation::new();
            if let Some(active) = &state.active {
                state.store.put(active.id, state.conversation.clone());
            }
        }
        self.inner.touch();
    }
}

// ─── Internal flows ─────────────────────────────────────────────────────────

impl SessionInner {
    fn touch(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    async fn run_upload(self: &Arc<Self>, url: &str) {
        {
            let mut state = self.state.write().await;
            state.conversation = Conversation::new();
            state.suggestions.clear();
            state.status = IngestStatus::Processing;
        }
        self.touch();

        // The narrator lives exactly as long as the attempt is in flight.
        let narrator = StageNarrator::start(
            self.narrator.stages.clone(),
            Duration::from_millis(self.narrator.period_ms),
            self.stage.clone(),
        );
        let settled: std::result::Result<IngestReport, DocentError> = match Url::parse(url) {
            Ok(target) => self.ingest.ingest(&target).await.map_err(DocentError::from),
            Err(error) => Err(anyhow::anyhow!("invalid document url {url:?}: {error}").into()),
        };
        drop(narrator);

        let adopted: std::result::Result<(IngestReport, Vec<Document>), DocentError> =
            match settled {
                Ok(report) => self
                    .registry
                    .list_documents()
                    .await
                    .map(|documents| (report, documents))
                    .map_err(DocentError::from),
                Err(error) => Err(error),
            };

        match adopted {
            Ok((report, documents)) => {
                {
                    let mut guard = self.state.write().await;
                    let state = &mut *guard;
                    let newest = documents.first().cloned();
                    state.documents = documents;
                    if let Some(document) = &newest {
                        state.store.put(document.id, state.conversation.clone());
                    }
                    state.active = newest;
                    if !report.suggestions.is_empty() {
                        state.suggestions = report.suggestions;
                    }
                    state.status = IngestStatus::Ready;
                }
                self.touch();
            }
            Err(error) => {
                tracing::warn!("ingestion of {url} failed: {error}");
                {
                    let mut state = self.state.write().await;
                    state.status = IngestStatus::Error;
                }
                self.touch();
                self.schedule_error_revert();
            }
        }
    }

    /// Deferred `Error` to `Idle` transition. It is not cancelled by
    /// later activity; it fires even if another upload started meanwhile.
    fn schedule_error_revert(self: &Arc<Self>) {
        let inner = self.clone();
        let delay = Duration::from_millis(self.timing.error_revert_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = inner.state.write().await;
                state.status = IngestStatus::Idle;
            }
            inner.touch();
        });
    }

    /// Replace the document list with a fresh registry fetch and patch up
    /// everything that hangs off it. Safe to run any number of times.
    async fn reconcile_documents(&self, adopt_most_recent: bool) {
        let documents = match self.registry.list_documents().await {
            Ok(documents) => documents,
            Err(error) => {
                tracing::warn!("document list fetch failed: {error}");
                return;
            }
        };

        {
            let mut guard = self.state.write().await;
            let state = &mut *guard;

            let live: HashSet<i64> = documents.iter().map(|d| d.id).collect();
            let vanished: Vec<i64> = state
                .documents
                .iter()
                .map(|d| d.id)
                .filter(|id| !live.contains(id))
                .collect();
            for id in vanished {
                state.store.remove(id);
            }

            state.documents = documents;

            match state.active.as_ref().map(|d| d.id) {
                Some(id) => match state.documents.iter().find(|d| d.id == id).cloned() {
                    Some(row) => state.active = Some(row),
                    None => {
                        // Active document deleted remotely.
                        state.active = None;
                        state.conversation = Conversation::new();
                        state.suggestions.clear();
                        state.status = IngestStatus::Idle;
                    }
                },
                None if adopt_most_recent => {
                    if let Some(newest) = state.documents.first().cloned() {
                        state.active = Some(newest);
                        state.conversation = Conversation::new();
                        state.status = IngestStatus::Ready;
                    }
                }
                None => {}
            }
        }
        self.touch();
    }
}

/// Applies registry change events for as long as the session lives. The
/// payload is only a hint that something moved; each event triggers a
/// full re-fetch, which keeps the handler idempotent under races with
/// local writes.
async fn run_change_pump(inner: Arc<SessionInner>) {
    let mut feed = inner.registry.watch_changes();
    while let Some(change) = feed.next().await {
        tracing::debug!("registry change observed: {change:?}");
        inner.reconcile_documents(false).await;
    }
}
