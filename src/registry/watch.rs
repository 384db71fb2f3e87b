use super::types::{Document, RegistryChange};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Stream of registry change events.
///
/// May own the background watcher producing the events; dropping the feed
/// aborts it, releasing the subscription exactly once.
pub struct ChangeFeed {
    rx: mpsc::Receiver<RegistryChange>,
    watcher: Option<JoinHandle<()>>,
}

impl ChangeFeed {
    /// Feed over a raw receiver, for implementations that produce events
    /// somewhere else (or tests that feed them by hand).
    pub fn new(rx: mpsc::Receiver<RegistryChange>) -> Self {
        Self { rx, watcher: None }
    }

    /// Feed backed by a watcher task whose lifetime is tied to the feed.
    pub fn with_watcher(rx: mpsc::Receiver<RegistryChange>, watcher: JoinHandle<()>) -> Self {
        Self {
            rx,
            watcher: Some(watcher),
        }
    }

    /// Next change event, or `None` once the producing side has gone away.
    pub async fn next(&mut self) -> Option<RegistryChange> {
        self.rx.recv().await
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

/// Computes the events separating two consecutive snapshots of the remote
/// collection. A row counts as updated when any of its fields changed.
pub(crate) fn diff_rows(prev: &[Document], next: &[Document]) -> Vec<RegistryChange> {
    let prev_by_id: HashMap<i64, &Document> = prev.iter().map(|row| (row.id, row)).collect();
    let next_ids: HashSet<i64> = next.iter().map(|row| row.id).collect();

    let mut changes = Vec::new();

    for row in next {
        match prev_by_id.get(&row.id).copied() {
            None => changes.push(RegistryChange::Inserted(row.clone())),
            Some(old) if old != row => changes.push(RegistryChange::Updated(row.clone())),
            Some(_) => {}
        }
    }

    for row in prev {
        if !next_ids.contains(&row.id) {
            changes.push(RegistryChange::Deleted { id: row.id });
        }
    }

    changes
}
