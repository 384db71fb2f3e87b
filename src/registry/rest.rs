//! PostgREST-backed document registry.
//!
//! Speaks the `/rest/v1/{table}` dialect: filters are query parameters
//! (`id=eq.3`, `order=processed_at.desc`) and auth rides in an `apikey`
//! header plus a bearer token. Change notifications are synthesized by
//! polling and diffing snapshots, so a registry with no push channel still
//! satisfies the watch contract.

use super::traits::Registry;
use super::types::{Document, RegistryChange};
use super::watch::{ChangeFeed, diff_rows};
use crate::config::{RegistryConfig, TimingConfig};
use crate::error::RegistryError;
use crate::http_client::build_http_client;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const CHANGE_QUEUE_CAPACITY: usize = 64;

pub struct RestRegistry {
    inner: Arc<RestInner>,
}

struct RestInner {
    /// Pre-computed `{base}/rest/v1/{documents_table}`.
    rows_url: String,
    /// Pre-computed `{base}/rest/v1/{vectors_table}`.
    vectors_url: String,
    api_key: Option<String>,
    poll_interval: Duration,
    client: Client,
}

impl RestRegistry {
    pub fn new(config: &RegistryConfig, timing: &TimingConfig) -> Self {
        let base = config.base_url.trim_end_matches('/');

        Self {
            inner: Arc::new(RestInner {
                rows_url: format!("{base}/rest/v1/{}", config.documents_table),
                vectors_url: format!("{base}/rest/v1/{}", config.vectors_table),
                api_key: config.api_key.clone(),
                poll_interval: Duration::from_millis(config.poll_interval_ms),
                client: build_http_client(timing),
            }),
        }
    }
}

impl RestInner {
    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(key) = &self.api_key {
            builder
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}"))
        } else {
            builder
        }
    }

    async fn fetch_rows(&self) -> Result<Vec<Document>, RegistryError> {
        let response = self
            .authed(self.client.get(&self.rows_url))
            .query(&[("select", "*"), ("order", "processed_at.desc")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RegistryError::Http {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RegistryError::Decode(e.to_string()))
    }

    async fn delete_row(&self, id: i64) -> Result<(), RegistryError> {
        let response = self
            .authed(self.client.delete(&self.rows_url))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RegistryError::Http {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }

    async fn delete_vectors(&self, filename: &str) -> Result<(), RegistryError> {
        let response = self
            .authed(self.client.delete(&self.vectors_url))
            .query(&[("metadata->>filename", format!("eq.{filename}"))])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RegistryError::Http {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Registry for RestRegistry {
    async fn list_documents(&self) -> Result<Vec<Document>, RegistryError> {
        self.inner.fetch_rows().await
    }

    async fn delete_document(&self, document: &Document) -> Result<(), RegistryError> {
        self.inner.delete_row(document.id).await?;

        if let Err(error) = self.inner.delete_vectors(&document.filename).await {
            tracing::warn!(
                "vector cleanup for {} failed after delete: {error}",
                document.filename
            );
        }

        Ok(())
    }

    fn watch_changes(&self) -> ChangeFeed {
        let (tx, rx) = mpsc::channel(CHANGE_QUEUE_CAPACITY);
        let watcher_inner = self.inner.clone();
        let watcher = tokio::spawn(async move {
            run_poll_watcher(watcher_inner, tx).await;
        });

        ChangeFeed::with_watcher(rx, watcher)
    }
}

/// Polls the document table and emits the diff against the previous
/// snapshot. The first successful poll only establishes the baseline;
/// rows that existed before the watch started are not reported.
async fn run_poll_watcher(inner: Arc<RestInner>, tx: mpsc::Sender<RegistryChange>) {
    let mut interval = tokio::time::interval(inner.poll_interval);
    let mut known: Option<Vec<Document>> = None;

    loop {
        interval.tick().await;

        let rows = match inner.fetch_rows().await {
            Ok(rows) => rows,
            Err(error) => {
                tracing::debug!("registry poll failed: {error}");
                continue;
            }
        };

        if let Some(prev) = &known {
            for change in diff_rows(prev, &rows) {
                if tx.send(change).await.is_err() {
                    return;
                }
            }
        }

        known = Some(rows);
    }
}
