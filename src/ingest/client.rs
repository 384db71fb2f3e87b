//! Client for the ingestion webhook.
//!
//! Ingestion is a single POST: the pipeline downloads the PDF itself, chunks
//! and embeds it, and registers the result in the document table. The reply
//! body carries a `status` discriminator and, optionally, suggested questions
//! for the freshly ingested document.

use crate::config::TimingConfig;
use crate::error::IngestionError;
use crate::http_client::build_http_client;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestRequest<'a> {
    pdf_link: &'a str,
}

#[derive(Deserialize)]
struct IngestResponse {
    status: String,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// What the pipeline reported back for a successful ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Suggested questions for the document. Empty when the pipeline
    /// offers none.
    pub suggestions: Vec<String>,
}

pub struct IngestClient {
    url: String,
    client: Client,
}

impl IngestClient {
    pub fn new(url: impl Into<String>, timing: &TimingConfig) -> Self {
        Self {
            url: url.into(),
            client: build_http_client(timing),
        }
    }

    /// Submit a document URL to the pipeline and wait for it to finish.
    ///
    /// Ingestion runs synchronously on the pipeline side, so this call can
    /// take as long as chunking and embedding take. A `2xx` reply whose
    /// `status` is anything but `"success"` is a rejection.
    pub async fn ingest(&self, document_url: &Url) -> Result<IngestReport, IngestionError> {
        let response = self
            .client
            .post(&self.url)
            .json(&IngestRequest {
                pdf_link: document_url.as_str(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IngestionError::Http {
                status: response.status().as_u16(),
            });
        }

        let body: IngestResponse = response.json().await?;
        if body.status != "success" {
            return Err(IngestionError::Rejected {
                status: body.status,
            });
        }

        Ok(IngestReport {
            suggestions: body.suggestions,
        })
    }
}
