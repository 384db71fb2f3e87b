//! Client for the chat webhook.

use super::decode::decode_reply;
use crate::config::TimingConfig;
use crate::error::ChatError;
use crate::http_client::build_http_client;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Appended when the webhook replied but the payload carried no text.
pub const FALLBACK_REPLY: &str = "Lo siento, no pude procesar la respuesta.";

/// Appended when the chat turn failed outright.
pub const ERROR_REPLY: &str = "Lo siento, hubo un error al procesar tu pregunta.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    conversation_id: &'a str,
    message_id: String,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
    created_at: String,
}

pub struct ChatClient {
    url: String,
    client: Client,
}

impl ChatClient {
    pub fn new(url: impl Into<String>, timing: &TimingConfig) -> Self {
        Self {
            url: url.into(),
            client: build_http_client(timing),
        }
    }

    /// Run one chat turn and return the normalized reply text.
    ///
    /// Every message gets a fresh id; the conversation id is what ties
    /// turns together on the backend. A reply that decodes to nothing
    /// becomes [`FALLBACK_REPLY`] rather than an error, so only transport
    /// and HTTP failures surface as `Err`.
    pub async fn send(
        &self,
        conversation_id: &str,
        content: &str,
        filename: Option<&str>,
    ) -> Result<String, ChatError> {
        let request = ChatRequest {
            conversation_id,
            message_id: Uuid::new_v4().to_string(),
            message: content,
            filename,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(ChatError::Http {
                status: response.status().as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        Ok(decode_reply(&payload).unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}
