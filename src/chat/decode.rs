//! Reply-shape normalization for the chat webhook.
//!
//! The workflow engine behind the webhook answers in whatever shape the
//! last node happened to produce: a bare string, an object keyed by
//! `output`, `text` or `response`, or a one-element array wrapping either.
//! [`decode_reply`] flattens all of those into plain text.

use serde::Deserialize;
use serde_json::Value;

/// The shapes a reply is allowed to take, tried in declaration order.
///
/// Field matching is by presence, not truthiness: an empty `output`
/// string is still an `output` reply.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReplyShape {
    Bare(String),
    Output { output: String },
    Text { text: String },
    Response { response: String },
}

/// Extract reply text from a chat-webhook payload.
///
/// Arrays are unwrapped to their first element first. A payload that fits
/// none of the known shapes is serialized back to compact JSON so the
/// caller still gets something renderable; scalars other than strings
/// carry no usable text and yield `None`.
pub fn decode_reply(payload: &Value) -> Option<String> {
    let inner = match payload {
        Value::Array(items) => items.first()?,
        other => other,
    };

    if let Ok(shape) = ReplyShape::deserialize(inner) {
        let text = match shape {
            ReplyShape::Bare(text)
            | ReplyShape::Output { output: text }
            | ReplyShape::Text { text }
            | ReplyShape::Response { response: text } => text,
        };
        return Some(unescape_newlines(&text));
    }

    match inner {
        Value::Object(_) | Value::Array(_) => Some(unescape_newlines(&inner.to_string())),
        _ => None,
    }
}

/// Turn literal `\n` escape sequences into real line breaks.
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}
