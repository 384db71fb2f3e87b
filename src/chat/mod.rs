//! Chat turns: the webhook client and the reply-shape decoder.

pub mod client;
pub mod decode;

pub use client::{ChatClient, ERROR_REPLY, FALLBACK_REPLY};
pub use decode::decode_reply;
