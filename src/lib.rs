#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod http_client;
pub mod ingest;
pub mod registry;
pub mod session;

pub use config::Config;
pub use conversation::{Conversation, Message, MessageRole};
pub use error::{DocentError, Result};
pub use registry::{Document, Registry, RegistryChange};
pub use session::{IngestStatus, Session, SessionSnapshot};
