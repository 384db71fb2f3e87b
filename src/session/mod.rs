//! Session orchestration: one live state machine over the registry, the
//! ingestion pipeline and the chat webhook.

pub mod controller;
pub mod state;

pub use controller::Session;
pub use state::{IngestStatus, SessionSnapshot};
