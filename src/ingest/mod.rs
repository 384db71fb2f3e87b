//! Document ingestion: the webhook client that hands a PDF to the pipeline
//! and the narrator that animates progress captions while it runs.

pub mod client;
pub mod narrator;

pub use client::{IngestClient, IngestReport};
pub use narrator::StageNarrator;
