pub mod schema;

pub use schema::{Config, NarratorConfig, RegistryConfig, TimingConfig, WebhooksConfig};
