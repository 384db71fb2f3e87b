pub mod rest;
pub mod traits;
pub mod types;
pub mod watch;

pub use rest::RestRegistry;
pub use traits::Registry;
pub use types::{Document, RegistryChange};
pub use watch::ChangeFeed;
