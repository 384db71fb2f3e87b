//! Shared HTTP client construction.
//!
//! Every driver talks to its backend through a client built here, so the
//! host's `[timing]` section governs all outbound traffic the same way:
//! the overall request timeout bounds a whole webhook call (ingestion can
//! legitimately take minutes), the connect timeout bounds only the TCP
//! handshake.

use crate::config::TimingConfig;
use reqwest::Client;
use std::time::Duration;

pub fn build_http_client(timing: &TimingConfig) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timing.request_timeout_secs))
        .connect_timeout(Duration::from_secs(timing.connect_timeout_secs))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
