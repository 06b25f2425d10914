//! Local (reqwest) backends for sonarpipe.

use sonarpipe_core::{Config, Error, Result};
use std::time::Duration;

pub mod perplexity;

pub use perplexity::PerplexityClient;

/// Shared HTTP client for upstream calls.
///
/// `reqwest::Client` is reference-counted internally, so clones share one pool.
pub fn http_client(cfg: &Config) -> Result<reqwest::Client> {
    let mut b = reqwest::Client::builder()
        .user_agent(concat!("sonarpipe/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10));
    if let Some(t) = cfg.timeout {
        b = b.timeout(t);
    }
    b.build().map_err(|e| Error::NotConfigured(format!("http client: {e}")))
}
