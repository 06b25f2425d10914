//! Backend-agnostic types for sonarpipe: tool profiles, argument resolution,
//! upstream request building, response composition and tool dispatch.
//!
//! Nothing in this crate performs IO. The network call sits behind
//! [`CompletionBackend`], implemented by `sonarpipe-local`.

pub mod config;
pub mod dispatch;
pub mod options;
pub mod request;
pub mod response;
pub mod tool;

pub use config::Config;
pub use dispatch::{call_tool, Stage, TextContent, ToolResult};
pub use options::{resolve, Field, OptionKey, ResolvedCall, ToolOptions};
pub use request::{build, UpstreamRequest};
pub use response::{compose, Image, UpstreamResponse};
pub use tool::{Message, ToolKind, ToolProfile};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("Network error while calling Perplexity API: {0}")]
    Network(String),
    #[error("Perplexity API error: {status} {status_text}\n{body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Upstream answered 2xx but the body was not the shape we need.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Failed to parse JSON response from Perplexity API: invalid JSON ({0})")]
    InvalidJson(String),
    #[error("Invalid API response: missing or empty choices array")]
    MissingChoices,
    #[error("Invalid API response: missing or invalid message content")]
    InvalidContent,
}

pub type Result<T> = std::result::Result<T, Error>;

/// One chat-completions round trip against the upstream endpoint.
///
/// Implementations make a single attempt and report failures as
/// [`Error::Network`], [`Error::Http`] or [`Error::Payload`].
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn complete(&self, req: &UpstreamRequest) -> Result<UpstreamResponse>;
}
