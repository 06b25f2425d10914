//! Tool dispatch: name -> resolve -> build -> complete -> compose.
//!
//! Every outcome, including failures, comes back as a [`ToolResult`]. Callers
//! (the MCP handler, the `call` CLI) never see an `Err` from a tool call.

use crate::options::resolve;
use crate::request::build;
use crate::response::compose;
use crate::tool::ToolKind;
use crate::{CompletionBackend, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// The only value handed back to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<TextContent>,
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_flag(text.into(), false)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::with_flag(text.into(), true)
    }

    fn with_flag(text: String, is_error: bool) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text".to_string(),
                text,
            }],
            is_error,
        }
    }

    /// Text of the single content block.
    pub fn first_text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

/// Where a call is in the pipeline. Strictly sequential; any failure jumps to `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Resolving,
    Building,
    Calling,
    Composing,
    Done,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Building => "building",
            Self::Calling => "calling",
            Self::Composing => "composing",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run one tool call end to end. Stateless: nothing survives between calls.
pub async fn call_tool(
    backend: &dyn CompletionBackend,
    name: &str,
    args: Option<&Map<String, Value>>,
) -> ToolResult {
    let t0 = Instant::now();
    let Some(kind) = ToolKind::from_name(name) else {
        tracing::warn!(tool = name, "unknown tool");
        return ToolResult::error(Error::UnknownTool(name.to_string()).to_string());
    };

    match run(backend, kind, args).await {
        Ok(text) => {
            tracing::info!(
                tool = kind.name(),
                model = kind.model(),
                backend = backend.name(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                chars = text.len(),
                "tool call ok"
            );
            ToolResult::text(text)
        }
        Err((stage, e)) => {
            tracing::warn!(
                tool = kind.name(),
                stage = stage.as_str(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                error = %e,
                "tool call failed"
            );
            ToolResult::error(format!("Error: {e}"))
        }
    }
}

async fn run(
    backend: &dyn CompletionBackend,
    kind: ToolKind,
    args: Option<&Map<String, Value>>,
) -> Result<String, (Stage, Error)> {
    let mut stage = Stage::Resolving;
    let args = args
        .ok_or_else(|| Error::InvalidArguments("No arguments provided".to_string()))
        .map_err(|e| (stage, e))?;
    let resolved = resolve(kind, args).map_err(|e| (stage, e))?;

    stage = Stage::Building;
    let req = build(resolved.profile.model, resolved.messages, resolved.options);
    tracing::debug!(
        tool = kind.name(),
        stage = stage.as_str(),
        messages = req.messages.len(),
        domain_filter = req.has_domain_filter(),
        "built upstream request"
    );

    stage = Stage::Calling;
    let resp = backend.complete(&req).await.map_err(|e| (stage, e))?;

    stage = Stage::Composing;
    let text = compose(&resp);
    tracing::trace!(tool = kind.name(), stage = stage.as_str(), "composed");

    stage = Stage::Done;
    tracing::trace!(tool = kind.name(), stage = stage.as_str());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::UpstreamRequest;
    use crate::response::UpstreamResponse;
    use crate::PayloadError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records requests and replays one canned outcome.
    struct Stub {
        seen: Mutex<Vec<UpstreamRequest>>,
        reply: fn() -> crate::Result<UpstreamResponse>,
    }

    impl Stub {
        fn new(reply: fn() -> crate::Result<UpstreamResponse>) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                reply,
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
        }
    }

    #[async_trait::async_trait]
    impl CompletionBackend for Stub {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn complete(&self, req: &UpstreamRequest) -> crate::Result<UpstreamResponse> {
            self.seen
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(req.clone());
            (self.reply)()
        }
    }

    fn args(v: Value) -> Map<String, Value> {
        v.as_object().cloned().expect("object")
    }

    #[tokio::test]
    async fn unknown_tool_short_circuits_without_network() {
        let stub = Stub::new(|| Ok(UpstreamResponse::from_content("never")));
        let r = call_tool(&stub, "bogus", Some(&args(json!({ "messages": [] })))).await;
        assert!(r.is_error);
        assert_eq!(r.first_text(), "Unknown tool: bogus");
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn success_returns_composed_text() {
        let stub = Stub::new(|| {
            Ok(UpstreamResponse {
                content: "4".to_string(),
                citations: vec!["https://math".to_string()],
                ..UpstreamResponse::default()
            })
        });
        let r = call_tool(
            &stub,
            "perplexity_ask",
            Some(&args(json!({ "messages": [{ "role": "user", "content": "2+2?" }] }))),
        )
        .await;
        assert!(!r.is_error);
        assert_eq!(r.first_text(), "4\n\nCitations:\n[1] https://math\n");

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "sonar-pro");
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_the_backend() {
        let stub = Stub::new(|| Ok(UpstreamResponse::from_content("never")));
        let r = call_tool(&stub, "perplexity_reason", Some(&args(json!({ "messages": 1 })))).await;
        assert!(r.is_error);
        assert_eq!(
            r.first_text(),
            "Error: Invalid arguments for perplexity_reason: 'messages' must be an array"
        );

        let r = call_tool(&stub, "perplexity_research", None).await;
        assert_eq!(r.first_text(), "Error: No arguments provided");
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn backend_failures_become_error_results() {
        let stub = Stub::new(|| {
            Err(Error::Http {
                status: 500,
                status_text: "Internal Server Error".to_string(),
                body: "server error".to_string(),
            })
        });
        let r = call_tool(&stub, "perplexity_ask", Some(&args(json!({ "messages": [] })))).await;
        assert!(r.is_error);
        assert_eq!(
            r.first_text(),
            "Error: Perplexity API error: 500 Internal Server Error\nserver error"
        );

        let stub = Stub::new(|| Err(PayloadError::MissingChoices.into()));
        let r = call_tool(&stub, "perplexity_ask", Some(&args(json!({ "messages": [] })))).await;
        assert!(r.is_error);
        assert!(r.first_text().contains("missing or empty choices array"));
    }

    #[test]
    fn tool_result_wire_shape() {
        let v = serde_json::to_value(ToolResult::error("Unknown tool: x")).unwrap();
        assert_eq!(
            v,
            json!({ "content": [{ "type": "text", "text": "Unknown tool: x" }], "isError": true })
        );
    }
}
