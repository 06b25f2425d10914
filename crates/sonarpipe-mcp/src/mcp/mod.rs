use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::stdio,
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use sonarpipe_core::{CompletionBackend, ToolResult};
use std::sync::Arc;

use crate::catalog;

/// MCP adapter over the transport-independent dispatcher.
///
/// Holds only read-only shared state: the catalog and the backend (whose
/// config and HTTP pool are immutable after startup).
#[derive(Clone)]
pub(crate) struct SonarpipeMcp {
    backend: Arc<dyn CompletionBackend>,
    tools: Arc<Vec<Tool>>,
}

impl SonarpipeMcp {
    pub(crate) fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            tools: Arc::new(rmcp_tools()),
        }
    }
}

pub(crate) fn rmcp_tools() -> Vec<Tool> {
    catalog::catalog()
        .into_iter()
        .map(|d| Tool::new(d.name, d.description, d.input_schema))
        .collect()
}

/// Tool failures stay in-band (`isError: true`); they are never protocol errors.
pub(crate) fn call_tool_result(r: ToolResult) -> CallToolResult {
    let content = r
        .content
        .into_iter()
        .map(|c| Content::text(c.text))
        .collect::<Vec<_>>();
    if r.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

impl ServerHandler for SonarpipeMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Perplexity Sonar tools: perplexity_ask (quick web-grounded answers), perplexity_research (deep cited research), perplexity_reason (step-by-step reasoning). Each takes a `messages` array."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "sonarpipe".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools.as_ref().clone()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let r = sonarpipe_core::call_tool(
            self.backend.as_ref(),
            &request.name,
            request.arguments.as_ref(),
        )
        .await;
        Ok(call_tool_result(r))
    }
}

pub(crate) async fn serve_stdio(backend: Arc<dyn CompletionBackend>) -> Result<(), McpError> {
    let svc = SonarpipeMcp::new(backend);
    let running = svc
        .serve(stdio())
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    tracing::info!("sonarpipe MCP server running on stdio (ask, research, reason)");
    // Keep the stdio server alive until the client closes.
    running
        .waiting()
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(())
}
