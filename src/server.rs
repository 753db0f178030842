//! MCP server exposing the feedback broker as the `interactive_feedback` tool.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::broker::FeedbackBroker;
use crate::error::FeedbackError;
use crate::request::{FeedbackRequest, FeedbackResult, PredefinedOptions};

const INSTRUCTIONS: &str = "Human feedback server. Call `interactive_feedback` whenever you \
need the user to answer a question, confirm a step, or choose between options. The call \
blocks until the user has responded.";

/// Arguments of the `interactive_feedback` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InteractiveFeedbackInput {
    /// The specific question for the user
    pub message: String,

    /// Predefined options for the user to choose from (optional)
    #[serde(default)]
    #[schemars(with = "Option<Vec<String>>")]
    pub predefined_options: Option<serde_json::Value>,
}

impl InteractiveFeedbackInput {
    pub fn into_request(self) -> FeedbackRequest {
        FeedbackRequest::new(
            self.message,
            PredefinedOptions::from_value(self.predefined_options),
        )
    }
}

/// Tool registry handed to the transport. Built once per process.
#[derive(Clone)]
pub struct FeedbackServer {
    broker: Arc<FeedbackBroker>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FeedbackServer {
    pub fn new(broker: FeedbackBroker) -> Self {
        Self {
            broker: Arc::new(broker),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Request interactive feedback from the user")]
    pub async fn interactive_feedback(
        &self,
        Parameters(input): Parameters<InteractiveFeedbackInput>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.handle_feedback(input).await?;
        let json = serde_json::to_string(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

impl FeedbackServer {
    /// Tools this server registers, as listed to clients.
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Run one broker call off the async runtime; the prompt may take hours.
    pub async fn handle_feedback(
        &self,
        input: InteractiveFeedbackInput,
    ) -> Result<FeedbackResult, McpError> {
        let request = input.into_request();
        info!(
            message_len = request.message.len(),
            options = request.options.as_slice().len(),
            "Handling interactive_feedback"
        );

        let broker = Arc::clone(&self.broker);
        tokio::task::spawn_blocking(move || broker.request_feedback(&request))
            .await
            .map_err(|e| McpError::internal_error(format!("feedback task failed: {e}"), None))?
            .map_err(|e| {
                error!("interactive_feedback failed: {}", e);
                to_mcp_error(&e)
            })
    }
}

#[tool_handler]
impl ServerHandler for FeedbackServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Broker failures surface as internal errors tagged with their kind.
pub fn to_mcp_error(err: &FeedbackError) -> McpError {
    let mut data = json!({ "kind": err.kind() });
    if let Some(code) = err.exit_code() {
        data["exit_code"] = json!(code);
    }
    McpError::internal_error(err.to_string(), Some(data))
}

/// Serve `server` over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: FeedbackServer) -> crate::error::Result<()> {
    let tools: Vec<String> = server.tools().into_iter().map(|t| t.name.into_owned()).collect();
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| FeedbackError::Transport {
            reason: e.to_string(),
        })?;

    info!(?tools, "MCP server ready on stdio");

    let reason = service.waiting().await.map_err(|e| FeedbackError::Transport {
        reason: e.to_string(),
    })?;
    info!(?reason, "MCP session ended");
    Ok(())
}
