mod track_info;
mod web_search;

pub use track_info::TrackInfoTool;
pub use web_search::WebSearchTool;

use anyhow::Result as AnyhowResult;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{AgentError, AgentResult};
use crate::models::message::{ToolRequest, ToolResponse};
use crate::models::tool::Tool;

pub const DEFAULT_SEARCH_HOST: &str = "https://serpapi.com";
pub const DEFAULT_OEMBED_HOST: &str = "https://open.spotify.com";

/// A single named capability the model can invoke
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The declaration advertised to the model
    fn tool(&self) -> &Tool;

    /// Execute the tool with already parsed arguments
    async fn call(&self, arguments: Value) -> AgentResult<Value>;
}

/// Endpoints and credentials for the built-in lookup tools
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// SerpAPI key; web search reports itself unconfigured without one
    pub serpapi_key: Option<String>,
    pub search_host: String,
    pub oembed_host: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            serpapi_key: None,
            search_host: DEFAULT_SEARCH_HOST.to_string(),
            oembed_host: DEFAULT_OEMBED_HOST.to_string(),
        }
    }
}

/// The fixed set of tools offered to the model in every round
#[derive(Default)]
pub struct ToolRegistry {
    handlers: Vec<Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `web_search` and `get_track_info`, sharing one HTTP client
    pub fn with_defaults(config: ToolConfig) -> AnyhowResult<Self> {
        let client = reqwest::Client::builder().build()?;
        let mut registry = Self::new();
        registry.register(Box::new(WebSearchTool::new(
            client.clone(),
            config.search_host,
            config.serpapi_key,
        )));
        registry.register(Box::new(TrackInfoTool::new(client, config.oembed_host)));
        Ok(registry)
    }

    pub fn register(&mut self, handler: Box<dyn ToolHandler>) {
        self.handlers.push(handler);
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.handlers
            .iter()
            .map(|handler| handler.tool().clone())
            .collect()
    }

    /// Look up the named tool and run it
    pub async fn execute(&self, name: &str, arguments: Value) -> AgentResult<Value> {
        let handler = self
            .handlers
            .iter()
            .find(|handler| handler.tool().name == name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;

        debug!(tool = name, "dispatching tool call");
        handler.call(arguments).await
    }

    /// Run every request concurrently and wait for all of them. Results keep the
    /// order of the requests; a failing request only affects its own result.
    pub async fn execute_all(&self, requests: &[ToolRequest]) -> Vec<ToolResponse> {
        let futures: Vec<_> = requests
            .iter()
            .map(|request| self.dispatch(request))
            .collect();

        futures::future::join_all(futures).await
    }

    async fn dispatch(&self, request: &ToolRequest) -> ToolResponse {
        let (arguments, tool_result) = match &request.tool_call {
            Ok(call) => (
                call.arguments.clone(),
                self.execute(&call.name, call.arguments.clone()).await,
            ),
            Err(e) => (Value::Object(Default::default()), Err(e.clone())),
        };

        if let Err(e) = &tool_result {
            warn!(tool = %request.name, id = %request.id, error = %e, "tool execution failed");
        }

        ToolResponse {
            id: request.id.clone(),
            name: request.name.clone(),
            arguments,
            tool_result,
        }
    }
}

/// Read a required string argument
pub(crate) fn required_str<'a>(arguments: &'a Value, key: &str) -> AgentResult<&'a str> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AgentError::InvalidParameters(format!("'{}' is required", key)))
}
