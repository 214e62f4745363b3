use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{required_str, ToolHandler};
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;

const DEFAULT_NUM_RESULTS: u64 = 5;
const MAX_NUM_RESULTS: u64 = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Serialize)]
struct SearchHit {
    title: String,
    url: String,
    snippet: String,
}

/// Google results through SerpAPI
pub struct WebSearchTool {
    tool: Tool,
    client: Client,
    host: String,
    api_key: Option<String>,
}

impl WebSearchTool {
    pub fn new(client: Client, host: String, api_key: Option<String>) -> Self {
        let tool = Tool::new(
            "web_search",
            "Search the web for artist biographies, release context, album reviews and Spotify track URLs",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query, e.g. \"spotify Jóga Björk\""
                    },
                    "num_results": {
                        "type": "integer",
                        "description": "Number of results to return",
                        "minimum": 1,
                        "maximum": MAX_NUM_RESULTS,
                        "default": DEFAULT_NUM_RESULTS
                    }
                },
                "required": ["query"]
            }),
        );

        Self {
            tool,
            client,
            host,
            api_key,
        }
    }

    fn num_results(arguments: &Value) -> AgentResult<u64> {
        match arguments.get("num_results") {
            None | Some(Value::Null) => Ok(DEFAULT_NUM_RESULTS),
            Some(value) => value
                .as_u64()
                .filter(|n| (1..=MAX_NUM_RESULTS).contains(n))
                .ok_or_else(|| {
                    AgentError::InvalidParameters(format!(
                        "'num_results' must be an integer between 1 and {}",
                        MAX_NUM_RESULTS
                    ))
                }),
        }
    }
}

#[async_trait]
impl ToolHandler for WebSearchTool {
    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn call(&self, arguments: Value) -> AgentResult<Value> {
        let query = required_str(&arguments, "query")?;
        let num = Self::num_results(&arguments)?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::ExecutionError("web search is not configured".into()))?;

        let url = format!("{}/search.json", self.host.trim_end_matches('/'));
        let num_param = num.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", num_param.as_str()),
                ("api_key", api_key),
            ])
            .send()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::ExecutionError(format!(
                "search returned status {}",
                status
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("invalid search response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(AgentError::ExecutionError(error));
        }

        let results: Vec<SearchHit> = body
            .organic_results
            .into_iter()
            .take(num as usize)
            .map(|r| SearchHit {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
            })
            .collect();

        Ok(json!({ "query": query, "results": results }))
    }
}
