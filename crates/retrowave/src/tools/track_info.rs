use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{required_str, ToolHandler};
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;

const SPOTIFY_HOST: &str = "open.spotify.com";

#[derive(Debug, Deserialize)]
struct OEmbed {
    #[serde(default)]
    title: String,
    thumbnail_url: Option<String>,
    #[serde(default)]
    provider_name: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Track metadata from Spotify's oEmbed endpoint
pub struct TrackInfoTool {
    tool: Tool,
    client: Client,
    host: String,
}

impl TrackInfoTool {
    pub fn new(client: Client, host: String) -> Self {
        let tool = Tool::new(
            "get_track_info",
            "Get album artwork, title and other metadata for a Spotify track URL",
            json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "An open.spotify.com track URL"
                    }
                },
                "required": ["url"]
            }),
        );

        Self { tool, client, host }
    }
}

fn parse_spotify_url(raw: &str) -> AgentResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AgentError::InvalidParameters(format!("invalid url '{}': {}", raw, e)))?;

    match (url.scheme(), url.host_str()) {
        ("https" | "http", Some(SPOTIFY_HOST)) => Ok(url),
        _ => Err(AgentError::InvalidParameters(format!(
            "'{}' is not a Spotify URL",
            raw
        ))),
    }
}

#[async_trait]
impl ToolHandler for TrackInfoTool {
    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn call(&self, arguments: Value) -> AgentResult<Value> {
        let spotify_url = parse_spotify_url(required_str(&arguments, "url")?)?;

        let endpoint = format!("{}/oembed", self.host.trim_end_matches('/'));
        let response = self
            .client
            .get(&endpoint)
            .query(&[("url", spotify_url.as_str())])
            .send()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("oEmbed request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::ExecutionError(format!(
                "oEmbed returned status {}",
                status
            )));
        }

        let oembed: OEmbed = response
            .json()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("invalid oEmbed response: {}", e)))?;

        Ok(json!({
            "spotify_url": spotify_url.as_str(),
            "title": oembed.title,
            "thumbnail_url": oembed.thumbnail_url,
            "provider_name": oembed.provider_name,
            "type": oembed.kind,
        }))
    }
}
