use anyhow::{bail, Context, Result};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";
pub const SEND_FAILED: &str = "Failed to send message";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn ok(content: String) -> Self {
        Self {
            success: true,
            content: Some(content),
            error: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            content: None,
            error: Some(SEND_FAILED.to_string()),
        }
    }
}

/// Talks to the relay on behalf of one conversation
pub struct ChatService {
    client: Client,
    base_url: String,
    session_id: String,
}

impl ChatService {
    /// A fresh conversation with a random session id
    pub fn new(server: &str) -> Self {
        Self::with_session(server, uuid::Uuid::new_v4().to_string())
    }

    pub fn with_session<S: Into<String>>(server: &str, session_id: S) -> Self {
        Self {
            client: Client::new(),
            base_url: server.trim_end_matches('/').to_string(),
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat/{}/chat", self.base_url, self.session_id)
    }

    /// Send one message and return the assistant's answer. Never fails: any
    /// problem is reported as an unsuccessful response.
    pub async fn send_message(&self, message: &str) -> ChatResponse {
        match self.post_message(message).await {
            Ok(content) => ChatResponse::ok(content),
            Err(_) => ChatResponse::failed(),
        }
    }

    /// Like [`send_message`](Self::send_message) but asks the relay to stream the
    /// answer, handing every decoded piece to `on_chunk` as it arrives
    pub async fn send_message_streaming<F>(&self, message: &str, on_chunk: F) -> ChatResponse
    where
        F: FnMut(&str),
    {
        match self.stream_message(message, on_chunk).await {
            Ok(content) => ChatResponse::ok(content),
            Err(_) => ChatResponse::failed(),
        }
    }

    async fn post_message(&self, message: &str) -> Result<String> {
        let response = self
            .client
            .post(self.chat_url())
            .json(&json!({ "message": message, "stream": false }))
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        body["data"]["messages"]
            .as_array()
            .and_then(|messages| messages.last())
            .and_then(|message| message["content"].as_str())
            .map(str::to_string)
            .context("response carried no messages")
    }

    async fn stream_message<F>(&self, message: &str, mut on_chunk: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        let response = self
            .client
            .post(self.chat_url())
            .json(&json!({ "message": message, "stream": true }))
            .send()
            .await?
            .error_for_status()?;

        let mut body = response.bytes_stream();
        let mut pending = Vec::new();
        let mut full = String::new();

        while let Some(chunk) = body.next().await {
            pending.extend_from_slice(&chunk?);
            let text = take_utf8(&mut pending)?;
            if !text.is_empty() {
                on_chunk(&text);
                full.push_str(&text);
            }
        }

        if !pending.is_empty() {
            bail!("stream ended inside a UTF-8 sequence");
        }
        Ok(full)
    }
}

/// Drain the longest valid UTF-8 prefix, leaving a split trailing sequence behind
fn take_utf8(pending: &mut Vec<u8>) -> Result<String> {
    let valid = match std::str::from_utf8(pending) {
        Ok(_) => pending.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(e) => return Err(e.into()),
    };

    let rest = pending.split_off(valid);
    let text = String::from_utf8(std::mem::replace(pending, rest))?;
    Ok(text)
}
