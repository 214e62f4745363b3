use super::role::Role;
use super::tool::ToolCall;
use crate::errors::{AgentError, AgentResult};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextContent {
    pub text: String,
}

/// A tool invocation requested by the model, not yet executed
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolRequest {
    pub id: String,
    /// Function name exactly as the model produced it
    pub name: String,
    /// Arguments exactly as the model produced them, before parsing
    pub raw_arguments: String,
    pub tool_call: AgentResult<ToolCall>,
}

impl ToolRequest {
    pub fn new<S: Into<String>>(id: S, tool_call: ToolCall) -> Self {
        ToolRequest {
            id: id.into(),
            name: tool_call.name.clone(),
            raw_arguments: tool_call.arguments.to_string(),
            tool_call: Ok(tool_call),
        }
    }

    /// A request the model made that cannot be dispatched, e.g. unparseable arguments
    pub fn invalid<I, N, A>(id: I, name: N, raw_arguments: A, error: AgentError) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        ToolRequest {
            id: id.into(),
            name: name.into(),
            raw_arguments: raw_arguments.into(),
            tool_call: Err(error),
        }
    }
}

/// The outcome of executing one tool request, keyed by the request id
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    pub tool_result: AgentResult<Value>,
}

impl ToolResponse {
    /// The structured result fed back to the model: the tool output on success,
    /// or an object carrying a human-readable error string
    pub fn result_value(&self) -> Value {
        match &self.tool_result {
            Ok(value) => value.clone(),
            Err(e) => json!({
                "error": format!("Failed to execute {}: {}", self.name, e)
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.tool_result.is_err()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// Content passed inside a message, which can be both simple content and tool content
pub enum MessageContent {
    Text(TextContent),
    ToolRequest(ToolRequest),
    ToolResponse(ToolResponse),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(TextContent { text: text.into() })
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        if let MessageContent::ToolRequest(ref tool_request) = self {
            Some(tool_request)
        } else {
            None
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponse> {
        if let MessageContent::ToolResponse(ref tool_response) = self {
            Some(tool_response)
        } else {
            None
        }
    }

    /// Get the text content if this is a TextContent variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(&text.text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub content: Vec<MessageContent>,
}

impl Message {
    pub fn new(role: Role) -> Self {
        Message {
            role,
            content: Vec::new(),
        }
    }

    pub fn system() -> Self {
        Self::new(Role::System)
    }

    pub fn user() -> Self {
        Self::new(Role::User)
    }

    pub fn assistant() -> Self {
        Self::new(Role::Assistant)
    }

    pub fn tool() -> Self {
        Self::new(Role::Tool)
    }

    /// Add any MessageContent to the message
    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    /// Add a well-formed tool request to the message
    pub fn with_tool_request<S: Into<String>>(self, id: S, tool_call: ToolCall) -> Self {
        self.with_content(MessageContent::ToolRequest(ToolRequest::new(id, tool_call)))
    }

    /// Add a tool response to the message
    pub fn with_tool_response(self, response: ToolResponse) -> Self {
        self.with_content(MessageContent::ToolResponse(response))
    }

    /// All text content joined together, or None if the message carries no text
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|content| content.as_text())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    pub fn tool_requests(&self) -> impl Iterator<Item = &ToolRequest> {
        self.content
            .iter()
            .filter_map(|content| content.as_tool_request())
    }

    pub fn has_tool_requests(&self) -> bool {
        self.tool_requests().next().is_some()
    }

    /// A copy holding only the role and the text, without any tool metadata
    pub fn text_only(&self) -> Message {
        let message = Message::new(self.role);
        match self.text() {
            Some(text) => message.with_text(text),
            None => message,
        }
    }
}
