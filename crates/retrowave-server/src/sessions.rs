use retrowave::models::message::{Message, ToolResponse};
use retrowave::models::role::Role;
use retrowave::orchestrator::Reply;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// A tool invocation as reported to clients, with its final result or error payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallSummary {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    pub result: Value,
}

impl From<&ToolResponse> for ToolCallSummary {
    fn from(response: &ToolResponse) -> Self {
        Self {
            id: response.id.clone(),
            name: response.name.clone(),
            arguments: response.arguments.clone(),
            result: response.result_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallSummary>>,
}

impl ChatMessage {
    fn new(role: Role, content: String, tool_calls: Option<Vec<ToolCallSummary>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: chrono::Utc::now().timestamp_millis(),
            tool_calls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    pub session_id: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Oldest messages are dropped once a session holds more than this
pub const MAX_STORED_MESSAGES: usize = 50;

/// Conversation history per session id, kept in memory for the life of the process.
///
/// Each session keeps at most [`MAX_STORED_MESSAGES`] messages. Sessions are only
/// removed by [`clear`](Self::clear).
pub struct SessionStore {
    model: String,
    sessions: Mutex<HashMap<String, ChatState>>,
}

impl SessionStore {
    pub fn new<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn empty(&self, session_id: &str) -> ChatState {
        ChatState {
            session_id: session_id.to_string(),
            model: self.model.clone(),
            messages: Vec::new(),
        }
    }

    pub async fn snapshot(&self, session_id: &str) -> ChatState {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .cloned()
            .unwrap_or_else(|| self.empty(session_id))
    }

    /// The session's messages as role and text only
    pub async fn history(&self, session_id: &str) -> Vec<Message> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .map(|state| {
                state
                    .messages
                    .iter()
                    .map(|m| Message::new(m.role).with_text(m.content.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Append a completed exchange and return the updated state
    pub async fn record(&self, session_id: &str, user_message: &str, reply: &Reply) -> ChatState {
        let tool_calls = if reply.tool_calls.is_empty() {
            None
        } else {
            Some(reply.tool_calls.iter().map(ToolCallSummary::from).collect())
        };

        let mut sessions = self.sessions.lock().await;
        let state = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| self.empty(session_id));
        state
            .messages
            .push(ChatMessage::new(Role::User, user_message.to_string(), None));
        state.messages.push(ChatMessage::new(
            Role::Assistant,
            reply.content.clone(),
            tool_calls,
        ));
        let excess = state.messages.len().saturating_sub(MAX_STORED_MESSAGES);
        state.messages.drain(..excess);
        state.clone()
    }

    pub async fn clear(&self, session_id: &str) -> ChatState {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(session_id);
        self.empty(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrowave::errors::AgentError;
    use serde_json::json;

    fn reply(content: &str, tool_calls: Vec<ToolResponse>) -> Reply {
        Reply {
            content: content.to_string(),
            tool_calls,
        }
    }

    #[tokio::test]
    async fn test_unknown_session_is_empty() {
        let store = SessionStore::new("gpt-4o");
        let state = store.snapshot("abc").await;
        assert_eq!(state.session_id, "abc");
        assert_eq!(state.model, "gpt-4o");
        assert!(state.messages.is_empty());
        assert!(store.history("abc").await.is_empty());
    }

    #[tokio::test]
    async fn test_record_appends_exchange() {
        let store = SessionStore::new("gpt-4o");
        let failed = ToolResponse {
            id: "call_1".to_string(),
            name: "web_search".to_string(),
            arguments: json!({}),
            tool_result: Err(AgentError::ExecutionError("web search is not configured".into())),
        };

        store.record("abc", "first", &reply("[]", vec![])).await;
        let state = store.record("abc", "second", &reply("[{}]", vec![failed])).await;

        assert_eq!(state.messages.len(), 4);
        assert_eq!(state.messages[0].role, Role::User);
        assert_eq!(state.messages[1].tool_calls, None);
        let calls = state.messages[3].tool_calls.as_ref().unwrap();
        assert_eq!(
            calls[0].result,
            json!({"error": "Failed to execute web_search: Tool execution failed: web search is not configured"})
        );

        let history = store.history("abc").await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[3].role, Role::Assistant);
        assert_eq!(history[3].text().as_deref(), Some("[{}]"));
        assert!(history.iter().all(|m| !m.has_tool_requests()));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated_and_clearable() {
        let store = SessionStore::new("gpt-4o");
        store.record("a", "hello", &reply("[]", vec![])).await;
        store.record("b", "hello", &reply("[]", vec![])).await;

        let cleared = store.clear("a").await;
        assert!(cleared.messages.is_empty());
        assert!(store.snapshot("a").await.messages.is_empty());
        assert_eq!(store.snapshot("b").await.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_stored_messages_are_capped() {
        let store = SessionStore::new("gpt-4o");
        let exchanges = MAX_STORED_MESSAGES / 2 + 3;
        for i in 0..exchanges {
            store.record("abc", &format!("message {}", i), &reply("[]", vec![])).await;
        }

        let state = store.snapshot("abc").await;
        assert_eq!(state.messages.len(), MAX_STORED_MESSAGES);
        assert_eq!(state.messages[0].content, "message 3");
        assert_eq!(
            state.messages.last().map(|m| m.content.as_str()),
            Some("[]")
        );
    }

    #[test]
    fn test_chat_message_wire_format() {
        let message = ChatMessage {
            id: "m1".to_string(),
            role: Role::Assistant,
            content: "[]".to_string(),
            timestamp: 1_700_000_000_000,
            tool_calls: None,
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"id": "m1", "role": "assistant", "content": "[]", "timestamp": 1_700_000_000_000i64})
        );
    }
}
