//! Assembles the ordered message lists sent to the completion provider.

use serde::Serialize;

use crate::errors::ChatError;
use crate::models::message::{Message, MessageContent, ToolRequest, ToolResponse};
use crate::models::tool::Tool;
use crate::prompt_template::{load_prompt, SYSTEM_TEMPLATE};

/// History entries carried into the first completion of a round
pub const HISTORY_WINDOW: usize = 5;
/// History entries carried into the follow-up completion after tool execution
pub const FOLLOW_UP_HISTORY_WINDOW: usize = 3;

const BROADCAST_WORD_LIMIT: usize = 12;
const PLACEHOLDER_ARTWORK: &str = "https://via.placeholder.com/150";

#[derive(Serialize)]
struct ToolInfo<'a> {
    name: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct SystemContext<'a> {
    tools: Vec<ToolInfo<'a>>,
    broadcast_word_limit: usize,
    placeholder_artwork: &'a str,
}

#[derive(Debug, Clone)]
pub struct ConversationBuilder {
    system_prompt: String,
}

impl ConversationBuilder {
    /// Render the system instructions once for the given tool declarations
    pub fn new(tools: &[Tool]) -> Result<Self, ChatError> {
        let context = SystemContext {
            tools: tools
                .iter()
                .map(|tool| ToolInfo {
                    name: &tool.name,
                    description: &tool.description,
                })
                .collect(),
            broadcast_word_limit: BROADCAST_WORD_LIMIT,
            placeholder_artwork: PLACEHOLDER_ARTWORK,
        };
        let system_prompt =
            load_prompt(SYSTEM_TEMPLATE, &context).map_err(|e| ChatError::Prompt(e.to_string()))?;
        Ok(Self { system_prompt })
    }

    pub fn with_system_prompt<S: Into<String>>(system_prompt: S) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// System message, the last [`HISTORY_WINDOW`] history entries as role and text,
    /// then the user message
    pub fn build(&self, user_message: &str, history: &[Message]) -> Vec<Message> {
        let mut messages = vec![self.system_message()];
        messages.extend(trailing(history, HISTORY_WINDOW));
        messages.push(Message::user().with_text(user_message));
        messages
    }

    /// The second completion of a round: system message, a shorter history slice,
    /// the user message, the assistant's tool calls and one tool message per result
    pub fn follow_up(
        &self,
        user_message: &str,
        history: &[Message],
        requests: &[ToolRequest],
        responses: &[ToolResponse],
    ) -> Vec<Message> {
        let mut messages = vec![self.system_message()];
        messages.extend(trailing(history, FOLLOW_UP_HISTORY_WINDOW));
        messages.push(Message::user().with_text(user_message));

        let assistant = requests.iter().fold(Message::assistant(), |message, request| {
            message.with_content(MessageContent::ToolRequest(request.clone()))
        });
        messages.push(assistant);

        messages.extend(
            responses
                .iter()
                .map(|response| Message::tool().with_tool_response(response.clone())),
        );
        messages
    }

    fn system_message(&self) -> Message {
        Message::system().with_text(self.system_prompt.clone())
    }
}

fn trailing(history: &[Message], window: usize) -> impl Iterator<Item = Message> + '_ {
    let start = history.len().saturating_sub(window);
    history[start..].iter().map(Message::text_only)
}
