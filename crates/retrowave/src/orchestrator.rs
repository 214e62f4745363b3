use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::conversation::ConversationBuilder;
use crate::errors::ChatError;
use crate::models::message::{Message, ToolRequest, ToolResponse};
use crate::models::tool::Tool;
use crate::providers::base::{Provider, Usage};
use crate::tools::ToolRegistry;

/// Returned in place of an empty answer, matching the shape the client parses
pub const EMPTY_REPLY: &str = "[]";

/// Progress of one orchestration round
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyEvent {
    /// The model asked for these tools, none of them executed yet
    ToolRequests(Vec<ToolRequest>),
    /// Every requested tool has finished, in request order
    ToolResponses(Vec<ToolResponse>),
    /// The final answer text
    Content(String),
}

/// The outcome of a completed round
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub content: String,
    pub tool_calls: Vec<ToolResponse>,
}

/// Runs one user message through completion, tool execution and the follow-up completion
pub struct Orchestrator {
    provider: Box<dyn Provider>,
    registry: ToolRegistry,
    conversation: ConversationBuilder,
    tools: Vec<Tool>,
}

impl Orchestrator {
    pub fn new(provider: Box<dyn Provider>, registry: ToolRegistry) -> Result<Self, ChatError> {
        let tools = registry.tools();
        let conversation = ConversationBuilder::new(&tools)?;
        Ok(Self {
            provider,
            registry,
            conversation,
            tools,
        })
    }

    pub fn with_conversation(
        provider: Box<dyn Provider>,
        registry: ToolRegistry,
        conversation: ConversationBuilder,
    ) -> Self {
        let tools = registry.tools();
        Self {
            provider,
            registry,
            conversation,
            tools,
        }
    }

    /// Stream the events of one round. The last item is always `Content` unless the
    /// stream ends with an error.
    ///
    /// At most one tool round is serviced: tools requested by the follow-up
    /// completion are logged and ignored.
    pub fn reply_stream(
        &self,
        user_message: String,
        history: Vec<Message>,
    ) -> BoxStream<'_, Result<ReplyEvent, ChatError>> {
        Box::pin(async_stream::try_stream! {
            let messages = self.conversation.build(&user_message, &history);
            let (response, usage) = self
                .provider
                .complete(&messages, &self.tools)
                .await
                .map_err(ChatError::completion)?;
            log_usage("initial", &usage);

            let requests: Vec<ToolRequest> = response.tool_requests().cloned().collect();

            if requests.is_empty() {
                yield ReplyEvent::Content(answer_text(&response));
            } else {
                debug!(count = requests.len(), "model requested tools");
                yield ReplyEvent::ToolRequests(requests.clone());

                // Let the consumer see the requests before the lookups start
                tokio::task::yield_now().await;

                let responses = self.registry.execute_all(&requests).await;
                yield ReplyEvent::ToolResponses(responses.clone());

                let follow_up = self
                    .conversation
                    .follow_up(&user_message, &history, &requests, &responses);
                let (response, usage) = self
                    .provider
                    .complete(&follow_up, &[])
                    .await
                    .map_err(ChatError::completion)?;
                log_usage("follow_up", &usage);

                if response.has_tool_requests() {
                    warn!(
                        count = response.tool_requests().count(),
                        "follow-up completion requested more tools; only one tool round is serviced"
                    );
                }

                yield ReplyEvent::Content(answer_text(&response));
            }
        })
    }

    /// Run a full round and collect its result
    pub async fn reply(&self, user_message: &str, history: &[Message]) -> Result<Reply, ChatError> {
        let mut stream = self.reply_stream(user_message.to_string(), history.to_vec());

        let mut content = None;
        let mut tool_calls = Vec::new();
        while let Some(event) = stream.next().await {
            match event? {
                ReplyEvent::ToolRequests(_) => {}
                ReplyEvent::ToolResponses(responses) => tool_calls = responses,
                ReplyEvent::Content(text) => content = Some(text),
            }
        }

        Ok(Reply {
            content: content.unwrap_or_else(|| EMPTY_REPLY.to_string()),
            tool_calls,
        })
    }
}

fn answer_text(message: &Message) -> String {
    message
        .text()
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| EMPTY_REPLY.to_string())
}

fn log_usage(stage: &str, usage: &Usage) {
    debug!(
        stage,
        input_tokens = ?usage.input_tokens,
        output_tokens = ?usage.output_tokens,
        total_tokens = ?usage.total_tokens,
        "completion usage"
    );
}
