use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, Usage};

/// What the provider was asked for on one completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<Tool>,
}

/// A mock provider that returns pre-configured responses and records every request
pub struct MockProvider {
    responses: Mutex<Vec<Result<Message, String>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Create a mock provider whose sequence may include failed completions
    pub fn with_results(responses: Vec<Result<Message, String>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded requests, usable after the provider is boxed
    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> Result<(Message, Usage)> {
        self.requests.lock().unwrap().push(CompletionRequest {
            messages: messages.to_vec(),
            tools: tools.to_vec(),
        });

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok((Message::assistant().with_text(""), Usage::default()))
        } else {
            match responses.remove(0) {
                Ok(message) => Ok((message, Usage::default())),
                Err(e) => Err(anyhow!(e)),
            }
        }
    }
}
