use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of a single tool invocation. These travel inside messages and are
/// reported back to the model rather than aborting the round.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Failures of an orchestration round
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Completion request failed: {0}")]
    Completion(String),

    #[error("Failed to render system prompt: {0}")]
    Prompt(String),
}

impl ChatError {
    pub(crate) fn completion(err: anyhow::Error) -> Self {
        ChatError::Completion(format!("{:#}", err))
    }
}
