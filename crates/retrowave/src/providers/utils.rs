use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use crate::errors::AgentError;
use crate::models::message::{Message, MessageContent, ToolRequest};
use crate::models::tool::{Tool, ToolCall};

lazy_static! {
    static ref VALID_NAME: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Convert internal Message format to OpenAI's API message specification
///
/// Every message keeps its role and a `content` that is either text or null. Tool
/// requests become `tool_calls` on the same message; each tool response becomes its
/// own `tool` message keyed by the id of the request it answers.
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role,
            "content": message.text(),
        });

        let mut output = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(_) => {}
                MessageContent::ToolRequest(request) => {
                    let tool_calls = converted
                        .as_object_mut()
                        .map(|object| object.entry("tool_calls").or_insert(json!([])));

                    if let Some(Value::Array(tool_calls)) = tool_calls {
                        tool_calls.push(json!({
                            "id": request.id,
                            "type": "function",
                            "function": {
                                "name": request.name,
                                "arguments": request.raw_arguments,
                            }
                        }));
                    }
                }
                MessageContent::ToolResponse(response) => {
                    output.push(json!({
                        "role": "tool",
                        "content": response.result_value().to_string(),
                        "tool_call_id": response.id
                    }));
                }
            }
        }

        // A message holding only tool responses is fully represented by the tool messages
        let only_responses = !output.is_empty()
            && converted["content"].is_null()
            && converted.get("tool_calls").is_none();
        if !only_responses {
            output.insert(0, converted);
        }
        messages_spec.extend(output);
    }

    messages_spec
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value) -> Result<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("Completion response contained no message"))?;

    let mut message = Message::assistant();

    if let Some(text) = original.get("content").and_then(|text| text.as_str()) {
        message = message.with_text(text);
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(|calls| calls.as_array()) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default().to_string();
            let function_name = tool_call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default()
                .to_string();

            let request = if !is_valid_function_name(&function_name) {
                let error = AgentError::ToolNotFound(format!(
                    "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                    function_name
                ));
                ToolRequest::invalid(id, function_name, arguments, error)
            } else if arguments.trim().is_empty() {
                ToolRequest {
                    id,
                    name: function_name.clone(),
                    raw_arguments: arguments,
                    tool_call: Ok(ToolCall::new(function_name, json!({}))),
                }
            } else {
                match serde_json::from_str::<Value>(&arguments) {
                    Ok(params) => ToolRequest {
                        id,
                        name: function_name.clone(),
                        raw_arguments: arguments,
                        tool_call: Ok(ToolCall::new(function_name, params)),
                    },
                    Err(e) => {
                        let error = AgentError::InvalidParameters(format!(
                            "Could not interpret tool use parameters for id {}: {}",
                            id, e
                        ));
                        ToolRequest::invalid(id, function_name, arguments, error)
                    }
                }
            };

            message = message.with_content(MessageContent::ToolRequest(request));
        }
    }

    Ok(message)
}

fn is_valid_function_name(name: &str) -> bool {
    VALID_NAME.is_match(name)
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::ToolResponse;
    use crate::models::role::Role;

    const OPENAI_TOOL_USE_RESPONSE: &str = r#"{
        "choices": [{
            "role": "assistant",
            "message": {
                "content": null,
                "tool_calls": [{
                    "id": "call_spotify",
                    "type": "function",
                    "function": {
                        "name": "web_search",
                        "arguments": "{\"query\": \"spotify Jóga Björk\"}"
                    }
                }]
            }
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 25,
            "total_tokens": 35
        }
    }"#;

    #[test]
    fn test_messages_to_openai_spec() {
        let messages = vec![
            Message::system().with_text("You are a musicologist."),
            Message::user().with_text("Mode: Broadcast"),
        ];
        let spec = messages_to_openai_spec(&messages);

        assert_eq!(spec.len(), 2);
        assert_eq!(spec[0]["role"], "system");
        assert_eq!(spec[0]["content"], "You are a musicologist.");
        assert_eq!(spec[1]["role"], "user");
        assert_eq!(spec[1]["content"], "Mode: Broadcast");
    }

    #[test]
    fn test_message_without_text_has_null_content() {
        let spec = messages_to_openai_spec(&[Message::assistant()]);
        assert_eq!(spec.len(), 1);
        assert!(spec[0]["content"].is_null());
        assert!(spec[0].get("tool_calls").is_none());
    }

    #[test]
    fn test_tool_round_trip_keeps_ids() {
        let messages = vec![
            Message::user().with_text("'Jóga' — Björk"),
            Message::assistant().with_tool_request(
                "call_a",
                ToolCall::new("web_search", json!({"query": "spotify Jóga"})),
            ),
            Message::tool().with_tool_response(ToolResponse {
                id: "call_a".into(),
                name: "web_search".into(),
                arguments: json!({"query": "spotify Jóga"}),
                tool_result: Ok(json!({"results": []})),
            }),
        ];

        let spec = messages_to_openai_spec(&messages);

        assert_eq!(spec.len(), 3);
        assert_eq!(spec[1]["role"], "assistant");
        assert!(spec[1]["content"].is_null());
        assert_eq!(spec[1]["tool_calls"][0]["id"], "call_a");
        assert_eq!(
            spec[1]["tool_calls"][0]["function"]["arguments"],
            r#"{"query":"spotify Jóga"}"#
        );
        assert_eq!(spec[2]["role"], "tool");
        assert_eq!(spec[2]["tool_call_id"], "call_a");
        assert_eq!(spec[2]["content"], r#"{"results":[]}"#);
    }

    #[test]
    fn test_tool_error_is_sent_as_error_object() {
        let message = Message::tool().with_tool_response(ToolResponse {
            id: "call_b".into(),
            name: "get_track_info".into(),
            arguments: json!({}),
            tool_result: Err(AgentError::InvalidParameters("url is required".into())),
        });

        let spec = messages_to_openai_spec(&[message]);
        let content: Value = serde_json::from_str(spec[0]["content"].as_str().unwrap()).unwrap();
        assert_eq!(
            content,
            json!({"error": "Failed to execute get_track_info: Invalid parameters: url is required"})
        );
    }

    #[test]
    fn test_tools_to_openai_spec() -> Result<()> {
        let tool = Tool::new(
            "get_track_info",
            "Look up a Spotify track",
            json!({
                "type": "object",
                "properties": {"url": {"type": "string"}},
                "required": ["url"]
            }),
        );

        let spec = tools_to_openai_spec(&[tool])?;

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["type"], "function");
        assert_eq!(spec[0]["function"]["name"], "get_track_info");
        assert_eq!(spec[0]["function"]["parameters"]["required"][0], "url");
        Ok(())
    }

    #[test]
    fn test_tools_to_openai_spec_duplicate() {
        let tool = Tool::new("web_search", "Search", json!({"type": "object"}));
        let result = tools_to_openai_spec(&[tool.clone(), tool]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Duplicate tool name"));
    }

    #[test]
    fn test_garbled_tool_call_is_echoed_unchanged() {
        let request = ToolRequest::invalid(
            "call_x",
            "web search",
            "{not json",
            AgentError::ToolNotFound("web search".into()),
        );
        let message = Message::assistant().with_content(MessageContent::ToolRequest(request));

        let spec = messages_to_openai_spec(&[message]);
        assert_eq!(spec[0]["tool_calls"][0]["id"], "call_x");
        assert_eq!(spec[0]["tool_calls"][0]["function"]["name"], "web search");
        assert_eq!(spec[0]["tool_calls"][0]["function"]["arguments"], "{not json");
    }

    #[test]
    fn test_is_valid_function_name() {
        assert!(is_valid_function_name("get-track-info"));
        assert!(is_valid_function_name("get_track_info"));
        assert!(!is_valid_function_name("get track"));
        assert!(!is_valid_function_name(""));
    }

    #[test]
    fn test_openai_response_to_message_text() -> Result<()> {
        let response = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "[]"}
            }]
        });

        let message = openai_response_to_message(&response)?;
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, vec![MessageContent::text("[]")]);
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_no_choices() {
        let response = json!({"choices": []});
        assert!(openai_response_to_message(&response).is_err());
    }

    #[test]
    fn test_openai_response_to_message_valid_toolrequest() -> Result<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        let message = openai_response_to_message(&response)?;

        assert_eq!(message.content.len(), 1);
        let request = message.tool_requests().next().unwrap();
        assert_eq!(request.id, "call_spotify");
        let tool_call = request.tool_call.as_ref().unwrap();
        assert_eq!(tool_call.name, "web_search");
        assert_eq!(tool_call.arguments, json!({"query": "spotify Jóga Björk"}));
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_empty_arguments() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"] = json!("");

        let message = openai_response_to_message(&response)?;
        let request = message.tool_requests().next().unwrap();
        assert_eq!(request.tool_call.as_ref().unwrap().arguments, json!({}));
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_invalid_func_name() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["name"] =
            json!("web search");

        let message = openai_response_to_message(&response)?;
        let request = message.tool_requests().next().unwrap();
        assert_eq!(request.name, "web search");
        match &request.tool_call {
            Err(AgentError::ToolNotFound(msg)) => {
                assert!(msg.starts_with("The provided function name"));
            }
            _ => panic!("Expected ToolNotFound error"),
        }
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_json_decode_error() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"] =
            json!("invalid json {");

        let message = openai_response_to_message(&response)?;
        let request = message.tool_requests().next().unwrap();
        assert_eq!(request.id, "call_spotify");
        assert_eq!(request.raw_arguments, "invalid json {");
        match &request.tool_call {
            Err(AgentError::InvalidParameters(msg)) => {
                assert!(msg.starts_with("Could not interpret tool use parameters"));
            }
            _ => panic!("Expected InvalidParameters error"),
        }
        Ok(())
    }

    #[test]
    fn test_check_openai_context_length_error() {
        let error = json!({
            "code": "context_length_exceeded",
            "message": "This message is too long"
        });

        let result = check_openai_context_length_error(&error);
        assert_eq!(
            result.unwrap().to_string(),
            "Context length exceeded. Message: This message is too long"
        );

        let error = json!({
            "code": "other_error",
            "message": "Some other error"
        });
        assert!(check_openai_context_length_error(&error).is_none());
    }
}
