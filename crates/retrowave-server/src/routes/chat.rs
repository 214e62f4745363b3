use crate::sessions::ChatState;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use bytes::Bytes;
use futures::{stream::StreamExt, Stream};
use retrowave::errors::ChatError;
use retrowave::models::message::Message;
use retrowave::orchestrator::{Reply, ReplyEvent};
use serde::{Deserialize, Serialize};
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse<ChatState> {
    fn data(state: ChatState) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(state),
            error: None,
        })
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(message.to_string()),
    };
    (status, Json(body)).into_response()
}

// Plain text body fed by the reply task
pub struct TextStreamResponse {
    rx: ReceiverStream<String>,
}

impl TextStreamResponse {
    fn new(rx: ReceiverStream<String>) -> Self {
        Self { rx }
    }
}

impl Stream for TextStreamResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for TextStreamResponse {
    fn into_response(self) -> Response {
        let body = axum::body::Body::from_stream(self);
        (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            body,
        )
            .into_response()
    }
}

// The reply task records the exchange before dropping the sender, so the body
// only ends once the session is up to date. Returns once the round has settled.
async fn stream_reply(
    state: AppState,
    session_id: String,
    message: String,
    history: Vec<Message>,
) -> Result<TextStreamResponse, ChatError> {
    let (tx, rx) = mpsc::channel(100);
    let (settled_tx, settled_rx) = oneshot::channel();

    tokio::spawn(async move {
        let mut stream = state.orchestrator.reply_stream(message.clone(), history);
        let mut tool_calls = Vec::new();
        let mut content = None;

        while let Some(event) = stream.next().await {
            match event {
                Ok(ReplyEvent::ToolRequests(requests)) => {
                    tracing::debug!(count = requests.len(), "running tools for streamed reply");
                }
                Ok(ReplyEvent::ToolResponses(responses)) => tool_calls = responses,
                Ok(ReplyEvent::Content(text)) => {
                    if let Err(e) = tx.send(text.clone()).await {
                        tracing::debug!("Client went away before the reply was sent: {}", e);
                    }
                    content = Some(text);
                }
                Err(e) => {
                    let _ = settled_tx.send(Err(e));
                    return;
                }
            }
        }
        drop(stream);

        let Some(content) = content else {
            let _ = settled_tx.send(Err(ChatError::Completion(
                "reply ended without content".to_string(),
            )));
            return;
        };

        let reply = Reply {
            content,
            tool_calls,
        };
        state.sessions.record(&session_id, &message, &reply).await;
        let _ = settled_tx.send(Ok(()));
        drop(tx);
    });

    match settled_rx.await {
        Ok(Ok(())) => Ok(TextStreamResponse::new(ReceiverStream::new(rx))),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ChatError::Completion(
            "reply task ended unexpectedly".to_string(),
        )),
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Response {
    if request.message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Message is required");
    }

    let history = state.sessions.history(&session_id).await;

    if request.stream {
        return match stream_reply(state, session_id.clone(), request.message, history).await {
            Ok(body) => body.into_response(),
            Err(e) => {
                tracing::error!(session_id = %session_id, "Failed to process message: {}", e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process message")
            }
        };
    }

    match state.orchestrator.reply(&request.message, &history).await {
        Ok(reply) => {
            let chat = state
                .sessions
                .record(&session_id, &request.message, &reply)
                .await;
            ApiResponse::data(chat).into_response()
        }
        Err(e) => {
            tracing::error!(session_id = %session_id, "Failed to process message: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process message")
        }
    }
}

async fn messages_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ApiResponse<ChatState>> {
    ApiResponse::data(state.sessions.snapshot(&session_id).await)
}

async fn clear_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<ApiResponse<ChatState>> {
    ApiResponse::data(state.sessions.clear(&session_id).await)
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat/:session_id/chat", post(chat_handler))
        .route("/api/chat/:session_id/messages", get(messages_handler))
        .route("/api/chat/:session_id/clear", delete(clear_handler))
        .with_state(state)
}
