//! HTTP/WebSocket Handlers

use axum::{
    extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::Response,
    Json,
};
use futures::{Sink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use agent_core::{
    AgentError, Coordinates, RunConfig, SessionKey, StreamingMode,
};
use location_agent::{ask_agent, build_message, NO_RESPONSE};

use crate::state::AppState;

const DEFAULT_USER_ID: &str = "web_user";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub provider: String,
    pub provider_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl ChatRequest {
    /// Coordinates, when both halves are present
    fn location(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn empty_message() -> ErrorResponse {
    ErrorResponse {
        error: "Message must not be empty".into(),
        code: "EMPTY_MESSAGE".into(),
    }
}

fn error_frame(error: &ErrorResponse) -> serde_json::Value {
    serde_json::json!({"type": "error", "error": error.error, "code": error.code})
}

fn agent_error_frame(err: &AgentError) -> serde_json::Value {
    let (_, Json(body)) = api_error(err);
    error_frame(&body)
}

fn api_error(err: &AgentError) -> ApiError {
    let (status, code) = match err {
        AgentError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
        AgentError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
        AgentError::ProviderUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_UNAVAILABLE"),
        AgentError::Config(_) | AgentError::Session(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "AGENT_ERROR")
        }
        _ => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
    };

    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code: code.into(),
        }),
    )
}

/// Open the session on first use; later requests with the same id reuse it
async fn ensure_session(state: &AppState, user_id: &str, session_id: &str) -> agent_core::Result<()> {
    let sessions = state.runner.sessions();
    let key = SessionKey::new(state.runner.app_name(), user_id, session_id);

    if sessions.get_session(&key).await?.is_some() {
        return Ok(());
    }

    match sessions.create_session(&key).await {
        Ok(_) => Ok(()),
        Err(e @ AgentError::Session(_)) => {
            // Lost a race with a concurrent request for the same id
            if sessions.get_session(&key).await?.is_some() {
                Ok(())
            } else {
                Err(e)
            }
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider = state.runner.agent().provider();
    let provider_connected = provider.health_check(state.model()).await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.model().to_string(),
        provider: provider.info().name,
        provider_connected,
    })
}

/// Main chat endpoint (non-streaming)
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(empty_message())));
    }

    let user_id = payload.user_id.clone().unwrap_or_else(|| DEFAULT_USER_ID.into());
    let session_id = payload
        .session_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    ensure_session(&state, &user_id, &session_id)
        .await
        .map_err(|e| api_error(&e))?;

    let response = ask_agent(
        &state.runner,
        &user_id,
        &session_id,
        &payload.message,
        payload.location(),
    )
    .await
    .map_err(|e| {
        tracing::error!("Agent error: {}", e);
        api_error(&e)
    })?;

    Ok(Json(ChatResponse {
        message: response,
        session_id,
    }))
}

/// WebSocket streaming chat
pub async fn chat_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

async fn send_json<S>(sender: &mut S, value: &serde_json::Value) -> bool
where
    S: Sink<Message> + Unpin,
{
    sender.send(Message::Text(value.to_string().into())).await.is_ok()
}

async fn handle_stream(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    // One session per socket unless the client names one
    let socket_session = uuid::Uuid::new_v4().to_string();

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            _ => continue,
        };

        if !stream_turn(&state, &socket_session, msg.as_str(), &mut sender).await {
            return;
        }
    }
}

/// Answer one WebSocket request: `chunk` frames while the model streams, then
/// one `final` frame, or a single `error` frame.
///
/// Returns `false` once the client is gone.
pub(crate) async fn stream_turn<S>(
    state: &AppState,
    socket_session: &str,
    text: &str,
    sender: &mut S,
) -> bool
where
    S: Sink<Message> + Unpin,
{
    let request: ChatRequest = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            let error = serde_json::json!({"type": "error", "error": e.to_string(), "code": "BAD_REQUEST"});
            return send_json(sender, &error).await;
        }
    };

    if request.message.trim().is_empty() {
        return send_json(sender, &error_frame(&empty_message())).await;
    }

    let user_id = request.user_id.clone().unwrap_or_else(|| DEFAULT_USER_ID.into());
    let session_id = request.session_id.clone().unwrap_or_else(|| socket_session.to_string());

    if let Err(e) = ensure_session(state, &user_id, &session_id).await {
        return send_json(sender, &agent_error_frame(&e)).await;
    }

    let config = RunConfig {
        streaming: StreamingMode::Sse,
        location: request.location(),
    };
    let message = build_message(&request.message, request.location());

    let mut events = match state.runner.run(&user_id, &session_id, message, config).await {
        Ok(events) => events,
        Err(e) => return send_json(sender, &agent_error_frame(&e)).await,
    };

    while let Some(result) = events.next().await {
        let frame = match result {
            Ok(event) if event.partial => serde_json::json!({
                "type": "chunk",
                "content": event.text().unwrap_or_default(),
                "done": false,
            }),
            Ok(event) => serde_json::json!({
                "type": "final",
                "content": event.text().unwrap_or_else(|| NO_RESPONSE.into()),
                "grounding": event.grounding,
                "session_id": session_id,
                "done": true,
            }),
            Err(e) => {
                tracing::error!("Agent error: {}", e);
                agent_error_frame(&e)
            }
        };

        if !send_json(sender, &frame).await {
            return false;
        }
    }

    tracing::debug!(session = %session_id, "Streamed turn finished");
    true
}
