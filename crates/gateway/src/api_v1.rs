//! HTTP API v1.
//!
//! Endpoints:
//!
//! - `POST /v1/query`          Run one query in the caller's session
//! - `GET  /v1/session`        Debug view of the caller's session
//! - `POST /v1/session/clear`  Clear the caller's conversation log
//! - `GET  /v1/agents`         Agent roster with display names and icons
//! - `GET  /v1/events`         SSE feed of session events
//!
//! The session is chosen by the `X-Session-Id` header, or by the
//! `session_id` query parameter on `/v1/events` since `EventSource` cannot
//! set headers. Both default to `"default"`.

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, post},
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;

use storewise_agent::SessionError;
use storewise_core::agent::{AgentDisplay, AgentRole};
use storewise_core::error::{Error, ToolError};
use storewise_core::session::SessionDebugView;

use crate::SharedState;

pub const SESSION_HEADER: &str = "x-session-id";
pub const DEFAULT_SESSION: &str = "default";

pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/query", post(query_handler))
        .route("/session", get(session_handler))
        .route("/session/clear", post(clear_handler))
        .route("/agents", get(agents_handler))
        .route("/events", get(events_handler))
        .with_state(state)
}

fn session_id(headers: &HeaderMap) -> &str {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION)
}

// ── Query ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    pub agent_label: String,
    pub agent_icon: String,
    pub agent: Option<AgentRole>,
    pub summarization: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: String) -> ApiError {
    (status, Json(ErrorResponse { error }))
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        e if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        Error::Config { .. } | Error::Tool(ToolError::NotConfigured(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn query_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let session = state.session(session_id(&headers)).await;

    match session.submit(&body.query).await {
        Ok(reply) => Ok(Json(QueryResponse {
            response: reply.final_text,
            agent_label: reply.agent_label,
            agent_icon: AgentDisplay::for_agent(reply.agent).icon.to_string(),
            agent: reply.agent,
            summarization: reply.summarization,
        })),
        Err(e @ SessionError::Busy) => Err(api_error(StatusCode::CONFLICT, e.to_string())),
        Err(SessionError::Query(e)) => Err(api_error(status_for(&e), e.user_message())),
    }
}

// ── Session ───────────────────────────────────────────────────────────────

async fn session_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Json<SessionDebugView> {
    let session = state.session(session_id(&headers)).await;
    Json(session.debug_view().await)
}

async fn clear_handler(State(state): State<SharedState>, headers: HeaderMap) -> StatusCode {
    let id = session_id(&headers);
    state.session(id).await.clear().await;
    info!(session_id = id, "Session cleared");
    StatusCode::NO_CONTENT
}

// ── Agents ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct AgentInfo {
    pub role: AgentRole,
    pub name: String,
    pub icon: String,
    pub summary: String,
}

async fn agents_handler() -> Json<Vec<AgentInfo>> {
    let agents = AgentRole::ALL
        .into_iter()
        .map(|role| {
            let display = role.display();
            AgentInfo {
                role,
                name: display.name.to_string(),
                icon: display.icon.to_string(),
                summary: role.summary().to_string(),
            }
        })
        .collect();
    Json(agents)
}

// ── Events ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EventsParams {
    pub session_id: Option<String>,
}

async fn events_handler(
    State(state): State<SharedState>,
    Query(params): Query<EventsParams>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let session_id = params
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());
    let rx = state.events().subscribe();

    // Lagged receivers skip what they missed.
    let stream = BroadcastStream::new(rx)
        .filter_map(|r| r.ok())
        .filter(move |event| event.session_id() == session_id)
        .map(|event| {
            let data = serde_json::to_string(event.as_ref()).unwrap_or_default();
            Ok(SseEvent::default().event(event.kind()).data(data))
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
