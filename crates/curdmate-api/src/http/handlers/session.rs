//! Chat session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions               - Open a session (optional `{"token": "..."}`)
//! - GET    /api/v1/sessions/{id}          - Current mode, progress and hint
//! - DELETE /api/v1/sessions/{id}          - Close a session
//! - GET    /api/v1/sessions/{id}/messages - Full transcript
//! - POST   /api/v1/sessions/{id}/messages - Submit one message and get the reply
//! - POST   /api/v1/sessions/{id}/cancel   - Abandon the active operation

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use curdmate_types::conversation::{Mode, Progress, Trigger};
use curdmate_types::transcript::TranscriptMessage;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::{AppState, Session};

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Bearer token for the record API, replacing the configured one.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
    /// `quick_action` for button presses; defaults to `free_text`.
    #[serde(default)]
    pub trigger: Trigger,
}

/// Snapshot of a session's state.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub mode: Mode,
    pub step: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    pub status_line: String,
    pub input_hint: &'static str,
    pub expired: bool,
    pub message_count: usize,
}

impl SessionView {
    fn of(session: &Session) -> Self {
        Self {
            id: session.id(),
            mode: session.state().mode,
            step: session.state().step,
            progress: session.progress(),
            status_line: session.status_line(),
            input_hint: session.input_hint(),
            expired: session.is_expired(),
            message_count: session.transcript().len(),
        }
    }
}

/// The reply to one turn plus the session state after it.
#[derive(Debug, Serialize)]
pub struct TurnView {
    pub reply: TranscriptMessage,
    pub session: SessionView,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

fn find_session(state: &AppState, id: &str) -> Result<(Uuid, Arc<Mutex<Session>>), AppError> {
    let uuid = parse_uuid(id)?;
    let handle = state
        .session(&uuid)
        .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
    Ok((uuid, handle))
}

fn session_link(id: &Uuid) -> String {
    format!("/api/v1/sessions/{id}")
}

/// POST /api/v1/sessions - Open a new chat session.
///
/// The body may be empty.
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<TurnView>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let request: CreateSessionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?
    };

    let token = request
        .token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(SecretString::from);

    let (id, handle) = state.open_session(token);
    let session = handle.lock().await;
    let reply = session
        .transcript()
        .last()
        .cloned()
        .ok_or_else(|| AppError::Internal("new session has no welcome message".to_string()))?;
    let view = TurnView {
        reply,
        session: SessionView::of(&session),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    let link = session_link(&id);
    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(view, request_id, elapsed)
                .with_link("self", &link)
                .with_link("messages", &format!("{link}/messages")),
        ),
    ))
}

/// GET /api/v1/sessions/{id} - Get a session's current state.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (uuid, handle) = find_session(&state, &id)?;
    let view = SessionView::of(&*handle.lock().await);

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(
        ApiResponse::success(view, request_id, elapsed).with_link("self", &session_link(&uuid)),
    ))
}

/// GET /api/v1/sessions/{id}/messages - Get the full transcript.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<TranscriptMessage>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (_, handle) = find_session(&state, &id)?;
    let messages = handle.lock().await.transcript().messages().to_vec();

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(messages, request_id, elapsed)))
}

/// POST /api/v1/sessions/{id}/messages - Run one conversation turn.
///
/// Turns on the same session are serialized by the session lock.
#[tracing::instrument(name = "http.post_message", skip(state, request), fields(session.id = %id))]
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<ApiResponse<TurnView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (uuid, handle) = find_session(&state, &id)?;
    let mut session = handle.lock().await;
    let outcome = session.submit(&request.text, request.trigger).await.cloned();
    if session.is_expired() && state.close_session(&uuid) {
        tracing::info!(session.id = %uuid, "expired session evicted");
    }
    let view = TurnView {
        reply: outcome?,
        session: SessionView::of(&session),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(view, request_id, elapsed)))
}

/// POST /api/v1/sessions/{id}/cancel - Abandon the active operation.
pub async fn cancel_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TurnView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (_, handle) = find_session(&state, &id)?;
    let mut session = handle.lock().await;
    let reply = session.cancel().clone();
    let view = TurnView {
        reply,
        session: SessionView::of(&session),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(view, request_id, elapsed)))
}

/// DELETE /api/v1/sessions/{id} - Close a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let uuid = parse_uuid(&id)?;
    if !state.close_session(&uuid) {
        return Err(AppError::SessionNotFound(id));
    }
    tracing::debug!(session.id = %uuid, "session closed");

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": true, "id": uuid }),
        request_id,
        elapsed,
    )))
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;
    use crate::http::router::build_router;

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// API server whose record backend is unreachable.
    async fn spawn_api() -> String {
        spawn(build_router(AppState::for_tests("http://127.0.0.1:9/api"))).await
    }

    async fn open(client: &reqwest::Client, base: &str) -> String {
        let resp = client.post(format!("{base}/api/v1/sessions")).send().await.unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["data"]["session"]["id"].as_str().unwrap().to_string()
    }

    async fn say(client: &reqwest::Client, base: &str, id: &str, text: &str, trigger: &str) -> reqwest::Response {
        client
            .post(format!("{base}/api/v1/sessions/{id}/messages"))
            .json(&json!({ "text": text, "trigger": trigger }))
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn_api().await;
        let body: Value = reqwest::get(format!("{base}/health")).await.unwrap().json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["nlp_configured"], false);
    }

    #[tokio::test]
    async fn test_create_session_returns_welcome() {
        let base = spawn_api().await;
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{base}/api/v1/sessions"))
            .json(&json!({ "token": "abc" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["reply"]["sender"], "bot");
        assert_eq!(body["data"]["reply"]["action"], "help");
        assert_eq!(body["data"]["session"]["mode"], "idle");
        assert_eq!(body["data"]["session"]["message_count"], 1);
        assert!(body["_links"]["messages"].as_str().unwrap().ends_with("/messages"));
    }

    #[tokio::test]
    async fn test_create_session_rejects_bad_body() {
        let base = spawn_api().await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/api/v1/sessions"))
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn test_guided_flow_over_http() {
        let base = spawn_api().await;
        let client = reqwest::Client::new();
        let id = open(&client, &base).await;

        let resp = say(&client, &base, &id, "Create Contact", "quick_action").await;
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["reply"]["action"], "create");
        assert_eq!(body["data"]["session"]["mode"], "creating");
        assert_eq!(body["data"]["session"]["progress"]["step_label"], "step 1/5");

        // Blank input inside a flow is answered, not refused
        let body: Value = say(&client, &base, &id, "", "free_text").await.json().await.unwrap();
        assert!(body["data"]["reply"]["text"].as_str().unwrap().contains("required"));
        assert_eq!(body["data"]["session"]["mode"], "creating");

        let body: Value = say(&client, &base, &id, "John Doe", "free_text").await.json().await.unwrap();
        assert_eq!(body["data"]["session"]["step"], 1);

        let resp = client
            .post(format!("{base}/api/v1/sessions/{id}/cancel"))
            .send()
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["reply"]["action"], "cancel");
        assert_eq!(body["data"]["session"]["mode"], "idle");
        assert!(body["data"]["session"].get("progress").is_none());

        let body: Value = client
            .get(format!("{base}/api/v1/sessions/{id}/messages"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        // welcome + 3 user/bot pairs + cancel
        assert_eq!(body["data"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_blank_message_when_idle_is_rejected() {
        let base = spawn_api().await;
        let client = reqwest::Client::new();
        let id = open(&client, &base).await;

        let resp = say(&client, &base, &id, "   ", "free_text").await;
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");

        let body: Value = client
            .get(format!("{base}/api/v1/sessions/{id}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["data"]["message_count"], 1);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let base = spawn_api().await;
        let client = reqwest::Client::new();
        let id = open(&client, &base).await;

        let resp = client.delete(format!("{base}/api/v1/sessions/{id}")).send().await.unwrap();
        assert_eq!(resp.status(), 200);

        let resp = client.get(format!("{base}/api/v1/sessions/{id}")).send().await.unwrap();
        assert_eq!(resp.status(), 404);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "SESSION_NOT_FOUND");

        let resp = client.delete(format!("{base}/api/v1/sessions/{id}")).send().await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_invalid_session_id() {
        let base = spawn_api().await;
        let resp = reqwest::get(format!("{base}/api/v1/sessions/not-a-uuid")).await.unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn test_unauthorized_backend_expires_session() {
        let backend = spawn(Router::new().fallback(|| async { StatusCode::UNAUTHORIZED })).await;
        let base = spawn(build_router(AppState::for_tests(&format!("{backend}/api")))).await;
        let client = reqwest::Client::new();
        let id = open(&client, &base).await;

        say(&client, &base, &id, "Search Contacts", "quick_action").await;
        let body: Value = say(&client, &base, &id, "all", "free_text").await.json().await.unwrap();
        assert_eq!(body["data"]["reply"]["action"], "error");
        assert_eq!(body["data"]["session"]["expired"], true);
        assert_eq!(body["data"]["session"]["mode"], "idle");

        let resp = say(&client, &base, &id, "all", "free_text").await;
        assert_eq!(resp.status(), 404);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["errors"][0]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_expired_session_is_evicted() {
        let backend = spawn(Router::new().fallback(|| async { StatusCode::UNAUTHORIZED })).await;
        let state = AppState::for_tests(&format!("{backend}/api"));
        let base = spawn(build_router(state.clone())).await;
        let client = reqwest::Client::new();
        let id = open(&client, &base).await;
        assert_eq!(state.sessions.len(), 1);

        say(&client, &base, &id, "Search Contacts", "quick_action").await;
        assert_eq!(state.sessions.len(), 1);
        say(&client, &base, &id, "all", "free_text").await;
        assert!(state.sessions.is_empty());

        let resp = client
            .get(format!("{base}/api/v1/sessions/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    }
}
