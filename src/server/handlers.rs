//! HTTP request handlers.

use crate::pipe::{render_error, HostReply, Pipe};
use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Header carrying the host's user id, passed to the pipe as `{"id": ...}`.
pub const USER_ID_HEADER: &str = "x-user-id";

/// State shared by the routes.
#[derive(Clone)]
pub struct AppState {
    pub pipe: Arc<Pipe>,
}

/// POST /v1/chat/completions - Forward a completion request through the pipe.
pub async fn chat_completions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let user = headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|id| json!({ "id": id }))
        .unwrap_or(Value::Null);

    let messages = body
        .get("messages")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    debug!(stream = ?body.get("stream"), messages, "chat completion request");

    into_response(state.pipe.pipe(&body, &user).await)
}

fn into_response(reply: HostReply) -> Response {
    match reply {
        HostReply::Lines(lines) => {
            let body = Body::from_stream(lines.map(|line| {
                line.map(|mut line| {
                    line.push('\n');
                    line
                })
            }));
            (
                [(CONTENT_TYPE, "text/event-stream"), (CACHE_CONTROL, "no-cache")],
                body,
            )
                .into_response()
        }
        HostReply::Json(value) => Json(value).into_response(),
        HostReply::Error(err) => {
            let status = err.status().unwrap_or(StatusCode::BAD_GATEWAY);
            (status, render_error(&err)).into_response()
        }
    }
}
