//! Pipe adapter for chat UI hosts.
//!
//! A [`Pipe`] forwards a host's chat-completion body through the encrypted
//! session using the model and credentials from its [`Valves`]. The host always
//! gets a value back: a line stream, a parsed JSON mapping, or an error that
//! renders as `Error: ...`.

use crate::chat::completions_url;
use crate::config::Valves;
use crate::session::{EncryptedSession, LineStream, SessionError};
use crate::stream::fold_transcript;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a pipe call produced no completion.
#[derive(Debug, Error)]
pub enum PipeError {
    /// The request could not be delivered.
    #[error("request to {url} failed: {source}")]
    Send {
        url: String,
        #[source]
        source: SessionError,
    },

    /// The upstream answered with an error status.
    #[error("{0}")]
    Rejected(#[source] SessionError),

    /// The upstream body could not be decoded.
    #[error("invalid completion body: {0}")]
    Decode(#[source] SessionError),
}

impl PipeError {
    /// Upstream status, when the upstream answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected(e) => e.status(),
            _ => None,
        }
    }
}

/// Successful outcome of a pipe call.
pub enum PipeResponse {
    /// Raw response lines for a streaming caller.
    Lines(LineStream),
    /// Parsed body for a non-streaming caller.
    Json(Value),
}

impl fmt::Debug for PipeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lines(_) => f.write_str("Lines(..)"),
            Self::Json(v) => f.debug_tuple("Json").field(v).finish(),
        }
    }
}

/// Value handed back to the host; never a failure.
pub enum HostReply {
    Lines(LineStream),
    Json(Value),
    Error(PipeError),
}

impl HostReply {
    /// Text of an error reply, `None` for successful replies.
    pub fn error_text(&self) -> Option<String> {
        match self {
            Self::Error(e) => Some(render_error(e)),
            _ => None,
        }
    }
}

impl fmt::Debug for HostReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lines(_) => f.write_str("Lines(..)"),
            Self::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Self::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

impl From<Result<PipeResponse, PipeError>> for HostReply {
    fn from(result: Result<PipeResponse, PipeError>) -> Self {
        match result {
            Ok(PipeResponse::Lines(lines)) => Self::Lines(lines),
            Ok(PipeResponse::Json(value)) => Self::Json(value),
            Err(err) => Self::Error(err),
        }
    }
}

/// How errors are shown to the host's users.
pub fn render_error(err: &PipeError) -> String {
    format!("Error: {err}")
}

/// Chat UI pipe over a shared encrypted session.
pub struct Pipe {
    valves: RwLock<Valves>,
    session: Arc<dyn EncryptedSession>,
}

impl fmt::Debug for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipe")
            .field("valves", &self.valves())
            .finish_non_exhaustive()
    }
}

impl Pipe {
    /// Pipe with empty valves.
    pub fn new(session: Arc<dyn EncryptedSession>) -> Self {
        Self::with_valves(session, Valves::default())
    }

    pub fn with_valves(session: Arc<dyn EncryptedSession>, valves: Valves) -> Self {
        Self {
            valves: RwLock::new(valves),
            session,
        }
    }

    /// Snapshot of the current valves.
    pub fn valves(&self) -> Valves {
        self.valves
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the valves; later calls use the new values.
    pub fn set_valves(&self, valves: Valves) {
        *self.valves.write().unwrap_or_else(PoisonError::into_inner) = valves;
    }

    /// Forward `body` and fold any failure into the reply.
    pub async fn pipe(&self, body: &Map<String, Value>, user: &Value) -> HostReply {
        let reply: HostReply = self.try_pipe(body, user).await.into();
        if let HostReply::Error(err) = &reply {
            warn!("pipe call failed: {err}");
        }
        reply
    }

    /// Forward `body` and return the typed outcome.
    ///
    /// The outbound payload always asks for streaming; the shape of the reply
    /// follows the caller's own `stream` flag.
    pub async fn try_pipe(
        &self,
        body: &Map<String, Value>,
        user: &Value,
    ) -> Result<PipeResponse, PipeError> {
        debug!(user = !user.is_null(), "pipe:{}", module_path!());

        let valves = self.valves();
        let headers = vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", valves.LORICA_API_KEY),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        let payload = outbound_payload(body, &valves.MODEL_ID);
        let url = completions_url(&valves.LORICA_API_BASE_URL);

        let response = self
            .session
            .post(&url, headers, Value::Object(payload), true)
            .await
            .map_err(|source| PipeError::Send {
                url: url.clone(),
                source,
            })?
            .error_for_status()
            .map_err(PipeError::Rejected)?;

        if wants_stream(body) {
            return Ok(PipeResponse::Lines(response.lines()));
        }

        let bytes = response.bytes().await.map_err(PipeError::Decode)?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => Ok(PipeResponse::Json(value)),
            Err(err) => {
                let text = String::from_utf8_lossy(&bytes);
                fold_transcript(&text)
                    .map(PipeResponse::Json)
                    .ok_or_else(|| PipeError::Decode(SessionError::Json(err)))
            }
        }
    }
}

/// Caller body with the configured model and streaming forced on.
fn outbound_payload(body: &Map<String, Value>, model_id: &str) -> Map<String, Value> {
    let mut payload = body.clone();
    payload.insert("model".to_string(), Value::String(model_id.to_string()));
    payload.insert("stream".to_string(), Value::Bool(true));
    payload
}

/// Whether the caller asked for a stream.
///
/// Hosts send loosely typed bodies, so any truthy value counts: `null`,
/// `false`, zero, and empty strings, arrays and objects do not.
fn wants_stream(body: &Map<String, Value>) -> bool {
    match body.get("stream") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}
