//! Encrypted session transport.
//!
//! The session is the only collaborator that talks to the network. It takes a
//! fully described request (method, URL, headers, JSON body, streaming flag)
//! and hands back a [`SessionResponse`] whose body can be read as lines, as
//! raw bytes or as JSON. Request encapsulation and transport encryption are the
//! implementation's business; callers only see plain HTTP semantics.
//!
//! A single session is built at startup and shared behind an `Arc`, so tests
//! can swap in a fake transport.

mod http;
mod lines;

pub use http::HttpSession;
pub use lines::split_lines;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Raw response body chunks as they arrive from the transport.
pub type ByteStream = BoxStream<'static, Result<Bytes, SessionError>>;

/// Response body split into lines, terminators removed.
pub type LineStream = BoxStream<'static, Result<String, SessionError>>;

/// Errors surfaced by a session and by reading its responses.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a 4xx/5xx status.
    #[error("{status} for url: {url}")]
    Status { status: StatusCode, url: String },

    /// The body could not be read to completion.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The body was read but is not the JSON we expected.
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A request handed to the session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub json: Option<Value>,
    /// When false the session reads the whole body before returning.
    pub stream: bool,
}

impl SessionRequest {
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            json: None,
            stream: false,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Response returned by a session.
pub struct SessionResponse {
    status: StatusCode,
    url: String,
    body: ByteStream,
}

impl std::fmt::Debug for SessionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResponse")
            .field("status", &self.status)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl SessionResponse {
    pub fn new(status: StatusCode, url: impl Into<String>, body: ByteStream) -> Self {
        Self {
            status,
            url: url.into(),
            body,
        }
    }

    /// Response whose body is already in memory.
    pub fn from_bytes(status: StatusCode, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self::new(status, url, stream::once(async move { Ok(body) }).boxed())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fail on 4xx/5xx statuses, pass the response through otherwise.
    pub fn error_for_status(self) -> Result<Self, SessionError> {
        if self.status.is_client_error() || self.status.is_server_error() {
            return Err(SessionError::Status {
                status: self.status,
                url: self.url,
            });
        }
        Ok(self)
    }

    /// Lazily split the body into lines.
    pub fn lines(self) -> LineStream {
        split_lines(self.body)
    }

    /// Read the whole body.
    pub async fn bytes(mut self) -> Result<Bytes, SessionError> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(Bytes::from(buf))
    }

    /// Read the whole body and parse it as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, SessionError> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Transport that carries chat requests to the inference service.
#[async_trait]
pub trait EncryptedSession: Send + Sync {
    async fn send(&self, request: SessionRequest) -> Result<SessionResponse, SessionError>;

    /// POST a JSON body with the given headers.
    async fn post(
        &self,
        url: &str,
        headers: Vec<(String, String)>,
        json: Value,
        stream: bool,
    ) -> Result<SessionResponse, SessionError> {
        let request = SessionRequest {
            method: Method::POST,
            url: url.to_string(),
            headers,
            json: Some(json),
            stream,
        };
        self.send(request).await
    }
}
