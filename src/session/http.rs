use super::{EncryptedSession, SessionError, SessionRequest, SessionResponse};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use tracing::{debug, trace};

/// Session backed by a pooled HTTPS client.
///
/// The client keeps its connection pool for the lifetime of the session, so
/// one instance should be shared across calls.
#[derive(Debug, Clone, Default)]
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EncryptedSession for HttpSession {
    async fn send(&self, request: SessionRequest) -> Result<SessionResponse, SessionError> {
        let SessionRequest {
            method,
            url,
            headers,
            json,
            stream,
        } = request;

        debug!(%method, %url, stream, "sending session request");

        let mut builder = self.client.request(method, &url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = json {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SessionError::Transport(Box::new(e)))?;

        let status = response.status();
        trace!(%status, "session response received");

        if stream {
            let body = response
                .bytes_stream()
                .map_err(|e| SessionError::Body(e.to_string()))
                .boxed();
            Ok(SessionResponse::new(status, url, body))
        } else {
            let body = response
                .bytes()
                .await
                .map_err(|e| SessionError::Body(e.to_string()))?;
            Ok(SessionResponse::from_bytes(status, url, body))
        }
    }
}
