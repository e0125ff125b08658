//! One chat-completion call printed to a writer.
//!
//! Streaming answers are written fragment by fragment and flushed right away;
//! non-streaming answers are written once, followed by a newline.

use crate::chat::ChatCompletion;
use crate::config::ExampleConfig;
use crate::session::EncryptedSession;
use crate::stream::deltas;
use anyhow::{Context, Result};
use futures::StreamExt;
use std::io::Write;
use tracing::{debug, info};

/// Send the configured request through `session` and print the answer.
///
/// A 4xx/5xx status is an error. Malformed stream chunks are skipped.
pub async fn run_chat<W: Write>(
    session: &dyn EncryptedSession,
    config: &ExampleConfig,
    out: &mut W,
) -> Result<()> {
    let request = config.chat_request()?;
    let body = serde_json::to_value(&request).context("Failed to serialize chat request")?;
    let url = config.url();

    info!(target: "plain", "Model: {} @ {}", config.model_id, config.deployment_url);
    debug!(stream = config.stream, "sending chat request to {url}");

    let headers = vec![
        ("Authorization".to_string(), format!("Bearer {}", config.api_key)),
        ("Content-Type".to_string(), "application/json".to_string()),
    ];

    let response = session
        .post(&url, headers, body, config.stream)
        .await
        .context("Request failed")?
        .error_for_status()
        .context("Server rejected the chat request")?;

    if config.stream {
        let mut fragments = deltas(response.lines());
        while let Some(fragment) = fragments.next().await {
            let fragment = fragment.context("Error reading the response stream")?;
            out.write_all(fragment.as_bytes())?;
            out.flush()?;
        }
    } else {
        let completion: ChatCompletion = response
            .json()
            .await
            .context("Error parsing the response")?;
        let content = completion
            .content()
            .context("Response has no choices[0].message.content")?;
        writeln!(out, "{content}")?;
    }

    Ok(())
}
