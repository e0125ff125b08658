//! Decoding of server-sent-event completion streams.
//!
//! Only `data: ` lines matter. `[DONE]` ends the stream and any payload that
//! fails to parse is dropped without interrupting the rest.

use crate::chat::StreamChunk;
use crate::session::{LineStream, SessionError};
use chrono::Utc;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::trace;

/// Prefix of SSE lines that carry a payload.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that terminates a completion stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Classification of one response line.
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// A parsed completion chunk.
    Chunk(StreamChunk),
    /// The `[DONE]` sentinel.
    Done,
    /// Blank, non-data, or malformed line.
    Skip,
}

/// Classify a single line of a streaming body.
pub fn parse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return SseLine::Skip;
    };
    let data = data.trim();
    if data == DONE_SENTINEL {
        return SseLine::Done;
    }
    match serde_json::from_str::<Value>(data) {
        Ok(value) => StreamChunk::from_value(value).map_or(SseLine::Skip, SseLine::Chunk),
        Err(err) => {
            trace!("skipping malformed chunk: {err}");
            SseLine::Skip
        }
    }
}

/// Turn a line stream into the text fragments it carries.
///
/// Stops at the sentinel; lines after it are never polled. Transport errors
/// are forwarded and end the stream.
pub fn deltas(lines: LineStream) -> BoxStream<'static, Result<String, SessionError>> {
    stream::unfold(Some(lines), |state| async move {
        let mut lines = state?;
        while let Some(line) = lines.next().await {
            let line = match line {
                Ok(line) => line,
                Err(err) => return Some((Err(err), None)),
            };
            match parse_line(&line) {
                SseLine::Done => return None,
                SseLine::Skip => continue,
                SseLine::Chunk(chunk) => {
                    if let Some(text) = chunk.delta_text() {
                        return Some((Ok(text.to_string()), Some(lines)));
                    }
                }
            }
        }
        None
    })
    .boxed()
}

/// Fold a complete SSE transcript into a single `chat.completion` object.
///
/// Returns `None` when the text holds no parsable chunk at all.
pub fn fold_transcript(body: &str) -> Option<Value> {
    let mut content = String::new();
    let mut first: Option<StreamChunk> = None;
    let mut finish_reason: Option<String> = None;

    for line in body.lines() {
        match parse_line(line) {
            SseLine::Done => break,
            SseLine::Skip => {}
            SseLine::Chunk(chunk) => {
                if let Some(text) = chunk.delta_text() {
                    content.push_str(text);
                }
                if let Some(reason) = chunk.finish_reason() {
                    finish_reason = Some(reason.to_string());
                }
                if first.is_none() {
                    first = Some(chunk);
                }
            }
        }
    }

    let first = first?;
    let created = first
        .field("created")
        .filter(|v| v.is_number())
        .cloned()
        .unwrap_or_else(|| Utc::now().timestamp().into());
    Some(json!({
        "id": first.field("id"),
        "object": "chat.completion",
        "created": created,
        "model": first.field("model"),
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": finish_reason,
        }],
    }))
}
