use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One decoded `data:` payload of a streaming completion.
///
/// Kept as raw JSON and read leniently: only `choices[0]` is looked at, and
/// metadata of an unexpected type never hides the text of a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk(Value);

impl StreamChunk {
    /// Wrap a decoded payload; anything but a JSON object is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        value.is_object().then_some(Self(value))
    }

    fn first_choice(&self) -> Option<&Value> {
        self.0.get("choices")?.as_array()?.first()
    }

    /// Text carried by the first choice, if any and non-empty.
    pub fn delta_text(&self) -> Option<&str> {
        self.first_choice()?
            .get("delta")?
            .get("content")?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.first_choice()?.get("finish_reason")?.as_str()
    }

    /// Top-level field as sent, e.g. `id` or `model`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }
}

/// Message of a non-streaming choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Non-streaming completion body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<Delta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatCompletion {
    /// Full text of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}
