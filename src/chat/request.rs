use super::ChatMessage;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Outbound chat-completion request body.
///
/// Built fresh for every call and dropped once serialized.
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[builder(default)]
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_request_body() {
        let request = ChatRequest::builder()
            .model("cortecs/Llama-3.3-70B-Instruct-FP8-Dynamic")
            .messages(vec![
                ChatMessage::system("You are a helpful AI assistant."),
                ChatMessage::user("How many rs in strawberry?"),
            ])
            .temperature(0.7)
            .max_tokens(1024u32)
            .stream(true)
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "cortecs/Llama-3.3-70B-Instruct-FP8-Dynamic",
                "messages": [
                    {"role": "system", "content": "You are a helpful AI assistant."},
                    {"role": "user", "content": "How many rs in strawberry?"}
                ],
                "temperature": 0.7,
                "max_tokens": 1024,
                "stream": true
            })
        );
    }

    #[test]
    fn test_optional_parameters_are_omitted() {
        let request = ChatRequest::builder()
            .model("m")
            .messages(vec![ChatMessage::user("hi")])
            .build()
            .unwrap();

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("temperature").is_none());
        assert!(value.get("max_tokens").is_none());
        assert_eq!(value["stream"], false);
    }

    #[test]
    fn test_model_is_required() {
        let result = ChatRequest::builder()
            .messages(vec![ChatMessage::user("hi")])
            .build();
        assert!(result.is_err());
    }
}
