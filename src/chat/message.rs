//! Chat message types for chat-completion requests.
//!
//! Messages serialize to the `{"role": ..., "content": ...}` objects that
//! OpenAI-compatible APIs expect.
//!
//! # Example
//!
//! ```
//! use lorica_pipe::chat::ChatMessage;
//!
//! let system = ChatMessage::system("You are a helpful AI assistant.");
//! let user = ChatMessage::user("How many rs in strawberry?");
//!
//! // Serializes to: {"role":"user","content":"How many rs in strawberry?"}
//! let json = serde_json::to_string(&user).unwrap();
//! ```

use serde::{Deserialize, Serialize};

/// Role of a participant in a chat conversation.
///
/// Serializes to the lowercase strings used by chat-completion APIs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    /// Instructions that frame the conversation.
    System,
    /// Message from the user/human.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    role: ChatMessageRole,
    content: String,
}

impl ChatMessage {
    pub fn new<S: ToString>(role: ChatMessageRole, content: S) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    /// Create a new system message.
    pub fn system<S: ToString>(content: S) -> ChatMessage {
        Self::new(ChatMessageRole::System, content)
    }

    /// Create a new user message.
    pub fn user<S: ToString>(content: S) -> ChatMessage {
        Self::new(ChatMessageRole::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant<S: ToString>(content: S) -> ChatMessage {
        Self::new(ChatMessageRole::Assistant, content)
    }

    /// Get the content of the message.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the role of the message.
    pub fn role(&self) -> ChatMessageRole {
        self.role
    }
}
