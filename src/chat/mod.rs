//! Chat-completion wire types (OpenAI dialect).

mod completion;
mod message;
mod request;

pub use completion::{ChatCompletion, CompletionChoice, Delta, StreamChunk};
pub use message::{ChatMessage, ChatMessageRole};
pub use request::{ChatRequest, ChatRequestBuilder};

/// Route of the chat-completions endpoint, appended to a base URL.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Join a base URL and the chat-completions route.
///
/// The base is used verbatim, so a trailing slash produces a double slash just
/// like plain string formatting would.
pub fn completions_url(base_url: &str) -> String {
    format!("{base_url}{CHAT_COMPLETIONS_PATH}")
}
