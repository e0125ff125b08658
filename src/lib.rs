mod app;
mod args;
pub mod chat;
pub mod config;
pub mod example;
pub mod pipe;
pub mod server;
pub mod session;
pub mod stream;

pub use app::Application;
pub use config::{ExampleConfig, Valves};
pub use example::run_chat;
pub use pipe::{HostReply, Pipe, PipeError, PipeResponse};
pub use session::{EncryptedSession, HttpSession, SessionError, SessionRequest, SessionResponse};

/// Parse the command line and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    Application::init()?.run().await
}
