use crate::args::{Cli, Command};
use crate::config::{load_env_file, ExampleConfig, Valves};
use crate::example::run_chat;
use crate::pipe::Pipe;
use crate::server::{serve, ServerConfig};
use crate::session::{EncryptedSession, HttpSession};
use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const ENV_FILE_VAR: &str = "APP_ENV_FILE";

pub enum Application {
    Chat(ExampleConfig),
    Serve { valves: Valves, server: ServerConfig },
}

impl Application {
    pub fn init() -> anyhow::Result<Application> {
        // Preload the env file before parsing so it can feed the `env` fallbacks
        let env_file = std::env::var_os(ENV_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".env"));
        load_env_file(&env_file);

        let cli = Cli::parse();

        let application = match cli.cmd {
            Command::Chat(chat_args) => Application::Chat(chat_args.try_into()?),
            Command::Serve(serve_args) => Application::Serve {
                server: serve_args.server_config(),
                valves: serve_args.valves.into(),
            },
        };

        Ok(application)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        // One session for the whole process
        let session: Arc<dyn EncryptedSession> = Arc::new(HttpSession::new());

        match self {
            Self::Chat(config) => {
                let mut stdout = std::io::stdout();
                run_chat(session.as_ref(), &config, &mut stdout).await?;
                if config.stream {
                    writeln!(stdout).context("Failed to write to stdout")?;
                }
                Ok(())
            }
            Self::Serve { valves, server } => {
                info!(target: "plain", "Serving pipe for model '{}'", valves.MODEL_ID);
                let pipe = Arc::new(Pipe::with_valves(session, valves));
                serve(pipe, server).await
            }
        }
    }
}
