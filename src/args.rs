use crate::config::{
    ExampleConfig, Valves, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_PROMPT,
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
};
use crate::server::ServerConfig;
use anyhow::Context;
use clap::ValueHint;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:9099";

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) cmd: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Send one chat completion and print the answer
    Chat(ChatArgs),

    /// Serve the pipe to a chat UI host
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ChatArgs {
    /// Deployment URL (without the /v1/chat/completions route)
    #[arg(long, env = "LORICA_DEPLOYMENT_URL", value_hint = ValueHint::Url)]
    pub(crate) deployment_url: String,

    /// API key for the deployment
    #[arg(long, env = "LORICA_API_KEY", hide_env_values = true)]
    pub(crate) api_key: String,

    /// Model to query
    #[arg(long = "model", env = "LORICA_MODEL", default_value = DEFAULT_MODEL)]
    pub(crate) model_id: String,

    /// System prompt
    #[arg(long = "system", default_value = DEFAULT_SYSTEM_PROMPT)]
    pub(crate) system_prompt: String,

    /// User prompt
    #[arg(long, default_value = DEFAULT_PROMPT)]
    pub(crate) prompt: String,

    /// Sampling temperature
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub(crate) temperature: f64,

    /// Maximum number of tokens to generate
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub(crate) max_tokens: u32,

    /// Wait for the full answer instead of streaming it
    #[arg(long)]
    pub(crate) no_stream: bool,
}

impl TryFrom<ChatArgs> for ExampleConfig {
    type Error = anyhow::Error;

    fn try_from(args: ChatArgs) -> anyhow::Result<Self> {
        ExampleConfig::builder()
            .deployment_url(args.deployment_url)
            .api_key(args.api_key)
            .model_id(args.model_id)
            .system_prompt(args.system_prompt)
            .prompt(args.prompt)
            .temperature(args.temperature)
            .max_tokens(args.max_tokens)
            .stream(!args.no_stream)
            .build()
            .context("Failed to build chat configuration")
    }
}

/// Initial valves of the served pipe
#[derive(Args, Clone, Debug)]
pub(crate) struct ValveArgs {
    /// Base URL of the API (LORICA_API_BASE_URL valve)
    #[arg(
        long = "base-url",
        env = "LORICA_API_BASE_URL",
        value_hint = ValueHint::Url,
        default_value = ""
    )]
    pub(crate) base_url: String,

    /// API key (LORICA_API_KEY valve)
    #[arg(
        id = "valve_api_key",
        long = "api-key",
        env = "LORICA_API_KEY",
        hide_env_values = true,
        default_value = ""
    )]
    pub(crate) api_key: String,

    /// Model identifier (MODEL_ID valve)
    #[arg(long = "model-id", env = "MODEL_ID", default_value = "")]
    pub(crate) model_id: String,
}

impl From<ValveArgs> for Valves {
    fn from(args: ValveArgs) -> Self {
        Valves::new(args.base_url, args.api_key, args.model_id)
    }
}

#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Address to listen on
    #[arg(long = "listen", env = "PIPE_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub(crate) listen_addr: SocketAddr,

    #[command(flatten)]
    pub(crate) valves: ValveArgs,
}

impl ServeArgs {
    pub(crate) fn server_config(&self) -> ServerConfig {
        ServerConfig {
            listen_addr: self.listen_addr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_defaults() {
        let cli = Cli::try_parse_from([
            "lorica-pipe",
            "chat",
            "--deployment-url",
            "https://e4d9a526.dep.lorica.ai",
            "--api-key",
            "k",
        ])
        .unwrap();

        let Command::Chat(args) = cli.cmd else {
            panic!("expected chat command");
        };
        let config = ExampleConfig::try_from(args).unwrap();
        assert!(config.stream);
        assert_eq!(config.model_id, DEFAULT_MODEL);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 1024);
    }

    #[test]
    fn test_chat_no_stream() {
        let cli = Cli::try_parse_from([
            "lorica-pipe",
            "chat",
            "--deployment-url",
            "https://d",
            "--api-key",
            "k",
            "--no-stream",
            "--prompt",
            "hello",
        ])
        .unwrap();

        let Command::Chat(args) = cli.cmd else {
            panic!("expected chat command");
        };
        let config = ExampleConfig::try_from(args).unwrap();
        assert!(!config.stream);
        assert_eq!(config.prompt, "hello");
    }

    #[test]
    fn test_serve_valves_and_listen_addr() {
        let cli = Cli::try_parse_from([
            "lorica-pipe",
            "serve",
            "--listen",
            "0.0.0.0:8080",
            "--base-url",
            "https://api.lorica.ai",
            "--api-key",
            "k",
            "--model-id",
            "org/model",
        ])
        .unwrap();

        let Command::Serve(args) = cli.cmd else {
            panic!("expected serve command");
        };
        let server = args.server_config();
        assert_eq!(server.listen_addr.port(), 8080);

        let valves = Valves::from(args.valves);
        assert_eq!(valves, Valves::new("https://api.lorica.ai", "k", "org/model"));
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["lorica-pipe", "serve"]).unwrap();

        let Command::Serve(args) = cli.cmd else {
            panic!("expected serve command");
        };
        assert_eq!(args.server_config().listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
    }
}
