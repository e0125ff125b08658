use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging().context("initializing logging")?;

    lorica_pipe::run().await
}

fn init_logging() -> Result<()> {
    // plain layer (only target="plain"), written to stderr to keep stdout for answers
    let plain_fmt = tracing_subscriber::fmt::format()
        .without_time()
        .with_level(false)
        .with_target(false)
        .compact();
    let plain_layer = tracing_subscriber::fmt::layer()
        .event_format(plain_fmt)
        .with_writer(std::io::stderr)
        .with_filter(Targets::new().with_target("plain", LevelFilter::INFO));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,lorica_pipe=info,tower_http=info"));

    let rich_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(plain_layer)
        .with(rich_layer)
        .try_init()
        .context("a global subscriber is already installed")?;

    Ok(())
}
