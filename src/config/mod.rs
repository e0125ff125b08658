//! Configuration for the chat example and the pipe.

mod example;
mod valves;

pub use example::{
    ExampleConfig, ExampleConfigBuilder, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_PROMPT,
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
};
pub use valves::Valves;

use std::path::Path;
use tracing::debug;

/// Load environment variables from `path` if the file exists.
///
/// Variables already present in the environment win.
pub fn load_env_file(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => debug!("ignoring env file {}: {e}", path.display()),
    }
}
