//! Process-wide `tracing` subscriber setup.

use crate::core::config::LoggingConfig;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a formatting subscriber. `RUST_LOG` takes precedence over `config.filter`.
///
/// Returns `false` when a global subscriber was already installed (tests, embedding
/// hosts); that is not an error.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
