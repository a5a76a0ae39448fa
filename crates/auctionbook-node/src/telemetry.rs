//! Tracing subscriber setup.

use auctionbook_types::{AuctionBookError, LogFormat, NodeConfig, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `config.log_filter`.
///
/// # Errors
/// `Configuration` if the filter does not parse or a subscriber is
/// already installed.
pub fn init(config: &NodeConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter).map_err(|e| {
            AuctionBookError::Configuration(format!("log_filter {:?}: {e}", config.log_filter))
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = match config.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| AuctionBookError::Configuration(format!("tracing: {e}")))
}
