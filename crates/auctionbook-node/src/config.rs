//! Node configuration loading.
//!
//! Sources, later wins:
//!
//! 1. [`NodeConfig::default`]
//! 2. a JSON file, when a path is given (missing keys keep their defaults)
//! 3. `AUCTIONBOOK_*` environment variables
//!
//! | Variable                              | Field                          |
//! |---------------------------------------|--------------------------------|
//! | `AUCTIONBOOK_LOG_FILTER`              | `log_filter`                   |
//! | `AUCTIONBOOK_LOG_FORMAT`              | `log_format`                   |
//! | `AUCTIONBOOK_REAPER_INTERVAL_SECS`    | `reaper_interval_secs`         |
//! | `AUCTIONBOOK_SELECTION_POLICY`        | `engine.selection_policy`      |
//! | `AUCTIONBOOK_DEPOSIT_POLICY`          | `engine.deposit_policy`        |
//! | `AUCTIONBOOK_SELF_TRADE_PREVENTION`   | `engine.self_trade_prevention` |
//! | `AUCTIONBOOK_MAX_CLAIM_ATTEMPTS`      | `engine.max_claim_attempts`    |
//! | `AUCTIONBOOK_PENDING_TTL_SECS`        | `engine.pending_ttl_secs`      |
//! | `AUCTIONBOOK_CONFIRM_TIMEOUT_MS`      | `engine.confirm_timeout_ms`    |

use std::path::Path;
use std::str::FromStr;

use auctionbook_types::constants::ENV_PREFIX;
use auctionbook_types::{AuctionBookError, NodeConfig, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Load, override from the process environment, validate.
///
/// # Errors
/// `Io` if the file cannot be read, `Serialization` if it is not valid
/// JSON, `Configuration` for a bad override or a config that fails
/// validation.
pub fn load(path: Option<&Path>) -> Result<NodeConfig> {
    let mut config = match path {
        Some(path) => from_file(path)?,
        None => NodeConfig::default(),
    };
    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Parse a JSON config file.
///
/// # Errors
/// `Io` or `Serialization`.
pub fn from_file(path: &Path) -> Result<NodeConfig> {
    let raw = std::fs::read_to_string(path)?;
    let config = serde_json::from_str(&raw)?;
    debug!(path = %path.display(), "config file loaded");
    Ok(config)
}

/// Apply every `AUCTIONBOOK_*` override `lookup` knows about.
///
/// # Errors
/// `Configuration` naming the variable whose value does not parse.
pub fn apply_overrides<F>(config: &mut NodeConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        let key = format!("{ENV_PREFIX}{name}");
        lookup(&key).map(|value| (key, value))
    };

    if let Some((_, value)) = var("LOG_FILTER") {
        config.log_filter = value;
    }
    if let Some((key, value)) = var("LOG_FORMAT") {
        config.log_format = parse_enum(&key, &value)?;
    }
    if let Some((key, value)) = var("REAPER_INTERVAL_SECS") {
        config.reaper_interval_secs = parse_value(&key, &value)?;
    }

    let engine = &mut config.engine;
    if let Some((key, value)) = var("SELECTION_POLICY") {
        engine.selection_policy = parse_enum(&key, &value)?;
    }
    if let Some((key, value)) = var("DEPOSIT_POLICY") {
        engine.deposit_policy = parse_enum(&key, &value)?;
    }
    if let Some((key, value)) = var("SELF_TRADE_PREVENTION") {
        engine.self_trade_prevention = parse_value(&key, &value)?;
    }
    if let Some((key, value)) = var("MAX_CLAIM_ATTEMPTS") {
        engine.max_claim_attempts = parse_value(&key, &value)?;
    }
    if let Some((key, value)) = var("PENDING_TTL_SECS") {
        engine.pending_ttl_secs = parse_value(&key, &value)?;
    }
    if let Some((key, value)) = var("CONFIRM_TIMEOUT_MS") {
        engine.confirm_timeout_ms = parse_value(&key, &value)?;
    }
    Ok(())
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AuctionBookError::Configuration(format!("{key}: cannot parse {value:?}")))
}

/// Enums take the same snake_case names as in the JSON file.
fn parse_enum<T: DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_string()))
        .map_err(|e| AuctionBookError::Configuration(format!("{key}: {e}")))
}
