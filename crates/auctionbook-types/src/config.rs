//! Configuration types for the engine and for a node hosting it.

use serde::{Deserialize, Serialize};

use crate::{constants, AuctionBookError, Market, Mint, Result};

/// How one candidate is chosen when several resting orders are compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// The first compatible record in store scan order.
    #[default]
    FirstFound,
    /// Best price for the incoming order, oldest first among equals.
    PricePriority,
    /// Oldest compatible record.
    TimePriority,
}

/// Formula that sizes a bidder's escrow deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositPolicy {
    /// `E == 0 → P`, `E ≥ P → P`, otherwise `E`.
    #[default]
    Literal,
    /// `max(0, P − E)`: deposit only what existing escrow does not cover.
    Shortfall,
}

/// Matching and lifecycle tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub selection_policy: SelectionPolicy,
    pub deposit_policy: DepositPolicy,
    /// Skip counter-orders owned by the incoming wallet.
    pub self_trade_prevention: bool,
    /// Selection attempts before placing unmatched after lost claims.
    pub max_claim_attempts: u32,
    pub pending_ttl_secs: u64,
    pub confirm_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection_policy: SelectionPolicy::default(),
            deposit_policy: DepositPolicy::default(),
            self_trade_prevention: true,
            max_claim_attempts: constants::DEFAULT_MAX_CLAIM_ATTEMPTS,
            pending_ttl_secs: constants::DEFAULT_PENDING_TTL_SECS,
            confirm_timeout_ms: constants::DEFAULT_CONFIRM_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    /// # Errors
    /// Returns `Configuration` for zero attempts, TTL or timeout.
    pub fn validate(&self) -> Result<()> {
        if self.max_claim_attempts == 0 {
            return Err(AuctionBookError::Configuration(
                "max_claim_attempts must be > 0".into(),
            ));
        }
        if self.pending_ttl_secs == 0 {
            return Err(AuctionBookError::Configuration(
                "pending_ttl_secs must be > 0".into(),
            ));
        }
        if self.confirm_timeout_ms == 0 {
            return Err(AuctionBookError::Configuration(
                "confirm_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn pending_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.pending_ttl_secs).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub fn confirm_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.confirm_timeout_ms)
    }
}

/// A market a node registers at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSeed {
    pub treasury_mint: Mint,
    pub token_name: String,
    pub token_symbol: String,
}

impl MarketSeed {
    #[must_use]
    pub fn native() -> Self {
        Self {
            treasury_mint: Mint::native(),
            token_name: "Solana".to_string(),
            token_symbol: "SOL".to_string(),
        }
    }

    #[must_use]
    pub fn to_market(&self) -> Market {
        Market::new(
            self.treasury_mint.clone(),
            self.token_name.clone(),
            self.token_symbol.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Configuration for a node process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub engine: EngineConfig,
    pub reaper_interval_secs: u64,
    /// `tracing` env-filter directive. `RUST_LOG` wins when set.
    pub log_filter: String,
    pub log_format: LogFormat,
    pub markets: Vec<MarketSeed>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            reaper_interval_secs: constants::DEFAULT_REAPER_INTERVAL_SECS,
            log_filter: constants::DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::default(),
            markets: vec![MarketSeed::native()],
        }
    }
}

impl NodeConfig {
    /// # Errors
    /// Returns `Configuration` if the engine section or reaper interval is invalid.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        if self.reaper_interval_secs == 0 {
            return Err(AuctionBookError::Configuration(
                "reaper_interval_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.selection_policy, SelectionPolicy::FirstFound);
        assert_eq!(cfg.deposit_policy, DepositPolicy::Literal);
        assert!(cfg.self_trade_prevention);
        assert_eq!(cfg.max_claim_attempts, 3);
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_claim_attempts_rejected() {
        let cfg = EngineConfig {
            max_claim_attempts: 0,
            ..EngineConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, AuctionBookError::Configuration(_)));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: NodeConfig =
            serde_json::from_str(r#"{"engine": {"selection_policy": "price_priority"}}"#).unwrap();
        assert_eq!(cfg.engine.selection_policy, SelectionPolicy::PricePriority);
        assert_eq!(cfg.engine.max_claim_attempts, 3);
        assert_eq!(cfg.markets.len(), 1);
        cfg.validate().unwrap();
    }

    #[test]
    fn market_seed_builds_market() {
        let market = MarketSeed::native().to_market();
        assert!(market.treasury_mint.is_native());
        assert_eq!(market.token_symbol, "SOL");
    }
}
