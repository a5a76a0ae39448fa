//! System-wide constants for AuctionBook.

/// Maximum decimal places accepted for prices and quantities.
pub const PRICE_PRECISION: u32 = 9;

/// Address of the ledger's native currency mint.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// How many times placement re-runs selection after losing a claim race.
pub const DEFAULT_MAX_CLAIM_ATTEMPTS: u32 = 3;

/// Seconds a `Pending` order or sale may wait for confirmation before the
/// reaper expires it.
pub const DEFAULT_PENDING_TTL_SECS: u64 = 15 * 60;

/// How long confirmation waits for the ledger, in milliseconds.
pub const DEFAULT_CONFIRM_TIMEOUT_MS: u64 = 60_000;

/// Interval between background reaper sweeps on a node.
pub const DEFAULT_REAPER_INTERVAL_SECS: u64 = 60;

/// Default tracing filter when neither config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Prefix of environment variables that override file configuration.
pub const ENV_PREFIX: &str = "AUCTIONBOOK_";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "AuctionBook";
