//! Error types for AuctionBook.
//!
//! All errors use the `AB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Request validation
//! - 2xx: Missing records
//! - 3xx: Asset ownership
//! - 4xx: External ledger
//! - 5xx: Lifecycle / reconciliation
//! - 6xx: Order store
//! - 9xx: General / internal errors
//!
//! Every variant maps to one [`ErrorKind`], which is what callers branch on.

use thiserror::Error;

use crate::{Mint, OrderId, SaleId, Wallet};

/// Failure taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid request fields. Raised before any store access.
    Validation,
    /// A referenced order, sale or market does not exist.
    NotFound,
    /// The wallet does not custody the asset it claims to sell.
    OwnershipViolation,
    /// Building, submitting or confirming a ledger transaction failed.
    ExternalLedger,
    /// A confirmation updated some records and then failed.
    PartialReconciliation,
    /// A conditional write lost, or a state transition is not allowed.
    Conflict,
    /// The order store could not serve the request.
    Store,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::NotFound => "not-found",
            Self::OwnershipViolation => "ownership-violation",
            Self::ExternalLedger => "external-ledger",
            Self::PartialReconciliation => "partial-reconciliation",
            Self::Conflict => "conflict",
            Self::Store => "store",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Central error enum for all AuctionBook operations.
#[derive(Debug, Error)]
pub enum AuctionBookError {
    // =================================================================
    // Validation (1xx)
    // =================================================================
    #[error("AB_ERR_100: Invalid request: {reason}")]
    InvalidRequest { reason: String },

    // =================================================================
    // Not found (2xx)
    // =================================================================
    #[error("AB_ERR_200: Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("AB_ERR_201: Sale not found: {0}")]
    SaleNotFound(SaleId),

    #[error("AB_ERR_202: Market not found: {0}")]
    MarketNotFound(Mint),

    // =================================================================
    // Ownership (3xx)
    // =================================================================
    #[error("AB_ERR_300: Wallet {wallet} does not own {mint}: holds {held}, needs {needed}")]
    NotAssetOwner {
        wallet: Wallet,
        mint: Mint,
        held: rust_decimal::Decimal,
        needed: rust_decimal::Decimal,
    },

    // =================================================================
    // External ledger (4xx)
    // =================================================================
    /// The ledger refused to build or execute the transaction.
    #[error("AB_ERR_400: Ledger rejected transaction: {reason}")]
    LedgerRejected { reason: String },

    /// No confirmation arrived within the configured window.
    #[error("AB_ERR_401: Ledger confirmation timed out after {waited_ms}ms")]
    LedgerTimeout { waited_ms: u64 },

    /// The ledger endpoint could not be reached.
    #[error("AB_ERR_402: Ledger unavailable: {reason}")]
    LedgerUnavailable { reason: String },

    // =================================================================
    // Lifecycle (5xx)
    // =================================================================
    /// A confirmation wrote some records before failing on `step`.
    /// Earlier writes are not rolled back.
    #[error("AB_ERR_500: Confirmation {handle} failed at {step} after updating [{applied}]: {cause}")]
    PartialConfirmation {
        handle: String,
        step: String,
        applied: String,
        #[source]
        cause: Box<AuctionBookError>,
    },

    #[error("AB_ERR_501: Illegal transition of {record}: {from} -> {to}")]
    IllegalTransition {
        record: String,
        from: String,
        to: String,
    },

    // =================================================================
    // Store (6xx)
    // =================================================================
    /// A conditional write found the item in a different state.
    #[error("AB_ERR_600: Condition failed on {record}: expected {expected}, found {actual}")]
    ConditionFailed {
        record: String,
        expected: String,
        actual: String,
    },

    #[error("AB_ERR_601: Store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    #[error("AB_ERR_900: Internal error: {0}")]
    Internal(String),

    #[error("AB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    #[error("AB_ERR_902: Configuration error: {0}")]
    Configuration(String),

    #[error("AB_ERR_903: I/O error: {0}")]
    Io(String),
}

impl AuctionBookError {
    /// Shorthand for [`AuctionBookError::InvalidRequest`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest { .. } => ErrorKind::Validation,
            Self::OrderNotFound(_) | Self::SaleNotFound(_) | Self::MarketNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::NotAssetOwner { .. } => ErrorKind::OwnershipViolation,
            Self::LedgerRejected { .. }
            | Self::LedgerTimeout { .. }
            | Self::LedgerUnavailable { .. } => ErrorKind::ExternalLedger,
            Self::PartialConfirmation { .. } => ErrorKind::PartialReconciliation,
            Self::IllegalTransition { .. } | Self::ConditionFailed { .. } => ErrorKind::Conflict,
            Self::StoreUnavailable { .. } => ErrorKind::Store,
            Self::Internal(_) | Self::Serialization(_) | Self::Configuration(_) | Self::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// `true` for a lost conditional write.
    #[must_use]
    pub fn is_condition_failed(&self) -> bool {
        matches!(self, Self::ConditionFailed { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, AuctionBookError>;

impl From<std::io::Error> for AuctionBookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuctionBookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
