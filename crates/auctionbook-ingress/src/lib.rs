//! # auctionbook-ingress
//!
//! **Placement side of the lifecycle**: everything that happens between a
//! client asking to place or cancel an order and the client receiving an
//! unsigned transaction to sign.
//!
//! ## Order Flow
//!
//! ```text
//! validate → market exists → (ask) custody check → find + claim counter-order
//!     → (bid) size escrow deposit → insert Pending order [+ Pending sale]
//!     → build TransactionPlan → LedgerGateway::build_transaction
//! ```
//!
//! No record becomes active here. Activation happens at confirmation time
//! (`auctionbook-settlement`).

pub mod escrow;
pub mod placement;
pub mod validation;

pub use escrow::{compute_deposit, deposit_for, existing_escrow};
pub use placement::OrderIngress;
pub use validation::validate_request;
