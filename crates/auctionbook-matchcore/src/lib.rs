//! # auctionbook-matchcore
//!
//! **Matching engine for AuctionBook.**
//!
//! Given an incoming ask or bid, find one resting counter-order it can trade
//! against and the price the trade executes at. It has:
//!
//! - **Zero side effects**: the only store access is a read-only scan
//! - **In-process filtering**: a loose store filter can never yield an
//!   incompatible match
//! - **Pluggable selection**: first found, price priority or time priority
//! - **Self-trade prevention**: a wallet never matches its own orders
//!
//! Claiming the selected order is the caller's job (see `auctionbook-ingress`).

pub mod compat;
pub mod finder;
pub mod pricing;
pub mod selection;

pub use compat::{counter_query, is_compatible};
pub use finder::find_counter_order;
pub use pricing::execution_price;
pub use selection::select;
