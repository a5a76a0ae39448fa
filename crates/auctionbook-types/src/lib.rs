//! # auctionbook-types
//!
//! Shared types, errors, and configuration for the **AuctionBook** order book.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`SaleId`], [`Wallet`], [`Mint`]
//! - **Order model**: [`Order`], [`OrderDraft`], [`Side`], [`OrderState`]
//! - **Sale model**: [`Sale`], [`SaleDraft`], [`SaleState`]
//! - **Markets**: [`Market`]
//! - **Ledger artifacts**: [`TransactionPlan`], [`Instruction`], [`UnsignedTransaction`], [`ConfirmationHandle`]
//! - **Requests / receipts**: [`PlaceOrderRequest`], [`PlacementReceipt`], [`ConfirmRequest`], ...
//! - **Configuration**: [`EngineConfig`], [`NodeConfig`], [`SelectionPolicy`], [`DepositPolicy`]
//! - **Errors**: [`AuctionBookError`] with `AB_ERR_` prefix codes, classified by [`ErrorKind`]

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod market;
pub mod order;
pub mod plan;
pub mod request;
pub mod sale;

pub use config::*;
pub use error::*;
pub use ids::*;
pub use market::*;
pub use order::*;
pub use plan::*;
pub use request::*;
pub use sale::*;

// Constants are accessed via `auctionbook_types::constants::FOO`.
