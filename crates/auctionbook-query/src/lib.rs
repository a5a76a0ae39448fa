//! # auctionbook-query
//!
//! Read side of the order book.
//!
//! - [`BookService`]: active orders per asset, markets, escrow balances
//! - [`OwnershipReconciler`]: closes asks whose seller no longer holds the
//!   asset, triggered lazily by book reads

pub mod book;
pub mod reconciler;

pub use book::BookService;
pub use reconciler::OwnershipReconciler;
