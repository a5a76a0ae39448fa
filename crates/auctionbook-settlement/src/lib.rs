//! # auctionbook-settlement
//!
//! **Confirmation side of the lifecycle.** Placement leaves records
//! `Pending`; this crate moves them on once the ledger has spoken.
//!
//! 1. [`Confirmer`] submits the client-signed transaction, waits (bounded)
//!    for the ledger's handle and finalizes every record it names
//! 2. [`PendingReaper`] expires records whose confirmation never came and
//!    releases counter-orders their sales had reserved
//!
//! Neither is transactional across records. A failure midway is reported,
//! never rolled back.

pub mod confirmation;
pub mod reaper;

pub use confirmation::Confirmer;
pub use reaper::{PendingReaper, SweepReport};
