//! Dev node: in-memory store, simulated ledger, background reaper.
//!
//! ```text
//! auctionbook-node [--config FILE]
//! ```
//!
//! Without `--config` the path is read from `AUCTIONBOOK_CONFIG`; without
//! either the defaults apply.

use std::sync::Arc;
use std::time::Duration;

use auctionbook_ledger::SimulatedLedger;
use auctionbook_node::cli::Cli;
use auctionbook_node::{config, spawn_reaper, telemetry, Marketplace};
use auctionbook_store::MemoryStore;
use auctionbook_types::constants::{ENGINE_NAME, VERSION};
use auctionbook_types::Result;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    telemetry::init(&config)?;

    info!(
        engine = ENGINE_NAME,
        version = VERSION,
        config = ?cli.config,
        selection = ?config.engine.selection_policy,
        deposit = ?config.engine.deposit_policy,
        "starting node"
    );

    let store = Arc::new(MemoryStore::new());
    let ledger = Arc::new(SimulatedLedger::new());
    let marketplace = Arc::new(Marketplace::new(store, ledger, config.engine.clone())?);
    marketplace.seed_markets(&config.markets).await?;

    let reaper = spawn_reaper(
        marketplace.clone(),
        Duration::from_secs(config.reaper_interval_secs),
    );
    info!(
        markets = config.markets.len(),
        reaper_interval_secs = config.reaper_interval_secs,
        "node ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    reaper.abort();
    Ok(())
}
