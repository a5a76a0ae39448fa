//! Command line of the dev node.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "auctionbook-node")]
#[command(version, about = "AuctionBook dev node: in-memory store, simulated ledger", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "AUCTIONBOOK_CONFIG")]
    pub config: Option<PathBuf>,
}
