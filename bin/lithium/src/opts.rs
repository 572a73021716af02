use alloy_primitives::Address;
use clap::Parser;
use std::path::PathBuf;

/// Relay daemon: follows a source chain and submits batched Merkle roots
/// to a destination Lithium link contract.
#[derive(Parser, Debug)]
#[command(name = "lithium")]
#[command(version, about = "Lithium cross-chain Merkle relay", long_about = None)]
pub struct LithiumOpts {
    /// Source chain RPC endpoint, `ip:port`
    #[arg(long)]
    pub rpc_from: String,

    /// Destination chain RPC endpoint, `ip:port`
    #[arg(long)]
    pub rpc_to: String,

    /// Account on the destination node that submits `update` transactions.
    /// Must be unlocked on that node.
    #[arg(long)]
    pub to_account: Address,

    /// Address of the destination Lithium link contract
    #[arg(long)]
    pub link: Address,

    /// Maximum number of source blocks relayed per `update` transaction
    #[arg(long, default_value_t = 32)]
    pub batch_size: u32,

    /// File the daemon's process id is written to on startup
    #[arg(long)]
    pub pid: Option<PathBuf>,
}
