use clap::Parser;

/// HTTP facade exposing Merkle proofs over the source chain consumed by
/// `lithium`, so downstream contracts and tooling can fetch inclusion
/// proofs without talking to the source RPC themselves.
#[derive(Parser, Debug)]
#[command(name = "lithium-proof-server")]
#[command(version, about = "HTTP facade for Lithium Merkle proofs", long_about = None)]
pub struct ProofServerOpts {
    /// Source chain RPC endpoint, `ip:port`
    #[arg(long)]
    pub rpc_from: String,

    /// Address to bind the HTTP server on
    #[arg(long, default_value = "127.0.0.1:8787")]
    pub listen: String,
}
