use std::sync::Arc;

use alloy::providers::ProviderBuilder;
use clap::Parser;
use lithium_core::Lithium;
use lithium_rpc::{AlloyChainRpc, AlloyDestinationContract};

mod opts;

use opts::LithiumOpts;

fn as_url(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let opts = LithiumOpts::parse();

    if let Some(pid_path) = &opts.pid {
        std::fs::write(pid_path, std::process::id().to_string())?;
    }

    let source_provider = ProviderBuilder::new().connect(&as_url(&opts.rpc_from)).await?;
    let rpc_source = AlloyChainRpc::new(source_provider);

    let contract_dest =
        AlloyDestinationContract::connect(&as_url(&opts.rpc_to), opts.link, opts.to_account)
            .await?;

    let relay = Arc::new(Lithium::new(rpc_source, contract_dest, opts.batch_size));

    let stopper = relay.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received interrupt, stopping relay");
            stopper.stop();
        }
    });

    let result = relay.run().await;

    if let Some(pid_path) = &opts.pid {
        let _ = std::fs::remove_file(pid_path);
    }

    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!(error = %err, "relay stopped on fatal error");
            Err(err.into())
        }
    }
}
