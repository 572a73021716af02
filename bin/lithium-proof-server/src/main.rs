use std::str::FromStr;
use std::sync::Arc;

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy_primitives::B256;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use lithium_core::{proof_for_event, proof_for_tx, LithiumError};
use lithium_rpc::AlloyChainRpc;
use serde::Serialize;
use tokio::net::TcpListener;

mod opts;

use opts::ProofServerOpts;

type AppState = Arc<AlloyChainRpc<DynProvider>>;

#[derive(Serialize)]
struct ProofResponse {
    proof: String,
}

fn error_response(err: LithiumError) -> Response {
    let status = match err {
        LithiumError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string()).into_response()
}

fn parse_tx_id(raw: &str) -> Result<B256, Response> {
    B256::from_str(raw)
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("malformed tx id: {raw}")).into_response())
}

async fn get_tx_proof(State(rpc): State<AppState>, Path(tx_id): Path<String>) -> Response {
    let tx_hash = match parse_tx_id(&tx_id) {
        Ok(hash) => hash,
        Err(resp) => return resp,
    };

    match proof_for_tx(rpc.as_ref(), tx_hash).await {
        Ok(blob) => Json(ProofResponse {
            proof: hex::encode(blob.0),
        })
        .into_response(),
        Err(err) => error_response(err),
    }
}

async fn get_log_proof(
    State(rpc): State<AppState>,
    Path((tx_id, log_idx)): Path<(String, u32)>,
) -> Response {
    let tx_hash = match parse_tx_id(&tx_id) {
        Ok(hash) => hash,
        Err(resp) => return resp,
    };

    match proof_for_event(rpc.as_ref(), tx_hash, log_idx).await {
        Ok(blob) => Json(ProofResponse {
            proof: hex::encode(blob.0),
        })
        .into_response(),
        Err(err) => error_response(err),
    }
}

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

    let opts = ProofServerOpts::parse();

    let provider = ProviderBuilder::new()
        .connect(&as_url(&opts.rpc_from))
        .await?
        .erased();
    let rpc = Arc::new(AlloyChainRpc::new(provider));

    let app = Router::new()
        .route("/proof/{tx_id}", get(get_tx_proof))
        .route("/proof/{tx_id}/{log_idx}", get(get_log_proof))
        .with_state(rpc);

    let listener = TcpListener::bind(&opts.listen).await?;
    tracing::info!(addr = %opts.listen, "proof server listening");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
