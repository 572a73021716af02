//! [`ChainRpc`] implementation over an Alloy [`Provider`].

use alloy::eips::BlockNumberOrTag;
use alloy::providers::Provider;
use alloy_primitives::B256;
use async_trait::async_trait;
use lithium_core::{ChainRpc, LithiumError, RpcBlock, RpcLog, RpcReceipt, RpcTransaction};

use crate::retry::with_retry;

/// Wraps any Alloy `Provider` (HTTP, WS, IPC) as a [`ChainRpc`], retrying
/// transient transport errors with [`with_retry`].
pub struct AlloyChainRpc<P> {
    provider: P,
}

impl<P: Provider> AlloyChainRpc<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

fn transport_err(err: impl std::error::Error + Send + Sync + 'static) -> LithiumError {
    LithiumError::rpc(err)
}

#[async_trait]
impl<P: Provider + Send + Sync> ChainRpc for AlloyChainRpc<P> {
    async fn block_number(&self) -> Result<u64, LithiumError> {
        with_retry("eth_blockNumber", || async {
            self.provider.get_block_number().await.map_err(transport_err)
        })
        .await
    }

    async fn get_block_by_number(&self, height: u64) -> Result<Option<RpcBlock>, LithiumError> {
        let block = with_retry("eth_getBlockByNumber", || async {
            self.provider
                .get_block_by_number(BlockNumberOrTag::Number(height))
                .await
                .map_err(transport_err)
        })
        .await?;

        Ok(block.map(|b| RpcBlock {
            hash: b.header.hash,
            transactions: b.transactions.hashes().collect(),
        }))
    }

    async fn get_transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<RpcTransaction>, LithiumError> {
        let tx = with_retry("eth_getTransactionByHash", || async {
            self.provider
                .get_transaction_by_hash(hash)
                .await
                .map_err(transport_err)
        })
        .await?;

        Ok(tx.map(|tx| RpcTransaction {
            hash,
            block_height: tx.block_number.unwrap_or_default(),
            tx_index: tx.transaction_index.unwrap_or_default() as u32,
            from: tx.from,
            to: tx.to,
            value: tx.value,
            input: tx.input.to_vec(),
        }))
    }

    async fn get_transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<RpcReceipt>, LithiumError> {
        let receipt = with_retry("eth_getTransactionReceipt", || async {
            self.provider
                .get_transaction_receipt(hash)
                .await
                .map_err(transport_err)
        })
        .await?;

        Ok(receipt.map(|r| RpcReceipt {
            logs: r
                .logs()
                .iter()
                .filter_map(|log| {
                    let topic0 = *log.topics().first()?;
                    Some(RpcLog {
                        address: log.address(),
                        topic0,
                        data: log.data().data.to_vec(),
                    })
                })
                .collect(),
        }))
    }
}
