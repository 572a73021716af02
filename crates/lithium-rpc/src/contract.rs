//! [`DestinationContract`] implementation over a `sol!`-generated
//! `ILithiumLink` binding and a plain, unsigned RPC provider.
//!
//! Submission relies on the destination node holding an unlocked account
//! for `to_account`: `update` calls go out as unsigned `eth_sendTransaction`
//! requests with `from` set explicitly, the same way the relay's original
//! implementation drove an unlocked geth/parity account rather than
//! carrying a local private key.

use alloy::providers::fillers::{
    BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
};
use alloy::providers::{Identity, Provider, ProviderBuilder, RootProvider};
use alloy::sol;
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use lithium_core::{DestinationContract, LithiumError, PendingUpdate, UpdateReceipt};

use crate::retry::with_retry;

sol! {
    /// Destination-chain contract consumed by the relay: a monotonically
    /// advancing (height -> root) cursor.
    #[sol(rpc)]
    interface ILithiumLink {
        function getHeight() external view returns (uint64);
        function getMerkleRoot(uint64 height) external view returns (bytes32);
        function update(uint64 prevHeight, bytes32[] calldata flatPairs) external;
    }
}

/// Unsigned provider stack: no wallet filler, submission relies on the
/// node-side account unlock for `to_account`.
type UnlockedProvider = FillProvider<
    JoinFill<Identity, JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>>,
    RootProvider,
>;

fn transport_err(err: impl std::error::Error + Send + Sync + 'static) -> LithiumError {
    LithiumError::rpc(err)
}

/// Destination-chain adapter: wraps the generated `ILithiumLink` binding,
/// submitting `update` transactions from a fixed, node-unlocked account.
pub struct AlloyDestinationContract {
    contract: ILithiumLink::ILithiumLinkInstance<UnlockedProvider>,
    to_account: Address,
}

impl AlloyDestinationContract {
    pub async fn connect(
        rpc_url: &str,
        link_address: Address,
        to_account: Address,
    ) -> Result<Self, LithiumError> {
        let provider = ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(transport_err)?;
        let contract = ILithiumLink::new(link_address, provider);
        Ok(Self {
            contract,
            to_account,
        })
    }
}

#[async_trait]
impl DestinationContract for AlloyDestinationContract {
    async fn get_height(&self) -> Result<u64, LithiumError> {
        with_retry("GetHeight", || async {
            self.contract
                .getHeight()
                .call()
                .await
                .map_err(transport_err)
        })
        .await
    }

    async fn get_merkle_root(&self, height: u64) -> Result<B256, LithiumError> {
        with_retry("GetMerkleRoot", || async {
            self.contract
                .getMerkleRoot(height)
                .call()
                .await
                .map_err(transport_err)
        })
        .await
    }

    async fn update(
        &self,
        prev_height: u64,
        flat_pairs: Vec<B256>,
    ) -> Result<Box<dyn PendingUpdate>, LithiumError> {
        let pending = self
            .contract
            .update(prev_height, flat_pairs)
            .from(self.to_account)
            .send()
            .await
            .map_err(transport_err)?;
        Ok(Box::new(AlloyPendingUpdate { pending }))
    }
}

struct AlloyPendingUpdate {
    pending: alloy::providers::PendingTransactionBuilder<alloy::network::Ethereum>,
}

#[async_trait]
impl PendingUpdate for AlloyPendingUpdate {
    async fn wait(self: Box<Self>) -> Result<UpdateReceipt, LithiumError> {
        let receipt = self
            .pending
            .get_receipt()
            .await
            .map_err(transport_err)?;
        Ok(UpdateReceipt {
            status: receipt.status() as u64,
        })
    }
}
