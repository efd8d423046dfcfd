//! PancakeSwap V2 adapter (BNB) — `spec.md` §4.4.3: "same shape as Uniswap
//! V2 with PancakeSwap router and WBNB, no version selection."

use super::uniswap_v2::execute_v2_swap;
use super::{Swap, SwapOutcome, SwapParams};
use crate::error::TradeError;
use crate::rpc_pool::RpcClientPool;
use crate::wallet::WalletManager;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

pub struct PancakeSwapAdapter {
    rpc_pool: Arc<RpcClientPool>,
    wallets: Arc<WalletManager>,
}

impl PancakeSwapAdapter {
    pub fn new(rpc_pool: Arc<RpcClientPool>, wallets: Arc<WalletManager>) -> Self {
        Self { rpc_pool, wallets }
    }
}

#[async_trait]
impl Swap for PancakeSwapAdapter {
    async fn execute_swap(&self, params: &SwapParams) -> Result<SwapOutcome, TradeError> {
        let (router, wbnb) = super::constants::v2_router(params.network).ok_or(TradeError::NetworkUnavailable)?;
        let provider = self.rpc_pool.evm_provider(params.network).ok_or(TradeError::NetworkUnavailable)?;
        match execute_v2_swap(provider, &self.wallets, router, wbnb, params).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("pancakeswap swap failed: {e}");
                Err(e)
            }
        }
    }
}
