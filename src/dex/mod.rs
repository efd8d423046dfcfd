//! DEX Adapters (`spec.md` §4.4): four single-protocol modules behind one
//! `Swap` capability, selected by a `(network, version)` table rather than
//! adapter inheritance (`spec.md` §9).

pub mod abi;
pub mod constants;
pub mod jupiter;
pub mod pancakeswap;
pub mod uniswap_v2;
pub mod uniswap_v3;
pub mod util;

use crate::error::TradeError;
use crate::network::Network;
use async_trait::async_trait;
use bigdecimal::BigDecimal;

/// Normalized swap request. `amount_native` is already converted from the
/// trade's USD notional by the Trading Service (`spec.md` §4.5 step 3).
#[derive(Debug, Clone)]
pub struct SwapParams {
    pub network: Network,
    pub token_address: String,
    pub amount_native: BigDecimal,
    pub slippage_percent: f64,
    pub wallet_address: String,
    pub native_price_usd: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub tx_hash: String,
    pub token_amount: BigDecimal,
    pub gas_fee: BigDecimal,
    pub gas_fee_usd: BigDecimal,
    pub token_price: BigDecimal,
    pub slippage: f64,
}

#[async_trait]
pub trait Swap: Send + Sync {
    async fn execute_swap(&self, params: &SwapParams) -> Result<SwapOutcome, TradeError>;
}
