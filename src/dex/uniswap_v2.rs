//! Uniswap V2 adapter (ETH, BASE) — `spec.md` §4.4.1.

use super::abi::{IERC20, IUniswapV2Router};
use super::util::{apply_slippage_floor, from_units, to_usd, to_wei};
use super::{Swap, SwapOutcome, SwapParams};
use crate::error::TradeError;
use crate::retry::{execute_with_retry, RetryProfile};
use crate::rpc_pool::{EvmProvider, RpcClientPool};
use crate::wallet::{NetworkSigner, WalletManager};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

pub struct UniswapV2Adapter {
    rpc_pool: Arc<RpcClientPool>,
    wallets: Arc<WalletManager>,
}

impl UniswapV2Adapter {
    pub fn new(rpc_pool: Arc<RpcClientPool>, wallets: Arc<WalletManager>) -> Self {
        Self { rpc_pool, wallets }
    }

    fn provider(&self, params: &SwapParams) -> Result<EvmProvider, TradeError> {
        self.rpc_pool.evm_provider(params.network).ok_or(TradeError::NetworkUnavailable)
    }
}

/// Shared by `uniswap_v2` and `pancakeswap`: both adapters are "V2 router,
/// network-qualified addresses" and differ only in which table they read.
pub(super) async fn execute_v2_swap(
    provider: EvmProvider,
    wallets: &WalletManager,
    router_addr: &str,
    weth_addr: &str,
    params: &SwapParams,
) -> Result<SwapOutcome, TradeError> {
    let profile = RetryProfile::for_network(params.network);

    let token: Address = params.token_address.parse().map_err(|_| TradeError::InvalidAddress(params.token_address.clone()))?;
    let router: Address = router_addr.parse().expect("router constant is a valid address");
    let weth: Address = weth_addr.parse().expect("weth constant is a valid address");

    let Some(NetworkSigner::Evm(signer)) = wallets.signer(params.network) else {
        return Err(TradeError::NetworkUnavailable);
    };
    let recipient = signer.address();

    // Step 1: validate token.
    let erc20 = IERC20::new(token, provider.clone());
    let decimals = execute_with_retry(profile, "uniswap_v2.decimals", || async {
        erc20.decimals().call().await.map_err(|e| e.to_string())
    })
    .await
    .map_err(|_| TradeError::InvalidToken)?
    ._0;

    // Step 2/3: quote.
    let amount_in = to_wei(&params.amount_native);
    let path = vec![weth, token];
    let router_contract = IUniswapV2Router::new(router, provider.clone());
    let amounts = execute_with_retry(profile, "uniswap_v2.getAmountsOut", || {
        let path = path.clone();
        async { router_contract.getAmountsOut(amount_in, path).call().await.map_err(|e| e.to_string()) }
    })
    .await
    .map_err(|_| TradeError::NoLiquidity)?
    .amounts;

    let expected_out = *amounts.last().ok_or(TradeError::NoLiquidity)?;
    if expected_out.is_zero() {
        return Err(TradeError::NoLiquidity);
    }

    // Step 4: slippage floor.
    let min_out = apply_slippage_floor(expected_out, params.slippage_percent);

    // Step 5/6: swap.
    let deadline = U256::from(
        SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock is after epoch").as_secs() + 20 * 60,
    );
    let path = vec![weth, token];
    let call = router_contract.swapExactETHForTokens(min_out, path, recipient, deadline).value(amount_in);

    let gas_estimate = execute_with_retry(profile, "uniswap_v2.estimate_gas", || async {
        call.estimate_gas().await.map_err(|e| e.to_string())
    })
    .await
    .map_err(TradeError::AdapterError)?;

    let pending = execute_with_retry(profile, "uniswap_v2.send", || async {
        call.send().await.map_err(|e| e.to_string())
    })
    .await
    .map_err(TradeError::AdapterError)?;

    let receipt = execute_with_retry(profile, "uniswap_v2.receipt", || async {
        pending.get_receipt().await.map_err(|e| e.to_string())
    })
    .await
    .map_err(TradeError::AdapterError)?;

    let gas_price = BigDecimal::from_str(&receipt.effective_gas_price.to_string()).unwrap_or_else(|_| BigDecimal::from(0));
    let gas_price_native = gas_price.with_scale(18) / BigDecimal::from(10u64.pow(18));
    let gas_fee = BigDecimal::from(gas_estimate.to::<u128>()) * gas_price_native;
    let gas_fee_usd = to_usd(&gas_fee, &params.native_price_usd);
    let token_amount = from_units(expected_out, decimals);
    let token_price = if token_amount > BigDecimal::from(0) {
        &params.amount_native / &token_amount
    } else {
        BigDecimal::from(0)
    };

    info!("uniswap v2 swap confirmed: {:?}", receipt.transaction_hash);

    Ok(SwapOutcome {
        tx_hash: format!("{:#x}", receipt.transaction_hash),
        token_amount,
        gas_fee,
        gas_fee_usd,
        token_price,
        slippage: params.slippage_percent,
    })
}

#[async_trait]
impl Swap for UniswapV2Adapter {
    async fn execute_swap(&self, params: &SwapParams) -> Result<SwapOutcome, TradeError> {
        let (router, weth) = super::constants::v2_router(params.network).ok_or(TradeError::NetworkUnavailable)?;
        let provider = self.provider(params)?;
        match execute_v2_swap(provider, &self.wallets, router, weth, params).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!("uniswap v2 swap failed on {}: {e}", params.network);
                Err(e)
            }
        }
    }
}
