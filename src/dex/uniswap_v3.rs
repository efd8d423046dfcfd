//! Uniswap V3 adapter (ETH, BASE) — `spec.md` §4.4.2.

use super::abi::{ExactInputSingleParams, IERC20, IUniswapV3Quoter, IUniswapV3Router};
use super::constants::{v3_router, BASE_V3_TIER_PAUSE_MS, UNISWAP_V3_FEE_TIERS};
use super::util::{apply_slippage_floor, from_units, to_usd, to_wei};
use super::{Swap, SwapOutcome, SwapParams};
use crate::error::TradeError;
use crate::network::Network;
use crate::retry::{execute_with_retry, RetryProfile};
use crate::rpc_pool::{EvmProvider, RpcClientPool};
use crate::wallet::{NetworkSigner, WalletManager};
use alloy::primitives::aliases::{U160, U24};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;

pub struct UniswapV3Adapter {
    rpc_pool: Arc<RpcClientPool>,
    wallets: Arc<WalletManager>,
}

impl UniswapV3Adapter {
    pub fn new(rpc_pool: Arc<RpcClientPool>, wallets: Arc<WalletManager>) -> Self {
        Self { rpc_pool, wallets }
    }

    fn provider(&self, network: Network) -> Result<EvmProvider, TradeError> {
        self.rpc_pool.evm_provider(network).ok_or(TradeError::NetworkUnavailable)
    }
}

/// Probes every fee tier and picks the one with the strictly largest quote;
/// ties keep the first (ascending) tier tried (`spec.md` §8).
async fn best_fee_tier<P>(
    quoter: &IUniswapV3Quoter::IUniswapV3QuoterInstance<(), P>,
    weth: Address,
    token: Address,
    amount_in: U256,
    profile: RetryProfile,
    network: Network,
) -> Option<(U24, U256)>
where
    P: alloy::providers::Provider + Clone,
{
    let mut quotes = Vec::with_capacity(UNISWAP_V3_FEE_TIERS.len());

    for (i, fee) in UNISWAP_V3_FEE_TIERS.iter().enumerate() {
        if network == Network::Base && i > 0 {
            tokio::time::sleep(Duration::from_millis(BASE_V3_TIER_PAUSE_MS)).await;
        }

        // every tier constant fits in u16, so the narrowing into U24 never truncates.
        let fee = U24::from(*fee as u16);

        let quote = execute_with_retry(profile, "uniswap_v3.quote", || async {
            quoter
                .quoteExactInputSingle(weth, token, fee, amount_in, U160::ZERO)
                .call()
                .await
                .map_err(|e| e.to_string())
        })
        .await
        .ok()
        .map(|r| r.amountOut);

        if let Some(out) = quote {
            if out > U256::ZERO {
                quotes.push((fee, out));
            }
        }
    }

    pick_best_tier(quotes)
}

/// The tie-breaking rule `best_fee_tier` applies to its probed quotes,
/// pulled out so it's testable without an RPC round trip: strictly greater
/// wins, a tie keeps whichever tier came first in `quotes`.
fn pick_best_tier(quotes: impl IntoIterator<Item = (U24, U256)>) -> Option<(U24, U256)> {
    let mut best: Option<(U24, U256)> = None;
    for (fee, out) in quotes {
        if best.map(|(_, best_out)| out > best_out).unwrap_or(true) {
            best = Some((fee, out));
        }
    }
    best
}

#[async_trait]
impl Swap for UniswapV3Adapter {
    async fn execute_swap(&self, params: &SwapParams) -> Result<SwapOutcome, TradeError> {
        let (router_addr, quoter_addr, weth_addr) = v3_router(params.network).ok_or(TradeError::NetworkUnavailable)?;
        let provider = self.provider(params.network)?;
        let profile = RetryProfile::for_network(params.network);

        let token: Address = params
            .token_address
            .parse()
            .map_err(|_| TradeError::InvalidAddress(params.token_address.clone()))?;
        let router: Address = router_addr.parse().expect("router constant is valid");
        let quoter_addr: Address = quoter_addr.parse().expect("quoter constant is valid");
        let weth: Address = weth_addr.parse().expect("weth constant is valid");

        let Some(NetworkSigner::Evm(signer)) = self.wallets.signer(params.network) else {
            return Err(TradeError::NetworkUnavailable);
        };
        let recipient = signer.address();

        let erc20 = IERC20::new(token, provider.clone());
        let decimals = execute_with_retry(profile, "uniswap_v3.decimals", || async {
            erc20.decimals().call().await.map_err(|e| e.to_string())
        })
        .await
        .map_err(|_| TradeError::InvalidToken)?
        ._0;

        let amount_in = to_wei(&params.amount_native);
        let quoter = IUniswapV3Quoter::new(quoter_addr, provider.clone());
        let (fee, expected_out) = best_fee_tier(&quoter, weth, token, amount_in, profile, params.network)
            .await
            .ok_or(TradeError::NoV3Pool)?;

        let min_out = apply_slippage_floor(expected_out, params.slippage_percent);
        let deadline = U256::from(
            SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock is after epoch").as_secs() + 20 * 60,
        );

        let router_contract = IUniswapV3Router::new(router, provider.clone());
        let call = router_contract
            .exactInputSingle(ExactInputSingleParams {
                tokenIn: weth,
                tokenOut: token,
                fee,
                recipient,
                deadline,
                amountIn: amount_in,
                amountOutMinimum: min_out,
                sqrtPriceLimitX96: U160::ZERO,
            })
            .value(amount_in);

        let gas_estimate = execute_with_retry(profile, "uniswap_v3.estimate_gas", || async {
            call.estimate_gas().await.map_err(|e| e.to_string())
        })
        .await
        .map_err(TradeError::AdapterError)?;

        let pending = execute_with_retry(profile, "uniswap_v3.send", || async {
            call.send().await.map_err(|e| e.to_string())
        })
        .await
        .map_err(TradeError::AdapterError)?;

        let receipt = execute_with_retry(profile, "uniswap_v3.receipt", || async {
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

        info!("uniswap v3 swap confirmed at fee tier {fee}: {:?}", receipt.transaction_hash);

        Ok(SwapOutcome {
            tx_hash: format!("{:#x}", receipt.transaction_hash),
            token_amount,
            gas_fee,
            gas_fee_usd,
            token_price,
            slippage: params.slippage_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::pick_best_tier;
    use alloy::primitives::aliases::U24;
    use alloy::primitives::U256;

    /// Ties keep the first (ascending) tier tried, not the last.
    #[test]
    fn strictly_greater_keeps_first_tier_on_tie() {
        let quotes = vec![(U24::from(100u16), U256::from(1000u64)), (U24::from(500u16), U256::from(1000u64)), (U24::from(3000u16), U256::from(1000u64))];
        let best = pick_best_tier(quotes);
        assert_eq!(best.map(|(fee, _)| fee), Some(U24::from(100u16)));
    }

    /// A later tier with a strictly larger quote still wins.
    #[test]
    fn strictly_larger_later_tier_wins() {
        let quotes = vec![(U24::from(100u16), U256::from(900u64)), (U24::from(500u16), U256::from(1000u64)), (U24::from(3000u16), U256::from(950u64))];
        let best = pick_best_tier(quotes);
        assert_eq!(best.map(|(fee, _)| fee), Some(U24::from(500u16)));
    }

    /// A tier with no liquidity (zero quote) is never selected.
    #[test]
    fn no_quotes_means_no_pool() {
        assert_eq!(pick_best_tier(std::iter::empty::<(U24, U256)>()), None);
    }
}
