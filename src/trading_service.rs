//! Trading Service — `spec.md` §4.5: network dispatch, safety envelope,
//! Uniswap version-fallback strategy. The only component that knows about
//! version fallback; adapters stay single-protocol (`spec.md` §9).

use crate::dex::jupiter::JupiterAdapter;
use crate::dex::pancakeswap::PancakeSwapAdapter;
use crate::dex::uniswap_v2::UniswapV2Adapter;
use crate::dex::uniswap_v3::UniswapV3Adapter;
use crate::dex::{Swap, SwapOutcome, SwapParams};
use crate::error::TradeError;
use crate::network::{is_valid_address, DexVersion, Network};
use crate::price_oracle::PriceOracle;
use crate::rpc_pool::RpcClientPool;
use crate::wallet::WalletManager;
use bigdecimal::BigDecimal;
use std::sync::Arc;
use tracing::{info, warn};

/// One nominal swap's gas cost for the pre-check, in EVM gas units
/// (`spec.md` §4.5 step 4: "gasPrice × 200_000").
const NOMINAL_SWAP_GAS_UNITS: u64 = 200_000;

#[derive(Debug, Clone)]
pub struct TradeParams {
    pub network: Network,
    pub contract_address: String,
    pub wallet_address: String,
    pub dex_version: DexVersion,
    pub amount_usd: BigDecimal,
    pub slippage_tolerance: f64,
    pub max_gas_ratio: f64,
}

pub struct TradingService {
    rpc_pool: Arc<RpcClientPool>,
    wallets: Arc<WalletManager>,
    price_oracle: Arc<PriceOracle>,
    uniswap_v2: UniswapV2Adapter,
    uniswap_v3: UniswapV3Adapter,
    pancakeswap: PancakeSwapAdapter,
    jupiter: JupiterAdapter,
}

impl TradingService {
    pub fn new(rpc_pool: Arc<RpcClientPool>, wallets: Arc<WalletManager>, price_oracle: Arc<PriceOracle>) -> Self {
        Self {
            uniswap_v2: UniswapV2Adapter::new(rpc_pool.clone(), wallets.clone()),
            uniswap_v3: UniswapV3Adapter::new(rpc_pool.clone(), wallets.clone()),
            pancakeswap: PancakeSwapAdapter::new(rpc_pool.clone(), wallets.clone()),
            jupiter: JupiterAdapter::new(rpc_pool.clone(), wallets.clone()),
            rpc_pool,
            wallets,
            price_oracle,
        }
    }

    pub async fn execute_trade(&self, params: TradeParams) -> Result<SwapOutcome, TradeError> {
        // Step 1: network availability.
        if !self.rpc_pool.is_available(params.network) || self.wallets.signer(params.network).is_none() {
            return Err(TradeError::NetworkUnavailable);
        }

        // Step 2: address validation.
        if !is_valid_address(params.network, &params.contract_address) {
            return Err(TradeError::InvalidAddress(params.contract_address.clone()));
        }

        // Step 3: price conversion.
        let native_price_usd = self.price_oracle.get_price(params.network).await;
        if native_price_usd <= BigDecimal::from(0) {
            return Err(TradeError::AdapterError("price oracle returned a non-positive price".to_string()));
        }
        let amount_native = &params.amount_usd / &native_price_usd;

        // Step 4: gas pre-check (EVM only).
        if params.network.is_evm() {
            self.gas_precheck(&params, &native_price_usd).await?;
        }

        let swap_params = SwapParams {
            network: params.network,
            token_address: params.contract_address.clone(),
            amount_native,
            slippage_percent: params.slippage_tolerance,
            wallet_address: params.wallet_address.clone(),
            native_price_usd,
        };

        // Step 5: dispatch.
        let outcome = match params.network {
            Network::Sol => self.jupiter.execute_swap(&swap_params).await,
            Network::Bnb => self.pancakeswap.execute_swap(&swap_params).await,
            Network::Eth | Network::Base => self.dispatch_uniswap(params.dex_version, &swap_params).await,
        };

        // Step 6: return verbatim.
        match &outcome {
            Ok(result) => info!("trade executed on {}: tx={}", params.network, result.tx_hash),
            Err(e) => warn!("trade failed on {}: {e}", params.network),
        }
        outcome
    }

    async fn dispatch_uniswap(&self, version: DexVersion, params: &SwapParams) -> Result<SwapOutcome, TradeError> {
        match version {
            DexVersion::V4 => Err(TradeError::NotImplemented),
            DexVersion::V2 => self.uniswap_v2.execute_swap(params).await,
            DexVersion::V3 => self.uniswap_v3.execute_swap(params).await,
            DexVersion::Auto => match self.uniswap_v3.execute_swap(params).await {
                Err(TradeError::NoV3Pool) => self.uniswap_v2.execute_swap(params).await,
                other => other,
            },
        }
    }

    async fn gas_precheck(&self, params: &TradeParams, native_price_usd: &BigDecimal) -> Result<(), TradeError> {
        let provider = self.rpc_pool.evm_provider(params.network).ok_or(TradeError::NetworkUnavailable)?;
        let gas_price_wei = alloy::providers::Provider::get_gas_price(&provider)
            .await
            .map_err(|e| TradeError::AdapterError(e.to_string()))?;

        let gas_price_native = BigDecimal::from(gas_price_wei) / BigDecimal::from(10u64.pow(18));
        let gas_fee_native = gas_price_native * BigDecimal::from(NOMINAL_SWAP_GAS_UNITS);
        let gas_fee_usd = &gas_fee_native * native_price_usd;

        let ratio = (&gas_fee_usd / &params.amount_usd)
            .to_string()
            .parse::<f64>()
            .unwrap_or(f64::MAX);

        if ratio > params.max_gas_ratio {
            return Err(TradeError::GasTooHigh {
                gas_fee_usd: gas_fee_usd.to_string(),
                amount_usd: params.amount_usd.to_string(),
                ratio,
                max_ratio: params.max_gas_ratio,
            });
        }
        Ok(())
    }
}
