//! Jupiter adapter (Solana) — `spec.md` §4.4.4.

use super::constants::{JUPITER_QUOTE_API, JUPITER_SWAP_API, SOL_WRAPPED_SOL_MINT};
use super::{Swap, SwapOutcome, SwapParams};
use crate::error::TradeError;
use crate::retry::{execute_with_retry, RetryProfile};
use crate::rpc_pool::RpcClientPool;
use crate::wallet::{NetworkSigner, WalletManager};
use async_trait::async_trait;
use base64::Engine;
use bigdecimal::BigDecimal;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer as _;
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Flat fee modeling; Solana fees are non-competitive for this service's
/// purposes (`spec.md` §4.4.4 step 7).
const FLAT_GAS_FEE_SOL: &str = "0.000005";

const DEFAULT_MINT_DECIMALS: u8 = 9;

#[derive(Debug, Deserialize)]
struct SwapResponse {
    #[serde(rename = "swapTransaction")]
    swap_transaction: String,
}

pub struct JupiterAdapter {
    rpc_pool: Arc<RpcClientPool>,
    wallets: Arc<WalletManager>,
    client: reqwest::Client,
    rate_limiter: Arc<RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>>,
}

impl JupiterAdapter {
    pub fn new(rpc_pool: Arc<RpcClientPool>, wallets: Arc<WalletManager>) -> Self {
        Self {
            rpc_pool,
            wallets,
            client: reqwest::Client::builder().timeout(Duration::from_secs(15)).build().expect("http client builds"),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(nonzero!(4u32)).allow_burst(nonzero!(8u32)))),
        }
    }

    async fn quote(&self, input_mint: &str, output_mint: &str, amount_lamports: u64, slippage_bps: u32) -> anyhow::Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;
        let response = self
            .client
            .get(JUPITER_QUOTE_API)
            .query(&[
                ("inputMint", input_mint.to_string()),
                ("outputMint", output_mint.to_string()),
                ("amount", amount_lamports.to_string()),
                ("slippageBps", slippage_bps.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn swap_transaction(&self, user_pubkey: &str, quote: &serde_json::Value) -> anyhow::Result<SwapResponse> {
        self.rate_limiter.until_ready().await;
        let body = serde_json::json!({
            "quoteResponse": quote,
            "userPublicKey": user_pubkey,
            "wrapAndUnwrapSol": true,
            "dynamicComputeUnitLimit": true,
        });
        let response = self.client.post(JUPITER_SWAP_API).json(&body).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    fn mint_decimals(rpc: &solana_client::rpc_client::RpcClient, mint: &Pubkey) -> u8 {
        rpc.get_account_data(mint)
            .ok()
            .and_then(|data| spl_token::state::Mint::unpack(&data).ok())
            .map(|m| m.decimals)
            .unwrap_or(DEFAULT_MINT_DECIMALS)
    }
}

#[async_trait]
impl Swap for JupiterAdapter {
    async fn execute_swap(&self, params: &SwapParams) -> Result<SwapOutcome, TradeError> {
        let rpc = self.rpc_pool.solana_client().ok_or(TradeError::NetworkUnavailable)?;
        let Some(NetworkSigner::Solana(keypair_ref)) = self.wallets.signer(params.network) else {
            return Err(TradeError::NetworkUnavailable);
        };
        let keypair = Keypair::from_bytes(&keypair_ref.to_bytes()).expect("re-derivable from loaded keypair bytes");
        let profile = RetryProfile::for_network(params.network);

        let output_mint = params.token_address.clone();
        let amount_lamports = lamports_from_sol(&params.amount_native);
        let slippage_bps = (params.slippage_percent * 100.0).round() as u32;

        // Step 1: quote.
        let quote_json = execute_with_retry(profile, "jupiter.quote", || {
            self.quote(SOL_WRAPPED_SOL_MINT, &output_mint, amount_lamports, slippage_bps)
        })
        .await
        .map_err(|e| TradeError::AdapterError(e.to_string()))?;

        let out_amount: u64 = quote_json
            .get("outAmount")
            .and_then(|v| v.as_str())
            .ok_or(TradeError::NoLiquidity)?
            .parse()
            .map_err(|_| TradeError::NoLiquidity)?;
        if out_amount == 0 {
            return Err(TradeError::NoLiquidity);
        }

        // Step 2: swap transaction — forward the full quote payload Jupiter
        // returned, not just the fields we care about, since the swap
        // endpoint needs the route plan embedded in it.
        let user_pubkey = keypair.pubkey().to_string();
        let swap_response = execute_with_retry(profile, "jupiter.swap_tx", || self.swap_transaction(&user_pubkey, &quote_json))
            .await
            .map_err(|e| TradeError::AdapterError(e.to_string()))?;

        // Step 3: deserialize, versioned first, legacy fallback.
        let raw_tx = base64::engine::general_purpose::STANDARD
            .decode(&swap_response.swap_transaction)
            .map_err(|e| TradeError::AdapterError(format!("failed to decode swap transaction: {e}")))?;

        let signature = if let Ok(mut versioned) = bincode::deserialize::<VersionedTransaction>(&raw_tx) {
            // Step 4: sign.
            versioned.message.set_recent_blockhash(
                execute_with_retry(profile, "jupiter.blockhash", || async {
                    tokio::task::spawn_blocking({
                        let rpc = rpc.clone();
                        move || rpc.get_latest_blockhash()
                    })
                    .await
                    .map_err(|e| e.to_string())?
                    .map_err(|e| e.to_string())
                })
                .await
                .map_err(TradeError::AdapterError)?,
            );
            versioned.signatures = vec![keypair.sign_message(&versioned.message.serialize())];
            send_and_confirm_versioned(&rpc, versioned, profile).await?
        } else {
            let mut legacy: Transaction = bincode::deserialize(&raw_tx)
                .map_err(|e| TradeError::AdapterError(format!("failed to deserialize swap transaction: {e}")))?;
            let blockhash = execute_with_retry(profile, "jupiter.blockhash", || async {
                tokio::task::spawn_blocking({
                    let rpc = rpc.clone();
                    move || rpc.get_latest_blockhash()
                })
                .await
                .map_err(|e| e.to_string())?
                .map_err(|e| e.to_string())
            })
            .await
            .map_err(TradeError::AdapterError)?;
            legacy.sign(&[&keypair], blockhash);
            send_and_confirm_legacy(&rpc, legacy, profile).await?
        };

        let decimals = {
            let rpc = rpc.clone();
            let mint = Pubkey::from_str(&output_mint).map_err(|_| TradeError::InvalidAddress(output_mint.clone()))?;
            tokio::task::spawn_blocking(move || Self::mint_decimals(&rpc, &mint))
                .await
                .unwrap_or(DEFAULT_MINT_DECIMALS)
        };

        let token_amount = BigDecimal::from(out_amount) / BigDecimal::from(10u64.pow(decimals as u32));
        let token_price = if token_amount > BigDecimal::from(0) {
            &params.amount_native / &token_amount
        } else {
            BigDecimal::from(0)
        };
        let gas_fee = BigDecimal::from_str(FLAT_GAS_FEE_SOL).expect("constant parses");
        let gas_fee_usd = &gas_fee * &params.native_price_usd;

        info!("jupiter swap confirmed: {signature}");

        Ok(SwapOutcome {
            tx_hash: signature,
            token_amount,
            gas_fee,
            gas_fee_usd,
            token_price,
            slippage: params.slippage_percent,
        })
    }
}

async fn send_and_confirm_versioned(
    rpc: &Arc<solana_client::rpc_client::RpcClient>,
    tx: VersionedTransaction,
    profile: RetryProfile,
) -> Result<String, TradeError> {
    let rpc = rpc.clone();
    execute_with_retry(profile, "jupiter.send_confirm", || {
        let rpc = rpc.clone();
        let tx = tx.clone();
        async move {
            tokio::task::spawn_blocking(move || {
                rpc.send_and_confirm_transaction_with_spinner_and_commitment(&tx, CommitmentConfig::confirmed())
                    .map(|sig| sig.to_string())
                    .map_err(|e| e.to_string())
            })
            .await
            .map_err(|e| e.to_string())?
        }
    })
    .await
    .map_err(TradeError::AdapterError)
}

async fn send_and_confirm_legacy(
    rpc: &Arc<solana_client::rpc_client::RpcClient>,
    tx: Transaction,
    profile: RetryProfile,
) -> Result<String, TradeError> {
    let rpc = rpc.clone();
    execute_with_retry(profile, "jupiter.send_confirm", || {
        let rpc = rpc.clone();
        let tx = tx.clone();
        async move {
            tokio::task::spawn_blocking(move || rpc.send_and_confirm_transaction(&tx).map(|sig| sig.to_string()).map_err(|e| e.to_string()))
                .await
                .map_err(|e| e.to_string())?
        }
    })
    .await
    .map_err(TradeError::AdapterError)
}

fn lamports_from_sol(amount_sol: &BigDecimal) -> u64 {
    let lamports = amount_sol * BigDecimal::from(1_000_000_000u64);
    lamports.with_scale(0).to_string().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lamports_conversion_matches_spec_scenario() {
        // $10 / $150/SOL = 0.06667 SOL -> ~66,666,667 lamports.
        let amount = BigDecimal::from_str("0.06666667").unwrap();
        let lamports = lamports_from_sol(&amount);
        assert!((66_600_000..=66_700_000).contains(&lamports));
    }
}
