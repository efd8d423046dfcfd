//! Per-network RPC client pool (`spec.md` §4.9).
//!
//! Solana uses the teacher's blocking `RpcClient` (see
//! `token_account_manager.rs`), invoked through `spawn_blocking` at call
//! sites since the Trading Service is otherwise fully async. EVM networks
//! get an `alloy` provider built once per network and shared behind an
//! `Arc`. A network with no RPC URL configured is simply absent from the
//! pool; callers surface that as `TradeError::NetworkUnavailable`.

use crate::network::Network;
use crate::settings::Settings;
use crate::wallet::{NetworkSigner, WalletManager};
use alloy::network::EthereumWallet;
use alloy::providers::{Provider, ProviderBuilder};
use solana_client::rpc_client::RpcClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

pub type EvmProvider = Arc<dyn Provider + Send + Sync>;

pub struct RpcClientPool {
    solana: Option<Arc<RpcClient>>,
    evm: HashMap<Network, EvmProvider>,
}

impl RpcClientPool {
    pub fn build(settings: &Settings, wallets: &WalletManager) -> Self {
        let mut evm = HashMap::new();

        for network in Network::ALL {
            if !network.is_evm() {
                continue;
            }
            let Some(url) = settings.rpc_urls.get(&network) else {
                continue;
            };
            let Some(NetworkSigner::Evm(signer)) = wallets.signer(network) else {
                continue;
            };
            let parsed = match url.parse() {
                Ok(url) => url,
                Err(e) => {
                    warn!("invalid RPC_URL for {network}, disabling network: {e}");
                    continue;
                }
            };
            let wallet = EthereumWallet::from(signer.clone());
            let provider = ProviderBuilder::new().wallet(wallet).on_http(parsed);
            evm.insert(network, Arc::new(provider) as EvmProvider);
        }

        let solana = match (settings.rpc_urls.get(&Network::Sol), wallets.signer(Network::Sol)) {
            (Some(url), Some(_)) => Some(Arc::new(RpcClient::new(url.clone()))),
            _ => None,
        };

        Self { solana, evm }
    }

    pub fn evm_provider(&self, network: Network) -> Option<EvmProvider> {
        self.evm.get(&network).cloned()
    }

    pub fn solana_client(&self) -> Option<Arc<RpcClient>> {
        self.solana.clone()
    }

    pub fn is_available(&self, network: Network) -> bool {
        if network.is_evm() {
            self.evm.contains_key(&network)
        } else {
            self.solana.is_some()
        }
    }
}
