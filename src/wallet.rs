//! Per-network signer loading, generalized from the teacher's
//! `wallet_manager.rs` (Solana-only base58 keypair) to also cover the three
//! EVM networks via `alloy`'s local signer.

use crate::network::Network;
use crate::settings::Settings;
use alloy::signers::local::PrivateKeySigner;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer as _;
use std::collections::HashMap;
use tracing::{info, warn};

pub enum NetworkSigner {
    Evm(PrivateKeySigner),
    Solana(Keypair),
}

impl NetworkSigner {
    pub fn address(&self) -> String {
        match self {
            NetworkSigner::Evm(signer) => format!("{:#x}", signer.address()),
            NetworkSigner::Solana(keypair) => keypair.pubkey().to_string(),
        }
    }
}

/// Loads whichever per-network signers have a configured private key.
/// Networks missing a key are simply absent from the map; callers treat
/// that the same as any other `NetworkUnavailable` condition.
pub struct WalletManager {
    signers: HashMap<Network, NetworkSigner>,
}

impl WalletManager {
    pub fn from_settings(settings: &Settings) -> Self {
        let mut signers = HashMap::new();

        for network in Network::ALL {
            let Some(raw_key) = settings.private_keys.get(&network) else {
                continue;
            };

            let loaded = if network.is_evm() {
                raw_key.parse::<PrivateKeySigner>().map(NetworkSigner::Evm).map_err(|e| e.to_string())
            } else {
                Self::solana_keypair_from_base58(raw_key).map(NetworkSigner::Solana)
            };

            match loaded {
                Ok(signer) => {
                    info!("wallet loaded for {network}: {}", signer.address());
                    signers.insert(network, signer);
                }
                Err(e) => warn!("failed to load private key for {network}, disabling network: {e}"),
            }
        }

        Self { signers }
    }

    pub fn signer(&self, network: Network) -> Option<&NetworkSigner> {
        self.signers.get(&network)
    }

    pub fn address(&self, network: Network) -> Option<String> {
        self.signers.get(&network).map(NetworkSigner::address)
    }

    fn solana_keypair_from_base58(private_key: &str) -> Result<Keypair, String> {
        let decoded = bs58::decode(private_key)
            .into_vec()
            .map_err(|e| format!("failed to decode base58 private key: {e}"))?;

        if decoded.len() != 64 {
            return Err(format!(
                "invalid private key length: expected 64 bytes, got {}",
                decoded.len()
            ));
        }

        Keypair::from_bytes(&decoded).map_err(|e| format!("failed to build keypair from bytes: {e}"))
    }
}
