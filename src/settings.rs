//! Ambient configuration, loaded once at startup (`spec.md` §4.9).
//!
//! Follows the teacher's `dotenvy` + `std::env` convention rather than
//! introducing a layered config crate: a missing per-network RPC URL or
//! private key degrades that network to unavailable instead of aborting
//! startup, since a tenant may only use a subset of the four chains.

use crate::network::Network;
use std::collections::HashMap;
use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub session_secret: String,
    pub http_addr: String,
    pub price_source_url: String,
    pub rpc_urls: HashMap<Network, String>,
    pub private_keys: HashMap<Network, String>,
}

impl Settings {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "trade_exec.db".to_string());
        let session_secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            warn!("SESSION_SECRET not set, using an insecure development default");
            "dev-secret-do-not-use-in-production".to_string()
        });
        let http_addr = env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let price_source_url = env::var("PRICE_SOURCE_URL")
            .unwrap_or_else(|_| "https://api.coingecko.com/api/v3/simple/price".to_string());

        let mut rpc_urls = HashMap::new();
        let mut private_keys = HashMap::new();
        for network in Network::ALL {
            let suffix = network.env_suffix();
            if let Ok(url) = env::var(format!("RPC_URL_{suffix}")) {
                rpc_urls.insert(network, url);
            } else {
                warn!("RPC_URL_{suffix} not set, {network} will be unavailable");
            }
            if let Ok(key) = env::var(format!("PRIVATE_KEY_{suffix}")) {
                private_keys.insert(network, key);
            } else {
                warn!("PRIVATE_KEY_{suffix} not set, {network} will be unavailable");
            }
        }

        Self {
            database_url,
            session_secret,
            http_addr,
            price_source_url,
            rpc_urls,
            private_keys,
        }
    }

    /// A network is usable only once both its RPC endpoint and signing key
    /// are configured (`spec.md` §4.9 / §7 `NetworkUnavailable`).
    pub fn is_network_available(&self, network: Network) -> bool {
        self.rpc_urls.contains_key(&network) && self.private_keys.contains_key(&network)
    }
}
