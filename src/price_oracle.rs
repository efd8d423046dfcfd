//! USD-per-native-unit price oracle (`spec.md` §4.3).
//!
//! A thin wrapper over an external HTTP price source with a 30s memoized
//! cache (`moka`, as `gnosis-solvers` uses for its own approval-address
//! cache) keyed by source-asset id. Never propagates an error to the
//! caller: on any failure it logs and falls back to the static table.

use crate::network::Network;
use bigdecimal::BigDecimal;
use moka::future::Cache;
use reqwest::Client;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

const CACHE_TTL: Duration = Duration::from_secs(30);

fn static_fallback(network: Network) -> BigDecimal {
    let value = match network {
        Network::Eth | Network::Base => "2000",
        Network::Bnb => "600",
        Network::Sol => "150",
    };
    BigDecimal::from_str(value).expect("static fallback parses")
}

pub struct PriceOracle {
    client: Client,
    source_url: String,
    cache: Cache<String, BigDecimal>,
}

impl PriceOracle {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("http client builds"),
            source_url: source_url.into(),
            cache: Cache::builder().time_to_live(CACHE_TTL).build(),
        }
    }

    /// USD per one unit of `network`'s native asset. Infallible: errors
    /// degrade to the static fallback rather than propagating.
    pub async fn get_price(&self, network: Network) -> BigDecimal {
        let source_id = network.price_source_id();

        if let Some(cached) = self.cache.get(source_id).await {
            return cached;
        }

        match self.fetch_price(source_id).await {
            Ok(price) => {
                self.cache.insert(source_id.to_string(), price.clone()).await;
                price
            }
            Err(e) => {
                warn!("price oracle fetch failed for {source_id}, using static fallback: {e}");
                static_fallback(network)
            }
        }
    }

    async fn fetch_price(&self, source_id: &str) -> anyhow::Result<BigDecimal> {
        let response = self
            .client
            .get(&self.source_url)
            .query(&[("ids", source_id), ("vs_currencies", "usd")])
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        let price = body
            .get(source_id)
            .and_then(|v| v.get("usd"))
            .ok_or_else(|| anyhow::anyhow!("missing price field for {source_id}"))?;

        let text = match price {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.clone(),
            other => anyhow::bail!("unexpected price shape: {other}"),
        };

        Ok(BigDecimal::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_table_matches_spec() {
        assert_eq!(static_fallback(Network::Eth), BigDecimal::from_str("2000").unwrap());
        assert_eq!(static_fallback(Network::Base), BigDecimal::from_str("2000").unwrap());
        assert_eq!(static_fallback(Network::Bnb), BigDecimal::from_str("600").unwrap());
        assert_eq!(static_fallback(Network::Sol), BigDecimal::from_str("150").unwrap());
    }

    #[tokio::test]
    async fn unreachable_source_degrades_to_fallback() {
        let oracle = PriceOracle::new("http://127.0.0.1:0/unreachable");
        let price = oracle.get_price(Network::Sol).await;
        assert_eq!(price, static_fallback(Network::Sol));
    }
}
