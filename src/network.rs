//! The closed set of supported chains and the policy tables keyed by it
//! (`spec.md` §3: address family, default DEX, retry profile).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
    Eth,
    Base,
    Bnb,
    Sol,
}

impl Network {
    pub const ALL: [Network; 4] = [Network::Eth, Network::Base, Network::Bnb, Network::Sol];

    pub fn is_evm(self) -> bool {
        !matches!(self, Network::Sol)
    }

    /// Default DEX for this network, per `spec.md` §3.
    pub fn default_dex(self) -> Dex {
        match self {
            Network::Eth | Network::Base => Dex::Uniswap,
            Network::Bnb => Dex::PancakeSwap,
            Network::Sol => Dex::Jupiter,
        }
    }

    /// Price-oracle source-asset id; ETH and BASE share the native asset.
    pub fn price_source_id(self) -> &'static str {
        match self {
            Network::Eth | Network::Base => "ethereum",
            Network::Bnb => "bnb",
            Network::Sol => "solana",
        }
    }

    pub fn env_suffix(self) -> &'static str {
        match self {
            Network::Eth => "ETH",
            Network::Base => "BASE",
            Network::Bnb => "BNB",
            Network::Sol => "SOL",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_suffix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dex {
    Uniswap,
    PancakeSwap,
    Jupiter,
}

/// `dexVersion`, meaningful only for EVM Uniswap networks (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DexVersion {
    Auto,
    V2,
    V3,
    V4,
}

impl Default for DexVersion {
    fn default() -> Self {
        DexVersion::Auto
    }
}

static EVM_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid regex"));

static SOLANA_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("valid regex"));

/// Address-family validation from `spec.md` §4.5 step 2.
pub fn is_valid_address(network: Network, address: &str) -> bool {
    if network.is_evm() {
        EVM_ADDRESS_RE.is_match(address)
    } else {
        SOLANA_ADDRESS_RE.is_match(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evm_address_boundaries() {
        let addr40 = format!("0x{}", "a".repeat(40));
        let addr39 = format!("0x{}", "a".repeat(39));
        let addr41 = format!("0x{}", "a".repeat(41));
        assert!(is_valid_address(Network::Eth, &addr40));
        assert!(!is_valid_address(Network::Eth, &addr39));
        assert!(!is_valid_address(Network::Eth, &addr41));
    }

    #[test]
    fn solana_address_boundaries() {
        let addr32 = "1".repeat(32);
        let addr31 = "1".repeat(31);
        let addr44 = "1".repeat(44);
        let addr45 = "1".repeat(45);
        assert!(is_valid_address(Network::Sol, &addr32));
        assert!(!is_valid_address(Network::Sol, &addr31));
        assert!(is_valid_address(Network::Sol, &addr44));
        assert!(!is_valid_address(Network::Sol, &addr45));
    }

    #[test]
    fn solana_address_rejects_non_base58_chars() {
        // '0', 'O', 'I', 'l' are excluded from the base58 alphabet.
        let addr = format!("{}0", "1".repeat(31));
        assert!(!is_valid_address(Network::Sol, &addr));
    }

    #[test]
    fn default_dex_table() {
        assert_eq!(Network::Eth.default_dex(), Dex::Uniswap);
        assert_eq!(Network::Base.default_dex(), Dex::Uniswap);
        assert_eq!(Network::Bnb.default_dex(), Dex::PancakeSwap);
        assert_eq!(Network::Sol.default_dex(), Dex::Jupiter);
    }
}
