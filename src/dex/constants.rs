//! DEX routing addresses and fee tiers, one section per network, in the
//! style of the teacher's `constants.rs`.

use crate::network::Network;

// ============================================================================
// ETHEREUM MAINNET
// ============================================================================

pub const ETH_UNISWAP_V2_ROUTER: &str = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D";
pub const ETH_UNISWAP_V3_ROUTER: &str = "0xE592427A0AEce92De3Edee1F18E0157C05861564";
pub const ETH_UNISWAP_V3_QUOTER: &str = "0xb27308f9F90D607463bb33eA1BeBb41C27CE5AB6";
pub const ETH_WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";

// ============================================================================
// BASE
// ============================================================================

pub const BASE_UNISWAP_V2_ROUTER: &str = "0x4752ba5DBc23f44D87826276BF6Fd6b1C372aD24";
pub const BASE_UNISWAP_V3_ROUTER: &str = "0x2626664c2603336E57B271c5C0b26F421741e481";
pub const BASE_UNISWAP_V3_QUOTER: &str = "0x3d4e44Eb1374240CE5F1B871ab261CD16335B76a";
pub const BASE_WETH: &str = "0x4200000000000000000000000000000000000006";

/// A Base RPC provider occasionally rejects calls fired back-to-back right
/// after a fee-tier miss; spacing successive `Quoter` calls avoids that
/// without weakening the fallback semantics.
pub const BASE_V3_TIER_PAUSE_MS: u64 = 500;

// ============================================================================
// BNB SMART CHAIN
// ============================================================================

pub const BNB_PANCAKESWAP_V2_ROUTER: &str = "0x10ED43C718714eb63d5aA57B78B54704E256024E";
pub const BNB_WBNB: &str = "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c";

// ============================================================================
// SOLANA
// ============================================================================

pub const SOL_WRAPPED_SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const JUPITER_QUOTE_API: &str = "https://quote-api.jup.ag/v6/quote";
pub const JUPITER_SWAP_API: &str = "https://quote-api.jup.ag/v6/swap";

/// Uniswap V3 fee tiers, tried in this order on quote/pool-miss
/// (`spec.md` §4.4 V3 fallback).
pub const UNISWAP_V3_FEE_TIERS: [u32; 4] = [100, 500, 3000, 10000];

pub fn native_wrapped_address(network: Network) -> &'static str {
    match network {
        Network::Eth => ETH_WETH,
        Network::Base => BASE_WETH,
        Network::Bnb => BNB_WBNB,
        Network::Sol => SOL_WRAPPED_SOL_MINT,
    }
}

/// `(router, weth)` for Uniswap V2 on ETH/BASE, or PancakeSwap V2 on BNB.
pub fn v2_router(network: Network) -> Option<(&'static str, &'static str)> {
    match network {
        Network::Eth => Some((ETH_UNISWAP_V2_ROUTER, ETH_WETH)),
        Network::Base => Some((BASE_UNISWAP_V2_ROUTER, BASE_WETH)),
        Network::Bnb => Some((BNB_PANCAKESWAP_V2_ROUTER, BNB_WBNB)),
        Network::Sol => None,
    }
}

/// `(router, quoter, weth)` for Uniswap V3.
pub fn v3_router(network: Network) -> Option<(&'static str, &'static str, &'static str)> {
    match network {
        Network::Eth => Some((ETH_UNISWAP_V3_ROUTER, ETH_UNISWAP_V3_QUOTER, ETH_WETH)),
        Network::Base => Some((BASE_UNISWAP_V3_ROUTER, BASE_UNISWAP_V3_QUOTER, BASE_WETH)),
        Network::Bnb | Network::Sol => None,
    }
}
