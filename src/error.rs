//! Error taxonomy for the trade execution core.
//!
//! Errors never cross the public surface as exceptions: the Trading Service
//! converts every `TradeError` into a structured `TradeOutcome` (see
//! `trading_service.rs`), and the Request Boundary converts `ServiceError`
//! into whatever shape the HTTP layer wants. Nothing here panics.

use thiserror::Error;

/// Errors surfaced by the Trading Service / DEX adapters (`spec.md` §7).
#[derive(Debug, Clone, Error)]
pub enum TradeError {
    #[error("network unavailable: missing RPC endpoint or signing key")]
    NetworkUnavailable,

    #[error("invalid address for network: {0}")]
    InvalidAddress(String),

    #[error("estimated gas cost ${gas_fee_usd} exceeds ratio {ratio:.4} of ${amount_usd} trade (max {max_ratio})")]
    GasTooHigh {
        gas_fee_usd: String,
        amount_usd: String,
        ratio: f64,
        max_ratio: f64,
    },

    #[error("token does not implement decimals()")]
    InvalidToken,

    #[error("no liquidity available for this pair")]
    NoLiquidity,

    #[error("no V3 pool available at any fee tier")]
    NoV3Pool,

    #[error("unrecognized trade interval: {0}")]
    InvalidInterval(String),

    #[error("dex version v4 is not implemented")]
    NotImplemented,

    #[error("adapter error: {0}")]
    AdapterError(String),

    #[error("no active config for this network")]
    NoActiveConfig,
}

impl TradeError {
    /// Stable machine-readable kind, used by callers that need to branch on
    /// the error without matching the whole enum (e.g. the scheduler's
    /// terminal-log writer).
    pub fn kind(&self) -> &'static str {
        match self {
            TradeError::NetworkUnavailable => "NetworkUnavailable",
            TradeError::InvalidAddress(_) => "InvalidAddress",
            TradeError::GasTooHigh { .. } => "GasTooHigh",
            TradeError::InvalidToken => "InvalidToken",
            TradeError::NoLiquidity => "NoLiquidity",
            TradeError::NoV3Pool => "NoV3Pool",
            TradeError::InvalidInterval(_) => "InvalidInterval",
            TradeError::NotImplemented => "NotImplemented",
            TradeError::AdapterError(_) => "AdapterError",
            TradeError::NoActiveConfig => "NoActiveConfig",
        }
    }
}

/// Errors surfaced by the Trade Journal.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("no row found")]
    NotFound,

    #[error("trade log is already terminal and cannot be updated again")]
    AlreadyTerminal,

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Decimal(#[from] bigdecimal::ParseBigDecimalError),
}

/// Top-level error for the Request Boundary: wraps the typed domain errors
/// plus anything unexpected, mirroring the teacher's convention of
/// `anyhow::Result` at the outermost call sites around typed errors defined
/// closer to the domain.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Trade(#[from] TradeError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
