//! The four entities the Trade Journal owns (`spec.md` §3).

use crate::network::{Dex, DexVersion, Network};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = String;

/// One of `1min,5min,10min,30min,1hour` (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeInterval {
    OneMinute,
    FiveMinutes,
    TenMinutes,
    ThirtyMinutes,
    OneHour,
}

impl TradeInterval {
    pub fn parse(raw: &str) -> Option<TradeInterval> {
        match raw {
            "1min" => Some(TradeInterval::OneMinute),
            "5min" => Some(TradeInterval::FiveMinutes),
            "10min" => Some(TradeInterval::TenMinutes),
            "30min" => Some(TradeInterval::ThirtyMinutes),
            "1hour" => Some(TradeInterval::OneHour),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TradeInterval::OneMinute => "1min",
            TradeInterval::FiveMinutes => "5min",
            TradeInterval::TenMinutes => "10min",
            TradeInterval::ThirtyMinutes => "30min",
            TradeInterval::OneHour => "1hour",
        }
    }

    /// Period between ticks. Used together with `next_aligned_boundary` to
    /// fire on wall-clock boundaries rather than `start_time + n*period`.
    pub fn period_minutes(self) -> i64 {
        match self {
            TradeInterval::OneMinute => 1,
            TradeInterval::FiveMinutes => 5,
            TradeInterval::TenMinutes => 10,
            TradeInterval::ThirtyMinutes => 30,
            TradeInterval::OneHour => 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeConfig {
    pub id: Uuid,
    pub user_id: UserId,
    pub network: Network,
    pub contract_address: String,
    pub wallet_address: String,
    pub dex: Dex,
    pub dex_version: DexVersion,
    pub trade_interval: TradeInterval,
    pub trade_amount_usd: BigDecimal,
    pub max_gas_ratio: f64,
    pub slippage_tolerance: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by a caller creating a config; `id`/timestamps/`is_active`
/// are assigned by the Journal.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTradeConfig {
    pub user_id: UserId,
    pub network: Network,
    pub contract_address: String,
    pub wallet_address: String,
    pub dex: Dex,
    pub dex_version: DexVersion,
    pub trade_interval: TradeInterval,
    pub trade_amount_usd: BigDecimal,
    pub max_gas_ratio: f64,
    pub slippage_tolerance: f64,
}

impl NewTradeConfig {
    /// Validation shared by `configs` create and manual-trade parameter
    /// parsing (`spec.md` §3 field constraints).
    pub fn validate(&self) -> Result<(), String> {
        if self.trade_amount_usd < BigDecimal::from(1) {
            return Err("tradeAmountUsd must be >= 1".to_string());
        }
        if !(0.1..=1.0).contains(&self.max_gas_ratio) {
            return Err("maxGasRatio must be in [0.1, 1.0]".to_string());
        }
        if !(self.slippage_tolerance > 0.0 && self.slippage_tolerance <= 50.0) {
            return Err("slippageTolerance must be in (0, 50]".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotStatus {
    pub user_id: UserId,
    pub network: Network,
    pub is_running: bool,
    pub active_config_id: Option<Uuid>,
    pub last_trade_at: Option<DateTime<Utc>>,
    pub next_trade_at: Option<DateTime<Utc>>,
    pub total_trades_count: u64,
    pub successful_trades_count: u64,
    pub failed_trades_count: u64,
    pub total_volume_usd: BigDecimal,
}

impl BotStatus {
    pub fn idle(user_id: UserId, network: Network) -> Self {
        Self {
            user_id,
            network,
            is_running: false,
            active_config_id: None,
            last_trade_at: None,
            next_trade_at: None,
            total_trades_count: 0,
            successful_trades_count: 0,
            failed_trades_count: 0,
            total_volume_usd: BigDecimal::from(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Automated,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeLog {
    pub id: Uuid,
    pub user_id: UserId,
    pub config_id: Option<Uuid>,
    pub network: Network,
    pub dex: Dex,
    pub token_address: String,
    pub trade_type: TradeType,
    pub amount_usd: BigDecimal,
    pub token_amount: Option<BigDecimal>,
    pub gas_fee: Option<BigDecimal>,
    pub gas_fee_usd: Option<BigDecimal>,
    pub status: TradeStatus,
    pub tx_hash: Option<String>,
    pub error_message: Option<String>,
    pub slippage: f64,
    pub token_price: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to open a `pending` trade log (`spec.md` §4.6 step 1 /
/// `spec.md` §4.7).
#[derive(Debug, Clone)]
pub struct NewTradeLog {
    pub user_id: UserId,
    pub config_id: Option<Uuid>,
    pub network: Network,
    pub dex: Dex,
    pub token_address: String,
    pub trade_type: TradeType,
    pub amount_usd: BigDecimal,
    pub slippage: f64,
}

/// Terminal fields written once a trade resolves (`spec.md` §3 state
/// machine: `pending -> success` or `pending -> failed`, never again).
#[derive(Debug, Clone)]
pub struct TerminalTradeLog {
    pub status: TradeStatus,
    pub tx_hash: Option<String>,
    pub token_amount: Option<BigDecimal>,
    pub gas_fee: Option<BigDecimal>,
    pub gas_fee_usd: Option<BigDecimal>,
    pub token_price: Option<BigDecimal>,
    pub error_message: Option<String>,
}

/// Per-network aggregation returned by `trades.networkStats` (`spec.md` §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkStats {
    pub network: Network,
    pub total_trades: u64,
    pub successful_trades: u64,
    pub failed_trades: u64,
    pub total_gas_fee: BigDecimal,
    pub total_gas_fee_usd: BigDecimal,
    pub total_amount_usd: BigDecimal,
}

impl NetworkStats {
    pub fn zero(network: Network) -> Self {
        Self {
            network,
            total_trades: 0,
            successful_trades: 0,
            failed_trades: 0,
            total_gas_fee: BigDecimal::from(0),
            total_gas_fee_usd: BigDecimal::from(0),
            total_amount_usd: BigDecimal::from(0),
        }
    }
}
