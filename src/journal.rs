//! Trade Journal — `spec.md` §4.7. Owns all durable state (configs, bot
//! status, trade logs) behind a single SQLite connection, in the teacher's
//! `Arc<Mutex<Connection>>` style (see `mev_database_tracker.rs`), wrapped
//! in `spawn_blocking` so callers on the async side never block a runtime
//! thread on a `rusqlite` call.

use crate::decimal::{self, usd};
use crate::error::JournalError;
use crate::models::{
    BotStatus, NetworkStats, NewTradeConfig, NewTradeLog, TerminalTradeLog, TradeConfig, TradeInterval, TradeLog, TradeStatus, TradeType,
};
use crate::network::{Dex, DexVersion, Network};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SCHEMA: &str = include_str!("../data/journal_schema.sql");

/// The Journal's contract, abstracted so the Scheduler and Request Boundary
/// depend on behavior rather than the SQLite implementation.
#[async_trait]
pub trait TradeJournal: Send + Sync {
    async fn create_config(&self, new: NewTradeConfig) -> Result<TradeConfig, JournalError>;
    async fn get_active_config(&self, user_id: &str, network: Network) -> Option<TradeConfig>;
    async fn get_config_by_id(&self, user_id: &str, network: Network, config_id: Uuid) -> Option<TradeConfig>;
    async fn get_all_active_configs(&self, user_id: &str) -> Result<Vec<TradeConfig>, JournalError>;
    async fn get_all_configs(&self, user_id: &str) -> Result<Vec<TradeConfig>, JournalError>;

    async fn create_trade_log(&self, new: NewTradeLog) -> Result<Uuid, JournalError>;
    async fn update_trade_log(&self, id: Uuid, terminal: TerminalTradeLog) -> Result<TradeLog, JournalError>;
    async fn get_recent_trades(&self, user_id: &str, limit: u32) -> Result<Vec<TradeLog>, JournalError>;
    async fn get_all_trades(&self, user_id: &str) -> Result<Vec<TradeLog>, JournalError>;
    async fn get_network_stats(&self, user_id: &str) -> Result<Vec<NetworkStats>, JournalError>;

    async fn upsert_bot_status(&self, status: BotStatus) -> Result<(), JournalError>;
    async fn update_bot_status(&self, user_id: &str, network: Network, status: BotStatus) -> Result<(), JournalError>;
    /// `next_trade_at` is `None` for a trade with no schedule of its own
    /// (a manual trade) — the bot's existing next-tick time, if any, is
    /// left untouched.
    async fn advance_bot_status_after_trade(
        &self,
        user_id: &str,
        network: Network,
        succeeded: bool,
        amount_usd: &BigDecimal,
        next_trade_at: Option<DateTime<Utc>>,
    ) -> Result<(), JournalError>;
    async fn get_all_bot_statuses(&self, user_id: &str) -> Result<Vec<BotStatus>, JournalError>;
    async fn running_bot_statuses(&self) -> Result<Vec<BotStatus>, JournalError>;
}

pub struct SqliteTradeJournal {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTradeJournal {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, JournalError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    pub fn open_in_memory() -> Result<Self, JournalError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, JournalError>
    where
        F: FnOnce(&Connection) -> Result<T, JournalError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().expect("journal connection mutex poisoned");
            f(&conn)
        })
        .await
        .expect("journal blocking task panicked")
    }
}

fn row_to_config(row: &Row) -> rusqlite::Result<TradeConfig> {
    Ok(TradeConfig {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        user_id: row.get(1)?,
        network: parse_network(&row.get::<_, String>(2)?),
        contract_address: row.get(3)?,
        wallet_address: row.get(4)?,
        dex: parse_dex(&row.get::<_, String>(5)?),
        dex_version: parse_dex_version(&row.get::<_, String>(6)?),
        trade_interval: TradeInterval::parse(&row.get::<_, String>(7)?).unwrap_or(TradeInterval::OneHour),
        trade_amount_usd: decimal::parse(&row.get::<_, String>(8)?),
        max_gas_ratio: row.get(9)?,
        slippage_tolerance: row.get(10)?,
        is_active: row.get::<_, i64>(11)? != 0,
        created_at: parse_timestamp(&row.get::<_, String>(12)?),
        updated_at: parse_timestamp(&row.get::<_, String>(13)?),
    })
}

fn row_to_trade_log(row: &Row) -> rusqlite::Result<TradeLog> {
    Ok(TradeLog {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        user_id: row.get(1)?,
        config_id: row.get::<_, Option<String>>(2)?.and_then(|s| Uuid::parse_str(&s).ok()),
        network: parse_network(&row.get::<_, String>(3)?),
        dex: parse_dex(&row.get::<_, String>(4)?),
        token_address: row.get(5)?,
        trade_type: if row.get::<_, String>(6)? == "automated" { TradeType::Automated } else { TradeType::Manual },
        amount_usd: decimal::parse(&row.get::<_, String>(7)?),
        token_amount: row.get::<_, Option<String>>(8)?.map(|s| decimal::parse(&s)),
        gas_fee: row.get::<_, Option<String>>(9)?.map(|s| decimal::parse(&s)),
        gas_fee_usd: row.get::<_, Option<String>>(10)?.map(|s| decimal::parse(&s)),
        status: parse_trade_status(&row.get::<_, String>(11)?),
        tx_hash: row.get(12)?,
        error_message: row.get(13)?,
        slippage: row.get(14)?,
        token_price: row.get::<_, Option<String>>(15)?.map(|s| decimal::parse(&s)),
        created_at: parse_timestamp(&row.get::<_, String>(16)?),
    })
}

fn row_to_bot_status(row: &Row) -> rusqlite::Result<BotStatus> {
    Ok(BotStatus {
        user_id: row.get(0)?,
        network: parse_network(&row.get::<_, String>(1)?),
        is_running: row.get::<_, i64>(2)? != 0,
        active_config_id: row.get::<_, Option<String>>(3)?.and_then(|s| Uuid::parse_str(&s).ok()),
        last_trade_at: row.get::<_, Option<String>>(4)?.map(|s| parse_timestamp(&s)),
        next_trade_at: row.get::<_, Option<String>>(5)?.map(|s| parse_timestamp(&s)),
        total_trades_count: row.get::<_, i64>(6)? as u64,
        successful_trades_count: row.get::<_, i64>(7)? as u64,
        failed_trades_count: row.get::<_, i64>(8)? as u64,
        total_volume_usd: decimal::parse(&row.get::<_, String>(9)?),
    })
}

fn parse_network(raw: &str) -> Network {
    match raw {
        "ETH" => Network::Eth,
        "BASE" => Network::Base,
        "BNB" => Network::Bnb,
        _ => Network::Sol,
    }
}

fn parse_dex(raw: &str) -> Dex {
    match raw {
        "uniswap" => Dex::Uniswap,
        "pancakeswap" => Dex::PancakeSwap,
        _ => Dex::Jupiter,
    }
}

fn parse_dex_version(raw: &str) -> DexVersion {
    match raw {
        "v2" => DexVersion::V2,
        "v3" => DexVersion::V3,
        "v4" => DexVersion::V4,
        _ => DexVersion::Auto,
    }
}

fn parse_trade_status(raw: &str) -> TradeStatus {
    match raw {
        "success" => TradeStatus::Success,
        "failed" => TradeStatus::Failed,
        _ => TradeStatus::Pending,
    }
}

fn trade_status_str(status: TradeStatus) -> &'static str {
    match status {
        TradeStatus::Pending => "pending",
        TradeStatus::Success => "success",
        TradeStatus::Failed => "failed",
    }
}

fn trade_type_str(t: TradeType) -> &'static str {
    match t {
        TradeType::Automated => "automated",
        TradeType::Manual => "manual",
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)).unwrap_or_else(|_| Utc::now())
}

fn dex_version_str(v: DexVersion) -> &'static str {
    match v {
        DexVersion::Auto => "auto",
        DexVersion::V2 => "v2",
        DexVersion::V3 => "v3",
        DexVersion::V4 => "v4",
    }
}

fn dex_str(d: Dex) -> &'static str {
    match d {
        Dex::Uniswap => "uniswap",
        Dex::PancakeSwap => "pancakeswap",
        Dex::Jupiter => "jupiter",
    }
}

const CONFIG_COLUMNS: &str =
    "id, user_id, network, contract_address, wallet_address, dex, dex_version, trade_interval, trade_amount_usd, max_gas_ratio, slippage_tolerance, is_active, created_at, updated_at";
const TRADE_LOG_COLUMNS: &str =
    "id, user_id, config_id, network, dex, token_address, trade_type, amount_usd, token_amount, gas_fee, gas_fee_usd, status, tx_hash, error_message, slippage, token_price, created_at";
const BOT_STATUS_COLUMNS: &str =
    "user_id, network, is_running, active_config_id, last_trade_at, next_trade_at, total_trades_count, successful_trades_count, failed_trades_count, total_volume_usd";

#[async_trait]
impl TradeJournal for SqliteTradeJournal {
    /// Transactionally deactivates any existing active config for this
    /// `(userId, network)` before inserting the new one, so the partial
    /// unique index never sees two rows with `is_active = 1` even under
    /// concurrent callers (`spec.md` §4.7 `createConfig`).
    async fn create_config(&self, new: NewTradeConfig) -> Result<TradeConfig, JournalError> {
        new.validate().map_err(JournalError::Invalid)?;
        let id = Uuid::new_v4();
        let now = Utc::now();

        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "UPDATE trade_configs SET is_active = 0 WHERE user_id = ?1 AND network = ?2 AND is_active = 1",
                params![new.user_id, new.network.to_string()],
            )?;
            tx.execute(
                &format!("INSERT INTO trade_configs ({CONFIG_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,1,?12,?12)"),
                params![
                    id.to_string(),
                    new.user_id,
                    new.network.to_string(),
                    new.contract_address,
                    new.wallet_address,
                    dex_str(new.dex),
                    dex_version_str(new.dex_version),
                    new.trade_interval.as_str(),
                    usd(&new.trade_amount_usd).to_string(),
                    new.max_gas_ratio,
                    new.slippage_tolerance,
                    now.to_rfc3339(),
                ],
            )?;
            tx.commit()?;

            Ok(TradeConfig {
                id,
                user_id: new.user_id,
                network: new.network,
                contract_address: new.contract_address,
                wallet_address: new.wallet_address,
                dex: new.dex,
                dex_version: new.dex_version,
                trade_interval: new.trade_interval,
                trade_amount_usd: usd(&new.trade_amount_usd),
                max_gas_ratio: new.max_gas_ratio,
                slippage_tolerance: new.slippage_tolerance,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn get_active_config(&self, user_id: &str, network: Network) -> Option<TradeConfig> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {CONFIG_COLUMNS} FROM trade_configs WHERE user_id = ?1 AND network = ?2 AND is_active = 1"),
                params![user_id, network.to_string()],
                row_to_config,
            )
            .optional()
            .map_err(JournalError::from)
        })
        .await
        .ok()
        .flatten()
    }

    async fn get_config_by_id(&self, user_id: &str, network: Network, config_id: Uuid) -> Option<TradeConfig> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("SELECT {CONFIG_COLUMNS} FROM trade_configs WHERE id = ?1 AND user_id = ?2 AND network = ?3"),
                params![config_id.to_string(), user_id, network.to_string()],
                row_to_config,
            )
            .optional()
            .map_err(JournalError::from)
        })
        .await
        .ok()
        .flatten()
    }

    async fn get_all_active_configs(&self, user_id: &str) -> Result<Vec<TradeConfig>, JournalError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {CONFIG_COLUMNS} FROM trade_configs WHERE user_id = ?1 AND is_active = 1"))?;
            let rows = stmt.query_map(params![user_id], row_to_config)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(JournalError::from)
        })
        .await
    }

    async fn get_all_configs(&self, user_id: &str) -> Result<Vec<TradeConfig>, JournalError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {CONFIG_COLUMNS} FROM trade_configs WHERE user_id = ?1 ORDER BY created_at DESC"))?;
            let rows = stmt.query_map(params![user_id], row_to_config)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(JournalError::from)
        })
        .await
    }

    async fn create_trade_log(&self, new: NewTradeLog) -> Result<Uuid, JournalError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.with_conn(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO trade_logs ({TRADE_LOG_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,NULL,NULL,NULL,'pending',NULL,NULL,?9,NULL,?10)"
                ),
                params![
                    id.to_string(),
                    new.user_id,
                    new.config_id.map(|c| c.to_string()),
                    new.network.to_string(),
                    dex_str(new.dex),
                    new.token_address,
                    trade_type_str(new.trade_type),
                    usd(&new.amount_usd).to_string(),
                    new.slippage,
                    now.to_rfc3339(),
                ],
            )?;
            Ok(id)
        })
        .await
    }

    /// Single-shot: a row already in `success`/`failed` refuses a second
    /// write (`spec.md` §3 state machine invariant).
    async fn update_trade_log(&self, id: Uuid, terminal: TerminalTradeLog) -> Result<TradeLog, JournalError> {
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let current_status: String = tx
                .query_row("SELECT status FROM trade_logs WHERE id = ?1", params![id.to_string()], |r| r.get(0))
                .optional()?
                .ok_or(JournalError::NotFound)?;
            if current_status != "pending" {
                return Err(JournalError::AlreadyTerminal);
            }

            tx.execute(
                "UPDATE trade_logs SET status = ?1, tx_hash = ?2, token_amount = ?3, gas_fee = ?4, gas_fee_usd = ?5, token_price = ?6, error_message = ?7 WHERE id = ?8",
                params![
                    trade_status_str(terminal.status),
                    terminal.tx_hash,
                    terminal.token_amount.map(|v| v.to_string()),
                    terminal.gas_fee.as_ref().map(|v| decimal::gas(v).to_string()),
                    terminal.gas_fee_usd.as_ref().map(usd).map(|v| v.to_string()),
                    terminal.token_price.as_ref().map(|v| decimal::price(v).to_string()),
                    terminal.error_message,
                    id.to_string(),
                ],
            )?;
            let log = tx.query_row(&format!("SELECT {TRADE_LOG_COLUMNS} FROM trade_logs WHERE id = ?1"), params![id.to_string()], row_to_trade_log)?;
            tx.commit()?;
            Ok(log)
        })
        .await
    }

    async fn get_recent_trades(&self, user_id: &str, limit: u32) -> Result<Vec<TradeLog>, JournalError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {TRADE_LOG_COLUMNS} FROM trade_logs WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2"))?;
            let rows = stmt.query_map(params![user_id, limit], row_to_trade_log)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(JournalError::from)
        })
        .await
    }

    async fn get_all_trades(&self, user_id: &str) -> Result<Vec<TradeLog>, JournalError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {TRADE_LOG_COLUMNS} FROM trade_logs WHERE user_id = ?1 ORDER BY created_at DESC"))?;
            let rows = stmt.query_map(params![user_id], row_to_trade_log)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(JournalError::from)
        })
        .await
    }

    /// Every network is represented, zero-valued when the user has no
    /// trades on it (`spec.md` §4.7 `getNetworkStats`).
    async fn get_network_stats(&self, user_id: &str) -> Result<Vec<NetworkStats>, JournalError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stats: Vec<NetworkStats> = Network::ALL.iter().map(|n| NetworkStats::zero(*n)).collect();
            let mut stmt = conn.prepare(
                "SELECT network, status, amount_usd, gas_fee, gas_fee_usd FROM trade_logs WHERE user_id = ?1 AND status != 'pending'",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok((
                    parse_network(&row.get::<_, String>(0)?),
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?;

            for row in rows {
                let (network, status, amount_usd, gas_fee, gas_fee_usd) = row?;
                let entry = stats.iter_mut().find(|s| s.network == network).expect("all networks present");
                entry.total_trades += 1;
                if status == "success" {
                    entry.successful_trades += 1;
                } else {
                    entry.failed_trades += 1;
                }
                entry.total_amount_usd += decimal::parse(&amount_usd);
                if let Some(fee) = gas_fee {
                    entry.total_gas_fee += decimal::parse(&fee);
                }
                if let Some(fee_usd) = gas_fee_usd {
                    entry.total_gas_fee_usd += decimal::parse(&fee_usd);
                }
            }
            Ok(stats)
        })
        .await
    }

    async fn upsert_bot_status(&self, status: BotStatus) -> Result<(), JournalError> {
        self.with_conn(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO bot_status ({BOT_STATUS_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
                     ON CONFLICT(user_id, network) DO UPDATE SET
                        is_running = excluded.is_running,
                        active_config_id = excluded.active_config_id,
                        last_trade_at = excluded.last_trade_at,
                        next_trade_at = excluded.next_trade_at,
                        total_trades_count = excluded.total_trades_count,
                        successful_trades_count = excluded.successful_trades_count,
                        failed_trades_count = excluded.failed_trades_count,
                        total_volume_usd = excluded.total_volume_usd"
                ),
                params![
                    status.user_id,
                    status.network.to_string(),
                    status.is_running as i64,
                    status.active_config_id.map(|id| id.to_string()),
                    status.last_trade_at.map(|t| t.to_rfc3339()),
                    status.next_trade_at.map(|t| t.to_rfc3339()),
                    status.total_trades_count as i64,
                    status.successful_trades_count as i64,
                    status.failed_trades_count as i64,
                    status.total_volume_usd.to_string(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_bot_status(&self, _user_id: &str, _network: Network, status: BotStatus) -> Result<(), JournalError> {
        self.upsert_bot_status(status).await
    }

    /// `spec.md` §4.6 step 7: bump counters and volume, set `lastTradeAt`
    /// and the freshly computed `nextTradeAt`, monotonically.
    async fn advance_bot_status_after_trade(
        &self,
        user_id: &str,
        network: Network,
        succeeded: bool,
        amount_usd: &BigDecimal,
        next_trade_at: Option<DateTime<Utc>>,
    ) -> Result<(), JournalError> {
        let user_id = user_id.to_string();
        let amount_usd = amount_usd.clone();
        let now = Utc::now();
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let mut current = tx
                .query_row(
                    &format!("SELECT {BOT_STATUS_COLUMNS} FROM bot_status WHERE user_id = ?1 AND network = ?2"),
                    params![user_id, network.to_string()],
                    row_to_bot_status,
                )
                .optional()?
                .unwrap_or_else(|| BotStatus::idle(user_id.clone(), network));

            current.total_trades_count += 1;
            if succeeded {
                current.successful_trades_count += 1;
                current.total_volume_usd += &amount_usd;
            } else {
                current.failed_trades_count += 1;
            }
            current.last_trade_at = Some(now);
            current.next_trade_at = next_trade_at.or(current.next_trade_at);

            tx.execute(
                &format!(
                    "INSERT INTO bot_status ({BOT_STATUS_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
                     ON CONFLICT(user_id, network) DO UPDATE SET
                        last_trade_at = excluded.last_trade_at,
                        next_trade_at = excluded.next_trade_at,
                        total_trades_count = excluded.total_trades_count,
                        successful_trades_count = excluded.successful_trades_count,
                        failed_trades_count = excluded.failed_trades_count,
                        total_volume_usd = excluded.total_volume_usd"
                ),
                params![
                    current.user_id,
                    current.network.to_string(),
                    current.is_running as i64,
                    current.active_config_id.map(|id| id.to_string()),
                    current.last_trade_at.map(|t| t.to_rfc3339()),
                    current.next_trade_at.map(|t| t.to_rfc3339()),
                    current.total_trades_count as i64,
                    current.successful_trades_count as i64,
                    current.failed_trades_count as i64,
                    current.total_volume_usd.to_string(),
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_all_bot_statuses(&self, user_id: &str) -> Result<Vec<BotStatus>, JournalError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {BOT_STATUS_COLUMNS} FROM bot_status WHERE user_id = ?1"))?;
            let rows = stmt.query_map(params![user_id], row_to_bot_status)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(JournalError::from)
        })
        .await
    }

    async fn running_bot_statuses(&self) -> Result<Vec<BotStatus>, JournalError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {BOT_STATUS_COLUMNS} FROM bot_status WHERE is_running = 1"))?;
            let rows = stmt.query_map([], row_to_bot_status)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(JournalError::from)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Dex, DexVersion};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn sample_config(user_id: &str, network: Network) -> NewTradeConfig {
        NewTradeConfig {
            user_id: user_id.to_string(),
            network,
            contract_address: format!("0x{}", "a".repeat(40)),
            wallet_address: format!("0x{}", "b".repeat(40)),
            dex: network.default_dex(),
            dex_version: DexVersion::Auto,
            trade_interval: TradeInterval::OneHour,
            trade_amount_usd: BigDecimal::from_str("10").unwrap(),
            max_gas_ratio: 0.5,
            slippage_tolerance: 1.0,
        }
    }

    #[tokio::test]
    async fn creating_a_second_active_config_deactivates_the_first() {
        let journal = SqliteTradeJournal::open_in_memory().unwrap();
        let first = journal.create_config(sample_config("alice", Network::Eth)).await.unwrap();
        let second = journal.create_config(sample_config("alice", Network::Eth)).await.unwrap();

        let all = journal.get_all_configs("alice").await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(!all.iter().find(|c| c.id == first.id).unwrap().is_active);

        let active = journal.get_active_config("alice", Network::Eth).await.unwrap();
        assert_eq!(active.id, second.id);
    }

    #[tokio::test]
    async fn updating_a_terminal_trade_log_twice_fails() {
        let journal = SqliteTradeJournal::open_in_memory().unwrap();
        let id = journal
            .create_trade_log(NewTradeLog {
                user_id: "alice".to_string(),
                config_id: None,
                network: Network::Eth,
                dex: Dex::Uniswap,
                token_address: format!("0x{}", "a".repeat(40)),
                trade_type: TradeType::Manual,
                amount_usd: BigDecimal::from(10),
                slippage: 1.0,
            })
            .await
            .unwrap();

        let terminal = TerminalTradeLog {
            status: TradeStatus::Success,
            tx_hash: Some("0xdead".to_string()),
            token_amount: Some(BigDecimal::from(5)),
            gas_fee: Some(BigDecimal::from(0)),
            gas_fee_usd: Some(BigDecimal::from(0)),
            token_price: Some(BigDecimal::from(2)),
            error_message: None,
        };
        journal.update_trade_log(id, terminal.clone()).await.unwrap();
        let second = journal.update_trade_log(id, terminal).await;
        assert!(matches!(second, Err(JournalError::AlreadyTerminal)));
    }

    #[tokio::test]
    async fn network_stats_includes_every_network_even_with_no_trades() {
        let journal = SqliteTradeJournal::open_in_memory().unwrap();
        let stats = journal.get_network_stats("alice").await.unwrap();
        assert_eq!(stats.len(), Network::ALL.len());
        assert!(stats.iter().all(|s| s.total_trades == 0));
    }
}
