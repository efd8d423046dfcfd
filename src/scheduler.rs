//! Bot Scheduler — `spec.md` §4.6: per-`(userId, network)` recurring task
//! owner. The in-memory map is a cache of `BotStatus`; it is authoritative
//! for "is a tick currently scheduled" and is reconciled from the Journal
//! on startup (`spec.md` §5).

use crate::journal::TradeJournal;
use crate::models::{BotStatus, NewTradeLog, TerminalTradeLog, TradeConfig, TradeInterval, TradeStatus, TradeType};
use crate::network::Network;
use crate::notifications::{Event, NotificationBus};
use crate::trading_service::{TradeParams, TradingService};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

type SchedulerKey = (String, Network);

struct ScheduledTask {
    handle: JoinHandle<()>,
    config_id: uuid::Uuid,
}

pub struct BotScheduler {
    journal: Arc<dyn TradeJournal>,
    trading_service: Arc<TradingService>,
    notifications: Arc<NotificationBus>,
    tasks: Mutex<HashMap<SchedulerKey, ScheduledTask>>,
}

impl BotScheduler {
    pub fn new(journal: Arc<dyn TradeJournal>, trading_service: Arc<TradingService>, notifications: Arc<NotificationBus>) -> Arc<Self> {
        Arc::new(Self {
            journal,
            trading_service,
            notifications,
            tasks: Mutex::new(HashMap::new()),
        })
    }

    /// Re-installs timers for every `BotStatus` row left `isRunning=true` by
    /// a prior process. Rows whose active config has since been deleted are
    /// forced back to `isRunning=false` (`spec.md` §5).
    pub async fn reconcile_on_startup(self: &Arc<Self>) {
        let running = match self.journal.running_bot_statuses().await {
            Ok(rows) => rows,
            Err(e) => {
                error!("startup reconciliation: failed to read bot statuses: {e}");
                return;
            }
        };

        for status in running {
            let config = match status.active_config_id {
                Some(config_id) => self.journal.get_config_by_id(&status.user_id, status.network, config_id).await,
                None => None,
            };
            let Some(config) = config else {
                warn!("startup reconciliation: active config missing for {}/{}, forcing stopped", status.user_id, status.network);
                let _ = self
                    .journal
                    .update_bot_status(&status.user_id, status.network, BotStatus { is_running: false, next_trade_at: None, ..status })
                    .await;
                continue;
            };

            info!("startup reconciliation: re-installing timer for {}/{}", status.user_id, status.network);
            if let Err(e) = self.start_bot(status.user_id.clone(), config).await {
                error!("startup reconciliation: failed to restart {}/{}: {e}", status.user_id, status.network);
            }
        }
    }

    /// Idempotent: an existing entry for `(userId, network)` is cancelled
    /// before the new one is installed (`spec.md` §4.6, §8 invariant 6).
    pub async fn start_bot(self: &Arc<Self>, user_id: String, cfg: TradeConfig) -> Result<(), String> {
        let period_minutes = cfg.trade_interval.period_minutes();
        if period_minutes <= 0 {
            return Err(format!("unrecognized trade interval: {}", cfg.trade_interval.as_str()));
        }

        let key: SchedulerKey = (user_id.clone(), cfg.network);
        let mut tasks = self.tasks.lock().await;
        if let Some(existing) = tasks.remove(&key) {
            existing.handle.abort();
        }

        let next_trade_at = next_aligned_boundary(cfg.trade_interval, Utc::now());
        if let Err(e) = self
            .journal
            .upsert_bot_status(BotStatus {
                is_running: true,
                active_config_id: Some(cfg.id),
                next_trade_at: Some(next_trade_at),
                ..BotStatus::idle(user_id.clone(), cfg.network)
            })
            .await
        {
            return Err(e.to_string());
        }
        self.notifications
            .broadcast(&user_id, Event::BotStatus { network: cfg.network, is_running: true })
            .await;

        let scheduler = self.clone();
        let config_id = cfg.id;
        let loop_user_id = user_id.clone();
        let handle = tokio::spawn(async move {
            scheduler.run_loop(loop_user_id, cfg).await;
        });

        tasks.insert(key, ScheduledTask { handle, config_id });
        Ok(())
    }

    /// Idempotent: stopping a key with no scheduled task is a no-op
    /// (`spec.md` §8 round-trip property).
    pub async fn stop_bot(self: &Arc<Self>, user_id: &str, network: Network) {
        let key = (user_id.to_string(), network);
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.remove(&key) {
            task.handle.abort();
        }
        if let Err(e) = self
            .journal
            .update_bot_status(user_id, network, BotStatus { is_running: false, next_trade_at: None, ..BotStatus::idle(user_id.to_string(), network) })
            .await
        {
            warn!("stop_bot: failed to persist stopped status for {user_id}/{network}: {e}");
        }
        self.notifications.broadcast(user_id, Event::BotStatus { network, is_running: false }).await;
    }

    pub async fn is_running(&self, user_id: &str, network: Network) -> bool {
        self.tasks.lock().await.contains_key(&(user_id.to_string(), network))
    }

    /// A single bot's lifetime loop. Each iteration sleeps until the next
    /// wall-clock boundary, then runs one trade to completion before
    /// computing the next boundary — this is what gives non-reentrant
    /// execution without an explicit lock: a tick that would have fired
    /// mid-execution is simply never scheduled (`spec.md` §4.6 overlap
    /// policy, "simplest conformant design").
    async fn run_loop(self: Arc<Self>, user_id: String, mut cfg: TradeConfig) {
        loop {
            let now = Utc::now();
            let target = next_aligned_boundary(cfg.trade_interval, now);
            let wait = (target - now).to_std().unwrap_or(std::time::Duration::from_secs(1));
            tokio::time::sleep(wait).await;

            if let Some(refreshed) = self.journal.get_active_config(&user_id, cfg.network).await {
                if refreshed.id != cfg.id {
                    // A newer config took over this key; our own task will
                    // have been aborted by `start_bot`'s restart, but guard
                    // anyway in case reconciliation raced ahead of it.
                    return;
                }
                cfg = refreshed;
            }

            self.execute_scheduled_trade(&user_id, &cfg).await;
        }
    }

    /// Tick handler (`spec.md` §4.6 `executeScheduledTrade`).
    async fn execute_scheduled_trade(&self, user_id: &str, cfg: &TradeConfig) {
        let log_id = match self
            .journal
            .create_trade_log(NewTradeLog {
                user_id: user_id.to_string(),
                config_id: Some(cfg.id),
                network: cfg.network,
                dex: cfg.dex,
                token_address: cfg.contract_address.clone(),
                trade_type: TradeType::Automated,
                amount_usd: cfg.trade_amount_usd.clone(),
                slippage: cfg.slippage_tolerance,
            })
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!("failed to create trade log for {user_id}/{}: {e}", cfg.network);
                return;
            }
        };

        let params = TradeParams {
            network: cfg.network,
            contract_address: cfg.contract_address.clone(),
            wallet_address: cfg.wallet_address.clone(),
            dex_version: cfg.dex_version,
            amount_usd: cfg.trade_amount_usd.clone(),
            slippage_tolerance: cfg.slippage_tolerance,
            max_gas_ratio: cfg.max_gas_ratio,
        };

        let terminal = match self.trading_service.execute_trade(params).await {
            Ok(outcome) => TerminalTradeLog {
                status: TradeStatus::Success,
                tx_hash: Some(outcome.tx_hash),
                token_amount: Some(outcome.token_amount),
                gas_fee: Some(outcome.gas_fee),
                gas_fee_usd: Some(outcome.gas_fee_usd),
                token_price: Some(outcome.token_price),
                error_message: None,
            },
            Err(e) => TerminalTradeLog {
                status: TradeStatus::Failed,
                tx_hash: None,
                token_amount: None,
                gas_fee: None,
                gas_fee_usd: None,
                token_price: None,
                error_message: Some(e.to_string()),
            },
        };

        let succeeded = terminal.status == TradeStatus::Success;

        // Step 6: any failure past this point (e.g. a journal write) must
        // still leave this attempt terminal-and-failed, not dangling pending.
        let log = match self.journal.update_trade_log(log_id, terminal).await {
            Ok(log) => log,
            Err(e) => {
                error!("failed to write terminal trade log {log_id} for {user_id}/{}: {e}", cfg.network);
                return;
            }
        };

        let next_trade_at = next_aligned_boundary(cfg.trade_interval, Utc::now());
        if let Err(e) = self
            .journal
            .advance_bot_status_after_trade(user_id, cfg.network, succeeded, &cfg.trade_amount_usd, Some(next_trade_at))
            .await
        {
            error!("failed to advance bot status for {user_id}/{}: {e}", cfg.network);
        }

        self.notifications.broadcast(user_id, Event::NewTrade { trade: log }).await;
        self.notifications.broadcast(user_id, Event::BotStatus { network: cfg.network, is_running: true }).await;
    }
}

/// Wall-clock cron alignment (`spec.md` §9 Open Question, resolved in favor
/// of alignment): `1min -> every minute`, `5min -> :00/:05/...`,
/// `10min -> :00/:10/...`, `30min -> :00/:30`, `1hour -> top of hour`.
fn next_aligned_boundary(interval: TradeInterval, now: DateTime<Utc>) -> DateTime<Utc> {
    let period = interval.period_minutes();
    let minute_of_day = now.hour() as i64 * 60 + now.minute() as i64;
    let next_minute_of_day = ((minute_of_day / period) + 1) * period;
    let days_forward = next_minute_of_day / (24 * 60);
    let minute_of_day = next_minute_of_day % (24 * 60);

    let date = now.date_naive() + chrono::Duration::days(days_forward);
    let time = chrono::NaiveTime::from_hms_opt((minute_of_day / 60) as u32, (minute_of_day % 60) as u32, 0).expect("in-range h/m");
    DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(time), Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ten_minute_interval_aligns_to_wall_clock() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 10, 23, 0).unwrap();
        let next = next_aligned_boundary(TradeInterval::TenMinutes, now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn one_hour_interval_aligns_to_top_of_hour_crossing_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 23, 40, 0).unwrap();
        let next = next_aligned_boundary(TradeInterval::OneHour, now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn exact_boundary_rolls_to_the_next_one() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 10, 30, 0).unwrap();
        let next = next_aligned_boundary(TradeInterval::ThirtyMinutes, now);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 1, 11, 0, 0).unwrap());
    }
}
