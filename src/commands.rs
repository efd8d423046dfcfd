//! Request Boundary — `spec.md` §6. One method per command in the table;
//! this module is transport-agnostic (the axum routes in `bin/server.rs`
//! are thin wrappers that deserialize, call through here, and serialize).

use crate::error::{ServiceError, TradeError};
use crate::journal::TradeJournal;
use crate::models::{BotStatus, NetworkStats, NewTradeConfig, NewTradeLog, TerminalTradeLog, TradeConfig, TradeLog, TradeStatus, TradeType};
use crate::network::Network;
use crate::rpc_pool::RpcClientPool;
use crate::scheduler::BotScheduler;
use crate::trading_service::{TradeParams, TradingService};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

pub struct RequestBoundary {
    journal: Arc<dyn TradeJournal>,
    scheduler: Arc<BotScheduler>,
    trading_service: Arc<TradingService>,
    rpc_pool: Arc<RpcClientPool>,
}

/// `POST trades.manual` input (`spec.md` §6).
#[derive(Debug, Clone, Deserialize)]
pub struct ManualTradeRequest {
    pub contract_address: String,
    pub network: Network,
    #[serde(default)]
    pub dex_version: Option<crate::network::DexVersion>,
    pub amount_usd: BigDecimal,
    pub slippage_tolerance: f64,
}

impl RequestBoundary {
    pub fn new(journal: Arc<dyn TradeJournal>, scheduler: Arc<BotScheduler>, trading_service: Arc<TradingService>, rpc_pool: Arc<RpcClientPool>) -> Self {
        Self { journal, scheduler, trading_service, rpc_pool }
    }

    pub async fn bot_statuses(&self, user_id: &str) -> Result<Vec<BotStatus>, ServiceError> {
        Ok(self.journal.get_all_bot_statuses(user_id).await?)
    }

    pub async fn bot_start(&self, user_id: &str, network: Network) -> Result<(), ServiceError> {
        if !self.rpc_pool.is_available(network) {
            return Err(ServiceError::Trade(TradeError::NetworkUnavailable));
        }
        let config = self.journal.get_active_config(user_id, network).await.ok_or(TradeError::NoActiveConfig)?;
        self.scheduler
            .start_bot(user_id.to_string(), config)
            .await
            .map_err(|e| ServiceError::Other(anyhow::anyhow!(e)))
    }

    pub async fn bot_stop(&self, user_id: &str, network: Network) -> Result<(), ServiceError> {
        self.scheduler.stop_bot(user_id, network).await;
        Ok(())
    }

    pub async fn configs_active(&self, user_id: &str, network: Option<Network>) -> Result<Vec<TradeConfig>, ServiceError> {
        match network {
            Some(network) => Ok(self.journal.get_active_config(user_id, network).await.into_iter().collect()),
            None => Ok(self.journal.get_all_active_configs(user_id).await?),
        }
    }

    /// `POST configs`: persisting a new config deactivates the previously
    /// active one for that `(userId, network)` (`spec.md` §4.7); if a bot
    /// was already running on that key, restart it against the new config
    /// so scheduling picks up the change immediately.
    pub async fn create_config(&self, new: NewTradeConfig) -> Result<TradeConfig, ServiceError> {
        let user_id = new.user_id.clone();
        let network = new.network;
        let was_running = self.scheduler.is_running(&user_id, network).await;
        let config = self.journal.create_config(new).await?;

        if was_running {
            self.scheduler
                .start_bot(user_id, config.clone())
                .await
                .map_err(|e| ServiceError::Other(anyhow::anyhow!(e)))?;
        }
        Ok(config)
    }

    /// `POST trades.manual`: executes immediately, writes the terminal log,
    /// and — like the source this spec follows — still advances the
    /// `BotStatus` counters for the trade's network, leaving any scheduled
    /// next-tick time untouched.
    pub async fn trades_manual(&self, user_id: &str, request: ManualTradeRequest) -> Result<TradeLog, ServiceError> {
        let log_id = self
            .journal
            .create_trade_log(NewTradeLog {
                user_id: user_id.to_string(),
                config_id: None,
                network: request.network,
                dex: request.network.default_dex(),
                token_address: request.contract_address.clone(),
                trade_type: TradeType::Manual,
                amount_usd: request.amount_usd.clone(),
                slippage: request.slippage_tolerance,
            })
            .await?;

        let params = TradeParams {
            network: request.network,
            contract_address: request.contract_address,
            wallet_address: String::new(),
            dex_version: request.dex_version.unwrap_or_default(),
            amount_usd: request.amount_usd,
            slippage_tolerance: request.slippage_tolerance,
            max_gas_ratio: 1.0,
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
        let log = self.journal.update_trade_log(log_id, terminal).await?;

        if let Err(e) = self
            .journal
            .advance_bot_status_after_trade(user_id, request.network, succeeded, &log.amount_usd, None)
            .await
        {
            error!("failed to advance bot status for manual trade {log_id} ({user_id}/{}): {e}", request.network);
        }

        Ok(log)
    }

    pub async fn trades_recent(&self, user_id: &str, limit: u32) -> Result<Vec<TradeLog>, ServiceError> {
        Ok(self.journal.get_recent_trades(user_id, limit).await?)
    }

    pub async fn trades(&self, user_id: &str) -> Result<Vec<TradeLog>, ServiceError> {
        Ok(self.journal.get_all_trades(user_id).await?)
    }

    pub async fn trades_network_stats(&self, user_id: &str) -> Result<Vec<NetworkStats>, ServiceError> {
        Ok(self.journal.get_network_stats(user_id).await?)
    }
}
