use anyhow::Result;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use trade_exec_service::commands::RequestBoundary;
use trade_exec_service::http_api;
use trade_exec_service::journal::SqliteTradeJournal;
use trade_exec_service::notifications::NotificationBus;
use trade_exec_service::price_oracle::PriceOracle;
use trade_exec_service::rpc_pool::RpcClientPool;
use trade_exec_service::scheduler::BotScheduler;
use trade_exec_service::settings::Settings;
use trade_exec_service::trading_service::TradingService;
use trade_exec_service::wallet::WalletManager;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let settings = Settings::from_env();
    info!("starting trade execution service, http_addr={}", settings.http_addr);

    let wallets = Arc::new(WalletManager::from_settings(&settings));
    let rpc_pool = Arc::new(RpcClientPool::build(&settings, &wallets));
    let price_oracle = Arc::new(PriceOracle::new(settings.price_source_url.clone()));
    let journal: Arc<dyn trade_exec_service::journal::TradeJournal> = Arc::new(SqliteTradeJournal::open(&settings.database_url)?);
    let notifications = Arc::new(NotificationBus::new());
    let trading_service = Arc::new(TradingService::new(rpc_pool.clone(), wallets.clone(), price_oracle.clone()));
    let scheduler = BotScheduler::new(journal.clone(), trading_service.clone(), notifications.clone());

    scheduler.reconcile_on_startup().await;

    let ws_addr = ws_addr_from(&settings.http_addr);
    let ws_notifications = notifications.clone();
    tokio::spawn(async move {
        if let Err(e) = trade_exec_service::ws_server::serve(&ws_addr, ws_notifications).await {
            tracing::error!("websocket server exited: {e}");
        }
    });

    let boundary = Arc::new(RequestBoundary::new(journal, scheduler, trading_service, rpc_pool));
    let app = http_api::router(boundary).layer(TraceLayer::new_for_http());

    info!("request boundary listening on {}", settings.http_addr);
    axum::Server::bind(&settings.http_addr.parse()?).serve(app.into_make_service()).await?;

    Ok(())
}

/// The notification WebSocket listens one port above the HTTP API, mirroring
/// the teacher's dashboard-plus-one convention in `websocket_dashboard.rs`.
fn ws_addr_from(http_addr: &str) -> String {
    match http_addr.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port.parse().unwrap_or(8080);
            format!("{host}:{}", port + 1)
        }
        None => "0.0.0.0:8081".to_string(),
    }
}
