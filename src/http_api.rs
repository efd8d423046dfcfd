//! axum wiring for the Request Boundary (`spec.md` §6). Every handler is a
//! thin (deserialize, call through to `RequestBoundary`, serialize) shim;
//! all the actual behavior lives in `commands.rs`.

use crate::commands::{ManualTradeRequest, RequestBoundary};
use crate::error::{JournalError, ServiceError, TradeError};
use crate::models::NewTradeConfig;
use crate::network::Network;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub fn router(boundary: Arc<RequestBoundary>) -> Router {
    Router::new()
        .route("/bot/statuses", get(bot_statuses))
        .route("/bot/start", post(bot_start))
        .route("/bot/stop", post(bot_stop))
        .route("/configs/active", get(configs_active))
        .route("/configs", post(create_config))
        .route("/trades/manual", post(trades_manual))
        .route("/trades/recent", get(trades_recent))
        .route("/trades", get(trades))
        .route("/trades/network-stats", get(trades_network_stats))
        .with_state(boundary)
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ServiceError::Trade(e) => (trade_error_status(e), e.kind(), e.to_string()),
            ServiceError::Journal(JournalError::Invalid(msg)) => (StatusCode::BAD_REQUEST, "Invalid", msg.clone()),
            ServiceError::Journal(e) => (StatusCode::INTERNAL_SERVER_ERROR, "JournalError", e.to_string()),
            ServiceError::Other(e) => (StatusCode::INTERNAL_SERVER_ERROR, "Error", e.to_string()),
        };
        (status, Json(json!({ "success": false, "error": kind, "errorMessage": message }))).into_response()
    }
}

fn trade_error_status(e: &TradeError) -> StatusCode {
    match e {
        TradeError::InvalidAddress(_) | TradeError::InvalidInterval(_) | TradeError::NotImplemented | TradeError::NoActiveConfig => {
            StatusCode::BAD_REQUEST
        }
        TradeError::GasTooHigh { .. } | TradeError::NoLiquidity | TradeError::NoV3Pool | TradeError::InvalidToken => StatusCode::UNPROCESSABLE_ENTITY,
        TradeError::NetworkUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        TradeError::AdapterError(_) => StatusCode::BAD_GATEWAY,
    }
}

#[derive(Debug, Deserialize)]
struct UserIdQuery {
    #[serde(rename = "userId")]
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ActiveConfigQuery {
    #[serde(rename = "userId")]
    user_id: String,
    network: Option<Network>,
}

#[derive(Debug, Deserialize)]
struct RecentTradesQuery {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
struct NetworkKeyBody {
    #[serde(rename = "userId")]
    user_id: String,
    network: Network,
}

#[derive(Debug, Deserialize)]
struct ManualTradeBody {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(flatten)]
    trade: ManualTradeRequest,
}

async fn bot_statuses(State(boundary): State<Arc<RequestBoundary>>, Query(q): Query<UserIdQuery>) -> Result<Response, ServiceError> {
    Ok(Json(boundary.bot_statuses(&q.user_id).await?).into_response())
}

async fn bot_start(State(boundary): State<Arc<RequestBoundary>>, Json(body): Json<NetworkKeyBody>) -> Result<Response, ServiceError> {
    boundary.bot_start(&body.user_id, body.network).await?;
    Ok(Json(json!({ "ok": true })).into_response())
}

async fn bot_stop(State(boundary): State<Arc<RequestBoundary>>, Json(body): Json<NetworkKeyBody>) -> Result<Response, ServiceError> {
    boundary.bot_stop(&body.user_id, body.network).await?;
    Ok(Json(json!({ "ok": true })).into_response())
}

async fn configs_active(State(boundary): State<Arc<RequestBoundary>>, Query(q): Query<ActiveConfigQuery>) -> Result<Response, ServiceError> {
    Ok(Json(boundary.configs_active(&q.user_id, q.network).await?).into_response())
}

async fn create_config(State(boundary): State<Arc<RequestBoundary>>, Json(new): Json<NewTradeConfig>) -> Result<Response, ServiceError> {
    Ok(Json(boundary.create_config(new).await?).into_response())
}

async fn trades_manual(State(boundary): State<Arc<RequestBoundary>>, Json(body): Json<ManualTradeBody>) -> Result<Response, ServiceError> {
    Ok(Json(boundary.trades_manual(&body.user_id, body.trade).await?).into_response())
}

async fn trades_recent(State(boundary): State<Arc<RequestBoundary>>, Query(q): Query<RecentTradesQuery>) -> Result<Response, ServiceError> {
    Ok(Json(boundary.trades_recent(&q.user_id, q.limit).await?).into_response())
}

async fn trades(State(boundary): State<Arc<RequestBoundary>>, Query(q): Query<UserIdQuery>) -> Result<Response, ServiceError> {
    Ok(Json(boundary.trades(&q.user_id).await?).into_response())
}

async fn trades_network_stats(State(boundary): State<Arc<RequestBoundary>>, Query(q): Query<UserIdQuery>) -> Result<Response, ServiceError> {
    Ok(Json(boundary.trades_network_stats(&q.user_id).await?).into_response())
}
