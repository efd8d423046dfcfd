pub mod commands;
pub mod decimal;
pub mod dex;
pub mod error;
pub mod http_api;
pub mod journal;
pub mod models;
pub mod network;
pub mod notifications;
pub mod price_oracle;
pub mod retry;
pub mod rpc_pool;
pub mod scheduler;
pub mod settings;
pub mod trading_service;
pub mod wallet;
pub mod ws_server;
