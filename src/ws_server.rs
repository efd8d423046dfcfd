//! WebSocket notification server — `spec.md` §4.8. Grounded on the
//! teacher's `websocket_dashboard.rs`: a `TcpListener` accept loop handing
//! each connection to `tokio_tungstenite::accept_async`, then pumping a
//! broadcast receiver into the socket. The one addition this service needs
//! that the dashboard didn't is the `{type:"auth",userId}` handshake that
//! gates which user's channel a socket is subscribed to.

use crate::notifications::NotificationBus;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Auth { #[serde(rename = "userId")] user_id: String },
}

pub async fn serve(addr: &str, notifications: Arc<NotificationBus>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("websocket notification server listening on {addr}");

    loop {
        let (stream, peer) = listener.accept().await?;
        let notifications = notifications.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, notifications).await {
                warn!("websocket connection from {peer} closed with error: {e}");
            }
        });
    }
}

/// A connection is useless until it authenticates: the first text frame
/// must be `{"type":"auth","userId":"..."}`, after which every event
/// broadcast for that user is forwarded until the socket closes.
async fn handle_connection(stream: TcpStream, notifications: Arc<NotificationBus>) -> anyhow::Result<()> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut sender, mut receiver) = ws_stream.split();

    let user_id = loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Auth { user_id }) => break user_id,
                Err(e) => {
                    warn!("ignoring unrecognized websocket handshake frame: {e}");
                }
            },
            Some(Ok(Message::Close(_))) | None => return Ok(()),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    };

    let mut events = notifications.subscribe(&user_id);
    info!("websocket client authenticated as {user_id}");

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(payload) => {
                        if sender.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("websocket client {user_id} lagged, skipped {skipped} events");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        error!("websocket read error for {user_id}: {e}");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("websocket client {user_id} disconnected");
    Ok(())
}
