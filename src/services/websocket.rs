use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::error;

use crate::dto::game_dto::Game;
use crate::dto::pick_dto::{Pick, PickUpdate};
use crate::dto::week_dto::WeekUpdate;

/// Change signal for an accepted pick write, consumed by ws clients and any
/// downstream cache invalidation.
pub async fn send_pick_update(tx: &broadcast::Sender<String>, pick: &Pick) {
    let update = PickUpdate {
        r#type: "pick_update".to_string(),
        pick: pick.clone(),
    };

    match serde_json::to_string(&update) {
        Ok(json) => {
            let _ = tx.send(json);
        }
        Err(e) => {
            error!("Failed to serialize pick update message: {}", e);
        }
    }
}

/// Broadcast the current game set of a week after a catalog sync.
pub async fn send_week_update(pool: &SqlitePool, tx: &broadcast::Sender<String>, week_id: i64) {
    let games = sqlx::query_as::<_, Game>("SELECT * FROM games WHERE week_id = ?")
        .bind(week_id)
        .fetch_all(pool)
        .await
        .unwrap_or_default();

    let update = WeekUpdate {
        r#type: "week_update".to_string(),
        week_id,
        games,
    };

    match serde_json::to_string(&update) {
        Ok(json) => {
            let _ = tx.send(json);
        }
        Err(e) => {
            error!("Failed to serialize week update message: {}", e);
        }
    }
}

/* Web Socket stuff */
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Extension(tx): Extension<broadcast::Sender<String>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, tx))
}

async fn handle_socket(socket: WebSocket, tx: broadcast::Sender<String>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = tx.subscribe();

    // Task to send messages to this client
    let send_task = tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Change signals are server-authoritative; inbound client frames are
    // drained and dropped so the socket stays healthy.
    while let Some(Ok(_)) = receiver.next().await {}

    // Clean up
    send_task.abort();
}
