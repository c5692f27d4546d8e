use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::debug;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/seats/stream", get(seat_stream))
}

// GET /api/seats/stream
//
// Поток дельт по WebSocket. Бэклога нет: свежий снапшот клиент
// забирает через GET /api/seats при подключении, дальше — только
// события с этого момента.
async fn seat_stream(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (subscriber_id, mut deltas) = state.engine.subscribe();
    debug!("seat stream opened for subscriber {}", subscriber_id);

    let (mut ws_tx, mut ws_rx) = socket.split();
    loop {
        tokio::select! {
            delta = deltas.recv() => {
                let Some(delta) = delta else { break };
                let Ok(text) = serde_json::to_string(&delta) else { continue };
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = ws_rx.next() => {
                match incoming {
                    // Клиенту нечего нам сказать: поток только на чтение.
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.engine.unsubscribe(subscriber_id);
    debug!("seat stream closed for subscriber {}", subscriber_id);
}
