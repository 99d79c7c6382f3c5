use std::future;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use axum::Router;
use axum::extract::State;
use axum::extract::WebSocketUpgrade;
use axum::extract::ws::Message;
use axum::extract::ws::WebSocket;
use axum::response::Response;
use axum::routing::get;
use futures::SinkExt;
use futures::StreamExt;
use tokio::net::TcpListener;
use tracing::error;
use tracing::info;

use crate::session;
use crate::world::WorldHandle;

#[derive(Clone)]
struct AppState {
    world: WorldHandle,
    next_id: Arc<AtomicU64>,
}

/// Routes of the simulation service. Render clients connect to `/ws`.
pub fn router(world: WorldHandle) -> Router {
    let state = AppState {
        world,
        next_id: Arc::new(AtomicU64::new(0)),
    };

    Router::new().route("/ws", get(ws_handler)).with_state(state)
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, world: WorldHandle) -> std::io::Result<()> {
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(world)).await
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let id = state.next_id.fetch_add(1, Ordering::Relaxed);

    ws.on_upgrade(move |socket| handle_socket(id, socket, state.world))
}

async fn handle_socket(id: u64, socket: WebSocket, world: WorldHandle) {
    info!(id, "client connected");

    let (sender, receiver) = socket.split();

    // Text frames until the first close frame or transport error. Binary, ping and pong frames
    // carry nothing for us.
    let inbound = receiver
        .take_while(|msg| future::ready(matches!(msg, Ok(m) if !matches!(m, Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(text.as_str().to_owned()),
                _ => None,
            })
        });

    let outbound =
        sender.with(|text: String| future::ready(Ok::<_, axum::Error>(Message::Text(text.into()))));

    if let Err(e) = session::run(id, inbound, outbound, world).await {
        error!(id, "session failed: {e}");
    }
}
