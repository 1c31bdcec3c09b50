// In crates/web-server/src/lib.rs

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State,
    },
    response::Json,
    routing::get,
    Router,
};
use app_config::types::ServerSettings;
use core_types::{SignalHistoryEntry, WinLossStats};
use events::WsMessage;
use futures::stream::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use store::Repository;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::types::PositionView;

pub mod error;
pub mod types;

// WebSocket message replay cache type
type WsCache = Arc<Mutex<VecDeque<WsMessage>>>;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};

/// The shared application state that is available to all API handlers.
///
/// The dashboard is strictly read-only: handlers load the persisted
/// documents the engine writes and never mutate anything.
#[derive(Clone)]
pub struct AppState {
    pub repository: Repository,
    pub ws_tx: broadcast::Sender<WsMessage>, // For broadcasting live messages
    pub ws_cache: WsCache,                   // For replaying recent messages
}

const WS_CACHE_SIZE: usize = 200; // The maximum number of messages to keep in the replay cache.

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    // Allow any origin: the dashboard is served separately during development.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let api_router = Router::new()
        .route("/positions", get(get_positions_handler))
        .route("/signals", get(get_signals_handler))
        .route("/stats", get(get_stats_handler));

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// A simple health check handler.
async fn health_check_handler() -> &'static str {
    "OK"
}

/// The handler for `GET /api/positions`.
/// Returns every currently tracked position with its rendered status.
async fn get_positions_handler(State(state): State<AppState>) -> Json<Vec<PositionView>> {
    let positions = state
        .repository
        .load_positions()
        .into_iter()
        .map(PositionView::from)
        .collect();
    Json(positions)
}

/// The handler for `GET /api/signals`.
/// Returns the latest accepted classification per (symbol, timeframe) key.
async fn get_signals_handler(
    State(state): State<AppState>,
) -> Json<HashMap<String, SignalHistoryEntry>> {
    Json(state.repository.load_last_signals())
}

/// The handler for `GET /api/stats`.
async fn get_stats_handler(State(state): State<AppState>) -> Json<WinLossStats> {
    Json(state.repository.load_stats())
}

/// The handler for `GET /ws`.
/// Upgrades the connection to a WebSocket and handles the real-time communication.
async fn ws_handler(
    ws: axum::extract::ws::WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl axum::response::IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// The actual WebSocket handling logic after the connection is upgraded.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    tracing::info!("New WebSocket client connected.");

    // --- 1. Replay ---
    // A late-joining dashboard first gets the cached recent events, cloned
    // out so the lock is not held across sends.
    let replay_msgs: Vec<_> = {
        let cache = state.ws_cache.lock().unwrap();
        cache.iter().cloned().collect()
    };
    for msg in replay_msgs {
        let json_msg = serde_json::to_string(&msg).unwrap();
        if socket.send(Message::Text(json_msg.into())).await.is_err() {
            tracing::info!("WebSocket client disconnected during replay.");
            return;
        }
    }

    // --- 2. Live feed ---
    let mut rx = state.ws_tx.subscribe();

    loop {
        tokio::select! {
            // Await a new message from the broadcast channel.
            Ok(msg) = rx.recv() => {
                let json_msg = serde_json::to_string(&msg).unwrap();
                if socket.send(Message::Text(json_msg.into())).await.is_err() {
                    tracing::info!("WebSocket client disconnected.");
                    break;
                }
            }
            // Await a message from the client (e.g., a ping or a close frame).
            Some(Ok(msg)) = socket.next() => {
                if let Message::Close(_) = msg {
                    tracing::info!("WebSocket client sent close frame.");
                    break;
                }
            }
            else => {
                break;
            }
        }
    }
    tracing::info!("WebSocket client connection closed.");
}

/// The main entry point for running the web server.
///
/// This function sets up the TCP listener and serves the application router.
/// It will run until the process is terminated.
pub async fn run(
    settings: ServerSettings,
    repository: Repository,
    ws_tx: broadcast::Sender<WsMessage>,
) -> Result<()> {
    // The replay cache is filled from our own subscription so late-joining
    // dashboard clients still see recent events.
    let ws_cache: WsCache = Arc::new(Mutex::new(VecDeque::with_capacity(WS_CACHE_SIZE)));
    let mut cache_rx = ws_tx.subscribe();
    let cache_writer = ws_cache.clone();
    tokio::spawn(async move {
        loop {
            match cache_rx.recv().await {
                Ok(msg) => {
                    let mut cache = cache_writer.lock().unwrap();
                    if cache.len() == WS_CACHE_SIZE {
                        cache.pop_front();
                    }
                    cache.push_back(msg);
                }
                // A slow cache is allowed to miss messages.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let app_state = AppState {
        repository,
        ws_tx,
        ws_cache,
    };

    let app = create_router(app_state);

    let address = format!("{}:{}", settings.host, settings.port);
    tracing::info!("Web server listening on {}", address);

    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(Error::ServerBindError)?;

    Ok(())
}
