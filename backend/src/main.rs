use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use measure_core::report::Report;
use std::sync::{Arc, PoisonError, RwLock};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

mod config;
mod session;

use config::Config;
use session::SharedReport;

// Application State
struct AppState {
    report: SharedReport,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let shared_state = Arc::new(AppState {
        report: Arc::new(RwLock::new(Report::new("Session"))),
    });

    let app = Router::new()
        .route("/", get(root))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    info!("listening on {}", config.addr);
    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server stopped: {}", e);
    }
}

async fn root() -> &'static str {
    "Hello from the Measurement Backend!"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = uuid::Uuid::new_v4();
    info!("Client connected (session {})", session_id);

    let (mut sender, mut receiver) = socket.split();

    // Send the current report so the client starts in sync
    let initial = {
        let report = state.report.read().unwrap_or_else(PoisonError::into_inner);
        session::report_update(&report)
    };
    if sender.send(Message::Text(initial)).await.is_err() {
        return;
    }

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Session {} receive error: {}", session_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                info!("Session {} received: {}", session_id, text);
                // the lock is taken and released inside; nothing is held across the sends
                let replies = session::handle_command(&state.report, &text);
                for reply in replies {
                    if sender.send(Message::Text(reply)).await.is_err() {
                        return;
                    }
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!("Client disconnected (session {})", session_id);
}
