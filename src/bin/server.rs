use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use maze_chase_engine::engine::{GameState, Signal};
use maze_chase_engine::logging::{emit_log, LogLevel};
use maze_chase_engine::server_protocol::{parse_client_message, ParsedClientMessage};
use maze_chase_engine::server_utils::{normalize_tick_ms, parse_port, parse_seed};
use maze_chase_engine::types::GameEvent;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<Mutex<ServerState>>;

#[derive(Clone)]
struct ClientContext {
    tx: mpsc::Sender<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

struct ServerState {
    clients: HashMap<String, ClientContext>,
    game: GameState,
    seed: u32,
}

impl ServerState {
    fn new(seed: u32) -> Self {
        Self {
            clients: HashMap::new(),
            game: GameState::new(seed),
            seed,
        }
    }
}

#[tokio::main]
async fn main() {
    let port = parse_port(std::env::var("PORT").ok().as_deref());
    let tick_ms = normalize_tick_ms(std::env::var("TICK_MS").ok().as_deref());
    let seed = parse_seed(std::env::var("SEED").ok().as_deref()).unwrap_or_else(rand::random::<u32>);

    let state = Arc::new(Mutex::new(ServerState::new(seed)));
    start_tick_loop(state.clone(), tick_ms);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/state", get(state_handler))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        println!(
            "[server] static file root: {}",
            static_dir.to_string_lossy()
        );
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(error) => {
            emit_log(
                LogLevel::Error,
                "bind_failed",
                json!({ "addr": bind_addr, "error": error.to_string() }),
            );
            std::process::exit(1);
        }
    };

    println!("[server] listening on :{port} (tick {tick_ms}ms, seed {seed})");
    if let Err(error) = axum::serve(listener, app).await {
        emit_log(
            LogLevel::Error,
            "server_failed",
            json!({ "error": error.to_string() }),
        );
        std::process::exit(1);
    }
}

fn resolve_static_dir() -> Option<PathBuf> {
    let path = PathBuf::from(std::env::var("STATIC_DIR").ok()?);
    if path.join("index.html").is_file() {
        Some(path)
    } else {
        eprintln!(
            "[server] STATIC_DIR has no index.html: {}",
            path.to_string_lossy()
        );
        None
    }
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn state_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let mut guard = state.lock().await;
    let seed = guard.seed;
    let snapshot = guard.game.build_snapshot(false);
    Json(json!({
        "seed": seed,
        "snapshot": snapshot,
    }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<String>(256);

    {
        let mut guard = state.lock().await;
        guard
            .clients
            .insert(client_id.clone(), ClientContext { tx: tx.clone() });
        let snapshot = guard.game.build_snapshot(false);
        let seed = guard.seed;
        send_to_client(
            &mut guard,
            &client_id,
            &json!({
                "type": "welcome",
                "clientId": client_id,
                "seed": seed,
                "snapshot": snapshot,
            }),
            QueuePolicy::DisconnectOnFull,
        );
    }
    println!("[server] client connected: {client_id}");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(&state, &client_id, raw.as_str()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = String::from_utf8(raw.to_vec()) {
                    handle_client_message(&state, &client_id, &text).await;
                } else {
                    send_error_to_client(&state, &client_id, "invalid utf8 message").await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.lock().await.clients.remove(&client_id);
    println!("[server] client disconnected: {client_id}");
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: &SharedState, client_id: &str, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        send_error_to_client(state, client_id, "invalid message").await;
        return;
    };

    let mut guard = state.lock().await;
    match message {
        ParsedClientMessage::Key { key } => {
            // Unmapped keys are not errors; the game just ignores them.
            guard.game.handle_key(&key);
        }
        ParsedClientMessage::Dir { dir } => {
            guard.game.set_desired_direction(dir);
        }
        ParsedClientMessage::Signal { signal } => {
            let label = signal_label(&signal);
            guard.game.dispatch(signal);
            emit_log(
                LogLevel::Info,
                "signal_applied",
                json!({
                    "clientId": client_id,
                    "signal": label,
                    "iteration": guard.game.iteration(),
                    "automationRemaining": guard.game.automation_remaining(),
                }),
            );
            broadcast_state(&mut guard, QueuePolicy::DisconnectOnFull);
        }
        ParsedClientMessage::Ping { t } => {
            send_to_client(
                &mut guard,
                client_id,
                &json!({
                    "type": "pong",
                    "t": t,
                }),
                QueuePolicy::DisconnectOnFull,
            );
        }
    }
}

fn signal_label(signal: &Signal) -> &'static str {
    match signal {
        Signal::Initialize => "initialize",
        Signal::Reset => "reset",
        Signal::ReplaceItems(_) => "replace_items",
        Signal::SetAutomationRounds => "set_automation_rounds",
        Signal::Tick => "tick",
    }
}

fn start_tick_loop(state: SharedState, tick_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_game(&mut guard);
        }
    });
}

fn tick_game(state: &mut ServerState) {
    let turn_before = state.game.turn();
    let iteration_before = state.game.iteration();
    state.game.dispatch(Signal::Tick);
    if state.game.turn() == turn_before && state.game.iteration() == iteration_before {
        return;
    }
    broadcast_state(state, QueuePolicy::DropOnFull);
}

fn broadcast_state(state: &mut ServerState, policy: QueuePolicy) {
    let snapshot = state.game.build_snapshot(true);
    for event in &snapshot.events {
        log_round_event(event, snapshot.iteration);
    }
    broadcast(
        state,
        &json!({
            "type": "state",
            "snapshot": snapshot,
        }),
        policy,
    );
}

fn log_round_event(event: &GameEvent, iteration: u64) {
    match event {
        GameEvent::RoundFinished {
            reason,
            score,
            turn,
        } => emit_log(
            LogLevel::Info,
            "round_finished",
            json!({
                "iteration": iteration,
                "reason": reason,
                "score": score,
                "turn": turn,
            }),
        ),
        GameEvent::RoundRolledOver {
            iteration,
            rounds_remaining,
        } => emit_log(
            LogLevel::Info,
            "round_rolled_over",
            json!({
                "iteration": iteration,
                "roundsRemaining": rounds_remaining,
            }),
        ),
        _ => {}
    }
}

fn send_to_client(state: &mut ServerState, client_id: &str, message: &Value, policy: QueuePolicy) {
    let send_failed = state
        .clients
        .get(client_id)
        .map(|client| client.tx.try_send(message.to_string()).is_err())
        .unwrap_or(false);
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        state.clients.remove(client_id);
    }
}

fn broadcast(state: &mut ServerState, message: &Value, policy: QueuePolicy) {
    let payload = message.to_string();
    let failed_clients: Vec<String> = state
        .clients
        .iter()
        .filter(|(_, client)| client.tx.try_send(payload.clone()).is_err())
        .map(|(client_id, _)| client_id.clone())
        .collect();
    if policy == QueuePolicy::DisconnectOnFull {
        for client_id in failed_clients {
            state.clients.remove(&client_id);
        }
    }
}

async fn send_error_to_client(state: &SharedState, client_id: &str, message: &str) {
    let mut guard = state.lock().await;
    send_to_client(
        &mut guard,
        client_id,
        &json!({
            "type": "error",
            "message": message,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_engine::layout::Layout;
    use maze_chase_engine::types::GameMode;

    fn attach_client(state: &mut ServerState, capacity: usize) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(capacity);
        state
            .clients
            .insert(make_id("client"), ClientContext { tx });
        rx
    }

    #[test]
    fn make_id_is_monotonic() {
        let a = make_id("client");
        let b = make_id("client");
        assert_ne!(a, b);
        assert!(a.starts_with("client_"));
    }

    #[test]
    fn signal_labels_are_stable() {
        assert_eq!(signal_label(&Signal::Reset), "reset");
        assert_eq!(
            signal_label(&Signal::ReplaceItems(Vec::new())),
            "replace_items"
        );
    }

    #[test]
    fn tick_broadcasts_state_to_clients() {
        let mut state = ServerState::new(7);
        let mut rx = attach_client(&mut state, 8);
        tick_game(&mut state);
        let payload = rx.try_recv().expect("tick should broadcast a snapshot");
        let value: Value = serde_json::from_str(&payload).expect("payload should be json");
        assert_eq!(value["type"], "state");
        assert_eq!(value["snapshot"]["turn"], 1);
    }

    #[test]
    fn finished_round_stops_broadcasting() {
        let layout = Layout::parse(&["#P.G#"]).expect("layout parses");
        let mut state = ServerState::new(7);
        state.game = GameState::with_layout(layout, 7).expect("layout builds");
        let mut rx = attach_client(&mut state, 8);

        tick_game(&mut state);
        assert_eq!(state.game.mode(), GameMode::Finished);
        let payload = rx.try_recv().expect("capturing tick is broadcast");
        assert!(payload.contains("round_finished"));

        tick_game(&mut state);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_queue_disconnects_only_under_strict_policy() {
        let mut state = ServerState::new(1);
        let _rx = attach_client(&mut state, 1);
        broadcast(&mut state, &json!({ "type": "a" }), QueuePolicy::DropOnFull);
        broadcast(&mut state, &json!({ "type": "b" }), QueuePolicy::DropOnFull);
        assert_eq!(state.clients.len(), 1);
        broadcast(
            &mut state,
            &json!({ "type": "c" }),
            QueuePolicy::DisconnectOnFull,
        );
        assert!(state.clients.is_empty());
    }
}
