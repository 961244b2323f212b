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
use cat_cafe_rust_server::constants::{CUSTOMER_TICK_MS, MOVEMENT_TICK_MS, SPAWN_TICK_MS};
use cat_cafe_rust_server::engine::{
    adjust_restock_amount, apply_upgrade, commit_restock, play_click, reset_game, set_panel,
    set_restock_counter, set_screen, toggle_music, toggle_panel, toggle_sounds, GameEngine,
};
use cat_cafe_rust_server::input::{key_down, key_up};
use cat_cafe_rust_server::rng::{RandomSource, Rng, ThreadRandom};
use cat_cafe_rust_server::save_store::SaveStore;
use cat_cafe_rust_server::server_protocol::{
    parse_client_message, ParsedClientMessage, ServerMessage,
};
use cat_cafe_rust_server::types::{GameState, Screen};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<Mutex<ServerState>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cat café game host")]
struct Cli {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, env = "CAFE_SAVE_PATH", default_value = ".data/cafe-save.json")]
    save_path: PathBuf,
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,
    /// Fixed seed for spawn and order rolls; unseeded when omitted.
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 10)]
    autosave_secs: u64,
}

#[derive(Clone)]
struct ClientContext {
    tx: mpsc::Sender<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

#[derive(Clone, Copy, Debug)]
enum DriverKind {
    Movement,
    Spawn,
    Customers,
}

impl DriverKind {
    fn period(self) -> Duration {
        Duration::from_millis(match self {
            Self::Movement => MOVEMENT_TICK_MS,
            Self::Spawn => SPAWN_TICK_MS,
            Self::Customers => CUSTOMER_TICK_MS,
        })
    }
}

struct ServerState {
    clients: HashMap<String, ClientContext>,
    engine: GameEngine,
    drivers: Vec<JoinHandle<()>>,
    dirty: bool,
}

impl ServerState {
    fn new(engine: GameEngine) -> Self {
        Self {
            clients: HashMap::new(),
            engine,
            drivers: Vec::new(),
            dirty: false,
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let save_store = Arc::new(SaveStore::new(cli.save_path.clone()));
    let initial_state = save_store.load_or_fresh();
    let rng: Box<dyn RandomSource + Send> = match cli.seed {
        Some(seed) => {
            info!(seed, "using fixed random seed");
            Box::new(Rng::new(seed))
        }
        None => Box::new(ThreadRandom),
    };
    let state = Arc::new(Mutex::new(ServerState::new(GameEngine::new(
        initial_state,
        rng,
    ))));
    start_autosave_loop(
        state.clone(),
        save_store.clone(),
        Duration::from_secs(cli.autosave_secs.max(1)),
    );

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/state", get(state_handler))
        .route("/ws", get(ws_handler))
        .with_state(state.clone());

    let app = if let Some(static_dir) = resolve_static_dir(cli.static_dir) {
        let index_file = static_dir.join("index.html");
        info!(root = %static_dir.display(), "serving static files");
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        warn!("static file root not found; serving API only");
        app
    };

    let bind_addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    info!(port = cli.port, save_path = %save_store.path().display(), "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server runtime failed");

    let final_state = {
        let mut guard = state.lock().await;
        stop_drivers(&mut guard);
        guard.engine.state().clone()
    };
    persist(&save_store, &final_state);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

fn resolve_static_dir(configured: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.join("index.html").is_file() {
            return Some(path);
        }
        warn!(path = %path.display(), "configured static dir has no index.html");
    }

    let candidates = [PathBuf::from("dist"), PathBuf::from("../dist")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn state_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let mut guard = state.lock().await;
    Json(guard.engine.build_snapshot(false))
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
        let welcome = ServerMessage::Welcome {
            layout: guard.engine.layout_init(),
            snapshot: guard.engine.build_snapshot(false),
        };
        send_to_client(&mut guard, &client_id, &welcome, QueuePolicy::DisconnectOnFull);
        debug!(client = %client_id, clients = guard.clients.len(), "client connected");
    }

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
                if let Ok(text) = std::str::from_utf8(&raw) {
                    handle_client_message(&state, &client_id, text).await;
                } else {
                    send_error_to_client(&state, &client_id, "invalid utf8 message").await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    {
        let mut guard = state.lock().await;
        guard.clients.remove(&client_id);
        debug!(client = %client_id, clients = guard.clients.len(), "client disconnected");
    }
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: &SharedState, client_id: &str, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        send_error_to_client(state, client_id, "invalid message").await;
        return;
    };

    let mut guard = state.lock().await;
    if let ParsedClientMessage::Ping { t } = message {
        send_to_client(
            &mut guard,
            client_id,
            &ServerMessage::Pong { t },
            QueuePolicy::DisconnectOnFull,
        );
        return;
    }

    let engine = &mut guard.engine;
    match message {
        ParsedClientMessage::Ping { .. } => {}
        ParsedClientMessage::KeyDown { key, repeat } => {
            engine.apply(|state| key_down(state, key, repeat));
        }
        ParsedClientMessage::KeyUp { key } => engine.apply(|state| key_up(state, key)),
        ParsedClientMessage::SetScreen { screen } => {
            engine.apply(|state| set_screen(state, screen));
        }
        ParsedClientMessage::SetPanel { panel } => engine.apply(|state| set_panel(state, panel)),
        ParsedClientMessage::TogglePanel { panel } => {
            engine.apply(|state| toggle_panel(state, panel));
        }
        ParsedClientMessage::SelectRestock { counter_id } => {
            engine.apply(|state| set_restock_counter(state, &counter_id));
        }
        ParsedClientMessage::AdjustRestock { delta } => {
            engine.apply(|state| adjust_restock_amount(state, delta));
        }
        ParsedClientMessage::CommitRestock => engine.apply(commit_restock),
        ParsedClientMessage::Upgrade { kind } => engine.apply(|state| apply_upgrade(state, kind)),
        ParsedClientMessage::ToggleSounds => engine.apply(toggle_sounds),
        ParsedClientMessage::ToggleMusic => engine.apply(toggle_music),
        ParsedClientMessage::Hover => engine.apply(play_click),
        ParsedClientMessage::Reset => {
            info!("game reset requested");
            engine.apply(reset_game);
        }
    }

    guard.dirty = true;
    sync_drivers(state, &mut guard);
    broadcast_state(&mut guard, QueuePolicy::DisconnectOnFull);
}

/// Drivers run exactly while the game screen is showing.
fn sync_drivers(state: &SharedState, server: &mut ServerState) {
    let in_game = server.engine.state().screen == Screen::Game;
    if in_game && server.drivers.is_empty() {
        server.drivers = [DriverKind::Movement, DriverKind::Spawn, DriverKind::Customers]
            .into_iter()
            .map(|kind| spawn_driver(state.clone(), kind))
            .collect();
        info!("game drivers started");
    } else if !in_game && !server.drivers.is_empty() {
        stop_drivers(server);
        info!("game drivers stopped");
    }
}

fn stop_drivers(server: &mut ServerState) {
    for handle in server.drivers.drain(..) {
        handle.abort();
    }
}

fn spawn_driver(state: SharedState, kind: DriverKind) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(kind.period());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            match kind {
                DriverKind::Movement => {
                    guard.engine.step_movement();
                    broadcast_state(&mut guard, QueuePolicy::DropOnFull);
                }
                DriverKind::Spawn => guard.engine.step_spawn(),
                DriverKind::Customers => guard.engine.step_customers(),
            }
            guard.dirty = true;
        }
    })
}

fn start_autosave_loop(state: SharedState, save_store: Arc<SaveStore>, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let snapshot = {
                let mut guard = state.lock().await;
                if !guard.dirty {
                    continue;
                }
                guard.dirty = false;
                guard.engine.state().clone()
            };
            let store = save_store.clone();
            let result = tokio::task::spawn_blocking(move || persist(&store, &snapshot)).await;
            if let Err(error) = result {
                error!(%error, "autosave task failed");
            }
        }
    });
}

fn persist(save_store: &SaveStore, state: &GameState) {
    match save_store.save(state) {
        Ok(()) => debug!(path = %save_store.path().display(), "progress saved"),
        Err(error) => warn!(%error, "failed to save progress"),
    }
}

/// Always drains the cue queue, even with nobody listening.
fn broadcast_state(server: &mut ServerState, policy: QueuePolicy) {
    let snapshot = server.engine.build_snapshot(true);
    if server.clients.is_empty() {
        return;
    }
    broadcast(server, &ServerMessage::State { snapshot }, policy);
}

fn encode(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(payload) => Some(payload),
        Err(error) => {
            error!(%error, "failed to encode server message");
            None
        }
    }
}

fn send_to_client(
    server: &mut ServerState,
    client_id: &str,
    message: &ServerMessage,
    policy: QueuePolicy,
) {
    let Some(payload) = encode(message) else {
        return;
    };
    let send_failed = server
        .clients
        .get(client_id)
        .is_some_and(|client| client.tx.try_send(payload).is_err());
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        warn!(client = %client_id, "outbound queue full; dropping client");
        server.clients.remove(client_id);
    }
}

fn broadcast(server: &mut ServerState, message: &ServerMessage, policy: QueuePolicy) {
    let Some(payload) = encode(message) else {
        return;
    };
    let failed_clients: Vec<String> = server
        .clients
        .iter()
        .filter(|(_, client)| client.tx.try_send(payload.clone()).is_err())
        .map(|(client_id, _)| client_id.clone())
        .collect();
    if policy == QueuePolicy::DisconnectOnFull {
        for client_id in failed_clients {
            warn!(client = %client_id, "outbound queue full; dropping client");
            server.clients.remove(&client_id);
        }
    }
}

async fn send_error_to_client(state: &SharedState, client_id: &str, message: &str) {
    let mut guard = state.lock().await;
    send_to_client(
        &mut guard,
        client_id,
        &ServerMessage::Error {
            message: message.to_string(),
        },
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

    #[test]
    fn make_id_is_monotonic() {
        let first = make_id("client");
        let second = make_id("client");
        assert!(first.starts_with("client_"));
        assert_ne!(first, second);
    }

    #[test]
    fn driver_periods_match_timing_domains() {
        assert_eq!(DriverKind::Movement.period(), Duration::from_millis(16));
        assert_eq!(DriverKind::Spawn.period(), Duration::from_millis(1_350));
        assert_eq!(DriverKind::Customers.period(), Duration::from_millis(10));
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["server"]);
        assert_eq!(cli.autosave_secs, 10);
        assert!(cli.seed.is_none());
    }

    #[test]
    fn broadcast_without_clients_still_drains_cues() {
        let mut server = ServerState::new(GameEngine::with_seed(5));
        server.engine.apply(play_click);
        assert!(!server.engine.state().events.is_empty());
        broadcast_state(&mut server, QueuePolicy::DropOnFull);
        assert!(server.engine.state().events.is_empty());
    }

    #[tokio::test]
    async fn drivers_follow_game_screen() {
        let state: SharedState = Arc::new(Mutex::new(ServerState::new(GameEngine::with_seed(5))));
        let mut guard = state.lock().await;
        sync_drivers(&state, &mut guard);
        assert!(guard.drivers.is_empty());

        guard.engine.apply(|s| set_screen(s, Screen::Game));
        sync_drivers(&state, &mut guard);
        assert_eq!(guard.drivers.len(), 3);

        guard.engine.apply(|s| set_screen(s, Screen::Menu));
        sync_drivers(&state, &mut guard);
        assert!(guard.drivers.is_empty());
    }
}
