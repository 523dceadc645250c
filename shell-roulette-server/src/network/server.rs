//! WebSocket Game Server
//!
//! Async WebSocket server for the shared table. Every connection gets a
//! [`PlayerId`] and feeds its intents into the one [`GameSession`].

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock, broadcast};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn, error, debug, instrument};

use crate::game::state::PlayerId;
use crate::network::protocol::{
    ClientMessage, CompactIntent, ErrorCode, ServerError, ServerMessage,
};
use crate::network::session::{Followup, GameSession, SessionConfig};
use crate::DEFAULT_RESOLVE_DELAY_MS;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Pause between a shot's announcement and its consequences.
    pub resolve_delay: Duration,
    /// Include deck contents in every snapshot.
    pub reveal_shells: bool,
    /// Accept debug intents such as `kill`.
    pub allow_debug_commands: bool,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 64,
            resolve_delay: Duration::from_millis(DEFAULT_RESOLVE_DELAY_MS),
            reveal_shells: false,
            allow_debug_commands: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// - `SHELL_ROULETTE_BIND`: socket address
    /// - `SHELL_ROULETTE_MAX_CONNECTIONS`
    /// - `SHELL_ROULETTE_RESOLVE_DELAY_MS`
    /// - `SHELL_ROULETTE_REVEAL`: `true`/`1` to show deck contents
    /// - `SHELL_ROULETTE_DEBUG`: `true`/`1` to accept debug intents
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: parse_or("SHELL_ROULETTE_BIND", lookup("SHELL_ROULETTE_BIND"), defaults.bind_addr),
            max_connections: parse_or(
                "SHELL_ROULETTE_MAX_CONNECTIONS",
                lookup("SHELL_ROULETTE_MAX_CONNECTIONS"),
                defaults.max_connections,
            ),
            resolve_delay: Duration::from_millis(parse_or(
                "SHELL_ROULETTE_RESOLVE_DELAY_MS",
                lookup("SHELL_ROULETTE_RESOLVE_DELAY_MS"),
                DEFAULT_RESOLVE_DELAY_MS,
            )),
            reveal_shells: lookup("SHELL_ROULETTE_REVEAL")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.reveal_shells),
            allow_debug_commands: lookup("SHELL_ROULETTE_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.allow_debug_commands),
            version: defaults.version,
        }
    }

    /// Switches handed to the session.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            reveal_shells: self.reveal_shells,
            allow_debug_commands: self.allow_debug_commands,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection limit reached.
    #[error("Connection limit reached")]
    ConnectionLimitReached,
}

/// Connected client state.
struct ConnectedClient {
    /// Identity assigned on connect.
    player_id: PlayerId,
    /// Connection time.
    connected_at: Instant,
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// The shared table.
    session: Arc<RwLock<GameSession>>,
    /// Connected clients.
    clients: Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a new game server.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let session_id = *uuid::Uuid::new_v4().as_bytes();
        let entropy = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        let session = GameSession::new(session_id, entropy, config.session_config());
        info!("Session {} created", hex::encode(&session_id[..4]));

        Self {
            config,
            session: Arc::new(RwLock::new(session)),
            clients: Arc::new(RwLock::new(BTreeMap::new())),
            shutdown_tx,
        }
    }

    /// Run the server.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), GameServerError> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("Game server listening on {}", listener.local_addr()?);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let clients_count = self.clients.read().await.len();
                            if clients_count >= self.config.max_connections {
                                warn!("{}, rejecting {}", GameServerError::ConnectionLimitReached, addr);
                                continue;
                            }

                            info!("New connection from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let clients = self.clients.clone();
        let session = self.session.clone();
        let config = self.config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(64);
            let player_id = PlayerId::random();

            // Register client
            clients.write().await.insert(addr, ConnectedClient {
                player_id,
                connected_at: Instant::now(),
            });

            // Spawn message sender task
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                let _ = ws_sender.close().await;
            });

            let _ = msg_tx.send(ServerMessage::Welcome {
                player_id: player_id.to_uuid_string(),
                server_version: config.version.clone(),
            }).await;
            session.write().await.connect(player_id, msg_tx.clone());
            debug!("Client {} is {}", addr, player_id.short());

            // Handle incoming messages
            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                match ClientMessage::from_json(&text) {
                                    Ok(client_msg) => {
                                        Self::handle_client_message(player_id, client_msg, &session, &config, &msg_tx).await;
                                    }
                                    Err(e) => {
                                        debug!("Invalid message from {}: {}", addr, e);
                                        Self::send_invalid(&msg_tx).await;
                                    }
                                }
                            }
                            Some(Ok(Message::Binary(data))) => {
                                match CompactIntent::from_bytes(&data).ok().and_then(CompactIntent::into_message) {
                                    Some(client_msg) => {
                                        Self::handle_client_message(player_id, client_msg, &session, &config, &msg_tx).await;
                                    }
                                    None => Self::send_invalid(&msg_tx).await,
                                }
                            }
                            Some(Ok(Message::Ping(_))) => {
                                let _ = msg_tx.send(ServerMessage::Pong {
                                    timestamp: 0,
                                    server_time: now_millis(),
                                }).await;
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", addr);
                                break;
                            }
                            Some(Err(e)) => {
                                error!("WebSocket error for {}: {}", addr, e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        let _ = msg_tx.send(ServerMessage::Shutdown {
                            reason: "Server shutting down".to_string(),
                        }).await;
                        break;
                    }
                }
            }

            // Cleanup
            session.write().await.disconnect(&player_id);
            drop(msg_tx);
            if tokio::time::timeout(Duration::from_secs(1), sender_task).await.is_err() {
                debug!("Writer for {} did not drain in time", addr);
            }

            if let Some(client) = clients.write().await.remove(&addr) {
                info!(
                    "Client {} ({}) cleaned up after {:?}",
                    addr,
                    client.player_id.short(),
                    client.connected_at.elapsed()
                );
            }
        });
    }

    /// Handle a client message.
    async fn handle_client_message(
        player_id: PlayerId,
        msg: ClientMessage,
        session: &Arc<RwLock<GameSession>>,
        config: &ServerConfig,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        if let ClientMessage::Ping { timestamp } = msg {
            let _ = sender.send(ServerMessage::Pong {
                timestamp,
                server_time: now_millis(),
            }).await;
            return;
        }

        let followup = session.write().await.handle_intent(player_id, msg);
        if let Followup::ResolveShot(ticket) = followup {
            Self::schedule_resolution(session.clone(), ticket, config.resolve_delay);
        }
    }

    /// Resolve an announced shot after `delay`.
    ///
    /// The lock is not held while waiting; the session rejects every other
    /// shot until this runs.
    fn schedule_resolution(session: Arc<RwLock<GameSession>>, ticket: u64, delay: Duration) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut session = session.write().await;
            match session.resolve_shot(ticket) {
                Ok(outcome) => debug!(
                    "Shot {} resolved: {} damage, turn kept: {}",
                    ticket, outcome.damage, outcome.turn_kept
                ),
                Err(e) => debug!("Shot {} dropped: {}", ticket, e),
            }
        });
    }

    async fn send_invalid(sender: &mpsc::Sender<ServerMessage>) {
        let _ = sender.send(ServerMessage::Error(ServerError::new(
            ErrorCode::InvalidInput,
            "Invalid message format",
        ))).await;
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get active connection count.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Handle to the shared session.
    pub fn session(&self) -> Arc<RwLock<GameSession>> {
        self.session.clone()
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
