//! Game Session
//!
//! Wraps the authoritative [`GameState`] with the outbound channel of every
//! connection. Applies client intents, routes the resulting events by
//! audience and broadcasts a fresh snapshot after every change.
//!
//! Outbound queues are never awaited while the table is locked. A client
//! that stops reading loses messages; the next snapshot it does read puts
//! it back in sync.

use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::core::rng::derive_session_seed;
use crate::game::action::{GameError, ShotOutcome};
use crate::game::events::Audience;
use crate::game::state::{GamePhase, GameState, PlayerId};
use crate::network::protocol::{
    ClientMessage, GameSnapshot, NarrativeEvent, PlayerView, ServerError, ServerMessage,
};

/// Unique session identifier.
pub type SessionId = [u8; 16];

/// Longest display name kept, in characters.
pub const MAX_NAME_LEN: usize = 24;

/// Per-session switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    /// Include deck contents in snapshots.
    pub reveal_shells: bool,
    /// Honour `kill` intents.
    pub allow_debug_commands: bool,
}

/// What the caller has to do after an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// Nothing.
    None,
    /// A shot was announced. Call [`GameSession::resolve_shot`] with this
    /// ticket once the delay has passed.
    ResolveShot(u64),
}

/// The single game instance shared by all connections.
pub struct GameSession {
    /// Session identifier.
    pub id: SessionId,
    config: SessionConfig,
    state: GameState,
    /// Outbound channel per connection, seated or not.
    connections: BTreeMap<PlayerId, mpsc::Sender<ServerMessage>>,
    /// Ticket of the shot awaiting resolution.
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl GameSession {
    /// Create a session whose RNG seed is derived from the id and `entropy`.
    pub fn new(id: SessionId, entropy: u64, config: SessionConfig) -> Self {
        Self::with_state(GameState::new(id, derive_session_seed(&id, entropy)), config)
    }

    /// Wrap an existing game.
    pub fn with_state(state: GameState, config: SessionConfig) -> Self {
        Self {
            id: state.session_id,
            config,
            state,
            connections: BTreeMap::new(),
            in_flight: None,
            next_ticket: 0,
        }
    }

    /// Register a connection and send it the current table.
    pub fn connect(&mut self, player_id: PlayerId, sender: mpsc::Sender<ServerMessage>) {
        deliver(&player_id, &sender, ServerMessage::State(self.snapshot()));
        self.connections.insert(player_id, sender);
        debug!("Connection {} registered ({} total)", player_id.short(), self.connections.len());
    }

    /// Drop a connection and free its seat.
    pub fn disconnect(&mut self, player_id: &PlayerId) {
        self.connections.remove(player_id);
        if self.state.leave(player_id).is_some() {
            self.flush();
        }
    }

    /// Apply one intent from `player_id`.
    ///
    /// On success every observer receives the resulting events and a fresh
    /// snapshot. A rejection changes nothing; unless silent it is reported
    /// to the requester alone.
    pub fn handle_intent(&mut self, player_id: PlayerId, msg: ClientMessage) -> Followup {
        let result = match msg {
            ClientMessage::Join { name } => self.state
                .join(player_id, clean_name(&name, self.state.roster().len()))
                .map(|_| Followup::None),
            ClientMessage::Shoot { target } => self.state
                .begin_shot(&player_id, target)
                .map(|_| {
                    let ticket = self.next_ticket;
                    self.next_ticket += 1;
                    self.in_flight = Some(ticket);
                    Followup::ResolveShot(ticket)
                }),
            ClientMessage::UseItem { kind } => self.state
                .use_item(&player_id, kind)
                .map(|_| Followup::None),
            ClientMessage::Restart => {
                info!("Restart requested by {}", player_id.short());
                self.state.restart();
                self.in_flight = None;
                Ok(Followup::None)
            }
            ClientMessage::Kill { target } => {
                if self.config.allow_debug_commands {
                    self.state.eliminate(target).map(|_| Followup::None)
                } else {
                    Err(GameError::DebugDisabled)
                }
            }
            ClientMessage::Leave => {
                self.state.leave(&player_id);
                Ok(Followup::None)
            }
            ClientMessage::Ping { .. } => return Followup::None,
        };

        match result {
            Ok(followup) => {
                self.flush();
                followup
            }
            Err(err) => {
                self.reject(&player_id, &err);
                Followup::None
            }
        }
    }

    /// Land the shot announced under `ticket`.
    ///
    /// Stale tickets (the table was restarted in the meantime) are refused
    /// with [`GameError::NoPendingShot`].
    pub fn resolve_shot(&mut self, ticket: u64) -> Result<ShotOutcome, GameError> {
        if self.in_flight != Some(ticket) {
            return Err(GameError::NoPendingShot);
        }
        self.in_flight = None;

        let outcome = self.state.resolve_shot()?;
        self.flush();
        Ok(outcome)
    }

    /// Public view of the table.
    pub fn snapshot(&self) -> GameSnapshot {
        let state = &self.state;
        let deck = state.deck();
        GameSnapshot {
            players: state.roster().players().iter()
                .map(|p| PlayerView {
                    player_id: p.id.to_uuid_string(),
                    name: p.name.clone(),
                    health: p.health,
                    items: p.items,
                    armed: p.double_damage_armed,
                    alive: p.is_alive(),
                })
                .collect(),
            turn: state.current_turn(),
            shells_fired: deck.fired(),
            shells_total: deck.len(),
            round: state.rounds_loaded(),
            resolving: state.action_phase().is_resolving(),
            winner: match state.phase() {
                GamePhase::GameOver { winner } => Some(winner.to_uuid_string()),
                GamePhase::Open => None,
            },
            shells: self.config.reveal_shells.then(|| deck.shells().to_vec()),
        }
    }

    /// Read access to the game.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Broadcast a message to every connection.
    pub fn broadcast(&self, message: ServerMessage) {
        for (player_id, sender) in &self.connections {
            deliver(player_id, sender, message.clone());
        }
    }

    fn send_to(&self, player_id: &PlayerId, message: ServerMessage) {
        if let Some(sender) = self.connections.get(player_id) {
            deliver(player_id, sender, message);
        }
    }

    /// Route pending events, then broadcast the snapshot.
    fn flush(&mut self) {
        for event in self.state.take_events() {
            let message = ServerMessage::Event(NarrativeEvent::from(&event.data));
            match event.audience {
                Audience::Everyone => self.broadcast(message),
                Audience::Player(id) => self.send_to(&id, message),
            }
        }
        self.broadcast(ServerMessage::State(self.snapshot()));
    }

    fn reject(&self, player_id: &PlayerId, err: &GameError) {
        if err.is_silent() {
            debug!("Ignored intent from {}: {}", player_id.short(), err);
            return;
        }
        warn!("Rejected intent from {}: {}", player_id.short(), err);
        self.send_to(player_id, ServerMessage::Error(ServerError::from(err)));
    }
}

/// Queue `message` without waiting. A full queue drops it.
fn deliver(player_id: &PlayerId, sender: &mpsc::Sender<ServerMessage>, message: ServerMessage) {
    match sender.try_send(message) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            warn!("Outbound queue full for {}, dropping message", player_id.short());
        }
        Err(TrySendError::Closed(_)) => {
            debug!("Connection {} already closed", player_id.short());
        }
    }
}

/// Trim and shorten a display name; blank names get a seat-based default.
fn clean_name(name: &str, seat: usize) -> String {
    let name: String = name.trim().chars().take(MAX_NAME_LEN).collect();
    if name.is_empty() {
        format!("Player {}", seat + 1)
    } else {
        name
    }
}
