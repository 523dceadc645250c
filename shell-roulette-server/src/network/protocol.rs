//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Messages are JSON text frames tagged by `type`. Clients may also send
//! a two-byte bincode [`CompactIntent`] as a binary frame.

use serde::{Serialize, Deserialize};

use crate::game::action::GameError;
use crate::game::events::{GameEventData, ItemEffect};
use crate::game::item::{Inventory, ItemKind};
use crate::game::shell::Shell;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Take a seat.
    Join { name: String },

    /// Fire at a seat.
    Shoot { target: usize },

    /// Consume an item.
    UseItem { kind: ItemKind },

    /// Clear the table.
    Restart,

    /// Debug: eliminate a seat outright.
    Kill { target: usize },

    /// Ping for latency measurement.
    Ping { timestamp: u64 },

    /// Give up the seat.
    Leave,
}

/// Binary intent: one opcode byte and one argument byte.
///
/// | op | intent | arg |
/// |----|--------|-----|
/// | 1 | shoot | target seat |
/// | 2 | use_item | item slot (0-3) |
/// | 3 | restart | - |
/// | 4 | kill | target seat |
/// | 5 | leave | - |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactIntent {
    /// Intent selector.
    pub op: u8,
    /// Seat or item slot.
    pub arg: u8,
}

impl CompactIntent {
    /// Expand into a full message. Unknown opcodes yield `None`.
    pub fn into_message(self) -> Option<ClientMessage> {
        match self.op {
            1 => Some(ClientMessage::Shoot { target: self.arg as usize }),
            2 => ItemKind::ALL.get(self.arg as usize)
                .map(|kind| ClientMessage::UseItem { kind: *kind }),
            3 => Some(ClientMessage::Restart),
            4 => Some(ClientMessage::Kill { target: self.arg as usize }),
            5 => Some(ClientMessage::Leave),
            _ => None,
        }
    }

    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect.
    Welcome { player_id: String, server_version: String },

    /// Full public table state.
    State(GameSnapshot),

    /// Narrative event.
    Event(NarrativeEvent),

    /// Pong response.
    Pong { timestamp: u64, server_time: u64 },

    /// Rejected intent.
    Error(ServerError),

    /// Server is shutting down.
    Shutdown { reason: String },
}

/// Public table state, broadcast after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Seats in order.
    pub players: Vec<PlayerView>,
    /// Seat holding the turn.
    pub turn: usize,
    /// Shells used this round.
    pub shells_fired: usize,
    /// Shells in this round.
    pub shells_total: usize,
    /// Rounds loaded since the last restart.
    pub round: u32,
    /// A shot is waiting for resolution.
    pub resolving: bool,
    /// Winner, once the game is over.
    pub winner: Option<String>,
    /// Deck contents in firing order. Only sent when revealing is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shells: Option<Vec<Shell>>,
}

/// One seat in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Player identifier (UUID string).
    pub player_id: String,
    /// Display name.
    pub name: String,
    /// Remaining health.
    pub health: u8,
    /// Item counts.
    pub items: Inventory,
    /// Double damage loaded.
    pub armed: bool,
    /// Health above zero.
    pub alive: bool,
}

/// Narrative events. Player ids are UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NarrativeEvent {
    /// Player took a seat.
    Joined {
        player_id: String,
        name: String,
        index: usize,
    },

    /// Player disconnected.
    Left {
        player_id: String,
        name: String,
    },

    /// Shot fired, consequences pending.
    ShotAnnounced {
        shooter: String,
        shooter_name: String,
        target: String,
        target_name: String,
        shell: Shell,
        is_self: bool,
    },

    /// Shot landed.
    ShotResolved {
        shooter: String,
        target: String,
        shell: Shell,
        damage: u8,
        /// Null if the target left before the shot landed.
        target_health: Option<u8>,
        turn_kept: bool,
    },

    /// Item consumed.
    ItemUsed {
        actor: String,
        actor_name: String,
        kind: ItemKind,
        result: ItemEffect,
    },

    /// New round loaded.
    ShellsRegenerated {
        live: u8,
        blank: u8,
    },

    /// Private answer to an inspect.
    Reveal {
        shell: Option<Shell>,
    },

    /// Player reached zero health.
    Eliminated {
        player_id: String,
        name: String,
        index: usize,
    },

    /// One survivor left.
    GameOver {
        winner: String,
        winner_name: String,
    },

    /// Table cleared.
    Restarted,
}

impl From<&GameEventData> for NarrativeEvent {
    fn from(data: &GameEventData) -> Self {
        match data {
            GameEventData::PlayerJoined { player_id, name, index } => NarrativeEvent::Joined {
                player_id: player_id.to_uuid_string(),
                name: name.clone(),
                index: *index,
            },
            GameEventData::PlayerLeft { player_id, name } => NarrativeEvent::Left {
                player_id: player_id.to_uuid_string(),
                name: name.clone(),
            },
            GameEventData::ShotAnnounced { shooter, shooter_name, target, target_name, shell, is_self } => {
                NarrativeEvent::ShotAnnounced {
                    shooter: shooter.to_uuid_string(),
                    shooter_name: shooter_name.clone(),
                    target: target.to_uuid_string(),
                    target_name: target_name.clone(),
                    shell: *shell,
                    is_self: *is_self,
                }
            }
            GameEventData::ShotResolved { shooter, target, shell, damage, target_health, turn_kept } => {
                NarrativeEvent::ShotResolved {
                    shooter: shooter.to_uuid_string(),
                    target: target.to_uuid_string(),
                    shell: *shell,
                    damage: *damage,
                    target_health: *target_health,
                    turn_kept: *turn_kept,
                }
            }
            GameEventData::ItemUsed { actor, actor_name, kind, effect } => NarrativeEvent::ItemUsed {
                actor: actor.to_uuid_string(),
                actor_name: actor_name.clone(),
                kind: *kind,
                result: *effect,
            },
            GameEventData::ShellsRegenerated { live, blank } => NarrativeEvent::ShellsRegenerated {
                live: *live,
                blank: *blank,
            },
            GameEventData::ShellRevealed { shell } => NarrativeEvent::Reveal { shell: *shell },
            GameEventData::PlayerEliminated { player_id, name, index } => NarrativeEvent::Eliminated {
                player_id: player_id.to_uuid_string(),
                name: name.clone(),
                index: *index,
            },
            GameEventData::GameOver { winner, winner_name } => NarrativeEvent::GameOver {
                winner: winner.to_uuid_string(),
                winner_name: winner_name.clone(),
            },
            GameEventData::GameRestarted => NarrativeEvent::Restarted,
        }
    }
}

/// Server error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ServerError {
    /// Error with a code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl From<&GameError> for ServerError {
    fn from(err: &GameError) -> Self {
        Self::new(ErrorCode::from(err), err.to_string())
    }
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Acted out of turn.
    NotYourTurn,
    /// Shot still resolving.
    ActionInProgress,
    /// Item not held.
    NoItem,
    /// Double damage already loaded.
    AlreadyArmed,
    /// Table full.
    RosterFull,
    /// Already seated.
    AlreadyJoined,
    /// Deck empty.
    DeckExhausted,
    /// Game finished.
    GameOver,
    /// Bad target seat.
    InvalidTarget,
    /// Join first.
    NotJoined,
    /// Nothing to resolve.
    NoPendingShot,
    /// Debug intents off.
    DebugDisabled,
    /// Malformed message.
    InvalidInput,
}

impl From<&GameError> for ErrorCode {
    fn from(err: &GameError) -> Self {
        match err {
            GameError::NotYourTurn => ErrorCode::NotYourTurn,
            GameError::ActionInProgress => ErrorCode::ActionInProgress,
            GameError::NoItem(_) => ErrorCode::NoItem,
            GameError::AlreadyArmed => ErrorCode::AlreadyArmed,
            GameError::RosterFull => ErrorCode::RosterFull,
            GameError::AlreadyJoined => ErrorCode::AlreadyJoined,
            GameError::DeckExhausted => ErrorCode::DeckExhausted,
            GameError::GameOver => ErrorCode::GameOver,
            GameError::InvalidTarget => ErrorCode::InvalidTarget,
            GameError::NotJoined => ErrorCode::NotJoined,
            GameError::NoPendingShot => ErrorCode::NoPendingShot,
            GameError::DebugDisabled => ErrorCode::DebugDisabled,
        }
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
