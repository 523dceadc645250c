//! Game Events
//!
//! Narrative events produced by the engine. The session layer turns them
//! into wire messages and routes them by [`Audience`].

use serde::{Serialize, Deserialize};

use crate::game::item::ItemKind;
use crate::game::shell::{RoundComposition, Shell};
use crate::game::state::PlayerId;

/// Who gets to see an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    /// Every connection.
    Everyone,
    /// A single player.
    Player(PlayerId),
}

/// Public result of using an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ItemEffect {
    /// Next shell was shown to the user only.
    Inspected,
    /// Health after healing.
    Healed { health: u8 },
    /// Next shot deals double damage.
    Armed,
    /// A shell was ejected unfired.
    Skipped { shell: Shell },
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Player took a seat.
    PlayerJoined {
        player_id: PlayerId,
        name: String,
        index: usize,
    },

    /// Player disconnected.
    PlayerLeft {
        player_id: PlayerId,
        name: String,
    },

    /// Shot fired; damage lands on resolution.
    ShotAnnounced {
        shooter: PlayerId,
        shooter_name: String,
        target: PlayerId,
        target_name: String,
        shell: Shell,
        is_self: bool,
    },

    /// Shot resolved.
    ShotResolved {
        shooter: PlayerId,
        target: PlayerId,
        shell: Shell,
        damage: u8,
        /// `None` if the target left before the shot landed.
        target_health: Option<u8>,
        turn_kept: bool,
    },

    /// Item consumed.
    ItemUsed {
        actor: PlayerId,
        actor_name: String,
        kind: ItemKind,
        effect: ItemEffect,
    },

    /// New round loaded.
    ShellsRegenerated {
        live: u8,
        blank: u8,
    },

    /// Private answer to an inspect. `None` if no shell was loaded.
    ShellRevealed {
        shell: Option<Shell>,
    },

    /// Player reached zero health.
    PlayerEliminated {
        player_id: PlayerId,
        name: String,
        index: usize,
    },

    /// One survivor left.
    GameOver {
        winner: PlayerId,
        winner_name: String,
    },

    /// Table cleared.
    GameRestarted,
}

/// An event and its audience.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Recipients
    pub audience: Audience,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Event for every connection.
    pub fn public(data: GameEventData) -> Self {
        Self { audience: Audience::Everyone, data }
    }

    /// Event for one player only.
    pub fn private(player_id: PlayerId, data: GameEventData) -> Self {
        Self { audience: Audience::Player(player_id), data }
    }

    /// Is this event visible to `player_id`?
    pub fn visible_to(&self, player_id: &PlayerId) -> bool {
        match self.audience {
            Audience::Everyone => true,
            Audience::Player(id) => id == *player_id,
        }
    }

    /// Create player joined event.
    pub fn player_joined(player_id: PlayerId, name: String, index: usize) -> Self {
        Self::public(GameEventData::PlayerJoined { player_id, name, index })
    }

    /// Create player left event.
    pub fn player_left(player_id: PlayerId, name: String) -> Self {
        Self::public(GameEventData::PlayerLeft { player_id, name })
    }

    /// Create shells regenerated event.
    pub fn shells_regenerated(round: RoundComposition) -> Self {
        Self::public(GameEventData::ShellsRegenerated {
            live: round.live,
            blank: round.blank,
        })
    }

    /// Create private reveal event.
    pub fn shell_revealed(player_id: PlayerId, shell: Option<Shell>) -> Self {
        Self::private(player_id, GameEventData::ShellRevealed { shell })
    }

    /// Create player eliminated event.
    pub fn player_eliminated(player_id: PlayerId, name: String, index: usize) -> Self {
        Self::public(GameEventData::PlayerEliminated { player_id, name, index })
    }

    /// Create game over event.
    pub fn game_over(winner: PlayerId, winner_name: String) -> Self {
        Self::public(GameEventData::GameOver { winner, winner_name })
    }

    /// Create game restarted event.
    pub fn game_restarted() -> Self {
        Self::public(GameEventData::GameRestarted)
    }
}
