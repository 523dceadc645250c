//! Game State Definitions
//!
//! Player roster and the authoritative game aggregate. Every mutation of
//! roster, deck, turn pointer and phases goes through [`GameState`].

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::core::rng::DeterministicRng;
use crate::game::action::{ActionPhase, GameError};
use crate::game::events::GameEvent;
use crate::game::item::{self, Inventory};
use crate::game::shell::{RoundComposition, ShellDeck};
use crate::game::turn::TurnSequencer;
use crate::{MAX_HP, MAX_PLAYERS};

// =============================================================================
// PLAYER ID
// =============================================================================

/// Unique player identifier (UUID as bytes).
///
/// Assigned per connection. In-flight actions refer to players by id so a
/// roster reshuffle cannot redirect them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Fresh random id.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Short hex form for logs.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// A seated player and their combat state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    /// Connection-bound identity.
    pub id: PlayerId,

    /// Display name.
    pub name: String,

    /// Remaining health, `0..=MAX_HP`. Zero means eliminated.
    pub health: u8,

    /// Item counts.
    pub items: Inventory,

    /// Next fired shot deals double damage.
    pub double_damage_armed: bool,
}

impl PlayerState {
    /// Seat a new player at full health.
    pub fn new(id: PlayerId, name: impl Into<String>, items: Inventory) -> Self {
        Self {
            id,
            name: name.into(),
            health: MAX_HP,
            items,
            double_damage_armed: false,
        }
    }

    /// Still in the game?
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Subtract damage, never going below zero. Returns the damage dealt.
    pub fn take_damage(&mut self, amount: u8) -> u8 {
        let dealt = amount.min(self.health);
        self.health -= dealt;
        dealt
    }

    /// Restore one health, capped at `MAX_HP`.
    pub fn heal(&mut self) {
        self.health = (self.health + 1).min(MAX_HP);
    }
}

// =============================================================================
// ROSTER
// =============================================================================

/// Seats in join order.
///
/// Eliminated players keep their seat so indices stay stable; only a
/// disconnect removes a seat.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<PlayerState>,
}

impl Roster {
    /// Empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a player at full health. Returns the new seat index.
    pub fn add(&mut self, player: PlayerState) -> Result<usize, GameError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::RosterFull);
        }
        if self.index_of(&player.id).is_some() {
            return Err(GameError::AlreadyJoined);
        }
        self.players.push(player);
        Ok(self.players.len() - 1)
    }

    /// Remove a player by id, returning their former seat and state.
    pub fn remove(&mut self, id: &PlayerId) -> Option<(usize, PlayerState)> {
        let index = self.index_of(id)?;
        Some((index, self.players.remove(index)))
    }

    /// Seat index of a player.
    pub fn index_of(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == *id)
    }

    /// Player at a seat.
    pub fn get(&self, index: usize) -> Option<&PlayerState> {
        self.players.get(index)
    }

    /// Player at a seat, mutably.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut PlayerState> {
        self.players.get_mut(index)
    }

    /// Is the seat occupied by a living player?
    pub fn is_living(&self, index: usize) -> bool {
        self.players.get(index).is_some_and(PlayerState::is_alive)
    }

    /// Number of players with health left.
    pub fn living_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive()).count()
    }

    /// All seats in order.
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    /// Seats, mutably.
    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut PlayerState> {
        self.players.iter_mut()
    }

    /// Number of seats.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// No one seated?
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Drop every seat.
    pub fn clear(&mut self) {
        self.players.clear();
    }
}

// =============================================================================
// GAME PHASE
// =============================================================================

/// Whether the game still accepts actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum GamePhase {
    /// Players may join and act.
    #[default]
    Open,
    /// One survivor left. Only a restart leaves this phase.
    GameOver {
        /// The last living player.
        winner: PlayerId,
    },
}

// =============================================================================
// GAME STATE
// =============================================================================

/// The authoritative game aggregate.
///
/// Owns the roster, deck, turn pointer, in-flight action lock and RNG.
/// Operations append [`GameEvent`]s to a pending queue which the caller
/// drains with [`GameState::take_events`].
#[derive(Clone, Debug)]
pub struct GameState {
    /// Session identifier.
    pub session_id: [u8; 16],

    pub(crate) roster: Roster,
    pub(crate) deck: ShellDeck,
    pub(crate) turn: TurnSequencer,
    pub(crate) action: ActionPhase,
    pub(crate) phase: GamePhase,

    /// Number of rounds loaded since the last restart.
    pub(crate) rounds_loaded: u32,

    pub(crate) rng: DeterministicRng,

    pending_events: Vec<GameEvent>,
}

impl GameState {
    /// Create an empty game.
    pub fn new(session_id: [u8; 16], rng_seed: u64) -> Self {
        Self {
            session_id,
            roster: Roster::new(),
            deck: ShellDeck::new(),
            turn: TurnSequencer::new(),
            action: ActionPhase::Idle,
            phase: GamePhase::Open,
            rounds_loaded: 0,
            rng: DeterministicRng::new(rng_seed),
            pending_events: Vec::new(),
        }
    }

    /// Seat a new player with full health and a random starting inventory.
    ///
    /// The first join loads the opening round.
    pub fn join(&mut self, id: PlayerId, name: impl Into<String>) -> Result<usize, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if self.roster.len() >= MAX_PLAYERS {
            return Err(GameError::RosterFull);
        }
        if self.roster.index_of(&id).is_some() {
            return Err(GameError::AlreadyJoined);
        }

        let items = item::initial_inventory(&mut self.rng);
        let player = PlayerState::new(id, name, items);
        let name = player.name.clone();
        let index = self.roster.add(player)?;

        info!("Player {} ({}) took seat {}", name, id.short(), index);
        self.push_event(GameEvent::player_joined(id, name, index));

        if self.deck.is_empty() {
            self.reload_deck();
        }

        Ok(index)
    }

    /// Remove a disconnected player. Unknown ids are ignored.
    ///
    /// The turn pointer keeps following the player who holds the turn; if
    /// the departing player held it, it passes to the next living seat.
    pub fn leave(&mut self, id: &PlayerId) -> Option<PlayerState> {
        let (index, player) = self.roster.remove(id)?;
        self.turn.seat_removed(index, &self.roster);

        info!("Player {} ({}) left seat {}", player.name, id.short(), index);
        self.push_event(GameEvent::player_left(*id, player.name.clone()));

        if self.roster.is_empty() {
            // Empty table: the next join starts a new game
            self.deck = ShellDeck::new();
            self.turn.reset();
            self.action = ActionPhase::Idle;
            self.phase = GamePhase::Open;
        } else {
            self.check_win();
        }
        Some(player)
    }

    /// Reset to an empty table. The next join loads a fresh deck.
    pub fn restart(&mut self) {
        self.roster.clear();
        self.deck = ShellDeck::new();
        self.turn.reset();
        self.action = ActionPhase::Idle;
        self.phase = GamePhase::Open;
        self.rounds_loaded = 0;

        info!("Game restarted");
        self.push_event(GameEvent::game_restarted());
    }

    /// Load a new round and top up every living player's items.
    pub(crate) fn reload_deck(&mut self) -> RoundComposition {
        let round = self.deck.regenerate(&mut self.rng);
        self.rounds_loaded += 1;

        for player in self.roster.players_mut() {
            if player.is_alive() {
                let granted = item::grant(&mut player.items, &mut self.rng);
                if !granted.is_empty() {
                    debug!("Granted {:?} to {}", granted, player.id.short());
                }
            }
        }

        debug!("Loaded round {}: {} live / {} blank", self.rounds_loaded, round.live, round.blank);
        self.push_event(GameEvent::shells_regenerated(round));
        round
    }

    /// Reload if every shell has been used.
    pub(crate) fn reload_if_exhausted(&mut self) {
        if self.deck.is_exhausted() {
            self.reload_deck();
        }
    }

    /// Enter game over if exactly one player is standing at a table of
    /// two or more. Returns the winner if the game ended just now.
    pub(crate) fn check_win(&mut self) -> Option<PlayerId> {
        if self.is_over() || self.roster.len() < 2 || self.roster.living_count() != 1 {
            return None;
        }

        let winner = self.roster.players().iter().find(|p| p.is_alive())?;
        let (winner_id, winner_name) = (winner.id, winner.name.clone());

        self.phase = GamePhase::GameOver { winner: winner_id };
        info!("Game over: {} ({}) wins", winner_name, winner_id.short());
        self.push_event(GameEvent::game_over(winner_id, winner_name));
        Some(winner_id)
    }

    /// Replace the deck with a prepared one (fixed deals and replays).
    pub fn load_deck(&mut self, deck: ShellDeck) {
        self.deck = deck;
    }

    /// Seated players.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Current round.
    pub fn deck(&self) -> &ShellDeck {
        &self.deck
    }

    /// Seat whose action is valid now.
    pub fn current_turn(&self) -> usize {
        self.turn.current()
    }

    /// Whether a shot is waiting for resolution.
    pub fn action_phase(&self) -> &ActionPhase {
        &self.action
    }

    /// Open or over.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Has the game ended?
    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver { .. })
    }

    /// Rounds loaded since the last restart.
    pub fn rounds_loaded(&self) -> u32 {
        self.rounds_loaded
    }

    /// Seat of a player, or `NotJoined`.
    pub(crate) fn seat_of(&self, id: &PlayerId) -> Result<usize, GameError> {
        self.roster.index_of(id).ok_or(GameError::NotJoined)
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
