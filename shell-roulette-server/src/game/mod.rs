//! Game Logic Module
//!
//! The authoritative engine. No I/O; all randomness comes from the
//! session RNG.
//!
//! ## Module Structure
//!
//! - `shell`: Shell deck and round generation
//! - `item`: Item kinds, inventories and grants
//! - `state`: Players, roster and the game aggregate
//! - `turn`: Turn sequencing
//! - `action`: Shot and item resolution
//! - `events`: Narrative events for observers

pub mod shell;
pub mod item;
pub mod state;
pub mod turn;
pub mod action;
pub mod events;

// Re-export key types
pub use shell::{Shell, ShellDeck};
pub use item::{Inventory, ItemKind};
pub use state::{GameState, GamePhase, PlayerState, PlayerId, Roster};
pub use action::{ActionPhase, GameError, PendingShot, ShotOutcome};
pub use events::{Audience, GameEvent, GameEventData, ItemEffect};
