//! # Shell Roulette Server
//!
//! Authoritative game server for Shell Roulette, a turn-based elimination
//! game played around one shared, randomly loaded shell deck.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  SHELL ROULETTE SERVER                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │                                                              │
//! │  game/           - Game engine (no I/O)                      │
//! │  ├── shell.rs    - Shell deck                                │
//! │  ├── item.rs     - Items and inventory grants                │
//! │  ├── state.rs    - Players, roster, game aggregate           │
//! │  ├── turn.rs     - Turn sequencing                           │
//! │  ├── action.rs   - Shot and item resolution                  │
//! │  └── events.rs   - Narrative events                          │
//! │                                                              │
//! │  network/        - Networking                                │
//! │  ├── server.rs   - WebSocket server                          │
//! │  ├── protocol.rs - Message types                             │
//! │  └── session.rs  - Session, routing and snapshots            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! `core/` and `game/` draw all randomness from one seeded
//! [`DeterministicRng`]. Given the same seed and the same sequence of
//! intents, a game plays out identically, which is what the tests rely on.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use game::state::{GameState, PlayerState, PlayerId};
pub use game::action::GameError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seats at the table.
pub const MAX_PLAYERS: usize = 8;

/// Starting (and maximum) health.
pub const MAX_HP: u8 = 4;

/// Items a player may hold across all kinds after a grant.
pub const MAX_ITEM_TOTAL: u8 = 6;

/// Items dealt on join.
pub const INITIAL_ITEM_TOTAL: u8 = 6;

/// Items granted per reload, space permitting.
pub const ITEMS_PER_GRANT: u8 = 2;

/// Shells per round.
pub const ROUND_SIZE: usize = 6;

/// Most live shells a round can hold. There is always at least one.
pub const MAX_LIVE_PER_ROUND: usize = 5;

/// Default pause between a shot's announcement and its resolution.
pub const DEFAULT_RESOLVE_DELAY_MS: u64 = 900;
