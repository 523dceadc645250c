//! Core deterministic primitives.
//!
//! Everything random in the game engine flows through [`DeterministicRng`],
//! so a session seeded with the same value deals the same decks and items.

pub mod rng;

pub use rng::{derive_session_seed, DeterministicRng};
