//! Network Layer
//!
//! WebSocket server and session plumbing around the game engine.
//! Nothing in here decides game outcomes; all rules live in `game/`.

pub mod protocol;
pub mod session;
pub mod server;

pub use protocol::{ClientMessage, ServerMessage, GameSnapshot, NarrativeEvent, ErrorCode};
pub use session::{GameSession, SessionConfig, SessionId, Followup};
pub use server::{GameServer, ServerConfig, GameServerError};
