//! Shell Deck
//!
//! The shared magazine every player fires from. A round is a shuffled
//! multiset of live and blank shells plus a read cursor.

use serde::{Serialize, Deserialize};

use crate::core::rng::DeterministicRng;
use crate::game::action::GameError;
use crate::{MAX_LIVE_PER_ROUND, ROUND_SIZE};

/// One unit of deck content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shell {
    /// Deals damage when fired.
    Live,
    /// Harmless.
    Blank,
}

impl Shell {
    /// Whether this shell deals damage.
    #[inline]
    pub fn is_live(self) -> bool {
        matches!(self, Shell::Live)
    }
}

/// Live/blank split announced when a round is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundComposition {
    /// Number of live shells.
    pub live: u8,
    /// Number of blank shells.
    pub blank: u8,
}

/// Ordered shell sequence with a cursor at the next shell to fire.
///
/// Invariant: `next_index <= shells.len()`. When they are equal the deck
/// is exhausted and has to be regenerated before the next draw.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShellDeck {
    shells: Vec<Shell>,
    next_index: usize,
}

impl ShellDeck {
    /// Create an empty (exhausted) deck.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a deck with a fixed shell order, cursor at the start.
    pub fn from_shells(shells: Vec<Shell>) -> Self {
        Self { shells, next_index: 0 }
    }

    /// Load a fresh round.
    ///
    /// Draws the live count uniformly from `1..=5`, fills the rest of the six
    /// slots with blanks, shuffles and rewinds the cursor. A round never has
    /// zero or six live shells.
    pub fn regenerate(&mut self, rng: &mut DeterministicRng) -> RoundComposition {
        let live = rng.next_int_range(1, MAX_LIVE_PER_ROUND as u32) as usize;
        let blank = ROUND_SIZE - live;

        let mut shells = Vec::with_capacity(ROUND_SIZE);
        shells.extend(std::iter::repeat(Shell::Live).take(live));
        shells.extend(std::iter::repeat(Shell::Blank).take(blank));
        rng.shuffle(&mut shells);

        self.shells = shells;
        self.next_index = 0;

        #[cfg(feature = "debug-tracing")]
        tracing::trace!(shells = ?self.shells, "deck loaded");

        RoundComposition {
            live: live as u8,
            blank: blank as u8,
        }
    }

    /// Fire the next shell.
    pub fn draw(&mut self) -> Result<Shell, GameError> {
        let shell = self.peek_next().ok_or(GameError::DeckExhausted)?;
        self.next_index += 1;
        Ok(shell)
    }

    /// Look at the next shell without consuming it.
    pub fn peek_next(&self) -> Option<Shell> {
        self.shells.get(self.next_index).copied()
    }

    /// Eject the next shell without firing it.
    pub fn discard_next(&mut self) -> Result<Shell, GameError> {
        self.draw()
    }

    /// Whether every shell has been used.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.next_index >= self.shells.len()
    }

    /// Shells used so far this round.
    pub fn fired(&self) -> usize {
        self.next_index
    }

    /// Total shells in the current round.
    pub fn len(&self) -> usize {
        self.shells.len()
    }

    /// Whether no round has been loaded.
    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    /// Shells still to come.
    pub fn remaining(&self) -> usize {
        self.shells.len() - self.next_index
    }

    /// Full round contents, in firing order.
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }
}
