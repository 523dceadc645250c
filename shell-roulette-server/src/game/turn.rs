//! Turn Sequencer
//!
//! Tracks whose action is valid and moves the turn around the table,
//! skipping eliminated seats.

use serde::{Serialize, Deserialize};

use crate::game::state::Roster;

/// Pointer at the seat whose action is valid now.
///
/// Invariant: whenever at least one living player is seated, the pointer
/// is on a living seat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSequencer {
    current: usize,
}

impl TurnSequencer {
    /// Start at the first seat.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat holding the turn.
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Move to the next living seat, wrapping around.
    ///
    /// If the current player is the only one alive the pointer comes back to
    /// them. With nobody alive the pointer stays put.
    pub fn advance(&mut self, roster: &Roster) {
        let len = roster.len();
        if len == 0 {
            self.current = 0;
            return;
        }
        if roster.living_count() == 0 {
            return;
        }
        loop {
            self.current = (self.current + 1) % len;
            if roster.is_living(self.current) {
                break;
            }
        }
    }

    /// Re-index after the seat at `removed` left. `roster` is the roster
    /// after removal.
    pub fn seat_removed(&mut self, removed: usize, roster: &Roster) {
        let len = roster.len();
        if len == 0 {
            self.current = 0;
            return;
        }

        if removed < self.current {
            // Same player, one seat lower
            self.current -= 1;
        } else if removed == self.current {
            // The successor slid into the vacated seat
            if self.current >= len {
                self.current = 0;
            }
            self.settle(roster);
        }
    }

    /// Move off an eliminated seat, if on one.
    pub fn settle(&mut self, roster: &Roster) {
        if !roster.is_living(self.current) {
            self.advance(roster);
        }
    }

    /// Back to the first seat.
    pub fn reset(&mut self) {
        self.current = 0;
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, index: usize) {
        self.current = index;
    }
}
