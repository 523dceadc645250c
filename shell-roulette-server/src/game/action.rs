//! Action Resolver
//!
//! Validates and executes shots and item use against [`GameState`].
//!
//! Shooting is two-phase. [`GameState::begin_shot`] draws the shell,
//! announces it and locks the table in [`ActionPhase::Resolving`];
//! [`GameState::resolve_shot`] applies damage, moves the turn and unlocks.
//! The caller decides how long to wait in between. While the lock is held
//! every other shot or item use is rejected with
//! [`GameError::ActionInProgress`].

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::game::events::{GameEvent, GameEventData, ItemEffect};
use crate::game::item::ItemKind;
use crate::game::shell::Shell;
use crate::game::state::{GameState, PlayerId};

/// Engine errors. None of them is fatal: every rejected intent leaves the
/// state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Actor does not hold the turn.
    #[error("Not your turn")]
    NotYourTurn,

    /// A shot is waiting for resolution.
    #[error("Action already in progress")]
    ActionInProgress,

    /// Actor holds none of the requested item.
    #[error("No {0:?} left")]
    NoItem(ItemKind),

    /// Double damage is already loaded.
    #[error("Double damage already armed")]
    AlreadyArmed,

    /// Table is at capacity.
    #[error("Roster is full")]
    RosterFull,

    /// Connection already has a seat.
    #[error("Already joined")]
    AlreadyJoined,

    /// No shells left; recovered by reloading.
    #[error("Shell deck exhausted")]
    DeckExhausted,

    /// Game has a winner; only a restart is accepted.
    #[error("Game is over")]
    GameOver,

    /// Target seat is empty or eliminated.
    #[error("Invalid target")]
    InvalidTarget,

    /// Connection has no seat.
    #[error("Not joined")]
    NotJoined,

    /// Resolution requested with no shot in flight.
    #[error("No shot pending")]
    NoPendingShot,

    /// Debug intents are switched off.
    #[error("Debug commands disabled")]
    DebugDisabled,
}

impl GameError {
    /// Errors the client never hears about.
    ///
    /// A late shot while another is in flight is simply too late.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            GameError::ActionInProgress | GameError::DeckExhausted | GameError::NoPendingShot
        )
    }
}

/// A fired shot awaiting resolution. Players are captured by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingShot {
    /// Who pulled the trigger.
    pub shooter: PlayerId,
    /// Who was aimed at.
    pub target: PlayerId,
    /// The drawn shell.
    pub shell: Shell,
    /// Shooter aimed at themselves.
    pub is_self: bool,
}

/// In-flight lock.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionPhase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Shot announced, consequences pending.
    Resolving(PendingShot),
}

impl ActionPhase {
    /// Is a shot in flight?
    pub fn is_resolving(&self) -> bool {
        matches!(self, ActionPhase::Resolving(_))
    }
}

/// What a resolved shot did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShotOutcome {
    /// The shot itself.
    pub shot: PendingShot,
    /// Health removed from the target.
    pub damage: u8,
    /// Target health afterwards, `None` if the target disconnected.
    pub target_health: Option<u8>,
    /// Shooter keeps the turn (blank at themselves).
    pub turn_kept: bool,
    /// Set if this shot eliminated the target.
    pub eliminated: Option<PlayerId>,
    /// Set if this shot ended the game.
    pub winner: Option<PlayerId>,
}

impl GameState {
    /// Check that `actor` may act now and return their seat.
    fn acting_seat(&self, actor: &PlayerId) -> Result<usize, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let seat = self.seat_of(actor)?;
        if seat != self.turn.current() || !self.roster.is_living(seat) {
            return Err(GameError::NotYourTurn);
        }
        if self.action.is_resolving() {
            return Err(GameError::ActionInProgress);
        }
        Ok(seat)
    }

    /// Fire at the seat `target_index`.
    ///
    /// Draws the next shell (reloading first if the deck is empty), announces
    /// the shot to everyone and locks the table until
    /// [`GameState::resolve_shot`].
    pub fn begin_shot(&mut self, actor: &PlayerId, target_index: usize) -> Result<PendingShot, GameError> {
        let seat = self.acting_seat(actor)?;
        let target = self.roster.get(target_index)
            .filter(|p| p.is_alive())
            .ok_or(GameError::InvalidTarget)?;
        let (target_id, target_name) = (target.id, target.name.clone());

        self.reload_if_exhausted();
        let shell = self.deck.draw()?;

        let shooter_name = self.roster.get(seat).map(|p| p.name.clone()).unwrap_or_default();
        let shot = PendingShot {
            shooter: *actor,
            target: target_id,
            shell,
            is_self: seat == target_index,
        };
        self.action = ActionPhase::Resolving(shot.clone());

        debug!("{} fires {:?} at seat {}", actor.short(), shell, target_index);
        self.push_event(GameEvent::public(GameEventData::ShotAnnounced {
            shooter: shot.shooter,
            shooter_name,
            target: shot.target,
            target_name,
            shell,
            is_self: shot.is_self,
        }));

        Ok(shot)
    }

    /// Land the pending shot and unlock the table.
    ///
    /// Players are looked up by id, so seats shifted by a disconnect during
    /// the delay are handled. A live shell deals 1 damage, or 2 if the
    /// shooter was armed; the armed flag clears on every shot. A blank at
    /// oneself keeps the turn, anything else passes it on.
    pub fn resolve_shot(&mut self) -> Result<ShotOutcome, GameError> {
        let shot = match std::mem::take(&mut self.action) {
            ActionPhase::Resolving(shot) => shot,
            ActionPhase::Idle => return Err(GameError::NoPendingShot),
        };

        let shooter_seat = self.roster.index_of(&shot.shooter);
        let armed = shooter_seat
            .and_then(|i| self.roster.get_mut(i))
            .map(|p| std::mem::take(&mut p.double_damage_armed))
            .unwrap_or(false);

        let mut damage = 0;
        let mut target_health = None;
        let mut eliminated = None;
        if let Some(target_seat) = self.roster.index_of(&shot.target) {
            if let Some(target) = self.roster.get_mut(target_seat) {
                if shot.shell.is_live() {
                    let was_alive = target.is_alive();
                    damage = target.take_damage(if armed { 2 } else { 1 });
                    if was_alive && !target.is_alive() {
                        eliminated = Some((target.id, target.name.clone(), target_seat));
                    }
                }
                target_health = Some(target.health);
            }
        }

        let turn_kept = !shot.shell.is_live() && shot.is_self;
        if shooter_seat.is_some() && !turn_kept {
            self.turn.advance(&self.roster);
        } else {
            // Shooter left mid-flight: the turn already moved on
            self.turn.settle(&self.roster);
        }

        self.push_event(GameEvent::public(GameEventData::ShotResolved {
            shooter: shot.shooter,
            target: shot.target,
            shell: shot.shell,
            damage,
            target_health,
            turn_kept,
        }));
        if let Some((id, name, seat)) = &eliminated {
            info!("{} eliminated at seat {}", name, seat);
            self.push_event(GameEvent::player_eliminated(*id, name.clone(), *seat));
        }

        self.reload_if_exhausted();
        let winner = self.check_win();

        Ok(ShotOutcome {
            shot,
            damage,
            target_health,
            turn_kept,
            eliminated: eliminated.map(|(id, _, _)| id),
            winner,
        })
    }

    /// Consume one item and apply its effect. Never moves the turn.
    pub fn use_item(&mut self, actor: &PlayerId, kind: ItemKind) -> Result<ItemEffect, GameError> {
        let seat = self.acting_seat(actor)?;
        let player = self.roster.get(seat).ok_or(GameError::NotJoined)?;
        if player.items.count(kind) == 0 {
            return Err(GameError::NoItem(kind));
        }
        // Checked before consuming so a redundant saw is not wasted
        if kind == ItemKind::DoubleDamage && player.double_damage_armed {
            return Err(GameError::AlreadyArmed);
        }
        let actor_name = player.name.clone();

        if kind == ItemKind::Skip {
            self.reload_if_exhausted();
        }

        let player = self.roster.get_mut(seat).ok_or(GameError::NotJoined)?;
        player.items.take(kind);

        let effect = match kind {
            ItemKind::Inspect => ItemEffect::Inspected,
            ItemKind::Heal => {
                player.heal();
                ItemEffect::Healed { health: player.health }
            }
            ItemKind::DoubleDamage => {
                player.double_damage_armed = true;
                ItemEffect::Armed
            }
            ItemKind::Skip => ItemEffect::Skipped { shell: self.deck.discard_next()? },
        };

        debug!("{} used {:?}: {:?}", actor.short(), kind, effect);
        self.push_event(GameEvent::public(GameEventData::ItemUsed {
            actor: *actor,
            actor_name,
            kind,
            effect,
        }));
        if kind == ItemKind::Inspect {
            let next = self.deck.peek_next();
            self.push_event(GameEvent::shell_revealed(*actor, next));
        }
        if kind == ItemKind::Skip {
            self.reload_if_exhausted();
        }

        Ok(effect)
    }

    /// Debug: drop a player to zero health. Returns the winner if this
    /// ended the game.
    pub fn eliminate(&mut self, target_index: usize) -> Result<Option<PlayerId>, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if self.action.is_resolving() {
            return Err(GameError::ActionInProgress);
        }
        let target = self.roster.get_mut(target_index)
            .filter(|p| p.is_alive())
            .ok_or(GameError::InvalidTarget)?;
        target.health = 0;
        let (id, name) = (target.id, target.name.clone());

        info!("{} killed at seat {} (debug)", name, target_index);
        self.push_event(GameEvent::player_eliminated(id, name, target_index));
        self.turn.settle(&self.roster);
        Ok(self.check_win())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::item::Inventory;
    use crate::game::shell::ShellDeck;
    use crate::game::state::Roster;
    use crate::MAX_HP;
    use proptest::prelude::*;

    fn pid(n: u8) -> PlayerId {
        PlayerId::new([n; 16])
    }

    fn table(players: u8, seed: u64) -> GameState {
        let mut state = GameState::new([0; 16], seed);
        for i in 0..players {
            state.join(pid(i), format!("p{}", i)).unwrap();
        }
        state.take_events();
        state
    }

    fn with_items(state: &mut GameState, seat: usize, items: Inventory) {
        state.roster.get_mut(seat).unwrap().items = items;
    }

    fn count_reloads(events: &[GameEvent]) -> usize {
        events.iter()
            .filter(|e| matches!(e.data, GameEventData::ShellsRegenerated { .. }))
            .count()
    }

    fn next_living(roster: &Roster, from: usize) -> usize {
        let mut i = from;
        loop {
            i = (i + 1) % roster.len();
            if roster.is_living(i) {
                return i;
            }
        }
    }

    #[test]
    fn test_two_player_scenario() {
        let mut state = table(2, 1);
        state.load_deck(ShellDeck::from_shells(vec![Shell::Live, Shell::Blank]));

        state.begin_shot(&pid(0), 1).unwrap();
        let outcome = state.resolve_shot().unwrap();
        assert_eq!(outcome.damage, 1);
        assert_eq!(state.roster().get(1).unwrap().health, 3);
        assert_eq!(state.current_turn(), 1);

        let rounds = state.rounds_loaded();
        let shot = state.begin_shot(&pid(1), 1).unwrap();
        assert_eq!(shot.shell, Shell::Blank);
        assert!(shot.is_self);
        let outcome = state.resolve_shot().unwrap();
        assert!(outcome.turn_kept);
        assert_eq!(state.current_turn(), 1);

        // Deck ran out on that shot and was reloaded
        assert_eq!(state.rounds_loaded(), rounds + 1);
        assert_eq!(state.deck().len(), 6);
        assert_eq!(state.deck().fired(), 0);
        let live = state.deck().shells().iter().filter(|s| s.is_live()).count();
        assert!((1..=5).contains(&live));
    }

    #[test]
    fn test_heal_at_full_health_is_capped() {
        let mut state = table(4, 2);
        with_items(&mut state, 0, Inventory { heal: 2, ..Inventory::EMPTY });

        let effect = state.use_item(&pid(0), ItemKind::Heal).unwrap();
        assert_eq!(effect, ItemEffect::Healed { health: MAX_HP });
        let p0 = state.roster().get(0).unwrap();
        assert_eq!(p0.health, 4);
        assert_eq!(p0.items.heal, 1);
        assert_eq!(state.current_turn(), 0);
    }

    #[test]
    fn test_skip_exhaustion_reloads_once_and_grants() {
        let mut state = table(3, 3);
        for seat in 0..3 {
            with_items(&mut state, seat, Inventory { skip: 2, ..Inventory::EMPTY });
        }
        state.roster.get_mut(2).unwrap().health = 0;
        state.load_deck(ShellDeck::from_shells(vec![Shell::Blank, Shell::Live]));

        let first = state.use_item(&pid(0), ItemKind::Skip).unwrap();
        assert_eq!(first, ItemEffect::Skipped { shell: Shell::Blank });
        assert_eq!(count_reloads(&state.take_events()), 0);

        let second = state.use_item(&pid(0), ItemKind::Skip).unwrap();
        assert_eq!(second, ItemEffect::Skipped { shell: Shell::Live });
        assert_eq!(count_reloads(&state.take_events()), 1);

        // Grants landed before the next draw
        assert_eq!(state.roster().get(0).unwrap().items.total(), 2);
        assert_eq!(state.roster().get(1).unwrap().items.total(), 4);
        assert_eq!(state.roster().get(2).unwrap().items.total(), 2);
        assert_eq!(state.deck().fired(), 0);
        assert_eq!(state.current_turn(), 0);

        state.begin_shot(&pid(0), 1).unwrap();
        state.resolve_shot().unwrap();
        assert_eq!(count_reloads(&state.take_events()), 0);
    }

    #[test]
    fn test_not_your_turn() {
        let mut state = table(3, 4);
        assert_eq!(state.begin_shot(&pid(1), 0), Err(GameError::NotYourTurn));
        assert_eq!(state.use_item(&pid(2), ItemKind::Heal), Err(GameError::NotYourTurn));
        assert_eq!(state.begin_shot(&pid(9), 0), Err(GameError::NotJoined));
    }

    #[test]
    fn test_second_shot_rejected_while_resolving() {
        let mut state = table(2, 5);
        state.load_deck(ShellDeck::from_shells(vec![Shell::Blank, Shell::Live, Shell::Live]));

        state.begin_shot(&pid(0), 0).unwrap();
        let fired = state.deck().fired();

        let err = state.begin_shot(&pid(0), 1).unwrap_err();
        assert_eq!(err, GameError::ActionInProgress);
        assert!(err.is_silent());
        assert_eq!(state.use_item(&pid(0), ItemKind::Heal), Err(GameError::ActionInProgress));
        assert_eq!(state.deck().fired(), fired);

        state.resolve_shot().unwrap();
        assert!(!state.action_phase().is_resolving());
        assert!(state.begin_shot(&pid(0), 1).is_ok());
    }

    #[test]
    fn test_resolve_without_shot() {
        let mut state = table(2, 6);
        assert_eq!(state.resolve_shot(), Err(GameError::NoPendingShot));
    }

    #[test]
    fn test_invalid_targets() {
        let mut state = table(3, 7);
        assert_eq!(state.begin_shot(&pid(0), 3), Err(GameError::InvalidTarget));

        state.roster.get_mut(2).unwrap().health = 0;
        assert_eq!(state.begin_shot(&pid(0), 2), Err(GameError::InvalidTarget));
        assert!(!state.action_phase().is_resolving());
    }

    #[test]
    fn test_double_damage_consumed_on_miss() {
        let mut state = table(2, 8);
        with_items(&mut state, 0, Inventory { double_damage: 2, ..Inventory::EMPTY });
        state.load_deck(ShellDeck::from_shells(vec![Shell::Blank, Shell::Live, Shell::Live]));

        state.use_item(&pid(0), ItemKind::DoubleDamage).unwrap();
        assert!(state.roster().get(0).unwrap().double_damage_armed);

        state.begin_shot(&pid(0), 1).unwrap();
        let outcome = state.resolve_shot().unwrap();
        assert_eq!(outcome.damage, 0);
        assert!(!state.roster().get(0).unwrap().double_damage_armed);
    }

    #[test]
    fn test_double_damage_hits_for_two() {
        let mut state = table(2, 9);
        with_items(&mut state, 0, Inventory { double_damage: 1, ..Inventory::EMPTY });
        state.load_deck(ShellDeck::from_shells(vec![Shell::Live, Shell::Blank]));

        state.use_item(&pid(0), ItemKind::DoubleDamage).unwrap();
        state.begin_shot(&pid(0), 1).unwrap();
        let outcome = state.resolve_shot().unwrap();
        assert_eq!(outcome.damage, 2);
        assert_eq!(outcome.target_health, Some(2));
    }

    #[test]
    fn test_already_armed_keeps_item() {
        let mut state = table(2, 10);
        with_items(&mut state, 0, Inventory { double_damage: 2, ..Inventory::EMPTY });

        state.use_item(&pid(0), ItemKind::DoubleDamage).unwrap();
        assert_eq!(state.use_item(&pid(0), ItemKind::DoubleDamage), Err(GameError::AlreadyArmed));
        assert_eq!(state.roster().get(0).unwrap().items.double_damage, 1);
    }

    #[test]
    fn test_no_item() {
        let mut state = table(2, 11);
        with_items(&mut state, 0, Inventory::EMPTY);
        state.take_events();

        assert_eq!(state.use_item(&pid(0), ItemKind::Skip), Err(GameError::NoItem(ItemKind::Skip)));
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_inspect_reveals_privately_without_consuming_shell() {
        let mut state = table(2, 12);
        with_items(&mut state, 0, Inventory { inspect: 1, ..Inventory::EMPTY });
        state.load_deck(ShellDeck::from_shells(vec![Shell::Live, Shell::Blank]));

        state.use_item(&pid(0), ItemKind::Inspect).unwrap();
        assert_eq!(state.deck().fired(), 0);

        let events = state.take_events();
        let reveal = events.iter()
            .find(|e| matches!(e.data, GameEventData::ShellRevealed { .. }))
            .unwrap();
        assert_eq!(reveal.data, GameEventData::ShellRevealed { shell: Some(Shell::Live) });
        assert!(reveal.visible_to(&pid(0)));
        assert!(!reveal.visible_to(&pid(1)));
    }

    #[test]
    fn test_elimination_and_game_over() {
        let mut state = table(2, 13);
        state.roster.get_mut(1).unwrap().health = 1;
        state.load_deck(ShellDeck::from_shells(vec![Shell::Live, Shell::Blank]));

        state.begin_shot(&pid(0), 1).unwrap();
        let outcome = state.resolve_shot().unwrap();
        assert_eq!(outcome.eliminated, Some(pid(1)));
        assert_eq!(outcome.winner, Some(pid(0)));
        assert!(state.is_over());

        assert_eq!(state.begin_shot(&pid(0), 0), Err(GameError::GameOver));
        assert_eq!(state.use_item(&pid(0), ItemKind::Heal), Err(GameError::GameOver));

        state.restart();
        assert!(!state.is_over());
        assert!(state.roster().is_empty());
    }

    #[test]
    fn test_live_self_shot_passes_turn() {
        let mut state = table(3, 14);
        state.load_deck(ShellDeck::from_shells(vec![Shell::Live, Shell::Blank]));

        state.begin_shot(&pid(0), 0).unwrap();
        let outcome = state.resolve_shot().unwrap();
        assert!(!outcome.turn_kept);
        assert_eq!(state.roster().get(0).unwrap().health, 3);
        assert_eq!(state.current_turn(), 1);
    }

    #[test]
    fn test_blank_at_other_passes_turn() {
        let mut state = table(3, 15);
        state.load_deck(ShellDeck::from_shells(vec![Shell::Blank, Shell::Blank]));

        state.begin_shot(&pid(0), 2).unwrap();
        state.resolve_shot().unwrap();
        assert_eq!(state.current_turn(), 1);
    }

    #[test]
    fn test_shooter_disconnects_mid_flight() {
        let mut state = table(3, 16);
        state.load_deck(ShellDeck::from_shells(vec![Shell::Live, Shell::Blank]));

        state.begin_shot(&pid(0), 2).unwrap();
        state.leave(&pid(0));
        // p1 slid into seat 0 and inherited the turn
        assert_eq!(state.current_turn(), 0);

        let outcome = state.resolve_shot().unwrap();
        assert_eq!(outcome.target_health, Some(3));
        // Damage landed on p2 by identity, now at seat 1
        assert_eq!(state.roster().get(1).unwrap().id, pid(2));
        assert_eq!(state.roster().get(1).unwrap().health, 3);
        // No extra advance
        assert_eq!(state.current_turn(), 0);
    }

    #[test]
    fn test_earlier_seat_leaves_mid_flight() {
        let mut state = table(4, 17);
        state.load_deck(ShellDeck::from_shells(vec![Shell::Live, Shell::Blank]));
        state.begin_shot(&pid(0), 1).unwrap();
        state.resolve_shot().unwrap();
        assert_eq!(state.current_turn(), 1);

        // p1 fires at p3, then p0 disconnects before resolution
        state.begin_shot(&pid(1), 3).unwrap();
        state.leave(&pid(0));
        assert_eq!(state.current_turn(), 0);

        let outcome = state.resolve_shot().unwrap();
        assert_eq!(outcome.shot.target, pid(3));
        assert_eq!(state.roster().get(2).unwrap().health, MAX_HP);
        // Turn moves from p1 (seat 0) to p2 (seat 1)
        assert_eq!(state.current_turn(), 1);
        assert_eq!(state.roster().get(1).unwrap().id, pid(2));
    }

    #[test]
    fn test_target_disconnects_mid_flight() {
        let mut state = table(3, 18);
        state.load_deck(ShellDeck::from_shells(vec![Shell::Live, Shell::Blank]));

        state.begin_shot(&pid(0), 1).unwrap();
        state.leave(&pid(1));
        let outcome = state.resolve_shot().unwrap();
        assert_eq!(outcome.damage, 0);
        assert_eq!(outcome.target_health, None);
        assert_eq!(state.current_turn(), 1);
        assert_eq!(state.roster().get(1).unwrap().id, pid(2));
        assert!(state.take_events().iter().any(|e| matches!(e.data,
            GameEventData::ShotResolved { target_health: None, damage: 0, .. })));
    }

    #[test]
    fn test_debug_eliminate() {
        let mut state = table(3, 19);
        assert_eq!(state.eliminate(0), Ok(None));
        assert_eq!(state.current_turn(), 1);
        assert_eq!(state.eliminate(0), Err(GameError::InvalidTarget));
        assert_eq!(state.eliminate(2), Ok(Some(pid(1))));
        assert!(state.is_over());
    }

    #[test]
    fn test_event_order_for_lethal_last_shell() {
        let mut state = table(2, 20);
        state.roster.get_mut(1).unwrap().health = 1;
        state.load_deck(ShellDeck::from_shells(vec![Shell::Live]));

        state.begin_shot(&pid(0), 1).unwrap();
        state.resolve_shot().unwrap();

        let kinds: Vec<&str> = state.take_events().iter().map(|e| match e.data {
            GameEventData::ShotAnnounced { .. } => "announced",
            GameEventData::ShotResolved { .. } => "resolved",
            GameEventData::PlayerEliminated { .. } => "eliminated",
            GameEventData::ShellsRegenerated { .. } => "reloaded",
            GameEventData::GameOver { .. } => "game_over",
            _ => "other",
        }).collect();
        assert_eq!(kinds, ["announced", "resolved", "eliminated", "reloaded", "game_over"]);
    }

    proptest! {
        #[test]
        fn prop_random_play_keeps_invariants(
            seed in any::<u64>(),
            players in 2u8..=8,
            moves in prop::collection::vec((0u8..3, 0usize..8, 0usize..4), 1..200),
        ) {
            let mut state = table(players, seed);

            for (action, target, item) in moves {
                if state.is_over() {
                    break;
                }
                let seat = state.current_turn();
                let actor = state.roster().get(seat).unwrap().id;

                if action < 2 {
                    if let Ok(shot) = state.begin_shot(&actor, target) {
                        let outcome = state.resolve_shot().unwrap();
                        prop_assert!(!state.roster().get(seat).unwrap().double_damage_armed);
                        if shot.shell == Shell::Blank && shot.is_self {
                            prop_assert!(outcome.turn_kept);
                            prop_assert_eq!(state.current_turn(), seat);
                        } else if !state.is_over() {
                            prop_assert_eq!(state.current_turn(), next_living(state.roster(), seat));
                        }
                    }
                } else {
                    let _ = state.use_item(&actor, ItemKind::ALL[item]);
                }

                for p in state.roster().players() {
                    prop_assert!(p.health <= MAX_HP);
                }
                prop_assert!(state.roster().is_living(state.current_turn()));
                prop_assert_eq!(state.is_over(), state.roster().living_count() == 1);
            }
        }
    }
}
