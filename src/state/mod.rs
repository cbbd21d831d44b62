//! GameState - the single aggregate every subsystem reads and mutates
//!
//! Nothing in the engine holds state outside this struct. Subsystems are
//! free functions taking `&mut GameState` (plus an RNG where a branch is
//! random), so independent games never share anything.

pub mod log;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, EventCard};
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{EstateId, PlayerId, ProvinceId, Turn};
use crate::entity::player::{Estate, Player, Province};

pub use log::{GameLog, LogEntry};

/// Consecutive imperial successions held by one family
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynastyCounter {
    pub family: Option<PlayerId>,
    pub count: u32,
}

/// Where the current player is within their turn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Income not yet collected
    #[default]
    Income,
    /// Actions and cards may be played
    Actions,
    /// End-of-turn processing done; waiting for `next_player`
    Ended,
}

/// Weights used to score succession candidates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterWeights {
    pub popularity: f64,
    pub virtue: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,

    pub turn: Turn,
    /// Virtue/popularity dial, 1..=100
    pub counter: u32,
    pub emperor: Option<PlayerId>,
    pub tax_rate: f64,

    pub players: Vec<Player>,
    pub provinces: Vec<Province>,

    pub action_deck: Vec<Card>,
    pub action_discard: Vec<Card>,
    pub event_deck: Vec<EventCard>,
    /// Face-down upcoming events, executed front first
    pub event_queue: VecDeque<EventCard>,
    pub event_discard: Vec<EventCard>,
    pub rounds_since_event: u32,

    pub current_player: usize,
    pub phase: TurnPhase,
    pub dynasty: DynastyCounter,
    pub military_strength: u32,
    pub winner: Option<PlayerId>,

    pub log: GameLog,
}

impl GameState {
    /// An empty game shell; `GameState::new` populates it
    pub fn empty(config: GameConfig) -> Self {
        Self {
            turn: 1,
            counter: config.initial_counter,
            emperor: None,
            tax_rate: config.default_tax_rate,
            players: Vec::new(),
            provinces: Vec::new(),
            action_deck: Vec::new(),
            action_discard: Vec::new(),
            event_deck: Vec::new(),
            event_queue: VecDeque::new(),
            event_discard: Vec::new(),
            rounds_since_event: 0,
            current_player: 0,
            phase: TurnPhase::Income,
            dynasty: DynastyCounter::default(),
            military_strength: config.initial_military_strength,
            winner: None,
            log: GameLog::new(config.max_log_entries),
            config,
        }
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(self.turn, message);
    }

    // === PLAYER ACCESS ===

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    pub fn player_name(&self, id: PlayerId) -> Result<String> {
        Ok(self.player(id)?.name.clone())
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.players.get(self.current_player).map(|p| p.id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player)
    }

    /// Whether the acting player is last in turn order
    pub fn is_last_in_round(&self) -> bool {
        !self.players.is_empty() && self.current_player == self.players.len() - 1
    }

    pub fn emperor(&self) -> Option<&Player> {
        self.emperor.and_then(|id| self.players.iter().find(|p| p.id == id))
    }

    pub fn is_emperor(&self, id: PlayerId) -> bool {
        self.emperor == Some(id)
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    // === SUCCESSION QUERIES ===

    pub fn counter_weights(&self) -> CounterWeights {
        let counter = self.counter as f64;
        CounterWeights {
            popularity: (100.0 - counter) / 100.0,
            virtue: counter / 100.0,
        }
    }

    pub fn imperial_threshold(&self) -> f64 {
        self.counter as f64 * 0.5
    }

    pub fn meets_imperial_threshold(&self, auctoritas: u32) -> bool {
        auctoritas as f64 >= self.imperial_threshold()
    }

    // === PROVINCES & ESTATES ===

    pub fn province(&self, id: ProvinceId) -> Result<&Province> {
        self.provinces
            .iter()
            .find(|p| p.id == id)
            .ok_or(GameError::ProvinceNotFound(id))
    }

    pub fn province_mut(&mut self, id: ProvinceId) -> Result<&mut Province> {
        self.provinces
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GameError::ProvinceNotFound(id))
    }

    pub fn estate(&self, id: EstateId) -> Result<&Estate> {
        self.provinces
            .iter()
            .flat_map(|p| p.estates.iter())
            .find(|e| e.id == id)
            .ok_or(GameError::EstateNotFound(id))
    }

    pub fn estate_mut(&mut self, id: EstateId) -> Result<&mut Estate> {
        self.provinces
            .iter_mut()
            .flat_map(|p| p.estates.iter_mut())
            .find(|e| e.id == id)
            .ok_or(GameError::EstateNotFound(id))
    }

    /// Move an estate to `new_owner` (or free it with `None`).
    ///
    /// Updates the estate record and both owners' lists together, so an
    /// estate is never listed by two players or listed by a non-owner.
    pub fn transfer_estate(&mut self, estate_id: EstateId, new_owner: Option<PlayerId>) -> Result<()> {
        if let Some(owner) = new_owner {
            // Validate before touching anything
            self.player(owner)?;
        }
        let previous = self.estate(estate_id)?.owner;
        if let Some(prev) = previous {
            self.player_mut(prev)?.estates.retain(|e| *e != estate_id);
        }
        self.estate_mut(estate_id)?.owner = new_owner;
        if let Some(owner) = new_owner {
            let player = self.player_mut(owner)?;
            if !player.estates.contains(&estate_id) {
                player.estates.push(estate_id);
            }
        }
        Ok(())
    }

    /// Sum of yields of the estates a player owns
    pub fn base_estate_income(&self, id: PlayerId) -> Result<u32> {
        let player = self.player(id)?;
        player
            .estates
            .iter()
            .map(|e| self.estate(*e).map(|estate| estate.yield_gold))
            .sum()
    }

    pub fn conquered_count(&self) -> usize {
        self.provinces.iter().filter(|p| p.conquered).count()
    }

    /// Every estate id owned by someone, paired with its recorded owner
    pub fn owned_estates(&self) -> impl Iterator<Item = (EstateId, PlayerId)> + '_ {
        self.provinces
            .iter()
            .flat_map(|p| p.estates.iter())
            .filter_map(|e| e.owner.map(|o| (e.id, o)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_state;

    #[test]
    fn test_counter_weights() {
        let mut state = sample_state(3);
        state.counter = 30;
        let weights = state.counter_weights();
        assert!((weights.popularity - 0.70).abs() < 1e-9);
        assert!((weights.virtue - 0.30).abs() < 1e-9);
    }

    #[test]
    fn test_imperial_threshold() {
        let mut state = sample_state(3);
        state.counter = 11;
        assert!(!state.meets_imperial_threshold(5));
        assert!(state.meets_imperial_threshold(6));
    }

    #[test]
    fn test_transfer_estate_updates_both_sides() {
        let mut state = sample_state(2);
        let estate = state.player(PlayerId(0)).unwrap().estates[0];

        state.transfer_estate(estate, Some(PlayerId(1))).unwrap();
        assert!(!state.player(PlayerId(0)).unwrap().owns(estate));
        assert!(state.player(PlayerId(1)).unwrap().owns(estate));
        assert_eq!(state.estate(estate).unwrap().owner, Some(PlayerId(1)));

        state.transfer_estate(estate, None).unwrap();
        assert!(!state.player(PlayerId(1)).unwrap().owns(estate));
        assert_eq!(state.estate(estate).unwrap().owner, None);
    }

    #[test]
    fn test_unknown_player_is_an_error() {
        let state = sample_state(2);
        assert!(matches!(state.player(PlayerId(9)), Err(GameError::PlayerNotFound(PlayerId(9)))));
    }

    #[test]
    fn test_transfer_to_unknown_player_leaves_estate_untouched() {
        let mut state = sample_state(2);
        let estate = state.player(PlayerId(0)).unwrap().estates[0];
        assert!(state.transfer_estate(estate, Some(PlayerId(7))).is_err());
        assert_eq!(state.estate(estate).unwrap().owner, Some(PlayerId(0)));
        assert!(state.player(PlayerId(0)).unwrap().owns(estate));
    }
}
