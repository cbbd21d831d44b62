//! Game session facade
//!
//! `Game` owns one `GameState` and the random source every randomized rule
//! draws from. It is the surface a presentation layer talks to: turn
//! lifecycle, player and imperial actions, queries and persistence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::actions::{self, resolver::ensure_action_phase, CampaignOutcome, EligibleFamily, MarriageProposal};
use crate::cards::EventCard;
use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{CounterDirection, PlayerId, ProvinceId};
use crate::economy;
use crate::entity::player::Player;
use crate::military::{self, MilitaryStatus};
use crate::persistence::{self, SnapshotStore, SAVE_KEY};
use crate::state::{CounterWeights, GameLog, GameState};
use crate::succession::{self, CoupOutcome};
use crate::turn;

pub struct Game<R: Rng = ChaCha8Rng> {
    state: GameState,
    rng: R,
}

impl Game<ChaCha8Rng> {
    /// New game with a seeded ChaCha8 random source
    pub fn new(config: GameConfig, names: &[String], seed: u64) -> Result<Self> {
        Self::with_rng(config, names, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Game<R> {
    pub fn with_rng(config: GameConfig, names: &[String], mut rng: R) -> Result<Self> {
        let state = GameState::new(config, names, &mut rng)?;
        Ok(Self { state, rng })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    // === TURN LIFECYCLE ===

    /// Collect income for the current player
    pub fn start_turn(&mut self) -> Result<bool> {
        let Some(id) = self.state.current_player_id() else {
            return Ok(false);
        };
        turn::start_turn(&mut self.state, id)
    }

    pub fn end_turn(&mut self) -> Result<bool> {
        let Some(id) = self.state.current_player_id() else {
            return Ok(false);
        };
        turn::end_turn(&mut self.state, id, &mut self.rng)
    }

    pub fn next_player(&mut self) -> Result<bool> {
        turn::next_player(&mut self.state, &mut self.rng)
    }

    // === PLAYER ACTIONS ===

    pub fn contribute_to_military(&mut self, id: PlayerId) -> Result<bool> {
        actions::contribute_to_military(&mut self.state, id)
    }

    pub fn economic_development(&mut self, id: PlayerId) -> Result<bool> {
        actions::economic_development(&mut self.state, id, &mut self.rng)
    }

    pub fn political_maneuvering(&mut self, id: PlayerId) -> Result<bool> {
        actions::political_maneuvering(&mut self.state, id)
    }

    pub fn eligible_families(&self, id: PlayerId) -> Result<Vec<EligibleFamily>> {
        actions::eligible_families(&self.state, id)
    }

    pub fn marriage_negotiation(&mut self, id: PlayerId, proposal: MarriageProposal) -> Result<bool> {
        actions::marriage_negotiation(&mut self.state, id, proposal)
    }

    pub fn divorce(&mut self, id: PlayerId) -> Result<bool> {
        actions::divorce(&mut self.state, id)
    }

    pub fn play_card(&mut self, id: PlayerId, index: usize, target: Option<PlayerId>) -> Result<bool> {
        actions::play_card(&mut self.state, id, index, target, &mut self.rng)
    }

    pub fn discard_card(&mut self, id: PlayerId, index: usize) -> Result<bool> {
        actions::discard_card(&mut self.state, id, index)
    }

    pub fn draw_cards(&mut self, id: PlayerId, count: usize) -> Result<usize> {
        actions::draw_cards(&mut self.state, id, count, &mut self.rng)
    }

    pub fn read_omens(&mut self, id: PlayerId) -> Result<Option<Vec<EventCard>>> {
        actions::read_omens(&mut self.state, id)
    }

    // === IMPERIAL OPERATIONS ===

    pub fn set_tax_rate(&mut self, id: PlayerId, rate: f64) -> Result<bool> {
        if !ensure_action_phase(&mut self.state, id)? {
            return Ok(false);
        }
        economy::set_tax_rate(&mut self.state, id, rate)
    }

    pub fn launch_campaign(&mut self, id: PlayerId) -> Result<Option<CampaignOutcome>> {
        actions::launch_campaign(&mut self.state, id, &mut self.rng)
    }

    pub fn distribute_estates(&mut self, id: PlayerId, province: ProvinceId, grants: &[(PlayerId, u32)]) -> Result<bool> {
        actions::distribute_estates(&mut self.state, id, province, grants)
    }

    pub fn influence_counter(&mut self, id: PlayerId, direction: CounterDirection) -> Result<bool> {
        actions::influence_counter(&mut self.state, id, direction)
    }

    // === SUCCESSION ===

    pub fn trigger_succession(&mut self) -> Result<Option<PlayerId>> {
        succession::trigger_succession(&mut self.state)
    }

    pub fn attempt_coup(&mut self, plotter: PlayerId) -> Result<Option<CoupOutcome>> {
        if !ensure_action_phase(&mut self.state, plotter)? {
            return Ok(None);
        }
        succession::attempt_coup(&mut self.state, plotter, &mut self.rng)
    }

    // === QUERIES ===

    pub fn current_player(&self) -> Option<&Player> {
        self.state.current_player()
    }

    pub fn emperor(&self) -> Option<&Player> {
        self.state.emperor()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.state.winner
    }

    pub fn military_status(&self) -> MilitaryStatus {
        military::military_status(&self.state)
    }

    pub fn counter_weights(&self) -> CounterWeights {
        self.state.counter_weights()
    }

    pub fn meets_imperial_threshold(&self, auctoritas: u32) -> bool {
        self.state.meets_imperial_threshold(auctoritas)
    }

    pub fn log(&self) -> &GameLog {
        &self.state.log
    }

    // === PERSISTENCE ===

    /// Snapshot the whole state. The snapshot already carries the
    /// "Game saved" entry; the live log only gets it once the store
    /// accepts the write. Failures are logged, never fatal.
    pub fn save(&mut self, store: &mut dyn SnapshotStore) -> bool {
        let mut saved = self.state.clone();
        saved.log("Game saved");
        let result = persistence::to_snapshot(&saved).and_then(|snapshot| store.put(SAVE_KEY, &snapshot));
        match result {
            Ok(()) => {
                self.state = saved;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save game");
                false
            }
        }
    }

    /// Replace the state with the stored snapshot; on any failure the
    /// current state is kept as it was
    pub fn load(&mut self, store: &dyn SnapshotStore) -> bool {
        match store.get(SAVE_KEY).and_then(|snapshot| persistence::from_snapshot(&snapshot)) {
            Ok(state) => {
                self.state = state;
                self.state.log("Game loaded");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load game");
                false
            }
        }
    }
}
