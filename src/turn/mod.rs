//! Turn orchestration
//!
//! A player's turn runs: income and distribution (`start_turn`), the action
//! and card phase (free calls into `actions`), then `end_turn` bookkeeping.
//! Round-end steps run only when the last player in turn order ends their
//! turn. `next_player` hands over and, on wrap-around, advances the round.
//!
//! The phase order is fixed; reordering it changes outcomes.

use rand::Rng;

use crate::actions::resolver::ensure_turn;
use crate::cards::deck;
use crate::core::error::Result;
use crate::core::types::PlayerId;
use crate::economy;
use crate::military;
use crate::state::{GameState, TurnPhase};
use crate::succession::{family, imperial};

/// Income phase for the current player; runs once per turn
pub fn start_turn(state: &mut GameState, id: PlayerId) -> Result<bool> {
    if !ensure_turn(state, id)? {
        return Ok(false);
    }
    let name = state.player_name(id)?;
    if state.phase != TurnPhase::Income {
        state.log(format!("{} has already collected income this turn", name));
        return Ok(false);
    }

    state.phase = TurnPhase::Actions;
    state.log(format!("=== {}'s turn ===", name));
    economy::process_income(state, id)?;
    Ok(true)
}

/// End-of-turn bookkeeping for the current player.
///
/// Only valid in the action phase, so it runs once per turn and never
/// before income. Order: draw cards, age the paterfamilias, age the
/// family, death check, unmarried penalty, effect ticks, round-end steps
/// (last player only: military decay, revolt check, standing tax penalty),
/// the Republic to Empire check, then the per-turn flags reset.
pub fn end_turn<R: Rng + ?Sized>(state: &mut GameState, id: PlayerId, rng: &mut R) -> Result<bool> {
    if !ensure_turn(state, id)? {
        return Ok(false);
    }
    match state.phase {
        TurnPhase::Actions => {}
        TurnPhase::Income => {
            let name = state.player_name(id)?;
            state.log(format!("{} must collect income before ending the turn", name));
            return Ok(false);
        }
        TurnPhase::Ended => {
            let name = state.player_name(id)?;
            state.log(format!("{} has already ended their turn", name));
            return Ok(false);
        }
    }
    state.phase = TurnPhase::Ended;

    let draw = state.config.cards_drawn_per_turn;
    deck::draw_cards(state, id, draw, rng)?;

    let player = state.player_mut(id)?;
    player.paterfamilias.turns_in_role += 1 + player.effects.accelerated_aging();

    family::age_family(state, id, rng)?;
    if family::check_death(state, id, rng)? {
        family::handle_death(state, id, rng)?;
    }

    let penalty = state.config.unmarried_penalty_per_turn;
    let player = state.player_mut(id)?;
    if !player.is_married() && penalty > 0 {
        player.lose_popular_support(penalty);
        let name = player.name.clone();
        state.log(format!("{} suffers unmarried penalty: -{} Popular Support", name, penalty));
    }

    let expired = state.player_mut(id)?.effects.tick();
    if expired > 0 {
        tracing::debug!(player = %id, expired, "Effects expired");
    }

    if state.is_last_in_round() {
        end_round(state)?;
    }

    imperial::check_imperial_ascension(state, id)?;
    state.player_mut(id)?.reset_turn_flags();
    Ok(true)
}

/// Once-per-round steps, in order: decay, revolt, standing tax penalty
fn end_round(state: &mut GameState) -> Result<()> {
    military::apply_decay(state);
    military::check_revolt(state)?;
    economy::apply_standing_tax_penalty(state)?;
    Ok(())
}

/// Pass play to the next family.
///
/// When play wraps back to the first family a new round begins: the turn
/// number and counter advance, and every `event_draw_frequency` rounds the
/// next queued event executes.
pub fn next_player<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Result<bool> {
    if state.is_game_over() {
        state.log("The game is over.");
        return Ok(false);
    }
    if state.players.is_empty() {
        return Ok(false);
    }

    state.phase = TurnPhase::Income;
    state.current_player = (state.current_player + 1) % state.players.len();

    if state.current_player == 0 {
        state.turn += 1;
        state.counter = (state.counter + state.config.counter_increment_per_round).min(state.config.counter_maximum);
        let turn = state.turn;
        tracing::debug!(turn, counter = state.counter, "Round advanced");
        state.log(format!("Turn {} begins", turn));

        state.rounds_since_event += 1;
        if state.rounds_since_event >= state.config.event_draw_frequency {
            deck::execute_next_event(state, rng)?;
            state.rounds_since_event = 0;
        }
    }
    Ok(true)
}
