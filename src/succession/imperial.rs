//! Imperial succession: Republic/Empire transitions, dynasty streak, victory

use ordered_float::OrderedFloat;

use crate::core::error::Result;
use crate::core::types::PlayerId;
use crate::entity::player::Player;
use crate::state::{CounterWeights, GameState};

/// popularity weight x popular support + virtue weight x auctoritas
pub fn succession_score(player: &Player, weights: CounterWeights) -> f64 {
    weights.popularity * player.popular_support as f64 + weights.virtue * player.auctoritas as f64
}

/// Republic -> Empire check for the player who just acted.
///
/// They take the throne if there is no emperor, their auctoritas meets the
/// imperial threshold and nobody has more.
pub fn check_imperial_ascension(state: &mut GameState, id: PlayerId) -> Result<bool> {
    if state.emperor.is_some() {
        return Ok(false);
    }
    let auctoritas = state.player(id)?.auctoritas;
    if !state.meets_imperial_threshold(auctoritas) {
        return Ok(false);
    }
    let highest = state.players.iter().map(|p| p.auctoritas).max().unwrap_or(0);
    if auctoritas < highest {
        return Ok(false);
    }

    state.emperor = Some(id);
    state.dynasty.family = Some(id);
    state.dynasty.count = 1;

    let name = state.player_name(id)?;
    tracing::info!(player = %id, auctoritas, "First emperor crowned");
    state.log(format!("{} has crossed the imperial threshold and becomes the First Emperor!", name));
    state.log(format!("Dynasty counter: {} - 1 successive emperor", name));
    check_win_condition(state);
    Ok(true)
}

/// Elect a new emperor after death or overthrow.
///
/// Only players meeting the imperial threshold are eligible; with none the
/// Republic is restored. The best score wins, ties to the earlier player in
/// turn order. Returns the new emperor.
pub fn trigger_succession(state: &mut GameState) -> Result<Option<PlayerId>> {
    state.log("=== IMPERIAL SUCCESSION BEGINS ===");
    let weights = state.counter_weights();

    let mut lines = Vec::with_capacity(state.players.len());
    let mut best: Option<(PlayerId, OrderedFloat<f64>)> = None;
    for player in &state.players {
        let score = OrderedFloat(succession_score(player, weights));
        let eligible = state.meets_imperial_threshold(player.auctoritas);
        lines.push(format!(
            "{}: score {:.2} ({} support x {:.2} + {} auctoritas x {:.2}) - threshold: {}",
            player.name,
            score.0,
            player.popular_support,
            weights.popularity,
            player.auctoritas,
            weights.virtue,
            if eligible { "yes" } else { "no" }
        ));
        if eligible && best.map_or(true, |(_, top)| score > top) {
            best = Some((player.id, score));
        }
    }
    for line in lines {
        state.log(line);
    }

    let Some((winner, score)) = best else {
        state.emperor = None;
        state.dynasty.family = None;
        state.dynasty.count = 0;
        tracing::info!("No eligible successor; Republic restored");
        state.log("No candidate meets the imperial threshold! The Republic is restored.");
        state.log("=== SUCCESSION COMPLETE ===");
        return Ok(None);
    };

    let name = state.player_name(winner)?;
    if state.dynasty.family == Some(winner) {
        state.dynasty.count += 1;
        let count = state.dynasty.count;
        state.log(format!("{} continues their dynasty! Successive emperors: {}", name, count));
    } else {
        state.dynasty.family = Some(winner);
        state.dynasty.count = 1;
        state.log(format!("{} starts a new dynasty!", name));
    }
    state.emperor = Some(winner);

    tracing::info!(emperor = %winner, score = score.0, dynasty = state.dynasty.count, "Succession complete");
    state.log(format!("{} becomes the new Emperor with a score of {:.2}!", name, score.0));
    state.log("=== SUCCESSION COMPLETE ===");

    if check_win_condition(state).is_none() {
        warn_dynasty_progress(state);
    }
    Ok(Some(winner))
}

/// Declare the winner once one family holds the throne enough times in a row
pub fn check_win_condition(state: &mut GameState) -> Option<PlayerId> {
    if let Some(winner) = state.winner {
        return Some(winner);
    }
    let family = state.dynasty.family?;
    if state.dynasty.count < state.config.dynasty_win_threshold {
        return None;
    }

    state.winner = Some(family);
    let name = state.player(family).map(|p| p.name.clone()).unwrap_or_default();
    tracing::info!(winner = %family, "Game over");
    state.log(format!(
        "GAME OVER - {} has won with {} successive emperors!",
        name, state.config.dynasty_win_threshold
    ));
    Some(family)
}

fn warn_dynasty_progress(state: &mut GameState) {
    let threshold = state.config.dynasty_win_threshold;
    let Some(family) = state.dynasty.family else { return };
    if threshold > 1 && state.dynasty.count == threshold - 1 {
        let name = state.player(family).map(|p| p.name.clone()).unwrap_or_default();
        let count = state.dynasty.count;
        state.log(format!("WARNING: {} has {} successive emperors! One more to win!", name, count));
    }
}
