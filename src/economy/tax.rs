//! Imperial tax rate and its effect on the emperor's popularity
//!
//! Rates are handled as whole increments ("steps") of the configured
//! increment so that snapping and comparisons never drift with float error.

use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::PlayerId;
use crate::state::GameState;

const EPSILON: f64 = 1e-9;

/// Number of increments represented by `rate`, rounded to nearest
pub fn steps(config: &GameConfig, rate: f64) -> i64 {
    (rate / config.tax_rate_increment).round() as i64
}

fn step_bounds(config: &GameConfig) -> (i64, i64) {
    (
        (config.min_tax_rate / config.tax_rate_increment).ceil() as i64,
        (config.max_tax_rate / config.tax_rate_increment + EPSILON).floor() as i64,
    )
}

fn rate_of(config: &GameConfig, steps: i64) -> f64 {
    steps as f64 * config.tax_rate_increment
}

/// Snap a requested rate to the nearest increment within [min, max]
pub fn snap(config: &GameConfig, requested: f64) -> f64 {
    let (low, high) = step_bounds(config);
    rate_of(config, steps(config, requested).clamp(low, high))
}

/// Emperor sets a new tax rate.
///
/// Not being emperor is a rejection. An unchanged rate succeeds without
/// side effects. Raising the rate costs the emperor popular support,
/// lowering it earns some back (at a smaller multiplier).
pub fn set_tax_rate(state: &mut GameState, caller: PlayerId, requested: f64) -> Result<bool> {
    let name = state.player_name(caller)?;
    if !state.is_emperor(caller) {
        state.log(format!("{} is not the Emperor!", name));
        return Ok(false);
    }

    let config = &state.config;
    let old_steps = steps(config, state.tax_rate);
    let new_rate = snap(config, requested);
    let new_steps = steps(config, new_rate);

    if new_steps == old_steps {
        let current = state.tax_rate;
        state.log(format!("Tax rate unchanged at {:.0}%", current * 100.0));
        return Ok(true);
    }

    let delta = (new_steps - old_steps).unsigned_abs() as f64 * config.tax_rate_increment;
    let increase_penalty = (delta * config.tax_increase_support_penalty + EPSILON).floor() as u32;
    let decrease_bonus = (delta * config.tax_decrease_support_bonus + EPSILON).floor() as u32;
    state.tax_rate = new_rate;

    let emperor = state.player_mut(caller)?;
    if new_steps > old_steps {
        emperor.lose_popular_support(increase_penalty);
        state.log(format!(
            "Emperor {} raised taxes to {:.0}%! Popular support -{}",
            name,
            new_rate * 100.0,
            increase_penalty
        ));
    } else {
        emperor.popular_support += decrease_bonus;
        state.log(format!(
            "Emperor {} lowered taxes to {:.0}%! Popular support +{}",
            name,
            new_rate * 100.0,
            decrease_bonus
        ));
    }
    tracing::info!(emperor = %caller, rate = new_rate, "Tax rate changed");
    Ok(true)
}

/// Lower the rate by `by_steps` increments without touching popularity.
///
/// Returns (old, new) rates.
pub fn lower_tax_rate(state: &mut GameState, by_steps: i64) -> (f64, f64) {
    let config = &state.config;
    let (low, high) = step_bounds(config);
    let old = state.tax_rate;
    let new = rate_of(config, (steps(config, old) - by_steps).clamp(low, high));
    state.tax_rate = new;
    (old, new)
}

/// Once-per-round popularity drain on the emperor for a standing tax.
///
/// Returns the support lost (0 in the Republic).
pub fn apply_standing_tax_penalty(state: &mut GameState) -> Result<u32> {
    let Some(emperor_id) = state.emperor else {
        return Ok(0);
    };
    let increments = steps(&state.config, state.tax_rate).max(0) as u32;
    let penalty = increments * state.config.tax_penalty_per_increment;
    if penalty == 0 {
        return Ok(0);
    }

    let rate = state.tax_rate;
    let emperor = state.player_mut(emperor_id)?;
    emperor.lose_popular_support(penalty);
    let name = emperor.name.clone();
    state.log(format!(
        "Emperor {} loses {} popular support due to {:.0}% tax rate",
        name,
        penalty,
        rate * 100.0
    ));
    Ok(penalty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_state;

    #[test]
    fn test_snap_to_increment_and_clamp() {
        let config = GameConfig::default();
        assert!((snap(&config, 0.24) - 0.2).abs() < 1e-9);
        assert!((snap(&config, 0.26) - 0.3).abs() < 1e-9);
        assert!((snap(&config, 0.9) - 0.5).abs() < 1e-9);
        assert_eq!(snap(&config, -0.3), 0.0);
        assert_eq!(steps(&config, snap(&config, 0.3)), 3);
    }

    #[test]
    fn test_only_emperor_sets_tax() {
        let mut state = sample_state(2);
        assert!(!set_tax_rate(&mut state, PlayerId(0), 0.3).unwrap());
        assert!((state.tax_rate - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_unchanged_rate_is_noop_success() {
        let mut state = sample_state(2);
        state.emperor = Some(PlayerId(0));
        assert!(set_tax_rate(&mut state, PlayerId(0), 0.12).unwrap());
        assert_eq!(state.player(PlayerId(0)).unwrap().popular_support, 5);
    }

    #[test]
    fn test_increase_penalised_heavier_than_decrease_rewarded() {
        let mut state = sample_state(2);
        state.emperor = Some(PlayerId(0));
        state.player_mut(PlayerId(0)).unwrap().popular_support = 20;

        // 0.1 -> 0.3: two increments, 0.2 * 20 = 4
        assert!(set_tax_rate(&mut state, PlayerId(0), 0.3).unwrap());
        assert_eq!(state.player(PlayerId(0)).unwrap().popular_support, 16);

        // 0.3 -> 0.1: 0.2 * 10 = 2
        assert!(set_tax_rate(&mut state, PlayerId(0), 0.1).unwrap());
        assert_eq!(state.player(PlayerId(0)).unwrap().popular_support, 18);
    }

    #[test]
    fn test_standing_penalty_per_increment() {
        let mut state = sample_state(2);
        state.tax_rate = 0.2;
        assert_eq!(apply_standing_tax_penalty(&mut state).unwrap(), 0);

        state.emperor = Some(PlayerId(1));
        assert_eq!(apply_standing_tax_penalty(&mut state).unwrap(), 2);
        assert_eq!(state.player(PlayerId(1)).unwrap().popular_support, 3);
        assert_eq!(state.player(PlayerId(0)).unwrap().popular_support, 5);
    }
}
