//! Coups against the sitting emperor

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{Cost, PlayerId};
use crate::state::GameState;
use crate::succession::family::handle_death;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoupOutcome {
    /// The plotter's paterfamilias was executed
    EmperorSurvived,
    /// The emperor's paterfamilias was killed and succession ran
    EmperorOverthrown,
}

/// Emperor's defense: popular support + gold / 10
pub fn defense_score(support: u32, gold: u32) -> f64 {
    support as f64 + gold as f64 / 10.0
}

/// Plotter's offense: auctoritas + gold / 10 + the plotter's bonus
pub fn offense_score(auctoritas: u32, gold: u32, bonus: u32) -> f64 {
    auctoritas as f64 + gold as f64 / 10.0 + bonus as f64
}

/// Attempt to overthrow the emperor.
///
/// The plotter pays first; both scores use resources after payment. The
/// emperor survives only with a strictly higher defense. Returns `None` when
/// the attempt is rejected (no emperor, plotter is emperor, cannot pay).
pub fn attempt_coup<R: Rng + ?Sized>(
    state: &mut GameState,
    plotter: PlayerId,
    rng: &mut R,
) -> Result<Option<CoupOutcome>> {
    let plotter_name = state.player_name(plotter)?;
    let Some(emperor) = state.emperor else {
        state.log("There is no Emperor to overthrow!");
        return Ok(None);
    };
    if emperor == plotter {
        state.log("The Emperor cannot launch a coup against themselves!");
        return Ok(None);
    }
    let cost = Cost::gold(state.config.coup_cost);
    if !state.player(plotter)?.can_afford(&cost) {
        state.log(format!(
            "{} cannot afford to launch a coup (need {} gold)",
            plotter_name, cost.gold
        ));
        return Ok(None);
    }

    state.player_mut(plotter)?.pay(&cost);
    let emperor_name = state.player_name(emperor)?;
    state.log("=== COUP ATTEMPT ===");
    state.log(format!("{} attempts to overthrow Emperor {}!", plotter_name, emperor_name));

    let defender = state.player(emperor)?;
    let defense = defense_score(defender.popular_support, defender.gold);
    let attacker = state.player(plotter)?;
    let offense = offense_score(attacker.auctoritas, attacker.gold, state.config.coup_bonus);

    if defense > offense {
        let executed = state.player(plotter)?.paterfamilias.name.clone();
        tracing::info!(plotter = %plotter, emperor = %emperor, defense, offense, "Coup failed");
        state.log(format!("The coup failed! Emperor {} survived.", emperor_name));
        state.log(format!("{} is executed for treason!", executed));

        handle_death(state, plotter, rng)?;
        let penalty = state.config.coup_failure_penalty.clone();
        let player = state.player_mut(plotter)?;
        player.lose_gold(penalty.gold);
        player.lose_auctoritas(penalty.auctoritas);
        let bonus = state.config.coup_survival_support_bonus;
        state.player_mut(emperor)?.popular_support += bonus;

        state.log("=== COUP FAILED ===");
        return Ok(Some(CoupOutcome::EmperorSurvived));
    }

    tracing::info!(plotter = %plotter, emperor = %emperor, defense, offense, "Coup succeeded");
    state.log(format!("The coup succeeded! Emperor {} is overthrown and killed!", emperor_name));
    // The dying emperor's death runs imperial succession
    handle_death(state, emperor, rng)?;
    state.log("=== COUP SUCCEEDED ===");
    Ok(Some(CoupOutcome::EmperorOverthrown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_state;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_scores() {
        assert!((defense_score(5, 20) - 7.0).abs() < 1e-9);
        assert!((offense_score(3, 10, 20) - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejected_without_emperor_or_funds() {
        let mut state = sample_state(3);
        let mut rng = StepRng::new(0, 0);
        assert_eq!(attempt_coup(&mut state, PlayerId(1), &mut rng).unwrap(), None);

        state.emperor = Some(PlayerId(0));
        assert_eq!(attempt_coup(&mut state, PlayerId(0), &mut rng).unwrap(), None);
        // coup costs 20, plotter has 10
        assert_eq!(attempt_coup(&mut state, PlayerId(1), &mut rng).unwrap(), None);
        assert_eq!(state.player(PlayerId(1)).unwrap().gold, 10);
    }

    #[test]
    fn test_successful_coup_kills_emperor_and_runs_succession() {
        let mut state = sample_state(3);
        state.counter = 6;
        state.emperor = Some(PlayerId(0));
        state.dynasty.family = Some(PlayerId(0));
        state.dynasty.count = 1;
        state.player_mut(PlayerId(0)).unwrap().gold = 20;
        let plotter = state.player_mut(PlayerId(1)).unwrap();
        plotter.gold = 30;
        plotter.auctoritas = 3;

        // defense 5 + 2 = 7; offense 3 + 1 + 20 = 24
        let outcome = attempt_coup(&mut state, PlayerId(1), &mut StepRng::new(0, 0)).unwrap();
        assert_eq!(outcome, Some(CoupOutcome::EmperorOverthrown));
        assert_eq!(state.player(PlayerId(1)).unwrap().gold, 10);
        // Emperor's family loses 5 auctoritas to the crisis; family 2 holds 5 >= 3
        assert_eq!(state.emperor, Some(PlayerId(2)));
        assert_eq!(state.dynasty.count, 1);
    }

    #[test]
    fn test_failed_coup_executes_plotter() {
        let mut state = sample_state(3);
        state.emperor = Some(PlayerId(0));
        state.player_mut(PlayerId(0)).unwrap().popular_support = 40;
        state.player_mut(PlayerId(1)).unwrap().gold = 20;
        let old_name = state.player(PlayerId(1)).unwrap().paterfamilias.name.clone();
        state.player_mut(PlayerId(1)).unwrap().paterfamilias.name = format!("{} the Elder", old_name);

        let outcome = attempt_coup(&mut state, PlayerId(1), &mut StepRng::new(0, 0)).unwrap();
        assert_eq!(outcome, Some(CoupOutcome::EmperorSurvived));
        let plotter = state.player(PlayerId(1)).unwrap();
        assert_ne!(plotter.paterfamilias.name, format!("{} the Elder", old_name));
        assert_eq!(plotter.gold, 0);
        // 5 - 5 (crisis) - 5 (coup penalty), floored
        assert_eq!(plotter.auctoritas, 0);
        assert_eq!(state.player(PlayerId(0)).unwrap().popular_support, 43);
        assert_eq!(state.emperor, Some(PlayerId(0)));
    }
}
