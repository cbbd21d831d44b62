//! Emperor-only operations: campaigns, estate grants, steering the counter
//!
//! Tax changes live with the rest of the tax rules in `economy::tax`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actions::resolver::ensure_action_phase;
use crate::core::error::Result;
use crate::core::types::{Cost, CounterDirection, PlayerId, ProvinceId};
use crate::entity::effects::EffectKind;
use crate::military;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignOutcome {
    /// A new province joined the empire
    Conquered(ProvinceId),
    /// Victory in the field but not enough strength to hold new land
    Partial,
    Failed,
}

fn ensure_emperor(state: &mut GameState, id: PlayerId) -> Result<bool> {
    if !ensure_action_phase(state, id)? {
        return Ok(false);
    }
    if !state.is_emperor(id) {
        let name = state.player_name(id)?;
        state.log(format!("{} is not the Emperor!", name));
        return Ok(false);
    }
    Ok(true)
}

fn pay_gold(state: &mut GameState, id: PlayerId, gold: u32, action: &str) -> Result<bool> {
    let cost = Cost::gold(gold);
    let player = state.player_mut(id)?;
    if !player.can_afford(&cost) {
        let name = player.name.clone();
        state.log(format!("Emperor {} cannot afford to {} (need {} gold)", name, action, gold));
        return Ok(false);
    }
    player.pay(&cost);
    Ok(true)
}

/// Failure chance of the emperor's next campaign: base plus sabotage minus
/// legion boosts, within [0, 1]
pub fn campaign_failure_chance(state: &GameState, id: PlayerId) -> Result<f64> {
    let effects = &state.player(id)?.effects;
    let chance = state.config.campaign_base_failure_chance + effects.campaign_sabotage() - effects.military_boost();
    Ok(chance.clamp(0.0, 1.0))
}

/// Send the legions out.
///
/// Sabotage against the emperor is used up by this campaign. On success the
/// next province is conquered if strength allows, otherwise the campaign
/// still strengthens the army.
pub fn launch_campaign<R: Rng + ?Sized>(
    state: &mut GameState,
    id: PlayerId,
    rng: &mut R,
) -> Result<Option<CampaignOutcome>> {
    if !ensure_emperor(state, id)? {
        return Ok(None);
    }
    let cost = state.config.campaign_cost;
    if !pay_gold(state, id, cost, "launch a campaign")? {
        return Ok(None);
    }

    let failure_chance = campaign_failure_chance(state, id)?;
    state
        .player_mut(id)?
        .effects
        .remove_where(|k| matches!(k, EffectKind::CampaignSabotage(_)));
    let name = state.player_name(id)?;

    let outcome = if rng.gen::<f64>() < failure_chance {
        let support = state.config.campaign_failure_popular_support;
        let strength = state.config.campaign_failure_strength;
        state.player_mut(id)?.lose_popular_support(support);
        state.military_strength = state.military_strength.saturating_sub(strength);
        state.log(format!(
            "Campaign failed! Emperor {} loses {} Popular Support, {} Military Strength.",
            name, support, strength
        ));
        CampaignOutcome::Failed
    } else if let Some(province) = military::attempt_conquest(state)? {
        let support = state.config.campaign_success_popular_support;
        state.player_mut(id)?.popular_support += support;
        state.log(format!("Emperor {} gains +{} Popular Support!", name, support));
        state.log("Emperor must now distribute the new estates.");
        CampaignOutcome::Conquered(province)
    } else {
        let support = state.config.campaign_partial_popular_support;
        state.player_mut(id)?.popular_support += support;
        state.military_strength += state.config.campaign_partial_strength;
        state.log("Campaign successful! Rome's military strengthened but no new territory conquered.");
        CampaignOutcome::Partial
    };

    tracing::info!(emperor = %id, failure_chance, outcome = ?outcome, "Campaign resolved");
    Ok(Some(outcome))
}

/// Hand out unowned estates of a conquered province.
///
/// `grants` pairs players with estate counts; every player id is checked
/// before anything moves. Grants stop when the province runs out.
pub fn distribute_estates(
    state: &mut GameState,
    id: PlayerId,
    province: ProvinceId,
    grants: &[(PlayerId, u32)],
) -> Result<bool> {
    if !ensure_emperor(state, id)? {
        return Ok(false);
    }
    let Ok(target) = state.province(province) else {
        state.log("Province not found!");
        return Ok(false);
    };
    if !target.conquered {
        let name = target.name.clone();
        state.log(format!("{} is not part of the Empire", name));
        return Ok(false);
    }
    for (player, _) in grants {
        state.player(*player)?;
    }

    let emperor_name = state.player_name(id)?;
    let mut unowned: Vec<_> = state.province(province)?.unowned_estates().map(|e| e.id).collect();
    for &(player, count) in grants {
        let mut granted = 0;
        while granted < count {
            let Some(estate) = unowned.pop() else { break };
            state.transfer_estate(estate, Some(player))?;
            granted += 1;
        }
        let name = state.player_name(player)?;
        state.log(format!("Emperor {} granted {} estates to {}", emperor_name, granted, name));
    }
    Ok(true)
}

/// Push the counter toward virtue (`Up`) or popularity (`Down`)
pub fn influence_counter(state: &mut GameState, id: PlayerId, direction: CounterDirection) -> Result<bool> {
    if !ensure_emperor(state, id)? {
        return Ok(false);
    }
    let cost = state.config.counter_influence_cost;
    if !pay_gold(state, id, cost, "influence the counter")? {
        return Ok(false);
    }

    let shift = state.config.counter_influence_shift;
    let name = state.player_name(id)?;
    match direction {
        CounterDirection::Up => {
            state.counter = (state.counter + shift).min(state.config.counter_maximum);
            let virtue = state.config.counter_influence_virtue_bonus;
            let popularity = state.config.counter_influence_popularity_bonus;
            let emperor = state.player_mut(id)?;
            emperor.auctoritas += virtue;
            emperor.lose_popular_support(popularity);
            state.log(format!(
                "Emperor {} promoted virtuous institutions! Counter moved toward virtue.",
                name
            ));
        }
        CounterDirection::Down => {
            state.counter = state.counter.saturating_sub(shift).max(1);
            let popularity = state.config.counter_influence_popularity_bonus;
            let emperor = state.player_mut(id)?;
            emperor.popular_support += popularity;
            emperor.lose_auctoritas(1);
            state.log(format!(
                "Emperor {} enacted populist reforms! Counter moved toward popularity.",
                name
            ));
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::effects::Effect;
    use crate::testing::sample_state;
    use rand::rngs::mock::StepRng;

    fn crowned(players: usize) -> GameState {
        let mut state = sample_state(players);
        state.emperor = Some(PlayerId(0));
        state.player_mut(PlayerId(0)).unwrap().gold = 100;
        state
    }

    #[test]
    fn test_imperial_ops_need_the_emperor() {
        let mut state = sample_state(2);
        state.player_mut(PlayerId(0)).unwrap().gold = 100;
        assert_eq!(launch_campaign(&mut state, PlayerId(0), &mut StepRng::new(0, 0)).unwrap(), None);
        assert!(!influence_counter(&mut state, PlayerId(0), CounterDirection::Up).unwrap());
        assert_eq!(state.player(PlayerId(0)).unwrap().gold, 100);
        assert!(state.log.contains("is not the Emperor"));
    }

    #[test]
    fn test_campaign_success_conquers() {
        let mut state = crowned(2);
        state.config.campaign_base_failure_chance = 0.0;
        let outcome = launch_campaign(&mut state, PlayerId(0), &mut StepRng::new(0, 0)).unwrap();
        assert_eq!(outcome, Some(CampaignOutcome::Conquered(ProvinceId(1))));
        let emperor = state.player(PlayerId(0)).unwrap();
        assert_eq!(emperor.gold, 80);
        assert_eq!(emperor.popular_support, 10);
        assert_eq!(state.military_strength, 90);
    }

    #[test]
    fn test_campaign_partial_without_strength() {
        let mut state = crowned(2);
        state.config.campaign_base_failure_chance = 0.0;
        state.military_strength = 10;
        let outcome = launch_campaign(&mut state, PlayerId(0), &mut StepRng::new(0, 0)).unwrap();
        assert_eq!(outcome, Some(CampaignOutcome::Partial));
        assert_eq!(state.military_strength, 15);
        assert_eq!(state.player(PlayerId(0)).unwrap().popular_support, 7);
    }

    #[test]
    fn test_sabotage_raises_failure_and_is_consumed() {
        let mut state = crowned(2);
        state
            .player_mut(PlayerId(0))
            .unwrap()
            .effects
            .push(Effect::permanent(EffectKind::CampaignSabotage(0.3), "Sabotage"));
        assert!((campaign_failure_chance(&state, PlayerId(0)).unwrap() - 0.6).abs() < 1e-9);

        let outcome = launch_campaign(&mut state, PlayerId(0), &mut StepRng::new(0, 0)).unwrap();
        assert_eq!(outcome, Some(CampaignOutcome::Failed));
        assert_eq!(state.player(PlayerId(0)).unwrap().popular_support, 0);
        assert_eq!(state.military_strength, 95);
        assert!((campaign_failure_chance(&state, PlayerId(0)).unwrap() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_legion_boost_lowers_failure_chance() {
        let mut state = crowned(2);
        state
            .player_mut(PlayerId(0))
            .unwrap()
            .effects
            .push(Effect::timed(EffectKind::RomeMilitaryBoost(0.5), 3, "Legion"));
        assert_eq!(campaign_failure_chance(&state, PlayerId(0)).unwrap(), 0.0);
    }

    #[test]
    fn test_distribute_estates_from_conquered_province() {
        let mut state = crowned(3);
        state.provinces[2].conquered = true;
        let province = state.provinces[2].id;
        // Sardinia et Corsica has 8 estates
        let grants = [(PlayerId(1), 5), (PlayerId(2), 5)];
        assert!(distribute_estates(&mut state, PlayerId(0), province, &grants).unwrap());

        assert_eq!(state.player(PlayerId(1)).unwrap().estates.len(), 10);
        assert_eq!(state.player(PlayerId(2)).unwrap().estates.len(), 8);
        assert_eq!(state.province(province).unwrap().unowned_estates().count(), 0);
    }

    #[test]
    fn test_distribute_estates_validation() {
        let mut state = crowned(2);
        let province = state.provinces[1].id;
        assert!(!distribute_estates(&mut state, PlayerId(0), province, &[(PlayerId(1), 1)]).unwrap());
        assert!(!distribute_estates(&mut state, PlayerId(0), ProvinceId(99), &[]).unwrap());

        state.provinces[1].conquered = true;
        let result = distribute_estates(&mut state, PlayerId(0), province, &[(PlayerId(1), 1), (PlayerId(9), 1)]);
        assert!(result.is_err());
        assert_eq!(state.player(PlayerId(1)).unwrap().estates.len(), 5);
    }

    #[test]
    fn test_influence_counter_both_directions() {
        let mut state = crowned(2);
        state.counter = 99;
        assert!(influence_counter(&mut state, PlayerId(0), CounterDirection::Up).unwrap());
        assert_eq!(state.counter, 100);
        let emperor = state.player(PlayerId(0)).unwrap();
        assert_eq!(emperor.auctoritas, 7);
        assert_eq!(emperor.popular_support, 3);
        assert_eq!(emperor.gold, 85);

        state.counter = 2;
        assert!(influence_counter(&mut state, PlayerId(0), CounterDirection::Down).unwrap());
        assert_eq!(state.counter, 1);
        let emperor = state.player(PlayerId(0)).unwrap();
        assert_eq!(emperor.auctoritas, 6);
        assert_eq!(emperor.popular_support, 5);
    }
}
