//! Marriage negotiation and divorce

use serde::{Deserialize, Serialize};

use crate::actions::resolver::ensure_action_phase;
use crate::core::error::Result;
use crate::core::types::{Cost, Gender, PlayerId};
use crate::entity::effects::{Effect, EffectKind};
use crate::entity::player::{Kinswoman, Player};
use crate::state::GameState;

/// An offer for one of another family's daughters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarriageProposal {
    pub family: PlayerId,
    /// Index among that family's marriageable daughters
    pub daughter_index: usize,
    /// Share of distributed income offered to the bride's family
    pub tribute_rate: f64,
}

/// A family with at least one daughter the player could marry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleFamily {
    pub family: PlayerId,
    pub daughters: Vec<String>,
}

/// Why `player` may not marry into `family`, if anything stops it
fn marriage_bar(player: &Player, family: PlayerId) -> Option<&'static str> {
    if player.id == family {
        Some("Cannot marry own family")
    } else if player.mother.as_ref().is_some_and(|m| m.origin_family == family) {
        Some("Cannot marry mother's family")
    } else if player.wife.as_ref().is_some_and(|w| w.origin_family == family) {
        Some("Already married to this family")
    } else if player.is_married() {
        Some("Already married")
    } else {
        None
    }
}

/// Families with marriageable daughters an unmarried player may court
pub fn eligible_families(state: &GameState, id: PlayerId) -> Result<Vec<EligibleFamily>> {
    let player = state.player(id)?;
    let min_age = state.config.minimum_marriage_age;
    if player.is_married() {
        return Ok(Vec::new());
    }

    Ok(state
        .players
        .iter()
        .filter(|family| marriage_bar(player, family.id).is_none())
        .filter_map(|family| {
            let daughters: Vec<String> = family
                .eligible_children(Gender::Female, min_age)
                .map(|d| d.name.clone())
                .collect();
            (!daughters.is_empty()).then(|| EligibleFamily { family: family.id, daughters })
        })
        .collect())
}

/// The marriage action: take a daughter of another family as wife.
///
/// Counts as the turn's core action. The bride leaves her family's children,
/// the wife tribute rate becomes the offered rate and any unmarried penalty
/// is lifted. Proposals are accepted as offered.
pub fn marriage_negotiation(state: &mut GameState, id: PlayerId, proposal: MarriageProposal) -> Result<bool> {
    if !ensure_action_phase(state, id)? {
        return Ok(false);
    }
    let player = state.player(id)?;
    let name = player.name.clone();
    if player.flags.action_taken {
        state.log(format!("{} has already taken an action this turn!", name));
        return Ok(false);
    }
    let cost = Cost::gold(state.config.marriage_negotiation_cost);
    if !player.can_afford(&cost) {
        state.log(format!("{} cannot afford marriage negotiations (need {} gold)", name, cost.gold));
        return Ok(false);
    }

    let family = state.player(proposal.family)?;
    let family_name = family.name.clone();
    if let Some(reason) = marriage_bar(player, proposal.family) {
        state.log(format!("{} cannot marry into {}: {}", name, family_name, reason));
        return Ok(false);
    }

    let min_age = state.config.minimum_marriage_age;
    let bride_position = family
        .children
        .iter()
        .enumerate()
        .filter(|(_, c)| c.gender == Gender::Female && c.age >= min_age)
        .nth(proposal.daughter_index)
        .map(|(i, _)| i);
    let Some(position) = bride_position else {
        state.log("Invalid daughter selection");
        return Ok(false);
    };

    let bride = state.player_mut(proposal.family)?.children.remove(position);
    let rate = proposal.tribute_rate.clamp(0.0, 1.0);
    let player = state.player_mut(id)?;
    player.pay(&cost);
    player.wife = Some(Kinswoman {
        name: bride.name.clone(),
        origin_family: proposal.family,
        traits: bride.traits,
    });
    player.tribute_rates.to_wife = rate;
    player.effects.remove_where(|k| matches!(k, EffectKind::UnmarriedPenalty));
    player.flags.action_taken = true;

    tracing::debug!(player = %id, family = %proposal.family, rate, "Marriage concluded");
    state.log(format!(
        "{} married {} of {}! Tribute rate: {}%",
        name,
        bride.name,
        family_name,
        (rate * 100.0).round()
    ));
    Ok(true)
}

/// Clear the wife and her tribute and mark the family as unmarried
pub(crate) fn dissolve_marriage(player: &mut Player) -> Option<Kinswoman> {
    let wife = player.wife.take()?;
    player.tribute_rates.to_wife = 0.0;
    player.effects.push(Effect::permanent(
        EffectKind::UnmarriedPenalty,
        "Divorced - Unmarried Penalty",
    ));
    Some(wife)
}

/// Divorce the current wife. Not a core action.
pub fn divorce(state: &mut GameState, id: PlayerId) -> Result<bool> {
    if !ensure_action_phase(state, id)? {
        return Ok(false);
    }
    let player = state.player_mut(id)?;
    let name = player.name.clone();
    let Some(wife) = dissolve_marriage(player) else {
        state.log(format!("{} is not married!", name));
        return Ok(false);
    };
    let family_name = state.player_name(wife.origin_family)?;
    state.log(format!(
        "{} divorced {} of {}! Unmarried penalties apply.",
        name, wife.name, family_name
    ));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::player::Child;
    use crate::testing::sample_state;

    fn daughter(name: &str, age: u32) -> Child {
        Child { name: name.into(), age, gender: Gender::Female, traits: vec![] }
    }

    fn proposal(family: u32, daughter_index: usize) -> MarriageProposal {
        MarriageProposal { family: PlayerId(family), daughter_index, tribute_rate: 0.1 }
    }

    #[test]
    fn test_married_player_has_no_prospects() {
        let mut state = sample_state(3);
        state.player_mut(PlayerId(2)).unwrap().children = vec![daughter("Livia", 16)];
        assert!(eligible_families(&state, PlayerId(0)).unwrap().is_empty());
    }

    #[test]
    fn test_prospects_exclude_own_and_mothers_family() {
        let mut state = sample_state(3);
        for p in state.players.iter_mut() {
            p.children = vec![daughter("Livia", 16), daughter("Tullia", 9)];
        }
        let player = state.player_mut(PlayerId(0)).unwrap();
        player.wife = None;
        let mother = player.mother.as_ref().unwrap().origin_family;

        let families = eligible_families(&state, PlayerId(0)).unwrap();
        assert_eq!(families.len(), 1);
        assert_ne!(families[0].family, PlayerId(0));
        assert_ne!(families[0].family, mother);
        assert_eq!(families[0].daughters, vec!["Livia".to_string()]);
    }

    #[test]
    fn test_marriage_moves_daughter_and_sets_tribute() {
        let mut state = sample_state(2);
        state.player_mut(PlayerId(1)).unwrap().children = vec![daughter("Tullia", 9), daughter("Livia", 16)];
        let player = state.player_mut(PlayerId(0)).unwrap();
        player.wife = None;
        player.effects.push(Effect::permanent(EffectKind::UnmarriedPenalty, "Divorced"));

        assert!(marriage_negotiation(&mut state, PlayerId(0), proposal(1, 0)).unwrap());
        let player = state.player(PlayerId(0)).unwrap();
        let wife = player.wife.as_ref().unwrap();
        assert_eq!(wife.name, "Livia");
        assert_eq!(wife.origin_family, PlayerId(1));
        assert!((player.tribute_rates.to_wife - 0.1).abs() < 1e-9);
        assert!(player.effects.is_empty());
        assert!(player.flags.action_taken);
        let family = state.player(PlayerId(1)).unwrap();
        assert_eq!(family.children.len(), 1);
        assert_eq!(family.children[0].name, "Tullia");
    }

    #[test]
    fn test_marriage_rejections_leave_state_alone() {
        let mut state = sample_state(2);
        state.player_mut(PlayerId(1)).unwrap().children = vec![daughter("Livia", 16)];
        // Still married
        assert!(!marriage_negotiation(&mut state, PlayerId(0), proposal(1, 0)).unwrap());

        state.player_mut(PlayerId(0)).unwrap().wife = None;
        assert!(!marriage_negotiation(&mut state, PlayerId(0), proposal(0, 0)).unwrap());
        assert!(!marriage_negotiation(&mut state, PlayerId(0), proposal(1, 1)).unwrap());
        assert_eq!(state.player(PlayerId(1)).unwrap().children.len(), 1);
        assert!(!state.player(PlayerId(0)).unwrap().flags.action_taken);
    }

    #[test]
    fn test_divorce_adds_penalty() {
        let mut state = sample_state(2);
        assert!(divorce(&mut state, PlayerId(0)).unwrap());
        let player = state.player(PlayerId(0)).unwrap();
        assert!(!player.is_married());
        assert_eq!(player.tribute_rates.to_wife, 0.0);
        assert!(player.effects.has(|k| matches!(k, EffectKind::UnmarriedPenalty)));
        assert!(!divorce(&mut state, PlayerId(0)).unwrap());
    }
}
