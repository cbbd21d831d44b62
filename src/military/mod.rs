//! Empire-wide military strength, conquest and revolts

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::ProvinceId;
use crate::state::GameState;

/// Snapshot of the empire's military position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilitaryStatus {
    pub current: u32,
    /// Strength needed to hold every conquered province
    pub required: u32,
    pub next_conquest_required: u32,
    /// current - required; negative means revolt risk
    pub surplus: i64,
    pub stable: bool,
    pub can_conquer: bool,
    pub next_province: Option<String>,
}

pub fn stability_requirement(state: &GameState) -> u32 {
    state.conquered_count() as u32 * state.config.military_requirement_per_province
}

pub fn conquest_requirement(state: &GameState) -> u32 {
    stability_requirement(state) + state.config.conquest_extra_military_required
}

pub fn military_status(state: &GameState) -> MilitaryStatus {
    let current = state.military_strength;
    let required = stability_requirement(state);
    let next_conquest_required = conquest_requirement(state);
    let next_province = state.provinces.iter().find(|p| !p.conquered).map(|p| p.name.clone());
    MilitaryStatus {
        current,
        required,
        next_conquest_required,
        surplus: current as i64 - required as i64,
        stable: current >= required,
        can_conquer: current >= next_conquest_required && next_province.is_some(),
        next_province,
    }
}

/// Conquer the next unconquered province in list order if strength allows.
///
/// Returns the conquered province, or `None` if nothing is left to conquer
/// or strength falls short (both logged).
pub fn attempt_conquest(state: &mut GameState) -> Result<Option<ProvinceId>> {
    let Some(index) = state.provinces.iter().position(|p| !p.conquered) else {
        state.log("All provinces have been conquered!");
        return Ok(None);
    };

    let required = conquest_requirement(state);
    let name = state.provinces[index].name.clone();
    if state.military_strength < required {
        let current = state.military_strength;
        state.log(format!(
            "Failed to conquer {}. Need {} military strength (current: {})",
            name, required, current
        ));
        return Ok(None);
    }

    let turn = state.turn;
    let province = &mut state.provinces[index];
    province.conquered = true;
    province.conquest_turn = Some(turn);
    let (id, estates) = (province.id, province.estates.len());
    state.military_strength = state.military_strength.saturating_sub(state.config.conquest_military_cost);

    tracing::info!(province = %id, turn, "Province conquered");
    state.log(format!("CONQUEST! {} has been absorbed into the Empire", name));
    state.log(format!("{} new estates are available for distribution", estates));
    Ok(Some(id))
}

/// Round-end decay of military strength
pub fn apply_decay(state: &mut GameState) {
    state.military_strength = state.military_strength.saturating_sub(state.config.military_decay_per_round);
}

/// If strength is below the stability requirement, the most recently
/// conquered non-capital province breaks away and its estates are freed.
///
/// At most one province revolts per check.
pub fn check_revolt(state: &mut GameState) -> Result<Option<ProvinceId>> {
    if state.military_strength >= stability_requirement(state) {
        return Ok(None);
    }

    let latest = state
        .provinces
        .iter()
        .filter(|p| p.conquered && !p.is_capital())
        .filter_map(|p| p.conquest_turn.map(|t| (t, p.id)))
        // Latest turn wins; among equal turns the later province in list order
        .max_by_key(|(turn, id)| (*turn, *id));
    let Some((_, province_id)) = latest else {
        return Ok(None);
    };

    let owned: Vec<_> = state
        .province(province_id)?
        .estates
        .iter()
        .filter(|e| e.owner.is_some())
        .map(|e| e.id)
        .collect();
    for estate in owned {
        state.transfer_estate(estate, None)?;
    }

    let province = state.province_mut(province_id)?;
    province.conquered = false;
    province.conquest_turn = None;
    let name = province.name.clone();

    tracing::warn!(province = %province_id, strength = state.military_strength, "Province revolted");
    state.log(format!(
        "REVOLT! {} has broken free from Roman control due to insufficient military strength",
        name
    ));
    Ok(Some(province_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::testing::sample_state;

    #[test]
    fn test_requirements_scale_with_conquests() {
        let mut state = sample_state(2);
        assert_eq!(stability_requirement(&state), 10);
        assert_eq!(conquest_requirement(&state), 30);
        state.provinces[1].conquered = true;
        assert_eq!(stability_requirement(&state), 20);
    }

    #[test]
    fn test_conquest_takes_next_in_order() {
        let mut state = sample_state(2);
        let conquered = attempt_conquest(&mut state).unwrap();
        assert_eq!(conquered, Some(ProvinceId(1)));
        assert_eq!(state.provinces[1].conquest_turn, Some(state.turn));
        assert_eq!(state.military_strength, 90);
        assert!(state.provinces[1].estates.iter().all(|e| e.owner.is_none()));
    }

    #[test]
    fn test_conquest_needs_surplus() {
        let mut state = sample_state(2);
        state.military_strength = 29;
        assert_eq!(attempt_conquest(&mut state).unwrap(), None);
        assert!(!state.provinces[1].conquered);
        assert_eq!(state.military_strength, 29);
    }

    #[test]
    fn test_no_conquest_when_all_conquered() {
        let mut state = sample_state(2);
        for p in state.provinces.iter_mut() {
            p.conquered = true;
        }
        state.military_strength = 10_000;
        assert_eq!(attempt_conquest(&mut state).unwrap(), None);
        assert!(state.log.contains("All provinces"));
    }

    #[test]
    fn test_decay_without_revolt() {
        let mut state = sample_state(2);
        state.military_strength = 50;
        state.provinces[1].conquered = true;
        state.provinces[1].conquest_turn = Some(2);
        apply_decay(&mut state);
        assert_eq!(state.military_strength, 49);
        assert_eq!(check_revolt(&mut state).unwrap(), None);
    }

    #[test]
    fn test_revolt_reverts_latest_conquest_only() {
        let mut state = sample_state(2);
        state.turn = 5;
        state.military_strength = 0;
        for (index, turn) in [(1usize, 2u32), (2, 4)] {
            state.provinces[index].conquered = true;
            state.provinces[index].conquest_turn = Some(turn);
        }
        let estate = state.provinces[2].estates[0].id;
        state.transfer_estate(estate, Some(PlayerId(1))).unwrap();

        assert_eq!(check_revolt(&mut state).unwrap(), Some(ProvinceId(2)));
        assert!(!state.provinces[2].conquered);
        assert!(state.provinces[1].conquered);
        assert_eq!(state.estate(estate).unwrap().owner, None);
        assert!(!state.player(PlayerId(1)).unwrap().owns(estate));
    }

    #[test]
    fn test_capital_never_revolts() {
        let mut state = sample_state(2);
        state.military_strength = 0;
        assert_eq!(check_revolt(&mut state).unwrap(), None);
        assert!(state.provinces[0].conquered);
        assert_eq!(state.owned_estates().count(), 10);
    }
}
