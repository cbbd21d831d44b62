//! Estate income, per-turn bonuses and the tax/tribute waterfall

use crate::core::error::Result;
use crate::core::types::{PlayerId, Trait};
use crate::entity::effects::EffectKind;
use crate::entity::player::Player;
use crate::state::GameState;

const EPSILON: f64 = 1e-9;

/// floor(total * rate), tolerant of float error at exact products
pub fn share(total: u32, rate: f64) -> u32 {
    if rate <= 0.0 {
        return 0;
    }
    ((total as f64) * rate + EPSILON).floor() as u32
}

/// Who received what from one distribution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    pub total: u32,
    pub to_emperor: Option<(PlayerId, u32)>,
    /// Part of the emperor's tax handed back by an active tax refund
    pub refunded: u32,
    pub to_mother: Option<(PlayerId, u32)>,
    pub to_wife: Option<(PlayerId, u32)>,
    pub kept: u32,
}

impl Distribution {
    /// Sum of all four tranches; always equals `total`
    pub fn paid_out(&self) -> u32 {
        let tranche = |t: Option<(PlayerId, u32)>| t.map_or(0, |(_, amount)| amount);
        tranche(self.to_emperor) + tranche(self.to_mother) + tranche(self.to_wife) + self.kept
    }
}

/// Income multiplier from traits and active income modifiers
pub fn income_multiplier(state: &GameState, player: &Player) -> f64 {
    let mods = &state.config.trait_modifiers;
    let favor = player.effects.trait_multiplier();

    let mut bonus = 0.0;
    if player.paterfamilias.traits.contains(&Trait::EstateIncome) {
        bonus += mods.estate_income_bonus;
    }
    for kin in player.wife.iter().chain(player.mother.iter()) {
        if kin.traits.contains(&Trait::FinancialAcumen) {
            bonus += mods.financial_acumen;
        }
    }
    1.0 + bonus * favor + player.effects.income_modifier()
}

/// Estate income for one turn after modifiers, floored and never negative
pub fn estate_income(state: &GameState, id: PlayerId) -> Result<u32> {
    let base = state.base_estate_income(id)?;
    let multiplier = income_multiplier(state, state.player(id)?);
    Ok(((base as f64) * multiplier + EPSILON).floor().max(0.0) as u32)
}

/// Income phase for one player.
///
/// Adds estate income plus trade monopoly bonuses to the accumulated bucket,
/// pays per-turn bonuses, runs the distribution waterfall once the bucket
/// reaches the threshold, then applies per-turn trait effects.
pub fn process_income(state: &mut GameState, id: PlayerId) -> Result<Option<Distribution>> {
    let income = estate_income(state, id)?;
    let threshold = state.config.income_accumulation_threshold;

    let player = state.player_mut(id)?;
    let monopoly = player.effects.trade_monopoly_bonus();
    player.accumulated_income += income + monopoly;
    let (bonus_auctoritas, bonus_support) = player.effects.per_turn_bonus();
    player.auctoritas += bonus_auctoritas;
    player.popular_support += bonus_support;
    let accumulated = player.accumulated_income;
    let name = player.name.clone();

    state.log(format!(
        "{} earned {} gold from estates (accumulated: {})",
        name,
        income + monopoly,
        accumulated
    ));

    let distribution = if accumulated >= threshold {
        Some(distribute_income(state, id)?)
    } else {
        None
    };

    apply_trait_effects(state, id)?;
    Ok(distribution)
}

/// Pay out the accumulated bucket: emperor's tax, mother's family, wife's
/// family, then the payer keeps the rest.
///
/// Each tranche is computed on the full total and capped at what is left,
/// so the four tranches always sum to the total exactly.
pub fn distribute_income(state: &mut GameState, id: PlayerId) -> Result<Distribution> {
    let payer = state.player(id)?;
    let total = payer.accumulated_income;
    let name = payer.name.clone();
    let rates = payer.tribute_rates;
    let mother_family = payer.mother.as_ref().map(|m| m.origin_family);
    let wife_family = payer.wife.as_ref().map(|w| w.origin_family);
    let refund_share = payer.effects.tax_refund();

    let mut remaining = total;
    let mut out = Distribution { total, ..Default::default() };

    // 1. Emperor's tax
    if let Some(emperor) = state.emperor.filter(|e| *e != id) {
        let tax = share(total, state.tax_rate).min(remaining);
        let refund = match refund_share {
            Some(s) if tax > 0 => share(tax, s).min(tax),
            _ => 0,
        };
        let received = tax - refund;
        state.player_mut(emperor)?.gold += received;
        remaining -= received;
        out.to_emperor = Some((emperor, received));
        out.refunded = refund;

        let emperor_name = state.player_name(emperor)?;
        state.log(format!("{} paid {} gold in taxes to {}", name, tax, emperor_name));
        if refund > 0 {
            state
                .player_mut(id)?
                .effects
                .remove_where(|k| matches!(k, EffectKind::TaxRefund(_)));
            state.log(format!("{}'s tax farm recovered {} gold", name, refund));
        }
    }

    // 2. Mother's family, 3. wife's family
    for (family, rate, is_mother) in [(mother_family, rates.to_mother, true), (wife_family, rates.to_wife, false)] {
        let Some(family) = family else { continue };
        let tribute = share(total, rate).min(remaining);
        state.player_mut(family)?.gold += tribute;
        remaining -= tribute;

        let family_name = state.player_name(family)?;
        let relation = if is_mother { "mother's" } else { "wife's" };
        state.log(format!(
            "{} paid {} gold tribute to {} ({} family)",
            name, tribute, family_name, relation
        ));
        if is_mother {
            out.to_mother = Some((family, tribute));
        } else {
            out.to_wife = Some((family, tribute));
        }
    }

    // 4. The rest stays home
    let payer = state.player_mut(id)?;
    payer.gold += remaining;
    payer.accumulated_income = 0;
    out.kept = remaining;
    state.log(format!("{} received {} gold", name, remaining));

    Ok(out)
}

/// Per-turn resource grants from paterfamilias, wife and mother traits
pub fn apply_trait_effects(state: &mut GameState, id: PlayerId) -> Result<()> {
    let mods = state.config.trait_modifiers.clone();
    let player = state.player_mut(id)?;
    let favor = player.effects.trait_multiplier();
    let scaled = |amount: u32| (amount as f64 * favor + EPSILON).floor() as u32;

    let mut auctoritas = 0;
    let mut support = 0;
    for kin in player.wife.iter().chain(player.mother.iter()) {
        if kin.traits.contains(&Trait::PoliticalSavvy) {
            auctoritas += mods.political_savvy;
        }
        if kin.traits.contains(&Trait::BelovedByPeople) {
            support += mods.beloved_by_people;
        }
    }
    if player.paterfamilias.traits.contains(&Trait::BaseAuctoritas) {
        auctoritas += mods.base_auctoritas;
    }
    if player.paterfamilias.traits.contains(&Trait::PopularSupport) {
        support += mods.base_popular_support;
    }

    player.auctoritas += scaled(auctoritas);
    player.popular_support += scaled(support);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::effects::Effect;
    use crate::testing::sample_state;

    #[test]
    fn test_share_handles_float_products() {
        assert_eq!(share(10, 0.3), 3);
        assert_eq!(share(100, 0.29), 29);
        assert_eq!(share(10, 0.05), 0);
        assert_eq!(share(20, 0.05), 1);
        assert_eq!(share(7, 0.0), 0);
    }

    #[test]
    fn test_base_income_is_yield_sum() {
        let state = sample_state(2);
        assert_eq!(estate_income(&state, PlayerId(0)).unwrap(), 10);
    }

    #[test]
    fn test_income_modifiers_and_floor() {
        let mut state = sample_state(2);
        let player = state.player_mut(PlayerId(0)).unwrap();
        player.paterfamilias.traits = vec![Trait::EstateIncome];
        player.effects.push(Effect::timed(EffectKind::IncomeModifier(-0.25), 2, "Plague"));
        // 10 * (1.0 + 0.1 - 0.25) = 8.5
        assert_eq!(estate_income(&state, PlayerId(0)).unwrap(), 8);

        let player = state.player_mut(PlayerId(0)).unwrap();
        player.effects.push(Effect::timed(EffectKind::IncomeModifier(-2.0), 2, "Ruin"));
        assert_eq!(estate_income(&state, PlayerId(0)).unwrap(), 0);
    }

    #[test]
    fn test_waterfall_order_and_conservation() {
        let mut state = sample_state(3);
        state.emperor = Some(PlayerId(1));
        state.tax_rate = 0.5;
        let payer = state.player_mut(PlayerId(0)).unwrap();
        payer.accumulated_income = 20;
        payer.tribute_rates.to_mother = 0.3;
        payer.tribute_rates.to_wife = 0.4;

        let out = distribute_income(&mut state, PlayerId(0)).unwrap();
        assert_eq!(out.to_emperor, Some((PlayerId(1), 10)));
        let (_, mother) = out.to_mother.unwrap();
        let (_, wife) = out.to_wife.unwrap();
        assert_eq!(mother, 6);
        // wife's 8 is capped at the 4 remaining
        assert_eq!(wife, 4);
        assert_eq!(out.kept, 0);
        assert_eq!(out.paid_out(), 20);
        assert_eq!(state.player(PlayerId(0)).unwrap().accumulated_income, 0);
    }

    #[test]
    fn test_emperor_pays_no_tax_to_self() {
        let mut state = sample_state(1);
        state.emperor = Some(PlayerId(0));
        state.player_mut(PlayerId(0)).unwrap().accumulated_income = 10;
        let out = distribute_income(&mut state, PlayerId(0)).unwrap();
        assert_eq!(out.to_emperor, None);
        assert_eq!(out.kept, 10);
        assert_eq!(state.player(PlayerId(0)).unwrap().gold, 20);
    }

    #[test]
    fn test_tax_farm_refund_is_consumed() {
        let mut state = sample_state(2);
        state.emperor = Some(PlayerId(1));
        state.tax_rate = 0.5;
        let payer = state.player_mut(PlayerId(0)).unwrap();
        payer.mother = None;
        payer.wife = None;
        payer.accumulated_income = 20;
        payer.effects.push(Effect::permanent(EffectKind::TaxRefund(0.5), "Tax Farm"));

        let out = distribute_income(&mut state, PlayerId(0)).unwrap();
        assert_eq!(out.to_emperor, Some((PlayerId(1), 5)));
        assert_eq!(out.refunded, 5);
        assert_eq!(out.kept, 15);
        assert_eq!(out.paid_out(), 20);
        assert!(state.player(PlayerId(0)).unwrap().effects.tax_refund().is_none());
    }

    #[test]
    fn test_process_income_accumulates_then_distributes() {
        let mut state = sample_state(1);
        state.config.income_accumulation_threshold = 15;
        assert!(process_income(&mut state, PlayerId(0)).unwrap().is_none());
        assert_eq!(state.player(PlayerId(0)).unwrap().accumulated_income, 10);

        let out = process_income(&mut state, PlayerId(0)).unwrap().unwrap();
        assert_eq!(out.total, 20);
        assert_eq!(state.player(PlayerId(0)).unwrap().gold, 30);
    }

    #[test]
    fn test_trait_effects_doubled_by_divine_favor() {
        let mut state = sample_state(2);
        let player = state.player_mut(PlayerId(0)).unwrap();
        player.paterfamilias.traits = vec![Trait::BaseAuctoritas];
        player.effects.push(Effect::timed(EffectKind::DivineFavor(2.0), 3, "Favor"));
        apply_trait_effects(&mut state, PlayerId(0)).unwrap();
        assert_eq!(state.player(PlayerId(0)).unwrap().auctoritas, 7);
    }
}
