//! Timed modifiers attached to a player
//!
//! Effects are appended by cards, events and family mishaps. Each carries an
//! optional remaining duration that is decremented once at the end of its
//! owner's turn; effects without a duration stay until something removes
//! them by kind (remarriage clears `UnmarriedPenalty`, a campaign consumes
//! `CampaignSabotage`, a tax payment consumes `TaxRefund`).

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, ProvinceId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Added to the 1.0 income multiplier (may be negative)
    IncomeModifier(f64),
    /// Flat gold added to accumulated income each turn
    TradeMonopoly { province: ProvinceId, bonus: u32 },
    /// Resources granted at the start of each turn
    PerTurnBonus { auctoritas: u32, popular_support: u32 },
    /// Standing alliance with another family; grants auctoritas each turn
    Alliance { with: PlayerId, auctoritas: u32 },
    /// Added to the failure chance of this player's next campaign
    CampaignSabotage(f64),
    /// Subtracted from the emperor's campaign failure chance
    RomeMilitaryBoost(f64),
    /// Fractional bonus to this family's raid strength
    Mercenaries(f64),
    /// Extra turns-in-role added at end of turn
    AcceleratedAging(u32),
    /// Share of the next tax payment refunded to the payer
    TaxRefund(f64),
    /// Added to the per-turn birth chance
    FertilityBoost(f64),
    /// Multiplier applied to trait effects
    DivineFavor(f64),
    /// Card play is blocked while active
    OracleWard,
    /// Status flag for a divorced paterfamilias
    UnmarriedPenalty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    /// Remaining end-of-turn ticks; `None` = until removed
    pub duration: Option<u32>,
    pub name: String,
}

impl Effect {
    pub fn timed(kind: EffectKind, duration: u32, name: impl Into<String>) -> Self {
        Self {
            kind,
            duration: Some(duration),
            name: name.into(),
        }
    }

    pub fn permanent(kind: EffectKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            duration: None,
            name: name.into(),
        }
    }
}

/// Per-player collection of active effects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectLedger {
    effects: Vec<Effect>,
}

impl EffectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn has(&self, pred: impl Fn(&EffectKind) -> bool) -> bool {
        self.effects.iter().any(|e| pred(&e.kind))
    }

    /// Remove every effect matching `pred`, returning the removed effects
    pub fn remove_where(&mut self, pred: impl Fn(&EffectKind) -> bool) -> Vec<Effect> {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.effects.drain(..).partition(|e| pred(&e.kind));
        self.effects = kept;
        removed
    }

    /// End-of-turn bookkeeping: decrement durations, drop expired effects.
    ///
    /// Returns the number of effects that expired.
    pub fn tick(&mut self) -> usize {
        let before = self.effects.len();
        self.effects.retain_mut(|effect| match effect.duration.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(1);
                *remaining > 0
            }
            None => true,
        });
        before - self.effects.len()
    }

    /// Sum of all `IncomeModifier` values
    pub fn income_modifier(&self) -> f64 {
        self.effects
            .iter()
            .filter_map(|e| match e.kind {
                EffectKind::IncomeModifier(v) => Some(v),
                _ => None,
            })
            .sum()
    }

    /// Sum of all trade monopoly flat bonuses
    pub fn trade_monopoly_bonus(&self) -> u32 {
        self.effects
            .iter()
            .map(|e| match e.kind {
                EffectKind::TradeMonopoly { bonus, .. } => bonus,
                _ => 0,
            })
            .sum()
    }

    /// (auctoritas, popular support) granted per turn by bonuses and alliances
    pub fn per_turn_bonus(&self) -> (u32, u32) {
        self.effects.iter().fold((0, 0), |(a, p), e| match e.kind {
            EffectKind::PerTurnBonus { auctoritas, popular_support } => (a + auctoritas, p + popular_support),
            EffectKind::Alliance { auctoritas, .. } => (a + auctoritas, p),
            _ => (a, p),
        })
    }

    pub fn campaign_sabotage(&self) -> f64 {
        self.sum_f64(|k| match k {
            EffectKind::CampaignSabotage(v) => Some(*v),
            _ => None,
        })
    }

    pub fn military_boost(&self) -> f64 {
        self.sum_f64(|k| match k {
            EffectKind::RomeMilitaryBoost(v) => Some(*v),
            _ => None,
        })
    }

    pub fn mercenaries(&self) -> f64 {
        self.sum_f64(|k| match k {
            EffectKind::Mercenaries(v) => Some(*v),
            _ => None,
        })
    }

    pub fn fertility_boost(&self) -> f64 {
        self.sum_f64(|k| match k {
            EffectKind::FertilityBoost(v) => Some(*v),
            _ => None,
        })
    }

    pub fn accelerated_aging(&self) -> u32 {
        self.effects
            .iter()
            .map(|e| match e.kind {
                EffectKind::AcceleratedAging(v) => v,
                _ => 0,
            })
            .sum()
    }

    /// Largest active tax refund share, if any
    pub fn tax_refund(&self) -> Option<f64> {
        self.effects
            .iter()
            .filter_map(|e| match e.kind {
                EffectKind::TaxRefund(v) => Some(v),
                _ => None,
            })
            .reduce(f64::max)
    }

    /// Trait multiplier: the strongest active divine favor, 1.0 otherwise
    pub fn trait_multiplier(&self) -> f64 {
        self.effects
            .iter()
            .filter_map(|e| match e.kind {
                EffectKind::DivineFavor(v) => Some(v),
                _ => None,
            })
            .reduce(f64::max)
            .unwrap_or(1.0)
    }

    pub fn card_play_blocked(&self) -> bool {
        self.has(|k| matches!(k, EffectKind::OracleWard))
    }

    fn sum_f64(&self, extract: impl Fn(&EffectKind) -> Option<f64>) -> f64 {
        self.effects.iter().filter_map(|e| extract(&e.kind)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_expires_timed_effects() {
        let mut ledger = EffectLedger::new();
        ledger.push(Effect::timed(EffectKind::IncomeModifier(-0.25), 2, "Plague"));
        ledger.push(Effect::timed(EffectKind::FertilityBoost(0.3), 1, "Venus"));
        ledger.push(Effect::permanent(EffectKind::UnmarriedPenalty, "Divorced"));

        assert_eq!(ledger.tick(), 1);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.tick(), 1);
        assert_eq!(ledger.len(), 1);

        // Permanent effects survive any number of ticks
        for _ in 0..10 {
            ledger.tick();
        }
        assert!(ledger.has(|k| matches!(k, EffectKind::UnmarriedPenalty)));
    }

    #[test]
    fn test_income_modifier_sums() {
        let mut ledger = EffectLedger::new();
        ledger.push(Effect::timed(EffectKind::IncomeModifier(-0.25), 2, "Plague"));
        ledger.push(Effect::timed(EffectKind::IncomeModifier(-0.40), 3, "Famine"));
        assert!((ledger.income_modifier() + 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_remove_where_by_kind() {
        let mut ledger = EffectLedger::new();
        ledger.push(Effect::permanent(EffectKind::UnmarriedPenalty, "Divorced"));
        ledger.push(Effect::permanent(EffectKind::CampaignSabotage(0.3), "Sabotage"));

        let removed = ledger.remove_where(|k| matches!(k, EffectKind::UnmarriedPenalty));
        assert_eq!(removed.len(), 1);
        assert_eq!(ledger.len(), 1);
        assert!((ledger.campaign_sabotage() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_per_turn_bonus_includes_alliances() {
        let mut ledger = EffectLedger::new();
        ledger.push(Effect::timed(
            EffectKind::PerTurnBonus { auctoritas: 1, popular_support: 1 },
            3,
            "Tribune",
        ));
        ledger.push(Effect::permanent(
            EffectKind::Alliance { with: PlayerId(2), auctoritas: 1 },
            "Alliance",
        ));
        assert_eq!(ledger.per_turn_bonus(), (2, 1));
    }

    #[test]
    fn test_trait_multiplier_defaults_to_one() {
        let mut ledger = EffectLedger::new();
        assert_eq!(ledger.trait_multiplier(), 1.0);
        ledger.push(Effect::timed(EffectKind::DivineFavor(2.0), 3, "Favor"));
        assert_eq!(ledger.trait_multiplier(), 2.0);
    }
}
