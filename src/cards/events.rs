//! Event cards: empire-wide shocks and metric-targeted rewards/punishments

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cards::targeting::{least, most};
use crate::cards::EventCategory;
use crate::core::error::Result;
use crate::core::types::{EstateId, PlayerId};
use crate::economy::tax::lower_tax_rate;
use crate::entity::effects::{Effect, EffectKind};
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventEffect {
    // Empire-wide
    Plague,
    BarbarianInvasion,
    EconomicBoom,
    Famine,
    MilitaryTriumph,
    SenateCrisis,
    GrandFestival,
    TaxRevolt,
    // Targeted by metric
    VirtuousReward,
    PopularReward,
    VirtuousPunishment,
    PopularPunishment,
    WealthTaxation,
    PovertyAid,
    EstateSeizure,
    PoliticalOpportunity,
    MarriageProposal,
    SuccessionCrisis,
    DiplomaticTriumph,
}

impl EventEffect {
    pub const ALL: [EventEffect; 19] = [
        EventEffect::Plague,
        EventEffect::BarbarianInvasion,
        EventEffect::EconomicBoom,
        EventEffect::Famine,
        EventEffect::MilitaryTriumph,
        EventEffect::SenateCrisis,
        EventEffect::GrandFestival,
        EventEffect::TaxRevolt,
        EventEffect::VirtuousReward,
        EventEffect::PopularReward,
        EventEffect::VirtuousPunishment,
        EventEffect::PopularPunishment,
        EventEffect::WealthTaxation,
        EventEffect::PovertyAid,
        EventEffect::EstateSeizure,
        EventEffect::PoliticalOpportunity,
        EventEffect::MarriageProposal,
        EventEffect::SuccessionCrisis,
        EventEffect::DiplomaticTriumph,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            EventEffect::Plague => "plague",
            EventEffect::BarbarianInvasion => "barbarian_invasion",
            EventEffect::EconomicBoom => "economic_boom",
            EventEffect::Famine => "famine",
            EventEffect::MilitaryTriumph => "military_triumph",
            EventEffect::SenateCrisis => "senate_crisis",
            EventEffect::GrandFestival => "religious_festival",
            EventEffect::TaxRevolt => "tax_revolt",
            EventEffect::VirtuousReward => "virtuous_reward",
            EventEffect::PopularReward => "popular_reward",
            EventEffect::VirtuousPunishment => "virtuous_punishment",
            EventEffect::PopularPunishment => "popular_punishment",
            EventEffect::WealthTaxation => "wealth_taxation",
            EventEffect::PovertyAid => "poverty_aid",
            EventEffect::EstateSeizure => "estate_seizure",
            EventEffect::PoliticalOpportunity => "political_opportunity",
            EventEffect::MarriageProposal => "marriage_alliance",
            EventEffect::SuccessionCrisis => "succession_crisis",
            EventEffect::DiplomaticTriumph => "diplomatic_triumph",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventEffect::Plague => "Plague Strikes the Empire",
            EventEffect::BarbarianInvasion => "Barbarian Invasion",
            EventEffect::EconomicBoom => "Economic Prosperity",
            EventEffect::Famine => "Famine in the Provinces",
            EventEffect::MilitaryTriumph => "Military Triumph",
            EventEffect::SenateCrisis => "Senate Crisis",
            EventEffect::GrandFestival => "Grand Religious Festival",
            EventEffect::TaxRevolt => "Tax Revolt",
            EventEffect::VirtuousReward => "Divine Favor for the Virtuous",
            EventEffect::PopularReward => "Popular Acclaim",
            EventEffect::VirtuousPunishment => "Scandal of the Dishonorable",
            EventEffect::PopularPunishment => "Mob Fury",
            EventEffect::WealthTaxation => "Extraordinary Taxation",
            EventEffect::PovertyAid => "Imperial Aid",
            EventEffect::EstateSeizure => "Estate Seizure",
            EventEffect::PoliticalOpportunity => "Political Opportunity",
            EventEffect::MarriageProposal => "Advantageous Marriage Proposal",
            EventEffect::SuccessionCrisis => "Succession Crisis",
            EventEffect::DiplomaticTriumph => "Diplomatic Triumph",
        }
    }

    pub fn category(&self) -> EventCategory {
        use EventEffect::*;
        match self {
            Plague | BarbarianInvasion | EconomicBoom | Famine | MilitaryTriumph | SenateCrisis | GrandFestival
            | TaxRevolt => EventCategory::EmpireWide,
            _ => EventCategory::Targeted,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EventEffect::Plague => "All families lose 3 popular support and suffer -25% income for 2 turns.",
            EventEffect::BarbarianInvasion => "Barbarians breach the frontier: military strength -30.",
            EventEffect::EconomicBoom => "Every family receives 1.5 gold per estate owned.",
            EventEffect::Famine => "All estate income reduced by 40% for 3 turns.",
            EventEffect::MilitaryTriumph => "Military strength +25 and every family +1 popular support.",
            EventEffect::SenateCrisis => "Every family loses 2 auctoritas.",
            EventEffect::GrandFestival => "Every family gains 2 popular support and 1 auctoritas.",
            EventEffect::TaxRevolt => "Provincial unrest lowers the tax rate by 20 points.",
            EventEffect::VirtuousReward => "The most virtuous family receives 15 gold and 2 popular support.",
            EventEffect::PopularReward => "The most popular family is granted a provincial estate, or 10 gold.",
            EventEffect::VirtuousPunishment => "The least virtuous family loses 10 gold and 3 popular support.",
            EventEffect::PopularPunishment => "The least popular family loses an estate, or 3 auctoritas.",
            EventEffect::WealthTaxation => "The wealthiest family pays 30% of its gold and loses 1 auctoritas.",
            EventEffect::PovertyAid => "The poorest family receives 12 gold and 1 popular support.",
            EventEffect::EstateSeizure => "The family with the most estates loses 2 of them if it holds more than 5, else pays 8 gold.",
            EventEffect::PoliticalOpportunity => "The most influential family gains 3 auctoritas and 8 gold.",
            EventEffect::MarriageProposal => "An unmarried paterfamilias gains 2 auctoritas and 2 popular support; otherwise a random family gains 5 gold.",
            EventEffect::SuccessionCrisis => "The family with the most children loses 2 auctoritas and suffers -20% income for 2 turns.",
            EventEffect::DiplomaticTriumph => "The most virtuous non-emperor gains 12 gold, 2 auctoritas and 1 popular support.",
        }
    }
}

/// Run one event against the whole game
pub fn execute<R: Rng + ?Sized>(state: &mut GameState, effect: EventEffect, rng: &mut R) -> Result<()> {
    match effect {
        EventEffect::Plague => {
            for player in state.players.iter_mut() {
                player.lose_popular_support(3);
                player.effects.push(Effect::timed(EffectKind::IncomeModifier(-0.25), 2, "Plague"));
            }
        }
        EventEffect::BarbarianInvasion => {
            state.military_strength = state.military_strength.saturating_sub(30);
        }
        EventEffect::EconomicBoom => {
            let mut lines = Vec::with_capacity(state.players.len());
            for player in state.players.iter_mut() {
                let bonus = (player.estates.len() as u32 * 3) / 2;
                player.gold += bonus;
                lines.push(format!("{} receives {} gold from the boom", player.name, bonus));
            }
            for line in lines {
                state.log(line);
            }
        }
        EventEffect::Famine => {
            for player in state.players.iter_mut() {
                player.effects.push(Effect::timed(EffectKind::IncomeModifier(-0.40), 3, "Famine"));
            }
        }
        EventEffect::MilitaryTriumph => {
            state.military_strength += 25;
            for player in state.players.iter_mut() {
                player.popular_support += 1;
            }
        }
        EventEffect::SenateCrisis => {
            for player in state.players.iter_mut() {
                player.lose_auctoritas(2);
            }
        }
        EventEffect::GrandFestival => {
            for player in state.players.iter_mut() {
                player.popular_support += 2;
                player.auctoritas += 1;
            }
        }
        EventEffect::TaxRevolt => {
            let (old, new) = lower_tax_rate(state, 2);
            state.log(format!(
                "Tax revolt: rate reduced from {:.0}% to {:.0}%",
                old * 100.0,
                new * 100.0
            ));
        }
        EventEffect::VirtuousReward => {
            if let Some(id) = most(&state.players, |p| p.auctoritas as i64) {
                let player = state.player_mut(id)?;
                player.gold += 15;
                player.popular_support += 2;
                let name = player.name.clone();
                state.log(format!("{} (most virtuous) receives 15 gold and 2 popular support", name));
            }
        }
        EventEffect::PopularReward => {
            if let Some(id) = most(&state.players, |p| p.popular_support as i64) {
                popular_acclaim(state, id, rng)?;
            }
        }
        EventEffect::VirtuousPunishment => {
            if let Some(id) = least(&state.players, |p| p.auctoritas as i64) {
                let player = state.player_mut(id)?;
                player.lose_gold(10);
                player.lose_popular_support(3);
                let name = player.name.clone();
                state.log(format!("Scandal: {} (least virtuous) loses 10 gold and 3 popular support", name));
            }
        }
        EventEffect::PopularPunishment => {
            if let Some(id) = least(&state.players, |p| p.popular_support as i64) {
                let player = state.player(id)?;
                let name = player.name.clone();
                match player.estates.last().copied() {
                    Some(estate) => {
                        state.transfer_estate(estate, None)?;
                        state.log(format!("Mob fury: {} (least popular) loses an estate", name));
                    }
                    None => {
                        state.player_mut(id)?.lose_auctoritas(3);
                        state.log(format!("Mob fury: {} (least popular) loses 3 auctoritas", name));
                    }
                }
            }
        }
        EventEffect::WealthTaxation => {
            if let Some(id) = most(&state.players, |p| p.gold as i64) {
                let player = state.player_mut(id)?;
                let levy = player.gold * 3 / 10;
                player.lose_gold(levy);
                player.lose_auctoritas(1);
                let name = player.name.clone();
                state.log(format!("{} (wealthiest) pays {} gold and loses 1 auctoritas", name, levy));
            }
        }
        EventEffect::PovertyAid => {
            if let Some(id) = least(&state.players, |p| p.gold as i64) {
                let player = state.player_mut(id)?;
                player.gold += 12;
                player.popular_support += 1;
                let name = player.name.clone();
                state.log(format!("{} (poorest) receives 12 gold and 1 popular support", name));
            }
        }
        EventEffect::EstateSeizure => {
            if let Some(id) = most(&state.players, |p| p.estates.len() as i64) {
                let player = state.player(id)?;
                let name = player.name.clone();
                if player.estates.len() > 5 {
                    let seized: Vec<EstateId> = player.estates.iter().take(2).copied().collect();
                    for estate in seized {
                        state.transfer_estate(estate, None)?;
                    }
                    state.log(format!("Estate seizure: {} loses 2 estates", name));
                } else {
                    state.player_mut(id)?.lose_gold(8);
                    state.log(format!("Estate seizure: {} pays 8 gold instead", name));
                }
            }
        }
        EventEffect::PoliticalOpportunity => {
            if let Some(id) = most(&state.players, |p| (p.auctoritas + p.popular_support) as i64) {
                let player = state.player_mut(id)?;
                player.auctoritas += 3;
                player.gold += 8;
                let name = player.name.clone();
                state.log(format!("{} (most influential) gains 3 auctoritas and 8 gold", name));
            }
        }
        EventEffect::MarriageProposal => {
            let unmarried: Vec<PlayerId> = state.players.iter().filter(|p| !p.is_married()).map(|p| p.id).collect();
            if let Some(&lucky) = unmarried.choose(rng) {
                let player = state.player_mut(lucky)?;
                player.auctoritas += 2;
                player.popular_support += 2;
                let name = player.name.clone();
                state.log(format!("{} gains 2 auctoritas and 2 popular support from a marriage offer", name));
            } else if let Some(lucky) = state.player_ids().choose(rng).copied() {
                let player = state.player_mut(lucky)?;
                player.gold += 5;
                let name = player.name.clone();
                state.log(format!("No unmarried families; {} receives 5 gold", name));
            }
        }
        EventEffect::SuccessionCrisis => {
            if let Some(id) = most(&state.players, |p| p.children.len() as i64) {
                let player = state.player_mut(id)?;
                player.lose_auctoritas(2);
                player
                    .effects
                    .push(Effect::timed(EffectKind::IncomeModifier(-0.20), 2, "Succession Crisis"));
                let name = player.name.clone();
                state.log(format!("{} loses 2 auctoritas and suffers -20% income for 2 turns", name));
            }
        }
        EventEffect::DiplomaticTriumph => {
            let emperor = state.emperor;
            let candidates = state.players.iter().filter(|p| Some(p.id) != emperor);
            match most(candidates, |p| p.auctoritas as i64) {
                Some(id) => {
                    let player = state.player_mut(id)?;
                    player.gold += 12;
                    player.auctoritas += 2;
                    player.popular_support += 1;
                    let name = player.name.clone();
                    state.log(format!("{} gains 12 gold, 2 auctoritas and 1 popular support", name));
                }
                None => state.log("Diplomatic triumph has no effect"),
            }
        }
    }
    Ok(())
}

/// Grant an unowned estate in a random non-capital conquered province,
/// or 10 gold when none is available
fn popular_acclaim<R: Rng + ?Sized>(state: &mut GameState, id: PlayerId, rng: &mut R) -> Result<()> {
    let name = state.player_name(id)?;
    let provinces: Vec<_> = state
        .provinces
        .iter()
        .filter(|p| p.conquered && !p.is_capital())
        .filter_map(|p| p.unowned_estates().next().map(|e| (e.id, p.name.clone())))
        .collect();

    match provinces.choose(rng).cloned() {
        Some((estate, province)) => {
            state.transfer_estate(estate, Some(id))?;
            state.log(format!("Popular acclaim: {} (most popular) is granted an estate in {}", name, province));
        }
        None => {
            state.player_mut(id)?.gold += 10;
            state.log(format!("Popular acclaim: {} (most popular) receives 10 gold", name));
        }
    }
    Ok(())
}
