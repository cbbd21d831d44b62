//! The 25 action cards and their effect procedures
//!
//! `rejection` runs every check a card needs before anything is paid, so a
//! card that cannot take effect is refused without touching state.
//! `resolve` then applies the effect unconditionally.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actions::marriage::dissolve_marriage;
use crate::cards::CardCategory;
use crate::core::error::Result;
use crate::core::types::{Cost, Gender, PlayerId, ProvinceId};
use crate::entity::effects::{Effect, EffectKind};
use crate::state::GameState;
use crate::succession::family::handle_death;

const RAID_FAILURE_GOLD: u32 = 5;
const SABOTAGE_FAILURE_CHANCE: f64 = 0.30;
const LEGION_SUPPORT: u32 = 2;
const LEGION_STRENGTH: u32 = 15;
const LEGION_BOOST: f64 = 0.10;
const LEGION_TURNS: u32 = 3;
const MERCENARY_BONUS: f64 = 0.15;
const MERCENARY_TURNS: u32 = 2;
const TRIBUNE_TURNS: u32 = 3;
const ASSASSINATION_CHANCE: f64 = 0.5;
const BLACKMAIL_GOLD: u32 = 8;
const DEBT_PAYMENT: u32 = 6;
const DEVELOPED_ESTATES: usize = 3;
const MONOPOLY_TURNS: u32 = 4;
const TAX_FARM_SHARE: f64 = 0.50;
const VENUS_BOOST: f64 = 0.30;
const VENUS_TURNS: u32 = 2;
const MARS_SUPPORT: u32 = 3;
const MARS_STRENGTH: u32 = 8;
const DIVINE_FAVOR_MULTIPLIER: f64 = 2.0;
const DIVINE_FAVOR_TURNS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardEffect {
    // Military
    LaunchRaid,
    SabotageCampaign,
    RaiseLegion,
    HireMercenaries,
    MilitaryTribune,
    // Political
    BribeSenator,
    DenounceRival,
    PoliticalAlliance,
    CensorsReport,
    SenateMotion,
    // Intrigue
    SpreadRumors,
    Assassinate,
    Blackmail,
    Poison,
    ForgeAlliance,
    // Economic
    TradeMonopoly,
    DebtCollection,
    EstateDevelopment,
    GrainDole,
    TaxFarm,
    // Religious
    SacrificeToVenus,
    SacrificeToMars,
    DivineFavor,
    OraclesWarning,
    ReligiousFestival,
}

impl CardEffect {
    pub const ALL: [CardEffect; 25] = [
        CardEffect::LaunchRaid,
        CardEffect::SabotageCampaign,
        CardEffect::RaiseLegion,
        CardEffect::HireMercenaries,
        CardEffect::MilitaryTribune,
        CardEffect::BribeSenator,
        CardEffect::DenounceRival,
        CardEffect::PoliticalAlliance,
        CardEffect::CensorsReport,
        CardEffect::SenateMotion,
        CardEffect::SpreadRumors,
        CardEffect::Assassinate,
        CardEffect::Blackmail,
        CardEffect::Poison,
        CardEffect::ForgeAlliance,
        CardEffect::TradeMonopoly,
        CardEffect::DebtCollection,
        CardEffect::EstateDevelopment,
        CardEffect::GrainDole,
        CardEffect::TaxFarm,
        CardEffect::SacrificeToVenus,
        CardEffect::SacrificeToMars,
        CardEffect::DivineFavor,
        CardEffect::OraclesWarning,
        CardEffect::ReligiousFestival,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CardEffect::LaunchRaid => "Launch Raid",
            CardEffect::SabotageCampaign => "Sabotage Campaign",
            CardEffect::RaiseLegion => "Raise Legion",
            CardEffect::HireMercenaries => "Hire Mercenaries",
            CardEffect::MilitaryTribune => "Military Tribune",
            CardEffect::BribeSenator => "Bribe Senator",
            CardEffect::DenounceRival => "Denounce Rival",
            CardEffect::PoliticalAlliance => "Political Alliance",
            CardEffect::CensorsReport => "Censor's Report",
            CardEffect::SenateMotion => "Senate Motion",
            CardEffect::SpreadRumors => "Spread Rumors",
            CardEffect::Assassinate => "Assassinate",
            CardEffect::Blackmail => "Blackmail",
            CardEffect::Poison => "Poison",
            CardEffect::ForgeAlliance => "Forge Alliance",
            CardEffect::TradeMonopoly => "Trade Monopoly",
            CardEffect::DebtCollection => "Debt Collection",
            CardEffect::EstateDevelopment => "Estate Development",
            CardEffect::GrainDole => "Grain Dole",
            CardEffect::TaxFarm => "Tax Farm",
            CardEffect::SacrificeToVenus => "Sacrifice to Venus",
            CardEffect::SacrificeToMars => "Sacrifice to Mars",
            CardEffect::DivineFavor => "Divine Favor",
            CardEffect::OraclesWarning => "Oracle's Warning",
            CardEffect::ReligiousFestival => "Religious Festival",
        }
    }

    pub fn category(&self) -> CardCategory {
        use CardEffect::*;
        match self {
            LaunchRaid | SabotageCampaign | RaiseLegion | HireMercenaries | MilitaryTribune => CardCategory::Military,
            BribeSenator | DenounceRival | PoliticalAlliance | CensorsReport | SenateMotion => CardCategory::Political,
            SpreadRumors | Assassinate | Blackmail | Poison | ForgeAlliance => CardCategory::Intrigue,
            TradeMonopoly | DebtCollection | EstateDevelopment | GrainDole | TaxFarm => CardCategory::Economic,
            SacrificeToVenus | SacrificeToMars | DivineFavor | OraclesWarning | ReligiousFestival => {
                CardCategory::Religious
            }
        }
    }

    pub fn cost(&self) -> Cost {
        match self {
            CardEffect::LaunchRaid => Cost::gold(8),
            CardEffect::SabotageCampaign => Cost::gold(6),
            CardEffect::RaiseLegion => Cost::gold(10),
            CardEffect::HireMercenaries => Cost::gold(7),
            CardEffect::MilitaryTribune => Cost::gold(5),
            CardEffect::BribeSenator => Cost::gold(8),
            CardEffect::DenounceRival => Cost::gold(4),
            CardEffect::PoliticalAlliance => Cost::gold(5),
            CardEffect::CensorsReport => Cost::gold(7),
            CardEffect::SenateMotion => Cost::new(6, 2, 0),
            CardEffect::SpreadRumors => Cost::gold(6),
            CardEffect::Assassinate => Cost::new(12, 0, 5),
            CardEffect::Blackmail => Cost::gold(5),
            CardEffect::Poison => Cost::gold(8),
            CardEffect::ForgeAlliance => Cost::gold(4),
            CardEffect::TradeMonopoly => Cost::gold(10),
            CardEffect::DebtCollection => Cost::gold(3),
            CardEffect::EstateDevelopment => Cost::gold(8),
            CardEffect::GrainDole => Cost::gold(6),
            CardEffect::TaxFarm => Cost::gold(7),
            CardEffect::SacrificeToVenus => Cost::gold(5),
            CardEffect::SacrificeToMars => Cost::gold(6),
            CardEffect::DivineFavor => Cost::gold(4),
            CardEffect::OraclesWarning => Cost::gold(5),
            CardEffect::ReligiousFestival => Cost::gold(7),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CardEffect::LaunchRaid => "Steal an estate from a rival whose purse is no deeper than yours; otherwise lose 5 gold.",
            CardEffect::SabotageCampaign => "A rival's next military campaign has +30% failure chance.",
            CardEffect::RaiseLegion => "+2 Popular Support and +15 military strength; all campaigns more likely to succeed for 3 turns.",
            CardEffect::HireMercenaries => "+15% raid strength for your family for 2 turns.",
            CardEffect::MilitaryTribune => "+1 Auctoritas and +1 Popular Support per turn for 3 turns.",
            CardEffect::BribeSenator => "+3 Auctoritas; an optional rival loses 1 Auctoritas.",
            CardEffect::DenounceRival => "Rival loses 2 Auctoritas, unless they outrank you: then you lose 1.",
            CardEffect::PoliticalAlliance => "You and a rival each gain +1 Auctoritas per turn while allied.",
            CardEffect::CensorsReport => "Reveal every family's resources and gain +2 Auctoritas.",
            CardEffect::SenateMotion => "Bring a motion before the Senate: +1 Auctoritas.",
            CardEffect::SpreadRumors => "Force a rival's divorce; they suffer unmarried penalties until remarriage.",
            CardEffect::Assassinate => "50% chance to kill a rival paterfamilias; failure costs 5 Auctoritas and 10 Popular Support.",
            CardEffect::Blackmail => "Requires more Auctoritas than the rival: take 8 gold, else an estate, else 3 of their Auctoritas.",
            CardEffect::Poison => "A rival paterfamilias ages an extra turn on their next turn.",
            CardEffect::ForgeAlliance => "Marry your daughter to a rival's son: +1 Auctoritas for you, +1 Popular Support for them.",
            CardEffect::TradeMonopoly => "+1 gold per estate of the capital province each turn for 4 turns.",
            CardEffect::DebtCollection => "A family that owes you tribute pays you 6 gold.",
            CardEffect::EstateDevelopment => "Up to 3 of your estates permanently yield +1 gold.",
            CardEffect::GrainDole => "+3 Popular Support; every other family gains +1.",
            CardEffect::TaxFarm => "Recover 50% of the next tax you pay.",
            CardEffect::SacrificeToVenus => "+30% birth chance for 2 turns; children born under it gain an extra trait.",
            CardEffect::SacrificeToMars => "+3 Popular Support and +8 military strength.",
            CardEffect::DivineFavor => "Traits are doubly effective for 3 turns.",
            CardEffect::OraclesWarning => "A rival cannot play cards during their next turn.",
            CardEffect::ReligiousFestival => "+2 Popular Support, +1 Auctoritas; families tied to yours by marriage gain +1 Popular Support.",
        }
    }

    /// Whether the card must name another player
    pub fn requires_target(&self) -> bool {
        matches!(
            self,
            CardEffect::LaunchRaid
                | CardEffect::SabotageCampaign
                | CardEffect::DenounceRival
                | CardEffect::PoliticalAlliance
                | CardEffect::SpreadRumors
                | CardEffect::Assassinate
                | CardEffect::Blackmail
                | CardEffect::Poison
                | CardEffect::ForgeAlliance
                | CardEffect::DebtCollection
                | CardEffect::OraclesWarning
        )
    }

    /// Whether a target may be named at all
    pub fn accepts_target(&self) -> bool {
        self.requires_target() || matches!(self, CardEffect::BribeSenator)
    }
}

/// Reason the card cannot be played right now, if any.
///
/// Unknown actor or target ids are errors, not rejections.
pub fn rejection(
    state: &GameState,
    actor: PlayerId,
    target: Option<PlayerId>,
    effect: CardEffect,
) -> Result<Option<String>> {
    let player = state.player(actor)?;

    let target = match target {
        Some(t) if !effect.accepts_target() => {
            state.player(t)?;
            return Ok(Some(format!("{} does not take a target", effect.name())));
        }
        Some(t) if t == actor => return Ok(Some(format!("{} cannot target your own family", effect.name()))),
        Some(t) => Some(state.player(t)?),
        None if effect.requires_target() => return Ok(Some(format!("{} requires a target", effect.name()))),
        None => None,
    };

    let reason = match (effect, target) {
        (CardEffect::LaunchRaid, Some(t)) if t.estates.is_empty() => {
            Some(format!("{} has no estates to raid", t.name))
        }
        (CardEffect::PoliticalAlliance, Some(t)) if allied(state, actor, t.id)? => {
            Some(format!("{} is already allied with {}", player.name, t.name))
        }
        (CardEffect::SpreadRumors, Some(t)) if !t.is_married() => Some(format!("{} has no wife", t.name)),
        (CardEffect::Blackmail, Some(t)) if player.auctoritas <= t.auctoritas => {
            Some(format!("{} lacks the Auctoritas to blackmail {}", player.name, t.name))
        }
        (CardEffect::ForgeAlliance, Some(t)) => {
            let min_age = state.config.minimum_marriage_age;
            let has_daughter = player.eligible_children(Gender::Female, min_age).next().is_some();
            let has_son = t.eligible_children(Gender::Male, min_age).next().is_some();
            (!has_daughter || !has_son).then(|| "no eligible children for a marriage alliance".to_string())
        }
        (CardEffect::DebtCollection, Some(t)) if !t.owes_tribute_to(actor) => {
            Some(format!("{} owes no tribute to {}", t.name, player.name))
        }
        (CardEffect::TradeMonopoly, _) if state.provinces.is_empty() => Some("there is no province to monopolise".into()),
        _ => None,
    };
    Ok(reason)
}

fn allied(state: &GameState, actor: PlayerId, other: PlayerId) -> Result<bool> {
    Ok(state
        .player(actor)?
        .effects
        .has(|k| matches!(k, EffectKind::Alliance { with, .. } if *with == other)))
}

fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}

/// Apply a card's effect. Callers run `rejection` first.
pub fn resolve<R: Rng + ?Sized>(
    state: &mut GameState,
    actor: PlayerId,
    target: Option<PlayerId>,
    effect: CardEffect,
    rng: &mut R,
) -> Result<()> {
    let actor_name = state.player_name(actor)?;

    match effect {
        CardEffect::LaunchRaid => {
            let Some(target) = target else { return Ok(()) };
            let raider = state.player(actor)?;
            let strength = (raider.gold as f64 * (1.0 + raider.effects.mercenaries())).floor() as u32;
            let victim = state.player(target)?;
            let target_name = victim.name.clone();
            if strength >= victim.gold {
                if let Some(&estate) = victim.estates.first() {
                    state.transfer_estate(estate, Some(actor))?;
                    state.log(format!("{} raided {} and seized an estate", actor_name, target_name));
                }
            } else {
                state.player_mut(actor)?.lose_gold(RAID_FAILURE_GOLD);
                state.log(format!(
                    "{}'s raid on {} failed; lost {} gold",
                    actor_name, target_name, RAID_FAILURE_GOLD
                ));
            }
        }
        CardEffect::SabotageCampaign => {
            let Some(target) = target else { return Ok(()) };
            let victim = state.player_mut(target)?;
            victim.effects.push(Effect::permanent(
                EffectKind::CampaignSabotage(SABOTAGE_FAILURE_CHANCE),
                "Sabotaged Campaign",
            ));
            let target_name = victim.name.clone();
            state.log(format!("{} sabotaged {}'s next campaign", actor_name, target_name));
        }
        CardEffect::RaiseLegion => {
            state.player_mut(actor)?.popular_support += LEGION_SUPPORT;
            state.military_strength += LEGION_STRENGTH;
            for player in state.players.iter_mut() {
                player.effects.push(Effect::timed(
                    EffectKind::RomeMilitaryBoost(LEGION_BOOST),
                    LEGION_TURNS,
                    "Raised Legion",
                ));
            }
            state.log(format!("{} raised a legion (+{} military strength)", actor_name, LEGION_STRENGTH));
        }
        CardEffect::HireMercenaries => {
            state.player_mut(actor)?.effects.push(Effect::timed(
                EffectKind::Mercenaries(MERCENARY_BONUS),
                MERCENARY_TURNS,
                "Hired Mercenaries",
            ));
            state.log(format!("{} hired mercenaries", actor_name));
        }
        CardEffect::MilitaryTribune => {
            state.player_mut(actor)?.effects.push(Effect::timed(
                EffectKind::PerTurnBonus { auctoritas: 1, popular_support: 1 },
                TRIBUNE_TURNS,
                "Military Tribune",
            ));
            state.log(format!("{} appointed a son as Military Tribune", actor_name));
        }
        CardEffect::BribeSenator => {
            state.player_mut(actor)?.auctoritas += 3;
            match target {
                Some(target) => {
                    let victim = state.player_mut(target)?;
                    victim.lose_auctoritas(1);
                    let target_name = victim.name.clone();
                    state.log(format!("{} bribed senators at {}'s expense", actor_name, target_name));
                }
                None => state.log(format!("{} bribed senators (+3 Auctoritas)", actor_name)),
            }
        }
        CardEffect::DenounceRival => {
            let Some(target) = target else { return Ok(()) };
            let own = state.player(actor)?.auctoritas;
            let victim = state.player_mut(target)?;
            let target_name = victim.name.clone();
            if victim.auctoritas > own {
                state.player_mut(actor)?.lose_auctoritas(1);
                state.log(format!("{}'s denunciation of {} backfired", actor_name, target_name));
            } else {
                victim.lose_auctoritas(2);
                state.log(format!("{} denounced {} (-2 Auctoritas)", actor_name, target_name));
            }
        }
        CardEffect::PoliticalAlliance => {
            let Some(target) = target else { return Ok(()) };
            let target_name = state.player_name(target)?;
            state.player_mut(actor)?.effects.push(Effect::permanent(
                EffectKind::Alliance { with: target, auctoritas: 1 },
                format!("Alliance with {}", target_name),
            ));
            state.player_mut(target)?.effects.push(Effect::permanent(
                EffectKind::Alliance { with: actor, auctoritas: 1 },
                format!("Alliance with {}", actor_name),
            ));
            state.log(format!("{} and {} formed a political alliance", actor_name, target_name));
        }
        CardEffect::CensorsReport => {
            state.player_mut(actor)?.auctoritas += 2;
            let report: Vec<String> = state
                .players
                .iter()
                .map(|p| format!("{}: {} gold, {} support, {} auctoritas", p.name, p.gold, p.popular_support, p.auctoritas))
                .collect();
            state.log(format!("{}'s census: {}", actor_name, report.join("; ")));
        }
        CardEffect::SenateMotion => {
            state.player_mut(actor)?.auctoritas += 1;
            state.log(format!("{} brought a motion before the Senate", actor_name));
        }
        CardEffect::SpreadRumors => {
            let Some(target) = target else { return Ok(()) };
            let victim = state.player_mut(target)?;
            dissolve_marriage(victim);
            let target_name = victim.name.clone();
            state.log(format!("{} spread rumours; {} is now divorced", actor_name, target_name));
        }
        CardEffect::Assassinate => {
            let Some(target) = target else { return Ok(()) };
            let victim_name = state.player(target)?.paterfamilias.name.clone();
            if chance(rng, ASSASSINATION_CHANCE) {
                tracing::info!(actor = %actor, target = %target, "Assassination succeeded");
                state.log(format!("{} assassinated {}", actor_name, victim_name));
                handle_death(state, target, rng)?;
            } else {
                let plotter = state.player_mut(actor)?;
                plotter.lose_auctoritas(5);
                plotter.lose_popular_support(10);
                state.log(format!("{}'s attempt on {} failed and was exposed", actor_name, victim_name));
            }
        }
        CardEffect::Blackmail => {
            let Some(target) = target else { return Ok(()) };
            let victim = state.player(target)?;
            let target_name = victim.name.clone();
            if victim.gold >= BLACKMAIL_GOLD {
                state.player_mut(target)?.lose_gold(BLACKMAIL_GOLD);
                state.player_mut(actor)?.gold += BLACKMAIL_GOLD;
                state.log(format!("{} blackmailed {} for {} gold", actor_name, target_name, BLACKMAIL_GOLD));
            } else if let Some(&estate) = victim.estates.first() {
                state.transfer_estate(estate, Some(actor))?;
                state.log(format!("{} blackmailed {} out of an estate", actor_name, target_name));
            } else {
                state.player_mut(target)?.lose_auctoritas(3);
                state.log(format!("{} blackmailed {} (-3 Auctoritas)", actor_name, target_name));
            }
        }
        CardEffect::Poison => {
            let Some(target) = target else { return Ok(()) };
            let victim = state.player_mut(target)?;
            victim.effects.push(Effect::timed(EffectKind::AcceleratedAging(1), 1, "Poisoned"));
            let victim_name = victim.paterfamilias.name.clone();
            state.log(format!("{} poisoned {}", actor_name, victim_name));
        }
        CardEffect::ForgeAlliance => {
            let Some(target) = target else { return Ok(()) };
            let min_age = state.config.minimum_marriage_age;
            let player = state.player_mut(actor)?;
            let Some(index) = player
                .children
                .iter()
                .position(|c| c.gender == Gender::Female && c.age >= min_age)
            else {
                return Ok(());
            };
            let daughter = player.children.remove(index);
            player.auctoritas += 1;
            let ally = state.player_mut(target)?;
            ally.popular_support += 1;
            let target_name = ally.name.clone();
            state.log(format!(
                "{} married {} into the {} family",
                actor_name, daughter.name, target_name
            ));
        }
        CardEffect::TradeMonopoly => {
            let Some(capital) = state.provinces.iter().find(|p| p.id == ProvinceId(0)).or(state.provinces.first())
            else {
                return Ok(());
            };
            let (province, bonus, province_name) = (capital.id, capital.estates.len() as u32, capital.name.clone());
            state.player_mut(actor)?.effects.push(Effect::timed(
                EffectKind::TradeMonopoly { province, bonus },
                MONOPOLY_TURNS,
                format!("Trade Monopoly: {}", province_name),
            ));
            state.log(format!("{} established a trade monopoly in {}", actor_name, province_name));
        }
        CardEffect::DebtCollection => {
            let Some(target) = target else { return Ok(()) };
            let debtor = state.player_mut(target)?;
            let paid = debtor.lose_gold(DEBT_PAYMENT);
            let target_name = debtor.name.clone();
            state.player_mut(actor)?.gold += paid;
            state.log(format!("{} collected {} gold from {}", actor_name, paid, target_name));
        }
        CardEffect::EstateDevelopment => {
            let improvement = state.config.estate_yield_improvement;
            let estates: Vec<_> = state.player(actor)?.estates.iter().take(DEVELOPED_ESTATES).copied().collect();
            for estate in &estates {
                state.estate_mut(*estate)?.yield_gold += improvement;
            }
            state.log(format!("{} developed {} estates", actor_name, estates.len()));
        }
        CardEffect::GrainDole => {
            for player in state.players.iter_mut() {
                player.popular_support += if player.id == actor { 3 } else { 1 };
            }
            state.log(format!("{} distributed grain to the people", actor_name));
        }
        CardEffect::TaxFarm => {
            state
                .player_mut(actor)?
                .effects
                .push(Effect::permanent(EffectKind::TaxRefund(TAX_FARM_SHARE), "Tax Farm"));
            state.log(format!("{} set up a tax farm", actor_name));
        }
        CardEffect::SacrificeToVenus => {
            state.player_mut(actor)?.effects.push(Effect::timed(
                EffectKind::FertilityBoost(VENUS_BOOST),
                VENUS_TURNS,
                "Sacrifice to Venus",
            ));
            state.log(format!("{} sacrificed to Venus", actor_name));
        }
        CardEffect::SacrificeToMars => {
            state.player_mut(actor)?.popular_support += MARS_SUPPORT;
            state.military_strength += MARS_STRENGTH;
            state.log(format!("{} sacrificed to Mars", actor_name));
        }
        CardEffect::DivineFavor => {
            state.player_mut(actor)?.effects.push(Effect::timed(
                EffectKind::DivineFavor(DIVINE_FAVOR_MULTIPLIER),
                DIVINE_FAVOR_TURNS,
                "Divine Favor",
            ));
            state.log(format!("{} gained divine favor", actor_name));
        }
        CardEffect::OraclesWarning => {
            let Some(target) = target else { return Ok(()) };
            let victim = state.player_mut(target)?;
            victim.effects.push(Effect::timed(EffectKind::OracleWard, 1, "Oracle's Warning"));
            let target_name = victim.name.clone();
            state.log(format!("{} invoked the Oracle against {}", actor_name, target_name));
        }
        CardEffect::ReligiousFestival => {
            let host = state.player_mut(actor)?;
            host.popular_support += 2;
            host.auctoritas += 1;
            let connected: Vec<PlayerId> = host
                .wife
                .iter()
                .chain(host.mother.iter())
                .map(|k| k.origin_family)
                .collect();
            for family in connected {
                state.player_mut(family)?.popular_support += 1;
            }
            state.log(format!("{} held a religious festival", actor_name));
        }
    }
    Ok(())
}
