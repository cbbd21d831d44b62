//! Family life: children, births, deaths and heirs

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::error::Result;
use crate::core::types::{Gender, PlayerId, Trait};
use crate::entity::effects::{Effect, EffectKind};
use crate::entity::player::{Child, Paterfamilias};
use crate::state::GameState;
use crate::succession::imperial::trigger_succession;

fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}

pub(crate) fn random_name<R: Rng + ?Sized>(pool: &[String], rng: &mut R, fallback: &str) -> String {
    pool.choose(rng).cloned().unwrap_or_else(|| fallback.to_string())
}

pub(crate) fn random_traits<R: Rng + ?Sized>(gender: Gender, count: usize, rng: &mut R) -> Vec<Trait> {
    Trait::pool(gender).choose_multiple(rng, count).copied().collect()
}

/// Chance of a birth this turn; zero while unmarried
pub fn birth_chance(state: &GameState, id: PlayerId) -> Result<f64> {
    let player = state.player(id)?;
    let Some(wife) = &player.wife else {
        return Ok(0.0);
    };
    let mut chance = state.config.base_fertility_chance + player.effects.fertility_boost();
    if wife.traits.contains(&Trait::Fertile) {
        chance += state.config.fertile_bonus_chance;
    }
    Ok(chance)
}

/// End-of-turn aging: every child grows a turn older, then maybe a birth.
///
/// Returns whether a child was born.
pub fn age_family<R: Rng + ?Sized>(state: &mut GameState, id: PlayerId, rng: &mut R) -> Result<bool> {
    for child in state.player_mut(id)?.children.iter_mut() {
        child.age += 1;
    }

    let probability = birth_chance(state, id)?;
    if probability > 0.0 && chance(rng, probability) {
        add_child(state, id, rng)?;
        return Ok(true);
    }
    Ok(false)
}

/// A newborn with one trait from its gender's pool, sometimes two. Children
/// born under a fertility blessing get one more.
pub fn add_child<R: Rng + ?Sized>(state: &mut GameState, id: PlayerId, rng: &mut R) -> Result<()> {
    let gender = if rng.gen_bool(0.5) { Gender::Male } else { Gender::Female };
    let names = match gender {
        Gender::Male => &state.config.male_names,
        Gender::Female => &state.config.female_names,
    };
    let name = random_name(names, rng, "Tertius");

    let mut count = if chance(rng, state.config.child_trait_bonus_chance) { 2 } else { 1 };
    let player = state.player(id)?;
    if player.effects.has(|k| matches!(k, EffectKind::FertilityBoost(_))) {
        count += 1;
    }
    let traits = random_traits(gender, count, rng);

    let player = state.player_mut(id)?;
    player.children.push(Child { name: name.clone(), age: 0, gender, traits });
    let family = player.name.clone();
    let label = match gender {
        Gender::Male => "son",
        Gender::Female => "daughter",
    };
    state.log(format!("{}: a {}, {}, is born!", family, label, name));
    Ok(())
}

/// Natural death roll once the paterfamilias has served the maximum turns
pub fn check_death<R: Rng + ?Sized>(state: &GameState, id: PlayerId, rng: &mut R) -> Result<bool> {
    let player = state.player(id)?;
    if player.paterfamilias.turns_in_role < state.config.max_paterfamilias_turns {
        return Ok(false);
    }
    Ok(chance(rng, state.config.death_probability_per_turn))
}

/// Replace a dead paterfamilias.
///
/// The eldest son of marriageable age inherits (first-born among equals) and
/// leaves the children list. Without one, a distant relative takes over and
/// the family pays the succession crisis penalty. If the dead man was
/// emperor, imperial succession follows immediately.
pub fn handle_death<R: Rng + ?Sized>(state: &mut GameState, id: PlayerId, rng: &mut R) -> Result<()> {
    let min_age = state.config.minimum_marriage_age;
    let penalty = state.config.succession_crisis_penalty.clone();
    let relative_name = random_name(&state.config.male_names, rng, "Marcus");

    let player = state.player_mut(id)?;
    let deceased = player.paterfamilias.name.clone();
    let family = player.name.clone();

    let heir_index = player
        .children
        .iter()
        .enumerate()
        .filter(|(_, c)| c.gender == Gender::Male && c.age >= min_age)
        // max_by_key keeps the last maximum; compare on (age, reversed index)
        .max_by_key(|(i, c)| (c.age, std::cmp::Reverse(*i)))
        .map(|(i, _)| i);

    let message = match heir_index {
        Some(index) => {
            let heir = player.children.remove(index);
            let message = format!("{} becomes the new paterfamilias of {}", heir.name, family);
            player.paterfamilias = Paterfamilias { name: heir.name, turns_in_role: 0, traits: heir.traits };
            message
        }
        None => {
            player.paterfamilias = Paterfamilias { name: relative_name, turns_in_role: 0, traits: Vec::new() };
            player.lose_auctoritas(penalty.auctoritas);
            player.lose_popular_support(penalty.popular_support);
            player.effects.push(Effect::timed(
                EffectKind::IncomeModifier(penalty.income_modifier),
                penalty.duration,
                "Succession Crisis",
            ));
            format!("{} has no eligible heir! A distant relative takes control with penalties", family)
        }
    };

    tracing::info!(player = %id, deceased = %deceased, "Paterfamilias died");
    state.log(format!("{} of {} has died", deceased, family));
    state.log(message);

    if state.is_emperor(id) {
        trigger_succession(state)?;
    }
    Ok(())
}
