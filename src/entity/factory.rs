//! New game construction: families, kin, provinces, estates and decks

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::{action_catalogue, deck, event_catalogue};
use crate::core::config::GameConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::{EstateId, Gender, PlayerId, ProvinceId};
use crate::entity::effects::EffectLedger;
use crate::entity::player::{Estate, Kinswoman, Paterfamilias, Player, Province, TributeRates, TurnFlags};
use crate::state::GameState;
use crate::succession::family::{random_name, random_traits};

const KIN_TRAITS: usize = 2;

impl GameState {
    /// Set up a fresh game for the given family names, in turn order.
    ///
    /// Every family starts with the configured resources, a wife from
    /// another family and a mother from a third where one exists. The
    /// capital is split evenly between families; the decks are shuffled,
    /// hands dealt and the event queue filled.
    pub fn new<R: Rng + ?Sized>(config: GameConfig, names: &[String], rng: &mut R) -> Result<Self> {
        config.validate()?;
        if names.is_empty() {
            return Err(GameError::InvalidConfig("at least one family is required".into()));
        }

        let mut state = GameState::empty(config);
        state.players = names
            .iter()
            .enumerate()
            .map(|(index, name)| new_player(&state.config, PlayerId(index as u32), name, rng))
            .collect();
        assign_kin(&mut state, rng);
        state.provinces = build_provinces(&state.config, names.len());
        grant_starting_estates(&mut state, rng)?;

        state.action_deck = action_catalogue();
        state.action_deck.shuffle(rng);
        let hand_size = state.config.starting_hand_size;
        for id in state.player_ids() {
            deck::draw_cards(&mut state, id, hand_size, rng)?;
        }

        state.event_deck = event_catalogue();
        state.event_deck.shuffle(rng);
        deck::replenish_event_queue(&mut state, rng);

        tracing::info!(players = names.len(), "New game created");
        state.log(format!("Game started with {} players!", names.len()));
        state.log("The Republic begins. Will you rise to become Emperor?");
        Ok(state)
    }
}

fn new_player<R: Rng + ?Sized>(config: &GameConfig, id: PlayerId, name: &str, rng: &mut R) -> Player {
    Player {
        id,
        name: name.to_string(),
        gold: config.starting_gold,
        accumulated_income: 0,
        popular_support: config.starting_popular_support,
        auctoritas: config.starting_auctoritas,
        estates: Vec::new(),
        paterfamilias: Paterfamilias {
            name: random_name(&config.male_names, rng, "Marcus"),
            turns_in_role: 0,
            traits: random_traits(Gender::Male, 1, rng),
        },
        wife: None,
        mother: None,
        children: Vec::new(),
        hand: Vec::new(),
        tribute_rates: TributeRates {
            to_mother: config.default_mother_tribute,
            to_wife: config.default_wife_tribute,
        },
        flags: TurnFlags::default(),
        effects: EffectLedger::new(),
    }
}

fn kinswoman<R: Rng + ?Sized>(config: &GameConfig, family: PlayerId, rng: &mut R) -> Kinswoman {
    Kinswoman {
        name: random_name(&config.female_names, rng, "Julia"),
        origin_family: family,
        traits: random_traits(Gender::Female, KIN_TRAITS, rng),
    }
}

/// Wife from any other family; mother from a family that is neither
fn assign_kin<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    let ids = state.player_ids();
    for index in 0..state.players.len() {
        let own = ids[index];
        let wife_families: Vec<PlayerId> = ids.iter().copied().filter(|f| *f != own).collect();
        let Some(&wife_family) = wife_families.choose(rng) else {
            continue;
        };
        let mother_families: Vec<PlayerId> = wife_families.iter().copied().filter(|f| *f != wife_family).collect();
        let mother_family = mother_families.choose(rng).copied();

        let wife = kinswoman(&state.config, wife_family, rng);
        let mother = mother_family.map(|family| kinswoman(&state.config, family, rng));
        let player = &mut state.players[index];
        player.wife = Some(wife);
        player.mother = mother;
    }
}

/// Provinces in conquest order with sequential estate ids; the capital is
/// sized by player count and counts as conquered on turn 0
fn build_provinces(config: &GameConfig, players: usize) -> Vec<Province> {
    let capital_size = players as u32 * config.starting_estates_per_player;
    let mut next_estate = 0;
    config
        .provinces
        .iter()
        .enumerate()
        .map(|(index, template)| {
            let id = ProvinceId(index as u32);
            let count = template.estate_count.unwrap_or(capital_size);
            let estates = (0..count)
                .map(|_| {
                    let estate = Estate {
                        id: EstateId(next_estate),
                        province: id,
                        owner: None,
                        yield_gold: config.base_estate_yield,
                    };
                    next_estate += 1;
                    estate
                })
                .collect();
            Province {
                id,
                name: template.name.clone(),
                estates,
                conquered: template.conquered,
                conquest_turn: template.conquered.then_some(0),
                founding_year: template.year,
            }
        })
        .collect()
}

/// Shuffle the capital's estates and deal each family its share
fn grant_starting_estates<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Result<()> {
    let per_player = state.config.starting_estates_per_player as usize;
    let capital = state
        .provinces
        .first()
        .ok_or_else(|| GameError::InvalidConfig("no capital province".into()))?;
    let mut estates: Vec<EstateId> = capital.estates.iter().map(|e| e.id).collect();
    estates.shuffle(rng);

    for (id, share) in state.player_ids().into_iter().zip(estates.chunks(per_player.max(1))) {
        for &estate in share {
            state.transfer_estate(estate, Some(id))?;
        }
    }
    Ok(())
}
