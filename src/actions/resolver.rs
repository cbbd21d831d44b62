//! Per-turn player actions: the three paid core actions, card play and
//! discard, and reading the omens.
//!
//! Every function validates fully before mutating. A rejection logs the
//! reason and returns `Ok(false)` (or `Ok(None)`); unknown ids are errors.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::{action_cards, Card, EventCard};
use crate::core::error::Result;
use crate::core::types::{Cost, PlayerId};
use crate::state::{GameState, TurnPhase};

/// Whether `id` may act right now: the game is running and it is their turn
pub(crate) fn ensure_turn(state: &mut GameState, id: PlayerId) -> Result<bool> {
    let name = state.player_name(id)?;
    if state.is_game_over() {
        state.log("The game is over.");
        return Ok(false);
    }
    if state.current_player_id() != Some(id) {
        state.log(format!("It is not {}'s turn!", name));
        return Ok(false);
    }
    Ok(true)
}

/// `ensure_turn` plus the action phase: income collected, turn not ended
pub(crate) fn ensure_action_phase(state: &mut GameState, id: PlayerId) -> Result<bool> {
    if !ensure_turn(state, id)? {
        return Ok(false);
    }
    let name = state.player_name(id)?;
    match state.phase {
        TurnPhase::Actions => Ok(true),
        TurnPhase::Income => {
            state.log(format!("{} must collect income before acting", name));
            Ok(false)
        }
        TurnPhase::Ended => {
            state.log(format!("{} has already ended their turn", name));
            Ok(false)
        }
    }
}

/// Shared gate for the core actions: turn, one action per turn, gold cost
fn ready_for_core_action(state: &mut GameState, id: PlayerId, gold: u32, action: &str) -> Result<bool> {
    if !ensure_action_phase(state, id)? {
        return Ok(false);
    }
    let player = state.player(id)?;
    let name = player.name.clone();
    if player.flags.action_taken {
        state.log(format!("{} has already taken an action this turn!", name));
        return Ok(false);
    }
    if !player.can_afford(&Cost::gold(gold)) {
        state.log(format!("{} cannot afford {} (need {} gold)", name, action, gold));
        return Ok(false);
    }
    Ok(true)
}

pub fn contribute_to_military(state: &mut GameState, id: PlayerId) -> Result<bool> {
    let cost = state.config.military_contribution_cost;
    if !ready_for_core_action(state, id, cost, "to contribute to the military")? {
        return Ok(false);
    }

    let auctoritas = state.config.military_contribution_auctoritas;
    let support = state.config.military_contribution_popular_support;
    let strength = state.config.military_contribution_strength;
    let player = state.player_mut(id)?;
    player.pay(&Cost::gold(cost));
    player.auctoritas += auctoritas;
    player.popular_support += support;
    player.flags.action_taken = true;
    let name = player.name.clone();
    state.military_strength += strength;

    state.log(format!(
        "{} contributed to Rome's military! +{} Auctoritas, +{} Popular Support, +{} Military Strength",
        name, auctoritas, support, strength
    ));
    Ok(true)
}

/// Permanently improve the yield of one randomly chosen owned estate
pub fn economic_development<R: Rng + ?Sized>(state: &mut GameState, id: PlayerId, rng: &mut R) -> Result<bool> {
    let cost = state.config.economic_development_cost;
    if !ready_for_core_action(state, id, cost, "economic development")? {
        return Ok(false);
    }
    let player = state.player(id)?;
    let name = player.name.clone();
    let Some(&estate) = player.estates.choose(rng) else {
        state.log(format!("{} has no estates to develop!", name));
        return Ok(false);
    };

    let improvement = state.config.estate_yield_improvement;
    let player = state.player_mut(id)?;
    player.pay(&Cost::gold(cost));
    player.flags.action_taken = true;
    state.estate_mut(estate)?.yield_gold += improvement;

    state.log(format!(
        "{} developed an estate! Permanent income increased by {}.",
        name, improvement
    ));
    Ok(true)
}

pub fn political_maneuvering(state: &mut GameState, id: PlayerId) -> Result<bool> {
    let cost = state.config.political_maneuvering_cost;
    if !ready_for_core_action(state, id, cost, "political maneuvering")? {
        return Ok(false);
    }

    let auctoritas = state.config.political_maneuvering_auctoritas;
    let player = state.player_mut(id)?;
    player.pay(&Cost::gold(cost));
    player.auctoritas += auctoritas;
    player.flags.action_taken = true;
    let name = player.name.clone();

    state.log(format!("{} engaged in political maneuvering! +{} Auctoritas", name, auctoritas));
    Ok(true)
}

/// Play the card at `index` in the player's hand, once per turn.
///
/// Bounds, cost and the card's own target rules are all checked before the
/// cost is paid. The card ends up on the action discard pile.
pub fn play_card<R: Rng + ?Sized>(
    state: &mut GameState,
    id: PlayerId,
    index: usize,
    target: Option<PlayerId>,
    rng: &mut R,
) -> Result<bool> {
    if !ensure_action_phase(state, id)? {
        return Ok(false);
    }
    let player = state.player(id)?;
    let name = player.name.clone();
    if player.flags.card_played {
        state.log(format!("{} has already played a card this turn!", name));
        return Ok(false);
    }
    if player.effects.card_play_blocked() {
        state.log(format!("{} is bound by an oracle's ward and cannot play cards", name));
        return Ok(false);
    }
    let Some(card) = player.hand.get(index).cloned() else {
        state.log("Invalid card index");
        return Ok(false);
    };
    if !player.can_afford(&card.cost) {
        state.log(format!("{} cannot afford to play {}", name, card.name));
        return Ok(false);
    }
    if let Some(reason) = action_cards::rejection(state, id, target, card.effect)? {
        state.log(format!("{} cannot play {}: {}", name, card.name, reason));
        return Ok(false);
    }

    let player = state.player_mut(id)?;
    player.pay(&card.cost);
    player.hand.remove(index);
    player.flags.card_played = true;

    tracing::debug!(player = %id, card = %card.name, target = ?target, "Card played");
    state.log(format!("{} played {}", name, card.name));
    action_cards::resolve(state, id, target, card.effect, rng)?;
    state.action_discard.push(card);
    Ok(true)
}

/// Move a card from hand to the discard pile, once per turn, no effect
pub fn discard_card(state: &mut GameState, id: PlayerId, index: usize) -> Result<bool> {
    if !ensure_action_phase(state, id)? {
        return Ok(false);
    }
    let player = state.player_mut(id)?;
    let name = player.name.clone();
    if player.flags.card_discarded {
        state.log(format!("{} has already discarded a card this turn!", name));
        return Ok(false);
    }
    if index >= player.hand.len() {
        state.log("Invalid card index");
        return Ok(false);
    }

    let card: Card = player.hand.remove(index);
    player.flags.card_discarded = true;
    state.log(format!("{} discarded {}", name, card.name));
    state.action_discard.push(card);
    Ok(true)
}

/// Pay to turn the first few queued event cards face up.
///
/// Returns the revealed cards, or `None` when the player cannot pay.
pub fn read_omens(state: &mut GameState, id: PlayerId) -> Result<Option<Vec<EventCard>>> {
    if !ensure_action_phase(state, id)? {
        return Ok(None);
    }
    let cost = Cost::gold(state.config.read_omens_cost);
    let player = state.player_mut(id)?;
    let name = player.name.clone();
    if !player.can_afford(&cost) {
        state.log(format!("Not enough gold. Need {} gold to read the omens.", cost.gold));
        return Ok(None);
    }
    player.pay(&cost);

    let count = state.config.read_omens_reveal_count.min(state.event_queue.len());
    let revealed: Vec<EventCard> = state
        .event_queue
        .iter_mut()
        .take(count)
        .map(|card| {
            card.face_up = true;
            card.clone()
        })
        .collect();

    state.log(format!(
        "{} pays {} gold to read the omens and glimpses {} future events",
        name, cost.gold, count
    ));
    Ok(Some(revealed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardEffect;
    use crate::entity::effects::{Effect, EffectKind};
    use crate::testing::sample_state;
    use rand::rngs::mock::StepRng;

    fn rng() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn test_military_contribution() {
        let mut state = sample_state(2);
        assert!(contribute_to_military(&mut state, PlayerId(0)).unwrap());
        let player = state.player(PlayerId(0)).unwrap();
        assert_eq!(player.gold, 0);
        assert_eq!(player.auctoritas, 7);
        assert_eq!(player.popular_support, 6);
        assert_eq!(state.military_strength, 105);
    }

    #[test]
    fn test_one_core_action_per_turn() {
        let mut state = sample_state(2);
        state.player_mut(PlayerId(0)).unwrap().gold = 100;
        assert!(political_maneuvering(&mut state, PlayerId(0)).unwrap());
        assert!(!contribute_to_military(&mut state, PlayerId(0)).unwrap());
        assert_eq!(state.player(PlayerId(0)).unwrap().gold, 94);
        assert_eq!(state.military_strength, 100);
    }

    #[test]
    fn test_actions_closed_outside_action_phase() {
        for phase in [TurnPhase::Income, TurnPhase::Ended] {
            let mut state = sample_state(2);
            state.phase = phase;
            let before = state.players.clone();
            assert!(!contribute_to_military(&mut state, PlayerId(0)).unwrap());
            assert!(!discard_card(&mut state, PlayerId(0), 0).unwrap());
            assert!(!play_card(&mut state, PlayerId(0), 0, None, &mut rng()).unwrap());
            assert_eq!(read_omens(&mut state, PlayerId(0)).unwrap(), None);
            assert_eq!(state.players, before);
            assert_eq!(state.military_strength, 100);
        }
    }

    #[test]
    fn test_unaffordable_action_changes_nothing() {
        let mut state = sample_state(2);
        state.player_mut(PlayerId(0)).unwrap().gold = 5;
        assert!(!political_maneuvering(&mut state, PlayerId(0)).unwrap());
        let player = state.player(PlayerId(0)).unwrap();
        assert_eq!(player.gold, 5);
        assert!(!player.flags.action_taken);
        assert!(state.log.contains("cannot afford"));
    }

    #[test]
    fn test_only_current_player_acts() {
        let mut state = sample_state(2);
        assert!(!political_maneuvering(&mut state, PlayerId(1)).unwrap());
        assert_eq!(state.player(PlayerId(1)).unwrap().gold, 10);
        assert!(political_maneuvering(&mut state, PlayerId(7)).is_err());
    }

    #[test]
    fn test_economic_development_improves_an_owned_estate() {
        let mut state = sample_state(2);
        assert!(economic_development(&mut state, PlayerId(0), &mut rng()).unwrap());
        let estate = state.player(PlayerId(0)).unwrap().estates[0];
        assert_eq!(state.estate(estate).unwrap().yield_gold, 3);
        assert_eq!(state.base_estate_income(PlayerId(0)).unwrap(), 11);
        assert_eq!(state.player(PlayerId(0)).unwrap().gold, 2);
    }

    #[test]
    fn test_economic_development_needs_estates() {
        let mut state = sample_state(2);
        let owned = state.player(PlayerId(0)).unwrap().estates.clone();
        for estate in owned {
            state.transfer_estate(estate, None).unwrap();
        }
        assert!(!economic_development(&mut state, PlayerId(0), &mut rng()).unwrap());
        assert_eq!(state.player(PlayerId(0)).unwrap().gold, 10);
    }

    #[test]
    fn test_play_card_pays_and_discards() {
        let mut state = sample_state(2);
        let player = state.player_mut(PlayerId(0)).unwrap();
        player.hand = vec![Card::new(1, CardEffect::SenateMotion)];
        player.gold = 6;
        player.auctoritas = 2;

        assert!(play_card(&mut state, PlayerId(0), 0, None, &mut rng()).unwrap());
        let player = state.player(PlayerId(0)).unwrap();
        assert!(player.hand.is_empty());
        assert_eq!(player.gold, 0);
        // paid 2, gained 1
        assert_eq!(player.auctoritas, 1);
        assert!(player.flags.card_played);
        assert_eq!(state.action_discard.len(), 1);
    }

    #[test]
    fn test_play_card_rejections() {
        let mut state = sample_state(2);
        let player = state.player_mut(PlayerId(0)).unwrap();
        player.hand = vec![Card::new(1, CardEffect::SenateMotion), Card::new(2, CardEffect::Poison)];

        assert!(!play_card(&mut state, PlayerId(0), 5, None, &mut rng()).unwrap());
        // Poison without a target
        assert!(!play_card(&mut state, PlayerId(0), 1, None, &mut rng()).unwrap());
        assert_eq!(state.player(PlayerId(0)).unwrap().hand.len(), 2);

        state.player_mut(PlayerId(0)).unwrap().gold = 100;
        state
            .player_mut(PlayerId(0))
            .unwrap()
            .effects
            .push(Effect::timed(EffectKind::OracleWard, 1, "Oracle"));
        assert!(!play_card(&mut state, PlayerId(0), 0, None, &mut rng()).unwrap());
        assert_eq!(state.player(PlayerId(0)).unwrap().gold, 100);
    }

    #[test]
    fn test_one_card_play_and_one_discard_per_turn() {
        let mut state = sample_state(2);
        let player = state.player_mut(PlayerId(0)).unwrap();
        player.gold = 100;
        player.hand = vec![
            Card::new(1, CardEffect::SenateMotion),
            Card::new(2, CardEffect::SenateMotion),
            Card::new(3, CardEffect::SenateMotion),
        ];

        assert!(discard_card(&mut state, PlayerId(0), 2).unwrap());
        assert!(!discard_card(&mut state, PlayerId(0), 0).unwrap());
        assert!(play_card(&mut state, PlayerId(0), 0, None, &mut rng()).unwrap());
        assert!(!play_card(&mut state, PlayerId(0), 0, None, &mut rng()).unwrap());
        assert_eq!(state.player(PlayerId(0)).unwrap().hand.len(), 1);
        assert_eq!(state.action_discard.len(), 2);
    }

    #[test]
    fn test_read_omens_reveals_front_of_queue() {
        let mut state = sample_state(2);
        assert!(state.event_queue.iter().all(|c| !c.face_up));
        let revealed = read_omens(&mut state, PlayerId(0)).unwrap().unwrap();
        assert_eq!(revealed.len(), 3);
        assert_eq!(revealed[0].name, state.event_queue[0].name);
        assert!(state.event_queue.iter().take(3).all(|c| c.face_up));
        assert!(!state.event_queue[3].face_up);
        assert_eq!(state.player(PlayerId(0)).unwrap().gold, 5);

        state.player_mut(PlayerId(0)).unwrap().gold = 4;
        assert!(read_omens(&mut state, PlayerId(0)).unwrap().is_none());
    }
}
