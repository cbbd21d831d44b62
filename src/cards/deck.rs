//! Draw piles: dealing action cards and feeding the event queue

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::EventEffect;
use crate::core::error::Result;
use crate::core::types::PlayerId;
use crate::state::GameState;

/// Draw one action card into a player's hand.
///
/// An empty deck is refilled from the shuffled discard pile first. Returns
/// `false` when the hand is full or no card is left anywhere.
pub fn draw_card<R: Rng + ?Sized>(state: &mut GameState, player: PlayerId, rng: &mut R) -> Result<bool> {
    let max_hand = state.config.max_hand_size;
    if state.player(player)?.hand.len() >= max_hand {
        return Ok(false);
    }

    if state.action_deck.is_empty() && !state.action_discard.is_empty() {
        state.action_deck.append(&mut state.action_discard);
        state.action_deck.shuffle(rng);
        state.log("Card deck reshuffled");
    }

    match state.action_deck.pop() {
        Some(card) => {
            state.player_mut(player)?.hand.push(card);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Draw up to `count` cards, returning how many were actually drawn
pub fn draw_cards<R: Rng + ?Sized>(
    state: &mut GameState,
    player: PlayerId,
    count: usize,
    rng: &mut R,
) -> Result<usize> {
    let mut drawn = 0;
    for _ in 0..count {
        if draw_card(state, player, rng)? {
            drawn += 1;
        }
    }
    Ok(drawn)
}

/// Top the face-down event queue back up to its configured size.
///
/// The event discard pile is reshuffled into the deck when the deck runs out;
/// the queue stays short only if every event card is already queued.
pub fn replenish_event_queue<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    while state.event_queue.len() < state.config.event_queue_size {
        if state.event_deck.is_empty() {
            if state.event_discard.is_empty() {
                break;
            }
            state.event_deck.append(&mut state.event_discard);
            state.event_deck.shuffle(rng);
            state.log("Event deck reshuffled");
        }
        if let Some(mut card) = state.event_deck.pop() {
            card.face_up = false;
            state.event_queue.push_back(card);
        }
    }
}

/// Execute the event at the front of the queue, discard it and refill.
pub fn execute_next_event<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Result<Option<EventEffect>> {
    let Some(mut card) = state.event_queue.pop_front() else {
        state.log("No event cards available");
        return Ok(None);
    };
    card.face_up = true;
    let effect = card.effect;

    tracing::info!(event = card.id(), turn = state.turn, "Executing event");
    state.log(format!("EVENT: {} - {}", card.name, card.description));

    crate::cards::events::execute(state, effect, rng)?;

    state.event_discard.push(card);
    replenish_event_queue(state, rng);
    Ok(Some(effect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_state;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_draw_respects_hand_limit() {
        let mut state = sample_state(2);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let max = state.config.max_hand_size;

        let drawn = draw_cards(&mut state, PlayerId(0), 20, &mut rng).unwrap();
        assert_eq!(state.player(PlayerId(0)).unwrap().hand.len(), max);
        assert!(drawn < 20);
        assert!(!draw_card(&mut state, PlayerId(0), &mut rng).unwrap());
    }

    #[test]
    fn test_empty_deck_reshuffles_discard() {
        let mut state = sample_state(2);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut deck = std::mem::take(&mut state.action_deck);
        state.action_discard.append(&mut deck);
        state.player_mut(PlayerId(1)).unwrap().hand.clear();

        assert!(draw_card(&mut state, PlayerId(1), &mut rng).unwrap());
        assert!(state.action_discard.is_empty());
        assert!(state.log.contains("reshuffled"));
    }

    #[test]
    fn test_nothing_left_to_draw() {
        let mut state = sample_state(2);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        state.action_deck.clear();
        state.action_discard.clear();
        state.player_mut(PlayerId(0)).unwrap().hand.clear();
        assert!(!draw_card(&mut state, PlayerId(0), &mut rng).unwrap());
    }

    #[test]
    fn test_event_queue_is_fifo_and_refilled() {
        let mut state = sample_state(3);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let size = state.config.event_queue_size;
        let front = state.event_queue.front().map(|c| c.effect);

        let executed = execute_next_event(&mut state, &mut rng).unwrap();
        assert_eq!(executed, front);
        assert_eq!(state.event_queue.len(), size);
        assert_eq!(state.event_discard.len(), 1);
        assert!(state.event_queue.iter().all(|c| !c.face_up));
    }

    #[test]
    fn test_event_discard_recycled_when_deck_runs_dry() {
        let mut state = sample_state(3);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let total = state.event_deck.len() + state.event_queue.len();

        for _ in 0..(total * 2) {
            execute_next_event(&mut state, &mut rng).unwrap();
        }
        assert_eq!(state.event_queue.len(), state.config.event_queue_size);
        assert_eq!(
            state.event_deck.len() + state.event_queue.len() + state.event_discard.len(),
            total
        );
    }
}
