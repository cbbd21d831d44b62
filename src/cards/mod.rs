//! Action cards, event cards and the piles they move between
//!
//! Card records are plain data. Their behaviour is selected by a tag
//! (`CardEffect`, `EventEffect`) and resolved by dispatch functions, so a
//! saved game never has to carry code.

pub mod action_cards;
pub mod deck;
pub mod events;
pub mod targeting;

use serde::{Deserialize, Serialize};

use crate::core::types::Cost;

pub use action_cards::CardEffect;
pub use events::EventEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardCategory {
    Military,
    Political,
    Intrigue,
    Economic,
    Religious,
}

/// An action card in a deck, hand or discard pile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: u32,
    pub name: String,
    pub category: CardCategory,
    pub cost: Cost,
    pub description: String,
    pub effect: CardEffect,
}

impl Card {
    pub fn new(id: u32, effect: CardEffect) -> Self {
        Self {
            id,
            name: effect.name().to_string(),
            category: effect.category(),
            cost: effect.cost(),
            description: effect.description().to_string(),
            effect,
        }
    }
}

/// Whether an event hits everyone or a player chosen by some metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    EmpireWide,
    Targeted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCard {
    pub name: String,
    pub category: EventCategory,
    pub description: String,
    pub effect: EventEffect,
    pub face_up: bool,
}

impl EventCard {
    pub fn new(effect: EventEffect) -> Self {
        Self {
            name: effect.name().to_string(),
            category: effect.category(),
            description: effect.description().to_string(),
            effect,
            face_up: false,
        }
    }

    /// Stable identifier of the event
    pub fn id(&self) -> &'static str {
        self.effect.id()
    }
}

/// The full action deck, one card per effect, ids in catalogue order
pub fn action_catalogue() -> Vec<Card> {
    CardEffect::ALL
        .iter()
        .enumerate()
        .map(|(i, effect)| Card::new(i as u32, *effect))
        .collect()
}

/// The full event deck, all face down
pub fn event_catalogue() -> Vec<EventCard> {
    EventEffect::ALL.iter().map(|e| EventCard::new(*e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;

    #[test]
    fn test_catalogues_have_expected_sizes() {
        assert_eq!(action_catalogue().len(), 25);
        assert_eq!(event_catalogue().len(), EventEffect::ALL.len());
    }

    #[test]
    fn test_five_cards_per_category() {
        let deck = action_catalogue();
        for category in [
            CardCategory::Military,
            CardCategory::Political,
            CardCategory::Intrigue,
            CardCategory::Economic,
            CardCategory::Religious,
        ] {
            assert_eq!(deck.iter().filter(|c| c.category == category).count(), 5, "{:?}", category);
        }
    }

    #[test]
    fn test_event_ids_are_unique() {
        let ids: AHashSet<_> = event_catalogue().iter().map(|e| e.id()).collect();
        assert_eq!(ids.len(), EventEffect::ALL.len());
    }

    #[test]
    fn test_multi_resource_costs() {
        let deck = action_catalogue();
        let assassinate = deck.iter().find(|c| c.effect == CardEffect::Assassinate).unwrap();
        assert_eq!(assassinate.cost, Cost::new(12, 0, 5));
        let motion = deck.iter().find(|c| c.effect == CardEffect::SenateMotion).unwrap();
        assert_eq!(motion.cost, Cost::new(6, 2, 0));
    }
}
