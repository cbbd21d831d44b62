//! Families, estates and provinces
//!
//! A player is a noble family: resources, a paterfamilias, kin, a hand of
//! action cards and the estates it owns. Estates themselves live inside their
//! province; a player only keeps the ids it owns.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::core::types::{Cost, EstateId, Gender, PlayerId, ProvinceId, Trait, Turn};
use crate::entity::effects::EffectLedger;

/// Head of the family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paterfamilias {
    pub name: String,
    pub turns_in_role: u32,
    pub traits: Vec<Trait>,
}

/// A wife or mother, married in from another family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kinswoman {
    pub name: String,
    pub origin_family: PlayerId,
    pub traits: Vec<Trait>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub name: String,
    /// Age in turns
    pub age: u32,
    pub gender: Gender,
    pub traits: Vec<Trait>,
}

/// Fractional share of distributed income owed to each in-law family
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TributeRates {
    pub to_mother: f64,
    pub to_wife: f64,
}

/// One-per-turn gates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnFlags {
    pub action_taken: bool,
    pub card_played: bool,
    pub card_discarded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,

    pub gold: u32,
    /// Income earned but not yet run through the tax/tribute waterfall
    pub accumulated_income: u32,
    pub popular_support: u32,
    pub auctoritas: u32,

    pub estates: Vec<EstateId>,

    pub paterfamilias: Paterfamilias,
    pub wife: Option<Kinswoman>,
    pub mother: Option<Kinswoman>,
    pub children: Vec<Child>,

    pub hand: Vec<Card>,
    pub tribute_rates: TributeRates,
    pub flags: TurnFlags,
    pub effects: EffectLedger,
}

impl Player {
    /// Check whether every component of `cost` is covered
    pub fn can_afford(&self, cost: &Cost) -> bool {
        self.gold >= cost.gold
            && self.auctoritas >= cost.auctoritas
            && self.popular_support >= cost.popular_support
    }

    /// Deduct a cost. Callers check `can_afford` first; the floor is 0 either way.
    pub fn pay(&mut self, cost: &Cost) {
        self.gold = self.gold.saturating_sub(cost.gold);
        self.auctoritas = self.auctoritas.saturating_sub(cost.auctoritas);
        self.popular_support = self.popular_support.saturating_sub(cost.popular_support);
    }

    pub fn lose_gold(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.gold);
        self.gold -= lost;
        lost
    }

    pub fn lose_auctoritas(&mut self, amount: u32) {
        self.auctoritas = self.auctoritas.saturating_sub(amount);
    }

    pub fn lose_popular_support(&mut self, amount: u32) {
        self.popular_support = self.popular_support.saturating_sub(amount);
    }

    pub fn owns(&self, estate: EstateId) -> bool {
        self.estates.contains(&estate)
    }

    pub fn is_married(&self) -> bool {
        self.wife.is_some()
    }

    /// Children of `gender` old enough to marry or inherit
    pub fn eligible_children(&self, gender: Gender, minimum_age: u32) -> impl Iterator<Item = &Child> {
        self.children
            .iter()
            .filter(move |c| c.gender == gender && c.age >= minimum_age)
    }

    /// Whether any kin of this family was born into `family`
    pub fn owes_tribute_to(&self, family: PlayerId) -> bool {
        self.wife.as_ref().is_some_and(|w| w.origin_family == family)
            || self.mother.as_ref().is_some_and(|m| m.origin_family == family)
    }

    pub fn reset_turn_flags(&mut self) {
        self.flags = TurnFlags::default();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estate {
    pub id: EstateId,
    pub province: ProvinceId,
    pub owner: Option<PlayerId>,
    /// Gold per turn; permanently improvable
    pub yield_gold: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Province {
    pub id: ProvinceId,
    pub name: String,
    pub estates: Vec<Estate>,
    pub conquered: bool,
    pub conquest_turn: Option<Turn>,
    pub founding_year: u32,
}

impl Province {
    pub fn unowned_estates(&self) -> impl Iterator<Item = &Estate> {
        self.estates.iter().filter(|e| e.owner.is_none())
    }

    pub fn is_capital(&self) -> bool {
        self.id == ProvinceId(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_player() -> Player {
        Player {
            id: PlayerId(0),
            name: "Julia Familia".into(),
            gold: 10,
            accumulated_income: 0,
            popular_support: 5,
            auctoritas: 5,
            estates: Vec::new(),
            paterfamilias: Paterfamilias {
                name: "Marcus".into(),
                turns_in_role: 0,
                traits: vec![],
            },
            wife: None,
            mother: None,
            children: Vec::new(),
            hand: Vec::new(),
            tribute_rates: TributeRates { to_mother: 0.05, to_wife: 0.05 },
            flags: TurnFlags::default(),
            effects: EffectLedger::new(),
        }
    }

    #[test]
    fn test_can_afford_multi_resource() {
        let player = bare_player();
        assert!(player.can_afford(&Cost::new(10, 5, 5)));
        assert!(!player.can_afford(&Cost::new(10, 6, 0)));
        assert!(!player.can_afford(&Cost::new(0, 0, 6)));
    }

    #[test]
    fn test_losses_floor_at_zero() {
        let mut player = bare_player();
        assert_eq!(player.lose_gold(25), 10);
        player.lose_auctoritas(9);
        player.lose_popular_support(9);
        assert_eq!(player.gold, 0);
        assert_eq!(player.auctoritas, 0);
        assert_eq!(player.popular_support, 0);
    }

    #[test]
    fn test_eligible_children_respects_age_and_gender() {
        let mut player = bare_player();
        player.children = vec![
            Child { name: "Gaius".into(), age: 15, gender: Gender::Male, traits: vec![] },
            Child { name: "Titus".into(), age: 3, gender: Gender::Male, traits: vec![] },
            Child { name: "Livia".into(), age: 20, gender: Gender::Female, traits: vec![] },
        ];
        let sons: Vec<_> = player.eligible_children(Gender::Male, 14).collect();
        assert_eq!(sons.len(), 1);
        assert_eq!(sons[0].name, "Gaius");
    }
}
