//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Family identifier. A player *is* a family, so the same id is used for
/// "origin family" references on wives and mothers.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EstateId(pub u32);

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProvinceId(pub u32);

/// Game turn counter (one turn = one full round of players)
pub type Turn = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Character traits carried by paterfamilias, wives, mothers and children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    // Female pool
    FinancialAcumen,
    PoliticalSavvy,
    BelovedByPeople,
    Fertile,
    Pious,
    Influential,
    Scheming,
    // Male pool
    BaseAuctoritas,
    PopularSupport,
    EstateIncome,
    MilitaryProwess,
}

impl Trait {
    pub const FEMALE: [Trait; 7] = [
        Trait::FinancialAcumen,
        Trait::PoliticalSavvy,
        Trait::BelovedByPeople,
        Trait::Fertile,
        Trait::Pious,
        Trait::Influential,
        Trait::Scheming,
    ];

    pub const MALE: [Trait; 4] = [
        Trait::BaseAuctoritas,
        Trait::PopularSupport,
        Trait::EstateIncome,
        Trait::MilitaryProwess,
    ];

    pub fn pool(gender: Gender) -> &'static [Trait] {
        match gender {
            Gender::Male => &Self::MALE,
            Gender::Female => &Self::FEMALE,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trait::FinancialAcumen => "Financial Acumen",
            Trait::PoliticalSavvy => "Political Savvy",
            Trait::BelovedByPeople => "Beloved by People",
            Trait::Fertile => "Fertile",
            Trait::Pious => "Pious",
            Trait::Influential => "Influential",
            Trait::Scheming => "Scheming",
            Trait::BaseAuctoritas => "+1 Base Auctoritas",
            Trait::PopularSupport => "+1 Popular Support",
            Trait::EstateIncome => "+10% Estate Income",
            Trait::MilitaryProwess => "Military Prowess",
        }
    }
}

/// A bundle of the three player resources, used both as a cost and as a
/// grant. Zero fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub gold: u32,
    pub auctoritas: u32,
    pub popular_support: u32,
}

impl Cost {
    pub const fn gold(gold: u32) -> Self {
        Self { gold, auctoritas: 0, popular_support: 0 }
    }

    pub const fn new(gold: u32, auctoritas: u32, popular_support: u32) -> Self {
        Self { gold, auctoritas, popular_support }
    }
}

/// Direction for the emperor's counter influence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterDirection {
    /// Toward virtue (counter increases)
    Up,
    /// Toward popularity (counter decreases)
    Down,
}
