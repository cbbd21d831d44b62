//! Player actions
//!
//! - `resolver`: the core actions, card play/discard, reading the omens
//! - `imperial`: emperor-only operations
//! - `marriage`: the marriage action and divorce

pub mod imperial;
pub mod marriage;
pub mod resolver;

pub use crate::cards::deck::draw_cards;
pub use imperial::{distribute_estates, influence_counter, launch_campaign, CampaignOutcome};
pub use marriage::{divorce, eligible_families, marriage_negotiation, EligibleFamily, MarriageProposal};
pub use resolver::{
    contribute_to_military, discard_card, economic_development, play_card, political_maneuvering, read_omens,
};
