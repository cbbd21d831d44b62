//! Families and their holdings
//!
//! - `player`: player, kin, estate and province records
//! - `effects`: timed modifiers attached to a player
//! - `factory`: new game construction

pub mod effects;
pub mod factory;
pub mod player;

pub use effects::{Effect, EffectKind, EffectLedger};
pub use player::{Child, Estate, Kinswoman, Paterfamilias, Player, Province, TributeRates, TurnFlags};
