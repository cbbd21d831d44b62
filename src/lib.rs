//! Roman Dynasty - turn-based succession strategy engine
//!
//! Noble families compete through gold, popular support and auctoritas to
//! found the Empire and hold the throne for consecutive generations.

pub mod actions;
pub mod cards;
pub mod core;
pub mod economy;
pub mod entity;
pub mod game;
pub mod military;
pub mod persistence;
pub mod state;
pub mod succession;
pub mod turn;

pub use game::Game;
