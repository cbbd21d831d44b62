//! Shared helpers for integration tests

#![allow(dead_code)]

use roman_dynasty::core::config::GameConfig;
use roman_dynasty::core::types::PlayerId;
use roman_dynasty::state::GameState;
use roman_dynasty::Game;

pub fn names(n: usize) -> Vec<String> {
    ["Julii", "Claudii", "Cornelii", "Valerii", "Aemilii", "Fabii"]
        .iter()
        .take(n)
        .map(|s| s.to_string())
        .collect()
}

/// No births and no natural deaths, so family trees stay put
pub fn calm_config() -> GameConfig {
    GameConfig {
        base_fertility_chance: 0.0,
        death_probability_per_turn: 0.0,
        ..GameConfig::default()
    }
}

/// A calm game with every trait cleared
pub fn new_game(n: usize, seed: u64) -> Game {
    let mut game = Game::new(calm_config(), &names(n), seed).unwrap();
    for player in &mut game.state_mut().players {
        player.paterfamilias.traits.clear();
        if let Some(wife) = player.wife.as_mut() {
            wife.traits.clear();
        }
        if let Some(mother) = player.mother.as_mut() {
            mother.traits.clear();
        }
    }
    game
}

pub fn gold(game: &Game, id: u32) -> u32 {
    game.state().player(PlayerId(id)).unwrap().gold
}

/// Every owned estate appears in exactly its owner's list and nowhere else
pub fn assert_estate_ownership(state: &GameState) {
    for (estate, owner) in state.owned_estates() {
        for player in &state.players {
            let listed = player.estates.iter().filter(|e| **e == estate).count();
            let expected = usize::from(player.id == owner);
            assert_eq!(listed, expected, "estate {} listed {} times by {}", estate, listed, player.name);
        }
    }
    for player in &state.players {
        for estate in &player.estates {
            assert_eq!(state.estate(*estate).unwrap().owner, Some(player.id));
        }
    }
}
