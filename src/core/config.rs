//! Game balance configuration
//!
//! Every tunable number in the engine lives here. The defaults reproduce the
//! shipped balance table; a TOML file may override any subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};

/// A province entry in the conquest order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceTemplate {
    pub name: String,
    /// `None` for the capital, whose size is player count x starting estates
    pub estate_count: Option<u32>,
    pub conquered: bool,
    /// Historical founding year (BC), flavour only
    pub year: u32,
}

impl ProvinceTemplate {
    fn new(name: &str, estate_count: u32, year: u32) -> Self {
        Self {
            name: name.to_string(),
            estate_count: Some(estate_count),
            conquered: false,
            year,
        }
    }

    fn capital(name: &str) -> Self {
        Self {
            name: name.to_string(),
            estate_count: None,
            conquered: true,
            year: 0,
        }
    }
}

/// Penalties applied when a distant relative has to take over a family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessionCrisisPenalty {
    pub auctoritas: u32,
    pub popular_support: u32,
    pub income_modifier: f64,
    pub duration: u32,
}

/// Penalties paid by a plotter whose coup failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoupFailurePenalty {
    pub gold: u32,
    pub auctoritas: u32,
}

/// Per-trait bonuses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitModifiers {
    /// Income multiplier bonus for Financial Acumen (wife/mother)
    pub financial_acumen: f64,
    /// Income multiplier bonus for "+10% Estate Income" (paterfamilias)
    pub estate_income_bonus: f64,
    pub political_savvy: u32,
    pub beloved_by_people: u32,
    pub base_auctoritas: u32,
    pub base_popular_support: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === PATERFAMILIAS ===
    /// Turns in role after which the paterfamilias may die each turn
    pub max_paterfamilias_turns: u32,
    pub death_probability_per_turn: f64,

    // === EVENT CARDS ===
    pub event_queue_size: usize,
    /// Execute one event every N full rounds
    pub event_draw_frequency: u32,
    pub read_omens_cost: u32,
    pub read_omens_reveal_count: usize,

    // === STARTING VALUES ===
    pub starting_gold: u32,
    pub starting_popular_support: u32,
    pub starting_auctoritas: u32,
    pub starting_estates_per_player: u32,
    pub starting_hand_size: usize,

    // === INCOME ===
    /// Accumulated income is distributed once it reaches this amount
    pub income_accumulation_threshold: u32,
    pub base_estate_yield: u32,

    // === TAXES ===
    pub min_tax_rate: f64,
    pub max_tax_rate: f64,
    pub tax_rate_increment: f64,
    pub default_tax_rate: f64,
    /// Popular support the emperor loses each round per increment of tax
    pub tax_penalty_per_increment: u32,
    /// One-off support loss per whole point (1.0) of tax increase
    pub tax_increase_support_penalty: f64,
    /// One-off support gain per whole point (1.0) of tax decrease
    pub tax_decrease_support_bonus: f64,

    // === TRIBUTES ===
    pub default_mother_tribute: f64,
    pub default_wife_tribute: f64,

    // === MARRIAGE & FAMILY ===
    pub minimum_marriage_age: u32,
    pub unmarried_penalty_per_turn: u32,
    pub base_fertility_chance: f64,
    pub fertile_bonus_chance: f64,
    pub child_trait_bonus_chance: f64,
    pub marriage_negotiation_cost: u32,

    // === COUNTER & SUCCESSION ===
    pub initial_counter: u32,
    pub counter_maximum: u32,
    pub counter_increment_per_round: u32,
    /// Successive emperors of one family needed to win
    pub dynasty_win_threshold: u32,

    // === MILITARY ===
    pub initial_military_strength: u32,
    pub military_requirement_per_province: u32,
    pub military_decay_per_round: u32,
    pub conquest_extra_military_required: u32,
    pub conquest_military_cost: u32,

    // === ACTION COSTS ===
    pub military_contribution_cost: u32,
    pub economic_development_cost: u32,
    pub political_maneuvering_cost: u32,
    pub campaign_cost: u32,
    pub counter_influence_cost: u32,
    pub coup_cost: u32,

    // === ACTION BENEFITS ===
    pub military_contribution_auctoritas: u32,
    pub military_contribution_popular_support: u32,
    pub military_contribution_strength: u32,
    pub estate_yield_improvement: u32,
    pub political_maneuvering_auctoritas: u32,
    pub campaign_success_popular_support: u32,
    pub campaign_partial_popular_support: u32,
    pub campaign_partial_strength: u32,
    pub campaign_failure_popular_support: u32,
    pub campaign_failure_strength: u32,
    pub campaign_base_failure_chance: f64,
    pub counter_influence_shift: u32,
    pub counter_influence_virtue_bonus: u32,
    pub counter_influence_popularity_bonus: u32,

    // === COUP ===
    pub coup_bonus: u32,
    pub coup_survival_support_bonus: u32,
    pub coup_failure_penalty: CoupFailurePenalty,

    // === CARDS & LOG ===
    pub max_hand_size: usize,
    pub cards_drawn_per_turn: usize,
    pub max_log_entries: usize,

    pub trait_modifiers: TraitModifiers,
    pub succession_crisis_penalty: SuccessionCrisisPenalty,

    pub provinces: Vec<ProvinceTemplate>,
    pub male_names: Vec<String>,
    pub female_names: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_paterfamilias_turns: 10,
            death_probability_per_turn: 0.10,

            event_queue_size: 5,
            event_draw_frequency: 1,
            read_omens_cost: 5,
            read_omens_reveal_count: 3,

            starting_gold: 10,
            starting_popular_support: 5,
            starting_auctoritas: 5,
            starting_estates_per_player: 5,
            starting_hand_size: 5,

            income_accumulation_threshold: 10,
            base_estate_yield: 2,

            min_tax_rate: 0.0,
            max_tax_rate: 0.5,
            tax_rate_increment: 0.1,
            default_tax_rate: 0.1,
            tax_penalty_per_increment: 1,
            tax_increase_support_penalty: 20.0,
            tax_decrease_support_bonus: 10.0,

            default_mother_tribute: 0.05,
            default_wife_tribute: 0.05,

            minimum_marriage_age: 14,
            unmarried_penalty_per_turn: 1,
            base_fertility_chance: 0.15,
            fertile_bonus_chance: 0.15,
            child_trait_bonus_chance: 0.3,
            marriage_negotiation_cost: 0,

            initial_counter: 1,
            counter_maximum: 100,
            counter_increment_per_round: 1,
            dynasty_win_threshold: 4,

            initial_military_strength: 100,
            military_requirement_per_province: 10,
            military_decay_per_round: 1,
            conquest_extra_military_required: 20,
            conquest_military_cost: 10,

            military_contribution_cost: 10,
            economic_development_cost: 8,
            political_maneuvering_cost: 6,
            campaign_cost: 20,
            counter_influence_cost: 15,
            coup_cost: 20,

            military_contribution_auctoritas: 2,
            military_contribution_popular_support: 1,
            military_contribution_strength: 5,
            estate_yield_improvement: 1,
            political_maneuvering_auctoritas: 3,
            campaign_success_popular_support: 5,
            campaign_partial_popular_support: 2,
            campaign_partial_strength: 5,
            campaign_failure_popular_support: 5,
            campaign_failure_strength: 5,
            campaign_base_failure_chance: 0.30,
            counter_influence_shift: 3,
            counter_influence_virtue_bonus: 2,
            counter_influence_popularity_bonus: 2,

            coup_bonus: 20,
            coup_survival_support_bonus: 3,
            coup_failure_penalty: CoupFailurePenalty { gold: 10, auctoritas: 5 },

            max_hand_size: 10,
            cards_drawn_per_turn: 2,
            max_log_entries: 50,

            trait_modifiers: TraitModifiers {
                financial_acumen: 0.10,
                estate_income_bonus: 0.10,
                political_savvy: 1,
                beloved_by_people: 1,
                base_auctoritas: 1,
                base_popular_support: 1,
            },
            succession_crisis_penalty: SuccessionCrisisPenalty {
                auctoritas: 5,
                popular_support: 3,
                income_modifier: -0.25,
                duration: 3,
            },

            provinces: vec![
                ProvinceTemplate::capital("Italia"),
                ProvinceTemplate::new("Sicilia", 12, 241),
                ProvinceTemplate::new("Sardinia et Corsica", 8, 238),
                ProvinceTemplate::new("Hispania Citerior", 10, 197),
                ProvinceTemplate::new("Hispania Ulterior", 14, 197),
                ProvinceTemplate::new("Macedonia", 16, 146),
                ProvinceTemplate::new("Africa", 18, 146),
                ProvinceTemplate::new("Asia", 20, 133),
                ProvinceTemplate::new("Gallia Narbonensis", 12, 121),
                ProvinceTemplate::new("Cilicia", 10, 102),
                ProvinceTemplate::new("Creta et Cyrenaica", 14, 74),
                ProvinceTemplate::new("Bithynia et Pontus", 16, 74),
                ProvinceTemplate::new("Syria", 18, 64),
                ProvinceTemplate::new("Gallia Comata", 22, 50),
                ProvinceTemplate::new("Aegyptus", 24, 30),
                ProvinceTemplate::new("Britannia", 14, 43),
                ProvinceTemplate::new("Dacia", 16, 106),
            ],
            male_names: [
                "Marcus", "Gaius", "Lucius", "Publius", "Quintus", "Titus", "Sextus", "Gnaeus", "Aulus",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            female_names: [
                "Julia", "Cornelia", "Claudia", "Livia", "Octavia", "Aurelia", "Valeria",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML override on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(GameError::InvalidConfig(msg));

        if self.tax_rate_increment <= 0.0 {
            return invalid(format!(
                "tax_rate_increment ({}) must be positive",
                self.tax_rate_increment
            ));
        }
        if self.min_tax_rate < 0.0 || self.min_tax_rate > self.max_tax_rate || self.max_tax_rate > 1.0 {
            return invalid(format!(
                "tax bounds must satisfy 0 <= min ({}) <= max ({}) <= 1",
                self.min_tax_rate, self.max_tax_rate
            ));
        }
        if self.default_tax_rate < self.min_tax_rate || self.default_tax_rate > self.max_tax_rate {
            return invalid(format!(
                "default_tax_rate ({}) outside [{}, {}]",
                self.default_tax_rate, self.min_tax_rate, self.max_tax_rate
            ));
        }

        let probabilities = [
            ("death_probability_per_turn", self.death_probability_per_turn),
            ("base_fertility_chance", self.base_fertility_chance),
            ("fertile_bonus_chance", self.fertile_bonus_chance),
            ("child_trait_bonus_chance", self.child_trait_bonus_chance),
            ("campaign_base_failure_chance", self.campaign_base_failure_chance),
            ("default_mother_tribute", self.default_mother_tribute),
            ("default_wife_tribute", self.default_wife_tribute),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{} ({}) must be within [0, 1]", name, value));
            }
        }

        if self.initial_counter == 0 || self.initial_counter > self.counter_maximum || self.counter_maximum > 100 {
            return invalid(format!(
                "counter bounds must satisfy 1 <= initial ({}) <= maximum ({}) <= 100",
                self.initial_counter, self.counter_maximum
            ));
        }
        if self.event_queue_size == 0 {
            return invalid("event_queue_size must be at least 1".into());
        }
        if self.event_draw_frequency == 0 {
            return invalid("event_draw_frequency must be at least 1".into());
        }
        if self.max_log_entries == 0 {
            return invalid("max_log_entries must be at least 1".into());
        }
        if self.starting_hand_size > self.max_hand_size {
            return invalid(format!(
                "starting_hand_size ({}) exceeds max_hand_size ({})",
                self.starting_hand_size, self.max_hand_size
            ));
        }
        if self.dynasty_win_threshold == 0 {
            return invalid("dynasty_win_threshold must be at least 1".into());
        }

        match self.provinces.first() {
            Some(capital) if capital.estate_count.is_none() && capital.conquered => {}
            Some(_) => return invalid("first province must be the conquered capital sized by player count".into()),
            None => return invalid("at least one province is required".into()),
        }
        if self.provinces.iter().skip(1).any(|p| p.estate_count.is_none()) {
            return invalid("only the capital may omit estate_count".into());
        }
        if self.male_names.is_empty() || self.female_names.is_empty() {
            return invalid("name pools must not be empty".into());
        }

        Ok(())
    }
}
