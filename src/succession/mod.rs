//! Succession engine
//!
//! Two layers: family succession (a paterfamilias dies, an heir or distant
//! relative takes over) and imperial succession (the throne passes between
//! families, or the Republic returns). Coups feed into both.

pub mod coup;
pub mod family;
pub mod imperial;

pub use coup::{attempt_coup, CoupOutcome};
pub use family::{age_family, check_death, handle_death};
pub use imperial::{check_imperial_ascension, check_win_condition, succession_score, trigger_succession};
