//! Resource and income engine

pub mod income;
pub mod tax;

pub use income::{distribute_income, estate_income, process_income, Distribution};
pub use tax::{apply_standing_tax_penalty, set_tax_rate};
