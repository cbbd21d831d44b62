use thiserror::Error;

use crate::core::types::{EstateId, PlayerId, ProvinceId};

/// Errors that signal a broken precondition or an unavailable store.
///
/// Ordinary rule rejections (not enough gold, wrong phase, action already
/// taken) are never errors: those return `Ok(false)` and leave a log entry.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Province not found: {0}")]
    ProvinceNotFound(ProvinceId),

    #[error("Estate not found: {0}")]
    EstateNotFound(EstateId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No snapshot stored under key {0:?}")]
    SnapshotMissing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
