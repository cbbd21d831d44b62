//! Whole-state snapshots in an external key-value store
//!
//! The engine treats a store as a black box holding JSON strings. Loading
//! only checks that the snapshot parses.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ahash::AHashMap;

use crate::core::error::{GameError, Result};
use crate::state::GameState;

/// Key the session facade saves under
pub const SAVE_KEY: &str = "roman_dynasty_game";

pub trait SnapshotStore {
    fn put(&mut self, key: &str, snapshot: &str) -> Result<()>;

    /// The stored snapshot, or `GameError::SnapshotMissing`
    fn get(&self, key: &str) -> Result<String>;
}

pub fn to_snapshot(state: &GameState) -> Result<String> {
    Ok(serde_json::to_string(state)?)
}

pub fn from_snapshot(snapshot: &str) -> Result<GameState> {
    Ok(serde_json::from_str(snapshot)?)
}

/// In-process store, mostly for tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: AHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn put(&mut self, key: &str, snapshot: &str) -> Result<()> {
        self.entries.insert(key.to_string(), snapshot.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<String> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| GameError::SnapshotMissing(key.to_string()))
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SnapshotStore for FileStore {
    fn put(&mut self, key: &str, snapshot: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), snapshot)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(GameError::SnapshotMissing(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::testing::sample_state;

    #[test]
    fn test_snapshot_restores_state() {
        let mut state = sample_state(3);
        state.emperor = Some(PlayerId(2));
        state.tax_rate = 0.3;
        let restored = from_snapshot(&to_snapshot(&state).unwrap()).unwrap();
        assert_eq!(restored.emperor, Some(PlayerId(2)));
        assert_eq!(restored.players, state.players);
        assert_eq!(restored.provinces, state.provinces);
        assert_eq!(restored.event_queue, state.event_queue);
        assert_eq!(restored.log, state.log);
    }

    #[test]
    fn test_memory_store_missing_key() {
        let mut store = MemoryStore::new();
        assert!(matches!(store.get("nope"), Err(GameError::SnapshotMissing(_))));
        store.put("a", "{}").unwrap();
        assert_eq!(store.get("a").unwrap(), "{}");
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("saves"));
        assert!(matches!(store.get(SAVE_KEY), Err(GameError::SnapshotMissing(_))));

        let snapshot = to_snapshot(&sample_state(2)).unwrap();
        store.put(SAVE_KEY, &snapshot).unwrap();
        assert_eq!(store.get(SAVE_KEY).unwrap(), snapshot);
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        assert!(matches!(from_snapshot("{\"turn\": "), Err(GameError::Serde(_))));
    }
}
