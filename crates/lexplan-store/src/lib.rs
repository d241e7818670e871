//! lexplan-store — Crash-safe persistence of scheduling state.
//!
//! The store owns the durable copies of memory state and cycle state.
//! Snapshots are keyed by (subject, stage, category), carry a version
//! stamp, and are replaced atomically (write to a temporary file in the
//! same directory, then rename), so a crash mid-write leaves the previous
//! valid snapshot intact. A version mismatch at save time means another
//! writer got there first and fails the save rather than merging or
//! overwriting silently.
//!
//! Missing or unreadable state is never fatal: `load` logs the condition
//! and substitutes a fresh snapshot, matching the system's
//! fail-open-on-read, fail-closed-on-write posture.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use lexplan_core::memory::MemoryState;
use lexplan_core::model::{Category, Stage};
use lexplan_core::pool::LearningCycle;

/// Errors raised by the store. Only writes can fail; reads degrade to a
/// fresh snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The on-disk version no longer matches the version this snapshot
    /// was loaded at. The caller must reload and retry.
    #[error(
        "state conflict for {key}: snapshot was loaded at version {expected} \
         but the store now holds version {found}; reload and retry"
    )]
    Conflict {
        key: StateKey,
        expected: u64,
        found: u64,
    },

    /// Filesystem access failed.
    #[error("state file access failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be encoded.
    #[error("failed to encode snapshot for {key}: {source}")]
    Encode {
        key: StateKey,
        #[source]
        source: serde_json::Error,
    },
}

/// Identifies one independent unit of persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub subject: String,
    pub stage: Stage,
    pub category: Category,
}

impl StateKey {
    pub fn new(subject: impl Into<String>, stage: Stage, category: Category) -> Self {
        Self {
            subject: subject.into(),
            stage,
            category,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}-{}", self.subject, self.stage, self.category)
    }
}

/// The durable state of one key: the persisted-file schema.
///
/// Maps are BTree-backed so serialization is key-sorted and snapshots are
/// byte-stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Version stamp, bumped on every successful save.
    #[serde(default)]
    pub version: u64,
    /// Pass state of the content pool.
    #[serde(default)]
    pub cycle: LearningCycle,
    /// Memory state per item id.
    #[serde(default)]
    pub memory: BTreeMap<String, MemoryState>,
}

/// File-backed snapshot store rooted at one directory.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    root: PathBuf,
}

impl ProgressStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a key's snapshot file: `<root>/<subject>/<stage>-<category>.json`.
    pub fn path(&self, key: &StateKey) -> PathBuf {
        self.root
            .join(&key.subject)
            .join(format!("{}-{}.json", key.stage, key.category))
    }

    /// Load a key's snapshot. Missing or unparsable state yields a fresh
    /// snapshot and a warning, never an error.
    pub fn load(&self, key: &StateKey) -> Snapshot {
        let path = self.path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(%key, "no persisted state, starting fresh");
                return Snapshot::default();
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "state unreadable, starting fresh");
                return Snapshot::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(%key, error = %err, "state corrupt, starting fresh");
                Snapshot::default()
            }
        }
    }

    /// Persist a key's snapshot and return the new version.
    ///
    /// The snapshot's `version` must still match the on-disk version it
    /// was loaded at; otherwise the save fails with
    /// [`StoreError::Conflict`]. The write lands in a temporary file in
    /// the target directory and is renamed over the old snapshot, so
    /// interrupted saves leave the prior snapshot authoritative.
    pub fn save(&self, key: &StateKey, snapshot: &Snapshot) -> Result<u64, StoreError> {
        let path = self.path(key);
        if let Some(found) = self.stored_version(&path)? {
            if found != snapshot.version {
                return Err(StoreError::Conflict {
                    key: key.clone(),
                    expected: snapshot.version,
                    found,
                });
            }
        }

        let next = Snapshot {
            version: snapshot.version + 1,
            cycle: snapshot.cycle.clone(),
            memory: snapshot.memory.clone(),
        };
        let encoded = serde_json::to_vec_pretty(&next).map_err(|source| StoreError::Encode {
            key: key.clone(),
            source,
        })?;

        let dir = path.parent().expect("snapshot path has a parent");
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        tmp.write_all(&encoded).map_err(|source| StoreError::Io {
            path: tmp.path().to_path_buf(),
            source,
        })?;
        tmp.persist(&path).map_err(|err| StoreError::Io {
            path: path.clone(),
            source: err.error,
        })?;

        tracing::info!(%key, version = next.version, items = next.memory.len(), "state saved");
        Ok(next.version)
    }

    /// Version of the snapshot currently on disk, if a valid one exists.
    /// A corrupt file reports no version: load would substitute fresh
    /// state for it, so overwriting it is not a conflict.
    fn stored_version(&self, path: &Path) -> Result<Option<u64>, StoreError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(serde_json::from_str::<Snapshot>(&content)
            .ok()
            .map(|s| s.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lexplan_core::memory::MemoryPhase;

    fn key() -> StateKey {
        StateKey::new("english", Stage::Elementary, Category::Vocabulary)
    }

    fn sample_state() -> MemoryState {
        MemoryState {
            phase: MemoryPhase::Learning,
            stability: 2.5,
            difficulty: 4.92,
            review_count: 1,
            lapse_count: 0,
            last_reviewed: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            due: NaiveDate::from_ymd_opt(2025, 1, 4).unwrap(),
        }
    }

    #[test]
    fn missing_state_loads_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());
        let snapshot = store.load(&key());
        assert_eq!(snapshot, Snapshot::default());
        assert_eq!(snapshot.version, 0);
    }

    #[test]
    fn save_load_roundtrip_bumps_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());

        let mut snapshot = store.load(&key());
        snapshot.memory.insert("w1".into(), sample_state());
        snapshot.cycle.learned_items.insert("w1".into());
        snapshot.cycle.current_day = 1;

        let version = store.save(&key(), &snapshot).unwrap();
        assert_eq!(version, 1);

        let loaded = store.load(&key());
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.memory["w1"], sample_state());
        assert!(loaded.cycle.learned_items.contains("w1"));
    }

    #[test]
    fn stale_snapshot_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());

        let snapshot = store.load(&key());
        store.save(&key(), &snapshot).unwrap();

        // A second writer saved in between; our version-0 snapshot is stale.
        let err = store.save(&key(), &snapshot).unwrap_err();
        match err {
            StoreError::Conflict {
                expected, found, ..
            } => {
                assert_eq!(expected, 0);
                assert_eq!(found, 1);
            }
            other => panic!("expected conflict, got {other}"),
        }
    }

    #[test]
    fn retry_after_reload_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());

        let snapshot = store.load(&key());
        store.save(&key(), &snapshot).unwrap();

        let mut fresh = store.load(&key());
        fresh.memory.insert("w2".into(), sample_state());
        assert_eq!(store.save(&key(), &fresh).unwrap(), 2);
    }

    #[test]
    fn corrupt_state_loads_fresh_and_is_overwritable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());
        let path = store.path(&key());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ definitely not a snapshot").unwrap();

        let snapshot = store.load(&key());
        assert_eq!(snapshot, Snapshot::default());

        // Corrupt state was already replaced by fresh state at load; the
        // save is not a conflict.
        assert_eq!(store.save(&key(), &snapshot).unwrap(), 1);
        assert_eq!(store.load(&key()).version, 1);
    }

    #[test]
    fn keys_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());

        let vocab = key();
        let syntax = StateKey::new("english", Stage::Elementary, Category::Syntax);

        let mut snapshot = store.load(&vocab);
        snapshot.memory.insert("w1".into(), sample_state());
        store.save(&vocab, &snapshot).unwrap();

        assert_eq!(store.load(&syntax), Snapshot::default());
        assert_ne!(store.path(&vocab), store.path(&syntax));
    }

    #[test]
    fn snapshot_serialization_is_byte_stable() {
        let mut snapshot = Snapshot::default();
        snapshot.memory.insert("b".into(), sample_state());
        snapshot.memory.insert("a".into(), sample_state());
        let one = serde_json::to_vec(&snapshot).unwrap();
        let two = serde_json::to_vec(&snapshot.clone()).unwrap();
        assert_eq!(one, two);

        // BTree maps serialize key-sorted.
        let text = String::from_utf8(one).unwrap();
        assert!(text.find("\"a\"").unwrap() < text.find("\"b\"").unwrap());
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::new(dir.path());
        let snapshot = store.load(&key());
        store.save(&key(), &snapshot).unwrap();

        let subject_dir = dir.path().join("english");
        let entries: Vec<_> = fs::read_dir(&subject_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "elementary-vocabulary.json");
    }
}
