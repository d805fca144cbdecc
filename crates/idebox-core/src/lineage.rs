//! Persisted snapshot lineage
//!
//! Maps each snapshot name to its parent's name. The root snapshot has no
//! entry. Stored as pretty-printed JSON in the IDE type's state directory
//! and written atomically (temp file then rename), so a crash never leaves
//! a half-written store.

use crate::{CoreError, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Snapshot-to-parent map for one IDE type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineageStore {
    // BTreeMap keeps serialization order stable, so load followed by save
    // reproduces the file byte for byte.
    entries: BTreeMap<String, String>,
}

impl LineageStore {
    /// Load from disk; a missing file is an empty store
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content)
            .map_err(|e| CoreError::LineageCorrupted(format!("{}: {}", path.display(), e)))?;

        Ok(Self { entries })
    }

    /// Write the store to disk atomically
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        atomic_write(path, content.as_bytes())?;
        Ok(())
    }

    /// Record a snapshot's parent
    pub fn insert(&mut self, snapshot: &str, parent: &str) {
        self.entries
            .insert(snapshot.to_string(), parent.to_string());
    }

    /// Forget a snapshot. Absent entries are tolerated.
    pub fn remove(&mut self, snapshot: &str) {
        self.entries.remove(snapshot);
    }

    /// Parent of a snapshot, if recorded
    pub fn parent_of(&self, snapshot: &str) -> Option<&str> {
        self.entries.get(snapshot).map(String::as_str)
    }

    /// Whether a snapshot has an entry
    pub fn contains(&self, snapshot: &str) -> bool {
        self.entries.contains_key(snapshot)
    }

    /// First child that names the given snapshot as its parent, if any
    pub fn referencing_child(&self, parent: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, p)| p.as_str() == parent)
            .map(|(child, _)| child.as_str())
    }

    /// Snapshot names in sorted order
    pub fn snapshots(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Write content to a temp file in the target directory, then rename over
/// the destination.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = LineageStore::load_from(&dir.path().join("lineage.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn insert_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.json");

        let mut store = LineageStore::default();
        store.insert("s1", "v0");
        store.insert("s2", "s1");
        store.save_to(&path).unwrap();

        let loaded = LineageStore::load_from(&path).unwrap();
        assert_eq!(loaded.parent_of("s1"), Some("v0"));
        assert_eq!(loaded.parent_of("s2"), Some("s1"));
        assert_eq!(loaded.parent_of("v0"), None);
    }

    #[test]
    fn save_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.json");

        let mut store = LineageStore::default();
        store.insert("zeta", "v0");
        store.insert("alpha", "zeta");
        store.save_to(&path).unwrap();
        let first = std::fs::read(&path).unwrap();

        let loaded = LineageStore::load_from(&path).unwrap();
        loaded.save_to(&path).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn referencing_child_lookup() {
        let mut store = LineageStore::default();
        store.insert("s1", "v0");
        store.insert("s2", "s1");

        assert_eq!(store.referencing_child("v0"), Some("s1"));
        assert_eq!(store.referencing_child("s1"), Some("s2"));
        assert_eq!(store.referencing_child("s2"), None);
    }

    #[test]
    fn remove_tolerates_absence() {
        let mut store = LineageStore::default();
        store.insert("s1", "v0");
        store.remove("s1");
        store.remove("s1");
        assert!(store.is_empty());
    }

    #[test]
    fn corrupted_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = LineageStore::load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::LineageCorrupted(_)));
    }
}
