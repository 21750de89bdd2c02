// src/store.rs
//
// Disk persistence for snapshots. One JSON file, fully rewritten on every
// save. An unreadable or out-of-version file is treated as absent so the
// caller rebuilds instead of failing.

use crate::models::{Snapshot, SCHEMA_VERSION};
use crate::traits::SnapshotStore;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub const CACHE_DIR_NAME: &str = ".polyscout";
pub const CACHE_FILE_NAME: &str = "events-cache.json";

/// Default cache location under the user's home directory.
pub fn default_cache_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(CACHE_DIR_NAME)
        .join(CACHE_FILE_NAME)
}

/// Snapshot storage backed by a single JSON file.
pub struct DiskStore {
    path: PathBuf,
}

impl DiskStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at the default location.
    pub fn default_location() -> Self {
        Self::new(default_cache_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl SnapshotStore for DiskStore {
    fn load(&self) -> Option<Snapshot> {
        // A missing file is the normal first-run state, not worth a warning.
        let contents = fs::read_to_string(&self.path).ok()?;

        let snapshot: Snapshot = match serde_json::from_str(&contents) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Failed to parse cache at {}: {}", self.path.display(), e);
                return None;
            }
        };

        if snapshot.schema_version != SCHEMA_VERSION {
            warn!(
                "Cache version mismatch ({} != {}), ignoring stored snapshot",
                snapshot.schema_version, SCHEMA_VERSION
            );
            return None;
        }

        info!("Loaded {} events from cache", snapshot.events.len());
        Some(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create cache directory: {}", e))?;
        }

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| format!("Failed to serialize snapshot: {}", e))?;
        fs::write(&self.path, json).map_err(|e| format!("Failed to write cache file: {}", e))?;

        info!(
            "Saved {} events to {}",
            snapshot.events.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Event;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

    fn temp_store() -> DiskStore {
        let dir = std::env::temp_dir().join(format!(
            "polyscout-store-test-{}-{}",
            std::process::id(),
            NEXT_ID.fetch_add(1, Ordering::SeqCst)
        ));
        DiskStore::new(dir.join(CACHE_FILE_NAME))
    }

    fn cleanup(store: &DiskStore) {
        if let Some(parent) = store.path().parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let store = temp_store();
        let snapshot = Snapshot::new(vec![Event {
            id: "1".to_string(),
            title: "Fed decision".to_string(),
            active: true,
            ..Default::default()
        }]);

        store.save(&snapshot).unwrap();
        let loaded = store.load().expect("snapshot should load back");
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
        assert_eq!(loaded.events.len(), 1);
        assert_eq!(loaded.events[0].title, "Fed decision");
        cleanup(&store);
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        let store = temp_store();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_load_rejects_version_mismatch() {
        let store = temp_store();
        let mut snapshot = Snapshot::new(vec![]);
        snapshot.schema_version = "1.0.0".to_string();
        store.save(&snapshot).unwrap();

        assert!(store.load().is_none());
        cleanup(&store);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let store = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json at all").unwrap();

        assert!(store.load().is_none());
        cleanup(&store);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let store = temp_store();
        assert!(!store.exists());
        store.save(&Snapshot::new(vec![])).unwrap();
        assert!(store.exists());
        cleanup(&store);
    }
}
