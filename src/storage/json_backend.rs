use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::core::utils::{canonical_name, ensure_dir, write_atomic, PathResolver};
use crate::domain::GroupSnapshot;

use super::{Result, SnapshotStore};

const SNAPSHOT_EXTENSION: &str = "json";

/// Filesystem-backed JSON persistence, one file per storage key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Stores snapshots under `<base>/groups`, `base` defaulting to the app data dir.
    pub fn new(base: Option<PathBuf>) -> Result<Self> {
        let base = PathResolver::resolve_base(base);
        Self::at(PathResolver::snapshot_dir_in(&base))
    }

    /// Stores snapshots directly under `root`.
    pub fn at(root: PathBuf) -> Result<Self> {
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_name(key), SNAPSHOT_EXTENSION))
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<GroupSnapshot>> {
        let path = self.snapshot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn save(&self, key: &str, snapshot: &GroupSnapshot) -> Result<()> {
        let path = self.snapshot_path(key);
        let json = serde_json::to_string_pretty(snapshot)?;
        write_atomic(&path, &json)?;
        tracing::debug!(path = %path.display(), "snapshot written");
        Ok(())
    }
}
