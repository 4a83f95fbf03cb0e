//! Key-value snapshot persistence.
//!
//! The ledger only needs to load and save whole-group snapshots; everything
//! else about the storage medium is the backend's business.

pub mod json_backend;
pub mod memory;

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;

use crate::domain::GroupSnapshot;
use crate::errors::LedgerError;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Trait that abstracts interaction with the persistence layer.
pub trait SnapshotStore: Send + Sync {
    /// Returns `None` when nothing has been saved under `key`.
    fn load(&self, key: &str) -> Result<Option<GroupSnapshot>>;
    fn save(&self, key: &str, snapshot: &GroupSnapshot) -> Result<()>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn load(&self, key: &str) -> Result<Option<GroupSnapshot>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, snapshot: &GroupSnapshot) -> Result<()> {
        (**self).save(key, snapshot)
    }
}
