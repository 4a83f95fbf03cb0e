use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use crate::domain::GroupSnapshot;
use crate::errors::LedgerError;

use super::{Result, SnapshotStore};

/// In-process byte store. Snapshots are kept serialized, exactly as a
/// key-value medium would hold them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent saves fail, to exercise best-effort persistence.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw serialized bytes stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().ok()?.get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.lock()?.insert(key.to_string(), bytes);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| LedgerError::Storage("memory store lock poisoned".into()))
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<GroupSnapshot>> {
        match self.lock()?.get(key) {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, snapshot: &GroupSnapshot) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Storage(format!(
                "write to `{}` rejected by memory store",
                key
            )));
        }
        let bytes = serde_json::to_vec(snapshot)?;
        self.lock()?.insert(key.to_string(), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
    use crate::domain::Group;

    #[test]
    fn missing_key_loads_as_none() {
        let store = MemoryStore::new();
        assert!(store.load("nothing").unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        let group = Group::new("Flat", CurrencyCode::new("GBP"));
        store.save("flat", &group).unwrap();
        assert_eq!(store.load("flat").unwrap(), Some(group));
        assert!(store.raw("flat").is_some());
    }

    #[test]
    fn failing_writes_leave_previous_value() {
        let store = MemoryStore::new();
        let group = Group::new("Flat", CurrencyCode::new("GBP"));
        store.save("flat", &group).unwrap();
        store.set_fail_writes(true);
        let mut renamed = group.clone();
        renamed.name = "Flat 2".into();
        assert!(store.save("flat", &renamed).is_err());
        assert_eq!(store.load("flat").unwrap().unwrap().name, "Flat");
    }

    #[test]
    fn corrupt_bytes_are_storage_errors() {
        let store = MemoryStore::new();
        store.put_raw("flat", b"{not json".to_vec()).unwrap();
        assert!(matches!(store.load("flat"), Err(LedgerError::Storage(_))));
    }
}
