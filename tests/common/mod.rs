#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeZone, Utc};
use group_ledger::{
    config::{ConfigManager, EngineConfig},
    core::time::FixedClock,
    domain::MemberId,
    storage::{JsonFileStore, MemoryStore},
    LedgerStore,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ))
}

/// Store and config manager backed by a unique directory.
pub fn setup_test_env() -> (LedgerStore, ConfigManager, PathBuf) {
    let base = temp_base();
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    let config = config_manager.load().expect("load default config");
    let storage = JsonFileStore::new(Some(base.clone())).expect("create json storage backend");
    let store = LedgerStore::open(Box::new(storage), test_clock(), config).expect("open store");
    (store, config_manager, base)
}

/// Store over an inspectable in-memory backend.
pub fn memory_env() -> (LedgerStore, Arc<MemoryStore>, Arc<FixedClock>) {
    let storage = Arc::new(MemoryStore::new());
    let clock = test_clock();
    let store = LedgerStore::open(
        Box::new(storage.clone()),
        clock.clone(),
        EngineConfig::default(),
    )
    .expect("open memory store");
    (store, storage, clock)
}

pub fn add_members(store: &mut LedgerStore, names: &[&str]) -> Vec<MemberId> {
    names
        .iter()
        .map(|name| store.add_member(name, None).expect("add member").into_value())
        .collect()
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}
