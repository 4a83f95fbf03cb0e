#![doc(test(attr(deny(warnings))))]

//! Group Ledger offers the shared-expense primitives behind a "who owes whom"
//! workflow: members, expenses with flexible split rules, categories, an
//! activity trail, derived balances, and a settlement planner.
//!
//! The [`core::ledger_store::LedgerStore`] is the single writer; everything
//! else derives from the immutable [`domain::group::Group`] snapshots it
//! publishes.

pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

pub use crate::core::ledger_store::{
    Applied, GroupUpdate, LedgerStore, PersistenceWarning, SubscriptionId,
};
pub use crate::errors::{ErrorKind, LedgerError, LedgerResult};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Group Ledger tracing initialized.");
    });
}
