//! Business logic: the ledger store, its services, and shared helpers.

pub mod ledger_store;
pub mod services;
pub mod time;
pub mod utils;
pub mod validation;
