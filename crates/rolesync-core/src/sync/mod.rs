//! Sync orchestration
//!
//! [`SyncManager`] drives one reconciliation pass against an [`Inspector`]
//! (observed state) and an [`Executor`] (change application).

mod inspector;
mod manager;

pub use inspector::{Executor, Inspector};
pub use manager::{SyncManager, SyncOptions};
