//! Shared test utilities for the rolesync workspace.
//!
//! Test doubles for the collaborators of a sync pass. Every double records
//! its calls in a `RefCell` so tests can assert exact call sequences. This
//! crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`directory`]: [`ScriptedDirectory`] replaying canned search results
//! - [`inspector`]: [`MockInspector`] serving a fixed instance state
//! - [`executor`]: [`RecordingExecutor`] collecting executed operations
//! - [`config`]: [`ConfigFile`] writing YAML configs to a temp directory

pub mod config;
pub mod directory;
pub mod executor;
pub mod inspector;

pub use config::ConfigFile;
pub use directory::ScriptedDirectory;
pub use executor::RecordingExecutor;
pub use inspector::MockInspector;
