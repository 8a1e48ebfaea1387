//! Configuration for rolesync.
//!
//! This crate provides the YAML configuration schema (sync map, rule specs,
//! privilege definitions), the builtin privilege catalog and configuration
//! file discovery.

pub mod builtins;
pub mod config;
pub mod error;
pub mod loader;
pub mod schema;

pub use config::{Config, PostgresConfig};
pub use error::{Error, Result};
pub use loader::{candidates, find_file};
pub use schema::{
    ALL, GrantRuleSpec, LdapSearch, OnUnexpectedDn, PrivilegeDefinition, PrivilegeEntry,
    PrivilegeKind, RoleOptions, RoleRuleSpec, SyncItem,
};
