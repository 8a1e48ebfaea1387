//! Directory layer for rolesync
//!
//! Provides the directory side of the reconciliation pipeline:
//!
//! - **Entries**: [`DirectoryEntry`] with case-insensitive [`AttributeMap`]
//! - **Distinguished names**: RFC 4514 parsing via [`Dn`]
//! - **Client abstraction**: the [`DirectoryClient`] trait and an in-memory
//!   implementation, [`MemoryDirectory`], evaluating [`Filter`]s
//! - **Query engine**: [`query`] runs a [`Search`] and resolves its joins

pub mod attributes;
pub mod client;
pub mod dn;
pub mod entry;
pub mod error;
pub mod filter;
pub mod memory;
pub mod query;

pub use attributes::AttributeMap;
pub use client::{BoxError, DirectoryClient, Scope, SearchRow};
pub use dn::{Dn, Rdn};
pub use entry::DirectoryEntry;
pub use error::{Error, Result};
pub use filter::Filter;
pub use memory::MemoryDirectory;
pub use query::{Join, Search, query};
