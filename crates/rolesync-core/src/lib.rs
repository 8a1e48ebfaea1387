//! Core reconciliation layer for rolesync
//!
//! This crate turns a sync map into wanted roles and grants, compares them
//! with what a database inspector reports and produces the ordered change
//! operations to apply:
//!
//! - [`vars`] projects directory entries into template variables
//! - [`rules`] expands role and grant rules from those variables
//! - [`inspect`] runs the whole sync map into a [`RoleSet`] and an [`Acl`]
//! - [`privilege::postprocess`] expands grants over databases, schemas and owners
//! - [`role::diff`] and [`privilege::acl`] compute change operations
//! - [`sync::SyncManager`] sequences everything against the collaborators

pub mod blacklist;
pub mod change;
pub mod error;
pub mod format;
pub mod inspect;
pub mod privilege;
pub mod role;
pub mod rules;
pub mod sync;
pub mod vars;

pub use blacklist::Blacklist;
pub use change::ChangeOperation;
pub use error::{Error, Result};
pub use format::{Format, FormatError};
pub use inspect::Inspection;
pub use privilege::{Acl, Database, Grant, PrivilegeMap, Schema};
pub use role::{Role, RoleSet};
pub use rules::{CommentError, Generated, Rule};
pub use sync::{Executor, Inspector, SyncManager, SyncOptions};
pub use vars::{AttributesMap, Value, Variables};

pub use rolesync_directory::BoxError;
