//! Roles
//!
//! A [`Role`] is identified by its name. Options are compared
//! option-for-option; parents are the groups the role is member of.

mod diff;
mod set;

pub use diff::diff;
pub use set::RoleSet;

use std::collections::BTreeSet;
use std::fmt;

use rolesync_meta::RoleOptions;

/// A database role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub options: RoleOptions,
    pub parents: BTreeSet<String>,
    pub comment: Option<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: RoleOptions::default(),
            parents: BTreeSet::new(),
            comment: None,
        }
    }

    pub fn with_options(mut self, options: RoleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_parents<S: Into<String>>(mut self, parents: impl IntoIterator<Item = S>) -> Self {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
