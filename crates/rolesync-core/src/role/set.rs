//! Role collection with merge semantics

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::Role;
use crate::{Error, Result};

/// Roles keyed by name
///
/// Inserting a role twice merges parents. Options must be identical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    roles: BTreeMap<String, Role>,
}

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, merging duplicates
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Result<Self> {
        let mut set = Self::new();
        for role in roles {
            set.insert(role)?;
        }
        Ok(set)
    }

    /// Add a role, merging it with an existing role of the same name
    ///
    /// # Errors
    ///
    /// [`Error::RoleConflict`] when the existing role has other options.
    pub fn insert(&mut self, role: Role) -> Result<()> {
        match self.roles.entry(role.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(role);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.options != role.options {
                    return Err(Error::RoleConflict {
                        name: role.name,
                        first: existing.options.to_string(),
                        second: role.options.to_string(),
                    });
                }
                tracing::debug!(role = %role.name, "Merging duplicated role");
                existing.parents.extend(role.parents);
                if existing.comment.is_none() {
                    existing.comment = role.comment;
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Role> {
        self.roles.remove(name)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    /// Keep only roles for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&Role) -> bool) {
        self.roles.retain(|_, role| keep(role));
    }

    /// Check that every parent exists in this set or in `existing`
    ///
    /// # Errors
    ///
    /// [`Error::Membership`] naming the first role with an unknown parent.
    pub fn resolve_membership(&self, existing: &RoleSet) -> Result<()> {
        for role in self.iter() {
            for parent in &role.parents {
                if !self.contains(parent) && !existing.contains(parent) {
                    return Err(Error::Membership {
                        role: role.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RoleSet {
    type Item = &'a Role;
    type IntoIter = std::collections::btree_map::Values<'a, String, Role>;

    fn into_iter(self) -> Self::IntoIter {
        self.roles.values()
    }
}
