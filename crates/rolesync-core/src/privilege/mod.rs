//! Privileges, grants and observed databases

pub mod acl;
pub mod postprocess;

pub use acl::Acl;
pub use postprocess::postprocess;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rolesync_meta::builtins;
use rolesync_meta::{Config, PrivilegeDefinition, PrivilegeEntry};

use crate::{Error, Result};

/// One privilege granted to a role
///
/// `dbname: None` means every database and `schema: None` every schema
/// (or none, for database level privileges). `owner` is the role whose
/// default privileges are altered; `None` on a default privilege grant
/// means every owner of the schema.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Grant {
    pub privilege: String,
    pub dbname: Option<String>,
    pub schema: Option<String>,
    pub role: String,
    pub owner: Option<String>,
}

impl Grant {
    pub fn new(privilege: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            privilege: privilege.into(),
            dbname: None,
            schema: None,
            role: role.into(),
            owner: None,
        }
    }

    pub fn on_database(mut self, dbname: impl Into<String>) -> Self {
        self.dbname = Some(dbname.into());
        self
    }

    pub fn on_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn for_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on ", self.privilege)?;
        match (&self.dbname, &self.schema) {
            (Some(db), Some(schema)) => write!(f, "{}.{}", db, schema)?,
            (Some(db), None) => write!(f, "{}", db)?,
            (None, Some(schema)) => write!(f, "*.{}", schema)?,
            (None, None) => write!(f, "*")?,
        }
        write!(f, " to {}", self.role)?;
        if let Some(owner) = &self.owner {
            write!(f, " for {}", owner)?;
        }
        Ok(())
    }
}

/// A schema as observed in a database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub name: String,
    /// Roles creating objects in this schema
    pub owners: Vec<String>,
}

impl Schema {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        owners: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            owners: owners.into_iter().map(Into::into).collect(),
        }
    }
}

/// A database as observed on the instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub name: String,
    pub owner: String,
    pub schemas: BTreeMap<String, Schema>,
}

impl Database {
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            schemas: BTreeMap::new(),
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schemas.insert(schema.name.clone(), schema);
        self
    }
}

/// Privileges known to a run
///
/// Names resolve in this order: declared definition, declared group,
/// builtin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeMap {
    definitions: BTreeMap<String, PrivilegeDefinition>,
    groups: BTreeMap<String, Vec<String>>,
}

impl PrivilegeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared privileges plus the builtins groups and grant rules use
    pub fn from_config(config: &Config) -> Self {
        let mut map = Self::new();
        for (name, entry) in &config.privileges {
            match entry {
                PrivilegeEntry::Definition(definition) => map.insert(name, definition.clone()),
                PrivilegeEntry::Group(members) => map.insert_group(name, members.clone()),
            }
        }

        let referenced: BTreeSet<&str> = config
            .privileges
            .values()
            .filter_map(|entry| match entry {
                PrivilegeEntry::Group(members) => Some(members.iter().map(String::as_str)),
                PrivilegeEntry::Definition(_) => None,
            })
            .flatten()
            .chain(
                config
                    .sync_map
                    .iter()
                    .flat_map(|item| item.grant.iter().map(|g| g.privilege.as_str())),
            )
            .collect();
        for name in referenced {
            if map.definitions.contains_key(name) || map.groups.contains_key(name) {
                continue;
            }
            if let Some(definition) = builtins::builtin(name) {
                tracing::debug!(privilege = name, "Using builtin privilege");
                map.insert(name, definition);
            }
        }
        map
    }

    pub fn insert(&mut self, name: &str, definition: PrivilegeDefinition) {
        self.definitions.insert(name.to_string(), definition);
    }

    pub fn insert_group(&mut self, name: &str, members: Vec<String>) {
        self.groups.insert(name.to_string(), members);
    }

    /// Whether no privilege is configured at all
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.groups.is_empty()
    }

    /// Definition of a privilege name, groups excluded
    pub fn get(&self, name: &str) -> Option<PrivilegeDefinition> {
        if let Some(definition) = self.definitions.get(name) {
            return Some(definition.clone());
        }
        if self.groups.contains_key(name) {
            return None;
        }
        builtins::builtin(name)
    }

    /// Definitions loaded for this run, by name
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &PrivilegeDefinition)> {
        self.definitions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Expand a privilege or group name into concrete definitions
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPrivilege`] when a name resolves to nothing.
    pub fn resolve(&self, name: &str) -> Result<Vec<(String, PrivilegeDefinition)>> {
        let mut resolved = Vec::new();
        self.resolve_into(name, &mut BTreeSet::new(), &mut resolved)?;
        Ok(resolved)
    }

    fn resolve_into(
        &self,
        name: &str,
        seen: &mut BTreeSet<String>,
        resolved: &mut Vec<(String, PrivilegeDefinition)>,
    ) -> Result<()> {
        if !seen.insert(name.to_string()) {
            return Ok(());
        }
        if let Some(definition) = self.definitions.get(name) {
            resolved.push((name.to_string(), definition.clone()));
        } else if let Some(members) = self.groups.get(name) {
            for member in members {
                self.resolve_into(member, seen, resolved)?;
            }
        } else if let Some(definition) = builtins::builtin(name) {
            resolved.push((name.to_string(), definition));
        } else {
            return Err(Error::UnknownPrivilege {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
