//! Instance snapshot
//!
//! A YAML description of a PostgreSQL instance, served through the
//! [`Inspector`] trait so a sync can be planned without a connection:
//!
//! ```yaml
//! me: {name: rolesync, superuser: true}
//! databases:
//! - name: app
//!   owner: app
//!   schemas:
//!     public: [app]
//! roles:
//! - name: alice
//!   options: LOGIN
//!   parents: [readers]
//! grants:
//! - {privilege: __connect__, database: app, role: alice}
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use rolesync_core::{Acl, BoxError, Database, Grant, Inspector, PrivilegeMap, Role, RoleSet, Schema};
use rolesync_meta::RoleOptions;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Me {
    pub name: String,
    #[serde(default)]
    pub superuser: bool,
}

impl Default for Me {
    fn default() -> Self {
        Self {
            name: "postgres".to_string(),
            superuser: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseState {
    pub name: String,
    #[serde(default)]
    pub owner: String,
    /// Schema name to owners
    #[serde(default)]
    pub schemas: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleState {
    pub name: String,
    #[serde(default)]
    pub options: RoleOptions,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantState {
    pub privilege: String,
    pub role: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// Observed state of an instance
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub me: Me,
    /// Overrides the configured roles blacklist
    #[serde(default)]
    pub roles_blacklist: Option<Vec<String>>,
    #[serde(default)]
    pub databases: Vec<DatabaseState>,
    #[serde(default)]
    pub roles: Vec<RoleState>,
    /// Roles rolesync may alter or drop; every role when absent
    #[serde(default)]
    pub managed_roles: Option<Vec<String>>,
    #[serde(default)]
    pub grants: Vec<GrantState>,
}

impl Snapshot {
    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::user(format!("Failed to read state {}: {}", path.display(), e))
        })?;
        let snapshot = Self::parse(&content).map_err(|source| CliError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            databases = snapshot.databases.len(),
            roles = snapshot.roles.len(),
            grants = snapshot.grants.len(),
            "Loaded instance state"
        );
        Ok(snapshot)
    }
}

/// [`Inspector`] backed by a [`Snapshot`]
pub struct SnapshotInspector {
    snapshot: Snapshot,
    blacklist: Vec<String>,
}

impl SnapshotInspector {
    /// `blacklist` applies unless the snapshot carries its own
    pub fn new(snapshot: Snapshot, blacklist: Vec<String>) -> Self {
        Self {
            snapshot,
            blacklist,
        }
    }
}

impl Inspector for SnapshotInspector {
    fn fetch_databases(&self) -> std::result::Result<Vec<String>, BoxError> {
        Ok(self.snapshot.databases.iter().map(|d| d.name.clone()).collect())
    }

    fn fetch_me(&self) -> std::result::Result<(String, bool), BoxError> {
        Ok((self.snapshot.me.name.clone(), self.snapshot.me.superuser))
    }

    fn fetch_roles_blacklist(&self) -> std::result::Result<Vec<String>, BoxError> {
        Ok(self
            .snapshot
            .roles_blacklist
            .clone()
            .unwrap_or_else(|| self.blacklist.clone()))
    }

    fn fetch_roles(&self) -> std::result::Result<(RoleSet, RoleSet), BoxError> {
        let mut all = RoleSet::new();
        for state in &self.snapshot.roles {
            let mut role = Role::new(&state.name)
                .with_options(state.options)
                .with_parents(state.parents.iter().cloned());
            role.comment = state.comment.clone();
            all.insert(role)?;
        }
        let mut managed = all.clone();
        if let Some(names) = &self.snapshot.managed_roles {
            managed.retain(|role| names.contains(&role.name));
        }
        Ok((all, managed))
    }

    fn fetch_schemas(&self, databases: &[String]) -> std::result::Result<Vec<Database>, BoxError> {
        Ok(self
            .snapshot
            .databases
            .iter()
            .filter(|state| databases.contains(&state.name))
            .map(|state| {
                state
                    .schemas
                    .iter()
                    .fold(Database::new(&state.name, &state.owner), |database, (name, owners)| {
                        database.with_schema(Schema::new(name, owners.iter().cloned()))
                    })
            })
            .collect())
    }

    /// Grants of known privileges to `roles` in `databases`
    fn fetch_grants(
        &self,
        databases: &[Database],
        privileges: &PrivilegeMap,
        roles: &RoleSet,
    ) -> std::result::Result<Acl, BoxError> {
        let mut acl = Acl::new();
        for state in &self.snapshot.grants {
            if privileges.get(&state.privilege).is_none() || !roles.contains(&state.role) {
                continue;
            }
            if let Some(database) = &state.database {
                if !databases.iter().any(|d| &d.name == database) {
                    continue;
                }
            }
            acl.insert(Grant {
                privilege: state.privilege.clone(),
                dbname: state.database.clone(),
                schema: state.schema.clone(),
                role: state.role.clone(),
                owner: state.owner.clone(),
            });
        }
        Ok(acl)
    }
}
