//! Configuration file model
//!
//! ```yaml
//! version: 1
//! postgres:
//!   roles_blacklist: [pg_*, postgres, rds_*]
//! privileges:
//!   ro: [__connect__, __usage_on_schemas__, __select_on_tables__]
//! sync_map:
//! - role: {name: readers, options: NOLOGIN}
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::builtins;
use crate::schema::{PrivilegeEntry, SyncItem};
use crate::{Error, Result};

/// Supported configuration version
pub const VERSION: u32 = 1;

fn default_version() -> u32 {
    VERSION
}

fn default_roles_blacklist() -> Vec<String> {
    vec!["pg_*".to_string(), "postgres".to_string()]
}

/// Instance-wide settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostgresConfig {
    /// Glob patterns of roles never managed
    #[serde(default = "default_roles_blacklist")]
    pub roles_blacklist: Vec<String>,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            roles_blacklist: default_roles_blacklist(),
        }
    }
}

/// Root of the configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub privileges: BTreeMap<String, PrivilegeEntry>,
    #[serde(default)]
    pub sync_map: Vec<SyncItem>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: VERSION,
            postgres: PostgresConfig::default(),
            privileges: BTreeMap::new(),
            sync_map: Vec::new(),
        }
    }
}

impl Config {
    /// Parse and validate a YAML document
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            items = config.sync_map.len(),
            privileges = config.privileges.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.version != VERSION {
            return Err(Error::UnsupportedVersion {
                version: self.version,
                expected: VERSION,
            });
        }

        for (index, item) in self.sync_map.iter().enumerate() {
            if item.roles.is_empty() && item.grant.is_empty() {
                return Err(Error::invalid(format!(
                    "{} defines neither roles nor grants",
                    item.label(index)
                )));
            }
        }

        for name in self.privileges.keys() {
            self.check_group(name, &mut BTreeSet::new())?;
        }
        Ok(())
    }

    fn check_group<'a>(&'a self, name: &'a str, path: &mut BTreeSet<&'a str>) -> Result<()> {
        let members = match self.privileges.get(name) {
            Some(PrivilegeEntry::Group(members)) => members,
            Some(PrivilegeEntry::Definition(_)) => return Ok(()),
            None if builtins::is_builtin(name) => return Ok(()),
            None => {
                return Err(Error::invalid(format!("Unknown privilege {} in group", name)));
            }
        };
        if !path.insert(name) {
            return Err(Error::invalid(format!(
                "Privilege group {} includes itself",
                name
            )));
        }
        for member in members {
            self.check_group(member, path)?;
        }
        path.remove(name);
        Ok(())
    }
}
