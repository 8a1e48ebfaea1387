//! Sync map items
//!
//! # Example YAML
//!
//! ```yaml
//! sync_map:
//! - description: "DBA group"
//!   ldapsearch:
//!     base: ou=groups,dc=acme,dc=tld
//!     filter: "(cn=dba)"
//!     on_unexpected_dn: warn
//!     joins:
//!       member:
//!         attributes: [sAMAccountName]
//!   roles:
//!   - name: "{member.sAMAccountName}"
//!     options: LOGIN
//!     parent: dba
//! ```

use std::fmt;
use std::str::FromStr;

use rolesync_directory::Search;
use serde::Deserialize;

use super::one_or_many;
use super::rule::{GrantRuleSpec, RoleRuleSpec};
use crate::Error;

/// One entry of the sync map
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SyncItem {
    #[serde(default)]
    pub description: Option<String>,
    /// Directory search feeding the rules; static rules when absent
    #[serde(default, alias = "ldap")]
    pub ldapsearch: Option<LdapSearch>,
    #[serde(default, alias = "role", deserialize_with = "one_or_many")]
    pub roles: Vec<RoleRuleSpec>,
    #[serde(default, alias = "grants", deserialize_with = "one_or_many")]
    pub grant: Vec<GrantRuleSpec>,
}

impl SyncItem {
    /// Label used in logs and error messages
    pub fn label(&self, index: usize) -> String {
        match &self.description {
            Some(description) => format!("item {} ({})", index, description),
            None => format!("item {}", index),
        }
    }
}

/// Directory search of a sync map item
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LdapSearch {
    #[serde(flatten)]
    pub search: Search,
    #[serde(default)]
    pub on_unexpected_dn: OnUnexpectedDn,
}

/// What to do with a value that should be a DN and is not usable as one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum OnUnexpectedDn {
    /// Abort the run
    #[default]
    Fail,
    /// Log a warning and skip the value
    Warn,
    /// Skip the value silently
    Ignore,
}

impl FromStr for OnUnexpectedDn {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fail" => Ok(Self::Fail),
            "warn" => Ok(Self::Warn),
            "ignore" => Ok(Self::Ignore),
            _ => Err(Error::InvalidPolicy {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for OnUnexpectedDn {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for OnUnexpectedDn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Warn => write!(f, "warn"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}
