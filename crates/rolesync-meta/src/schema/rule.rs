//! Role and grant rule specifications
//!
//! Every string field is a template: `{cn}`, `{member.sAMAccountName}` or
//! `{dn.cn}` are replaced by values projected from directory entries.

use serde::Deserialize;

use super::one_or_many;
use super::options::RoleOptions;

/// Rule generating roles
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RoleRuleSpec {
    #[serde(alias = "name", deserialize_with = "one_or_many")]
    pub names: Vec<String>,
    #[serde(default)]
    pub options: RoleOptions,
    #[serde(default, alias = "parent", deserialize_with = "one_or_many")]
    pub parents: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Rule generating grants
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct GrantRuleSpec {
    pub privilege: String,
    /// Empty or `__all__` means every database
    #[serde(default, alias = "database", deserialize_with = "one_or_many")]
    pub databases: Vec<String>,
    /// Empty or `__all__` means every schema
    #[serde(default, alias = "schema", deserialize_with = "one_or_many")]
    pub schemas: Vec<String>,
    #[serde(alias = "role", deserialize_with = "one_or_many")]
    pub roles: Vec<String>,
}
