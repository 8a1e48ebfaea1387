//! Schema of the YAML configuration
//!
//! - `sync_map` items: a directory search plus role and grant rules
//! - `privileges`: privilege definitions and privilege groups
//!
//! Several list fields also accept a single scalar (`role: alice` is the
//! same as `roles: [alice]`).

pub mod options;
pub mod privilege;
pub mod rule;
pub mod sync_map;

use serde::{Deserialize, Deserializer};

pub use options::RoleOptions;
pub use privilege::{PrivilegeDefinition, PrivilegeEntry, PrivilegeKind};
pub use rule::{GrantRuleSpec, RoleRuleSpec};
pub use sync_map::{LdapSearch, OnUnexpectedDn, SyncItem};

/// Marker for "every database" in grant rules
pub const ALL: &str = "__all__";

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Deserialize either a single value or a list of values
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}
