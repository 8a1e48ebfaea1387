//! Privilege definitions
//!
//! # Example YAML
//!
//! ```yaml
//! privileges:
//!   ro:
//!   - __connect__
//!   - __usage_on_schemas__
//!   - __select_on_tables__
//!   ddl:
//!     type: nspacl
//!     grant: GRANT CREATE ON SCHEMA {schema} TO {role};
//!     revoke: REVOKE CREATE ON SCHEMA {schema} FROM {role};
//! ```

use std::fmt;

use serde::Deserialize;

/// How a privilege is scoped, which drives grant expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivilegeKind {
    /// Database level (`GRANT CONNECT ON DATABASE`)
    Datacl,
    /// Schema level (`GRANT USAGE ON SCHEMA`)
    Nspacl,
    /// Default privileges, applied per schema owner
    Defacl,
}

impl fmt::Display for PrivilegeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Datacl => write!(f, "datacl"),
            Self::Nspacl => write!(f, "nspacl"),
            Self::Defacl => write!(f, "defacl"),
        }
    }
}

/// A grantable privilege
///
/// `grant` and `revoke` are SQL templates with `{database}`, `{schema}`,
/// `{role}` and `{owner}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrivilegeDefinition {
    #[serde(rename = "type")]
    pub kind: PrivilegeKind,
    pub grant: String,
    pub revoke: String,
}

/// Entry of the `privileges` map
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PrivilegeEntry {
    /// Names of other privileges
    Group(Vec<String>),
    Definition(PrivilegeDefinition),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_variants() {
        let group: PrivilegeEntry = serde_yaml::from_str("[__connect__, ddl]").unwrap();
        assert_eq!(
            group,
            PrivilegeEntry::Group(vec!["__connect__".into(), "ddl".into()])
        );

        let definition: PrivilegeEntry = serde_yaml::from_str(
            "type: defacl\ngrant: GRANT ...\nrevoke: REVOKE ...",
        )
        .unwrap();
        match definition {
            PrivilegeEntry::Definition(d) => assert_eq!(d.kind, PrivilegeKind::Defacl),
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_inspect_query_is_ignored() {
        let entry: PrivilegeEntry = serde_yaml::from_str(
            "type: datacl\ngrant: GRANT ...\nrevoke: REVOKE ...\ninspect: SELECT 1",
        )
        .unwrap();
        assert!(matches!(entry, PrivilegeEntry::Definition(_)));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(
            serde_yaml::from_str::<PrivilegeEntry>("type: tblacl\ngrant: x\nrevoke: y").is_err()
        );
    }
}
