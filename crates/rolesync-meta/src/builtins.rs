//! Built-in privileges - SINGLE SOURCE OF TRUTH
//!
//! These privileges are available to every configuration without being
//! declared. A declared privilege or group of the same name shadows the
//! builtin.

use crate::schema::{PrivilegeDefinition, PrivilegeKind};

/// Number of builtin privileges
pub const BUILTIN_COUNT: usize = 6;

/// Builtin privilege names, in declaration order
pub const BUILTIN_NAMES: [&str; BUILTIN_COUNT] = [
    "__connect__",
    "__temporary__",
    "__usage_on_schemas__",
    "__create_on_schemas__",
    "__select_on_tables__",
    "__default_select_on_tables__",
];

fn definition(kind: PrivilegeKind, grant: &str, revoke: &str) -> PrivilegeDefinition {
    PrivilegeDefinition {
        kind,
        grant: grant.to_string(),
        revoke: revoke.to_string(),
    }
}

/// Look up a builtin privilege by name
pub fn builtin(name: &str) -> Option<PrivilegeDefinition> {
    let privilege = match name {
        // Database level
        "__connect__" => definition(
            PrivilegeKind::Datacl,
            "GRANT CONNECT ON DATABASE {database} TO {role};",
            "REVOKE CONNECT ON DATABASE {database} FROM {role};",
        ),
        "__temporary__" => definition(
            PrivilegeKind::Datacl,
            "GRANT TEMPORARY ON DATABASE {database} TO {role};",
            "REVOKE TEMPORARY ON DATABASE {database} FROM {role};",
        ),

        // Schema level
        "__usage_on_schemas__" => definition(
            PrivilegeKind::Nspacl,
            "GRANT USAGE ON SCHEMA {schema} TO {role};",
            "REVOKE USAGE ON SCHEMA {schema} FROM {role};",
        ),
        "__create_on_schemas__" => definition(
            PrivilegeKind::Nspacl,
            "GRANT CREATE ON SCHEMA {schema} TO {role};",
            "REVOKE CREATE ON SCHEMA {schema} FROM {role};",
        ),
        "__select_on_tables__" => definition(
            PrivilegeKind::Nspacl,
            "GRANT SELECT ON ALL TABLES IN SCHEMA {schema} TO {role};",
            "REVOKE SELECT ON ALL TABLES IN SCHEMA {schema} FROM {role};",
        ),

        // Default privileges
        "__default_select_on_tables__" => definition(
            PrivilegeKind::Defacl,
            "ALTER DEFAULT PRIVILEGES FOR ROLE {owner} IN SCHEMA {schema} GRANT SELECT ON TABLES TO {role};",
            "ALTER DEFAULT PRIVILEGES FOR ROLE {owner} IN SCHEMA {schema} REVOKE SELECT ON TABLES FROM {role};",
        ),

        _ => return None,
    };
    Some(privilege)
}

/// Whether `name` is a builtin privilege
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_resolves() {
        for name in BUILTIN_NAMES {
            assert!(builtin(name).is_some(), "{} has no definition", name);
        }
        assert!(builtin("__drop_everything__").is_none());
    }

    #[test]
    fn test_default_privilege_templates_use_owner() {
        let privilege = builtin("__default_select_on_tables__").unwrap();
        assert_eq!(privilege.kind, PrivilegeKind::Defacl);
        assert!(privilege.grant.contains("{owner}"));
        assert!(privilege.revoke.contains("{owner}"));
    }
}
