//! Privilege Postprocessor
//!
//! Rule-generated grants leave database, schema and owner open. This module
//! expands them against the observed databases so that wanted and observed
//! grants compare field by field:
//!
//! - privilege groups expand to their members
//! - `dbname: None` expands to every database
//! - schema and default privileges expand to every schema of the database
//! - default privileges expand to every owner of the schema
//! - database privileges never carry a schema

use rolesync_meta::PrivilegeKind;

use super::{Acl, Database, Grant, PrivilegeMap, Schema};
use crate::{Error, Result};

/// Expand `acl` over `databases`
///
/// # Errors
///
/// - [`Error::UnknownPrivilege`] for a privilege missing from `privileges`
/// - [`Error::UnknownDatabase`] for a database not in `databases`
/// - [`Error::UnknownSchema`] for a schema missing from its database
pub fn postprocess(acl: &Acl, privileges: &PrivilegeMap, databases: &[Database]) -> Result<Acl> {
    let mut expanded = Acl::new();
    for grant in acl {
        for (name, definition) in privileges.resolve(&grant.privilege)? {
            for database in select_databases(grant, databases)? {
                let base = Grant {
                    privilege: name.clone(),
                    dbname: Some(database.name.clone()),
                    schema: None,
                    role: grant.role.clone(),
                    owner: None,
                };
                if definition.kind == PrivilegeKind::Datacl {
                    expanded.insert(base);
                    continue;
                }
                for schema in select_schemas(grant, database)? {
                    let on_schema = Grant {
                        schema: Some(schema.name.clone()),
                        ..base.clone()
                    };
                    if definition.kind == PrivilegeKind::Nspacl {
                        expanded.insert(on_schema);
                        continue;
                    }
                    let owners: Vec<&String> = match &grant.owner {
                        Some(owner) => vec![owner],
                        None => schema.owners.iter().collect(),
                    };
                    for owner in owners {
                        expanded.insert(Grant {
                            owner: Some(owner.clone()),
                            ..on_schema.clone()
                        });
                    }
                }
            }
        }
    }
    tracing::debug!(wanted = acl.len(), expanded = expanded.len(), "Expanded grants");
    Ok(expanded)
}

fn select_databases<'a>(grant: &Grant, databases: &'a [Database]) -> Result<Vec<&'a Database>> {
    match &grant.dbname {
        None => Ok(databases.iter().collect()),
        Some(name) => databases
            .iter()
            .find(|database| &database.name == name)
            .map(|database| vec![database])
            .ok_or_else(|| Error::UnknownDatabase { name: name.clone() }),
    }
}

fn select_schemas<'a>(grant: &Grant, database: &'a Database) -> Result<Vec<&'a Schema>> {
    match &grant.schema {
        None => Ok(database.schemas.values().collect()),
        Some(name) => database
            .schemas
            .get(name)
            .map(|schema| vec![schema])
            .ok_or_else(|| Error::UnknownSchema {
                database: database.name.clone(),
                schema: name.clone(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rolesync_meta::{PrivilegeDefinition, builtins};

    fn definition(kind: PrivilegeKind) -> PrivilegeDefinition {
        PrivilegeDefinition {
            kind,
            grant: "GRANT".to_string(),
            revoke: "REVOKE".to_string(),
        }
    }

    fn privileges(name: &str, kind: PrivilegeKind) -> PrivilegeMap {
        let mut map = PrivilegeMap::new();
        map.insert(name, definition(kind));
        map
    }

    #[test]
    fn test_nothing_to_expand() {
        let acl = postprocess(&Acl::new(), &privileges("ro", PrivilegeKind::Defacl), &[]).unwrap();
        assert_eq!(acl.len(), 0);
    }

    #[test]
    fn test_default_privileges_expand_per_schema_owner() {
        let acl: Acl = [Grant::new("ro", "alice").on_database("db")].into_iter().collect();
        let db = Database::new("db", "postgres")
            .with_schema(Schema::new("public", ["postgres", "owner"]))
            .with_schema(Schema::new("ns", ["owner"]));

        let expanded = postprocess(&acl, &privileges("ro", PrivilegeKind::Defacl), &[db]).unwrap();

        assert_eq!(expanded.len(), 3);
        let pairs: Vec<(&str, &str)> = expanded
            .iter()
            .map(|g| (g.schema.as_deref().unwrap(), g.owner.as_deref().unwrap()))
            .collect();
        assert_eq!(pairs, vec![("ns", "owner"), ("public", "owner"), ("public", "postgres")]);
    }

    #[test]
    fn test_database_privilege_ignores_schema() {
        let acl: Acl = [Grant::new("__connect__", "alice").on_schema("public")]
            .into_iter()
            .collect();
        let databases = [
            Database::new("app", "postgres").with_schema(Schema::new("public", ["postgres"])),
            Database::new("reporting", "postgres"),
        ];
        let mut map = PrivilegeMap::new();
        map.insert("__connect__", builtins::builtin("__connect__").unwrap());

        let expanded = postprocess(&acl, &map, &databases).unwrap();

        assert_eq!(
            expanded,
            [
                Grant::new("__connect__", "alice").on_database("app"),
                Grant::new("__connect__", "alice").on_database("reporting"),
            ]
            .into_iter()
            .collect::<Acl>()
        );
    }

    #[test]
    fn test_groups_expand_and_duplicates_collapse() {
        let mut map = privileges("usage", PrivilegeKind::Nspacl);
        map.insert_group("ro", vec!["usage".to_string(), "__connect__".to_string()]);
        let acl: Acl = [
            Grant::new("ro", "alice"),
            Grant::new("usage", "alice").on_database("app"),
        ]
        .into_iter()
        .collect();
        let databases =
            [Database::new("app", "postgres").with_schema(Schema::new("public", ["postgres"]))];

        let expanded = postprocess(&acl, &map, &databases).unwrap();

        assert_eq!(
            expanded,
            [
                Grant::new("__connect__", "alice").on_database("app"),
                Grant::new("usage", "alice").on_database("app").on_schema("public"),
            ]
            .into_iter()
            .collect::<Acl>()
        );
    }

    #[test]
    fn test_unknown_database() {
        let acl: Acl = [Grant::new("ro", "alice").on_database("inexistantdb")]
            .into_iter()
            .collect();
        let db = Database::new("db", "postgres").with_schema(Schema::new("public", ["postgres"]));

        let err = postprocess(&acl, &privileges("ro", PrivilegeKind::Nspacl), &[db]).unwrap_err();

        assert!(err.to_string().contains("inexistantdb"));
    }

    #[test]
    fn test_unknown_schema() {
        let acl: Acl = [Grant::new("ro", "alice").on_database("db").on_schema("nope")]
            .into_iter()
            .collect();
        let db = Database::new("db", "postgres");

        let err = postprocess(&acl, &privileges("ro", PrivilegeKind::Nspacl), &[db]).unwrap_err();

        assert!(matches!(err, Error::UnknownSchema { ref schema, .. } if schema == "nope"));
    }

    #[test]
    fn test_unknown_privilege() {
        let acl: Acl = [Grant::new("inexistant", "alice")].into_iter().collect();
        let db =
            Database::new("postgres", "postgres").with_schema(Schema::new("public", ["postgres"]));

        let err = postprocess(&acl, &PrivilegeMap::new(), &[db]).unwrap_err();

        assert!(matches!(err, Error::UnknownPrivilege { .. }));
    }
}
