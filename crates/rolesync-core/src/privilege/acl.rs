//! Access control lists and their diff

use std::collections::BTreeSet;

use rolesync_meta::PrivilegeDefinition;

use super::{Grant, PrivilegeMap};
use crate::change::{ChangeOperation, quote_ident};
use crate::role::RoleSet;
use crate::{Error, Result};

/// An ordered, deduplicated set of grants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acl {
    grants: BTreeSet<Grant>,
}

impl Acl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a grant; returns false if it was already present
    pub fn insert(&mut self, grant: Grant) -> bool {
        self.grants.insert(grant)
    }

    pub fn contains(&self, grant: &Grant) -> bool {
        self.grants.contains(grant)
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grant> {
        self.grants.iter()
    }

    /// Operations turning `self` (observed) into `wanted`
    ///
    /// Revokes come first and only touch grants to `managed` roles. Both
    /// ACLs must be postprocessed so that grants compare field by field.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownPrivilege`] when a grant names a privilege missing
    /// from `privileges`.
    pub fn diff(
        &self,
        wanted: &Acl,
        privileges: &PrivilegeMap,
        managed: &RoleSet,
    ) -> Result<Vec<ChangeOperation>> {
        let mut operations = Vec::new();
        for grant in self.grants.difference(&wanted.grants) {
            if !managed.contains(&grant.role) {
                tracing::debug!(%grant, "Keeping grant to unmanaged role");
                continue;
            }
            let definition = definition(privileges, grant)?;
            operations.push(operation(
                format!("Revoke {}", grant),
                grant,
                &definition.revoke,
            ));
        }
        for grant in wanted.grants.difference(&self.grants) {
            let definition = definition(privileges, grant)?;
            operations.push(operation(format!("Grant {}", grant), grant, &definition.grant));
        }
        Ok(operations)
    }
}

impl FromIterator<Grant> for Acl {
    fn from_iter<I: IntoIterator<Item = Grant>>(iter: I) -> Self {
        Self {
            grants: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Acl {
    type Item = &'a Grant;
    type IntoIter = std::collections::btree_set::Iter<'a, Grant>;

    fn into_iter(self) -> Self::IntoIter {
        self.grants.iter()
    }
}

fn definition(privileges: &PrivilegeMap, grant: &Grant) -> Result<PrivilegeDefinition> {
    privileges.get(&grant.privilege).ok_or_else(|| Error::UnknownPrivilege {
        name: grant.privilege.clone(),
    })
}

/// Substitute the grant fields into a privilege SQL template
fn render(template: &str, grant: &Grant) -> String {
    let quoted = |value: &Option<String>| value.as_deref().map(quote_ident).unwrap_or_default();
    template
        .replace("{database}", &quoted(&grant.dbname))
        .replace("{schema}", &quoted(&grant.schema))
        .replace("{owner}", &quoted(&grant.owner))
        .replace("{role}", &quote_ident(&grant.role))
}

fn operation(description: String, grant: &Grant, template: &str) -> ChangeOperation {
    let mut params = vec![grant.privilege.clone(), grant.role.clone()];
    params.extend(grant.dbname.iter().cloned());
    params.extend(grant.schema.iter().cloned());
    params.extend(grant.owner.iter().cloned());
    ChangeOperation::new(description, render(template, grant))
        .with_params(params)
        .on_database(grant.dbname.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use pretty_assertions::assert_eq;
    use rolesync_meta::builtins;

    fn privileges() -> PrivilegeMap {
        let mut map = PrivilegeMap::new();
        for name in ["__connect__", "__usage_on_schemas__", "__default_select_on_tables__"] {
            map.insert(name, builtins::builtin(name).unwrap());
        }
        map
    }

    #[test]
    fn test_diff_revokes_then_grants() {
        let observed: Acl = [
            Grant::new("__connect__", "alice").on_database("app"),
            Grant::new("__connect__", "legacy").on_database("app"),
            Grant::new("__connect__", "pg_monitor").on_database("app"),
        ]
        .into_iter()
        .collect();
        let wanted: Acl = [
            Grant::new("__connect__", "alice").on_database("app"),
            Grant::new("__usage_on_schemas__", "alice")
                .on_database("app")
                .on_schema("public"),
            Grant::new("__default_select_on_tables__", "alice")
                .on_database("app")
                .on_schema("public")
                .for_owner("etl"),
        ]
        .into_iter()
        .collect();
        let managed = RoleSet::from_roles([Role::new("alice"), Role::new("legacy")]).unwrap();

        let operations = observed.diff(&wanted, &privileges(), &managed).unwrap();

        let statements: Vec<&str> = operations.iter().map(|op| op.statement.as_str()).collect();
        assert_eq!(
            statements,
            vec![
                "REVOKE CONNECT ON DATABASE \"app\" FROM \"legacy\";",
                "ALTER DEFAULT PRIVILEGES FOR ROLE \"etl\" IN SCHEMA \"public\" GRANT SELECT ON TABLES TO \"alice\";",
                "GRANT USAGE ON SCHEMA \"public\" TO \"alice\";",
            ]
        );
        assert_eq!(operations[0].description, "Revoke __connect__ on app to legacy");
        assert!(operations.iter().all(|op| op.dbname.as_deref() == Some("app")));
    }

    #[test]
    fn test_diff_unknown_privilege() {
        let wanted: Acl = [Grant::new("ghost", "alice").on_database("app")].into_iter().collect();
        let err = Acl::new()
            .diff(&wanted, &PrivilegeMap::new(), &RoleSet::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownPrivilege { ref name } if name == "ghost"));
    }
}
