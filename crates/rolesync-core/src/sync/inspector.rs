//! Collaborator traits

use rolesync_directory::BoxError;

use crate::blacklist::Blacklist;
use crate::change::ChangeOperation;
use crate::privilege::{Acl, Database, PrivilegeMap};
use crate::role::RoleSet;

/// Observed state of the database instance
pub trait Inspector {
    /// Names of the databases to manage
    fn fetch_databases(&self) -> Result<Vec<String>, BoxError>;

    /// Role running the sync and whether it is superuser
    fn fetch_me(&self) -> Result<(String, bool), BoxError>;

    /// Glob patterns of roles never managed
    fn fetch_roles_blacklist(&self) -> Result<Vec<String>, BoxError>;

    /// Every role of the instance, and the roles rolesync manages
    fn fetch_roles(&self) -> Result<(RoleSet, RoleSet), BoxError>;

    /// Drop blacklisted roles from the managed set
    ///
    /// The unfiltered set is kept to resolve memberships and detect
    /// existing roles.
    fn filter_roles(
        &self,
        all: RoleSet,
        mut managed: RoleSet,
        blacklist: &Blacklist,
    ) -> Result<(RoleSet, RoleSet), BoxError> {
        managed.retain(|role| match blacklist.matches(&role.name) {
            Some(pattern) => {
                tracing::debug!(role = %role.name, pattern, "Not managing blacklisted role");
                false
            }
            None => true,
        });
        Ok((all, managed))
    }

    /// Schemas and their owners, per database
    fn fetch_schemas(&self, databases: &[String]) -> Result<Vec<Database>, BoxError>;

    /// Current grants of `privileges` to `roles`
    fn fetch_grants(
        &self,
        databases: &[Database],
        privileges: &PrivilegeMap,
        roles: &RoleSet,
    ) -> Result<Acl, BoxError>;
}

/// Applies change operations
pub trait Executor {
    /// Execute one operation, returning the affected row count
    fn execute(&self, operation: &ChangeOperation) -> Result<u64, BoxError>;
}
