//! SyncManager implementation

use rolesync_directory::DirectoryClient;
use rolesync_meta::SyncItem;

use super::inspector::{Executor, Inspector};
use crate::blacklist::Blacklist;
use crate::change::ChangeOperation;
use crate::inspect::Inspection;
use crate::privilege::{PrivilegeMap, postprocess};
use crate::role;
use crate::{Error, Result};

/// Options for sync operations
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// If true, compute and log changes without executing them.
    /// Operations are logged as "[dry-run] Would ..."
    pub dry_run: bool,
}

/// Orchestrates one reconciliation pass
///
/// The pass runs in this order:
/// 1. fetch databases, running role, blacklist and roles from the inspector
/// 2. inspect the sync map into wanted roles and grants
/// 3. diff and apply roles
/// 4. when privileges are configured, fetch schemas and grants, expand
///    wanted grants, diff and apply them
pub struct SyncManager<'a> {
    inspector: &'a dyn Inspector,
    executor: &'a dyn Executor,
    directory: Option<&'a dyn DirectoryClient>,
    privileges: PrivilegeMap,
    options: SyncOptions,
}

impl<'a> SyncManager<'a> {
    pub fn new(inspector: &'a dyn Inspector, executor: &'a dyn Executor) -> Self {
        Self {
            inspector,
            executor,
            directory: None,
            privileges: PrivilegeMap::new(),
            options: SyncOptions::default(),
        }
    }

    pub fn with_directory(mut self, directory: &'a dyn DirectoryClient) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn with_privileges(mut self, privileges: PrivilegeMap) -> Self {
        self.privileges = privileges;
        self
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the pass and return the number of operations applied
    ///
    /// In dry-run mode nothing is executed and the count is the number of
    /// operations that would have been applied.
    pub fn sync(&self, sync_map: &[SyncItem]) -> Result<usize> {
        let inspector = self.inspector;
        let databases = inspector
            .fetch_databases()
            .map_err(|e| Error::collaborator("fetch_databases", e))?;
        let (me, superuser) = inspector
            .fetch_me()
            .map_err(|e| Error::collaborator("fetch_me", e))?;
        if !superuser {
            tracing::warn!(role = %me, "Running as a role without superuser privileges");
        }

        let mut blacklist = Blacklist::new(
            inspector
                .fetch_roles_blacklist()
                .map_err(|e| Error::collaborator("fetch_roles_blacklist", e))?,
        )?;
        blacklist.push(&me)?;

        let (all, managed) = inspector
            .fetch_roles()
            .map_err(|e| Error::collaborator("fetch_roles", e))?;
        let (all, managed) = inspector
            .filter_roles(all, managed, &blacklist)
            .map_err(|e| Error::collaborator("filter_roles", e))?;
        tracing::debug!(existing = all.len(), managed = managed.len(), "Inspected roles");

        let (wanted_roles, wanted_acl) =
            Inspection::new(self.directory, &blacklist).run(sync_map)?;
        wanted_roles.resolve_membership(&all)?;

        let operations = role::diff(&all, &managed, &wanted_roles, &databases, &me);
        let mut count = self.apply(&operations)?;

        if self.privileges.is_empty() {
            tracing::debug!("No privileges configured, skipping grants");
            return Ok(count);
        }

        // Dropped roles lose their privileges with DROP OWNED.
        let mut revocable = managed;
        revocable.retain(|role| wanted_roles.contains(&role.name));

        let schemas = inspector
            .fetch_schemas(&databases)
            .map_err(|e| Error::collaborator("fetch_schemas", e))?;
        let wanted = postprocess(&wanted_acl, &self.privileges, &schemas)?;

        // Existing grantees of wanted grants are inspected even when unmanaged.
        let mut grantees = all;
        grantees.retain(|role| {
            revocable.contains(&role.name) || wanted.iter().any(|grant| grant.role == role.name)
        });
        let current = inspector
            .fetch_grants(&schemas, &self.privileges, &grantees)
            .map_err(|e| Error::collaborator("fetch_grants", e))?;
        let operations = current.diff(&wanted, &self.privileges, &revocable)?;
        count += self.apply(&operations)?;

        Ok(count)
    }

    fn apply(&self, operations: &[ChangeOperation]) -> Result<usize> {
        for operation in operations {
            if self.options.dry_run {
                tracing::info!("[dry-run] Would {}", lowercase_first(&operation.description));
                tracing::debug!(
                    statement = %operation.statement,
                    dbname = ?operation.dbname,
                    "Skipped statement"
                );
                continue;
            }
            tracing::info!("{}", operation.description);
            let rows = self
                .executor
                .execute(operation)
                .map_err(|e| Error::collaborator("execute", e))?;
            tracing::debug!(statement = %operation.statement, rows, "Executed statement");
        }
        Ok(operations.len())
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_first() {
        assert_eq!(lowercase_first("Create role Alice"), "create role Alice");
        assert_eq!(lowercase_first(""), "");
    }
}
