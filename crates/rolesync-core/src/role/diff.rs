//! Role diff
//!
//! Operations come out in a fixed order: creations, alterations, membership
//! changes, then drops. Dropping a role first reassigns and drops what it
//! owns in every database.

use super::{Role, RoleSet};
use crate::change::{ChangeOperation, quote_ident, quote_literal};

/// Operations turning the observed roles into `wanted`
///
/// - `existing`: every role of the instance, blacklisted ones included
/// - `managed`: roles rolesync may alter or drop
/// - `databases`: databases where dropped roles may own objects
/// - `me`: role receiving objects of dropped roles
pub fn diff(
    existing: &RoleSet,
    managed: &RoleSet,
    wanted: &RoleSet,
    databases: &[String],
    me: &str,
) -> Vec<ChangeOperation> {
    let mut creates = Vec::new();
    let mut alters = Vec::new();
    let mut memberships = Vec::new();

    for role in wanted {
        let current = existing.get(&role.name);
        match current {
            None => creates.extend(create(role)),
            Some(current) => alters.extend(alter(role, current)),
        }

        let current_parents = current.map(|c| c.parents.clone()).unwrap_or_default();
        for parent in role.parents.difference(&current_parents) {
            memberships.push(
                ChangeOperation::new(
                    format!("Add {} to group {}", role.name, parent),
                    format!("GRANT {} TO {};", quote_ident(parent), quote_ident(&role.name)),
                )
                .with_params([parent.as_str(), role.name.as_str()]),
            );
        }
        for parent in current_parents.difference(&role.parents) {
            if !managed.contains(parent) && !wanted.contains(parent) {
                tracing::debug!(role = %role.name, parent, "Keeping membership to unmanaged group");
                continue;
            }
            memberships.push(
                ChangeOperation::new(
                    format!("Remove {} from group {}", role.name, parent),
                    format!("REVOKE {} FROM {};", quote_ident(parent), quote_ident(&role.name)),
                )
                .with_params([parent.as_str(), role.name.as_str()]),
            );
        }
    }

    let mut drops = Vec::new();
    for role in managed.iter().filter(|role| !wanted.contains(&role.name)) {
        drops.extend(drop_role(role, databases, me));
    }

    let mut operations = creates;
    operations.extend(alters);
    operations.extend(memberships);
    operations.extend(drops);
    operations
}

fn comment(role: &Role, text: &str) -> ChangeOperation {
    ChangeOperation::new(
        format!("Set comment on role {}", role.name),
        format!(
            "COMMENT ON ROLE {} IS {};",
            quote_ident(&role.name),
            quote_literal(text)
        ),
    )
    .with_params([role.name.as_str(), text])
}

fn create(role: &Role) -> Vec<ChangeOperation> {
    let mut operations = vec![
        ChangeOperation::new(
            format!("Create role {}", role.name),
            format!(
                "CREATE ROLE {} WITH {};",
                quote_ident(&role.name),
                role.options.to_sql()
            ),
        )
        .with_params([role.name.as_str()]),
    ];
    if let Some(text) = &role.comment {
        operations.push(comment(role, text));
    }
    operations
}

fn alter(role: &Role, current: &Role) -> Vec<ChangeOperation> {
    let mut operations = Vec::new();
    let tokens = role.options.diff(&current.options);
    if !tokens.is_empty() {
        operations.push(
            ChangeOperation::new(
                format!("Update options of role {}", role.name),
                format!(
                    "ALTER ROLE {} WITH {};",
                    quote_ident(&role.name),
                    tokens.join(" ")
                ),
            )
            .with_params([role.name.as_str()]),
        );
    }
    if let Some(text) = &role.comment {
        if current.comment.as_deref() != Some(text.as_str()) {
            operations.push(comment(role, text));
        }
    }
    operations
}

fn drop_role(role: &Role, databases: &[String], me: &str) -> Vec<ChangeOperation> {
    let name = quote_ident(&role.name);
    let mut operations = Vec::new();
    for database in databases {
        operations.push(
            ChangeOperation::new(
                format!("Reassign objects of {} to {} in {}", role.name, me, database),
                format!("REASSIGN OWNED BY {} TO {};", name, quote_ident(me)),
            )
            .with_params([role.name.as_str(), me, database.as_str()])
            .on_database(Some(database)),
        );
        operations.push(
            ChangeOperation::new(
                format!("Drop objects of {} in {}", role.name, database),
                format!("DROP OWNED BY {};", name),
            )
            .with_params([role.name.as_str(), database.as_str()])
            .on_database(Some(database)),
        );
    }
    operations.push(
        ChangeOperation::new(
            format!("Drop role {}", role.name),
            format!("DROP ROLE {};", name),
        )
        .with_params([role.name.as_str()]),
    );
    operations
}
