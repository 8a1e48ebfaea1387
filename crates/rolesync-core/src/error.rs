//! Error types for rolesync-core

use rolesync_directory::BoxError;

use crate::format::FormatError;
use crate::rules::CommentError;

/// Result type for rolesync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure of a reconciliation pass
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two rules define the same role with different options
    #[error("Role {name} is defined with conflicting options: {first} vs {second}")]
    RoleConflict {
        name: String,
        first: String,
        second: String,
    },

    #[error("Unknown privilege {name}")]
    UnknownPrivilege { name: String },

    #[error("Unknown database {name}")]
    UnknownDatabase { name: String },

    #[error("Unknown schema {schema} in database {database}")]
    UnknownSchema { database: String, schema: String },

    /// A plain attribute requested by a template is absent
    #[error("Missing attribute: {name} on {dn}")]
    MissingAttribute { dn: String, name: String },

    /// A value expected to be a DN is unusable and the policy is `fail`
    #[error("Unexpected DN {value:?} in attribute {attribute}: {reason}")]
    UnexpectedDn {
        attribute: String,
        value: String,
        reason: String,
    },

    /// Rule expansion failed for a given item, rule and entry
    #[error("Failed to expand {context}: {source}")]
    Expansion {
        context: String,
        #[source]
        source: CommentError,
    },

    /// A wanted role is member of a role that exists nowhere
    #[error("Role {role} is member of unknown role {parent}")]
    Membership { role: String, parent: String },

    #[error("Invalid blacklist pattern {pattern:?}: {source}")]
    BlacklistPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A sync map item has a directory search but no directory is available
    #[error("{item} queries the directory but no directory is configured")]
    NoDirectory { item: String },

    /// The database inspector or the executor failed
    #[error("{operation} failed: {source}")]
    Collaborator {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Directory(#[from] rolesync_directory::Error),

    #[error(transparent)]
    Config(#[from] rolesync_meta::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl Error {
    /// Wrap a collaborator failure
    pub fn collaborator(operation: &'static str, source: BoxError) -> Self {
        Self::Collaborator { operation, source }
    }
}
