//! Error types for rolesync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from rolesync-core
    #[error(transparent)]
    Core(#[from] rolesync_core::Error),

    /// Error from rolesync-meta
    #[error(transparent)]
    Config(#[from] rolesync_meta::Error),

    /// Malformed state or directory file
    #[error("Failed to parse {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
