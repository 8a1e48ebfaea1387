//! Error types for rolesync-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No configuration file found")]
    ConfigNotFound,

    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Unsupported configuration version {version}, expected {expected}")]
    UnsupportedVersion { version: u32, expected: u32 },

    #[error("Invalid on_unexpected_dn policy {value:?}: expected fail, warn or ignore")]
    InvalidPolicy { value: String },

    #[error("Invalid role option {option:?}: {reason}")]
    InvalidRoleOption { option: String, reason: String },
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
