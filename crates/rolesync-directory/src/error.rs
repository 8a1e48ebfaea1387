//! Error types for rolesync-directory

/// Result type for directory operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying or decoding directory data
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The directory client rejected or failed a search
    #[error("Directory search failed on {base:?} with filter {filter}: {message}")]
    Search {
        base: String,
        filter: String,
        message: String,
    },

    /// An attribute value is not valid UTF-8 text
    #[error("Failed to decode attribute {attribute} of {dn} as UTF-8")]
    Decode { dn: String, attribute: String },

    /// A joined attribute is absent and not allowed to be missing
    #[error("Missing attribute {name} on entry {dn}")]
    MissingAttribute { dn: String, name: String },

    /// A distinguished name could not be parsed
    #[error("Invalid DN {dn:?}: {reason}")]
    InvalidDn { dn: String, reason: String },

    /// A search filter could not be parsed
    #[error("Invalid filter {filter:?}: {reason}")]
    InvalidFilter { filter: String, reason: String },
}

impl Error {
    pub(crate) fn invalid_dn(dn: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDn {
            dn: dn.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_filter(filter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            filter: filter.to_string(),
            reason: reason.into(),
        }
    }
}
