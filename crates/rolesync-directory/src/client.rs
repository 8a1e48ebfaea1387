//! Directory client abstraction
//!
//! The transport (LDAP connection, bind, paging) lives outside this crate.
//! Anything able to run a synchronous search implements [`DirectoryClient`].

use std::fmt;

use serde::Deserialize;

/// Opaque error raised by collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Search scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The base entry only
    Base,
    /// Direct children of the base
    #[serde(alias = "onelevel")]
    One,
    /// The base and its whole subtree
    #[default]
    #[serde(alias = "subtree")]
    Sub,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Base => write!(f, "base"),
            Scope::One => write!(f, "one"),
            Scope::Sub => write!(f, "sub"),
        }
    }
}

/// One row of a search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRow {
    /// A matched entry with raw attribute values
    Entry {
        dn: String,
        attributes: Vec<(String, Vec<Vec<u8>>)>,
    },
    /// A continuation reference or referral, carrying no entry
    Reference { uris: Vec<String> },
}

impl SearchRow {
    /// Build an entry row from text values
    pub fn entry<N, V>(
        dn: impl Into<String>,
        attributes: impl IntoIterator<Item = (N, Vec<V>)>,
    ) -> Self
    where
        N: Into<String>,
        V: Into<Vec<u8>>,
    {
        Self::Entry {
            dn: dn.into(),
            attributes: attributes
                .into_iter()
                .map(|(name, values)| (name.into(), values.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }
}

/// Synchronous directory search capability
pub trait DirectoryClient {
    /// Run one search and return its rows in server order
    ///
    /// An empty `attributes` list requests every attribute.
    fn search(
        &self,
        base: &str,
        scope: Scope,
        filter: &str,
        attributes: &[String],
    ) -> std::result::Result<Vec<SearchRow>, BoxError>;
}

impl<T: DirectoryClient + ?Sized> DirectoryClient for &T {
    fn search(
        &self,
        base: &str,
        scope: Scope,
        filter: &str,
        attributes: &[String],
    ) -> std::result::Result<Vec<SearchRow>, BoxError> {
        (**self).search(base, scope, filter, attributes)
    }
}
