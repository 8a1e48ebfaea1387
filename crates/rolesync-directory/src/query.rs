//! Directory Query Engine
//!
//! Runs a [`Search`] through a [`DirectoryClient`], decodes the rows into
//! [`DirectoryEntry`] values and resolves joins: for a joined attribute,
//! every value is searched as a base DN and the resulting entries are
//! attached to the parent as `children[attribute]`.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::attributes::AttributeMap;
use crate::client::{DirectoryClient, Scope, SearchRow};
use crate::entry::DirectoryEntry;
use crate::{Error, Result};

fn default_filter() -> String {
    "(objectClass=*)".to_string()
}

fn default_join_scope() -> Scope {
    Scope::Base
}

/// A directory search with optional joins
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Search {
    /// Base DN of the search
    #[serde(default)]
    pub base: String,
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub scope: Scope,
    /// Attributes to request; empty requests all
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Joins keyed by the attribute whose values are DNs to resolve
    #[serde(default)]
    pub joins: BTreeMap<String, Join>,
    /// Attributes that may be absent from result entries
    #[serde(default)]
    pub allow_missing_attributes: Vec<String>,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            base: String::new(),
            filter: default_filter(),
            scope: Scope::default(),
            attributes: Vec::new(),
            joins: BTreeMap::new(),
            allow_missing_attributes: Vec::new(),
        }
    }
}

impl Search {
    /// Whether `name` is allowed to be missing (case-insensitive)
    pub fn allows_missing(&self, name: &str) -> bool {
        self.allow_missing_attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Sub-search run for each value of a joined attribute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Join {
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default = "default_join_scope")]
    pub scope: Scope,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub joins: BTreeMap<String, Join>,
    #[serde(default)]
    pub allow_missing_attributes: Vec<String>,
}

impl Default for Join {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            scope: default_join_scope(),
            attributes: Vec::new(),
            joins: BTreeMap::new(),
            allow_missing_attributes: Vec::new(),
        }
    }
}

impl Join {
    /// The search resolving one joined value
    pub fn search_for(&self, value: &str) -> Search {
        Search {
            base: value.to_string(),
            filter: self.filter.clone(),
            scope: self.scope,
            attributes: self.attributes.clone(),
            joins: self.joins.clone(),
            allow_missing_attributes: self.allow_missing_attributes.clone(),
        }
    }
}

/// Execute a search and resolve its joins
///
/// Searches run one at a time in a deterministic order: the main search,
/// then for each join (in attribute name order) one sub-search per distinct
/// value, in first-seen order.
///
/// # Errors
///
/// - [`Error::Search`] when the client fails
/// - [`Error::Decode`] when any value is not UTF-8
/// - [`Error::MissingAttribute`] when a joined attribute is absent and not
///   listed in `allow_missing_attributes`
pub fn query(client: &dyn DirectoryClient, search: &Search) -> Result<Vec<DirectoryEntry>> {
    tracing::debug!(
        base = %search.base,
        filter = %search.filter,
        scope = %search.scope,
        attributes = ?search.attributes,
        "Searching directory"
    );

    let rows = client
        .search(&search.base, search.scope, &search.filter, &search.attributes)
        .map_err(|e| Error::Search {
            base: search.base.clone(),
            filter: search.filter.clone(),
            message: e.to_string(),
        })?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        let (dn, attributes) = match row {
            SearchRow::Entry { dn, attributes } => (dn, attributes),
            SearchRow::Reference { uris } => {
                tracing::debug!(?uris, "Skipping search reference");
                continue;
            }
        };
        let mut entry = decode_entry(dn, attributes)?;
        for name in &search.allow_missing_attributes {
            if !entry.attributes.contains(name) {
                entry.attributes.insert(name, Vec::new());
            }
        }
        entries.push(entry);
    }

    resolve_joins(client, search, entries)
}

fn decode_entry(dn: String, raw: Vec<(String, Vec<Vec<u8>>)>) -> Result<DirectoryEntry> {
    let mut attributes = AttributeMap::new();
    for (name, values) in raw {
        let decoded = values
            .into_iter()
            .map(String::from_utf8)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::Decode {
                dn: dn.clone(),
                attribute: name.clone(),
            })?;
        attributes.insert(&name, decoded);
    }
    Ok(DirectoryEntry {
        dn,
        attributes,
        children: BTreeMap::new(),
    })
}

fn resolve_joins(
    client: &dyn DirectoryClient,
    search: &Search,
    entries: Vec<DirectoryEntry>,
) -> Result<Vec<DirectoryEntry>> {
    if search.joins.is_empty() {
        return Ok(entries);
    }

    // Join attribute -> value -> resolved entries.
    let mut resolved: BTreeMap<&str, HashMap<String, Vec<DirectoryEntry>>> = BTreeMap::new();
    for (attribute, join) in &search.joins {
        let cache = resolved.entry(attribute.as_str()).or_default();
        for entry in &entries {
            let Some(values) = entry.attribute(attribute) else {
                if search.allows_missing(attribute) {
                    continue;
                }
                return Err(Error::MissingAttribute {
                    dn: entry.dn.clone(),
                    name: attribute.clone(),
                });
            };
            for value in values {
                if !cache.contains_key(value) {
                    let children = query(client, &join.search_for(value))?;
                    cache.insert(value.clone(), children);
                }
            }
        }
    }

    let joined = entries
        .into_iter()
        .map(|entry| {
            let mut children = entry.children.clone();
            for (attribute, cache) in &resolved {
                let found: Vec<DirectoryEntry> = entry
                    .attribute(attribute)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|value| cache.get(value))
                    .flatten()
                    .cloned()
                    .collect();
                if found.is_empty() && !search.allows_missing(attribute) {
                    tracing::debug!(dn = %entry.dn, attribute, "Join matched no entry");
                    continue;
                }
                children.insert(AttributeMap::key(attribute), found);
            }
            DirectoryEntry { children, ..entry }
        })
        .collect();
    Ok(joined)
}
