//! Directory entry type

use std::collections::BTreeMap;

use crate::attributes::AttributeMap;

/// A decoded directory entry
///
/// `children` only holds attributes that triggered a join: each key maps to
/// the entries its values resolved to, in value order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Distinguished name, unique within a directory
    pub dn: String,
    /// Decoded attribute values
    pub attributes: AttributeMap,
    /// Join results keyed by lowercased attribute name
    pub children: BTreeMap<String, Vec<DirectoryEntry>>,
}

impl DirectoryEntry {
    /// Create an entry with no attributes
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: AttributeMap::new(),
            children: BTreeMap::new(),
        }
    }

    /// Builder: add an attribute with its values
    pub fn with_attribute<S: Into<String>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.attributes
            .insert(name, values.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: attach join results for an attribute
    pub fn with_children(mut self, name: &str, children: Vec<DirectoryEntry>) -> Self {
        self.children.insert(AttributeMap::key(name), children);
        self
    }

    /// Values of an attribute, if present
    pub fn attribute(&self, name: &str) -> Option<&[String]> {
        self.attributes.get(name)
    }

    /// Join results for an attribute, if it was joined
    pub fn children(&self, name: &str) -> Option<&[DirectoryEntry]> {
        self.children
            .get(&AttributeMap::key(name))
            .map(Vec::as_slice)
    }
}
