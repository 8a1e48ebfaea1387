//! Case-insensitive attribute storage
//!
//! Directory attribute names compare case-insensitively (`sAMAccountName`
//! and `samaccountname` are the same attribute). [`AttributeMap`] folds keys
//! to lowercase on every access so callers never lowercase ad hoc.

use std::collections::BTreeMap;

/// Attribute name to ordered text values, keyed case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    inner: BTreeMap<String, Vec<String>>,
}

impl AttributeMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an attribute name to its lookup key
    pub fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    /// Append values to an attribute, creating it if needed
    ///
    /// Names differing only by case land in the same attribute.
    pub fn insert(&mut self, name: &str, values: Vec<String>) {
        self.inner.entry(Self::key(name)).or_default().extend(values);
    }

    /// Values of an attribute, if present
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.inner.get(&Self::key(name)).map(Vec::as_slice)
    }

    /// Whether the attribute is present, even with no values
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&Self::key(name))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over (lowercased name, values) in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: AsRef<str>> FromIterator<(K, Vec<String>)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, Vec<String>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, values) in iter {
            map.insert(name.as_ref(), values);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut map = AttributeMap::new();
        map.insert("sAMAccountName", vec!["P".to_string()]);

        assert_eq!(map.get("samaccountname"), Some(&["P".to_string()][..]));
        assert_eq!(map.get("SAMACCOUNTNAME"), Some(&["P".to_string()][..]));
        assert!(map.contains("SamAccountName"));
    }

    #[test]
    fn test_insert_merges_case_variants() {
        let map: AttributeMap = [
            ("cn", vec!["a".to_string()]),
            ("CN", vec!["b".to_string()]),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("cn").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_equality_is_case_insensitive() {
        let a: AttributeMap = [("sAMAccountName", vec!["P".to_string()])]
            .into_iter()
            .collect();
        let b: AttributeMap = [("samaccountname", vec!["P".to_string()])]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_values_still_present() {
        let mut map = AttributeMap::new();
        map.insert("member", Vec::new());
        assert!(map.contains("member"));
        assert_eq!(map.get("member").unwrap().len(), 0);
    }
}
