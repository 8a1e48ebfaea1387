//! In-memory directory
//!
//! Serves searches from a fixed list of entries. Backs offline planning from
//! a directory snapshot and tests that need real filter/scope semantics.

use crate::client::{BoxError, DirectoryClient, Scope, SearchRow};
use crate::dn::Dn;
use crate::entry::DirectoryEntry;
use crate::filter::Filter;

/// A directory held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    entries: Vec<DirectoryEntry>,
}

impl MemoryDirectory {
    /// Create a directory from entries
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }

    /// Add an entry
    pub fn push(&mut self, entry: DirectoryEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn in_scope(dn: &Dn, base: &Dn, scope: Scope) -> bool {
        match (scope, dn.depth_below(base)) {
            (_, None) => false,
            (Scope::Base, Some(depth)) => depth == 0,
            (Scope::One, Some(depth)) => depth == 1,
            (Scope::Sub, Some(_)) => true,
        }
    }
}

impl FromIterator<DirectoryEntry> for MemoryDirectory {
    fn from_iter<I: IntoIterator<Item = DirectoryEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl DirectoryClient for MemoryDirectory {
    /// Entries whose DN is not parseable are never returned. A base that
    /// matches nothing yields an empty result rather than an error.
    fn search(
        &self,
        base: &str,
        scope: Scope,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<SearchRow>, BoxError> {
        let base = Dn::parse(base)?;
        let filter = Filter::parse(filter)?;
        let all = attributes.is_empty() || attributes.iter().any(|a| a == "*");

        let mut rows = Vec::new();
        for entry in &self.entries {
            let Ok(dn) = Dn::parse(&entry.dn) else {
                continue;
            };
            if !Self::in_scope(&dn, &base, scope) || !filter.matches(entry) {
                continue;
            }
            let selected = entry
                .attributes
                .iter()
                .filter(|(name, _)| all || attributes.iter().any(|a| a.eq_ignore_ascii_case(name)))
                .map(|(name, values)| {
                    (
                        name.to_string(),
                        values.iter().map(|v| v.as_bytes().to_vec()).collect(),
                    )
                })
                .collect();
            rows.push(SearchRow::Entry {
                dn: entry.dn.clone(),
                attributes: selected,
            });
        }
        tracing::debug!(base = %base, %scope, count = rows.len(), "Memory directory search");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn directory() -> MemoryDirectory {
        [
            DirectoryEntry::new("ou=people,dc=acme").with_attribute("ou", ["people"]),
            DirectoryEntry::new("cn=alice,ou=people,dc=acme")
                .with_attribute("objectClass", ["person"])
                .with_attribute("cn", ["alice"])
                .with_attribute("mail", ["alice@acme.tld"]),
            DirectoryEntry::new("cn=bob,ou=staff,ou=people,dc=acme")
                .with_attribute("objectClass", ["person"])
                .with_attribute("cn", ["bob"]),
            DirectoryEntry::new("cn=admins,ou=groups,dc=acme")
                .with_attribute("objectClass", ["groupOfNames"])
                .with_attribute("cn", ["admins"]),
        ]
        .into_iter()
        .collect()
    }

    fn dns(rows: &[SearchRow]) -> Vec<&str> {
        rows.iter()
            .filter_map(|row| match row {
                SearchRow::Entry { dn, .. } => Some(dn.as_str()),
                SearchRow::Reference { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_scopes() {
        let dir = directory();
        let sub = dir
            .search("ou=people,dc=acme", Scope::Sub, "(objectClass=person)", &[])
            .unwrap();
        assert_eq!(
            dns(&sub),
            vec!["cn=alice,ou=people,dc=acme", "cn=bob,ou=staff,ou=people,dc=acme"]
        );

        let one = dir
            .search("ou=people,dc=acme", Scope::One, "(objectClass=*)", &[])
            .unwrap();
        assert_eq!(dns(&one), vec!["cn=alice,ou=people,dc=acme"]);

        let base = dir
            .search("CN=Alice,OU=People,DC=acme", Scope::Base, "(objectClass=*)", &[])
            .unwrap();
        assert_eq!(dns(&base), vec!["cn=alice,ou=people,dc=acme"]);
    }

    #[test]
    fn test_attribute_selection() {
        let dir = directory();
        let rows = dir
            .search(
                "cn=alice,ou=people,dc=acme",
                Scope::Base,
                "(cn=alice)",
                &["MAIL".to_string()],
            )
            .unwrap();
        assert_eq!(
            rows,
            vec![SearchRow::entry(
                "cn=alice,ou=people,dc=acme",
                [("mail", vec!["alice@acme.tld"])]
            )]
        );
    }

    #[test]
    fn test_bad_filter_is_an_error() {
        let err = directory()
            .search("dc=acme", Scope::Sub, "(broken", &[])
            .unwrap_err();
        assert!(err.to_string().contains("(broken"));
    }

    #[test]
    fn test_unknown_base_is_empty() {
        let rows = directory()
            .search("ou=nowhere,dc=acme", Scope::Sub, "(objectClass=*)", &[])
            .unwrap();
        assert!(rows.is_empty());
    }
}
