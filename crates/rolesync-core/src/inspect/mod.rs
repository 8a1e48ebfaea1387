//! Inspection Pipeline
//!
//! Runs every sync map item: query the directory, project each entry, expand
//! each rule and accumulate the results into one wanted [`RoleSet`] and one
//! wanted [`Acl`]. Any failure aborts the whole inspection.

mod accumulator;

pub use accumulator::Accumulator;

use rolesync_directory::{AttributeMap, DirectoryClient, Join, Search, query};
use rolesync_meta::SyncItem;

use crate::blacklist::Blacklist;
use crate::privilege::Acl;
use crate::role::RoleSet;
use crate::rules::{Generated, Rule};
use crate::vars::{AttributesMap, FieldTree, Variables, project};
use crate::{Error, Result};

/// Inspection of the wanted state
pub struct Inspection<'a> {
    directory: Option<&'a dyn DirectoryClient>,
    blacklist: &'a Blacklist,
}

impl<'a> Inspection<'a> {
    pub fn new(directory: Option<&'a dyn DirectoryClient>, blacklist: &'a Blacklist) -> Self {
        Self {
            directory,
            blacklist,
        }
    }

    /// Generate wanted roles and grants from the sync map
    pub fn run(&self, sync_map: &[SyncItem]) -> Result<(RoleSet, Acl)> {
        let mut accumulator = Accumulator::new(self.blacklist);
        for (index, item) in sync_map.iter().enumerate() {
            let label = item.label(index);
            let rules = Rule::compile(item)?;

            let Some(ldap) = &item.ldapsearch else {
                tracing::debug!(item = %label, "Expanding static rules");
                let vars = Variables::new();
                for rule in &rules {
                    self.apply(&mut accumulator, &label, rule, &vars, None)?;
                }
                continue;
            };

            let directory = self
                .directory
                .ok_or_else(|| Error::NoDirectory { item: label.clone() })?;
            let mut map = AttributesMap::new();
            for rule in &rules {
                map.merge(&rule.attributes_map());
            }
            let search = with_template_attributes(&ldap.search, &map);

            tracing::info!(
                item = %label,
                base = %search.base,
                filter = %search.filter,
                "Querying directory"
            );
            let entries = query(directory, &search)?;
            tracing::debug!(item = %label, count = entries.len(), "Directory returned entries");

            for entry in &entries {
                let vars = project(entry, &map, ldap.on_unexpected_dn)?;
                for rule in &rules {
                    self.apply(&mut accumulator, &label, rule, &vars, Some(&entry.dn))?;
                }
            }
        }

        let (roles, acl) = accumulator.finish();
        tracing::debug!(roles = roles.len(), grants = acl.len(), "Inspected wanted state");
        Ok((roles, acl))
    }

    fn apply(
        &self,
        accumulator: &mut Accumulator<'_>,
        label: &str,
        rule: &Rule,
        vars: &Variables,
        dn: Option<&str>,
    ) -> Result<()> {
        let generated = rule.expand(vars).map_err(|source| Error::Expansion {
            context: match dn {
                Some(dn) => format!("{} of {} for entry {}", rule, label, dn),
                None => format!("{} of {}", rule, label),
            },
            source,
        })?;
        match generated {
            Generated::Roles(roles) => {
                for role in roles {
                    accumulator.add_role(role)?;
                }
            }
            Generated::Grants(grants) => {
                for grant in grants {
                    accumulator.add_grant(grant);
                }
            }
        }
        Ok(())
    }
}

/// Add the attributes read by templates and joins to a search
///
/// An empty attribute list already requests everything and stays empty.
fn with_template_attributes(search: &Search, map: &AttributesMap) -> Search {
    let mut search = search.clone();
    if !search.attributes.is_empty() {
        let joined: Vec<String> = search.joins.keys().cloned().collect();
        extend_unique(&mut search.attributes, joined);
        extend_unique(&mut search.attributes, map.entry_attributes());
    }
    for (attribute, join) in search.joins.iter_mut() {
        extend_join(join, map.get(attribute));
    }
    search
}

fn extend_join(join: &mut Join, tree: Option<&FieldTree>) {
    if !join.attributes.is_empty() {
        let joined: Vec<String> = join.joins.keys().cloned().collect();
        extend_unique(&mut join.attributes, joined);
        if let Some(tree) = tree {
            extend_unique(&mut join.attributes, tree.attributes());
        }
    }
    for (attribute, nested) in join.joins.iter_mut() {
        extend_join(nested, tree.and_then(|t| t.get(&AttributeMap::key(attribute))));
    }
}

fn extend_unique(attributes: &mut Vec<String>, extra: impl IntoIterator<Item = String>) {
    for name in extra {
        if !attributes.iter().any(|a| a.eq_ignore_ascii_case(&name)) {
            attributes.push(name);
        }
    }
}
