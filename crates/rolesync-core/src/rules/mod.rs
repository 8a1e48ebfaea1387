//! Rule Expansion Engine
//!
//! Rules are compiled from sync map specs once, then expanded for every
//! directory entry (or once, with no variables, for static items).

mod grant;
mod role;

pub use grant::GrantRule;
pub use role::RoleRule;

use std::fmt;

use rolesync_meta::SyncItem;

use crate::Result;
use crate::privilege::Grant;
use crate::role::Role;
use crate::vars::{AttributesMap, Variables};

/// A comment template did not produce one comment per role
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("comment {template:?} generated {comments} values for {names} roles")]
pub struct CommentError {
    pub template: String,
    pub comments: usize,
    pub names: usize,
}

/// Objects produced by one rule expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    Roles(Vec<Role>),
    Grants(Vec<Grant>),
}

/// A role or grant rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Role(RoleRule),
    Grant(GrantRule),
}

impl Rule {
    /// Compile the rules of a sync map item, roles first
    pub fn compile(item: &SyncItem) -> Result<Vec<Rule>> {
        let mut rules = Vec::with_capacity(item.roles.len() + item.grant.len());
        for spec in &item.roles {
            rules.push(Rule::Role(RoleRule::from_spec(spec)?));
        }
        for spec in &item.grant {
            rules.push(Rule::Grant(GrantRule::from_spec(spec)?));
        }
        Ok(rules)
    }

    /// Fields the rule templates read
    pub fn attributes_map(&self) -> AttributesMap {
        match self {
            Rule::Role(rule) => rule.attributes_map(),
            Rule::Grant(rule) => rule.attributes_map(),
        }
    }

    pub fn expand(&self, vars: &Variables) -> std::result::Result<Generated, CommentError> {
        match self {
            Rule::Role(rule) => rule.expand(vars).map(Generated::Roles),
            Rule::Grant(rule) => Ok(Generated::Grants(rule.expand(vars))),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Role(rule) => write!(f, "{}", rule),
            Rule::Grant(rule) => write!(f, "{}", rule),
        }
    }
}
