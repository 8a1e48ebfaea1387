//! Role blacklist
//!
//! Glob patterns (`*` and `?`) naming roles that are never managed: system
//! roles, the superuser and the role running the sync.

use regex::Regex;

use crate::{Error, Result};

/// Compiled blacklist patterns
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    patterns: Vec<(String, Regex)>,
}

fn compile(pattern: &str) -> Result<Regex> {
    let mut expression = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => expression.push_str(".*"),
            '?' => expression.push('.'),
            c => expression.push_str(&regex::escape(&c.to_string())),
        }
    }
    expression.push('$');
    Regex::new(&expression).map_err(|source| Error::BlacklistPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl Blacklist {
    pub fn new<S: AsRef<str>>(patterns: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut blacklist = Self::default();
        for pattern in patterns {
            blacklist.push(pattern.as_ref())?;
        }
        Ok(blacklist)
    }

    pub fn push(&mut self, pattern: &str) -> Result<()> {
        let regex = compile(pattern)?;
        self.patterns.push((pattern.to_string(), regex));
        Ok(())
    }

    /// First pattern matching `name`
    pub fn matches(&self, name: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, regex)| regex.is_match(name))
            .map(|(pattern, _)| pattern.as_str())
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|(pattern, _)| pattern.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
