//! Rule templates
//!
//! A template is text with `{path}` placeholders, `{{` and `}}` standing for
//! literal braces. The first segment of a path names the attribute key, the
//! rest walks into projected objects: `{member.sAMAccountName}` reads the
//! `samaccountname` field of each `member` object. `{dn}` and `{dn.cn}`
//! refer to the entry itself.
//!
//! Placeholders sharing a key bind to the same value of that key. Distinct
//! keys combine as a cartesian product, so `{cn}_{member}` yields one string
//! per (cn, member) pair while `{member.cn} <{member.mail}>` yields one per
//! member.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rolesync_directory::AttributeMap;

use crate::vars::{AttributesMap, SELF_KEY, Variables};

/// A template that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid template {template:?}: {reason}")]
pub struct FormatError {
    pub template: String,
    pub reason: String,
}

/// A placeholder reference: attribute key plus field path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Placeholder {
    pub key: String,
    pub path: Vec<String>,
}

impl Placeholder {
    fn parse(expression: &str) -> Option<Self> {
        let segments: Vec<String> = expression
            .trim()
            .split('.')
            .map(|s| AttributeMap::key(s.trim()))
            .collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        if segments[0] == "dn" {
            return Some(Self {
                key: SELF_KEY.to_string(),
                path: segments,
            });
        }
        let mut segments = segments.into_iter();
        let key = segments.next()?;
        Some(Self {
            key,
            path: segments.collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    source: String,
    segments: Vec<Segment>,
}

impl Format {
    pub fn parse(source: &str) -> Result<Self, FormatError> {
        let error = |reason: String| FormatError {
            template: source.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();
        while let Some((index, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|(_, n)| *n) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|(_, n)| *n) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut expression = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, '{')) => {
                                let reason = format!("nested '{{' in placeholder at {}", index);
                                return Err(error(reason));
                            }
                            Some((_, c)) => expression.push(c),
                            None => return Err(error(format!("unclosed placeholder at {}", index))),
                        }
                    }
                    let placeholder = Placeholder::parse(&expression)
                        .ok_or_else(|| error(format!("bad placeholder {{{}}}", expression)))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(placeholder));
                }
                '}' => return Err(error(format!("single '}}' at {}", index))),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(placeholder) => Some(placeholder),
            Segment::Literal(_) => None,
        })
    }

    /// Whether the template has no placeholder
    pub fn is_static(&self) -> bool {
        self.placeholders().next().is_none()
    }

    /// Record the fields this template reads
    pub fn request(&self, map: &mut AttributesMap) {
        for placeholder in self.placeholders() {
            map.request(&placeholder.key, &placeholder.path);
        }
    }

    /// Render every combination of values
    ///
    /// A key without values yields no output at all.
    pub fn render(&self, vars: &Variables) -> Vec<String> {
        let mut paths: BTreeMap<&str, BTreeSet<&[String]>> = BTreeMap::new();
        for placeholder in self.placeholders() {
            paths
                .entry(placeholder.key.as_str())
                .or_default()
                .insert(placeholder.path.as_slice());
        }

        // Each binding maps (key, path) to one string.
        type Binding<'a> = BTreeMap<(&'a str, &'a [String]), &'a str>;
        let mut combinations: Vec<Binding> = vec![Binding::new()];
        for (key, key_paths) in &paths {
            let mut key_bindings: Vec<Binding> = Vec::new();
            for value in vars.get(key).unwrap_or_default() {
                let mut partial: Vec<Binding> = vec![Binding::new()];
                for path in key_paths {
                    let mut resolved = Vec::new();
                    value.resolve(path, &mut resolved);
                    partial = partial
                        .iter()
                        .flat_map(|binding| {
                            resolved.iter().map(move |text| {
                                let mut binding = binding.clone();
                                binding.insert((*key, *path), *text);
                                binding
                            })
                        })
                        .collect();
                }
                key_bindings.extend(partial);
            }
            combinations = combinations
                .iter()
                .flat_map(|combination| {
                    key_bindings.iter().map(move |binding| {
                        let mut merged = combination.clone();
                        merged.extend(binding.iter().map(|(k, v)| (*k, *v)));
                        merged
                    })
                })
                .collect();
        }

        combinations
            .iter()
            .map(|binding| {
                self.segments
                    .iter()
                    .map(|segment| match segment {
                        Segment::Literal(text) => text.as_str(),
                        Segment::Field(p) => binding
                            .get(&(p.key.as_str(), p.path.as_slice()))
                            .copied()
                            .unwrap_or_default(),
                    })
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
