use std::collections::BTreeSet;
use std::fmt;

use rolesync_meta::{RoleOptions, RoleRuleSpec};

use super::CommentError;
use crate::format::{Format, FormatError};
use crate::role::Role;
use crate::vars::{AttributesMap, Variables};

/// Rule generating roles from name, parent and comment templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRule {
    pub names: Vec<Format>,
    pub parents: Vec<Format>,
    pub options: RoleOptions,
    pub comment: Option<Format>,
}

impl RoleRule {
    pub fn from_spec(spec: &RoleRuleSpec) -> Result<Self, FormatError> {
        Ok(Self {
            names: parse_all(&spec.names)?,
            parents: parse_all(&spec.parents)?,
            options: spec.options,
            comment: spec.comment.as_deref().map(Format::parse).transpose()?,
        })
    }

    pub fn attributes_map(&self) -> AttributesMap {
        let mut map = AttributesMap::new();
        for format in self.names.iter().chain(&self.parents).chain(&self.comment) {
            format.request(&mut map);
        }
        map
    }

    /// Generate roles
    ///
    /// The comment template must render either once, for every role, or
    /// once per role name in order.
    pub fn expand(&self, vars: &Variables) -> Result<Vec<Role>, CommentError> {
        let names: Vec<String> = self.names.iter().flat_map(|f| f.render(vars)).collect();
        let parents: BTreeSet<String> = self.parents.iter().flat_map(|f| f.render(vars)).collect();

        let comments: Vec<Option<String>> = match &self.comment {
            None => vec![None; names.len()],
            Some(format) => {
                let rendered = format.render(vars);
                match rendered.len() {
                    _ if names.is_empty() => Vec::new(),
                    1 => vec![rendered.into_iter().next(); names.len()],
                    n if n == names.len() => rendered.into_iter().map(Some).collect(),
                    n => {
                        return Err(CommentError {
                            template: format.source().to_string(),
                            comments: n,
                            names: names.len(),
                        });
                    }
                }
            }
        };

        Ok(names
            .into_iter()
            .zip(comments)
            .map(|(name, comment)| Role {
                name,
                options: self.options,
                parents: parents.clone(),
                comment,
            })
            .collect())
    }
}

impl fmt::Display for RoleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names.iter().map(Format::source).collect();
        write!(f, "role rule {}", names.join(", "))
    }
}

fn parse_all(sources: &[String]) -> Result<Vec<Format>, FormatError> {
    sources.iter().map(|s| Format::parse(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::Value;
    use pretty_assertions::assert_eq;

    fn rule(names: &[&str], parents: &[&str], comment: Option<&str>) -> RoleRule {
        RoleRule::from_spec(&RoleRuleSpec {
            names: names.iter().map(|s| s.to_string()).collect(),
            parents: parents.iter().map(|s| s.to_string()).collect(),
            comment: comment.map(str::to_string),
            ..RoleRuleSpec::default()
        })
        .unwrap()
    }

    fn members() -> Variables {
        [(
            "member",
            vec![Value::text("alice"), Value::text("bob")],
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_static_rule() {
        let roles = rule(&["dba"], &["staff"], Some("Administrators"))
            .expand(&Variables::new())
            .unwrap();
        assert_eq!(
            roles,
            vec![Role::new("dba").with_parents(["staff"]).with_comment("Administrators")]
        );
    }

    #[test]
    fn test_comment_per_name() {
        let roles = rule(&["{member}"], &[], Some("Synced {member}")).expand(&members()).unwrap();
        let comments: Vec<_> = roles.iter().map(|r| r.comment.as_deref().unwrap()).collect();
        assert_eq!(comments, vec!["Synced alice", "Synced bob"]);
    }

    #[test]
    fn test_comment_mismatch() {
        let err = rule(&["{member}", "extra"], &[], Some("Synced {member}"))
            .expand(&members())
            .unwrap_err();
        assert_eq!(
            err,
            CommentError {
                template: "Synced {member}".to_string(),
                comments: 2,
                names: 3,
            }
        );
    }

    #[test]
    fn test_comment_without_values() {
        let err = rule(&["dba"], &[], Some("From {desc}")).expand(&Variables::new()).unwrap_err();
        assert_eq!(err.comments, 0);
    }

    #[test]
    fn test_attributes_map() {
        let map = rule(&["{member.cn}"], &["{cn}"], Some("{dn}")).attributes_map();
        assert_eq!(
            map,
            AttributesMap::from_fields([
                ("__self__", vec!["dn"]),
                ("cn", vec![]),
                ("member", vec!["cn"]),
            ])
        );
    }
}
