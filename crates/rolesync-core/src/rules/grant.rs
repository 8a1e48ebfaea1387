use std::fmt;

use rolesync_meta::{ALL, GrantRuleSpec};

use crate::format::{Format, FormatError};
use crate::privilege::Grant;
use crate::vars::{AttributesMap, Variables};

/// Rule generating grants
///
/// An empty database or schema list, or the `__all__` marker, leaves the
/// field open for the postprocessor to expand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRule {
    pub privilege: String,
    pub databases: Vec<Format>,
    pub schemas: Vec<Format>,
    pub roles: Vec<Format>,
}

impl GrantRule {
    pub fn from_spec(spec: &GrantRuleSpec) -> Result<Self, FormatError> {
        let parse = |sources: &[String]| -> Result<Vec<Format>, FormatError> {
            sources.iter().map(|s| Format::parse(s)).collect()
        };
        Ok(Self {
            privilege: spec.privilege.clone(),
            databases: parse(&spec.databases)?,
            schemas: parse(&spec.schemas)?,
            roles: parse(&spec.roles)?,
        })
    }

    pub fn attributes_map(&self) -> AttributesMap {
        let mut map = AttributesMap::new();
        for format in self.databases.iter().chain(&self.schemas).chain(&self.roles) {
            format.request(&mut map);
        }
        map
    }

    pub fn expand(&self, vars: &Variables) -> Vec<Grant> {
        let databases = scope(&self.databases, vars);
        let schemas = scope(&self.schemas, vars);
        let mut grants = Vec::new();
        for role in self.roles.iter().flat_map(|f| f.render(vars)) {
            for dbname in &databases {
                for schema in &schemas {
                    grants.push(Grant {
                        privilege: self.privilege.clone(),
                        dbname: dbname.clone(),
                        schema: schema.clone(),
                        role: role.clone(),
                        owner: None,
                    });
                }
            }
        }
        grants
    }
}

/// Rendered names, `None` standing for "all"
fn scope(formats: &[Format], vars: &Variables) -> Vec<Option<String>> {
    if formats.is_empty() {
        return vec![None];
    }
    formats
        .iter()
        .flat_map(|f| f.render(vars))
        .map(|name| (name != ALL).then_some(name))
        .collect()
}

impl fmt::Display for GrantRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grant rule {}", self.privilege)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::Value;
    use pretty_assertions::assert_eq;

    fn spec(databases: &[&str], schemas: &[&str], roles: &[&str]) -> GrantRuleSpec {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        GrantRuleSpec {
            privilege: "ro".to_string(),
            databases: owned(databases),
            schemas: owned(schemas),
            roles: owned(roles),
        }
    }

    #[test]
    fn test_open_scope() {
        let rule = GrantRule::from_spec(&spec(&[], &["__all__"], &["alice"])).unwrap();
        assert_eq!(rule.expand(&Variables::new()), vec![Grant::new("ro", "alice")]);
    }

    #[test]
    fn test_templated_roles() {
        let rule =
            GrantRule::from_spec(&spec(&["app", "reporting"], &["public"], &["{member}"])).unwrap();
        let vars: Variables = [("member", vec![Value::text("alice"), Value::text("bob")])]
            .into_iter()
            .collect();

        let grants = rule.expand(&vars);

        assert_eq!(grants.len(), 4);
        assert_eq!(
            grants[0],
            Grant::new("ro", "alice").on_database("app").on_schema("public")
        );
        assert_eq!(
            grants[3],
            Grant::new("ro", "bob").on_database("reporting").on_schema("public")
        );
    }
}
