//! Role options
//!
//! Options are written either as a PostgreSQL-like string
//! (`LOGIN NOSUPERUSER CONNECTION LIMIT 5`) or as a map
//! (`{LOGIN: true, CONNECTION_LIMIT: 5}`). Keys are case-insensitive and
//! unlisted options keep PostgreSQL defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::Error;

/// Catalog attributes of a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawRoleOptions")]
pub struct RoleOptions {
    pub login: bool,
    pub superuser: bool,
    pub createdb: bool,
    pub createrole: bool,
    pub inherit: bool,
    pub replication: bool,
    pub bypassrls: bool,
    /// -1 means no limit
    pub connection_limit: i32,
}

impl Default for RoleOptions {
    fn default() -> Self {
        Self {
            login: false,
            superuser: false,
            createdb: false,
            createrole: false,
            inherit: true,
            replication: false,
            bypassrls: false,
            connection_limit: -1,
        }
    }
}

const FLAGS: [&str; 7] = [
    "LOGIN",
    "SUPERUSER",
    "CREATEDB",
    "CREATEROLE",
    "INHERIT",
    "REPLICATION",
    "BYPASSRLS",
];

impl RoleOptions {
    /// Role options with LOGIN set
    pub fn login() -> Self {
        Self {
            login: true,
            ..Self::default()
        }
    }

    fn flag(&self, name: &str) -> bool {
        match name {
            "LOGIN" => self.login,
            "SUPERUSER" => self.superuser,
            "CREATEDB" => self.createdb,
            "CREATEROLE" => self.createrole,
            "INHERIT" => self.inherit,
            "REPLICATION" => self.replication,
            _ => self.bypassrls,
        }
    }

    fn set(&mut self, name: &str, value: bool) -> Result<(), Error> {
        match name {
            "LOGIN" => self.login = value,
            "SUPERUSER" => self.superuser = value,
            "CREATEDB" => self.createdb = value,
            "CREATEROLE" => self.createrole = value,
            "INHERIT" => self.inherit = value,
            "REPLICATION" => self.replication = value,
            "BYPASSRLS" => self.bypassrls = value,
            _ => {
                return Err(Error::InvalidRoleOption {
                    option: name.to_string(),
                    reason: "unknown option".to_string(),
                });
            }
        }
        Ok(())
    }

    fn token(name: &str, value: bool) -> String {
        if value {
            name.to_string()
        } else {
            format!("NO{}", name)
        }
    }

    /// Full option clause, suitable for `CREATE ROLE ... WITH <clause>`
    pub fn to_sql(&self) -> String {
        let mut tokens: Vec<String> = FLAGS
            .iter()
            .map(|name| Self::token(name, self.flag(name)))
            .collect();
        tokens.push(format!("CONNECTION LIMIT {}", self.connection_limit));
        tokens.join(" ")
    }

    /// Clause tokens needed to turn `current` into `self`
    pub fn diff(&self, current: &RoleOptions) -> Vec<String> {
        let mut tokens: Vec<String> = FLAGS
            .iter()
            .filter(|name| self.flag(name) != current.flag(name))
            .map(|name| Self::token(name, self.flag(name)))
            .collect();
        if self.connection_limit != current.connection_limit {
            tokens.push(format!("CONNECTION LIMIT {}", self.connection_limit));
        }
        tokens
    }
}

impl fmt::Display for RoleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

fn parse_limit(value: &str) -> Result<i32, Error> {
    value.parse().map_err(|_| Error::InvalidRoleOption {
        option: "CONNECTION LIMIT".to_string(),
        reason: format!("{:?} is not an integer", value),
    })
}

impl FromStr for RoleOptions {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut options = Self::default();
        let mut tokens = s.split_whitespace().map(str::to_uppercase);
        while let Some(token) = tokens.next() {
            if token == "CONNECTION" {
                match (tokens.next().as_deref(), tokens.next()) {
                    (Some("LIMIT"), Some(value)) => options.connection_limit = parse_limit(&value)?,
                    _ => {
                        return Err(Error::InvalidRoleOption {
                            option: "CONNECTION LIMIT".to_string(),
                            reason: "expected CONNECTION LIMIT <n>".to_string(),
                        });
                    }
                }
            } else if FLAGS.contains(&token.as_str()) {
                options.set(&token, true)?;
            } else if let Some(name) = token.strip_prefix("NO").filter(|n| FLAGS.contains(n)) {
                options.set(name, false)?;
            } else {
                return Err(Error::InvalidRoleOption {
                    option: token,
                    reason: "unknown option".to_string(),
                });
            }
        }
        Ok(options)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOptionValue {
    Flag(bool),
    Number(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRoleOptions {
    Text(String),
    Map(BTreeMap<String, RawOptionValue>),
}

impl TryFrom<RawRoleOptions> for RoleOptions {
    type Error = Error;

    fn try_from(raw: RawRoleOptions) -> std::result::Result<Self, Self::Error> {
        let map = match raw {
            RawRoleOptions::Text(text) => return text.parse(),
            RawRoleOptions::Map(map) => map,
        };
        let mut options = Self::default();
        for (key, value) in map {
            let name = key.to_uppercase().replace(['_', '-'], " ");
            match (name.as_str(), value) {
                ("CONNECTION LIMIT", RawOptionValue::Number(limit)) => {
                    options.connection_limit = parse_limit(&limit.to_string())?;
                }
                (_, RawOptionValue::Flag(flag)) => options.set(&name, flag)?,
                (_, RawOptionValue::Number(_)) => {
                    return Err(Error::InvalidRoleOption {
                        option: key,
                        reason: "expected a boolean".to_string(),
                    });
                }
            }
        }
        Ok(options)
    }
}
