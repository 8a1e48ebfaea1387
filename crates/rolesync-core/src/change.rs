//! Change operations produced by the diff engine

use std::fmt;

/// One statement to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeOperation {
    /// Human-readable summary, logged before execution
    pub description: String,
    /// SQL with identifiers and literals already quoted
    pub statement: String,
    /// Names the statement acts on (role, parent, database...)
    pub params: Vec<String>,
    /// Database to connect to; `None` for instance-wide statements
    pub dbname: Option<String>,
}

impl ChangeOperation {
    pub fn new(description: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            statement: statement.into(),
            params: Vec::new(),
            dbname: None,
        }
    }

    pub fn with_params<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_database(mut self, dbname: Option<&str>) -> Self {
        self.dbname = dbname.map(str::to_string);
        self
    }
}

impl fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Quote an SQL identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote an SQL string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
