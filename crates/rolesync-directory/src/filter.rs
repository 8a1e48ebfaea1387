//! Search filter parsing and evaluation (RFC 4515 subset)
//!
//! Supports `&`, `|`, `!`, equality, presence (`attr=*`) and substring
//! (`attr=a*b*c`) items. Comparisons ignore case. Used by
//! [`MemoryDirectory`](crate::MemoryDirectory); real servers evaluate
//! filters themselves.

use crate::entry::DirectoryEntry;
use crate::{Error, Result};

/// A parsed search filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Present(String),
    Equal(String, String),
    /// `initial*any*...*final`; empty strings stand for missing parts
    Substring {
        attribute: String,
        parts: Vec<String>,
    },
}

impl Filter {
    /// Parse a filter string
    ///
    /// A single item may omit its surrounding parentheses.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let source = if trimmed.starts_with('(') {
            trimmed.to_string()
        } else {
            format!("({})", trimmed)
        };
        let mut parser = Parser {
            input,
            chars: source.chars().collect(),
            pos: 0,
        };
        let filter = parser.filter()?;
        if parser.pos != parser.chars.len() {
            return Err(Error::invalid_filter(input, "trailing characters"));
        }
        Ok(filter)
    }

    /// Evaluate the filter against an entry
    pub fn matches(&self, entry: &DirectoryEntry) -> bool {
        match self {
            Filter::And(items) => items.iter().all(|f| f.matches(entry)),
            Filter::Or(items) => items.iter().any(|f| f.matches(entry)),
            Filter::Not(inner) => !inner.matches(entry),
            Filter::Present(attribute) => {
                attribute.eq_ignore_ascii_case("objectClass")
                    || entry.attributes.contains(attribute)
            }
            Filter::Equal(attribute, value) => entry
                .attribute(attribute)
                .unwrap_or_default()
                .iter()
                .any(|v| v.to_lowercase() == value.to_lowercase()),
            Filter::Substring { attribute, parts } => entry
                .attribute(attribute)
                .unwrap_or_default()
                .iter()
                .any(|v| substring_match(&v.to_lowercase(), parts)),
        }
    }
}

fn substring_match(value: &str, parts: &[String]) -> bool {
    let (Some(initial), Some(last)) = (parts.first(), parts.last()) else {
        return false;
    };
    let initial = initial.to_lowercase();
    let last = last.to_lowercase();
    if !value.starts_with(&initial) {
        return false;
    }
    let mut rest = &value[initial.len()..];
    for any in &parts[1..parts.len() - 1] {
        let any = any.to_lowercase();
        match rest.find(&any) {
            Some(idx) => rest = &rest[idx + any.len()..],
            None => return false,
        }
    }
    rest.ends_with(&last)
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> Error {
        Error::invalid_filter(self.input, reason)
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.chars.get(self.pos) == Some(&c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected {:?} at {}", c, self.pos)))
        }
    }

    fn filter(&mut self) -> Result<Filter> {
        self.expect('(')?;
        let filter = match self.chars.get(self.pos) {
            Some('&') => {
                self.pos += 1;
                Filter::And(self.list()?)
            }
            Some('|') => {
                self.pos += 1;
                Filter::Or(self.list()?)
            }
            Some('!') => {
                self.pos += 1;
                Filter::Not(Box::new(self.filter()?))
            }
            Some(_) => self.item()?,
            None => return Err(self.error("unexpected end of filter")),
        };
        self.expect(')')?;
        Ok(filter)
    }

    fn list(&mut self) -> Result<Vec<Filter>> {
        let mut items = Vec::new();
        while self.chars.get(self.pos) == Some(&'(') {
            items.push(self.filter()?);
        }
        if items.is_empty() {
            return Err(self.error(format!("empty filter list at {}", self.pos)));
        }
        Ok(items)
    }

    fn item(&mut self) -> Result<Filter> {
        let start = self.pos;
        while let Some(&c) = self.chars.get(self.pos) {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == ';' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error(format!("missing attribute at {}", start)));
        }
        let attribute: String = self.chars[start..self.pos].iter().collect();

        match self.chars.get(self.pos) {
            Some('=') => self.pos += 1,
            Some(c @ ('>' | '<' | '~')) => {
                return Err(self.error(format!("unsupported operator {}=", c)));
            }
            _ => return Err(self.error(format!("expected '=' after {}", attribute))),
        }

        let mut parts = vec![String::new()];
        loop {
            match self.chars.get(self.pos) {
                None => return Err(self.error("unterminated item")),
                Some(')') => break,
                Some('(') => return Err(self.error(format!("unescaped '(' at {}", self.pos))),
                Some('*') => {
                    parts.push(String::new());
                    self.pos += 1;
                }
                Some('\\') => {
                    let hex: String = self.chars.iter().skip(self.pos + 1).take(2).collect();
                    let byte = u8::from_str_radix(&hex, 16)
                        .ok()
                        .filter(|_| hex.len() == 2)
                        .ok_or_else(|| self.error(format!("bad escape at {}", self.pos)))?;
                    if let Some(last) = parts.last_mut() {
                        last.push(char::from(byte));
                    }
                    self.pos += 3;
                }
                Some(&c) => {
                    if let Some(last) = parts.last_mut() {
                        last.push(c);
                    }
                    self.pos += 1;
                }
            }
        }

        Ok(match parts.as_slice() {
            [value] => Filter::Equal(attribute, value.clone()),
            [a, b] if a.is_empty() && b.is_empty() => Filter::Present(attribute),
            _ => Filter::Substring { attribute, parts },
        })
    }
}
