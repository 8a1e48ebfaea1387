//! Distinguished name parsing (RFC 4514 string form)

use std::fmt;

use crate::{Error, Result};

/// One relative distinguished name, possibly multi-valued (`cn=a+uid=b`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdn {
    /// (attribute type, value) pairs, in source order
    pub attributes: Vec<(String, String)>,
}

impl Rdn {
    /// Value of the first attribute of this RDN if its type matches
    pub fn value_of(&self, attr_type: &str) -> Option<&str> {
        self.attributes
            .first()
            .filter(|(t, _)| t.eq_ignore_ascii_case(attr_type))
            .map(|(_, v)| v.as_str())
    }
}

/// A parsed distinguished name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dn {
    pub rdns: Vec<Rdn>,
}

impl Dn {
    /// Parse a DN string
    ///
    /// Handles backslash escapes (`\,` and `\2C`), quoted values and
    /// whitespace around separators. The empty string is the root DN.
    pub fn parse(input: &str) -> Result<Self> {
        let mut rdns = Vec::new();
        if input.trim().is_empty() {
            return Ok(Self { rdns });
        }

        let bytes = input.as_bytes();
        let mut pos = 0;
        let mut current = Vec::new();
        loop {
            let (attr_type, next) = parse_type(input, pos)?;
            let (value, next) = parse_value(input, next)?;
            current.push((attr_type, value));
            pos = skip_spaces(bytes, next);
            match bytes.get(pos) {
                None => {
                    rdns.push(Rdn {
                        attributes: std::mem::take(&mut current),
                    });
                    break;
                }
                Some(b'+') => pos += 1,
                Some(b',') | Some(b';') => {
                    rdns.push(Rdn {
                        attributes: std::mem::take(&mut current),
                    });
                    pos += 1;
                }
                Some(c) => {
                    return Err(Error::invalid_dn(
                        input,
                        format!("unexpected character {:?} at {}", *c as char, pos),
                    ));
                }
            }
        }
        Ok(Self { rdns })
    }

    /// Value of the first RDN whose leading attribute has the given type
    pub fn first(&self, attr_type: &str) -> Option<&str> {
        self.rdns.iter().find_map(|rdn| rdn.value_of(attr_type))
    }

    /// Case-folded form used to compare DNs
    pub fn normalized(&self) -> String {
        self.rdns
            .iter()
            .map(|rdn| {
                rdn.attributes
                    .iter()
                    .map(|(t, v)| format!("{}={}", t.to_ascii_lowercase(), v.to_lowercase()))
                    .collect::<Vec<_>>()
                    .join("+")
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Whether `self` is `base` or lies below it
    pub fn is_within(&self, base: &Dn) -> bool {
        self.depth_below(base).is_some()
    }

    /// Number of RDNs between `self` and `base`, if `self` is within `base`
    pub fn depth_below(&self, base: &Dn) -> Option<usize> {
        if self.rdns.len() < base.rdns.len() {
            return None;
        }
        let offset = self.rdns.len() - base.rdns.len();
        let suffix = Dn {
            rdns: self.rdns[offset..].to_vec(),
        };
        (suffix.normalized() == base.normalized()).then_some(offset)
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rdns: Vec<String> = self
            .rdns
            .iter()
            .map(|rdn| {
                rdn.attributes
                    .iter()
                    .map(|(t, v)| format!("{}={}", t, escape_value(v)))
                    .collect::<Vec<_>>()
                    .join("+")
            })
            .collect();
        write!(f, "{}", rdns.join(","))
    }
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos) == Some(&b' ') {
        pos += 1;
    }
    pos
}

fn parse_type(input: &str, start: usize) -> Result<(String, usize)> {
    let bytes = input.as_bytes();
    let begin = skip_spaces(bytes, start);
    let mut pos = begin;
    while let Some(&c) = bytes.get(pos) {
        if c.is_ascii_alphanumeric() || c == b'-' || c == b'.' {
            pos += 1;
        } else {
            break;
        }
    }
    if pos == begin {
        return Err(Error::invalid_dn(
            input,
            format!("missing attribute type at {}", begin),
        ));
    }
    let attr_type = input[begin..pos].to_string();
    pos = skip_spaces(bytes, pos);
    if bytes.get(pos) != Some(&b'=') {
        return Err(Error::invalid_dn(
            input,
            format!("expected '=' after {}", attr_type),
        ));
    }
    Ok((attr_type, pos + 1))
}

fn parse_value(input: &str, start: usize) -> Result<(String, usize)> {
    let bytes = input.as_bytes();
    let mut pos = skip_spaces(bytes, start);
    let mut value: Vec<u8> = Vec::new();

    if bytes.get(pos) == Some(&b'"') {
        pos += 1;
        loop {
            match bytes.get(pos) {
                None => return Err(Error::invalid_dn(input, "unterminated quoted value")),
                Some(b'"') => return Ok((decode(input, value)?, pos + 1)),
                Some(b'\\') => {
                    let (byte, next) = parse_escape(input, pos)?;
                    value.push(byte);
                    pos = next;
                }
                Some(&c) => {
                    value.push(c);
                    pos += 1;
                }
            }
        }
    }

    // Trailing unescaped spaces are not part of the value.
    let mut significant = 0;
    while let Some(&c) = bytes.get(pos) {
        match c {
            b',' | b'+' | b';' => break,
            b'\\' => {
                let (byte, next) = parse_escape(input, pos)?;
                value.push(byte);
                significant = value.len();
                pos = next;
            }
            b'=' => {
                return Err(Error::invalid_dn(
                    input,
                    format!("unescaped '=' in value at {}", pos),
                ));
            }
            _ => {
                value.push(c);
                if c != b' ' {
                    significant = value.len();
                }
                pos += 1;
            }
        }
    }
    value.truncate(significant);
    Ok((decode(input, value)?, pos))
}

fn parse_escape(input: &str, pos: usize) -> Result<(u8, usize)> {
    let bytes = input.as_bytes();
    let first = bytes
        .get(pos + 1)
        .ok_or_else(|| Error::invalid_dn(input, "dangling escape"))?;
    if first.is_ascii_hexdigit() {
        let pair = input
            .get(pos + 1..pos + 3)
            .filter(|p| p.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| Error::invalid_dn(input, format!("bad hex escape at {}", pos)))?;
        let byte = u8::from_str_radix(pair, 16)
            .map_err(|e| Error::invalid_dn(input, e.to_string()))?;
        Ok((byte, pos + 3))
    } else {
        Ok((*first, pos + 2))
    }
}

fn decode(input: &str, value: Vec<u8>) -> Result<String> {
    String::from_utf8(value).map_err(|_| Error::invalid_dn(input, "value is not valid UTF-8"))
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        let leading = i == 0 && (c == ' ' || c == '#');
        let trailing = i == last && c == ' ';
        if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=') || leading || trailing {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
