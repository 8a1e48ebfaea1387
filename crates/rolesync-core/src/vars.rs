//! Variable Projector
//!
//! Turns a directory entry (and its join children) into the nested values
//! rule templates are rendered from. An [`AttributesMap`] lists, per
//! attribute key, the fields templates need:
//!
//! - `__self__` is the entry itself and yields one object
//! - a joined attribute yields one object per child entry
//! - a plain attribute yields its values, or one object per value parsed as
//!   a DN when fields are requested
//!
//! Objects always carry `dn`. A field named `dn` with sub-fields
//! (`dn.cn`) becomes a nested object holding the DN and the requested RDN
//! values. Other fields are attribute values, falling back to the RDN of the
//! same type.

use std::collections::{BTreeMap, BTreeSet};

use rolesync_directory::{AttributeMap, DirectoryEntry, Dn};
use rolesync_meta::OnUnexpectedDn;

use crate::{Error, Result};

/// Key standing for the entry itself
pub const SELF_KEY: &str = "__self__";

/// Fields of a projected object
pub type Fields = BTreeMap<String, Vec<Value>>;

/// A projected value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Object(Fields),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Collect the text values reached by following `path`
    ///
    /// An object reached with an empty path stands for its `dn`.
    pub fn resolve<'a>(&'a self, path: &[String], out: &mut Vec<&'a str>) {
        match (self, path.split_first()) {
            (Value::Text(text), None) => out.push(text),
            (Value::Text(_), Some(_)) => {}
            (Value::Object(fields), None) => {
                for value in fields.get("dn").into_iter().flatten() {
                    value.resolve(&[], out);
                }
            }
            (Value::Object(fields), Some((head, rest))) => {
                for value in fields.get(head).into_iter().flatten() {
                    value.resolve(rest, out);
                }
            }
        }
    }
}

/// Projected values of one entry, by attribute key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Variables {
    values: BTreeMap<String, Vec<Value>>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, values: Vec<Value>) {
        self.values.insert(AttributeMap::key(key), values);
    }

    pub fn get(&self, key: &str) -> Option<&[Value]> {
        self.values.get(&AttributeMap::key(key)).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<Value>)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, Vec<Value>)>>(iter: I) -> Self {
        let mut vars = Self::new();
        for (key, values) in iter {
            vars.insert(&key.into(), values);
        }
        vars
    }
}

/// Requested sub-fields, as a tree of dotted paths
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldTree {
    fields: BTreeMap<String, FieldTree>,
}

impl FieldTree {
    /// Request a dotted path, case-insensitively
    pub fn insert(&mut self, path: &[String]) {
        if let Some((head, rest)) = path.split_first() {
            self.fields
                .entry(AttributeMap::key(head))
                .or_default()
                .insert(rest);
        }
    }

    pub fn merge(&mut self, other: &FieldTree) {
        for (name, sub) in &other.fields {
            self.fields.entry(name.clone()).or_default().merge(sub);
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldTree> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldTree)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Directory attributes this tree reads from an entry
    pub fn attributes(&self) -> BTreeSet<String> {
        self.fields
            .keys()
            .filter(|name| name.as_str() != "dn")
            .cloned()
            .collect()
    }
}

/// Fields requested per attribute key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributesMap {
    keys: BTreeMap<String, FieldTree>,
}

impl AttributesMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from dotted field lists
    ///
    /// ```
    /// use rolesync_core::AttributesMap;
    ///
    /// let map = AttributesMap::from_fields([
    ///     ("__self__", vec!["dn.cn"]),
    ///     ("member", vec!["mail"]),
    /// ]);
    /// assert_eq!(map.entry_attributes().into_iter().collect::<Vec<_>>(), vec!["member"]);
    /// ```
    pub fn from_fields<K, F>(fields: impl IntoIterator<Item = (K, Vec<F>)>) -> Self
    where
        K: AsRef<str>,
        F: AsRef<str>,
    {
        let mut map = Self::new();
        for (key, list) in fields {
            map.request(key.as_ref(), &[]);
            for field in list {
                let path: Vec<String> = field.as_ref().split('.').map(str::to_string).collect();
                map.request(key.as_ref(), &path);
            }
        }
        map
    }

    /// Request `path` under `key`; an empty path requests the key alone
    pub fn request(&mut self, key: &str, path: &[String]) {
        self.keys.entry(AttributeMap::key(key)).or_default().insert(path);
    }

    pub fn merge(&mut self, other: &AttributesMap) {
        for (key, tree) in &other.keys {
            self.keys.entry(key.clone()).or_default().merge(tree);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldTree> {
        self.keys.get(&AttributeMap::key(key))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldTree)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Directory attributes needed on the searched entries
    pub fn entry_attributes(&self) -> BTreeSet<String> {
        let mut attributes: BTreeSet<String> = self
            .keys
            .keys()
            .filter(|key| key.as_str() != SELF_KEY)
            .cloned()
            .collect();
        if let Some(tree) = self.keys.get(SELF_KEY) {
            attributes.extend(tree.attributes());
        }
        attributes
    }
}

/// Project an entry according to `map`
///
/// # Errors
///
/// - [`Error::MissingAttribute`] when a plain attribute key is absent
/// - [`Error::UnexpectedDn`] when a DN is unusable and `policy` is `fail`
pub fn project(
    entry: &DirectoryEntry,
    map: &AttributesMap,
    policy: OnUnexpectedDn,
) -> Result<Variables> {
    let projector = Projector { policy };
    let mut vars = Variables::new();
    for (key, tree) in map.iter() {
        let values = if key == SELF_KEY {
            projector
                .entry(entry, tree, key)?
                .map(Value::Object)
                .into_iter()
                .collect()
        } else {
            projector.attribute(entry, key, tree)?
        };
        vars.insert(key, values);
    }
    Ok(vars)
}

struct Projector {
    policy: OnUnexpectedDn,
}

impl Projector {
    /// Apply the policy to an unusable DN; `Ok(None)` means skip the value
    fn unexpected<T>(&self, attribute: &str, value: &str, reason: String) -> Result<Option<T>> {
        match self.policy {
            OnUnexpectedDn::Fail => Err(Error::UnexpectedDn {
                attribute: attribute.to_string(),
                value: value.to_string(),
                reason,
            }),
            OnUnexpectedDn::Warn => {
                tracing::warn!(attribute, dn = value, %reason, "Unexpected DN, skipping value");
                Ok(None)
            }
            OnUnexpectedDn::Ignore => {
                tracing::debug!(attribute, dn = value, %reason, "Ignoring unexpected DN");
                Ok(None)
            }
        }
    }

    fn attribute(&self, entry: &DirectoryEntry, key: &str, tree: &FieldTree) -> Result<Vec<Value>> {
        if let Some(children) = entry.children(key) {
            let mut values = Vec::with_capacity(children.len());
            for child in children {
                if let Some(fields) = self.entry(child, tree, key)? {
                    values.push(Value::Object(fields));
                }
            }
            return Ok(values);
        }

        let raw = entry.attribute(key).ok_or_else(|| Error::MissingAttribute {
            dn: entry.dn.clone(),
            name: key.to_string(),
        })?;
        if tree.is_empty() {
            return Ok(raw.iter().cloned().map(Value::Text).collect());
        }

        let mut values = Vec::with_capacity(raw.len());
        for value in raw {
            let projected = match Dn::parse(value) {
                Ok(dn) => match dn_fields(value, &dn, tree) {
                    Ok(fields) => Some(fields),
                    Err(reason) => self.unexpected(key, value, reason)?,
                },
                Err(e) => self.unexpected(key, value, e.to_string())?,
            };
            values.extend(projected.map(Value::Object));
        }
        Ok(values)
    }

    /// Object for a full entry; `None` when its DN is skipped by policy
    fn entry(&self, entry: &DirectoryEntry, tree: &FieldTree, key: &str) -> Result<Option<Fields>> {
        let dn = match Dn::parse(&entry.dn) {
            Ok(dn) => dn,
            Err(e) => return self.unexpected(key, &entry.dn, e.to_string()),
        };

        let mut fields = Fields::new();
        let dn_value = match tree.get("dn").filter(|sub| !sub.is_empty()) {
            Some(sub) => match dn_fields(&entry.dn, &dn, sub) {
                Ok(nested) => Value::Object(nested),
                Err(reason) => return self.unexpected(key, &entry.dn, reason),
            },
            None => Value::text(&entry.dn),
        };
        fields.insert("dn".to_string(), vec![dn_value]);

        for (name, sub) in tree.iter().filter(|(name, _)| *name != "dn") {
            let values = if sub.is_empty() {
                match entry.attribute(name) {
                    Some(values) => values.iter().cloned().map(Value::Text).collect(),
                    None => dn.first(name).map(Value::text).into_iter().collect(),
                }
            } else {
                self.attribute(entry, name, sub)?
            };
            fields.insert(name.to_string(), values);
        }
        Ok(Some(fields))
    }
}

/// Object for a DN value: `dn` plus requested RDN values
///
/// Fails with a reason when a requested RDN type is absent.
fn dn_fields(raw: &str, dn: &Dn, tree: &FieldTree) -> std::result::Result<Fields, String> {
    let mut fields = Fields::new();
    fields.insert("dn".to_string(), vec![Value::text(raw)]);
    for (name, _) in tree.iter().filter(|(name, _)| *name != "dn") {
        match dn.first(name) {
            Some(value) => {
                fields.insert(name.to_string(), vec![Value::text(value)]);
            }
            None => return Err(format!("no {} RDN", name)),
        }
    }
    Ok(fields)
}
