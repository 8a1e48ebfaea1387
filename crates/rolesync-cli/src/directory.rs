//! Directory snapshot loading
//!
//! Entries are listed as maps holding `dn` and attribute values:
//!
//! ```yaml
//! - dn: cn=dba,ou=groups,dc=acme
//!   objectClass: groupOfNames
//!   member: [cn=alice,ou=people,dc=acme]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use rolesync_directory::{DirectoryEntry, MemoryDirectory};

use crate::error::{CliError, Result};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Values {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct EntryFile {
    dn: String,
    #[serde(flatten)]
    attributes: BTreeMap<String, Values>,
}

pub fn parse(content: &str) -> std::result::Result<MemoryDirectory, serde_yaml::Error> {
    let entries: Vec<EntryFile> = serde_yaml::from_str(content)?;
    Ok(entries
        .into_iter()
        .map(|file| {
            file.attributes
                .into_iter()
                .fold(DirectoryEntry::new(file.dn), |entry, (name, values)| {
                    let values = match values {
                        Values::One(value) => vec![value],
                        Values::Many(values) => values,
                    };
                    entry.with_attribute(&name, values)
                })
        })
        .collect())
}

pub fn load(path: &Path) -> Result<MemoryDirectory> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::user(format!("Failed to read directory {}: {}", path.display(), e))
    })?;
    let directory = parse(&content).map_err(|source| CliError::Yaml {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), entries = directory.len(), "Loaded directory");
    Ok(directory)
}
