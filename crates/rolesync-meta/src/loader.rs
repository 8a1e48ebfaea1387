//! Configuration file discovery
//!
//! Without an explicit path, the first existing file among these wins:
//!
//! ```text
//! ./rolesync.yml
//! ./rolesync.yaml
//! ~/.config/rolesync.yml
//! ~/.config/rolesync.yaml
//! /etc/rolesync.yml
//! /etc/rolesync.yaml
//! ```

use std::path::{Path, PathBuf};

use crate::{Error, Result};

const FILE_NAMES: [&str; 2] = ["rolesync.yml", "rolesync.yaml"];

/// Candidate configuration paths, in lookup order
pub fn candidates(cwd: &Path, home: Option<&Path>) -> Vec<PathBuf> {
    let mut dirs = vec![cwd.to_path_buf()];
    if let Some(home) = home {
        dirs.push(home.join(".config"));
    }
    dirs.push(PathBuf::from("/etc"));

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .collect()
}

/// Locate the configuration file
///
/// An explicit path must exist. Otherwise the candidates relative to `cwd`
/// and the user's home directory are tried in order.
pub fn find_file(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }

    let home = dirs::home_dir();
    for candidate in candidates(cwd, home.as_deref()) {
        tracing::debug!(path = %candidate.display(), "Trying configuration file");
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(Error::ConfigNotFound)
}
