//! [`ConfigFile`] writes YAML files into a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding rolesync input files.
///
/// # Example
///
/// ```rust,no_run
/// use rolesync_test_utils::ConfigFile;
///
/// let files = ConfigFile::new();
/// let config = files.write("rolesync.yml", "version: 1\nsync_map: []\n");
/// assert!(config.exists());
/// ```
pub struct ConfigFile {
    temp_dir: TempDir,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigFile {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `name`, returning the full path
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}
