//! Environment values seen by the generated files
//!
//! The workspace environment is captured once per run into an
//! [`EnvSnapshot`]; shims and the python settings read from it.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Separator of path-list variables
const PATH_SEPARATOR: &str = ":";

/// Read access to environment variables
pub trait EnvProvider {
    fn value(&self, name: &str) -> Option<String>;

    /// Entries of a path-list variable, empty when unset
    fn paths(&self, name: &str) -> Vec<String> {
        self.value(name)
            .map(|v| {
                v.split(PATH_SEPARATOR)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Point-in-time copy of a set of variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    /// Prepend `path` to a path-list variable, dropping an earlier copy of it
    pub fn add_path(&mut self, name: &str, path: &Path) {
        let path = path.to_string_lossy().into_owned();
        let mut entries = vec![path.clone()];
        entries.extend(self.paths(name).into_iter().filter(|p| *p != path));
        self.vars.insert(name.to_string(), entries.join(PATH_SEPARATOR));
    }
}

impl EnvProvider for EnvSnapshot {
    fn value(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Create the python package directories of an install prefix and put
/// them on PYTHONPATH. Returns the directories, dist-packages first.
pub fn prepare_python_prefix(
    prefix: &Path,
    python_version: &str,
    env: &mut EnvSnapshot,
) -> io::Result<Vec<PathBuf>> {
    let lib = prefix.join("lib").join(format!("python{}", python_version));
    let dirs = vec![lib.join("dist-packages"), lib.join("site-packages")];

    for dir in &dirs {
        fs::create_dir_all(dir)?;
        env.add_path("PYTHONPATH", dir);
    }

    Ok(dirs)
}
