//! Installation manifest
//!
//! Lists every package set and package checked out in the workspace,
//! together with the directory it lives in. Stored as TOML:
//!
//! ```toml
//! [[package_set]]
//! name = "core"
//! user_local_dir = "/ws/autoproj/remotes/core"
//!
//! [[package]]
//! name = "drivers/camera"
//! srcdir = "/ws/drivers/camera"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ManifestError;

/// A package set known to the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSetEntry {
    pub name: String,

    /// Checkout of the package set as seen by the user
    pub user_local_dir: PathBuf,
}

/// A package known to the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub name: String,

    /// Source directory of the package
    pub srcdir: PathBuf,
}

/// On-disk shape of the manifest file
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default, rename = "package_set")]
    package_sets: Vec<PackageSetEntry>,

    #[serde(default, rename = "package")]
    packages: Vec<PackageEntry>,
}

/// Package sets and packages keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationManifest {
    pub package_sets: BTreeMap<String, PackageSetEntry>,
    pub packages: BTreeMap<String, PackageEntry>,
}

impl InstallationManifest {
    /// Load the manifest from a TOML file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: RawManifest = toml::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_entries(raw.package_sets, raw.packages)
    }

    /// Index entries by name, rejecting duplicates
    pub fn from_entries(
        package_sets: Vec<PackageSetEntry>,
        packages: Vec<PackageEntry>,
    ) -> Result<Self, ManifestError> {
        let mut manifest = Self::default();

        for set in package_sets {
            if manifest.package_sets.contains_key(&set.name) {
                return Err(ManifestError::DuplicateName {
                    kind: "package set",
                    name: set.name,
                });
            }
            manifest.package_sets.insert(set.name.clone(), set);
        }

        for pkg in packages {
            if manifest.packages.contains_key(&pkg.name) {
                return Err(ManifestError::DuplicateName {
                    kind: "package",
                    name: pkg.name,
                });
            }
            manifest.packages.insert(pkg.name.clone(), pkg);
        }

        Ok(manifest)
    }

    /// Add a package, replacing any entry with the same name
    pub fn add_package(&mut self, name: &str, srcdir: impl Into<PathBuf>) {
        self.packages.insert(
            name.to_string(),
            PackageEntry {
                name: name.to_string(),
                srcdir: srcdir.into(),
            },
        );
    }

    /// Add a package set, replacing any entry with the same name
    pub fn add_package_set(&mut self, name: &str, user_local_dir: impl Into<PathBuf>) {
        self.package_sets.insert(
            name.to_string(),
            PackageSetEntry {
                name: name.to_string(),
                user_local_dir: user_local_dir.into(),
            },
        );
    }
}

/// Anything able to produce the current installation manifest
pub trait ManifestSource {
    fn load_manifest(&self) -> Result<InstallationManifest, ManifestError>;
}

impl ManifestSource for InstallationManifest {
    fn load_manifest(&self) -> Result<InstallationManifest, ManifestError> {
        Ok(self.clone())
    }
}

/// Manifest read from disk on every request
#[derive(Debug, Clone)]
pub struct ManifestFile {
    path: PathBuf,
}

impl ManifestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManifestSource for ManifestFile {
    fn load_manifest(&self) -> Result<InstallationManifest, ManifestError> {
        InstallationManifest::load(&self.path)
    }
}
