//! Package registry
//!
//! The build orchestrator's view of which packages are defined, which of
//! them are disabled, and which ones are part of the build layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ManifestError;

/// A package definition known to the build orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryPackage {
    pub name: String,

    #[serde(default)]
    pub disabled: bool,
}

/// Queries and updates against the package registry
pub trait PackageRegistry {
    /// Look up a package definition by name
    fn find(&self, name: &str) -> Option<&RegistryPackage>;

    /// Whether a package is part of the build layout
    fn in_layout(&self, name: &str) -> bool;

    /// Add a defined package to the build layout
    fn add_to_layout(&mut self, name: &str) -> Result<(), ManifestError>;

    fn has_package(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// A package without a registry entry counts as disabled
    fn is_disabled(&self, name: &str) -> bool {
        self.find(name).map_or(true, |pkg| pkg.disabled)
    }
}

/// Registry backed by an optional TOML file
///
/// ```toml
/// layout = ["base/types"]
///
/// [[package]]
/// name = "base/types"
///
/// [[package]]
/// name = "drivers/camera"
/// disabled = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub layout: Vec<String>,

    #[serde(default, rename = "package")]
    pub packages: Vec<RegistryPackage>,

    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Registry {
    /// Load from a TOML file; layout changes are written back to it
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut registry: Registry =
            toml::from_str(&content).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        registry.path = Some(path.to_path_buf());
        Ok(registry)
    }

    /// Define a package (in-memory registries and tests)
    pub fn define(&mut self, name: &str, disabled: bool) -> &mut Self {
        self.packages.retain(|pkg| pkg.name != name);
        self.packages.push(RegistryPackage {
            name: name.to_string(),
            disabled,
        });
        self
    }

    /// Write to the backing file atomically (write-then-rename)
    fn save(&self) -> Result<(), ManifestError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = toml::to_string_pretty(self)?;
        let io_err = |source| ManifestError::Io {
            path: path.clone(),
            source,
        };

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let temp_path = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        if let Err(e) =
            std::fs::write(&temp_path, content).and_then(|()| std::fs::rename(&temp_path, path))
        {
            let _ = std::fs::remove_file(&temp_path);
            return Err(io_err(e));
        }
        Ok(())
    }
}

impl PackageRegistry for Registry {
    fn find(&self, name: &str) -> Option<&RegistryPackage> {
        self.packages.iter().find(|pkg| pkg.name == name)
    }

    fn in_layout(&self, name: &str) -> bool {
        self.layout.iter().any(|n| n == name)
    }

    fn add_to_layout(&mut self, name: &str) -> Result<(), ManifestError> {
        if !self.has_package(name) {
            return Err(ManifestError::UnknownPackage(name.to_string()));
        }
        if self.in_layout(name) {
            return Ok(());
        }
        self.layout.push(name.to_string());
        self.save()
    }
}
