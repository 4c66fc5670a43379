//! Folder resolution
//!
//! Builds the folder list of the workspace from the installation manifest.
//! The output order depends only on names, never on manifest order.

use std::path::{Path, PathBuf};

use codews_manifest::{InstallationManifest, PackageRegistry};
use tracing::debug;

use crate::descriptor::FolderEntry;

/// Default build configuration directory, relative to the workspace root
pub const DEFAULT_BUILDCONF_DIR: &str = "autoproj";

/// Produces the managed folder list of a workspace
#[derive(Debug, Clone)]
pub struct FolderResolver {
    root: PathBuf,
    buildconf_dir: String,
}

impl FolderResolver {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            buildconf_dir: DEFAULT_BUILDCONF_DIR.to_string(),
        }
    }

    pub fn with_buildconf_dir(mut self, dir: &str) -> Self {
        self.buildconf_dir = dir.to_string();
        self
    }

    /// Build configuration entry, then package sets (if requested), then
    /// enabled packages, each group sorted by name.
    ///
    /// Packages the registry does not know are skipped like disabled ones.
    pub fn resolve(
        &self,
        manifest: &InstallationManifest,
        registry: &dyn PackageRegistry,
        include_package_sets: bool,
    ) -> Vec<FolderEntry> {
        let mut folders = Vec::new();

        if include_package_sets {
            folders.push(FolderEntry::new(
                format!("{} (buildconf)", self.buildconf_dir),
                self.root.join(&self.buildconf_dir),
            ));

            let mut sets: Vec<_> = manifest.package_sets.values().collect();
            sets.sort_by(|a, b| a.name.cmp(&b.name));
            folders.extend(sets.into_iter().map(|set| {
                FolderEntry::new(format!("{} (package set)", set.name), &set.user_local_dir)
            }));
        }

        let mut packages: Vec<_> = manifest.packages.values().collect();
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        for pkg in packages {
            if registry.is_disabled(&pkg.name) {
                debug!(package = %pkg.name, "Skipping disabled package");
                continue;
            }
            folders.push(FolderEntry::new(pkg.name.clone(), &pkg.srcdir));
        }

        folders
    }
}
