//! Integration controller
//!
//! Runs after every workspace update:
//! 1. Resolve the option gates; stop if integration is disabled
//! 2. Load the current descriptor (a corrupt one aborts the run here,
//!    before anything is written)
//! 3. Compute folders (only when managed) and settings, merge them
//! 4. Write the shims, then the descriptor that references them

use std::io;
use std::path::{Path, PathBuf};

use codews_manifest::{ManifestError, ManifestSource, PackageRegistry};
use tracing::{debug, info, warn};

use crate::config::{
    ConfigError, HostConfig, IntegrationOptions, OptionStore, DECLARED_OPTIONS, INTEGRATION,
    SKIP_DEPENDENCIES,
};
use crate::descriptor::{DescriptorError, DescriptorFile, WorkspaceDescriptor};
use crate::env::EnvProvider;
use crate::folders::FolderResolver;
use crate::hooks::UpdateListener;
use crate::merge::merge;
use crate::settings::{CatalogInputs, SettingsCatalog, DEFAULT_RECOMMENDATIONS};
use crate::shims::ShimGenerator;

/// Tool packages recommended for the editor integration
pub const DEFAULT_DEPENDENCIES: &[&str] = &["pycodestyle-latest", "cpplint-latest"];

/// Errors aborting an integration run
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to write shims: {0}")]
    Shims(#[from] io::Error),
}

/// External sources the controller reads from
pub struct Collaborators {
    pub manifest: Box<dyn ManifestSource>,
    pub registry: Box<dyn PackageRegistry>,
    pub env: Box<dyn EnvProvider>,
    pub options: Box<dyn OptionStore>,
}

/// Outcome of one integration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationReport {
    /// Integration is disabled; nothing was touched
    Disabled,
    Written {
        descriptor: PathBuf,
        shims: Vec<PathBuf>,
        /// Whether the descriptor content differs from what was on disk
        changed: bool,
        folders_managed: bool,
    },
}

/// Outcome of the first-time setup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// Options whose default was stored by this call
    pub declared: Vec<&'static str>,
    /// Tool packages added to the build layout
    pub added: Vec<String>,
    /// Recommended tool packages the registry does not know
    pub missing: Vec<String>,
}

/// Keeps the editor workspace of one source tree up to date
pub struct Integration {
    descriptor: DescriptorFile,
    shims: ShimGenerator,
    folders: FolderResolver,
    build_dir: PathBuf,
    cpplint_root: String,
    line_length: u64,
    recommendations: Vec<String>,
    dependencies: Vec<String>,
    collaborators: Collaborators,
}

impl Integration {
    pub fn new(root: &Path, config: &HostConfig, collaborators: Collaborators) -> Self {
        Self {
            descriptor: DescriptorFile::new(root, &config.workspace_name),
            shims: ShimGenerator::new(root)
                .with_env_script(root, &config.env_script)
                .with_root_marker(&config.root_marker),
            folders: FolderResolver::new(root).with_buildconf_dir(&config.buildconf_dir),
            build_dir: config.build_dir.clone(),
            cpplint_root: config.cpplint_root.clone(),
            line_length: config.line_length,
            recommendations: DEFAULT_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
            dependencies: DEFAULT_DEPENDENCIES.iter().map(|s| s.to_string()).collect(),
            collaborators,
        }
    }

    pub fn descriptor_path(&self) -> &Path {
        self.descriptor.path()
    }

    pub fn options(&self) -> Result<IntegrationOptions, ConfigError> {
        IntegrationOptions::resolve(self.collaborators.options.as_ref())
    }

    /// Compute the merged descriptor without writing anything
    pub fn updated_workspace(
        &self,
        options: &IntegrationOptions,
    ) -> Result<(WorkspaceDescriptor, Option<String>), IntegrationError> {
        let loaded = self.descriptor.load()?;

        let folders = if options.manage_folders {
            let manifest = self.collaborators.manifest.load_manifest()?;
            Some(self.folders.resolve(
                &manifest,
                self.collaborators.registry.as_ref(),
                options.include_package_sets,
            ))
        } else {
            None
        };

        let catalog = SettingsCatalog::new(CatalogInputs {
            shims: self.shims.layout(),
            build_dir: &self.build_dir,
            cpplint_root: &self.cpplint_root,
            line_length: self.line_length,
            python_path: self.collaborators.env.paths("PYTHONPATH"),
        });

        let merged = merge(
            loaded.descriptor,
            &catalog.fragments(),
            folders,
            &self.recommendations,
        );
        Ok((merged, loaded.digest))
    }

    /// Regenerate shims and the workspace descriptor
    pub fn integrate(&self) -> Result<IntegrationReport, IntegrationError> {
        let options = self.options()?;
        if !options.enabled {
            debug!("Workspace integration disabled");
            return Ok(IntegrationReport::Disabled);
        }

        let (workspace, previous_digest) = self.updated_workspace(&options)?;

        let shims = self.shims.write_all(self.collaborators.env.as_ref())?;
        let digest = self.descriptor.save(&workspace)?;
        let changed = previous_digest.as_deref() != Some(digest.as_str());

        if changed {
            info!(path = %self.descriptor.path().display(), "Updated workspace file");
        } else {
            debug!(path = %self.descriptor.path().display(), "Workspace file unchanged");
        }

        Ok(IntegrationReport::Written {
            descriptor: self.descriptor.path().to_path_buf(),
            shims,
            changed,
            folders_managed: options.manage_folders,
        })
    }

    /// Declare the options (each gate only once the previous one is open)
    /// and add the recommended tool packages to the build layout.
    pub fn setup(&mut self) -> Result<SetupReport, IntegrationError> {
        let mut report = SetupReport::default();
        let store = self.collaborators.options.as_mut();

        for spec in DECLARED_OPTIONS {
            if store.declare(&spec)? {
                report.declared.push(spec.key);
            }
            if !store.flag(&spec)? {
                break;
            }
        }

        if !store.flag(&INTEGRATION)? || store.flag(&SKIP_DEPENDENCIES)? {
            return Ok(report);
        }

        let registry = self.collaborators.registry.as_mut();
        for tool in &self.dependencies {
            if !registry.has_package(tool) {
                warn!(package = %tool, "Could not find package recommended for the editor integration");
                report.missing.push(tool.clone());
                continue;
            }
            if !registry.in_layout(tool) {
                registry.add_to_layout(tool)?;
                report.added.push(tool.clone());
            }
        }

        Ok(report)
    }
}

impl UpdateListener for Integration {
    fn name(&self) -> &str {
        "code-workspace"
    }

    fn on_workspace_updated(&mut self) -> Result<(), IntegrationError> {
        self.integrate().map(|_| ())
    }
}
