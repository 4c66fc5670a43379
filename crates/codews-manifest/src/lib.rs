//! Collaborator data formats for codews
//!
//! The workspace integration only reads these sources; they are owned by
//! the build orchestrator:
//! - the installation manifest, listing package sets and packages with
//!   their on-disk locations
//! - the package registry, knowing which packages are defined, which are
//!   disabled and which belong to the build layout

pub mod manifest;
pub mod registry;

pub use manifest::{InstallationManifest, ManifestFile, ManifestSource, PackageEntry, PackageSetEntry};
pub use registry::{PackageRegistry, Registry, RegistryPackage};

use std::path::PathBuf;

/// Errors raised while loading or updating collaborator data
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize registry: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Duplicate {kind} name: '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("Unknown package: '{0}'")]
    UnknownPackage(String),
}
