//! Workspace descriptor (`<name>.code-workspace`)
//!
//! The descriptor is shared with the user: keys this crate does not manage
//! are carried through a load/save cycle unchanged. A file that exists but
//! cannot be parsed is an error; it is never replaced by an empty value.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::settings::SettingValue;

/// File extension of workspace descriptors
pub const DESCRIPTOR_EXTENSION: &str = "code-workspace";

/// One folder shown in the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderEntry {
    /// Display name; user-added folders may have none
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "path_is_empty")]
    pub path: PathBuf,

    /// Other keys of user-added folders (e.g. `uri`)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn path_is_empty(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

impl FolderEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// The `extensions` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extensions {
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// e.g. `unwantedRecommendations`
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// In-memory form of a `.code-workspace` file
///
/// `folders`, `settings` and `extensions` are always written, even when the
/// file they were read from lacked them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceDescriptor {
    #[serde(default)]
    pub folders: Vec<FolderEntry>,

    #[serde(default)]
    pub settings: BTreeMap<String, SettingValue>,

    #[serde(default)]
    pub extensions: Extensions,

    /// Top-level keys owned by the user (`launch`, `tasks`, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl WorkspaceDescriptor {
    /// The canonical empty descriptor
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Errors reading or writing a descriptor
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Workspace file {path} is not valid JSON, refusing to overwrite it: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize workspace: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A descriptor together with the digest of the bytes it was read from
#[derive(Debug, Clone)]
pub struct LoadedDescriptor {
    pub descriptor: WorkspaceDescriptor,

    /// SHA-256 of the file content, None when the file did not exist
    pub digest: Option<String>,
}

/// Location of a workspace descriptor on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorFile {
    path: PathBuf,
}

impl DescriptorFile {
    /// `<root>/<name>.code-workspace`
    pub fn new(root: &Path, name: &str) -> Self {
        Self {
            path: root.join(format!("{}.{}", name, DESCRIPTOR_EXTENSION)),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the descriptor, or the empty one if the file does not exist
    pub fn load(&self) -> Result<LoadedDescriptor, DescriptorError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(LoadedDescriptor {
                    descriptor: WorkspaceDescriptor::empty(),
                    digest: None,
                });
            }
            Err(source) => {
                return Err(DescriptorError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let descriptor =
            serde_json::from_slice(&bytes).map_err(|source| DescriptorError::Parse {
                path: self.path.clone(),
                source,
            })?;

        Ok(LoadedDescriptor {
            descriptor,
            digest: Some(content_digest(&bytes)),
        })
    }

    /// Replace the file atomically (write-then-rename), returning the digest
    /// of the written content
    pub fn save(&self, descriptor: &WorkspaceDescriptor) -> Result<String, DescriptorError> {
        let json = descriptor.to_json()?;
        let io_err = |source| DescriptorError::Io {
            path: self.path.clone(),
            source,
        };

        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        let temp_path = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let written = fs::write(&temp_path, &json).and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(io_err(e));
        }

        Ok(content_digest(json.as_bytes()))
    }
}

/// Hex SHA-256 of raw file content
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
