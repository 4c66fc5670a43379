//! Integration options
//!
//! Options live in the workspace option store as a TOML `[options]` table.
//! Booleans accept TOML booleans as well as yes/no/true/false strings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Value type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Boolean,
}

/// Declaration of a persisted option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub key: &'static str,
    pub kind: OptionKind,
    pub default: bool,
    pub doc: &'static str,
}

/// Gate 1: generate the workspace at all
pub const INTEGRATION: OptionSpec = OptionSpec {
    key: "CODE_INTEGRATION",
    kind: OptionKind::Boolean,
    default: true,
    doc: "Do you want a Visual Studio Code workspace file to be generated? (yes or no)",
};

/// Gate 2: replace the folder list on every run
pub const MANAGE_FOLDERS: OptionSpec = OptionSpec {
    key: "CODE_MANAGE_FOLDERS",
    kind: OptionKind::Boolean,
    default: false,
    doc: "Should folders of the Visual Studio Code workspace be managed automatically? (yes or no)",
};

/// Gate 3: list the build configuration and package sets as folders
pub const ADD_CONFIG: OptionSpec = OptionSpec {
    key: "CODE_ADD_CONFIG",
    kind: OptionKind::Boolean,
    default: false,
    doc: "Should the buildconf and package sets be included in the Visual Studio Code workspace? (yes or no)",
};

/// Read but never declared
pub const SKIP_DEPENDENCIES: OptionSpec = OptionSpec {
    key: "CODE_SKIP_DEPENDENCIES",
    kind: OptionKind::Boolean,
    default: false,
    doc: "Skip adding the recommended tool packages to the build layout",
};

/// Options declared during setup, in gate order
pub const DECLARED_OPTIONS: [OptionSpec; 3] = [INTEGRATION, MANAGE_FOLDERS, ADD_CONFIG];

/// Persisted key/value options
pub trait OptionStore {
    /// Record `spec` with its default unless a value is already set.
    /// Returns true when the default was inserted.
    fn declare(&mut self, spec: &OptionSpec) -> Result<bool, ConfigError>;

    fn get(&self, key: &str) -> Option<&toml::Value>;

    /// Boolean value of `key`, or `default` when unset
    fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(toml::Value::Boolean(b)) => Ok(*b),
            Some(toml::Value::String(s)) => parse_bool(s).ok_or_else(|| {
                ConfigError::ValidationError(format!("{} must be yes or no, got '{}'", key, s))
            }),
            Some(other) => Err(ConfigError::ValidationError(format!(
                "{} must be a boolean, got {}",
                key,
                other.type_str()
            ))),
        }
    }

    /// Boolean value of a declared option
    fn flag(&self, spec: &OptionSpec) -> Result<bool, ConfigError> {
        self.get_bool(spec.key, spec.default)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    options: BTreeMap<String, toml::Value>,
}

/// Option store persisted to a TOML file, or held in memory
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, toml::Value>,
}

impl ConfigStore {
    /// A store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file is an empty store
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let values = match fs::read_to_string(path) {
            Ok(content) => {
                let file: StoreFile = toml::from_str(&content).map_err(|e| {
                    ConfigError::ParseError(format!("{}: {}", path.display(), e))
                })?;
                file.options
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            values,
        })
    }

    /// Set a value (and persist it when file-backed)
    pub fn set(&mut self, key: &str, value: impl Into<toml::Value>) -> Result<(), ConfigError> {
        self.values.insert(key.to_string(), value.into());
        self.save()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = StoreFile {
            options: self.values.clone(),
        };
        let content = toml::to_string_pretty(&file)
            .map_err(|e| ConfigError::ParseError(format!("TOML serialize error: {}", e)))?;
        let io_err = |source| ConfigError::Io {
            path: path.clone(),
            source,
        };

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(io_err)?;
        let temp_path = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let written = fs::write(&temp_path, content).and_then(|()| fs::rename(&temp_path, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(io_err(e));
        }
        Ok(())
    }
}

impl OptionStore for ConfigStore {
    fn declare(&mut self, spec: &OptionSpec) -> Result<bool, ConfigError> {
        if self.values.contains_key(spec.key) {
            return Ok(false);
        }
        let default = match spec.kind {
            OptionKind::Boolean => toml::Value::Boolean(spec.default),
        };
        self.values.insert(spec.key.to_string(), default);
        self.save()?;
        Ok(true)
    }

    fn get(&self, key: &str) -> Option<&toml::Value> {
        self.values.get(key)
    }
}

/// Gates of one integration run, resolved once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntegrationOptions {
    pub enabled: bool,
    pub manage_folders: bool,
    pub include_package_sets: bool,
}

impl IntegrationOptions {
    /// Read the gates in order. A closed gate leaves every later option
    /// unread and false.
    pub fn resolve(store: &dyn OptionStore) -> Result<Self, ConfigError> {
        let mut options = Self::default();

        options.enabled = store.flag(&INTEGRATION)?;
        if !options.enabled {
            return Ok(options);
        }

        options.manage_folders = store.flag(&MANAGE_FOLDERS)?;
        if !options.manage_folders {
            return Ok(options);
        }

        options.include_package_sets = store.flag(&ADD_CONFIG)?;
        Ok(options)
    }
}
