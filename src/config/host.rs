//! Host configuration
//!
//! Describes where the collaborator files live and how the generated files
//! look. Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Repo config (`<root>/.codews.toml`)
//! 3. Command-line overrides

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::merge::layered;
use super::ConfigError;
use crate::folders::DEFAULT_BUILDCONF_DIR;
use crate::shims::{DEFAULT_ENV_SCRIPT, DEFAULT_ROOT_MARKER};

/// Repo config file name, relative to the workspace root
pub const HOST_CONFIG_FILE: &str = ".codews.toml";

/// Python install prefix whose package directories go on PYTHONPATH
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonPrefix {
    pub prefix: PathBuf,

    #[serde(default = "default_python_version")]
    pub version: String,
}

fn default_python_version() -> String {
    "3".to_string()
}

/// Merged host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Descriptor is written to `<root>/<workspace_name>.code-workspace`
    pub workspace_name: String,

    /// Build output directory; relative means per package
    pub build_dir: PathBuf,

    /// Build configuration directory, relative to the root
    pub buildconf_dir: String,

    pub manifest_path: PathBuf,
    pub registry_path: PathBuf,
    pub options_path: PathBuf,

    /// Environment setup script sourced by the shims
    pub env_script: PathBuf,

    /// Variable unset by the shims before sourcing `env_script`
    pub root_marker: String,

    pub cpplint_root: String,
    pub line_length: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python: Option<PythonPrefix>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            workspace_name: "autoproj".to_string(),
            build_dir: PathBuf::from("build"),
            buildconf_dir: DEFAULT_BUILDCONF_DIR.to_string(),
            manifest_path: PathBuf::from(".codews/installation-manifest.toml"),
            registry_path: PathBuf::from(".codews/packages.toml"),
            options_path: PathBuf::from(".codews/config.toml"),
            env_script: PathBuf::from(DEFAULT_ENV_SCRIPT),
            root_marker: DEFAULT_ROOT_MARKER.to_string(),
            cpplint_root: "include".to_string(),
            line_length: 120,
            python: None,
        }
    }
}

impl HostConfig {
    /// Merge defaults, `<root>/.codews.toml` (if present) and `overrides`
    pub fn load(root: &Path, overrides: Option<Value>) -> Result<Self, ConfigError> {
        let mut layers = vec![serde_json::to_value(Self::default())
            .map_err(|e| ConfigError::ParseError(e.to_string()))?];

        let repo_path = root.join(HOST_CONFIG_FILE);
        if repo_path.exists() {
            layers.push(load_toml_file(&repo_path)?);
        }

        if let Some(cli) = overrides {
            layers.push(cli);
        }

        let config: HostConfig = serde_json::from_value(layered(layers))
            .map_err(|e| ConfigError::ParseError(format!("host configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.workspace_name.is_empty() || self.workspace_name.contains('/') {
            return Err(ConfigError::ValidationError(format!(
                "workspace_name must be a non-empty file name, got '{}'",
                self.workspace_name
            )));
        }
        if self.line_length == 0 {
            return Err(ConfigError::ValidationError(
                "line_length must be greater than 0".to_string(),
            ));
        }
        if self.root_marker.is_empty() {
            return Err(ConfigError::ValidationError(
                "root_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve a configured path against the workspace root
    pub fn resolve(root: &Path, path: &Path) -> PathBuf {
        root.join(path)
    }
}

fn load_toml_file(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_only() {
        let temp = TempDir::new().unwrap();
        let config = HostConfig::load(temp.path(), None).unwrap();
        assert_eq!(config, HostConfig::default());
    }

    #[test]
    fn test_repo_file_and_cli_layers() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(HOST_CONFIG_FILE),
            r#"
            workspace_name = "robot"
            build_dir = "/abs/build"
            line_length = 100

            [python]
            prefix = "/ws/install"
            "#,
        )
        .unwrap();

        let config =
            HostConfig::load(temp.path(), Some(json!({"line_length": 80, "cpplint_root": null})))
                .unwrap();

        assert_eq!(config.workspace_name, "robot");
        assert_eq!(config.build_dir, PathBuf::from("/abs/build"));
        assert_eq!(config.line_length, 80);
        assert_eq!(config.cpplint_root, "include");
        assert_eq!(
            config.python,
            Some(PythonPrefix {
                prefix: PathBuf::from("/ws/install"),
                version: "3".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_workspace_name() {
        let temp = TempDir::new().unwrap();
        let result = HostConfig::load(temp.path(), Some(json!({"workspace_name": "a/b"})));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_malformed_repo_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(HOST_CONFIG_FILE), "line_length = ").unwrap();
        let result = HostConfig::load(temp.path(), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_resolve_paths() {
        let root = Path::new("/ws");
        assert_eq!(
            HostConfig::resolve(root, Path::new(".codews/config.toml")),
            PathBuf::from("/ws/.codews/config.toml")
        );
        assert_eq!(
            HostConfig::resolve(root, Path::new("/etc/codews.toml")),
            PathBuf::from("/etc/codews.toml")
        );
    }
}
