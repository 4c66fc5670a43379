//! Configuration
//!
//! Two kinds of configuration drive an integration run:
//! - the persisted integration options (gates), declared with defaults in
//!   the workspace option store
//! - the host configuration, merged from built-in defaults, the repo file
//!   (`.codews.toml`) and command-line overrides

mod host;
mod merge;
mod options;

pub use host::{HostConfig, PythonPrefix, HOST_CONFIG_FILE};
pub use merge::{apply_layer, layered};
pub use options::{
    ConfigStore, IntegrationOptions, OptionKind, OptionSpec, OptionStore, ADD_CONFIG,
    DECLARED_OPTIONS, INTEGRATION, MANAGE_FOLDERS, SKIP_DEPENDENCIES,
};

use std::path::PathBuf;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
