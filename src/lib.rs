//! codews - VS Code workspace integration for multi-package source trees
//!
//! Keeps a shared `<name>.code-workspace` file in sync with the packages
//! checked out in a workspace while preserving whatever the user edited in
//! it, and writes small shim scripts so editor tools run inside the
//! workspace environment.

pub mod config;
pub mod descriptor;
pub mod env;
pub mod folders;
pub mod hooks;
pub mod integration;
pub mod merge;
pub mod settings;
pub mod shims;

pub use config::{ConfigStore, HostConfig, IntegrationOptions, OptionStore};
pub use descriptor::{DescriptorError, DescriptorFile, FolderEntry, WorkspaceDescriptor};
pub use env::{EnvProvider, EnvSnapshot};
pub use folders::FolderResolver;
pub use hooks::{PostUpdateHooks, UpdateListener};
pub use integration::{Collaborators, Integration, IntegrationError, IntegrationReport};
pub use settings::{SettingValue, SettingsCatalog, SettingsFragment};
pub use shims::{ShimGenerator, ShimTool};
