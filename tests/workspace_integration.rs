//! End-to-end integration runs against scratch workspaces
//!
//! Covers:
//! - Idempotent regeneration
//! - Preservation of user settings, folders and path list entries
//! - Managed folder ordering
//! - Refusal to overwrite a corrupt workspace file

use std::fs;
use std::path::Path;

use codews::config::{ADD_CONFIG, INTEGRATION, MANAGE_FOLDERS};
use codews::settings::INCLUDE_PATH_KEY;
use codews::{
    Collaborators, ConfigStore, EnvSnapshot, HostConfig, Integration, IntegrationError,
    IntegrationReport, PostUpdateHooks, SettingValue, ShimTool, WorkspaceDescriptor,
};
use codews_manifest::{InstallationManifest, Registry};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

struct Workspace {
    dir: TempDir,
    manifest: InstallationManifest,
    registry: Registry,
    store: ConfigStore,
    config: HostConfig,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let mut manifest = InstallationManifest::default();
        manifest.add_package("b", root.join("b"));
        manifest.add_package("a", root.join("a"));
        manifest.add_package("c", root.join("c"));
        manifest.add_package_set("core", root.join("autoproj/remotes/core"));

        let mut registry = Registry::default();
        registry.define("a", false).define("b", false).define("c", true);

        Self {
            dir,
            manifest,
            registry,
            store: ConfigStore::in_memory(),
            config: HostConfig::default(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn set(&mut self, key: &str, value: bool) {
        self.store.set(key, value).unwrap();
    }

    fn integration(&self) -> Integration {
        let mut env = EnvSnapshot::default();
        env.set("PYTHONPATH", "/ws/install/lib/python3/site-packages");

        Integration::new(
            self.root(),
            &self.config,
            Collaborators {
                manifest: Box::new(self.manifest.clone()),
                registry: Box::new(self.registry.clone()),
                env: Box::new(env),
                options: Box::new(self.store.clone()),
            },
        )
    }

    fn descriptor_path(&self) -> std::path::PathBuf {
        self.root().join("autoproj.code-workspace")
    }

    fn write_descriptor(&self, value: Value) {
        fs::write(self.descriptor_path(), serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    fn read_descriptor(&self) -> Value {
        serde_json::from_str(&fs::read_to_string(self.descriptor_path()).unwrap()).unwrap()
    }
}

// =============================================================================
// Merge properties
// =============================================================================

mod merge_properties {
    use super::*;

    #[test]
    fn test_idempotent_regeneration() {
        let mut ws = Workspace::new();
        ws.set(MANAGE_FOLDERS.key, true);
        let integration = ws.integration();

        integration.integrate().unwrap();
        let first = fs::read_to_string(ws.descriptor_path()).unwrap();
        integration.integrate().unwrap();
        let second = fs::read_to_string(ws.descriptor_path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_user_setting_survives() {
        let ws = Workspace::new();
        ws.write_descriptor(json!({
            "settings": {"terminal.integrated.fontSize": 14, "[rust]": {"editor.tabSize": 4}}
        }));

        ws.integration().integrate().unwrap();
        let value = ws.read_descriptor();

        assert_eq!(value["settings"]["terminal.integrated.fontSize"], 14);
        assert_eq!(value["settings"]["[rust]"], json!({"editor.tabSize": 4}));
        assert_eq!(value["settings"]["files.autoSave"], "afterDelay");
    }

    #[test]
    fn test_include_path_user_entries_follow_managed_ones() {
        let ws = Workspace::new();
        ws.write_descriptor(json!({
            "settings": {INCLUDE_PATH_KEY: ["/opt/vendor/include", "${default}"]}
        }));

        ws.integration().integrate().unwrap();
        let value = ws.read_descriptor();

        assert_eq!(
            value["settings"][INCLUDE_PATH_KEY],
            json!(["${default}", "${workspaceFolder}/include", "/opt/vendor/include"])
        );
    }

    #[test]
    fn test_top_level_sections_always_present() {
        let ws = Workspace::new();
        ws.write_descriptor(json!({"launch": {"version": "0.2.0"}}));

        ws.integration().integrate().unwrap();
        let value = ws.read_descriptor();

        assert!(value["folders"].is_array());
        assert!(value["settings"].is_object());
        assert_eq!(value["extensions"]["recommendations"][0], "mine.cpplint");
        assert_eq!(value["launch"]["version"], "0.2.0");
    }
}

// =============================================================================
// Folders
// =============================================================================

mod folders {
    use super::*;

    #[test]
    fn test_managed_folders_sorted_without_disabled() {
        let mut ws = Workspace::new();
        ws.set(MANAGE_FOLDERS.key, true);

        ws.integration().integrate().unwrap();
        let value = ws.read_descriptor();

        let names: Vec<_> = value["folders"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_package_sets_included() {
        let mut ws = Workspace::new();
        ws.set(MANAGE_FOLDERS.key, true);
        ws.set(ADD_CONFIG.key, true);

        ws.integration().integrate().unwrap();
        let value = ws.read_descriptor();

        assert_eq!(value["folders"][0]["name"], "autoproj (buildconf)");
        assert_eq!(value["folders"][1]["name"], "core (package set)");
        assert_eq!(value["folders"][2]["name"], "a");
    }

    #[test]
    fn test_unmanaged_folders_preserved_when_manifest_changes() {
        let mut ws = Workspace::new();
        let user_folders = json!([{"name": "notes", "path": "/home/me/notes"}, {"path": "."}]);
        ws.write_descriptor(json!({"folders": user_folders.clone()}));

        ws.integration().integrate().unwrap();
        let added = ws.root().join("d");
        ws.manifest.add_package("d", added);
        ws.registry.define("d", false);
        ws.integration().integrate().unwrap();

        assert_eq!(ws.read_descriptor()["folders"], user_folders);
    }
}

// =============================================================================
// Gates and failures
// =============================================================================

mod gates {
    use super::*;

    #[test]
    fn test_disabled_integration_writes_nothing() {
        let mut ws = Workspace::new();
        ws.set(INTEGRATION.key, false);

        let report = ws.integration().integrate().unwrap();
        assert_eq!(report, IntegrationReport::Disabled);
        assert!(!ws.descriptor_path().exists());
        assert!(!ws.root().join(".vscode").exists());
    }

    #[test]
    fn test_corrupt_descriptor_aborts_without_writes() {
        let ws = Workspace::new();
        fs::write(ws.descriptor_path(), "{\"settings\": {").unwrap();

        let result = ws.integration().integrate();
        assert!(matches!(result, Err(IntegrationError::Descriptor(_))));

        assert_eq!(
            fs::read_to_string(ws.descriptor_path()).unwrap(),
            "{\"settings\": {"
        );
        assert!(!ws.root().join(".vscode").exists());
    }

    #[test]
    fn test_hook_runs_integration() {
        let ws = Workspace::new();
        let mut hooks = PostUpdateHooks::new();
        hooks.register(Box::new(ws.integration()));

        hooks.fire().unwrap();
        assert!(ws.descriptor_path().exists());
    }

    #[test]
    fn test_hook_reports_corrupt_descriptor() {
        let ws = Workspace::new();
        fs::write(ws.descriptor_path(), "not json").unwrap();
        let mut hooks = PostUpdateHooks::new();
        hooks.register(Box::new(ws.integration()));

        let err = hooks.fire().unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
    }
}

// =============================================================================
// Settings and shims on disk
// =============================================================================

mod generated_files {
    use super::*;

    #[test]
    fn test_compile_commands_absolute_build_dir() {
        let mut ws = Workspace::new();
        ws.config.build_dir = "/abs/build".into();

        ws.integration().integrate().unwrap();
        assert_eq!(
            ws.read_descriptor()["settings"]["C_Cpp.default.compileCommands"],
            "/abs/build/${workspaceFolderBasename}/compile_commands.json"
        );
    }

    #[test]
    fn test_compile_commands_relative_build_dir() {
        let ws = Workspace::new();

        ws.integration().integrate().unwrap();
        assert_eq!(
            ws.read_descriptor()["settings"]["C_Cpp.default.compileCommands"],
            "${workspaceFolder}/build/compile_commands.json"
        );
    }

    #[test]
    fn test_settings_reference_written_shims() {
        let ws = Workspace::new();
        ws.integration().integrate().unwrap();

        let value = ws.read_descriptor();
        let python = value["settings"]["python.pythonPath"].as_str().unwrap();
        assert!(Path::new(python).exists());

        let script = fs::read_to_string(python).unwrap();
        let env_script = ws.root().join("env.sh");
        let expected = format!(
            "unset AUTOPROJ_CURRENT_ROOT\n. '{}'\nexec python \"$@\"",
            env_script.display()
        );
        assert!(script.contains(&expected), "unexpected shim:\n{}", script);

        assert_eq!(
            value["settings"]["python.autoComplete.extraPaths"],
            json!(["/ws/install/lib/python3/site-packages"])
        );
    }

    #[test]
    fn test_all_shims_written() {
        let ws = Workspace::new();
        ws.integration().integrate().unwrap();

        for tool in ShimTool::ALL {
            assert!(ws.root().join(".vscode/bin").join(tool.command()).exists());
        }
        let env_file = fs::read_to_string(ws.root().join(".vscode/python.env")).unwrap();
        assert!(env_file.contains("PYTHONPATH='/ws/install/lib/python3/site-packages'"));
    }

    #[test]
    fn test_descriptor_structurally_stable() {
        let ws = Workspace::new();
        let integration = ws.integration();

        integration.integrate().unwrap();
        let first: WorkspaceDescriptor =
            WorkspaceDescriptor::from_json(&fs::read_to_string(ws.descriptor_path()).unwrap())
                .unwrap();
        integration.integrate().unwrap();
        let second =
            WorkspaceDescriptor::from_json(&fs::read_to_string(ws.descriptor_path()).unwrap())
                .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first.settings["cpplint.lineLength"],
            SettingValue::from(120u64)
        );
    }
}
