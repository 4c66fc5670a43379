//! Settings catalog
//!
//! Pure functions producing the managed settings fragments. Every input is
//! resolved by the caller beforehand; nothing here touches the filesystem
//! or the environment.

use std::path::Path;

use super::{SettingValue, SettingsFragment};
use crate::shims::{ShimLayout, ShimTool};

/// Include path list; user entries are kept across regenerations
pub const INCLUDE_PATH_KEY: &str = "C_Cpp.default.includePath";

/// Browse path list; user entries are kept across regenerations
pub const BROWSE_PATH_KEY: &str = "C_Cpp.default.browse.path";

/// Extensions recommended to everyone opening the workspace
pub const DEFAULT_RECOMMENDATIONS: &[&str] = &[
    "mine.cpplint",
    "ms-vscode.cpptools",
    "ms-python.python",
    "visualstudioexptteam.vscodeintellicode",
    "arjones.autoproj",
    "twxs.cmake",
];

const CPPLINT_EXTENSIONS: &[&str] = &[
    "cpp", "h++", "c", "c++", "hxx", "hpp", "cc", "cxx", "h", "hh",
];

/// Location of the compile database for the editor.
///
/// An absolute build directory is shared by all packages, so the package
/// is selected with `${workspaceFolderBasename}`. A relative one lives
/// inside each package and is anchored at `${workspaceFolder}`.
pub fn compile_commands_path(build_dir: &Path) -> String {
    let path = if build_dir.is_absolute() {
        build_dir
            .join("${workspaceFolderBasename}")
            .join("compile_commands.json")
    } else {
        Path::new("${workspaceFolder}")
            .join(build_dir)
            .join("compile_commands.json")
    };
    path.to_string_lossy().into_owned()
}

/// Values the catalog depends on
#[derive(Debug, Clone)]
pub struct CatalogInputs<'a> {
    pub shims: &'a ShimLayout,
    pub build_dir: &'a Path,
    pub cpplint_root: &'a str,
    pub line_length: u64,
    /// PYTHONPATH entries, empty when unset
    pub python_path: Vec<String>,
}

/// Produces the managed fragments for one integration run
#[derive(Debug, Clone)]
pub struct SettingsCatalog<'a> {
    inputs: CatalogInputs<'a>,
}

impl<'a> SettingsCatalog<'a> {
    pub fn new(inputs: CatalogInputs<'a>) -> Self {
        Self { inputs }
    }

    /// All fragments, in application order
    pub fn fragments(&self) -> Vec<SettingsFragment> {
        vec![self.python(), self.editor(), self.c_cpp(), self.cpplint()]
    }

    pub fn python(&self) -> SettingsFragment {
        let shims = self.inputs.shims;
        let max_line = ["--max-line-length".to_string(), self.inputs.line_length.to_string()];

        SettingsFragment::new("python")
            .with("python.formatting.autopep8Args", SettingValue::strings(&max_line))
            .with("python.linting.pep8Args", SettingValue::strings(&max_line))
            .with("python.linting.enabled", true)
            .with("python.linting.lintOnSave", true)
            .with("python.linting.pylintEnabled", true)
            .with("python.linting.pep8Enabled", true)
            .with("python.pythonPath", path_value(&shims.shim_path(ShimTool::Python)))
            .with("python.linting.pep8Path", path_value(&shims.shim_path(ShimTool::Pycodestyle)))
            .with("python.envFile", path_value(shims.python_env_path()))
            .with("python.autoComplete.extraPaths", self.inputs.python_path.clone())
    }

    pub fn editor(&self) -> SettingsFragment {
        SettingsFragment::new("editor")
            .with("files.autoSave", "afterDelay")
            .with("editor.detectIndentation", false)
            .with("[python]", serde_json::json!({ "editor.tabSize": 4 }))
            .with("[cpp]", serde_json::json!({ "editor.tabSize": 2 }))
    }

    pub fn c_cpp(&self) -> SettingsFragment {
        SettingsFragment::new("c_cpp")
            .with(
                "C_Cpp.clang_format_fallbackStyle",
                format!(
                    "{{BasedOnStyle: Google, ColumnLimit: {}}}",
                    self.inputs.line_length
                ),
            )
            .with(
                INCLUDE_PATH_KEY,
                SettingValue::strings(&["${default}", "${workspaceFolder}/include"]),
            )
            .with(
                BROWSE_PATH_KEY,
                SettingValue::strings(&["${default}", "${workspaceFolder}/**"]),
            )
            .with(
                "C_Cpp.default.compileCommands",
                compile_commands_path(self.inputs.build_dir),
            )
    }

    pub fn cpplint(&self) -> SettingsFragment {
        SettingsFragment::new("cpplint")
            .with("cpplint.cpplintPath", path_value(&self.inputs.shims.shim_path(ShimTool::Cpplint)))
            .with("cpplint.lineLength", self.inputs.line_length)
            .with("cpplint.root", self.inputs.cpplint_root)
            .with("cpplint.repository", "${workspaceFolder}")
            .with("cpplint.headers", SettingValue::StringList(Vec::new()))
            .with("cpplint.extensions", SettingValue::strings(CPPLINT_EXTENSIONS))
    }
}

fn path_value(path: &Path) -> SettingValue {
    SettingValue::String(path.to_string_lossy().into_owned())
}
