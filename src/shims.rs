//! Shim scripts
//!
//! External tools launched by the editor (linters, the interpreter) do not
//! inherit the workspace environment. Each shim drops the marker of any
//! enclosing workspace, sources the workspace environment script, then
//! execs the real tool with the original arguments.
//!
//! Shims are regenerated on every run; there is nothing to merge.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::env::EnvProvider;

/// Mode of the generated scripts
pub const SCRIPT_MODE: u32 = 0o755;

/// Mode of the environment file
pub const ENV_FILE_MODE: u32 = 0o644;

/// Default name of the variable marking the active workspace root
pub const DEFAULT_ROOT_MARKER: &str = "AUTOPROJ_CURRENT_ROOT";

/// Default environment setup script, relative to the workspace root
pub const DEFAULT_ENV_SCRIPT: &str = "env.sh";

const GENERATED_HEADER: &str = "# Automatically generated by codews";

/// Tools that get a shim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimTool {
    Cpplint,
    Pycodestyle,
    Python,
}

impl ShimTool {
    pub const ALL: [ShimTool; 3] = [ShimTool::Cpplint, ShimTool::Pycodestyle, ShimTool::Python];

    /// Command the shim delegates to; also the shim's file name
    pub fn command(&self) -> &'static str {
        match self {
            ShimTool::Cpplint => "cpplint",
            ShimTool::Pycodestyle => "pycodestyle",
            ShimTool::Python => "python",
        }
    }

    pub fn from_command(command: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.command() == command)
    }
}

/// Where the editor support files live under a workspace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimLayout {
    dot_vscode_dir: PathBuf,
    bin_dir: PathBuf,
    python_env_path: PathBuf,
}

impl ShimLayout {
    pub fn new(root: &Path) -> Self {
        let dot_vscode_dir = root.join(".vscode");
        Self {
            bin_dir: dot_vscode_dir.join("bin"),
            python_env_path: dot_vscode_dir.join("python.env"),
            dot_vscode_dir,
        }
    }

    pub fn dot_vscode_dir(&self) -> &Path {
        &self.dot_vscode_dir
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    pub fn python_env_path(&self) -> &Path {
        &self.python_env_path
    }

    pub fn shim_path(&self, tool: ShimTool) -> PathBuf {
        self.bin_dir.join(tool.command())
    }
}

/// Renders and writes the shims of one workspace
#[derive(Debug, Clone)]
pub struct ShimGenerator {
    layout: ShimLayout,
    env_script: PathBuf,
    root_marker: String,
}

impl ShimGenerator {
    pub fn new(root: &Path) -> Self {
        Self {
            layout: ShimLayout::new(root),
            env_script: root.join(DEFAULT_ENV_SCRIPT),
            root_marker: DEFAULT_ROOT_MARKER.to_string(),
        }
    }

    /// Override the environment script (absolute, or relative to the root)
    pub fn with_env_script(mut self, root: &Path, script: &Path) -> Self {
        self.env_script = root.join(script);
        self
    }

    pub fn with_root_marker(mut self, marker: &str) -> Self {
        self.root_marker = marker.to_string();
        self
    }

    pub fn layout(&self) -> &ShimLayout {
        &self.layout
    }

    /// Script body for one tool
    pub fn render(&self, tool: ShimTool) -> String {
        format!(
            "#!/bin/sh\n{header}\n\nunset {marker}\n. {script}\nexec {command} \"$@\"\n",
            header = GENERATED_HEADER,
            marker = self.root_marker,
            script = shell_quote(&self.env_script.to_string_lossy()),
            command = tool.command(),
        )
    }

    /// Environment file read by the python extension
    pub fn render_python_env(&self, env: &dyn EnvProvider) -> String {
        format!(
            "{header}\n\nPYTHONUSERBASE={userbase}\nPYTHONPATH={path}\n",
            header = GENERATED_HEADER,
            userbase = shell_quote(&env.value("PYTHONUSERBASE").unwrap_or_default()),
            path = shell_quote(&env.value("PYTHONPATH").unwrap_or_default()),
        )
    }

    /// Write the environment file and every shim, returning the written paths
    pub fn write_all(&self, env: &dyn EnvProvider) -> io::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(ShimTool::ALL.len() + 1);

        let env_path = self.layout.python_env_path().to_path_buf();
        write_file(&env_path, ENV_FILE_MODE, &self.render_python_env(env))?;
        written.push(env_path);

        for tool in ShimTool::ALL {
            written.push(self.write(tool)?);
        }

        Ok(written)
    }

    /// Write a single shim
    pub fn write(&self, tool: ShimTool) -> io::Result<PathBuf> {
        let path = self.layout.shim_path(tool);
        write_file(&path, SCRIPT_MODE, &self.render(tool))?;
        Ok(path)
    }
}

/// Single-quote `value` for a POSIX shell
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Overwrite `path`, creating its directory first, then fix its mode
fn write_file(path: &Path, mode: u32, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}
