//! codews CLI
//!
//! Host entry point: loads the workspace collaborators, registers the
//! integration as a post-update hook and fires it.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codews::config::{HostConfig, DECLARED_OPTIONS};
use codews::env::prepare_python_prefix;
use codews::{
    Collaborators, ConfigStore, EnvSnapshot, Integration, IntegrationReport, OptionStore,
    PostUpdateHooks, ShimTool,
};
use codews_manifest::{ManifestFile, Registry};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codews")]
#[command(about = "VS Code workspace integration for multi-package source trees", version)]
struct Cli {
    /// Workspace root (default: current directory)
    #[arg(long, short = 'r', global = true)]
    root: Option<PathBuf>,

    /// Workspace file name, without extension
    #[arg(long, global = true)]
    workspace_name: Option<String>,

    /// Build directory (absolute, or relative to each package)
    #[arg(long, global = true)]
    build_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the post-update hooks: regenerate shims and the workspace file
    Integrate,

    /// Declare integration options and register recommended tool packages
    Setup,

    /// Show the resolved integration options
    Options {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the shim for a tool (cpplint, pycodestyle, python)
    RenderShim {
        tool: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let root = match cli.root.clone().map(Ok).unwrap_or_else(std::env::current_dir) {
        Ok(root) => root,
        Err(e) => fail(&format!("Cannot determine workspace root: {}", e)),
    };

    let overrides = serde_json::json!({
        "workspace_name": cli.workspace_name,
        "build_dir": cli.build_dir,
    });
    let config = match HostConfig::load(&root, Some(overrides)) {
        Ok(config) => config,
        Err(e) => fail(&format!("Configuration error: {}", e)),
    };

    match cli.command {
        Commands::Integrate => run_integrate(&root, &config),
        Commands::Setup => run_setup(&root, &config),
        Commands::Options { json } => run_options(&root, &config, json),
        Commands::RenderShim { tool } => run_render_shim(&root, &config, &tool),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn build_integration(root: &Path, config: &HostConfig) -> Result<Integration, String> {
    let mut env = EnvSnapshot::from_process();
    if let Some(python) = &config.python {
        let prefix = HostConfig::resolve(root, &python.prefix);
        prepare_python_prefix(&prefix, &python.version, &mut env)
            .map_err(|e| format!("Failed to prepare {}: {}", prefix.display(), e))?;
    }

    let registry_path = HostConfig::resolve(root, &config.registry_path);
    let registry = if registry_path.exists() {
        Registry::load(&registry_path).map_err(|e| e.to_string())?
    } else {
        debug!(path = %registry_path.display(), "No package registry, all packages count as disabled");
        Registry::default()
    };

    let options = ConfigStore::load(&HostConfig::resolve(root, &config.options_path))
        .map_err(|e| e.to_string())?;

    Ok(Integration::new(
        root,
        config,
        Collaborators {
            manifest: Box::new(ManifestFile::new(HostConfig::resolve(
                root,
                &config.manifest_path,
            ))),
            registry: Box::new(registry),
            env: Box::new(env),
            options: Box::new(options),
        },
    ))
}

fn run_integrate(root: &Path, config: &HostConfig) {
    let integration = match build_integration(root, config) {
        Ok(i) => i,
        Err(e) => fail(&e),
    };

    // Report before handing the integration over to the hook registry
    let report_path = integration.descriptor_path().to_path_buf();
    let enabled = match integration.options() {
        Ok(options) => options.enabled,
        Err(e) => fail(&format!("Configuration error: {}", e)),
    };

    let mut hooks = PostUpdateHooks::new();
    hooks.register(Box::new(integration));

    if let Err(e) = hooks.fire() {
        fail(&format!("Integration failed: {}", e));
    }

    if enabled {
        println!("Wrote: {}", report_path.display());
    } else {
        println!("Workspace integration disabled");
    }
}

fn run_setup(root: &Path, config: &HostConfig) {
    let mut integration = match build_integration(root, config) {
        Ok(i) => i,
        Err(e) => fail(&e),
    };

    let report = match integration.setup() {
        Ok(report) => report,
        Err(e) => fail(&format!("Setup failed: {}", e)),
    };

    for key in &report.declared {
        println!("Declared {}", key);
    }
    for pkg in &report.added {
        println!("Added {} to the build layout", pkg);
    }
    for pkg in &report.missing {
        eprintln!("Warning: could not find package `{}`, recommended for the editor integration", pkg);
    }

    match integration.integrate() {
        Ok(IntegrationReport::Written { descriptor, .. }) => {
            println!("Wrote: {}", descriptor.display())
        }
        Ok(IntegrationReport::Disabled) => {}
        Err(e) => fail(&format!("Integration failed: {}", e)),
    }
}

fn run_options(root: &Path, config: &HostConfig, json: bool) {
    let store = match ConfigStore::load(&HostConfig::resolve(root, &config.options_path)) {
        Ok(store) => store,
        Err(e) => fail(&format!("Configuration error: {}", e)),
    };

    let mut values = Vec::with_capacity(DECLARED_OPTIONS.len());
    for spec in &DECLARED_OPTIONS {
        match store.flag(spec) {
            Ok(value) => values.push((spec, value, store.get(spec.key).is_some())),
            Err(e) => fail(&format!("Configuration error: {}", e)),
        }
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = values
            .iter()
            .map(|(spec, value, _)| (spec.key.to_string(), serde_json::Value::Bool(*value)))
            .collect();
        match serde_json::to_string_pretty(&map) {
            Ok(s) => println!("{}", s),
            Err(e) => fail(&format!("Error serializing output: {}", e)),
        }
        return;
    }

    for (spec, value, set) in values {
        println!(
            "{} = {}{}",
            spec.key,
            if value { "yes" } else { "no" },
            if set { "" } else { " (default)" }
        );
        println!("    {}", spec.doc);
    }
}

fn run_render_shim(root: &Path, config: &HostConfig, tool: &str) {
    let Some(tool) = ShimTool::from_command(tool) else {
        fail(&format!(
            "Unknown tool '{}', expected one of: cpplint, pycodestyle, python",
            tool
        ));
    };

    let shims = codews::ShimGenerator::new(root)
        .with_env_script(root, &config.env_script)
        .with_root_marker(&config.root_marker);
    print!("{}", shims.render(tool));
}
