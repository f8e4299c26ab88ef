//! Command-line interface for Hello Project.

mod interactive;
mod output;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hello_project::config::{
    ConfigResolver, ConfigSource, OutputFormat, Settings, SettingsOverrides,
};
use hello_project::plugins::{PluginContext, PluginRegistry};

use self::interactive::run_interactive;
use self::output::{build_report, format_output, now_timestamp};

const EXAMPLES: &str = "\
Examples:
  hello --name \"World\"
  hello --config config.yaml --plugin weather --plugin quote
  hello --interactive
  hello --plugins-help
  hello --output-format json --save-config ./hello_config.yaml";

#[derive(Parser, Debug)]
#[command(name = "hello")]
#[command(version, about = "Enhanced GitHub CLI practice script with plugins")]
#[command(after_help = EXAMPLES)]
pub(crate) struct Cli {
    /// Name to greet
    #[arg(long)]
    pub name: Option<String>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable plugin (can be used multiple times)
    #[arg(long = "plugin", value_name = "NAME")]
    pub plugins: Vec<String>,

    /// Show help for all plugins
    #[arg(long)]
    pub plugins_help: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Run in interactive mode
    #[arg(long)]
    pub interactive: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Write the resolved configuration as YAML and exit
    /// (default: ~/.config/hello_project/config.yaml)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub save_config: Option<Option<PathBuf>>,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            name: self.name.clone(),
            verbose: self.verbose,
            output_format: self.output_format,
        }
    }
}

/// Resolve settings from file and environment, then apply the command line.
///
/// Also returns where the settings came from, for logging once the
/// subscriber is up.
pub(crate) fn load_settings(cli: &Cli) -> Result<(Settings, ConfigSource)> {
    let resolver = ConfigResolver::new(cli.config.clone());
    let source = resolver.source();
    let mut settings = resolver
        .resolve()
        .with_context(|| "Failed to load configuration")?;
    cli.overrides().apply(&mut settings);
    Ok((settings, source))
}

/// Log to stderr. `RUST_LOG` wins; otherwise `info` when verbose, `warn` if not.
pub(crate) fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Built-in plugins plus whatever the plugin directory provides.
pub(crate) fn build_registry(settings: &Settings) -> PluginRegistry {
    let mut registry = PluginRegistry::with_builtins(settings);
    let dir = Path::new(&settings.plugin_directory);
    match registry.discover(dir) {
        Ok(0) => {}
        Ok(n) => info!(count = n, dir = %dir.display(), "Loaded external plugins"),
        Err(e) => warn!(dir = %dir.display(), error = %e, "Plugin discovery failed"),
    }
    registry
}

/// Run every requested plugin with the greeted name as context and render
/// the report.
pub(crate) async fn run_once(
    settings: &Settings,
    registry: &PluginRegistry,
    plugins: &[String],
) -> Result<String> {
    let mut context = PluginContext::new();
    context.insert("name".into(), json!(settings.default_name));

    let mut results = Vec::with_capacity(plugins.len());
    for name in plugins {
        results.push((name.clone(), registry.execute(name, &context).await));
    }

    let report = build_report(&settings.default_name, &results);
    let timestamp = settings.show_timestamp.then(now_timestamp);
    format_output(report, settings.format(), timestamp.as_deref())
        .with_context(|| "Failed to render output")
}

/// Entry point after argument parsing.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let (settings, source) = load_settings(&cli)?;
    init_logging(settings.verbose);
    source.report();
    info!("Starting hello");

    if let Some(path) = &cli.save_config {
        let written = ConfigResolver::save(&settings, path.as_deref())
            .with_context(|| "Failed to save configuration")?;
        println!("Configuration saved to {}", written.display());
        return Ok(());
    }

    let registry = build_registry(&settings);

    if cli.plugins_help {
        println!("{}", registry.help(None));
        return Ok(());
    }

    if cli.interactive {
        let stdin = io::stdin();
        return run_interactive(&settings, &registry, stdin.lock(), io::stdout()).await;
    }

    println!("{}", run_once(&settings, &registry, &cli.plugins).await?);
    info!("Completed successfully");
    Ok(())
}
