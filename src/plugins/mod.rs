//! Plugin system for Hello Project
//!
//! Plugins are named units that take a context map and return a
//! [`PluginResult`]. Two kinds exist:
//!
//! - built-in plugins (`weather`, `quote`), linked into the binary and
//!   configured from the `plugins:` section of the settings
//! - command plugins, discovered at startup from manifest files in the
//!   plugin directory; each wraps a shell command with `{{key}}`
//!   interpolation from the context
//!
//! # Architecture
//!
//! - **types**: Core data structures (`Plugin`, `PluginResult`, `PluginManifest`)
//! - **registry**: Name-keyed registration and panic-safe execution
//! - **loader**: Manifest discovery, loading, and validation
//! - **command**: The manifest-backed command plugin
//! - **weather** / **quote**: Built-in plugins
//! - **http**: The JSON-over-HTTP seam the built-ins call through
//!
//! # Plugin Directory Structure
//!
//! ```text
//! plugins/
//! ├── uptime.yaml
//! ├── git-status.json
//! └── _draft.yaml        (skipped: leading underscore)
//! ```
//!
//! # Example manifest
//!
//! ```yaml
//! name: git-status
//! version: "1.0.0"
//! description: Show the git status of a repository
//! command: "git -C {{path}} status --porcelain"
//! timeout_secs: 10
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use hello_project::config::Settings;
//! use hello_project::plugins::{PluginContext, PluginRegistry};
//!
//! # async fn run() -> hello_project::error::Result<()> {
//! let mut registry = PluginRegistry::with_builtins(&Settings::default());
//! registry.discover(Path::new("plugins"))?;
//!
//! let result = registry.execute("quote", &PluginContext::new()).await;
//! println!("{:?}", result.data);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod http;
mod loader;
pub mod quote;
pub mod registry;
pub mod types;
pub mod weather;

pub use command::CommandPlugin;
pub use http::{JsonFetcher, ReqwestFetcher};
pub use loader::{discover_plugins, is_manifest_file, load_manifest, load_plugin, validate_manifest};
pub use quote::{QuoteConfig, QuotePlugin};
pub use registry::{builtin_factories, PluginFactory, PluginRegistry};
pub use types::{
    parse_plugin_config, Plugin, PluginContext, PluginManifest, PluginResult,
    DEFAULT_PLUGIN_VERSION,
};
pub use weather::{WeatherConfig, WeatherPlugin};
