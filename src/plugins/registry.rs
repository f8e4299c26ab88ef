//! Plugin registry for Hello Project
//!
//! This module provides the `PluginRegistry` struct that owns every
//! registered plugin, keyed by name, and is the single place plugins are
//! invoked from. Invocation never fails: missing plugins, errors and panics
//! all come back as a failed [`PluginResult`].

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::time::Duration;

use futures::FutureExt;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::error::{HelloError, Result};

use super::loader::discover_plugins;
use super::quote::QuotePlugin;
use super::types::{Plugin, PluginContext, PluginResult};
use super::weather::WeatherPlugin;

/// Constructor for a statically linked plugin, given its `config:` map and
/// the HTTP timeout.
pub type PluginFactory = fn(&Map<String, Value>, Duration) -> Result<Box<dyn Plugin>>;

/// Built-in plugins, in registration order.
pub fn builtin_factories() -> &'static [(&'static str, PluginFactory)] {
    &[("weather", weather_factory), ("quote", quote_factory)]
}

fn weather_factory(config: &Map<String, Value>, timeout: Duration) -> Result<Box<dyn Plugin>> {
    Ok(Box::new(WeatherPlugin::from_config(config, timeout)?))
}

fn quote_factory(config: &Map<String, Value>, timeout: Duration) -> Result<Box<dyn Plugin>> {
    Ok(Box::new(QuotePlugin::from_config(config, timeout)?))
}

/// A registry that holds plugins by name, in registration order.
///
/// Registering a plugin under a name that is already taken replaces the
/// earlier plugin and keeps its position in the listing.
///
/// # Example
///
/// ```rust
/// use hello_project::config::Settings;
/// use hello_project::plugins::PluginRegistry;
///
/// let registry = PluginRegistry::with_builtins(&Settings::default());
/// assert_eq!(registry.list(), vec!["weather", "quote"]);
/// ```
pub struct PluginRegistry {
    /// Map from plugin name to plugin instance.
    plugins: HashMap<String, Box<dyn Plugin>>,

    /// Plugin names in first-registration order.
    order: Vec<String>,
}

impl PluginRegistry {
    /// Create a new empty plugin registry.
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a registry holding the built-in plugins, configured from
    /// `settings`.
    ///
    /// Plugins whose settings entry is disabled are left out. A built-in that
    /// cannot be constructed or fails its own validation is logged and
    /// skipped; the rest are still registered.
    pub fn with_builtins(settings: &Settings) -> Self {
        let mut registry = Self::new();
        let timeout = settings.api_timeout_duration();
        let empty = Map::new();

        for (name, factory) in builtin_factories() {
            let entry = settings.plugin_settings(name);
            if entry.is_some_and(|e| !e.enabled) {
                info!(plugin = %name, "Plugin disabled in configuration");
                continue;
            }

            let config = entry.map(|e| &e.config).unwrap_or(&empty);
            let outcome = factory(config, timeout).and_then(|plugin| registry.register(plugin));
            if let Err(e) = outcome {
                warn!(plugin = %name, error = %e, "Failed to load built-in plugin");
            }
        }

        registry
    }

    /// Register a plugin.
    ///
    /// Runs the plugin's `validate_config` self-check first; a plugin that
    /// fails it is not registered.
    ///
    /// # Errors
    /// `HelloError::Config` if `validate_config()` returns false.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<()> {
        let name = plugin.name().to_string();

        if !plugin.validate_config() {
            return Err(HelloError::Config(format!(
                "Plugin {} has invalid configuration",
                name
            )));
        }

        if self.plugins.insert(name.clone(), plugin).is_some() {
            info!(plugin = %name, "Replaced previously registered plugin");
        } else {
            info!(plugin = %name, "Registered plugin");
            self.order.push(name);
        }

        Ok(())
    }

    /// Discover and register the command plugins described by manifests in
    /// `dir`.
    ///
    /// Each manifest is handled on its own: one that cannot be loaded or
    /// fails validation is logged and skipped. Returns the number of plugins
    /// registered.
    ///
    /// # Errors
    /// `HelloError::Config` if `dir` exists but cannot be read.
    pub fn discover(&mut self, dir: &Path) -> Result<usize> {
        let mut registered = 0;

        for plugin in discover_plugins(dir)? {
            let name = plugin.manifest().name.clone();
            match self.register(Box::new(plugin)) {
                Ok(()) => registered += 1,
                Err(e) => warn!(plugin = %name, error = %e, "Rejected discovered plugin"),
            }
        }

        Ok(registered)
    }

    /// Get a plugin by name.
    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    /// Registered plugin names, in registration order.
    pub fn list(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Execute the plugin registered under `name`.
    ///
    /// Never fails: an unknown name, an `Err` from the plugin, or a panic
    /// inside it all produce a failed result. The returned result's
    /// `plugin_name` is always `name`.
    pub async fn execute(&self, name: &str, context: &PluginContext) -> PluginResult {
        let Some(plugin) = self.plugins.get(name) else {
            return PluginResult::not_found(name);
        };

        let outcome = AssertUnwindSafe(plugin.execute(context))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!(plugin = %name, error = %e, "Plugin execution failed");
                PluginResult::failure(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(plugin = %name, panic = %message, "Plugin panicked");
                PluginResult::failure(message)
            }
        };

        result.with_plugin_name(name)
    }

    /// Help text for one plugin, or a listing of all plugins when `name` is
    /// `None`.
    pub fn help(&self, name: Option<&str>) -> String {
        match name {
            Some(name) => match self.get(name) {
                Some(plugin) => plugin.help(),
                None => format!("Plugin '{}' not found", name),
            },
            None => {
                let mut text = String::from("Available plugins:\n");
                for name in &self.order {
                    if let Some(plugin) = self.plugins.get(name) {
                        text.push_str(&format!("  {}: {}\n", name, plugin.description()));
                    }
                }
                text
            }
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "plugin panicked".to_string()
    }
}
