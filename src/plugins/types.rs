//! Plugin types for Hello Project
//!
//! This module defines the `Plugin` capability trait every plugin implements,
//! the uniform `PluginResult` returned by every invocation, and the manifest
//! structure used to describe external command plugins.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{HelloError, Result};

/// Key/value input handed to a plugin on every invocation.
pub type PluginContext = Map<String, Value>;

/// Version reported by plugins that don't override [`Plugin::version`].
pub const DEFAULT_PLUGIN_VERSION: &str = "1.0.0";

// ---------------------------------------------------------------------------
// PluginResult
// ---------------------------------------------------------------------------

/// Outcome of a plugin invocation.
///
/// A successful result carries `data` and no `error`; a failed one carries
/// `error` and usually no `data`. `plugin_name` is stamped by the registry
/// with the name the plugin was invoked under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginResult {
    pub success: bool,

    #[serde(default)]
    pub data: Option<Value>,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub plugin_name: String,
}

impl PluginResult {
    /// A successful result carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            plugin_name: String::new(),
        }
    }

    /// A failed result carrying `error`.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            plugin_name: String::new(),
        }
    }

    /// The result returned when no plugin is registered under `name`.
    pub fn not_found(name: &str) -> Self {
        Self::failure(format!("Plugin '{}' not found", name)).with_plugin_name(name)
    }

    pub fn with_plugin_name(mut self, name: &str) -> Self {
        self.plugin_name = name.to_string();
        self
    }
}

// ---------------------------------------------------------------------------
// Plugin trait
// ---------------------------------------------------------------------------

/// The capability set every plugin provides.
///
/// Only `execute` is required behavior. Implementations may return `Err`
/// for unexpected faults; the registry converts those (and panics) into a
/// failed [`PluginResult`], so callers of
/// [`PluginRegistry::execute`](super::PluginRegistry::execute) never see them.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique name the plugin is registered under.
    fn name(&self) -> &str;

    /// One-line description shown in plugin listings.
    fn description(&self) -> &str;

    fn version(&self) -> &str {
        DEFAULT_PLUGIN_VERSION
    }

    /// Run the plugin against `context`.
    async fn execute(&self, context: &PluginContext) -> Result<PluginResult>;

    /// Self-check run once at registration. Returning `false` rejects the
    /// plugin; suspicious-but-usable settings should log a warning and
    /// return `true`.
    fn validate_config(&self) -> bool {
        true
    }

    /// Operator-facing help text.
    fn help(&self) -> String {
        format!("{}: {}", self.name(), self.description())
    }
}

/// Deserialize a plugin's free-form configuration map into its typed config.
pub fn parse_plugin_config<T: DeserializeOwned>(
    plugin: &str,
    config: &Map<String, Value>,
) -> Result<T> {
    serde_json::from_value(Value::Object(config.clone())).map_err(|e| {
        HelloError::Config(format!(
            "Invalid configuration for plugin '{}': {}",
            plugin, e
        ))
    })
}

// ---------------------------------------------------------------------------
// PluginManifest
// ---------------------------------------------------------------------------

/// Manifest describing an external command plugin, loaded from a
/// `.json`, `.yaml` or `.yml` file in the plugin directory.
///
/// # Example
///
/// ```yaml
/// name: uptime
/// version: "1.2.0"
/// description: Show how long the machine has been up
/// command: "uptime -p"
/// timeout_secs: 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin name: 1-64 alphanumeric characters, hyphens or underscores,
    /// starting with an alphanumeric character.
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    pub description: String,

    /// Shell command template. `{{key}}` is replaced with the context value
    /// for `key`, single-quoted.
    pub command: String,

    /// Working directory for the command. Relative paths are resolved
    /// against the directory holding the manifest.
    #[serde(default)]
    pub working_dir: Option<String>,

    /// Defaults to 10 seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub env: Option<HashMap<String, String>>,

    /// Help text returned instead of the default `<name>: <description>`.
    #[serde(default)]
    pub help: Option<String>,
}

fn default_version() -> String {
    DEFAULT_PLUGIN_VERSION.to_string()
}

impl PluginManifest {
    /// Returns the effective timeout in seconds, defaulting to 10.
    pub fn effective_timeout(&self) -> u64 {
        self.timeout_secs.unwrap_or(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoPlugin;

    #[async_trait]
    impl Plugin for EchoPlugin {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the context back"
        }

        async fn execute(&self, context: &PluginContext) -> Result<PluginResult> {
            Ok(PluginResult::ok(Value::Object(context.clone())))
        }
    }

    #[test]
    fn test_plugin_result_success() {
        let result = PluginResult::ok(json!({"test": "value"})).with_plugin_name("test");
        assert!(result.success);
        assert_eq!(result.data, Some(json!({"test": "value"})));
        assert!(result.error.is_none());
        assert_eq!(result.plugin_name, "test");
    }

    #[test]
    fn test_plugin_result_failure() {
        let result = PluginResult::failure("Test error").with_plugin_name("test");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error.as_deref(), Some("Test error"));
        assert_eq!(result.plugin_name, "test");
    }

    #[test]
    fn test_plugin_result_not_found() {
        let result = PluginResult::not_found("ghost");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Plugin 'ghost' not found"));
        assert_eq!(result.plugin_name, "ghost");
    }

    #[test]
    fn test_plugin_result_serializes_all_fields() {
        let value = serde_json::to_value(PluginResult::failure("boom")).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "data": null, "error": "boom", "plugin_name": ""})
        );
    }

    #[test]
    fn test_default_trait_methods() {
        let plugin = EchoPlugin;
        assert_eq!(plugin.version(), "1.0.0");
        assert!(plugin.validate_config());
        assert_eq!(plugin.help(), "echo: Echo the context back");
    }

    #[tokio::test]
    async fn test_execute_passes_context() {
        let mut context = PluginContext::new();
        context.insert("test".into(), json!("context"));

        let result = EchoPlugin.execute(&context).await.unwrap();
        assert!(result.success);
        assert_eq!(result.data.unwrap()["test"], "context");
    }

    #[test]
    fn test_parse_plugin_config_reports_plugin_name() {
        #[derive(Debug, Deserialize)]
        struct Typed {
            #[allow(dead_code)]
            flag: bool,
        }

        let mut map = Map::new();
        map.insert("flag".into(), json!("not a bool"));
        let err = parse_plugin_config::<Typed>("typed", &map).unwrap_err();
        assert!(matches!(err, HelloError::Config(_)));
        assert!(err.to_string().contains("'typed'"));
    }

    #[test]
    fn test_manifest_defaults() {
        let manifest: PluginManifest = serde_json::from_value(json!({
            "name": "uptime",
            "description": "Show uptime",
            "command": "uptime"
        }))
        .unwrap();

        assert_eq!(manifest.version, "1.0.0");
        assert!(manifest.working_dir.is_none());
        assert!(manifest.env.is_none());
        assert!(manifest.help.is_none());
        assert_eq!(manifest.effective_timeout(), 10);
    }

    #[test]
    fn test_manifest_from_yaml() {
        let yaml = r#"
name: greet-file
version: "2.1.0"
description: Write a greeting
command: "echo Hello {{name}}"
working_dir: scripts
timeout_secs: 3
env:
  LANG: C
help: "greet-file: writes a greeting"
"#;
        let manifest: PluginManifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.name, "greet-file");
        assert_eq!(manifest.version, "2.1.0");
        assert_eq!(manifest.working_dir.as_deref(), Some("scripts"));
        assert_eq!(manifest.effective_timeout(), 3);
        assert_eq!(manifest.env.as_ref().unwrap()["LANG"], "C");
    }

    #[test]
    fn test_manifest_requires_command() {
        let result: std::result::Result<PluginManifest, _> = serde_json::from_value(json!({
            "name": "broken",
            "description": "No command"
        }));
        assert!(result.is_err());
    }
}
