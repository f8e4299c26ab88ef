//! Configuration for Hello Project
//!
//! `Settings` is the fully resolved configuration for one program run. It is
//! produced by [`ConfigResolver`], which layers a YAML/JSON config file,
//! `HELLO_*` environment variables and finally explicit CLI overrides
//! ([`SettingsOverrides`]) on top of the built-in defaults.

mod resolver;

pub use resolver::{
    config_dir, default_save_path, load_config_file, ConfigResolver, ConfigSource, EnvKind,
    ENV_MAPPINGS,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Greeting name used when neither the config nor the CLI provide one.
pub const DEFAULT_NAME: &str = "GitHub CLI";

// ============================================================================
// OutputFormat
// ============================================================================

/// Output format accepted by `--output-format`.
///
/// The settings file stores the format as a plain string; only the CLI
/// restricts it to these values.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }

    /// Interpret a stored format string. Anything other than `json` renders as text.
    pub fn from_setting(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

// ============================================================================
// PluginSettings
// ============================================================================

/// Configuration entry for a single plugin, as listed under `plugins:`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Name of the plugin this entry configures.
    pub name: String,

    /// Disabled entries keep their configuration but the plugin is not registered.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Free-form, plugin-specific options.
    #[serde(default)]
    pub config: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

impl PluginSettings {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            config: Map::new(),
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Main application settings.
///
/// Unknown fields are rejected when deserializing, so a typo in a config
/// file surfaces as a validation error instead of being silently ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Name greeted when `--name` is not given.
    pub default_name: String,

    /// Enable info-level logging.
    pub verbose: bool,

    /// Output format (`text` or `json`).
    pub output_format: String,

    /// Prefix output with the current local time.
    pub show_timestamp: bool,

    /// Per-plugin configuration entries.
    pub plugins: Vec<PluginSettings>,

    /// Directory scanned for external plugin manifests.
    pub plugin_directory: String,

    /// Timeout for plugin HTTP requests, in seconds.
    pub api_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_NAME.to_string(),
            verbose: false,
            output_format: OutputFormat::Text.as_str().to_string(),
            show_timestamp: false,
            plugins: Vec::new(),
            plugin_directory: "plugins".to_string(),
            api_timeout: 10,
        }
    }
}

impl Settings {
    /// The output format to render with.
    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_setting(&self.output_format)
    }

    /// The configuration entry for `name`, if one is listed.
    ///
    /// When a name is listed more than once the last entry wins, matching how
    /// the registry treats duplicate registrations.
    pub fn plugin_settings(&self, name: &str) -> Option<&PluginSettings> {
        self.plugins.iter().rev().find(|p| p.name == name)
    }

    pub fn api_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.api_timeout)
    }
}

// ============================================================================
// SettingsOverrides
// ============================================================================

/// Explicit overrides from the command line. These take precedence over
/// both the config file and the environment.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub name: Option<String>,
    /// `--verbose` can only switch verbosity on.
    pub verbose: bool,
    pub output_format: Option<OutputFormat>,
}

impl SettingsOverrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(name) = &self.name {
            settings.default_name = name.clone();
        }
        if self.verbose {
            settings.verbose = true;
        }
        if let Some(format) = self.output_format {
            settings.output_format = format.as_str().to_string();
        }
    }
}
