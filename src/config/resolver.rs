//! Layered configuration resolution.
//!
//! Precedence, lowest to highest: built-in defaults, the first config file
//! found, `HELLO_*` environment variables. CLI overrides are applied by the
//! caller afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{HelloError, Result};

use super::Settings;

/// How an environment variable's raw string is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKind {
    Text,
    Flag,
    Integer,
}

/// Environment variable -> settings field mappings.
pub const ENV_MAPPINGS: &[(&str, &str, EnvKind)] = &[
    ("HELLO_DEFAULT_NAME", "default_name", EnvKind::Text),
    ("HELLO_VERBOSE", "verbose", EnvKind::Flag),
    ("HELLO_OUTPUT_FORMAT", "output_format", EnvKind::Text),
    ("HELLO_SHOW_TIMESTAMP", "show_timestamp", EnvKind::Flag),
    ("HELLO_API_TIMEOUT", "api_timeout", EnvKind::Integer),
];

/// Per-user configuration directory (`~/.config/hello_project`).
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("hello_project"))
}

/// Where `save` writes when no path is given.
pub fn default_save_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// The config file a [`ConfigResolver`] settled on.
///
/// Resolution runs before the binary installs its log subscriber, so the
/// outcome is returned as a value and reported afterwards with [`report`].
///
/// [`report`]: ConfigSource::report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
    /// File read, if any.
    pub file: Option<PathBuf>,
    /// Explicit path that was given but not found.
    pub missing_explicit: Option<PathBuf>,
}

impl ConfigSource {
    /// Warning for an explicit path that does not exist.
    pub fn warning(&self) -> Option<String> {
        self.missing_explicit.as_ref().map(|missing| {
            let fallback = match &self.file {
                Some(file) => file.display().to_string(),
                None => "defaults".to_string(),
            };
            format!(
                "Config file {} not found, using {}",
                missing.display(),
                fallback
            )
        })
    }

    /// Log the outcome: a warning for a missing explicit path, then the file used.
    pub fn report(&self) {
        if let Some(message) = self.warning() {
            warn!("{}", message);
        }
        match &self.file {
            Some(path) => info!(path = %path.display(), "Loaded configuration file"),
            None => info!("No configuration file found, using defaults"),
        }
    }
}

/// Resolves [`Settings`] from a config file and the environment.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    explicit_path: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl ConfigResolver {
    /// Resolver over the standard search locations, preferring `explicit_path`
    /// when it exists.
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        Self::with_search_paths(explicit_path, Self::default_search_paths())
    }

    pub fn with_search_paths(explicit_path: Option<PathBuf>, search_paths: Vec<PathBuf>) -> Self {
        Self {
            explicit_path,
            search_paths,
        }
    }

    /// The per-user config, then `config.yaml` and `hello_config.yaml` in the
    /// working directory.
    pub fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(3);
        if let Some(path) = default_save_path() {
            paths.push(path);
        }
        paths.push(PathBuf::from("config.yaml"));
        paths.push(PathBuf::from("hello_config.yaml"));
        paths
    }

    /// Where `resolve` will read from, including an explicit path that was
    /// given but does not exist.
    pub fn source(&self) -> ConfigSource {
        let missing_explicit = self
            .explicit_path
            .as_ref()
            .filter(|path| !path.exists())
            .cloned();

        let file = match &self.explicit_path {
            Some(path) if path.exists() => Some(path.clone()),
            _ => self.search_paths.iter().find(|p| p.exists()).cloned(),
        };

        ConfigSource {
            file,
            missing_explicit,
        }
    }

    /// The config file that `resolve` will read, if any.
    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.source().file
    }

    /// Resolve settings using the process environment.
    pub fn resolve(&self) -> Result<Settings> {
        self.resolve_with_env(|var| std::env::var(var).ok())
    }

    /// Resolve settings, reading environment variables through `env`.
    pub fn resolve_with_env<F>(&self, env: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut data = match self.find_config_file() {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                load_config_file(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Map::new()
            }
        };

        for (field, value) in env_overrides(env)? {
            data.insert(field, value);
        }

        serde_json::from_value(Value::Object(data))
            .map_err(|e| HelloError::Validation(e.to_string()))
    }

    /// Write `settings` as YAML to `path`, or to [`default_save_path`].
    ///
    /// Parent directories are created as needed. Returns the path written.
    pub fn save(settings: &Settings, path: Option<&Path>) -> Result<PathBuf> {
        let target = match path {
            Some(p) => p.to_path_buf(),
            None => default_save_path().ok_or_else(|| {
                HelloError::Config("Cannot determine home directory for config file".to_string())
            })?,
        };

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml = serde_yaml::to_string(settings)?;
        fs::write(&target, yaml)?;

        info!(path = %target.display(), "Saved configuration");
        Ok(target)
    }
}

/// Parse a config file into a raw mapping, choosing the parser by extension.
///
/// An empty document yields an empty mapping.
pub fn load_config_file(path: &Path) -> Result<Map<String, Value>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let wrap = |message: String| HelloError::ConfigFile {
        path: path.to_path_buf(),
        message,
    };

    let parsed: Value = match ext.as_str() {
        "yaml" | "yml" => {
            let content = fs::read_to_string(path).map_err(|e| wrap(e.to_string()))?;
            if content.trim().is_empty() {
                Value::Null
            } else {
                serde_yaml::from_str(&content).map_err(|e| wrap(e.to_string()))?
            }
        }
        "json" => {
            let content = fs::read_to_string(path).map_err(|e| wrap(e.to_string()))?;
            if content.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&content).map_err(|e| wrap(e.to_string()))?
            }
        }
        "" => return Err(HelloError::UnsupportedFormat("(no extension)".to_string())),
        other => return Err(HelloError::UnsupportedFormat(format!(".{}", other))),
    };

    match parsed {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        _ => Err(HelloError::Validation(format!(
            "{} must contain a mapping at the top level",
            path.display()
        ))),
    }
}

/// Collect the `HELLO_*` overrides that are set and non-empty.
fn env_overrides<F>(env: F) -> Result<Map<String, Value>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = Map::new();

    for &(var, field, kind) in ENV_MAPPINGS {
        let Some(raw) = env(var).filter(|v| !v.is_empty()) else {
            continue;
        };

        let value = match kind {
            EnvKind::Text => Value::String(raw),
            EnvKind::Flag => Value::Bool(parse_flag(&raw)),
            EnvKind::Integer => {
                let n: i64 = raw.trim().parse().map_err(|_| {
                    HelloError::Config(format!("{} must be an integer, got '{}'", var, raw))
                })?;
                Value::from(n)
            }
        };

        debug!(var = %var, field = %field, "Applying environment override");
        overrides.insert(field.to_string(), value);
    }

    Ok(overrides)
}

/// `true`, `1` and `yes` (any case) are true; everything else is false.
fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}
