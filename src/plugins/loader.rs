//! Plugin discovery and loading for Hello Project
//!
//! This module handles discovering manifest files in a plugin directory,
//! parsing them, and validating manifest contents for correctness.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::error::{HelloError, Result};

use super::command::CommandPlugin;
use super::types::PluginManifest;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_\-]{0,63}$").unwrap());

/// Whether `path` looks like a plugin manifest that discovery should load.
///
/// Files whose name starts with `_` are skipped, as are extensions other than
/// `.json`, `.yaml` and `.yml`.
pub fn is_manifest_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if file_name.starts_with('_') {
        return false;
    }
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref(),
        Some("json" | "yaml" | "yml")
    )
}

/// Discover command plugins in `dir`.
///
/// Every manifest file is loaded and validated independently. Invalid
/// manifests are logged as warnings but do not cause the overall discovery
/// to fail. A missing directory yields no plugins.
///
/// # Errors
/// `HelloError::Config` if `dir` exists but cannot be read.
pub fn discover_plugins(dir: &Path) -> Result<Vec<CommandPlugin>> {
    if !dir.exists() {
        info!(dir = %dir.display(), "Plugin directory does not exist, skipping");
        return Ok(Vec::new());
    }

    if !dir.is_dir() {
        warn!(path = %dir.display(), "Plugin path is not a directory, skipping");
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|e| {
        HelloError::Config(format!(
            "Failed to read plugin directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to read directory entry");
                None
            }
        })
        .filter(|path| path.is_file() && is_manifest_file(path))
        .collect();
    paths.sort();

    let mut plugins = Vec::with_capacity(paths.len());
    for path in paths {
        match load_plugin(&path) {
            Ok(plugin) => {
                info!(
                    plugin = %plugin.manifest().name,
                    version = %plugin.manifest().version,
                    path = %path.display(),
                    "Discovered plugin"
                );
                plugins.push(plugin);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load plugin, skipping");
            }
        }
    }

    Ok(plugins)
}

/// Load a single command plugin from its manifest file.
pub fn load_plugin(path: &Path) -> Result<CommandPlugin> {
    let manifest = load_manifest(path)?;
    validate_manifest(&manifest)?;

    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(CommandPlugin::new(manifest, base_dir))
}

/// Parse a manifest file, choosing the format by extension.
///
/// # Errors
/// - `HelloError::Plugin` if the file is missing required fields or has
///   mistyped ones, i.e. does not describe a plugin
/// - `HelloError::UnsupportedFormat` for unknown extensions
/// - `HelloError::Io` if the file cannot be read
pub fn load_manifest(path: &Path) -> Result<PluginManifest> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content = match ext.as_str() {
        "json" | "yaml" | "yml" => fs::read_to_string(path)?,
        other => return Err(HelloError::UnsupportedFormat(format!(".{}", other))),
    };

    let parsed = if ext == "json" {
        serde_json::from_str::<PluginManifest>(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str::<PluginManifest>(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|e| {
        HelloError::Plugin(format!(
            "{} is not a valid plugin manifest: {}",
            path.display(),
            e
        ))
    })
}

/// Validate a plugin manifest for correctness.
///
/// Performs the following checks:
/// - Plugin name must be 1-64 characters: alphanumerics, hyphens and
///   underscores, starting with an alphanumeric
/// - Version must be non-empty
/// - Command must be non-empty
///
/// Command safety is checked by [`CommandPlugin::validate_config`] at
/// registration time.
pub fn validate_manifest(manifest: &PluginManifest) -> Result<()> {
    if !NAME_RE.is_match(&manifest.name) {
        return Err(HelloError::Config(format!(
            "Invalid plugin name '{}': must be 1-64 alphanumeric characters, hyphens or underscores, starting with alphanumeric",
            manifest.name
        )));
    }

    if manifest.version.trim().is_empty() {
        return Err(HelloError::Config(format!(
            "Plugin '{}' has an empty version string",
            manifest.name
        )));
    }

    if manifest.command.trim().is_empty() {
        return Err(HelloError::Config(format!(
            "Plugin '{}' has an empty command",
            manifest.name
        )));
    }

    Ok(())
}
