//! Command plugins: external plugins defined by a manifest that wraps a
//! shell command.
//!
//! Placeholders of the form `{{key}}` in the command template are replaced
//! with the matching context value, single-quoted for the shell. Running a
//! discovered command executes arbitrary code with the privileges of this
//! process; the plugin directory must be trusted.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{HelloError, Result};

use super::types::{Plugin, PluginContext, PluginManifest, PluginResult};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// Shell operators a command template may not contain.
const DANGEROUS_PATTERNS: &[(&str, &str)] = &[
    ("&&", "command chaining (&&)"),
    ("||", "conditional chaining (||)"),
    (";", "command separator (;)"),
    ("`", "backtick execution"),
    ("|", "pipe operator (|)"),
];

/// A plugin backed by a manifest-declared shell command.
#[derive(Debug, Clone)]
pub struct CommandPlugin {
    manifest: PluginManifest,
    /// Directory the manifest was loaded from.
    base_dir: PathBuf,
}

impl CommandPlugin {
    pub fn new(manifest: PluginManifest, base_dir: PathBuf) -> Self {
        Self { manifest, base_dir }
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn working_dir(&self) -> PathBuf {
        match &self.manifest.working_dir {
            Some(dir) if Path::new(dir).is_absolute() => PathBuf::from(dir),
            Some(dir) => self.base_dir.join(dir),
            None => self.base_dir.clone(),
        }
    }

    /// Fill `{{key}}` placeholders from `context`.
    pub fn render_command(&self, context: &PluginContext) -> Result<String> {
        let mut missing = None;
        let rendered = PLACEHOLDER_RE.replace_all(&self.manifest.command, |caps: &regex::Captures| {
            let key = &caps[1];
            match context.get(key) {
                Some(Value::String(s)) => shell_quote(s),
                Some(Value::Null) | None => {
                    missing.get_or_insert_with(|| key.to_string());
                    String::new()
                }
                Some(other) => shell_quote(&other.to_string()),
            }
        });

        if let Some(key) = missing {
            return Err(HelloError::Plugin(format!(
                "Plugin '{}' needs a '{}' value in its context",
                self.manifest.name, key
            )));
        }
        Ok(rendered.into_owned())
    }

    fn dangerous_pattern(&self) -> Option<&'static str> {
        DANGEROUS_PATTERNS
            .iter()
            .find(|(pattern, _)| self.manifest.command.contains(pattern))
            .map(|(_, description)| *description)
    }
}

/// Wrap `value` in single quotes, escaping embedded single quotes.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[async_trait]
impl Plugin for CommandPlugin {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn description(&self) -> &str {
        &self.manifest.description
    }

    fn version(&self) -> &str {
        &self.manifest.version
    }

    async fn execute(&self, context: &PluginContext) -> Result<PluginResult> {
        let command = self.render_command(context)?;
        let timeout_secs = self.manifest.effective_timeout();

        debug!(plugin = %self.manifest.name, command = %command, "Running command plugin");

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&command)
            .current_dir(self.working_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(env) = &self.manifest.env {
            cmd.envs(env);
        }

        let output = tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output())
            .await
            .map_err(|_| {
                HelloError::Plugin(format!(
                    "Plugin '{}' timed out after {}s",
                    self.manifest.name, timeout_secs
                ))
            })??;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();

        let result = if output.status.success() {
            PluginResult::ok(json!({
                "stdout": stdout,
                "stderr": stderr,
                "exit_code": output.status.code().unwrap_or(0),
            }))
        } else {
            let status = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            let detail = if stderr.is_empty() { stdout } else { stderr };
            PluginResult::failure(format!("Command exited with status {}: {}", status, detail))
        };

        Ok(result.with_plugin_name(self.name()))
    }

    fn validate_config(&self) -> bool {
        if let Some(description) = self.dangerous_pattern() {
            warn!(
                plugin = %self.manifest.name,
                pattern = description,
                "Command template contains a dangerous pattern"
            );
            return false;
        }

        if self.manifest.effective_timeout() == 0 {
            warn!(plugin = %self.manifest.name, "Command timeout must be greater than zero");
            return false;
        }

        true
    }

    fn help(&self) -> String {
        match &self.manifest.help {
            Some(help) => help.clone(),
            None => format!("{}: {}", self.name(), self.description()),
        }
    }
}
