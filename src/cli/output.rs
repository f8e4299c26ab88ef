//! Rendering of the one-shot greeting report.

use chrono::Local;
use serde_json::{json, Map, Value};

use hello_project::config::OutputFormat;
use hello_project::plugins::PluginResult;
use hello_project::utils::title_case;

pub(crate) const ENHANCED_MESSAGE: &str =
    "This is an enhanced practice repository with plugin support.";

/// Assemble the report for one run: greeting, message and, when any plugins
/// were requested, their results keyed by the requested name.
pub(crate) fn build_report(name: &str, results: &[(String, PluginResult)]) -> Map<String, Value> {
    let mut report = Map::new();
    report.insert("greeting".into(), json!(format!("Hello, {}!", name)));
    report.insert("message".into(), json!(ENHANCED_MESSAGE));

    if !results.is_empty() {
        let plugins: Map<String, Value> = results
            .iter()
            .map(|(name, result)| {
                (
                    name.clone(),
                    json!({
                        "success": result.success,
                        "data": result.data,
                        "error": result.error,
                    }),
                )
            })
            .collect();
        report.insert("plugins".into(), Value::Object(plugins));
    }

    report
}

/// Current local time in ISO 8601 form, to microsecond precision.
pub(crate) fn now_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Render `report` as text or pretty JSON. When `timestamp` is given it is
/// added to the report under `timestamp` and, in text mode, printed first.
pub(crate) fn format_output(
    mut report: Map<String, Value>,
    format: OutputFormat,
    timestamp: Option<&str>,
) -> serde_json::Result<String> {
    if let Some(ts) = timestamp {
        report.insert("timestamp".into(), json!(ts));
    }

    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&report),
        OutputFormat::Text => Ok(format_text(&report, timestamp)),
    }
}

fn format_text(report: &Map<String, Value>, timestamp: Option<&str>) -> String {
    let mut lines = Vec::new();

    if let Some(ts) = timestamp {
        lines.push(format!("Time: {}", ts));
    }
    lines.push(display_value(report.get("greeting").unwrap_or(&Value::Null)));

    if let Some(Value::Object(plugins)) = report.get("plugins") {
        lines.push("\nPlugin Results:".to_string());
        for (name, result) in plugins {
            if result["success"].as_bool().unwrap_or(false) {
                lines.push(format!("\n{}:", title_case(name)));
                match &result["data"] {
                    Value::Object(data) => {
                        for (key, value) in data.iter().filter(|(k, _)| *k != "note") {
                            lines.push(format!("  {}: {}", title_case(key), display_value(value)));
                        }
                        if let Some(note) = data.get("note") {
                            lines.push(format!("  Note: {}", display_value(note)));
                        }
                    }
                    Value::Null => {}
                    other => lines.push(format!("  {}", display_value(other))),
                }
            } else {
                let error = match &result["error"] {
                    Value::Null => "unknown error".to_string(),
                    other => display_value(other),
                };
                lines.push(format!("\n{}: Error - {}", title_case(name), error));
            }
        }
    }

    lines.join("\n")
}

/// Strings print bare; everything else prints as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
