//! Interactive command loop.

use std::io::{BufRead, Write};

use anyhow::Result;
use serde_json::{json, Value};

use hello_project::config::Settings;
use hello_project::plugins::{PluginContext, PluginRegistry};

const HELP_TEXT: &str = "
Available commands:
  greet <name>     - Greet someone
  weather [city]   - Get weather for city
  quote            - Get an inspirational quote
  plugins          - List available plugins
  config           - Show current configuration
  quit             - Exit interactive mode
";

const GOODBYE: &str = "Goodbye! 👋";

/// Read commands from `input` until `quit` or end of input, writing
/// responses to `output`.
pub(crate) async fn run_interactive<R: BufRead, W: Write>(
    settings: &Settings,
    registry: &PluginRegistry,
    mut input: R,
    mut output: W,
) -> Result<()> {
    writeln!(output, "🤖 Hello Project Interactive Mode")?;
    writeln!(output, "Type 'help' for commands, 'quit' to exit")?;

    loop {
        write!(output, "\n> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF
            writeln!(output, "\n{}", GOODBYE)?;
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "quit" | "exit" | "q" if arg.is_empty() => {
                writeln!(output, "{}", GOODBYE)?;
                break;
            }
            "help" => writeln!(output, "{}", HELP_TEXT)?,
            "plugins" => writeln!(output, "{}", registry.help(None))?,
            "config" => writeln!(
                output,
                "Configuration:\n{}",
                serde_json::to_string_pretty(settings)?
            )?,
            "greet" => {
                let name = if arg.is_empty() {
                    settings.default_name.as_str()
                } else {
                    arg
                };
                writeln!(output, "Hello, {}!", name)?;
            }
            "weather" => {
                let mut context = PluginContext::new();
                if !arg.is_empty() {
                    context.insert("city".into(), json!(arg));
                }
                let result = registry.execute("weather", &context).await;
                match (result.success, result.data) {
                    (true, Some(data)) => writeln!(
                        output,
                        "Weather in {}: {}, {}",
                        text_field(&data, "city"),
                        text_field(&data, "temperature"),
                        text_field(&data, "description")
                    )?,
                    _ => writeln!(
                        output,
                        "Weather error: {}",
                        result.error.unwrap_or_default()
                    )?,
                }
            }
            "quote" => {
                let result = registry.execute("quote", &PluginContext::new()).await;
                match (result.success, result.data) {
                    (true, Some(data)) => writeln!(
                        output,
                        "\"{}\" - {}",
                        text_field(&data, "text"),
                        text_field(&data, "author")
                    )?,
                    _ => writeln!(output, "Quote error: {}", result.error.unwrap_or_default())?,
                }
            }
            _ => writeln!(
                output,
                "Unknown command: {}. Type 'help' for available commands.",
                line
            )?,
        }
    }

    Ok(())
}

fn text_field(data: &Value, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
