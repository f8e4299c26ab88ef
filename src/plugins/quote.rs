//! Quote plugin.
//!
//! Picks a random quote from a built-in list, or from quotable.io when
//! `use_api` is set. Remote failures fall back to the built-in list, so this
//! plugin never reports a failure to the user.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::error::Result;

use super::http::{JsonFetcher, ReqwestFetcher};
use super::types::{parse_plugin_config, Plugin, PluginContext, PluginResult};

const QUOTABLE_API_URL: &str = "https://api.quotable.io/random";

/// Categories quotable.io is known to tag quotes with.
pub const KNOWN_CATEGORIES: &[&str] = &["inspirational", "motivational", "wisdom", "success"];

/// A quote and its author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

/// Quotes served offline and whenever the API is unavailable.
pub const BUILTIN_QUOTES: &[Quote] = &[
    Quote {
        text: "The way to get started is to quit talking and begin doing.",
        author: "Walt Disney",
    },
    Quote {
        text: "Life is what happens to you while you're busy making other plans.",
        author: "John Lennon",
    },
    Quote {
        text: "The future belongs to those who believe in the beauty of their dreams.",
        author: "Eleanor Roosevelt",
    },
    Quote {
        text: "It is during our darkest moments that we must focus to see the light.",
        author: "Aristotle",
    },
    Quote {
        text: "Success is not final, failure is not fatal: it is the courage to continue that counts.",
        author: "Winston Churchill",
    },
    Quote {
        text: "プログラミングとは思考を整理する技術である。",
        author: "Programming Wisdom",
    },
    Quote {
        text: "コードは詩のように美しく、散文のように明確であるべきだ。",
        author: "Code Philosophy",
    },
];

/// Quote plugin configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    pub use_api: bool,
    pub category: String,
    /// Stored for completeness; neither source filters by language.
    pub language: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            use_api: false,
            category: "inspirational".to_string(),
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuotableResponse {
    content: String,
    author: String,
}

pub struct QuotePlugin {
    config: QuoteConfig,
    fetcher: Arc<dyn JsonFetcher>,
}

impl QuotePlugin {
    pub fn new(config: QuoteConfig, timeout: Duration) -> Result<Self> {
        let fetcher = Arc::new(ReqwestFetcher::new(timeout)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Build from a raw settings `config:` map.
    pub fn from_config(config: &Map<String, Value>, timeout: Duration) -> Result<Self> {
        Self::new(parse_plugin_config("quote", config)?, timeout)
    }

    pub fn with_fetcher(config: QuoteConfig, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    fn builtin_quote(&self) -> PluginResult {
        let quote = BUILTIN_QUOTES
            .choose(&mut rand::thread_rng())
            .unwrap_or(&BUILTIN_QUOTES[0]);

        PluginResult::ok(json!({
            "text": quote.text,
            "author": quote.author,
            "source": "built-in",
        }))
        .with_plugin_name(self.name())
    }

    async fn api_quote(&self) -> Result<PluginResult> {
        let raw = self
            .fetcher
            .get_json(QUOTABLE_API_URL, &[("tags", self.config.category.as_str())])
            .await?;
        let quote: QuotableResponse = serde_json::from_value(raw)?;

        Ok(PluginResult::ok(json!({
            "text": quote.content,
            "author": quote.author,
            "source": "api",
        }))
        .with_plugin_name(self.name()))
    }
}

#[async_trait]
impl Plugin for QuotePlugin {
    fn name(&self) -> &str {
        "quote"
    }

    fn description(&self) -> &str {
        "Get inspirational quotes"
    }

    async fn execute(&self, _context: &PluginContext) -> Result<PluginResult> {
        if !self.config.use_api {
            return Ok(self.builtin_quote());
        }

        match self.api_quote().await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(error = %e, "Quote API request failed, falling back to built-in quotes");
                Ok(self.builtin_quote())
            }
        }
    }

    fn validate_config(&self) -> bool {
        if !KNOWN_CATEGORIES.contains(&self.config.category.as_str()) {
            warn!(category = %self.config.category, "Unknown quote category");
        }
        true
    }

    fn help(&self) -> String {
        format!(
            r#"Quote Plugin ({})
Description: {}

Usage: --plugin quote

Configuration:
  - use_api: Use external API for quotes (default: false)
  - category: Quote category (inspirational, motivational, wisdom, success)
  - language: Language preference (default: en)

Features:
  - Built-in quotes (no internet required)
  - External API integration (quotable.io)
  - Multiple categories
  - Fallback to built-in quotes if API fails

Example config.yaml:
  plugins:
    - name: quote
      config:
        use_api: true
        category: "motivational"
        language: "en""#,
            self.version(),
            self.description()
        )
    }
}
