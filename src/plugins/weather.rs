//! Weather plugin.
//!
//! Serves fixed demonstration data by default. With `use_mock: false` and an
//! `api_key`, looks the city up on OpenWeatherMap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{HelloError, Result};
use crate::utils::title_case;

use super::http::{JsonFetcher, ReqwestFetcher};
use super::types::{parse_plugin_config, Plugin, PluginContext, PluginResult};

const OPENWEATHER_API_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
const MOCK_NOTE: &str = "This is mock data for demonstration purposes";

/// Weather plugin configuration (the `config:` map of its settings entry).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key; required when `use_mock` is false.
    pub api_key: Option<String>,
    /// City used when the context has no `city`.
    pub default_city: String,
    pub use_mock: bool,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: "Tokyo".to_string(),
            use_mock: true,
        }
    }
}

impl WeatherConfig {
    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

pub struct WeatherPlugin {
    config: WeatherConfig,
    fetcher: Arc<dyn JsonFetcher>,
}

impl WeatherPlugin {
    pub fn new(config: WeatherConfig, timeout: Duration) -> Result<Self> {
        let fetcher = Arc::new(ReqwestFetcher::new(timeout)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Build from a raw settings `config:` map.
    pub fn from_config(config: &Map<String, Value>, timeout: Duration) -> Result<Self> {
        Self::new(parse_plugin_config("weather", config)?, timeout)
    }

    pub fn with_fetcher(config: WeatherConfig, fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    fn mock_weather(city: &str) -> Value {
        json!({
            "city": city,
            "temperature": "22°C",
            "description": "Partly cloudy",
            "humidity": "65%",
            "wind": "5 km/h",
            "note": MOCK_NOTE,
        })
    }

    async fn real_weather(&self, city: &str, api_key: &str) -> Result<Value> {
        let raw = self
            .fetcher
            .get_json(
                OPENWEATHER_API_URL,
                &[("q", city), ("appid", api_key), ("units", "metric")],
            )
            .await?;
        let report: OpenWeatherResponse = serde_json::from_value(raw)?;
        report.into_payload()
    }
}

#[async_trait]
impl Plugin for WeatherPlugin {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get current weather information"
    }

    async fn execute(&self, context: &PluginContext) -> Result<PluginResult> {
        let city = context
            .get("city")
            .and_then(Value::as_str)
            .unwrap_or(&self.config.default_city);

        if self.config.use_mock {
            return Ok(PluginResult::ok(Self::mock_weather(city)).with_plugin_name(self.name()));
        }

        let Some(api_key) = self.config.api_key() else {
            return Ok(PluginResult::failure(
                "Weather API key not configured. Set 'api_key' in plugin config.",
            )
            .with_plugin_name(self.name()));
        };

        let result = match self.real_weather(city, api_key).await {
            Ok(data) => PluginResult::ok(data),
            Err(e) => PluginResult::failure(format!("Failed to get weather data: {}", e)),
        };
        Ok(result.with_plugin_name(self.name()))
    }

    fn validate_config(&self) -> bool {
        self.config.use_mock || self.config.api_key().is_some()
    }

    fn help(&self) -> String {
        format!(
            r#"Weather Plugin ({})
Description: {}

Usage: --plugin weather

Configuration:
  - api_key: OpenWeatherMap API key (required for real data)
  - default_city: Default city name (default: Tokyo)
  - use_mock: Use mock data for demo (default: true)

Context parameters:
  - city: City name to get weather for

Example config.yaml:
  plugins:
    - name: weather
      config:
        api_key: "your_api_key_here"
        default_city: "New York"
        use_mock: false"#,
            self.version(),
            self.description()
        )
    }
}

// ---- OpenWeatherMap response ----

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    name: String,
    main: OpenWeatherMain,
    weather: Vec<OpenWeatherCondition>,
    wind: OpenWeatherWind,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherWind {
    speed: f64,
}

impl OpenWeatherResponse {
    fn into_payload(self) -> Result<Value> {
        let condition = self.weather.first().ok_or_else(|| {
            HelloError::Plugin(format!("no weather conditions reported for {}", self.name))
        })?;
        let description = title_case(&condition.description);

        Ok(json!({
            "city": self.name,
            "temperature": format!("{:.1}°C", self.main.temp),
            "description": description,
            "humidity": format!("{}%", self.main.humidity),
            "wind": format!("{} m/s", self.wind.speed),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::http::testing::FakeFetcher;
    use std::sync::atomic::Ordering;

    fn context_with_city(city: &str) -> PluginContext {
        let mut context = PluginContext::new();
        context.insert("city".into(), json!(city));
        context
    }

    fn api_config() -> WeatherConfig {
        WeatherConfig {
            use_mock: false,
            api_key: Some("secret".to_string()),
            ..WeatherConfig::default()
        }
    }

    fn sample_response() -> Value {
        json!({
            "name": "London",
            "main": {"temp": 14.237, "humidity": 81},
            "weather": [{"description": "light intensity drizzle"}],
            "wind": {"speed": 4.1}
        })
    }

    #[test]
    fn test_weather_plugin_defaults() {
        let plugin = WeatherPlugin::new(WeatherConfig::default(), Duration::from_secs(10)).unwrap();
        assert_eq!(plugin.name(), "weather");
        assert!(plugin.config().use_mock);
        assert_eq!(plugin.config().default_city, "Tokyo");
        assert!(plugin.config().api_key.is_none());
    }

    #[test]
    fn test_from_config_reads_map() {
        let config = json!({"default_city": "Berlin", "use_mock": false, "api_key": "k"});
        let plugin =
            WeatherPlugin::from_config(config.as_object().unwrap(), Duration::from_secs(1)).unwrap();
        assert_eq!(plugin.config().default_city, "Berlin");
        assert!(!plugin.config().use_mock);
        assert_eq!(plugin.config().api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_from_config_rejects_mistyped_value() {
        let config = json!({"use_mock": "yes"});
        let result = WeatherPlugin::from_config(config.as_object().unwrap(), Duration::from_secs(1));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_execution() {
        let plugin = WeatherPlugin::new(WeatherConfig::default(), Duration::from_secs(10)).unwrap();
        let result = plugin.execute(&context_with_city("Tokyo")).await.unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["city"], "Tokyo");
        assert_eq!(data["temperature"], "22°C");
        assert_eq!(data["description"], "Partly cloudy");
        assert_eq!(data["note"], MOCK_NOTE);
    }

    #[tokio::test]
    async fn test_mock_succeeds_for_any_city() {
        let fetcher = Arc::new(FakeFetcher::failing("should not be called"));
        let plugin = WeatherPlugin::with_fetcher(WeatherConfig::default(), fetcher.clone());

        for city in ["", "Reykjavík", "東京", "a very long city name with spaces"] {
            let result = plugin.execute(&context_with_city(city)).await.unwrap();
            assert!(result.success, "mock failed for {:?}", city);
            assert_eq!(result.data.unwrap()["city"], city);
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_default_city_when_context_lacks_city() {
        let config = WeatherConfig {
            default_city: "Osaka".to_string(),
            ..WeatherConfig::default()
        };
        let plugin = WeatherPlugin::new(config, Duration::from_secs(10)).unwrap();

        let result = plugin.execute(&PluginContext::new()).await.unwrap();
        assert_eq!(result.data.unwrap()["city"], "Osaka");

        let mut non_string = PluginContext::new();
        non_string.insert("city".into(), json!(42));
        let result = plugin.execute(&non_string).await.unwrap();
        assert_eq!(result.data.unwrap()["city"], "Osaka");
    }

    #[tokio::test]
    async fn test_without_api_key_makes_no_remote_call() {
        let fetcher = Arc::new(FakeFetcher::returning(sample_response()));
        let config = WeatherConfig {
            use_mock: false,
            ..WeatherConfig::default()
        };
        let plugin = WeatherPlugin::with_fetcher(config, fetcher.clone());

        let result = plugin.execute(&PluginContext::new()).await.unwrap();

        assert!(!result.success);
        assert!(result.error.unwrap().contains("API key not configured"));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_api_key_counts_as_missing() {
        let fetcher = Arc::new(FakeFetcher::returning(sample_response()));
        let config = WeatherConfig {
            use_mock: false,
            api_key: Some("   ".to_string()),
            ..WeatherConfig::default()
        };
        let plugin = WeatherPlugin::with_fetcher(config, fetcher.clone());

        assert!(!plugin.validate_config());
        let result = plugin.execute(&PluginContext::new()).await.unwrap();
        assert!(!result.success);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_real_lookup_maps_payload() {
        let fetcher = Arc::new(FakeFetcher::returning(sample_response()));
        let config = WeatherConfig {
            use_mock: false,
            api_key: Some("secret".to_string()),
            ..WeatherConfig::default()
        };
        let plugin = WeatherPlugin::with_fetcher(config, fetcher.clone());

        let result = plugin.execute(&context_with_city("London")).await.unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["city"], "London");
        assert_eq!(data["temperature"], "14.2°C");
        assert_eq!(data["description"], "Light Intensity Drizzle");
        assert_eq!(data["humidity"], "81%");
        assert_eq!(data["wind"], "4.1 m/s");
        assert!(data.get("note").is_none());

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        let query = fetcher.last_query.lock().unwrap().clone();
        assert!(query.contains(&("q".to_string(), "London".to_string())));
        assert!(query.contains(&("appid".to_string(), "secret".to_string())));
        assert!(query.contains(&("units".to_string(), "metric".to_string())));
    }

    #[tokio::test]
    async fn test_remote_fault_is_failed_result() {
        let fetcher = Arc::new(FakeFetcher::failing("connection reset"));
        let config = WeatherConfig {
            use_mock: false,
            api_key: Some("secret".to_string()),
            ..WeatherConfig::default()
        };
        let plugin = WeatherPlugin::with_fetcher(config, fetcher.clone());

        let result = plugin.execute(&PluginContext::new()).await.unwrap();
        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.starts_with("Failed to get weather data:"));
        assert!(error.contains("connection reset"));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_failed_result() {
        let fetcher = Arc::new(FakeFetcher::returning(json!({"name": "Nowhere"})));
        let config = WeatherConfig {
            use_mock: false,
            api_key: Some("secret".to_string()),
            ..WeatherConfig::default()
        };
        let plugin = WeatherPlugin::with_fetcher(config, fetcher);

        let result = plugin.execute(&PluginContext::new()).await.unwrap();
        assert!(!result.success);
        assert!(result.data.is_none());
    }

    #[test]
    fn test_validation() {
        let mock = WeatherPlugin::new(WeatherConfig::default(), Duration::from_secs(1)).unwrap();
        assert!(mock.validate_config());

        let no_key = WeatherPlugin::new(
            WeatherConfig {
                use_mock: false,
                ..WeatherConfig::default()
            },
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(!no_key.validate_config());

        let with_key = WeatherPlugin::new(
            WeatherConfig {
                use_mock: false,
                api_key: Some("test123".to_string()),
                ..WeatherConfig::default()
            },
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(with_key.validate_config());
    }

    #[test]
    fn test_help() {
        let plugin = WeatherPlugin::new(WeatherConfig::default(), Duration::from_secs(1)).unwrap();
        let help = plugin.help();
        assert!(help.starts_with("Weather Plugin (1.0.0)"));
        assert!(help.contains("api_key"));
        assert!(help.contains("default_city"));
    }

    #[tokio::test]
    async fn test_empty_conditions_is_failed_result() {
        let mut response = sample_response();
        response["weather"] = json!([]);
        let plugin = WeatherPlugin::with_fetcher(
            api_config(),
            Arc::new(FakeFetcher::returning(response)),
        );

        let result = plugin.execute(&context_with_city("London")).await.unwrap();
        assert!(!result.success);
        assert!(result.data.is_none());
        let error = result.error.unwrap();
        assert!(error.starts_with("Failed to get weather data:"));
        assert!(error.contains("no weather conditions"));
    }

    #[tokio::test]
    async fn test_non_numeric_fields_are_failed_result() {
        let fetcher = Arc::new(FakeFetcher::returning(json!({
            "name": "London",
            "main": {"temp": 1.0, "humidity": "81"},
            "weather": [{"description": "mist"}],
            "wind": {"speed": "3"}
        })));
        let plugin = WeatherPlugin::with_fetcher(api_config(), fetcher);

        let result = plugin.execute(&context_with_city("London")).await.unwrap();
        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.error.unwrap().starts_with("Failed to get weather data:"));
    }

    #[tokio::test]
    async fn test_integral_readings_print_without_fraction() {
        let mut response = sample_response();
        response["wind"]["speed"] = json!(3);
        let plugin = WeatherPlugin::with_fetcher(
            api_config(),
            Arc::new(FakeFetcher::returning(response)),
        );

        let data = plugin
            .execute(&context_with_city("London"))
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(data["humidity"], "81%");
        assert_eq!(data["wind"], "3 m/s");
    }
}
