use crate::error::{QuoteverseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default backend endpoint
pub const DEFAULT_BASE_URL: &str = "https://quoteverse-backend.onrender.com/quotes";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Zoom limits and gesture tuning for the map viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Pixels per world unit at startup
    pub default_scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Multiplicative zoom per wheel tick
    pub zoom_factor: f64,
    /// Grow/shrink point glyphs with the zoom level
    pub zoom_points: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            default_scale: 200.0,
            min_scale: 50.0,
            max_scale: 2000.0,
            zoom_factor: 1.1,
            zoom_points: false,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return Err(QuoteverseError::ConfigInvalid {
                key: "viewport.min_scale".to_string(),
                reason: format!(
                    "expected 0 < min_scale <= max_scale, got {} and {}",
                    self.min_scale, self.max_scale
                ),
            });
        }
        if !(self.min_scale..=self.max_scale).contains(&self.default_scale) {
            return Err(QuoteverseError::ConfigInvalid {
                key: "viewport.default_scale".to_string(),
                reason: format!(
                    "{} is outside [{}, {}]",
                    self.default_scale, self.min_scale, self.max_scale
                ),
            });
        }
        if !(self.zoom_factor.is_finite() && self.zoom_factor > 1.0) {
            return Err(QuoteverseError::ConfigInvalid {
                key: "viewport.zoom_factor".to_string(),
                reason: format!("must be a finite number greater than 1, got {}", self.zoom_factor),
            });
        }
        Ok(())
    }
}

/// Resolved runtime settings for the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub base_url: String,
    pub fetch_count: usize,
    pub neighbor_count: usize,
    pub max_distance: f64,
    pub min_request_interval: Duration,
    pub poll_interval: Duration,
    pub debounce: Duration,
    pub randomize: bool,
    pub auto_send: bool,
    pub max_points: usize,
    /// Query cache bound; `0` means unbounded
    pub cache_capacity: usize,
    pub viewport: ViewportConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        LayeredConfig::with_defaults().settings()
    }
}

/// Layered configuration for Quoteverse
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub base_url: ConfigValue<String>,
    pub fetch_count: ConfigValue<usize>,
    pub neighbor_count: ConfigValue<usize>,
    pub max_distance: ConfigValue<f64>,
    pub request_interval_ms: ConfigValue<u64>,
    pub poll_interval_ms: ConfigValue<u64>,
    pub debounce_ms: ConfigValue<u64>,
    pub randomize: ConfigValue<bool>,
    pub auto_send: ConfigValue<bool>,
    pub max_points: ConfigValue<usize>,
    pub cache_capacity: ConfigValue<usize>,
    pub viewport: ConfigValue<ViewportConfig>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            base_url: ConfigValue::new(DEFAULT_BASE_URL.to_string(), ConfigSource::Default),
            fetch_count: ConfigValue::new(1000, ConfigSource::Default),
            neighbor_count: ConfigValue::new(50, ConfigSource::Default),
            max_distance: ConfigValue::new(0.55, ConfigSource::Default),
            request_interval_ms: ConfigValue::new(50, ConfigSource::Default),
            poll_interval_ms: ConfigValue::new(1000, ConfigSource::Default),
            debounce_ms: ConfigValue::new(10, ConfigSource::Default),
            randomize: ConfigValue::new(true, ConfigSource::Default),
            auto_send: ConfigValue::new(true, ConfigSource::Default),
            max_points: ConfigValue::new(1000, ConfigSource::Default),
            cache_capacity: ConfigValue::new(256, ConfigSource::Default),
            viewport: ConfigValue::new(ViewportConfig::default(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(QuoteverseError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| QuoteverseError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| QuoteverseError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        let source = ConfigSource::File;
        if let Some(base_url) = file_config.base_url {
            self.base_url.update(base_url, source);
        }
        if let Some(fetch_count) = file_config.fetch_count {
            self.fetch_count.update(fetch_count, source);
        }
        if let Some(k) = file_config.neighbor_count {
            self.neighbor_count.update(k, source);
        }
        if let Some(max_distance) = file_config.max_distance {
            self.max_distance.update(max_distance, source);
        }
        if let Some(ms) = file_config.request_interval_ms {
            self.request_interval_ms.update(ms, source);
        }
        if let Some(ms) = file_config.poll_interval_ms {
            self.poll_interval_ms.update(ms, source);
        }
        if let Some(ms) = file_config.debounce_ms {
            self.debounce_ms.update(ms, source);
        }
        if let Some(randomize) = file_config.randomize {
            self.randomize.update(randomize, source);
        }
        if let Some(auto_send) = file_config.auto_send {
            self.auto_send.update(auto_send, source);
        }
        if let Some(max_points) = file_config.max_points {
            self.max_points.update(max_points, source);
        }
        if let Some(capacity) = file_config.cache_capacity {
            self.cache_capacity.update(capacity, source);
        }
        if let Some(viewport) = file_config.viewport {
            self.viewport.update(viewport, source);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // QUOTEVERSE_BASE_URL
        if let Ok(base_url) = env::var("QUOTEVERSE_BASE_URL") {
            self.base_url.update(base_url, ConfigSource::Environment);
        }

        env_override(&mut self.fetch_count, "QUOTEVERSE_FETCH_COUNT", "non-negative integer");
        env_override(&mut self.neighbor_count, "QUOTEVERSE_K", "non-negative integer");
        env_override(&mut self.max_distance, "QUOTEVERSE_MAX_DISTANCE", "number");
        env_override(
            &mut self.request_interval_ms,
            "QUOTEVERSE_REQUEST_INTERVAL_MS",
            "milliseconds",
        );
        env_override(&mut self.poll_interval_ms, "QUOTEVERSE_POLL_INTERVAL_MS", "milliseconds");
        env_override(&mut self.debounce_ms, "QUOTEVERSE_DEBOUNCE_MS", "milliseconds");
        env_override(&mut self.max_points, "QUOTEVERSE_MAX_POINTS", "non-negative integer");
        env_override(&mut self.cache_capacity, "QUOTEVERSE_CACHE_CAPACITY", "non-negative integer");

        // Boolean flags accept true/false, yes/no, on/off, 1/0
        for (name, slot) in [
            ("QUOTEVERSE_RANDOMIZE", &mut self.randomize),
            ("QUOTEVERSE_AUTO_SEND", &mut self.auto_send),
        ] {
            if let Ok(raw) = env::var(name) {
                match parse_bool(&raw) {
                    Ok(flag) => slot.update(flag, ConfigSource::Environment),
                    Err(_) => tracing::warn!("Invalid {} value '{}': expected a boolean", name, raw),
                }
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        let source = ConfigSource::Cli;
        if let Some(base_url) = overrides.base_url {
            self.base_url.update(base_url, source);
        }
        if let Some(fetch_count) = overrides.fetch_count {
            self.fetch_count.update(fetch_count, source);
        }
        if let Some(k) = overrides.neighbor_count {
            self.neighbor_count.update(k, source);
        }
        if let Some(max_distance) = overrides.max_distance {
            self.max_distance.update(max_distance, source);
        }
        if let Some(randomize) = overrides.randomize {
            self.randomize.update(randomize, source);
        }
        if let Some(auto_send) = overrides.auto_send {
            self.auto_send.update(auto_send, source);
        }
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.value.trim().is_empty() {
            return Err(QuoteverseError::ConfigMissing {
                key: "base_url".to_string(),
            });
        }
        for (key, value) in [
            ("fetch_count", self.fetch_count.value),
            ("neighbor_count", self.neighbor_count.value),
            ("max_points", self.max_points.value),
        ] {
            if value == 0 {
                return Err(QuoteverseError::ConfigInvalid {
                    key: key.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        let max_distance = self.max_distance.value;
        if !(max_distance.is_finite() && max_distance >= 0.0) {
            return Err(QuoteverseError::ConfigInvalid {
                key: "max_distance".to_string(),
                reason: format!("must be a non-negative number, got {}", max_distance),
            });
        }
        self.viewport.value.validate()
    }

    /// Snapshot of the resolved values in runtime units
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            base_url: self.base_url.value.trim_end_matches('/').to_string(),
            fetch_count: self.fetch_count.value,
            neighbor_count: self.neighbor_count.value,
            max_distance: self.max_distance.value,
            min_request_interval: Duration::from_millis(self.request_interval_ms.value),
            poll_interval: Duration::from_millis(self.poll_interval_ms.value),
            debounce: Duration::from_millis(self.debounce_ms.value),
            randomize: self.randomize.value,
            auto_send: self.auto_send.value,
            max_points: self.max_points.value,
            cache_capacity: self.cache_capacity.value,
            viewport: self.viewport.value,
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("base_url".to_string(), (self.base_url.value.clone(), self.base_url.source));
        map.insert(
            "fetch_count".to_string(),
            (self.fetch_count.value.to_string(), self.fetch_count.source),
        );
        map.insert(
            "neighbor_count".to_string(),
            (self.neighbor_count.value.to_string(), self.neighbor_count.source),
        );
        map.insert(
            "max_distance".to_string(),
            (self.max_distance.value.to_string(), self.max_distance.source),
        );
        map.insert(
            "request_interval".to_string(),
            (format!("{}ms", self.request_interval_ms.value), self.request_interval_ms.source),
        );
        map.insert(
            "poll_interval".to_string(),
            (format!("{}ms", self.poll_interval_ms.value), self.poll_interval_ms.source),
        );
        map.insert(
            "debounce".to_string(),
            (format!("{}ms", self.debounce_ms.value), self.debounce_ms.source),
        );
        map.insert(
            "randomize".to_string(),
            (self.randomize.value.to_string(), self.randomize.source),
        );
        map.insert(
            "auto_send".to_string(),
            (self.auto_send.value.to_string(), self.auto_send.source),
        );
        map.insert(
            "max_points".to_string(),
            (self.max_points.value.to_string(), self.max_points.source),
        );
        let capacity = match self.cache_capacity.value {
            0 => "unbounded".to_string(),
            n => n.to_string(),
        };
        map.insert("cache_capacity".to_string(), (capacity, self.cache_capacity.source));

        let vp = &self.viewport.value;
        map.insert(
            "viewport".to_string(),
            (
                format!(
                    "scale {} in [{}, {}], zoom x{}",
                    vp.default_scale, vp.min_scale, vp.max_scale, vp.zoom_factor
                ),
                self.viewport.source,
            ),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    base_url: Option<String>,
    fetch_count: Option<usize>,
    neighbor_count: Option<usize>,
    max_distance: Option<f64>,
    request_interval_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
    debounce_ms: Option<u64>,
    randomize: Option<bool>,
    auto_send: Option<bool>,
    max_points: Option<usize>,
    cache_capacity: Option<usize>,
    viewport: Option<ViewportConfig>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub base_url: Option<String>,
    pub fetch_count: Option<usize>,
    pub neighbor_count: Option<usize>,
    pub max_distance: Option<f64>,
    pub randomize: Option<bool>,
    pub auto_send: Option<bool>,
}

fn env_override<T: FromStr>(slot: &mut ConfigValue<T>, name: &str, expected: &str) {
    if let Ok(raw) = env::var(name) {
        match raw.trim().parse::<T>() {
            Ok(value) => slot.update(value, ConfigSource::Environment),
            Err(_) => tracing::warn!("Invalid {} value '{}': expected {}", name, raw, expected),
        }
    }
}

/// Parse a boolean flag from string
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(QuoteverseError::ConfigInvalid {
            key: "flag".to_string(),
            reason: format!("Invalid boolean: {}. Use true or false", s),
        }),
    }
}
