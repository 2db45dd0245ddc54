//! API configuration loading and types.
//!
//! Values come from a YAML file, then environment variables override them.
//! An override that is missing or does not parse leaves the file value alone.

use serde::Deserialize;
use std::env::VarError;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use vitrine_catalog::settings::{
    resolve_cache_ttl, resolve_page_size, DEFAULT_CACHE_MAX_WEIGHT, DEFAULT_MAX_PAGES,
    DEFAULT_UPSTREAM_TIMEOUT_SECS,
};
use vitrine_catalog::{CacheSettings, CatalogSettings, UpstreamSettings};

use crate::error::{ApiError, ApiResult};
use crate::state::InstitutionPolicy;

/// Root API configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VitrineConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub institution: InstitutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Upstream catalog configuration.
#[derive(Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Positive override for the `limit` header.
    #[serde(default)]
    pub page_size: Option<i64>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `0` disables the page bound.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            page_size: None,
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
        }
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_SECS
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub ttl_seconds: Option<i64>,
    #[serde(default = "default_max_weight")]
    pub max_weight: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_seconds: None,
            max_weight: default_max_weight(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_weight() -> u64 {
    DEFAULT_CACHE_MAX_WEIGHT
}

/// Origin allow-list and CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Empty means every origin is accepted.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_secs: default_max_age(),
        }
    }
}

fn default_max_age() -> u64 {
    3600
}

/// How a missing `ie_id` header is handled.
#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionConfig {
    /// Reject requests without `ie_id` instead of falling back to `default_id`.
    #[serde(default)]
    pub require_id: bool,
    #[serde(default = "default_institution_id")]
    pub default_id: i32,
}

impl Default for InstitutionConfig {
    fn default() -> Self {
        Self {
            require_id: false,
            default_id: default_institution_id(),
        }
    }
}

fn default_institution_id() -> i32 {
    1
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `json` or `pretty`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl VitrineConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ApiResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ApiError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> ApiResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ApiError::Config(format!("Failed to parse config: {e}")))
    }

    /// Get the configuration file path from environment or default.
    pub fn config_path() -> String {
        std::env::var("VITRINE_CONFIG").unwrap_or_else(|_| "./config/vitrine.yaml".to_string())
    }

    /// Load the file (built-in defaults when it does not exist), apply
    /// environment overrides, and validate.
    pub fn load() -> ApiResult<Self> {
        let path = Self::config_path();
        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key));
    }

    /// Apply overrides from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn apply_overrides<F>(&mut self, reader: F)
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let read = |key: &str| {
            reader(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(host) = read("VITRINE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = read("VITRINE_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }

        if let Some(base_url) = read("BASE_URL") {
            self.upstream.base_url = base_url;
        }
        if let Some(api_key) = read("API_KEY") {
            self.upstream.api_key = api_key;
        }
        if let Some(page_size) = read("PAGE_SIZE").and_then(|v| parse_positive(&v)) {
            self.upstream.page_size = Some(page_size);
        }
        if let Some(timeout) = read("UPSTREAM_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok())
        {
            if timeout > 0 {
                self.upstream.timeout_secs = timeout;
            }
        }
        if let Some(max_pages) = read("MAX_PAGES").and_then(|v| v.parse().ok()) {
            self.upstream.max_pages = max_pages;
        }

        if let Some(ttl) = read("CACHE_TTL_SECONDS").and_then(|v| parse_positive(&v)) {
            self.cache.ttl_seconds = Some(ttl);
        }
        if let Some(enabled) = read("CACHING_ENABLED").and_then(|v| parse_bool(&v)) {
            self.cache.enabled = enabled;
        }
        if let Some(max_weight) = read("CACHE_MAX_WEIGHT").and_then(|v| v.parse().ok()) {
            self.cache.max_weight = max_weight;
        }

        if let Some(origins) = read("ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(ToString::to_string)
                .collect();
        }

        if let Some(require) = read("REQUIRE_INSTITUTION_ID").and_then(|v| parse_bool(&v)) {
            self.institution.require_id = require;
        }

        if let Some(format) = read("LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Check values that cannot be defaulted.
    pub fn validate(&self) -> ApiResult<()> {
        if self.upstream.base_url.trim().is_empty() {
            return Err(ApiError::Config(
                "upstream base URL is required (set upstream.base_url or BASE_URL)".to_string(),
            ));
        }
        Ok(())
    }

    /// Address the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Settings for the catalog pipeline, with fallbacks applied.
    pub fn catalog_settings(&self) -> CatalogSettings {
        CatalogSettings {
            upstream: UpstreamSettings {
                base_url: self.upstream.base_url.clone(),
                api_key: self.upstream.api_key.clone(),
                page_size: resolve_page_size(self.upstream.page_size),
                timeout: Duration::from_secs(self.upstream.timeout_secs.max(1)),
                max_pages: self.upstream.max_pages,
            },
            cache: CacheSettings {
                enabled: self.cache.enabled,
                ttl: resolve_cache_ttl(self.cache.ttl_seconds),
                max_weight: self.cache.max_weight,
            },
        }
    }

    /// Institution header policy.
    pub fn institution_policy(&self) -> InstitutionPolicy {
        if self.institution.require_id {
            InstitutionPolicy::Required
        } else {
            InstitutionPolicy::DefaultTo(self.institution.default_id)
        }
    }
}

fn parse_positive(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().filter(|v| *v > 0)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Create a reader closure from a HashMap (no global env mutation).
    fn make_reader(vars: HashMap<&str, &str>) -> impl Fn(&str) -> Result<String, VarError> {
        let owned: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| owned.get(key).cloned().ok_or(VarError::NotPresent)
    }

    const FULL_YAML: &str = r#"
server:
  port: 9090

upstream:
  base_url: https://catalog.example.com
  api_key: file-key
  page_size: 50
  max_pages: 100

cache:
  enabled: true
  ttl_seconds: 120

cors:
  allowed_origins:
    - https://www.example.com
    - https://admin.example.com

institution:
  require_id: true
"#;

    #[test]
    fn test_parse_full_config() {
        let config = VitrineConfig::from_yaml(FULL_YAML).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.upstream.base_url, "https://catalog.example.com");
        assert_eq!(config.upstream.page_size, Some(50));
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.cache.ttl_seconds, Some(120));
        assert_eq!(config.cors.allowed_origins.len(), 2);
        assert!(config.institution.require_id);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = VitrineConfig::from_yaml("{}").unwrap();
        let settings = config.catalog_settings();

        assert_eq!(settings.upstream.page_size, 20);
        assert_eq!(settings.upstream.max_pages, 500);
        assert_eq!(settings.upstream.timeout, Duration::from_secs(30));
        assert_eq!(settings.cache.ttl, Duration::from_secs(300));
        assert!(settings.cache.enabled);
        assert!(config.cors.allowed_origins.is_empty());
        assert!(matches!(
            config.institution_policy(),
            InstitutionPolicy::DefaultTo(1)
        ));
    }

    #[test]
    fn test_missing_base_url_fails_validation() {
        let config = VitrineConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("BASE_URL"));
    }

    #[test]
    fn test_env_overrides_take_precedence() {
        let mut config = VitrineConfig::from_yaml(FULL_YAML).unwrap();
        config.apply_overrides(make_reader(HashMap::from([
            ("BASE_URL", "https://staging.example.com"),
            ("API_KEY", "env-key"),
            ("PAGE_SIZE", "10"),
            ("CACHE_TTL_SECONDS", "30"),
            ("CACHING_ENABLED", "False"),
            ("ALLOWED_ORIGINS", " https://a.example.com , ,https://b.example.com "),
            ("REQUIRE_INSTITUTION_ID", "false"),
            ("VITRINE_PORT", "8181"),
        ])));

        assert_eq!(config.upstream.base_url, "https://staging.example.com");
        assert_eq!(config.upstream.api_key, "env-key");
        assert_eq!(config.server.port, 8181);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );

        let settings = config.catalog_settings();
        assert_eq!(settings.upstream.page_size, 10);
        assert_eq!(settings.cache.ttl, Duration::from_secs(30));
        assert!(!settings.cache.enabled);
        assert!(matches!(
            config.institution_policy(),
            InstitutionPolicy::DefaultTo(1)
        ));
    }

    #[test]
    fn test_invalid_overrides_keep_file_values() {
        let mut config = VitrineConfig::from_yaml(FULL_YAML).unwrap();
        config.apply_overrides(make_reader(HashMap::from([
            ("PAGE_SIZE", "-4"),
            ("CACHE_TTL_SECONDS", "0"),
            ("CACHING_ENABLED", "maybe"),
            ("VITRINE_PORT", "not-a-port"),
            ("BASE_URL", "   "),
        ])));

        assert_eq!(config.upstream.base_url, "https://catalog.example.com");
        assert_eq!(config.server.port, 9090);

        let settings = config.catalog_settings();
        assert_eq!(settings.upstream.page_size, 50);
        assert_eq!(settings.cache.ttl, Duration::from_secs(120));
        assert!(settings.cache.enabled);
    }

    #[test]
    fn test_non_positive_file_values_fall_back() {
        let config = VitrineConfig::from_yaml(
            r#"
upstream:
  base_url: https://catalog.example.com
  page_size: 0
cache:
  ttl_seconds: -10
"#,
        )
        .unwrap();

        let settings = config.catalog_settings();
        assert_eq!(settings.upstream.page_size, 20);
        assert_eq!(settings.cache.ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = VitrineConfig::from_yaml(FULL_YAML).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("file-key"));
    }
}
