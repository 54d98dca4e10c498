pub mod validation;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use self::validation::validate_config;

/// Environment variable that overrides the configuration file path.
pub const CONFIG_PATH_ENV: &str = "HECK_GATEWAY_CONFIG";
/// Environment variable that, when set, replaces the configured client keys.
pub const API_KEY_ENV: &str = "HECK_GATEWAY_API_KEY";
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Upstream read timeout in seconds. Applies per read, so long streams stay open.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_http_pool_max_idle_per_host")]
    pub http_pool_max_idle_per_host: usize,
    #[serde(default = "default_http_pool_idle_timeout_secs")]
    pub http_pool_idle_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_worker_threads: Option<usize>,
    #[serde(default)]
    pub base_path: String,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_timeout() -> u64 {
    180
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_http_pool_max_idle_per_host() -> usize {
    16
}
fn default_http_pool_idle_timeout_secs() -> u64 {
    15
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            http_pool_max_idle_per_host: default_http_pool_max_idle_per_host(),
            http_pool_idle_timeout_secs: default_http_pool_idle_timeout_secs(),
            runtime_worker_threads: None,
            base_path: String::new(),
        }
    }
}

/// The Heck upstream: where sessions and chats are opened, and how requests look.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Characters of the last user message used as the session title.
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,
    /// Header template sent with every upstream call. `Content-Type` is always JSON.
    #[serde(default = "default_upstream_headers")]
    pub headers: BTreeMap<String, String>,
}

fn default_upstream_base_url() -> String {
    "https://api.heckai.weight-wave.com/api/ha/v1".to_string()
}
fn default_language() -> String {
    "Chinese".to_string()
}
fn default_title_max_chars() -> usize {
    10
}

fn default_upstream_headers() -> BTreeMap<String, String> {
    [
        ("Origin", "https://heck.ai"),
        ("Referer", "https://heck.ai/"),
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36",
        ),
        ("Accept", "*/*"),
        ("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8"),
        (
            "sec-ch-ua",
            "\"Chromium\";v=\"142\", \"Google Chrome\";v=\"142\", \"Not_A Brand\";v=\"99\"",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "cross-site"),
        ("priority", "u=1, i"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            language: default_language(),
            title_max_chars: default_title_max_chars(),
            headers: default_upstream_headers(),
        }
    }
}

/// One client-facing alias and the upstream model id it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAliasConfig {
    pub alias: String,
    pub upstream: String,
}

impl ModelAliasConfig {
    fn new(alias: &str, upstream: &str) -> Self {
        Self {
            alias: alias.to_string(),
            upstream: upstream.to_string(),
        }
    }
}

/// Model alias table and fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_aliases")]
    pub aliases: Vec<ModelAliasConfig>,
    /// Upstream id used when the requested alias matches nothing.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Alias assumed when a request omits `model`.
    #[serde(default = "default_alias")]
    pub default_alias: String,
    #[serde(default = "default_owned_by")]
    pub owned_by: String,
}

fn default_aliases() -> Vec<ModelAliasConfig> {
    vec![
        ModelAliasConfig::new("gpt-4o-mini", "openai/gpt-4o-mini"),
        ModelAliasConfig::new("gpt-4o", "openai/chatgpt-4o-latest"),
        ModelAliasConfig::new("gpt-5-mini", "openai/gpt-5-mini"),
        ModelAliasConfig::new("gpt-5-nano", "openai/gpt-5-nano"),
        ModelAliasConfig::new("deepseek-r1", "deepseek/deepseek-r1"),
        ModelAliasConfig::new("deepseek-v3", "deepseek/deepseek-chat"),
        ModelAliasConfig::new("gemini-2.5-flash", "google/gemini-2.5-flash-preview"),
        ModelAliasConfig::new("claude-3.7-sonnet", "anthropic/claude-3.7-sonnet"),
        ModelAliasConfig::new("grok-3-mini", "x-ai/grok-3-mini-beta"),
        ModelAliasConfig::new("llama-4-scout", "meta-llama/llama-4-scout"),
    ]
}
fn default_model() -> String {
    "openai/gpt-4o-mini".to_string()
}
fn default_alias() -> String {
    "gpt-4o-mini".to_string()
}
fn default_owned_by() -> String {
    "heck-gateway".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            aliases: default_aliases(),
            default_model: default_model(),
            default_alias: default_alias(),
            owned_by: default_owned_by(),
        }
    }
}

/// Client authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAuthConfig {
    pub allowed_keys: Vec<String>,
}

/// Feature flags and settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    pub client_authentication: ClientAuthConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

/// Resolve the configuration file path from the environment.
#[must_use]
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Load configuration from a YAML file, apply environment overrides, and validate it.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when reading the file fails, [`ConfigError::Yaml`]
/// when parsing fails, or [`ConfigError::Validation`] when semantic validation fails.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let mut config = parse_config(&contents)?;
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        apply_api_key_override(&mut config, &key);
    }
    validate_config(&config)?;
    Ok(config)
}

/// Parse YAML text into an [`AppConfig`] without validating it.
///
/// # Errors
///
/// Returns [`ConfigError::Yaml`] when the text is not a valid config document.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    Ok(serde_yaml::from_str(contents)?)
}

fn apply_api_key_override(config: &mut AppConfig, key: &str) {
    let key = key.trim();
    if !key.is_empty() {
        config.client_authentication.allowed_keys = vec![key.to_string()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_example_config() {
        let config = load_config("config.example.yaml");
        assert!(
            config.is_ok(),
            "Failed to load example config: {:?}",
            config.err()
        );
        let config = config.unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.upstream.title_max_chars, 10);
        assert_eq!(config.models.aliases.len(), 10);
        assert_eq!(config.models.default_model, "openai/gpt-4o-mini");
        assert!(!config.client_authentication.allowed_keys.is_empty());
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = parse_config("client_authentication:\n  allowed_keys: [\"k\"]\n").unwrap();
        assert_eq!(config.server.timeout, 180);
        assert_eq!(config.upstream.language, "Chinese");
        assert_eq!(
            config.upstream.base_url,
            "https://api.heckai.weight-wave.com/api/ha/v1"
        );
        assert_eq!(config.models.aliases[0].alias, "gpt-4o-mini");
        assert_eq!(config.models.default_alias, "gpt-4o-mini");
        assert_eq!(config.features.log_level, "INFO");
        assert_eq!(
            config.upstream.headers.get("Origin").map(String::as_str),
            Some("https://heck.ai")
        );
    }

    #[test]
    fn test_alias_order_is_preserved() {
        let yaml = r"
client_authentication:
  allowed_keys: [k]
models:
  aliases:
    - alias: zeta
      upstream: vendor/zeta
    - alias: alpha
      upstream: vendor/alpha
  default_model: vendor/alpha
  default_alias: alpha
";
        let config = parse_config(yaml).unwrap();
        let names: Vec<&str> = config
            .models
            .aliases
            .iter()
            .map(|entry| entry.alias.as_str())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_api_key_override_replaces_keys() {
        let mut config = parse_config("client_authentication:\n  allowed_keys: [a, b]\n").unwrap();
        apply_api_key_override(&mut config, " secret ");
        assert_eq!(config.client_authentication.allowed_keys, vec!["secret"]);

        apply_api_key_override(&mut config, "  ");
        assert_eq!(config.client_authentication.allowed_keys, vec!["secret"]);
    }
}
