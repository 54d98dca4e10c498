use std::collections::HashSet;

use http::header::{HeaderName, HeaderValue};

use super::{AppConfig, ConfigError};

const VALID_LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL", "DISABLED"];

/// Validate the full application config, returning an error if any rule is violated.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when any configuration invariant is violated.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_server_config(config)?;
    validate_allowed_keys(config)?;
    validate_upstream(config)?;
    validate_models(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn validation_err(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn validate_server_config(config: &AppConfig) -> Result<(), ConfigError> {
    let server = &config.server;
    if server.http_pool_max_idle_per_host == 0 {
        return Err(validation_err(
            "server.http_pool_max_idle_per_host must be greater than 0",
        ));
    }
    if server.timeout == 0 {
        return Err(validation_err("server.timeout must be greater than 0"));
    }
    if server.connect_timeout == 0 {
        return Err(validation_err(
            "server.connect_timeout must be greater than 0",
        ));
    }
    if let Some(worker_threads) = server.runtime_worker_threads {
        if worker_threads == 0 {
            return Err(validation_err(
                "server.runtime_worker_threads must be greater than 0 when set",
            ));
        }
    }
    Ok(())
}

fn validate_allowed_keys(config: &AppConfig) -> Result<(), ConfigError> {
    if config.client_authentication.allowed_keys.is_empty() {
        return Err(validation_err("allowed_keys cannot be empty"));
    }
    for key in &config.client_authentication.allowed_keys {
        if key.trim().is_empty() {
            return Err(validation_err("allowed_keys contains an empty key"));
        }
    }
    Ok(())
}

fn validate_upstream(config: &AppConfig) -> Result<(), ConfigError> {
    let upstream = &config.upstream;
    let parsed = url::Url::parse(upstream.base_url.trim()).map_err(|err| {
        validation_err(format!("upstream.base_url is not a valid URL: {err}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(validation_err(
            "upstream.base_url must use http:// or https://",
        ));
    }
    if upstream.title_max_chars == 0 {
        return Err(validation_err(
            "upstream.title_max_chars must be greater than 0",
        ));
    }
    if upstream.language.trim().is_empty() {
        return Err(validation_err("upstream.language cannot be empty"));
    }
    for (name, value) in &upstream.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(validation_err(format!(
                "upstream.headers: invalid header name '{name}'"
            )));
        }
        if HeaderValue::from_str(value).is_err() {
            return Err(validation_err(format!(
                "upstream.headers: invalid value for header '{name}'"
            )));
        }
    }
    Ok(())
}

fn validate_models(config: &AppConfig) -> Result<(), ConfigError> {
    let models = &config.models;
    if models.aliases.is_empty() {
        return Err(validation_err("models.aliases cannot be empty"));
    }

    let mut seen = HashSet::new();
    for entry in &models.aliases {
        if entry.alias.trim().is_empty() || entry.upstream.trim().is_empty() {
            return Err(validation_err(format!(
                "Invalid alias entry '{}' -> '{}'. Both parts must not be empty.",
                entry.alias, entry.upstream
            )));
        }
        if !seen.insert(entry.alias.as_str()) {
            return Err(validation_err(format!(
                "models.aliases: duplicate alias '{}'",
                entry.alias
            )));
        }
    }

    if models.default_model.trim().is_empty() {
        return Err(validation_err("models.default_model cannot be empty"));
    }
    if !seen.contains(models.default_alias.as_str()) {
        return Err(validation_err(format!(
            "models.default_alias '{}' is not one of the configured aliases",
            models.default_alias
        )));
    }
    Ok(())
}

fn validate_log_level(config: &AppConfig) -> Result<(), ConfigError> {
    let level = config.features.log_level.to_uppercase();
    if !VALID_LOG_LEVELS.contains(&level.as_str()) {
        return Err(validation_err(format!(
            "features.log_level '{}' is invalid. Must be one of: {}",
            config.features.log_level,
            VALID_LOG_LEVELS.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ClientAuthConfig, FeaturesConfig, ModelAliasConfig, ModelsConfig, ServerConfig,
        UpstreamConfig,
    };

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            models: ModelsConfig::default(),
            client_authentication: ClientAuthConfig {
                allowed_keys: vec!["client-key".to_string()],
            },
            features: FeaturesConfig::default(),
        }
    }

    fn assert_invalid(config: &AppConfig, needle: &str) {
        match validate_config(config) {
            Err(ConfigError::Validation(msg)) => {
                assert!(msg.contains(needle), "unexpected message: {msg}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_rejects_empty_keys() {
        let mut config = valid_config();
        config.client_authentication.allowed_keys.clear();
        assert_invalid(&config, "allowed_keys cannot be empty");

        config.client_authentication.allowed_keys = vec!["  ".to_string()];
        assert_invalid(&config, "empty key");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = valid_config();
        config.upstream.base_url = "ftp://heck.example".to_string();
        assert_invalid(&config, "http:// or https://");

        config.upstream.base_url = "not a url".to_string();
        assert_invalid(&config, "not a valid URL");
    }

    #[test]
    fn test_rejects_zero_title_length() {
        let mut config = valid_config();
        config.upstream.title_max_chars = 0;
        assert_invalid(&config, "title_max_chars");
    }

    #[test]
    fn test_rejects_empty_alias_table() {
        let mut config = valid_config();
        config.models.aliases.clear();
        assert_invalid(&config, "models.aliases cannot be empty");
    }

    #[test]
    fn test_rejects_duplicate_alias() {
        let mut config = valid_config();
        config.models.aliases.push(ModelAliasConfig {
            alias: "gpt-4o-mini".to_string(),
            upstream: "openai/other".to_string(),
        });
        assert_invalid(&config, "duplicate alias");
    }

    #[test]
    fn test_rejects_unknown_default_alias() {
        let mut config = valid_config();
        config.models.default_alias = "missing".to_string();
        assert_invalid(&config, "default_alias");
    }

    #[test]
    fn test_rejects_bad_header_name() {
        let mut config = valid_config();
        config
            .upstream
            .headers
            .insert("bad header".to_string(), "x".to_string());
        assert_invalid(&config, "invalid header name");
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut config = valid_config();
        config.features.log_level = "LOUD".to_string();
        assert_invalid(&config, "log_level");

        config.features.log_level = "warning".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
