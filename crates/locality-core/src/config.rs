use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Kept separate from the process environment so tests can feed a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let store_url = require("LOCALITY_STORE_URL")?;
    if !(store_url.starts_with("http://") || store_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "LOCALITY_STORE_URL".to_string(),
            reason: "must start with http:// or https://".to_string(),
        });
    }
    let store_key = require("LOCALITY_STORE_KEY")?;

    let env = parse_environment(&or_default("LOCALITY_ENV", "development"))?;

    let bind_raw = or_default("LOCALITY_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "LOCALITY_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default("LOCALITY_LOG_LEVEL", "info");

    let store_timeout_secs = parse_num("LOCALITY_STORE_TIMEOUT_SECS", "30")?;
    let store_user_agent = or_default("LOCALITY_STORE_USER_AGENT", "locality/0.1 (listing-resolver)");
    let store_max_retries = u32::try_from(parse_num("LOCALITY_STORE_MAX_RETRIES", "2")?)
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "LOCALITY_STORE_MAX_RETRIES".to_string(),
            reason: e.to_string(),
        })?;
    let store_retry_backoff_base_ms = parse_num("LOCALITY_STORE_RETRY_BACKOFF_BASE_MS", "250")?;

    Ok(AppConfig {
        store_url,
        store_key,
        env,
        bind_addr,
        log_level,
        store_timeout_secs,
        store_user_agent,
        store_max_retries,
        store_retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LOCALITY_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
