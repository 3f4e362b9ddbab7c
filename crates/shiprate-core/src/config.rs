use crate::app_config::{AppConfig, SizingMode};
use crate::rate::CustomerType;
use crate::ConfigError;

/// Production endpoint of the Fastway pricing API.
pub const DEFAULT_FASTWAY_BASE_URL: &str = "http://api.fastway.org/v2/psc";

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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_concurrency = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        match raw.parse::<usize>() {
            Ok(0) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be at least 1".to_string(),
            }),
            Ok(limit) => Ok(limit),
            Err(e) => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let fastway_api_key = require("FASTWAY_API_KEY")?;
    let fastway_base_url = or_default("FASTWAY_BASE_URL", DEFAULT_FASTWAY_BASE_URL);
    let test_mode = parse_bool("FASTWAY_TEST_MODE", &or_default("FASTWAY_TEST_MODE", "false"))?;

    let customer_type = or_default("FASTWAY_CUSTOMER_TYPE", "normal")
        .parse::<CustomerType>()
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "FASTWAY_CUSTOMER_TYPE".to_string(),
            reason,
        })?;

    let sizing = or_default("FASTWAY_SIZING", "weight")
        .parse::<SizingMode>()
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "FASTWAY_SIZING".to_string(),
            reason,
        })?;

    let request_timeout_secs = parse_u64("FASTWAY_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("FASTWAY_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("FASTWAY_RETRY_BACKOFF_BASE_MS", "500")?;
    let max_concurrent_requests = parse_concurrency("FASTWAY_MAX_CONCURRENT_REQUESTS", "4")?;
    let user_agent = or_default("FASTWAY_USER_AGENT", "shiprate/0.1 (rate-quotation)");
    let log_level = or_default("SHIPRATE_LOG_LEVEL", "info");

    Ok(AppConfig {
        fastway_api_key,
        fastway_base_url,
        test_mode,
        customer_type,
        sizing,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        max_concurrent_requests,
        user_agent,
        log_level,
    })
}

/// Accepts the usual spellings of a boolean flag.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("\"{other}\" is not a boolean"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
