use std::str::FromStr;

use crate::rate::CustomerType;

/// How a package is described in a per-package rate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizingMode {
    /// Weight only, in the URL path.
    #[default]
    Weight,
    /// Weight in the path plus length/width/height query parameters.
    WeightAndDimensions,
}

impl FromStr for SizingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weight" => Ok(Self::Weight),
            "dimensions" | "weight_and_dimensions" => Ok(Self::WeightAndDimensions),
            other => Err(format!(
                "unknown sizing mode \"{other}\" (expected weight or dimensions)"
            )),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub fastway_api_key: String,
    pub fastway_base_url: String,
    pub test_mode: bool,
    pub customer_type: CustomerType,
    pub sizing: SizingMode,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Upper bound on requests in flight during one carrier call.
    pub max_concurrent_requests: usize,
    pub user_agent: String,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("fastway_api_key", &"[redacted]")
            .field("fastway_base_url", &self.fastway_base_url)
            .field("test_mode", &self.test_mode)
            .field("customer_type", &self.customer_type)
            .field("sizing", &self.sizing)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .finish()
    }
}
