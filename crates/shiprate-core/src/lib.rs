//! Shared value objects, output shapes, and configuration for the shiprate
//! carrier clients.

pub mod app_config;
pub mod carrier;
pub mod config;
pub mod location;
pub mod package;
pub mod rate;
pub mod response;

use thiserror::Error;

pub use app_config::{AppConfig, SizingMode};
pub use carrier::RateCarrier;
pub use config::{load_app_config, load_app_config_from_env};
pub use location::Location;
pub use package::{Dimensions, Package};
pub use rate::{CustomerType, RateEstimate};
pub use response::{CarrierResponse, Diagnostics};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
