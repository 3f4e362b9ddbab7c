use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::location::Location;

/// Customer pricing class. Carriers publish a separate price for each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    #[default]
    Normal,
    Frequent,
}

impl FromStr for CustomerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "frequent" => Ok(Self::Frequent),
            other => Err(format!(
                "unknown customer type \"{other}\" (expected normal or frequent)"
            )),
        }
    }
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomerType::Normal => write!(f, "normal"),
            CustomerType::Frequent => write!(f, "frequent"),
        }
    }
}

/// A quoted price for one service covering every package in the shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateEstimate {
    /// Origin identifier exactly as it was quoted to the carrier.
    pub origin: String,
    pub destination: Location,
    pub carrier: String,
    pub service_name: String,
    pub service_code: Option<String>,
    pub total_price: Decimal,
    pub currency: String,
    /// Price for each package, in package order. Sums to `total_price`.
    pub package_prices: Vec<Decimal>,
}

impl RateEstimate {
    /// Total price in minor currency units, rounded half away from zero.
    #[must_use]
    pub fn total_price_cents(&self) -> i64 {
        let cents = (self.total_price * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        i64::try_from(cents).unwrap_or(i64::MAX)
    }
}
