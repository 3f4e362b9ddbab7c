//! Fastway API response types.
//!
//! Every payload is an envelope carrying a `result` node, an `error` node, or
//! both; [`crate::parse`] picks the branch and these types read it. Prices
//! arrive as JSON numbers on some endpoints and as numeric strings on others.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// The `error` node: a bare message string on the pricing endpoints, an
/// object with `errorMessage` on the franchise endpoints.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiError {
    Message(String),
    Detailed {
        #[serde(rename = "errorMessage", alias = "message")]
        error_message: String,
        #[serde(rename = "errorCode", default)]
        error_code: Option<serde_json::Value>,
    },
}

// ---------------------------------------------------------------------------
// lookup
// ---------------------------------------------------------------------------

/// `result` node of a `lookup` (pricing) response.
#[derive(Debug, Deserialize)]
pub struct LookupResult {
    pub services: Vec<ServiceQuote>,
}

/// One priced service for a single parcel.
#[derive(Debug, Deserialize)]
pub struct ServiceQuote {
    pub name: String,
    #[serde(rename = "type", default)]
    pub service_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub totalprice_normal: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub totalprice_frequent: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// pickuprf
// ---------------------------------------------------------------------------

/// `result` node of a `pickuprf` (franchise) response: one record or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FranchiseResult {
    Many(Vec<FranchiseRecord>),
    One(FranchiseRecord),
}

#[derive(Debug, Deserialize)]
pub struct FranchiseRecord {
    pub franchise_code: String,
    #[serde(default)]
    pub franchise_name: Option<String>,
}

impl FranchiseResult {
    #[must_use]
    pub fn into_codes(self) -> Vec<String> {
        match self {
            FranchiseResult::Many(records) => {
                records.into_iter().map(|r| r.franchise_code).collect()
            }
            FranchiseResult::One(record) => vec![record.franchise_code],
        }
    }
}

/// Accepts a price as a JSON number, a numeric string, or null.
fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map(Some)
                .map_err(D::Error::custom)
        }
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Decimal::from_str(s.trim())
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid price \"{s}\": {e}"))),
        Some(other) => Err(D::Error::custom(format!("expected a price, got {other}"))),
    }
}
