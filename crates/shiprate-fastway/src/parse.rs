//! Decoding of raw Fastway payloads into per-request results.
//!
//! A payload decodes to one of three outcomes: a [`Parsed::Result`], a
//! carrier-reported [`Parsed::Error`], or a [`FastwayError::MalformedResponse`]
//! when it matches neither shape. Carrier errors are data here; whether they
//! sink the whole call is decided by [`crate::aggregate`].

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shiprate_core::CustomerType;

use crate::error::FastwayError;
use crate::types::{ApiError, FranchiseResult, LookupResult};

/// Currency every Fastway price is settled in.
pub const SETTLEMENT_CURRENCY: &str = "AUD";

/// One decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Result(T),
    Error(ErrorPayload),
}

/// An error the carrier reported in a well-formed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPayload {
    pub message: String,
    pub code: Option<String>,
}

/// A service priced for one package, at the requested tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOffering {
    pub name: String,
    pub service_code: Option<String>,
    pub price: Decimal,
    pub currency: &'static str,
}

/// Decodes a raw body as JSON.
///
/// # Errors
///
/// Returns [`FastwayError::MalformedResponse`] if the body is not JSON.
pub fn decode(raw: &str) -> Result<serde_json::Value, FastwayError> {
    serde_json::from_str(raw).map_err(|e| malformed(format!("body is not JSON: {e}"), raw))
}

/// Parses a raw `lookup` body into the services priced for one package.
///
/// # Errors
///
/// Returns [`FastwayError::MalformedResponse`] if the body is not JSON, has
/// neither a `result` nor an `error` node, or a service lacks the price for
/// `customer_type`.
pub fn parse_services(
    raw: &str,
    customer_type: CustomerType,
) -> Result<Parsed<Vec<ServiceOffering>>, FastwayError> {
    services_from_value(&decode(raw)?, raw, customer_type)
}

/// Parses a raw `pickuprf` body into franchise codes.
///
/// # Errors
///
/// Returns [`FastwayError::MalformedResponse`] if the body is not JSON or has
/// neither a `result` nor an `error` node.
pub fn parse_franchises(raw: &str) -> Result<Parsed<Vec<String>>, FastwayError> {
    franchises_from_value(&decode(raw)?, raw)
}

/// Same as [`parse_services`] for a body that has already been decoded.
/// `raw` is only used to report a malformed payload.
///
/// # Errors
///
/// See [`parse_services`].
pub fn services_from_value(
    json: &serde_json::Value,
    raw: &str,
    customer_type: CustomerType,
) -> Result<Parsed<Vec<ServiceOffering>>, FastwayError> {
    let lookup = match interpret::<LookupResult>(json, raw)? {
        Parsed::Result(lookup) => lookup,
        Parsed::Error(e) => return Ok(Parsed::Error(e)),
    };

    let offerings = lookup
        .services
        .into_iter()
        .map(|quote| {
            let price = match customer_type {
                CustomerType::Normal => quote.totalprice_normal,
                CustomerType::Frequent => quote.totalprice_frequent,
            };
            let price = price.ok_or_else(|| {
                malformed(
                    format!(
                        "service \"{}\" has no {} price",
                        quote.name,
                        price_field(customer_type)
                    ),
                    raw,
                )
            })?;
            Ok(ServiceOffering {
                name: quote.name,
                service_code: quote.service_type,
                price,
                currency: SETTLEMENT_CURRENCY,
            })
        })
        .collect::<Result<Vec<_>, FastwayError>>()?;

    Ok(Parsed::Result(offerings))
}

/// Same as [`parse_franchises`] for a body that has already been decoded.
///
/// # Errors
///
/// See [`parse_franchises`].
pub fn franchises_from_value(
    json: &serde_json::Value,
    raw: &str,
) -> Result<Parsed<Vec<String>>, FastwayError> {
    Ok(match interpret::<FranchiseResult>(json, raw)? {
        Parsed::Result(result) => Parsed::Result(result.into_codes()),
        Parsed::Error(e) => Parsed::Error(e),
    })
}

/// Wire field that carries the price for a tier.
#[must_use]
pub fn price_field(customer_type: CustomerType) -> &'static str {
    match customer_type {
        CustomerType::Normal => "totalprice_normal",
        CustomerType::Frequent => "totalprice_frequent",
    }
}

/// Splits the envelope into its `result` or `error` branch. A non-null
/// `result` node wins when both are present, whatever the `error` node holds;
/// the `error` node is only read when there is no result.
fn interpret<T: DeserializeOwned>(
    json: &serde_json::Value,
    raw: &str,
) -> Result<Parsed<T>, FastwayError> {
    if let Some(result) = node(json, "result") {
        return T::deserialize(result)
            .map(Parsed::Result)
            .map_err(|e| malformed(format!("unexpected result shape: {e}"), raw));
    }
    match node(json, "error") {
        Some(error) => ApiError::deserialize(error)
            .map(|error| Parsed::Error(error_payload(error)))
            .map_err(|e| malformed(format!("unexpected error shape: {e}"), raw)),
        None => Err(malformed(
            "payload has neither a result nor an error node".to_owned(),
            raw,
        )),
    }
}

/// A top-level node, treating an explicit `null` as absent.
fn node<'a>(json: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    json.get(key).filter(|value| !value.is_null())
}

fn error_payload(error: ApiError) -> ErrorPayload {
    match error {
        ApiError::Message(message) => ErrorPayload {
            message,
            code: None,
        },
        ApiError::Detailed {
            error_message,
            error_code,
        } => ErrorPayload {
            message: error_message,
            code: error_code.map(|c| match c {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }),
        },
    }
}

fn malformed(reason: String, raw: &str) -> FastwayError {
    FastwayError::MalformedResponse {
        reason,
        raw: raw.to_owned(),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
