//! Reconciles per-package results into one multi-package quote.
//!
//! A service is quoted only when every package in the shipment was priced
//! for it exactly once; anything less is dropped without an error. One
//! carrier error on any package rejects the whole shipment.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shiprate_core::RateEstimate;

use crate::error::FastwayError;
use crate::parse::{Parsed, ServiceOffering, SETTLEMENT_CURRENCY};
use crate::request::RateRequest;

/// Display name of the carrier on every estimate.
pub const CARRIER_NAME: &str = "Fastway";

/// Turns the per-package results of `request` into rate estimates, sorted by
/// service name.
///
/// `parsed` must hold one entry per package, in package order.
///
/// # Errors
///
/// Returns [`FastwayError::CarrierRejected`] with the carrier's message if
/// any package's result is an error payload (the first one in package order).
pub fn aggregate_rates(
    request: &RateRequest,
    parsed: Vec<Parsed<Vec<ServiceOffering>>>,
) -> Result<Vec<RateEstimate>, FastwayError> {
    let package_count = parsed.len();
    let per_package = accepted_results(parsed)?;

    // Offerings grouped by service name, each tagged with the package that produced it.
    let mut by_service: BTreeMap<String, Vec<(usize, ServiceOffering)>> = BTreeMap::new();
    for (index, offerings) in per_package.into_iter().enumerate() {
        for offering in offerings {
            by_service
                .entry(offering.name.clone())
                .or_default()
                .push((index, offering));
        }
    }

    let estimates = by_service
        .into_iter()
        .filter_map(|(service_name, tagged)| {
            if covers_every_package(&tagged, package_count) {
                Some(estimate(request, service_name, &tagged))
            } else {
                tracing::debug!(
                    service = %service_name,
                    priced_for = tagged.len(),
                    packages = package_count,
                    "service not priced for every package; dropped"
                );
                None
            }
        })
        .collect();

    Ok(estimates)
}

/// Franchise codes from the single franchise lookup result.
///
/// # Errors
///
/// Returns [`FastwayError::CarrierRejected`] with the carrier's message if
/// the result is an error payload.
pub fn aggregate_franchises(parsed: Parsed<Vec<String>>) -> Result<Vec<String>, FastwayError> {
    match parsed {
        Parsed::Result(codes) => Ok(codes),
        Parsed::Error(error) => Err(FastwayError::CarrierRejected(error.message)),
    }
}

fn accepted_results(
    parsed: Vec<Parsed<Vec<ServiceOffering>>>,
) -> Result<Vec<Vec<ServiceOffering>>, FastwayError> {
    parsed
        .into_iter()
        .map(|result| match result {
            Parsed::Result(offerings) => Ok(offerings),
            Parsed::Error(error) => Err(FastwayError::CarrierRejected(error.message)),
        })
        .collect()
}

/// `tagged` is in package order, so "exactly once per package" means the
/// tags read `0, 1, .., package_count - 1`.
fn covers_every_package(tagged: &[(usize, ServiceOffering)], package_count: usize) -> bool {
    tagged.len() == package_count
        && tagged
            .iter()
            .enumerate()
            .all(|(expected, (index, _))| *index == expected)
}

fn estimate(
    request: &RateRequest,
    service_name: String,
    tagged: &[(usize, ServiceOffering)],
) -> RateEstimate {
    let package_prices: Vec<Decimal> = tagged.iter().map(|(_, o)| o.price).collect();
    RateEstimate {
        origin: request.origin().franchise_code().to_owned(),
        destination: request.destination().clone(),
        carrier: CARRIER_NAME.to_owned(),
        service_name,
        service_code: tagged.first().and_then(|(_, o)| o.service_code.clone()),
        total_price: package_prices.iter().sum(),
        currency: SETTLEMENT_CURRENCY.to_owned(),
        package_prices,
    }
}
