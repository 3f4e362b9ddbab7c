//! Handlers for the `rates` and `franchise` subcommands.
//!
//! Both print the response envelope as pretty JSON on stdout. A failed call
//! still prints its envelope (diagnostics included) before the error is
//! returned, so the exit status is non-zero.

use std::str::FromStr;

use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use shiprate_core::{CarrierResponse, CustomerType, Dimensions, Location, Package, SizingMode};
use shiprate_fastway::{Fastway, Origin, RateOptions, ResponseError, Transport};

#[derive(Debug, Args)]
pub struct RatesArgs {
    /// Franchise code the shipment is picked up from (e.g., MEL)
    #[arg(long)]
    pub origin: String,
    /// Country of the origin franchise; quotes outside Australia are skipped
    #[arg(long)]
    pub origin_country: Option<String>,
    /// Destination city or suburb
    #[arg(long)]
    pub to_city: String,
    /// Destination postcode
    #[arg(long)]
    pub to_postcode: String,
    /// Destination country
    #[arg(long, default_value = "AU")]
    pub to_country: String,
    /// Package as `KG` or `KG:LxWxH` in centimetres; repeat for each package
    #[arg(long = "package", required = true, value_parser = parse_package)]
    pub packages: Vec<Package>,
    /// Quote the frequent-customer tier instead of the normal one
    #[arg(long)]
    pub frequent: bool,
    /// Send package dimensions along with the weight
    #[arg(long)]
    pub dimensions: bool,
    /// Mark the response as produced in test mode
    #[arg(long)]
    pub test_mode: bool,
}

impl RatesArgs {
    fn origin(&self) -> Origin {
        match self.origin_country.as_deref() {
            Some(country) => Origin::new(&self.origin).in_country(country),
            None => Origin::new(&self.origin),
        }
    }

    fn destination(&self) -> Location {
        Location::new()
            .with_country(&self.to_country)
            .with_city(&self.to_city)
            .with_postal_code(&self.to_postcode)
    }

    fn options(&self) -> RateOptions {
        RateOptions {
            customer_type: self.frequent.then_some(CustomerType::Frequent),
            sizing: self.dimensions.then_some(SizingMode::WeightAndDimensions),
            test_mode: self.test_mode.then_some(true),
            ..RateOptions::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct FranchiseArgs {
    /// Postcode to look up
    #[arg(long)]
    pub postcode: String,
    /// Country of the postcode
    #[arg(long, default_value = "AU")]
    pub country: String,
    /// Mark the response as produced in test mode
    #[arg(long)]
    pub test_mode: bool,
}

impl FranchiseArgs {
    fn location(&self) -> Location {
        Location::new()
            .with_country(&self.country)
            .with_postal_code(&self.postcode)
    }

    fn options(&self) -> RateOptions {
        RateOptions {
            test_mode: self.test_mode.then_some(true),
            ..RateOptions::default()
        }
    }
}

/// Quote rates for the packages in `args`.
///
/// # Errors
///
/// Returns an error if the carrier call fails or the envelope cannot be
/// serialized.
pub(crate) async fn run_rates<T: Transport>(
    fastway: &Fastway<T>,
    args: &RatesArgs,
) -> anyhow::Result<()> {
    tracing::info!(
        origin = %args.origin,
        to_postcode = %args.to_postcode,
        packages = args.packages.len(),
        "quoting rates"
    );
    let outcome = fastway
        .find_rates(&args.origin(), &args.destination(), &args.packages, &args.options())
        .await;
    emit(outcome)
}

/// Look up the franchise serving `args.postcode`.
///
/// # Errors
///
/// Returns an error if the carrier call fails or the envelope cannot be
/// serialized.
pub(crate) async fn run_franchise<T: Transport>(
    fastway: &Fastway<T>,
    args: &FranchiseArgs,
) -> anyhow::Result<()> {
    let outcome = fastway
        .find_franchise(&args.location(), &args.options())
        .await;
    emit(outcome)
}

fn emit<R: Serialize>(outcome: Result<CarrierResponse<R>, ResponseError>) -> anyhow::Result<()> {
    match outcome {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err.response::<R>())?);
            Err(err.into())
        }
    }
}

/// Parses `KG` or `KG:LxWxH` (centimetres) into a [`Package`].
pub(crate) fn parse_package(input: &str) -> Result<Package, String> {
    let (weight, dimensions) = match input.split_once(':') {
        Some((weight, dimensions)) => (weight, parse_dimensions(dimensions)?),
        None => (input, Dimensions::default()),
    };
    let weight_kg = parse_positive(weight, "weight")?;
    Ok(Package::new(weight_kg, dimensions))
}

fn parse_dimensions(input: &str) -> Result<Dimensions, String> {
    let parts: Vec<&str> = input.split(['x', 'X']).collect();
    let [length, width, height] = parts.as_slice() else {
        return Err(format!(
            "dimensions \"{input}\" must be LxWxH in centimetres"
        ));
    };
    Ok(Dimensions::new(
        parse_positive(length, "length")?,
        parse_positive(width, "width")?,
        parse_positive(height, "height")?,
    ))
}

fn parse_positive(input: &str, what: &str) -> Result<Decimal, String> {
    let value = Decimal::from_str(input.trim())
        .map_err(|e| format!("{what} \"{}\" is not a number: {e}", input.trim()))?;
    if value <= Decimal::ZERO {
        return Err(format!("{what} must be greater than zero"));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "quote_test.rs"]
mod tests;
