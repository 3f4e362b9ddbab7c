use std::future::Future;

use crate::location::Location;
use crate::package::Package;
use crate::rate::RateEstimate;
use crate::response::CarrierResponse;

/// The contract every carrier adapter exposes.
///
/// Origins and per-call options are carrier specific; the envelope and the
/// value objects are shared.
pub trait RateCarrier {
    type Origin;
    type Options: Default;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Display name stamped onto every [`RateEstimate`].
    fn name(&self) -> &'static str;

    /// Quotes every service the carrier prices for all `packages`.
    fn find_rates(
        &self,
        origin: &Self::Origin,
        destination: &Location,
        packages: &[Package],
        options: &Self::Options,
    ) -> impl Future<Output = Result<CarrierResponse<RateEstimate>, Self::Error>> + Send;

    /// Resolves the pickup franchise codes serving `location`.
    fn find_franchise(
        &self,
        location: &Location,
        options: &Self::Options,
    ) -> impl Future<Output = Result<CarrierResponse<String>, Self::Error>> + Send;

    fn valid_credentials(&self) -> bool;
}
