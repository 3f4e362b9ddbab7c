//! The public Fastway entry point.
//!
//! Each call runs the same stages: build the URLs, fetch them (once per
//! distinct URL), decode every payload, aggregate, and wrap the outcome in a
//! [`CarrierResponse`]. Failures come back as a [`ResponseError`] that still
//! carries the diagnostics gathered up to that point.

use std::future::Future;

use futures::stream::{self, StreamExt};
use reqwest::Url;
use shiprate_core::{
    AppConfig, CarrierResponse, CustomerType, Diagnostics, Location, Package, RateCarrier,
    RateEstimate, SizingMode,
};

use crate::aggregate::{aggregate_franchises, aggregate_rates, CARRIER_NAME};
use crate::error::{FastwayError, ResponseError, TransportError};
use crate::parse::{self, Parsed};
use crate::request::{in_service_region, with_api_key, Origin, RateRequest, RequestBuilder};
use crate::transport::{HttpTransport, Transport};

/// Carrier-level defaults, overridable per call through [`RateOptions`].
#[derive(Clone)]
pub struct FastwaySettings {
    pub base_url: String,
    pub api_key: String,
    pub test_mode: bool,
    pub customer_type: CustomerType,
    pub sizing: SizingMode,
    /// Distinct URLs fetched at once during one call; at least 1.
    pub max_concurrent_requests: usize,
}

impl FastwaySettings {
    /// Production endpoint, normal tier, weight-only sizing, four requests in
    /// flight.
    #[must_use]
    pub fn new(api_key: &str) -> Self {
        Self {
            base_url: shiprate_core::config::DEFAULT_FASTWAY_BASE_URL.to_owned(),
            api_key: api_key.to_owned(),
            test_mode: false,
            customer_type: CustomerType::Normal,
            sizing: SizingMode::Weight,
            max_concurrent_requests: 4,
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.fastway_base_url.clone(),
            api_key: config.fastway_api_key.clone(),
            test_mode: config.test_mode,
            customer_type: config.customer_type,
            sizing: config.sizing,
            max_concurrent_requests: config.max_concurrent_requests,
        }
    }

    fn merged(&self, options: &RateOptions) -> CallSettings {
        CallSettings {
            api_key: options.api_key.clone().unwrap_or_else(|| self.api_key.clone()),
            test_mode: options.test_mode.unwrap_or(self.test_mode),
            customer_type: options.customer_type.unwrap_or(self.customer_type),
            sizing: options.sizing.unwrap_or(self.sizing),
        }
    }
}

impl std::fmt::Debug for FastwaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastwaySettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("test_mode", &self.test_mode)
            .field("customer_type", &self.customer_type)
            .field("sizing", &self.sizing)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .finish()
    }
}

/// Per-call overrides. `None` keeps the carrier default.
#[derive(Debug, Clone, Default)]
pub struct RateOptions {
    pub api_key: Option<String>,
    pub test_mode: Option<bool>,
    pub customer_type: Option<CustomerType>,
    pub sizing: Option<SizingMode>,
}

/// Settings in force for one call.
struct CallSettings {
    api_key: String,
    test_mode: bool,
    customer_type: CustomerType,
    sizing: SizingMode,
}

/// Client for Fastway rate and franchise lookups.
///
/// Generic over the [`Transport`] so tests can substitute an in-memory one;
/// [`Fastway::from_config`] wires the `reqwest` transport.
#[derive(Debug)]
pub struct Fastway<T = HttpTransport> {
    transport: T,
    builder: RequestBuilder,
    settings: FastwaySettings,
}

impl Fastway<HttpTransport> {
    /// # Errors
    ///
    /// Returns [`FastwayError::Http`] if the HTTP client cannot be built, or
    /// [`FastwayError::InvalidBaseUrl`] if the configured base URL is unusable.
    pub fn from_config(config: &AppConfig) -> Result<Self, FastwayError> {
        let transport = HttpTransport::from_config(config)?;
        Self::new(transport, FastwaySettings::from_app_config(config))
    }
}

impl<T: Transport> Fastway<T> {
    /// # Errors
    ///
    /// Returns [`FastwayError::InvalidBaseUrl`] if `settings.base_url` is unusable.
    pub fn new(transport: T, settings: FastwaySettings) -> Result<Self, FastwayError> {
        let builder = RequestBuilder::new(&settings.base_url)?;
        Ok(Self {
            transport,
            builder,
            settings,
        })
    }

    /// Quotes every service Fastway prices for all of `packages`.
    ///
    /// Origins outside Australia are not quoted: the call succeeds with no
    /// rates and nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns a [`ResponseError`] for the first failing package, in package
    /// order:
    /// - [`FastwayError::CarrierRejected`] if Fastway reported an error for
    ///   it (message verbatim),
    /// - [`FastwayError::MalformedResponse`] if its payload could not be read,
    /// - [`FastwayError::Transport`] if its request produced no payload.
    pub async fn find_rates(
        &self,
        origin: &Origin,
        destination: &Location,
        packages: &[Package],
        options: &RateOptions,
    ) -> Result<CarrierResponse<RateEstimate>, ResponseError> {
        let settings = self.settings.merged(options);
        if !origin.is_serviceable() {
            tracing::info!(
                origin = origin.franchise_code(),
                country = origin.country_code(),
                "origin outside the Fastway service region; no request issued"
            );
            return Ok(out_of_region(settings.test_mode));
        }

        let request = RateRequest::new(
            &self.builder,
            origin,
            destination,
            packages,
            settings.customer_type,
            settings.sizing,
        );
        let fetched = self.commit(request.urls(), &settings.api_key).await;
        let mut diagnostics = diagnostics_for(request.urls(), &fetched, settings.test_mode);

        let decoded = decode_all(request.urls(), fetched, &mut diagnostics);
        let parsed = decoded
            .into_iter()
            .zip(&diagnostics.raw_responses)
            .map(|(payload, raw)| {
                payload.and_then(|json| {
                    parse::services_from_value(&json, raw, request.customer_type())
                })
            });
        let outcome =
            in_package_order(parsed).and_then(|parsed| aggregate_rates(&request, parsed));

        if let Ok(rates) = &outcome {
            tracing::info!(
                origin = origin.franchise_code(),
                packages = packages.len(),
                rates = rates.len(),
                "Fastway rates quoted"
            );
        }
        finish(outcome, diagnostics)
    }

    /// Looks up the pickup franchise serving `location`'s postcode.
    ///
    /// Locations outside Australia are not looked up: the call succeeds with
    /// no franchises and nothing is sent.
    ///
    /// # Errors
    ///
    /// As for [`Fastway::find_rates`].
    pub async fn find_franchise(
        &self,
        location: &Location,
        options: &RateOptions,
    ) -> Result<CarrierResponse<String>, ResponseError> {
        let settings = self.settings.merged(options);
        let country = location.country_code();
        if !in_service_region(country.as_deref()) {
            tracing::info!(
                country = country.as_deref(),
                "location outside the Fastway service region; no request issued"
            );
            return Ok(out_of_region(settings.test_mode));
        }

        let urls = vec![self
            .builder
            .franchise_url(location.postal_code().unwrap_or_default())];
        let fetched = self.commit(&urls, &settings.api_key).await;
        let mut diagnostics = diagnostics_for(&urls, &fetched, settings.test_mode);

        let decoded = decode_all(&urls, fetched, &mut diagnostics);
        let parsed = decoded
            .into_iter()
            .zip(&diagnostics.raw_responses)
            .map(|(payload, raw)| {
                payload.and_then(|json| parse::franchises_from_value(&json, raw))
            });
        let outcome = in_package_order(parsed).and_then(|parsed| {
            let mut codes = Vec::new();
            for result in parsed {
                codes.extend(aggregate_franchises(result)?);
            }
            Ok(codes)
        });
        finish(outcome, diagnostics)
    }

    /// Fastway checks the key on every request; there is nothing to verify
    /// up front.
    #[must_use]
    pub fn valid_credentials(&self) -> bool {
        true
    }

    /// Fetches every URL, calling the transport once per distinct URL with at
    /// most `max_concurrent_requests` in flight. Outcomes come back aligned
    /// with `urls`.
    async fn commit(&self, urls: &[Url], api_key: &str) -> Vec<Result<String, TransportError>> {
        let mut unique: Vec<&Url> = Vec::new();
        let slots: Vec<usize> = urls
            .iter()
            .map(|url| {
                unique.iter().position(|u| *u == url).unwrap_or_else(|| {
                    unique.push(url);
                    unique.len() - 1
                })
            })
            .collect();

        tracing::debug!(
            requests = urls.len(),
            distinct = unique.len(),
            "issuing Fastway requests"
        );

        let requests: Vec<_> = unique
            .iter()
            .map(|url| {
                let keyed = with_api_key(url, api_key);
                async move {
                    tracing::debug!(url = %url, "GET");
                    self.transport.fetch(&keyed).await
                }
            })
            .collect();
        let outcomes: Vec<_> = stream::iter(requests)
            .buffered(self.settings.max_concurrent_requests.max(1))
            .collect()
            .await;

        slots.into_iter().map(|slot| outcomes[slot].clone()).collect()
    }
}

impl<T: Transport> RateCarrier for Fastway<T> {
    type Origin = Origin;
    type Options = RateOptions;
    type Error = ResponseError;

    fn name(&self) -> &'static str {
        CARRIER_NAME
    }

    fn find_rates(
        &self,
        origin: &Origin,
        destination: &Location,
        packages: &[Package],
        options: &RateOptions,
    ) -> impl Future<Output = Result<CarrierResponse<RateEstimate>, ResponseError>> + Send {
        Fastway::find_rates(self, origin, destination, packages, options)
    }

    fn find_franchise(
        &self,
        location: &Location,
        options: &RateOptions,
    ) -> impl Future<Output = Result<CarrierResponse<String>, ResponseError>> + Send {
        Fastway::find_franchise(self, location, options)
    }

    fn valid_credentials(&self) -> bool {
        Fastway::valid_credentials(self)
    }
}

fn out_of_region<R>(test_mode: bool) -> CarrierResponse<R> {
    CarrierResponse::success(
        Vec::new(),
        Diagnostics {
            test_mode,
            ..Diagnostics::default()
        },
    )
}

/// Records the URLs and raw bodies. A failed fetch keeps whatever body the
/// server sent (empty when none) so both lists stay aligned.
fn diagnostics_for(
    urls: &[Url],
    fetched: &[Result<String, TransportError>],
    test_mode: bool,
) -> Diagnostics {
    Diagnostics {
        request_urls: urls.iter().map(ToString::to_string).collect(),
        raw_responses: fetched
            .iter()
            .map(|outcome| match outcome {
                Ok(body) => body.clone(),
                Err(err) => err.body.clone().unwrap_or_default(),
            })
            .collect(),
        responses: Vec::new(),
        test_mode,
    }
}

/// Decodes every payload as JSON, recording each decodable one in
/// `diagnostics.responses`. The result is aligned with `urls`.
fn decode_all(
    urls: &[Url],
    fetched: Vec<Result<String, TransportError>>,
    diagnostics: &mut Diagnostics,
) -> Vec<Result<serde_json::Value, FastwayError>> {
    urls.iter()
        .zip(fetched)
        .map(|(url, outcome)| {
            let json = outcome
                .map_err(|source| FastwayError::Transport {
                    url: url.to_string(),
                    source,
                })
                .and_then(|body| parse::decode(&body))?;
            diagnostics.responses.push(json.clone());
            Ok(json)
        })
        .collect()
}

/// Walks per-package results in package order and stops at the first
/// failure of any kind: an unreadable payload or a carrier error.
fn in_package_order<T>(
    results: impl IntoIterator<Item = Result<Parsed<T>, FastwayError>>,
) -> Result<Vec<Parsed<T>>, FastwayError> {
    let mut accepted = Vec::new();
    for result in results {
        match result? {
            Parsed::Error(error) => return Err(FastwayError::CarrierRejected(error.message)),
            parsed @ Parsed::Result(_) => accepted.push(parsed),
        }
    }
    Ok(accepted)
}

fn finish<R>(
    outcome: Result<Vec<R>, FastwayError>,
    diagnostics: Diagnostics,
) -> Result<CarrierResponse<R>, ResponseError> {
    match outcome {
        Ok(results) => Ok(CarrierResponse::success(results, diagnostics)),
        Err(error) => {
            tracing::warn!(error = %error, "Fastway call failed");
            Err(ResponseError::new(error, diagnostics))
        }
    }
}

