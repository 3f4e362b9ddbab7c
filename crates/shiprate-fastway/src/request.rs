//! Request construction for the Fastway pricing API.
//!
//! Rate lookups issue one URL per package, in package order; that order is
//! what [`crate::aggregate`] relies on to line responses back up with
//! packages. Franchise lookups issue a single URL keyed by postcode.

use reqwest::Url;
use shiprate_core::{CustomerType, Location, Package, SizingMode};

use crate::error::FastwayError;

/// Country codes Fastway will quote from. An origin that names no country
/// is assumed to be domestic.
const SERVICEABLE_COUNTRIES: [&str; 2] = ["AU", "AUS"];

/// Returns `true` when an origin in `country` can be quoted.
#[must_use]
pub fn in_service_region(country: Option<&str>) -> bool {
    country.is_none_or(|code| {
        let code = code.trim().to_ascii_uppercase();
        code.is_empty() || SERVICEABLE_COUNTRIES.contains(&code.as_str())
    })
}

/// Where a shipment is picked up: a Fastway franchise code such as `"MEL"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    franchise_code: String,
    country: Option<String>,
}

impl Origin {
    #[must_use]
    pub fn new(franchise_code: &str) -> Self {
        Self {
            franchise_code: franchise_code.trim().to_uppercase(),
            country: None,
        }
    }

    /// Pins the origin to a country; used to keep out-of-region quotes from
    /// ever reaching the API.
    #[must_use]
    pub fn in_country(mut self, country: &str) -> Self {
        self.country = Some(country.trim().to_uppercase());
        self
    }

    #[must_use]
    pub fn franchise_code(&self) -> &str {
        &self.franchise_code
    }

    #[must_use]
    pub fn country_code(&self) -> Option<&str> {
        self.country.as_deref()
    }

    #[must_use]
    pub fn is_serviceable(&self) -> bool {
        in_service_region(self.country_code())
    }
}

impl From<&str> for Origin {
    fn from(franchise_code: &str) -> Self {
        Self::new(franchise_code)
    }
}

/// Builds endpoint URLs under a validated base URL.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
}

impl RequestBuilder {
    /// # Errors
    ///
    /// Returns [`FastwayError::InvalidBaseUrl`] if `base_url` does not parse
    /// or cannot carry path segments.
    pub fn new(base_url: &str) -> Result<Self, FastwayError> {
        let parsed = Url::parse(base_url.trim()).map_err(|e| FastwayError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(FastwayError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "URL cannot carry a path".to_owned(),
            });
        }
        Ok(Self { base_url: parsed })
    }

    /// `{base}/lookup/{origin}/{city}/{postcode}/{kg}` for one package, with
    /// `LengthInCm`/`WidthInCm`/`HeightInCm` appended in
    /// [`SizingMode::WeightAndDimensions`].
    #[must_use]
    pub fn rate_url(
        &self,
        origin: &Origin,
        destination: &Location,
        package: &Package,
        sizing: SizingMode,
    ) -> Url {
        let weight = package.kilograms().to_string();
        let mut url = self.endpoint(&[
            "lookup",
            origin.franchise_code(),
            destination.city().unwrap_or_default(),
            destination.postal_code().unwrap_or_default(),
            &weight,
        ]);
        if sizing == SizingMode::WeightAndDimensions {
            url.query_pairs_mut()
                .append_pair("LengthInCm", &package.length_cm().to_string())
                .append_pair("WidthInCm", &package.width_cm().to_string())
                .append_pair("HeightInCm", &package.height_cm().to_string());
        }
        url
    }

    /// One rate URL per package, in package order.
    #[must_use]
    pub fn rate_urls(
        &self,
        origin: &Origin,
        destination: &Location,
        packages: &[Package],
        sizing: SizingMode,
    ) -> Vec<Url> {
        packages
            .iter()
            .map(|package| self.rate_url(origin, destination, package, sizing))
            .collect()
    }

    /// `{base}/pickuprf/{postcode}/1`.
    #[must_use]
    pub fn franchise_url(&self, postal_code: &str) -> Url {
        self.endpoint(&["pickuprf", postal_code.trim(), "1"])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so the segments are always writable.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// A rate call: the origin, destination, packages and tier, plus the URLs
/// derived from them. Built once per call and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RateRequest {
    origin: Origin,
    destination: Location,
    packages: Vec<Package>,
    customer_type: CustomerType,
    urls: Vec<Url>,
}

impl RateRequest {
    #[must_use]
    pub fn new(
        builder: &RequestBuilder,
        origin: &Origin,
        destination: &Location,
        packages: &[Package],
        customer_type: CustomerType,
        sizing: SizingMode,
    ) -> Self {
        let urls = builder.rate_urls(origin, destination, packages, sizing);
        Self {
            origin: origin.clone(),
            destination: destination.clone(),
            packages: packages.to_vec(),
            customer_type,
            urls,
        }
    }

    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    #[must_use]
    pub fn destination(&self) -> &Location {
        &self.destination
    }

    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    #[must_use]
    pub fn customer_type(&self) -> CustomerType {
        self.customer_type
    }

    #[must_use]
    pub fn urls(&self) -> &[Url] {
        &self.urls
    }
}

/// Returns a copy of `url` carrying the API key. Only the transport sees the
/// keyed URL; diagnostics record the bare one.
#[must_use]
pub fn with_api_key(url: &Url, api_key: &str) -> Url {
    let mut keyed = url.clone();
    keyed.query_pairs_mut().append_pair("api_key", api_key);
    keyed
}
