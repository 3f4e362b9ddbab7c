//! The envelope returned from every carrier call.
//!
//! A [`CarrierResponse`] is built once per call and never mutated. It carries
//! the request URLs and raw payloads on success and on failure alike, so a
//! caller can always see what was sent and what came back.

use serde::Serialize;

use crate::rate::RateEstimate;

/// What was sent and received during one carrier call.
///
/// `request_urls` and `raw_responses` are index-aligned: slot `i` of
/// `raw_responses` is the body returned for `request_urls[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub request_urls: Vec<String>,
    pub raw_responses: Vec<String>,
    /// Payloads that decoded as JSON, in request order.
    pub responses: Vec<serde_json::Value>,
    pub test_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarrierResponse<T> {
    success: bool,
    message: String,
    results: Vec<T>,
    #[serde(flatten)]
    diagnostics: Diagnostics,
}

impl<T> CarrierResponse<T> {
    #[must_use]
    pub fn success(results: Vec<T>, diagnostics: Diagnostics) -> Self {
        Self {
            success: true,
            message: "success".to_owned(),
            results,
            diagnostics,
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>, diagnostics: Diagnostics) -> Self {
        Self {
            success: false,
            message: message.into(),
            results: Vec::new(),
            diagnostics,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn results(&self) -> &[T] {
        &self.results
    }

    #[must_use]
    pub fn into_results(self) -> Vec<T> {
        self.results
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn request_urls(&self) -> &[String] {
        &self.diagnostics.request_urls
    }

    #[must_use]
    pub fn raw_responses(&self) -> &[String] {
        &self.diagnostics.raw_responses
    }

    #[must_use]
    pub fn responses(&self) -> &[serde_json::Value] {
        &self.diagnostics.responses
    }

    #[must_use]
    pub fn test_mode(&self) -> bool {
        self.diagnostics.test_mode
    }
}

impl CarrierResponse<RateEstimate> {
    #[must_use]
    pub fn rates(&self) -> &[RateEstimate] {
        &self.results
    }
}

impl CarrierResponse<String> {
    /// Franchise (pickup branch) codes, in the order the carrier listed them.
    #[must_use]
    pub fn franchises(&self) -> &[String] {
        &self.results
    }
}
