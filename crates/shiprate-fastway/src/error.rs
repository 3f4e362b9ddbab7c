use shiprate_core::{CarrierResponse, Diagnostics};
use thiserror::Error;

/// Errors produced while quoting against the Fastway API.
#[derive(Debug, Error)]
pub enum FastwayError {
    /// The underlying `reqwest::Client` could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The payload could not be interpreted at all. `raw` is the offending body.
    #[error("malformed Fastway response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    /// Fastway reported an error for one of the requests. The message is the
    /// carrier's own text, unmodified.
    #[error("{0}")]
    CarrierRejected(String),

    /// The transport gave up on a request without producing a usable payload.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },
}

/// Failure reported by a [`crate::Transport`].
///
/// `body` holds whatever the server sent back, when anything was sent, so it
/// can still be shown to the caller.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<String>,
    retriable: bool,
}

impl TransportError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            body: None,
            retriable: false,
        }
    }

    /// An HTTP status that carried no usable body. 5xx statuses are retriable.
    #[must_use]
    pub fn from_status(status: u16, body: Option<String>) -> Self {
        Self {
            message: format!("HTTP status {status} with no usable body"),
            status: Some(status),
            body,
            retriable: (500..600).contains(&status),
        }
    }

    /// Whether a retry after back-off could plausibly succeed.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        self.retriable
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let retriable = err.is_timeout()
            || err.is_connect()
            || status.is_some_and(|s| (500..600).contains(&s));
        // The request URL carries the API key; keep it out of the message.
        let message = err.without_url().to_string();
        Self {
            message,
            status,
            body: None,
            retriable,
        }
    }
}

/// A failed carrier call.
///
/// Displays as the underlying error (the verbatim carrier message for
/// [`FastwayError::CarrierRejected`]) and keeps the diagnostics gathered
/// before the failure, so [`ResponseError::response`] can rebuild the
/// unsuccessful envelope.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ResponseError {
    #[source]
    pub error: FastwayError,
    pub diagnostics: Diagnostics,
}

impl ResponseError {
    #[must_use]
    pub fn new(error: FastwayError, diagnostics: Diagnostics) -> Self {
        Self { error, diagnostics }
    }

    /// The unsuccessful envelope: `success == false`, the failure message,
    /// no results, full diagnostics.
    #[must_use]
    pub fn response<T>(&self) -> CarrierResponse<T> {
        CarrierResponse::failure(self.error.to_string(), self.diagnostics.clone())
    }
}
