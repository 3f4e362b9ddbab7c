//! Fastway rate and franchise lookups.
//!
//! [`Fastway`] is the entry point. A rate call issues one request per
//! package, then keeps only the services Fastway priced for every package
//! and sums their prices into one [`shiprate_core::RateEstimate`] each.

pub mod aggregate;
pub mod carrier;
pub mod error;
pub mod parse;
pub mod request;
mod retry;
pub mod transport;
pub mod types;

pub use aggregate::CARRIER_NAME;
pub use carrier::{Fastway, FastwaySettings, RateOptions};
pub use error::{FastwayError, ResponseError, TransportError};
pub use parse::{ErrorPayload, Parsed, ServiceOffering};
pub use request::{Origin, RateRequest, RequestBuilder};
pub use transport::{HttpTransport, Transport};
