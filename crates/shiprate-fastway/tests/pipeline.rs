//! End-to-end pipeline tests for `Fastway` over an in-memory transport.
//!
//! The stub answers by URL path and records every URL it is asked for, so
//! the tests can assert on alignment, de-duplication, and the absence of
//! requests as well as on the aggregated quote.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::Url;
use rust_decimal::Decimal;
use serde_json::json;
use shiprate_core::{CustomerType, Location, Package, RateCarrier, SizingMode};
use shiprate_fastway::{
    Fastway, FastwayError, FastwaySettings, Origin, RateOptions, Transport, TransportError,
};

const BASE: &str = "http://fastway.test/v2/psc";

/// Clones share the call log and in-flight counters, so a test keeps one
/// handle and gives the carrier the other.
#[derive(Default, Clone)]
struct StubTransport {
    responses: HashMap<String, Result<String, TransportError>>,
    calls: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl StubTransport {
    fn respond(self, path: &str, body: serde_json::Value) -> Self {
        self.respond_raw(path, &body.to_string())
    }

    fn respond_raw(mut self, path: &str, body: &str) -> Self {
        self.responses.insert(path.to_owned(), Ok(body.to_owned()));
        self
    }

    fn fail(mut self, path: &str, error: TransportError) -> Self {
        self.responses.insert(path.to_owned(), Err(error));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Transport for StubTransport {
    async fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        self.calls.lock().expect("calls lock").push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.responses
            .get(url.path())
            .cloned()
            .unwrap_or_else(|| Err(TransportError::new(format!("no stub for {}", url.path()))))
    }
}

fn carrier(transport: &StubTransport) -> Fastway<StubTransport> {
    carrier_with_limit(transport, 4)
}

fn carrier_with_limit(transport: &StubTransport, max_concurrent_requests: usize) -> Fastway<StubTransport> {
    let settings = FastwaySettings {
        base_url: BASE.to_owned(),
        max_concurrent_requests,
        ..FastwaySettings::new("test-key")
    };
    Fastway::new(transport.clone(), settings).expect("valid settings")
}

fn sydney() -> Location {
    Location::new()
        .with_country("AU")
        .with_city("Sydney")
        .with_postal_code("2000")
}

fn melbourne() -> Location {
    Location::new()
        .with_country("AU")
        .with_city("Melbourne")
        .with_state("VIC")
        .with_address1("321 Exhibition St")
        .with_postal_code("3000")
}

fn services(entries: &[(&str, &str, &str)]) -> serde_json::Value {
    let services: Vec<serde_json::Value> = entries
        .iter()
        .map(|(name, normal, frequent)| {
            json!({
                "type": "Parcel",
                "name": name,
                "totalprice_normal": normal,
                "totalprice_frequent": frequent
            })
        })
        .collect();
    json!({ "result": { "services": services } })
}

const BOOK_PATH: &str = "/v2/psc/lookup/MEL/Sydney/2000/0.25";
const WII_PATH: &str = "/v2/psc/lookup/MEL/Sydney/2000/3.2";

fn book() -> Package {
    Package::metric(250, [19, 14, 2])
}

fn wii() -> Package {
    Package::metric(3_200, [40, 30, 20])
}

// ---------------------------------------------------------------------------
// rates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_package_quote_keeps_the_price() {
    let transport = StubTransport::default().respond(BOOK_PATH, services(&[("Road", "12.65", "10.10")]));
    let fastway = carrier(&transport);

    let response = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book()], &RateOptions::default())
        .await
        .expect("rates");

    assert!(response.is_success());
    assert_eq!(response.message(), "success");
    assert_eq!(response.rates().len(), 1);
    let rate = &response.rates()[0];
    assert_eq!(rate.service_name, "Road");
    assert_eq!(rate.total_price, Decimal::new(1265, 2));
    assert_eq!(rate.total_price_cents(), 1265);
    assert_eq!(rate.carrier, "Fastway");
    assert_eq!(rate.service_code.as_deref(), Some("Parcel"));
    assert_eq!(response.request_urls(), [format!("http://fastway.test{BOOK_PATH}")]);
    assert_eq!(response.raw_responses().len(), 1);
    assert_eq!(response.responses().len(), 1);
}

#[tokio::test]
async fn combined_shipment_keeps_only_services_priced_for_every_package() {
    let transport = StubTransport::default()
        .respond(BOOK_PATH, services(&[("Road", "10.00", "9.00"), ("Courier", "20.00", "18.00")]))
        .respond(WII_PATH, services(&[("Road", "15.50", "14.00")]));
    let fastway = carrier(&transport);

    let response = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book(), wii()], &RateOptions::default())
        .await
        .expect("rates");

    let names: Vec<&str> = response.rates().iter().map(|r| r.service_name.as_str()).collect();
    assert_eq!(names, ["Road"], "Courier was priced for only one package");
    assert_eq!(response.rates()[0].total_price, Decimal::new(2550, 2));
    assert_eq!(
        response.rates()[0].package_prices,
        [Decimal::new(1000, 2), Decimal::new(1550, 2)]
    );
}

#[tokio::test]
async fn frequent_tier_reads_the_frequent_price() {
    let transport = StubTransport::default()
        .respond(BOOK_PATH, services(&[("Road", "10.00", "9.00")]))
        .respond(WII_PATH, services(&[("Road", "15.50", "14.00")]));
    let fastway = carrier(&transport);
    let options = RateOptions {
        customer_type: Some(CustomerType::Frequent),
        ..RateOptions::default()
    };

    let response = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book(), wii()], &options)
        .await
        .expect("rates");

    assert_eq!(response.rates()[0].total_price, Decimal::new(2300, 2));
}

#[tokio::test]
async fn carrier_error_for_one_package_rejects_the_shipment() {
    let message = "WeightInKg must be less than 25kg!. The actual value is 2200.";
    let transport = StubTransport::default()
        .respond(BOOK_PATH, services(&[("Road", "10.00", "9.00")]))
        .respond("/v2/psc/lookup/MEL/Sydney/2000/2200", json!({ "error": message }));
    let fastway = carrier(&transport);
    let container = Package::metric(2_200_000, [600, 240, 260]);

    let err = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book(), container], &RateOptions::default())
        .await
        .expect_err("an error payload must fail the call");

    assert!(matches!(err.error, FastwayError::CarrierRejected(_)));
    assert_eq!(err.to_string(), message);

    let envelope = err.response::<shiprate_core::RateEstimate>();
    assert!(!envelope.is_success());
    assert_eq!(envelope.message(), message);
    assert!(envelope.rates().is_empty());
    assert_eq!(envelope.request_urls().len(), 2);
    assert_eq!(envelope.raw_responses().len(), 2);
}

#[tokio::test]
async fn carrier_error_beats_a_later_malformed_payload() {
    let message = "WeightInKg must be less than 25kg!. The actual value is 2200.";
    let transport = StubTransport::default()
        .respond("/v2/psc/lookup/MEL/Sydney/2000/2200", json!({ "error": message }))
        .respond(BOOK_PATH, json!({ "result": {} }));
    let fastway = carrier(&transport);
    let container = Package::metric(2_200_000, [600, 240, 260]);

    let err = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[container, book()], &RateOptions::default())
        .await
        .expect_err("the shipment must be rejected");

    assert!(matches!(err.error, FastwayError::CarrierRejected(_)), "got {:?}", err.error);
    assert_eq!(err.to_string(), message);
    assert_eq!(err.diagnostics.responses.len(), 2);
}

#[tokio::test]
async fn malformed_payload_beats_a_later_carrier_error() {
    let transport = StubTransport::default()
        .respond(BOOK_PATH, json!({ "result": {} }))
        .respond(WII_PATH, json!({ "error": "Invalid destination" }));
    let fastway = carrier(&transport);

    let err = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book(), wii()], &RateOptions::default())
        .await
        .expect_err("the shipment must be rejected");

    assert!(
        matches!(err.error, FastwayError::MalformedResponse { .. }),
        "got {:?}",
        err.error
    );
}

#[tokio::test]
async fn carrier_error_beats_a_later_transport_failure() {
    let transport = StubTransport::default()
        .respond(BOOK_PATH, json!({ "error": "Invalid destination" }))
        .fail(WII_PATH, TransportError::new("connection reset"));
    let fastway = carrier(&transport);

    let err = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book(), wii()], &RateOptions::default())
        .await
        .expect_err("the shipment must be rejected");

    assert_eq!(err.to_string(), "Invalid destination");
}

#[tokio::test]
async fn requests_in_flight_stay_within_the_limit() {
    let grams = [1_000, 2_000, 3_000, 4_000, 5_000];
    let mut transport = StubTransport::default();
    for g in grams {
        let path = format!("/v2/psc/lookup/MEL/Sydney/2000/{}", g / 1_000);
        transport = transport.respond(&path, services(&[("Road", "10.00", "9.00")]));
    }
    let fastway = carrier_with_limit(&transport, 2);
    let packages: Vec<Package> = grams.iter().map(|&g| Package::metric(g, [10, 10, 10])).collect();

    let response = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &packages, &RateOptions::default())
        .await
        .expect("rates");

    assert_eq!(transport.calls().len(), 5);
    assert!(
        transport.peak_in_flight() <= 2,
        "peak in flight was {}",
        transport.peak_in_flight()
    );
    assert_eq!(response.rates()[0].total_price, Decimal::new(5000, 2));
    for (url, g) in response.request_urls().iter().zip(grams) {
        assert!(url.ends_with(&format!("/{}", g / 1_000)), "{url} out of order");
    }
}

#[tokio::test]
async fn identical_packages_are_fetched_once_but_counted_twice() {
    let transport = StubTransport::default().respond(BOOK_PATH, services(&[("Road", "10.00", "9.00")]));
    let fastway = carrier(&transport);

    let response = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book(), book()], &RateOptions::default())
        .await
        .expect("rates");

    assert_eq!(transport.calls().len(), 1, "duplicate URL must be fetched once");
    assert_eq!(response.request_urls().len(), 2);
    assert_eq!(response.raw_responses().len(), 2);
    assert_eq!(response.rates().len(), 1);
    assert_eq!(response.rates()[0].total_price, Decimal::new(2000, 2));
}

#[tokio::test]
async fn api_key_is_sent_but_not_recorded() {
    let transport = StubTransport::default().respond(BOOK_PATH, services(&[("Road", "10.00", "9.00")]));
    let fastway = carrier(&transport);
    let options = RateOptions {
        api_key: Some("per-call-key".to_owned()),
        ..RateOptions::default()
    };

    let response = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book()], &options)
        .await
        .expect("rates");

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].ends_with("?api_key=per-call-key"), "got {}", calls[0]);
    assert!(!response.request_urls()[0].contains("api_key"));
}

#[tokio::test]
async fn dimension_sizing_adds_query_parameters() {
    let transport = StubTransport::default().respond(WII_PATH, services(&[("Road", "15.50", "14.00")]));
    let fastway = carrier(&transport);
    let options = RateOptions {
        sizing: Some(SizingMode::WeightAndDimensions),
        ..RateOptions::default()
    };

    let response = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[wii()], &options)
        .await
        .expect("rates");

    assert!(response.request_urls()[0].ends_with("?LengthInCm=40&WidthInCm=30&HeightInCm=20"));
    assert_eq!(response.rates().len(), 1);
}

#[tokio::test]
async fn origin_outside_region_issues_no_request() {
    let transport = StubTransport::default();
    let fastway = carrier(&transport);

    let response = fastway
        .find_rates(
            &Origin::new("AKL").in_country("NZ"),
            &sydney(),
            &[book()],
            &RateOptions::default(),
        )
        .await
        .expect("out of region is not an error");

    assert!(response.is_success());
    assert!(response.rates().is_empty());
    assert!(response.request_urls().is_empty());
    assert_eq!(transport.calls().len(), 0);
}

#[tokio::test]
async fn malformed_payload_is_fatal_and_keeps_the_raw_body() {
    let transport = StubTransport::default()
        .respond(BOOK_PATH, services(&[("Road", "10.00", "9.00")]))
        .respond_raw(WII_PATH, "<html>Service Unavailable</html>");
    let fastway = carrier(&transport);

    let err = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book(), wii()], &RateOptions::default())
        .await
        .expect_err("malformed payload must fail the call");

    match &err.error {
        FastwayError::MalformedResponse { raw, .. } => {
            assert_eq!(raw, "<html>Service Unavailable</html>");
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
    assert_eq!(err.diagnostics.raw_responses[1], "<html>Service Unavailable</html>");
    assert_eq!(err.diagnostics.responses.len(), 1, "the decodable payload is kept");
}

#[tokio::test]
async fn transport_failure_keeps_its_body_for_diagnostics() {
    let failure = TransportError::from_status(503, Some("upstream down".to_owned()));
    let transport = StubTransport::default()
        .respond(BOOK_PATH, services(&[("Road", "10.00", "9.00")]))
        .fail(WII_PATH, failure);
    let fastway = carrier(&transport);

    let err = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book(), wii()], &RateOptions::default())
        .await
        .expect_err("transport failure must fail the call");

    assert!(matches!(err.error, FastwayError::Transport { .. }), "got {:?}", err.error);
    assert_eq!(err.diagnostics.request_urls.len(), 2);
    assert_eq!(err.diagnostics.raw_responses.len(), 2);
    assert!(err.diagnostics.raw_responses[0].contains("Road"));
    assert_eq!(err.diagnostics.raw_responses[1], "upstream down");
}

#[tokio::test]
async fn empty_package_list_quotes_nothing() {
    let transport = StubTransport::default();
    let fastway = carrier(&transport);

    let response = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[], &RateOptions::default())
        .await
        .expect("rates");

    assert!(response.is_success());
    assert!(response.rates().is_empty());
    assert_eq!(transport.calls().len(), 0);
}

// ---------------------------------------------------------------------------
// franchises
// ---------------------------------------------------------------------------

#[tokio::test]
async fn franchise_lookup_returns_codes() {
    let transport = StubTransport::default().respond(
        "/v2/psc/pickuprf/3000/1",
        json!({ "result": { "franchise_code": "MEL", "franchise_name": "Melbourne" } }),
    );
    let fastway = carrier(&transport);

    let response = fastway
        .find_franchise(&melbourne(), &RateOptions::default())
        .await
        .expect("franchise");

    assert!(response.is_success());
    assert_eq!(response.franchises(), ["MEL".to_owned()]);
    assert_eq!(response.request_urls().len(), 1);
    assert_eq!(response.raw_responses().len(), 1);
    assert_eq!(response.responses().len(), 1);
}

#[tokio::test]
async fn franchise_error_payload_is_rejected_verbatim() {
    let transport = StubTransport::default().respond(
        "/v2/psc/pickuprf/3000/1",
        json!({ "error": { "errorMessage": "Invalid API key" } }),
    );
    let fastway = carrier(&transport);

    let err = fastway
        .find_franchise(&melbourne(), &RateOptions::default())
        .await
        .expect_err("error payload");

    assert_eq!(err.to_string(), "Invalid API key");
    assert_eq!(err.response::<String>().raw_responses().len(), 1);
}

#[tokio::test]
async fn franchise_outside_region_issues_no_request() {
    let transport = StubTransport::default();
    let fastway = carrier(&transport);
    let auckland = Location::new().with_country("NZ").with_postal_code("1010");

    let response = fastway
        .find_franchise(&auckland, &RateOptions::default())
        .await
        .expect("out of region is not an error");

    assert!(response.is_success());
    assert!(response.franchises().is_empty());
    assert_eq!(transport.calls().len(), 0);
}

// ---------------------------------------------------------------------------
// carrier contract
// ---------------------------------------------------------------------------

async fn quote_with<C: RateCarrier>(
    carrier: &C,
    origin: &C::Origin,
    packages: &[Package],
) -> Result<usize, C::Error> {
    let response = carrier
        .find_rates(origin, &sydney(), packages, &C::Options::default())
        .await?;
    Ok(response.rates().len())
}

#[tokio::test]
async fn fastway_satisfies_the_carrier_contract() {
    let transport = StubTransport::default().respond(BOOK_PATH, services(&[("Road", "10.00", "9.00")]));
    let fastway = carrier(&transport);

    assert_eq!(fastway.name(), "Fastway");
    assert!(RateCarrier::valid_credentials(&fastway));
    let count = quote_with(&fastway, &Origin::from("MEL"), &[book()]).await.expect("rates");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_mode_is_echoed_in_the_envelope() {
    let transport = StubTransport::default().respond(BOOK_PATH, services(&[("Road", "10.00", "9.00")]));
    let fastway = carrier(&transport);
    let options = RateOptions {
        test_mode: Some(true),
        ..RateOptions::default()
    };

    let response = fastway
        .find_rates(&Origin::from("MEL"), &sydney(), &[book()], &options)
        .await
        .expect("rates");

    assert!(response.test_mode());
}
