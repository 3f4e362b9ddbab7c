use super::*;

#[test]
fn weight_only_package_has_no_dimensions() {
    let package = parse_package("2.5").expect("valid package");
    assert_eq!(package.kilograms(), Decimal::new(25, 1));
    assert_eq!(package.dimensions(), Dimensions::default());
}

#[test]
fn package_with_dimensions() {
    let package = parse_package("1.2:30x20x10.5").expect("valid package");
    assert_eq!(package.kilograms(), Decimal::new(12, 1));
    assert_eq!(package.length_cm(), Decimal::from(30));
    assert_eq!(package.width_cm(), Decimal::from(20));
    assert_eq!(package.height_cm(), Decimal::new(105, 1));
}

#[test]
fn weight_is_normalized_for_urls() {
    let package = parse_package("0.250").expect("valid package");
    assert_eq!(package.kilograms().to_string(), "0.25");
}

#[test]
fn rejects_non_numeric_weight() {
    let err = parse_package("heavy").unwrap_err();
    assert!(err.contains("weight"), "got {err}");
}

#[test]
fn rejects_zero_weight() {
    assert!(parse_package("0").is_err());
    assert!(parse_package("-1").is_err());
}

#[test]
fn rejects_incomplete_dimensions() {
    let err = parse_package("1:30x20").unwrap_err();
    assert!(err.contains("LxWxH"), "got {err}");
    assert!(parse_package("1:30x0x10").is_err());
}

#[test]
fn franchise_options_carry_test_mode() {
    let args = FranchiseArgs {
        postcode: "3000".to_owned(),
        country: "AU".to_owned(),
        test_mode: true,
    };

    assert_eq!(args.options().test_mode, Some(true));
    assert_eq!(args.location().postal_code(), Some("3000"));
    assert_eq!(args.location().country_code().as_deref(), Some("AU"));
}

#[test]
fn rate_options_follow_flags() {
    let args = RatesArgs {
        origin: "mel".to_owned(),
        origin_country: Some("AU".to_owned()),
        to_city: "Sydney".to_owned(),
        to_postcode: "2000".to_owned(),
        to_country: "AU".to_owned(),
        packages: vec![parse_package("1").expect("valid package")],
        frequent: true,
        dimensions: false,
        test_mode: false,
    };

    let options = args.options();
    assert_eq!(options.customer_type, Some(CustomerType::Frequent));
    assert_eq!(options.sizing, None);
    assert_eq!(options.test_mode, None);
    assert_eq!(args.origin().franchise_code(), "MEL");
    assert!(args.origin().is_serviceable());
    assert_eq!(args.destination().postal_code(), Some("2000"));
}
