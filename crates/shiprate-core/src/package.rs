//! Physical package descriptors.
//!
//! Weights are held in kilograms and lengths in centimetres as
//! [`Decimal`] so that values render exactly when they are written into a
//! carrier URL (`0.25`, not `0.25000000001`).

use rust_decimal::Decimal;
use serde::Serialize;

/// Kilograms in one avoirdupois ounce (0.028349523125 kg).
fn kg_per_ounce() -> Decimal {
    Decimal::new(28_349_523_125, 12)
}

/// Centimetres in one inch.
fn cm_per_inch() -> Decimal {
    Decimal::new(254, 2)
}

/// Settlement currency assumed when a package carries no currency of its own.
pub const DEFAULT_CURRENCY: &str = "AUD";

/// Length, width and height of a package in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Dimensions {
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
}

impl Dimensions {
    #[must_use]
    pub fn new(length: Decimal, width: Decimal, height: Decimal) -> Self {
        Self {
            length: length.normalize(),
            width: width.normalize(),
            height: height.normalize(),
        }
    }

    fn from_whole_cm([length, width, height]: [u32; 3]) -> Self {
        Self::new(length.into(), width.into(), height.into())
    }

    fn from_inches([length, width, height]: [u32; 3]) -> Self {
        let cm = |inches: u32| Decimal::from(inches) * cm_per_inch();
        Self::new(cm(length), cm(width), cm(height))
    }
}

/// An immutable package description supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    weight_kg: Decimal,
    dimensions: Dimensions,
    value_cents: Option<u64>,
    currency: Option<String>,
}

impl Package {
    /// Builds a package from a weight in kilograms and dimensions in centimetres.
    #[must_use]
    pub fn new(weight_kg: Decimal, dimensions: Dimensions) -> Self {
        Self {
            weight_kg: weight_kg.normalize(),
            dimensions,
            value_cents: None,
            currency: None,
        }
    }

    /// Builds a package from grams and whole-centimetre dimensions.
    #[must_use]
    pub fn metric(grams: u32, dimensions_cm: [u32; 3]) -> Self {
        let weight_kg = Decimal::from(grams) / Decimal::ONE_THOUSAND;
        Self::new(weight_kg, Dimensions::from_whole_cm(dimensions_cm))
    }

    /// Builds a package from ounces and whole-inch dimensions.
    ///
    /// The converted weight is rounded to the gram.
    #[must_use]
    pub fn imperial(ounces: u32, dimensions_in: [u32; 3]) -> Self {
        let weight_kg = (Decimal::from(ounces) * kg_per_ounce()).round_dp(3);
        Self::new(weight_kg, Dimensions::from_inches(dimensions_in))
    }

    /// Attaches a declared value in minor currency units.
    #[must_use]
    pub fn with_value(mut self, value_cents: u64, currency: &str) -> Self {
        self.value_cents = Some(value_cents);
        self.currency = Some(currency.to_uppercase());
        self
    }

    #[must_use]
    pub fn kilograms(&self) -> Decimal {
        self.weight_kg
    }

    #[must_use]
    pub fn grams(&self) -> Decimal {
        (self.weight_kg * Decimal::ONE_THOUSAND).normalize()
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[must_use]
    pub fn length_cm(&self) -> Decimal {
        self.dimensions.length
    }

    #[must_use]
    pub fn width_cm(&self) -> Decimal {
        self.dimensions.width
    }

    #[must_use]
    pub fn height_cm(&self) -> Decimal {
        self.dimensions.height
    }

    #[must_use]
    pub fn value_cents(&self) -> Option<u64> {
        self.value_cents
    }

    /// Currency of the declared value, [`DEFAULT_CURRENCY`] when unset.
    #[must_use]
    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}
