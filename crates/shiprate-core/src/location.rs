use serde::Serialize;

/// A postal location. Every field is optional because carriers differ in
/// which parts of an address they need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    country: Option<String>,
    state: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    address1: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_country(mut self, country: &str) -> Self {
        self.country = non_blank(country);
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: &str) -> Self {
        self.state = non_blank(state);
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: &str) -> Self {
        self.city = non_blank(city);
        self
    }

    #[must_use]
    pub fn with_postal_code(mut self, postal_code: &str) -> Self {
        self.postal_code = non_blank(postal_code);
        self
    }

    #[must_use]
    pub fn with_address1(mut self, address1: &str) -> Self {
        self.address1 = non_blank(address1);
        self
    }

    /// Upper-cased country code, `None` when the location does not name one.
    #[must_use]
    pub fn country_code(&self) -> Option<String> {
        self.country.as_deref().map(str::to_uppercase)
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    #[must_use]
    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    #[must_use]
    pub fn address1(&self) -> Option<&str> {
        self.address1.as_deref()
    }
}

// Empty strings from CLI flags or config mean "not given".
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
