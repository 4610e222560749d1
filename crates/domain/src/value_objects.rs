//! Value objects for the order tracking domain.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Brazilian postal code (CEP).
///
/// Stored canonically as eight digits; accepts input with or without the
/// customary hyphen ("01310-100" or "01310100").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cep(String);

impl Cep {
    /// Creates a CEP from a string, validating it has exactly eight digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let digits: String = raw.chars().filter(|c| *c != '-').collect();

        if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidCep { value: raw });
        }

        Ok(Self(digits))
    }

    /// Returns the eight-digit canonical form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", &self.0[..5], &self.0[5..])
    }
}

impl TryFrom<String> for Cep {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cep::new(value)
    }
}

impl From<Cep> for String {
    fn from(cep: Cep) -> String {
        cep.0
    }
}

/// Email address, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Creates an email address, validating its basic structure.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if !Self::is_well_formed(&normalized) {
            return Err(ValidationError::InvalidEmail { value: raw });
        }

        Ok(Self(normalized))
    }

    fn is_well_formed(value: &str) -> bool {
        if value.contains(char::is_whitespace) {
            return false;
        }
        let Some((local, domain)) = value.split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.contains('@') {
            return false;
        }
        match domain.rsplit_once('.') {
            Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
            None => false,
        }
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> String {
        email.0
    }
}

/// Sequence-derived order number, immutable after creation.
///
/// Format: `ORD-YYYYMMDD-NNNN` where NNNN is the 1-based sequence of the
/// order within its creation day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Derives the order number for the given day and daily sequence.
    pub fn generate(date: chrono::NaiveDate, sequence: u64) -> Self {
        Self(format!("ORD-{}-{:04}", date.format("%Y%m%d"), sequence))
    }

    /// Parses and validates an order number in canonical format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let mut parts = raw.split('-');

        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next(), parts.next()),
            (Some("ORD"), Some(date), Some(seq), None)
                if date.len() == 8
                    && date.chars().all(|c| c.is_ascii_digit())
                    && seq.len() >= 4
                    && seq.chars().all(|c| c.is_ascii_digit())
        );

        if !well_formed {
            return Err(ValidationError::InvalidOrderNumber { value: raw });
        }

        Ok(Self(raw))
    }

    /// Returns the order number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OrderNumber::new(value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> String {
        number.0
    }
}

/// An already-computed password hash.
///
/// The core never hashes passwords; this type carries the opaque digest the
/// identity collaborator produced. Debug output is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps a non-empty hash string.
    pub fn new(hash: impl Into<String>) -> Result<Self, ValidationError> {
        let hash = hash.into();
        if hash.trim().is_empty() {
            return Err(ValidationError::EmptyPasswordHash);
        }
        Ok(Self(hash))
    }

    /// Returns the hash as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PasswordHash(<redacted>)")
    }
}

impl TryFrom<String> for PasswordHash {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PasswordHash::new(value)
    }
}

impl From<PasswordHash> for String {
    fn from(hash: PasswordHash) -> String {
        hash.0
    }
}

/// Delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    number: String,
    complement: Option<String>,
    neighborhood: String,
    city: String,
    state: String,
    cep: Cep,
}

impl Address {
    /// Creates a validated address.
    ///
    /// Street, number, neighborhood and city must be non-empty; the state is
    /// a two-letter code, stored uppercase.
    pub fn new(
        street: impl Into<String>,
        number: impl Into<String>,
        complement: Option<String>,
        neighborhood: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        cep: Cep,
    ) -> Result<Self, ValidationError> {
        let street = Self::required(street.into(), "street")?;
        let number = Self::required(number.into(), "number")?;
        let neighborhood = Self::required(neighborhood.into(), "neighborhood")?;
        let city = Self::required(city.into(), "city")?;

        let state = state.into().trim().to_ascii_uppercase();
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidStateCode { value: state });
        }

        Ok(Self {
            street,
            number,
            complement: complement.filter(|c| !c.trim().is_empty()),
            neighborhood,
            city,
            state,
            cep,
        })
    }

    fn required(value: String, field: &'static str) -> Result<String, ValidationError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(ValidationError::MissingAddressField { field });
        }
        Ok(value)
    }

    /// Returns the street name.
    pub fn street(&self) -> &str {
        &self.street
    }

    /// Returns the street number.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns the optional complement (apartment, suite, etc.).
    pub fn complement(&self) -> Option<&str> {
        self.complement.as_deref()
    }

    /// Returns the neighborhood.
    pub fn neighborhood(&self) -> &str {
        &self.neighborhood
    }

    /// Returns the city.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Returns the two-letter state code.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the postal code.
    pub fn cep(&self) -> &Cep {
        &self.cep
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {} - {}, {} - {}, {}",
            self.street, self.number, self.neighborhood, self.city, self.state, self.cep
        )
    }
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Parses a decimal string ("100", "99.9", "123.45") into a Money amount.
    ///
    /// At most two decimal places are accepted; anything finer-grained than a
    /// cent is rejected rather than rounded.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAmount {
            value: value.to_string(),
        };

        let trimmed = value.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, frac) = match unsigned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (unsigned, ""),
        };

        if whole.is_empty()
            || frac.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let frac_cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(invalid)?;

        Ok(Self {
            cents: if negative { -cents } else { cents },
        })
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-unit portion.
    pub fn units(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after whole units).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.units(), self.cents_part())
        }
    }
}
