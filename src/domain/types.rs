//! Strongly-typed value objects used by the product entity.
//!
//! Identifiers and prices are validated at the boundary so the table never
//! holds an empty id or a negative price.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// A numeric value required to be non-negative was negative or not finite.
    #[error("{0} must be a finite number, zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// A textual number could not be parsed.
    #[error("{field} is not a number: {value}")]
    NotANumber { field: &'static str, value: String },
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Identifier of a product, unique within a table.
///
/// Identifiers are trimmed and compared case-insensitively when looking up
/// rows, matching how collectors and API clients spell them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Constructs a trimmed, non-empty identifier.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        trim_and_require_non_empty(value, "product_id").map(Self)
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Case-insensitive comparison against a raw identifier.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.trim().to_lowercase()
    }

    /// Identifier derived from an ordinal number.
    pub fn from_ordinal(ordinal: u64) -> Self {
        Self(ordinal.to_string())
    }

    /// Numeric value of the identifier when it is an ordinal.
    pub fn ordinal(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for ProductId {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ProductId {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductId> for String {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl PartialEq<&str> for ProductId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Price of a product, a finite value that is zero or greater.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct ProductPrice(f64);

impl ProductPrice {
    /// Constructs a finite price that is zero or greater.
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("price"))
        }
    }

    /// Parses a price as written by the collectors.
    ///
    /// Empty strings and the `N/A`/`nan` placeholders mean "no price" and
    /// yield `Ok(None)`. A decimal comma is accepted.
    pub fn parse(value: &str, field: &'static str) -> Result<Option<Self>, TypeConstraintError> {
        let trimmed = value.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("none")
        {
            return Ok(None);
        }
        // "1,299.00" uses the comma as a thousands separator, "89,95" as the decimal point.
        let normalized = if trimmed.contains('.') {
            trimmed.replace(',', "")
        } else {
            trimmed.replace(',', ".")
        };
        let number: f64 = normalized
            .parse()
            .map_err(|_| TypeConstraintError::NotANumber {
                field,
                value: trimmed.to_string(),
            })?;
        if number.is_nan() {
            return Ok(None);
        }
        Self::new(number)
            .map(Some)
            .map_err(|_| TypeConstraintError::NegativeNumber(field))
    }

    /// Returns the raw `f64` value.
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Total ordering over prices.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Display for ProductPrice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for ProductPrice {
    type Error = TypeConstraintError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductPrice> for f64 {
    fn from(value: ProductPrice) -> Self {
        value.0
    }
}

impl PartialEq<f64> for ProductPrice {
    fn eq(&self, other: &f64) -> bool {
        self.0 == *other
    }
}
