//! Validated primitive values
//!
//! These types can only be built through fallible constructors, so a domain
//! entity holding one never carries a blank name or a non-positive amount.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::money::Money;

/// Reasons a primitive value can be rejected at construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("amount must be strictly positive, got {0} cents")]
    NonPositiveAmount(i64),

    #[error("text must not be blank")]
    BlankString,

    #[error("asset code must not be blank")]
    BlankAssetCode,

    #[error("asset code '{0}' contains whitespace")]
    MalformedAssetCode(String),

    #[error("transfer source and destination account are the same")]
    SameTransferAccount,
}

/// An amount greater than zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PositiveAmount(Money);

impl PositiveAmount {
    pub fn new(amount: Money) -> Result<Self, ValidationError> {
        if amount.is_positive() {
            Ok(Self(amount))
        } else {
            Err(ValidationError::NonPositiveAmount(amount.cents()))
        }
    }

    pub fn from_cents(cents: i64) -> Result<Self, ValidationError> {
        Self::new(Money::from_cents(cents))
    }

    pub fn money(&self) -> Money {
        self.0
    }
}

impl<'de> Deserialize<'de> for PositiveAmount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let money = Money::deserialize(deserializer)?;
        Self::new(money).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for PositiveAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A string that is trimmed and non-empty
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NotBlankTrimmedString(String);

impl NotBlankTrimmedString {
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(ValidationError::BlankString)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Blank or missing input becomes `None` instead of an error
    pub fn optional(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| Self::new(v).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for NotBlankTrimmedString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for NotBlankTrimmedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NotBlankTrimmedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Currency or asset code such as "USD", "EUR" or "BTC", stored uppercased
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AssetCode(String);

impl AssetCode {
    pub fn new(code: &str) -> Result<Self, ValidationError> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::BlankAssetCode);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::MalformedAssetCode(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for AssetCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A positive amount of a specific asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value {
    pub amount: PositiveAmount,
    pub asset: AssetCode,
}

impl Value {
    pub fn new(amount: PositiveAmount, asset: AssetCode) -> Self {
        Self { amount, asset }
    }

    pub fn money(&self) -> Money {
        self.amount.money()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.asset)
    }
}
