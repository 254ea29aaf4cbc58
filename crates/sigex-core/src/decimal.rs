//! Precision-safe decimal types for order fields.
//!
//! Uses `rust_decimal` for exact decimal arithmetic so that price and
//! quantity comparisons never suffer floating-point drift. Values only
//! become text again at the exchange boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to keep prices and sizes from being mixed up in
/// comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a textual price field.
    ///
    /// Surrounding whitespace is ignored. Negative values are rejected;
    /// zero is accepted here and interpreted by the caller.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let value: Decimal = raw
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidPrice(raw.to_string()))?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CoreError::InvalidPrice(raw.to_string()));
        }
        Ok(Self(value))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

/// Size/quantity with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Absolute value of a signed position size.
    #[inline]
    pub fn from_signed(signed: Decimal) -> Self {
        Self(signed.abs())
    }

    /// Parse an order quantity. Only strictly positive values are valid.
    pub fn parse_positive(raw: &str) -> Result<Self, CoreError> {
        let value: Decimal = raw
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidSize(raw.to_string()))?;
        let size = Self(value);
        if !size.is_positive() {
            return Err(CoreError::InvalidSize(raw.to_string()));
        }
        Ok(size)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Size {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_positive(s)
    }
}

impl From<Decimal> for Size {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}
