//! Catalog product identifiers.
//!
//! The catalog keys products by its primary key, which is an integer in most
//! tables but may be a string (slugs, UUIDs). [`ProductId`] keeps whichever
//! JSON form the record arrived in, so a stored cart round-trips unchanged.
//! The two forms never compare equal: `7` and `"7"` are different products.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// A string identifier was empty or only whitespace.
    #[error("product id cannot be empty")]
    Empty,
}

/// A product identifier taken from the catalog.
///
/// ```
/// use shopfront_core::ProductId;
///
/// let numeric: ProductId = serde_json::from_str("7").unwrap();
/// let text: ProductId = serde_json::from_str("\"A\"").unwrap();
///
/// assert_eq!(numeric, ProductId::from(7));
/// assert_eq!(text.to_string(), "A");
/// assert!(serde_json::from_str::<ProductId>("\"\"").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Integer primary key.
    Number(i64),
    /// String primary key.
    Text(String),
}

/// Wire form accepted before validation.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawProductId {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawProductId::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

impl TryFrom<RawProductId> for ProductId {
    type Error = ProductIdError;

    fn try_from(raw: RawProductId) -> Result<Self, Self::Error> {
        match raw {
            RawProductId::Number(n) => Ok(Self::Number(n)),
            RawProductId::Text(s) => Self::text(s),
        }
    }
}

impl ProductId {
    /// Create a string identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ProductIdError::Empty`] if `id` is empty or only whitespace.
    pub fn text(id: impl Into<String>) -> Result<Self, ProductIdError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ProductIdError::Empty);
        }
        Ok(Self::Text(id))
    }

    /// Returns the integer key, if this is a numeric identifier.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self::Number(i64::from(id))
    }
}

/// Parses command-line style input: anything that reads as an integer becomes
/// [`ProductId::Number`], everything else [`ProductId::Text`].
impl FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::text(trimmed), |n| Ok(Self::Number(n)))
    }
}
