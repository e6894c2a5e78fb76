//! Cart engine errors.
//!
//! Most failures inside the engine are recovered locally (a corrupt saved
//! cart, a failed write) and only show up in the logs. The errors here are
//! the ones a caller can act on.

use thiserror::Error;

/// Errors returned by cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The catalog record has no identifier, so it cannot become a line item.
    #[error("product has no id")]
    MissingProductId,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        assert_eq!(CartError::MissingProductId.to_string(), "product has no id");
    }
}
