//! Order summary shown on the cart and checkout pages.

use serde::Serialize;
use shopfront_core::Price;

use crate::config::PricingConfig;

/// Subtotal plus shipping and tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Price,
    pub shipping: Price,
    /// `subtotal × tax_rate`, rounded to cents.
    pub tax: Price,
    pub total: Price,
}

impl OrderSummary {
    #[must_use]
    pub fn from_subtotal(subtotal: Price, pricing: &PricingConfig) -> Self {
        let shipping = pricing.shipping_flat;
        let tax = subtotal.scale(pricing.tax_rate).round_to_cents();
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_default_pricing() {
        let summary = OrderSummary::from_subtotal(Price::from_cents(1998), &PricingConfig::default());
        assert_eq!(summary.shipping, Price::from_cents(999));
        // 19.98 × 0.08 = 1.5984
        assert_eq!(summary.tax, Price::from_cents(160));
        assert_eq!(summary.total, Price::from_cents(1998 + 999 + 160));
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        let pricing = PricingConfig {
            shipping_flat: Price::ZERO,
            tax_rate: Decimal::new(5, 2),
        };
        // 0.50 × 0.05 = 0.025
        let summary = OrderSummary::from_subtotal(Price::from_cents(50), &pricing);
        assert_eq!(summary.tax, Price::from_cents(3));
        assert_eq!(summary.total, Price::from_cents(53));
    }

    #[test]
    fn test_zero_rate_and_shipping() {
        let pricing = PricingConfig {
            shipping_flat: Price::ZERO,
            tax_rate: Decimal::ZERO,
        };
        let summary = OrderSummary::from_subtotal(Price::from_cents(1234), &pricing);
        assert_eq!(summary.total, Price::from_cents(1234));
    }
}
