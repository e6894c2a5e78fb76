//! Simulated checkout.
//!
//! There is no payment processor behind the storefront. Placing an order
//! validates the customer's form, snapshots the cart into an
//! [`OrderConfirmation`] and empties the cart. Card data only lives in the
//! form as secrets; the confirmation keeps the last four digits.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use shopfront_core::Email;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::PricingConfig;
use crate::engine::CartEngine;
use crate::item::LineItem;
use crate::store::KeyValueStore;
use crate::summary::OrderSummary;

const DEFAULT_COUNTRY: &str = "United States";

/// Errors that stop an order from being placed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// Nothing to buy.
    #[error("cart is empty")]
    EmptyCart,

    /// A form field failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

/// Shipping address step of the checkout form.
#[derive(Debug, Clone, Default)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// Defaults to the United States when left blank.
    pub country: String,
}

/// Payment step of the checkout form.
///
/// Implements `Debug` manually to redact card data.
#[derive(Clone)]
pub struct PaymentDetails {
    pub card_number: SecretString,
    /// `MM/YY`
    pub expiry_date: String,
    pub cvv: SecretString,
    pub card_name: String,
}

impl std::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_number", &"[REDACTED]")
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"[REDACTED]")
            .field("card_name", &self.card_name)
            .finish()
    }
}

/// Everything the customer fills in before placing an order.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    pub shipping: ShippingAddress,
    pub payment: PaymentDetails,
}

/// Receipt for a placed order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order_number: Uuid,
    pub placed_at: DateTime<Utc>,
    pub email: Email,
    pub ship_to: String,
    pub country: String,
    pub items: Vec<LineItem>,
    pub summary: OrderSummary,
    pub card_last4: String,
}

/// Validate the form, place the order and clear the cart.
///
/// The cart is only cleared once the order is accepted; any error leaves it
/// untouched.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] for an empty cart and
/// [`CheckoutError::InvalidField`] for the first field that fails validation.
#[instrument(skip_all, fields(items = engine.len()))]
pub fn place_order<S: KeyValueStore + 'static>(
    engine: &mut CartEngine<S>,
    form: &CheckoutForm,
    pricing: &PricingConfig,
) -> Result<OrderConfirmation, CheckoutError> {
    let summary = engine
        .order_summary(pricing)
        .ok_or(CheckoutError::EmptyCart)?;

    let shipping = &form.shipping;
    for (field, value) in [
        ("first name", &shipping.first_name),
        ("last name", &shipping.last_name),
        ("address", &shipping.address),
        ("city", &shipping.city),
        ("state", &shipping.state),
        ("zip code", &shipping.zip_code),
        ("name on card", &form.payment.card_name),
    ] {
        require(field, value)?;
    }
    let email = Email::parse(&shipping.email).map_err(|e| invalid("email", e.to_string()))?;
    let card_last4 = validate_payment(&form.payment)?;

    let country = match shipping.country.trim() {
        "" => DEFAULT_COUNTRY.to_string(),
        country => country.to_string(),
    };

    let confirmation = OrderConfirmation {
        order_number: Uuid::new_v4(),
        placed_at: Utc::now(),
        email,
        ship_to: format!(
            "{} {}, {}, {}, {} {}",
            shipping.first_name.trim(),
            shipping.last_name.trim(),
            shipping.address.trim(),
            shipping.city.trim(),
            shipping.state.trim(),
            shipping.zip_code.trim()
        ),
        country,
        items: engine.items().to_vec(),
        summary,
        card_last4,
    };

    engine.clear();
    info!(
        order_number = %confirmation.order_number,
        total = %confirmation.summary.total,
        "Order placed"
    );
    Ok(confirmation)
}

fn invalid(field: &'static str, reason: impl Into<String>) -> CheckoutError {
    CheckoutError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn require(field: &'static str, value: &str) -> Result<(), CheckoutError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "is required"));
    }
    Ok(())
}

/// Check card fields and return the last four digits of the card number.
fn validate_payment(payment: &PaymentDetails) -> Result<String, CheckoutError> {
    let digits: String = payment
        .card_number
        .expose_secret()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    if !(12..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("card number", "must be 12 to 19 digits"));
    }

    validate_expiry(&payment.expiry_date)?;

    let cvv = payment.cvv.expose_secret().trim();
    if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("cvv", "must be 3 or 4 digits"));
    }

    Ok(digits
        .get(digits.len() - 4..)
        .unwrap_or_default()
        .to_string())
}

fn validate_expiry(expiry: &str) -> Result<(), CheckoutError> {
    let parsed = expiry.trim().split_once('/').and_then(|(month, year)| {
        let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if month.len() != 2 || year.len() != 2 || !all_digits(month) || !all_digits(year) {
            return None;
        }
        month.parse::<u8>().ok()
    });

    match parsed {
        Some(1..=12) => Ok(()),
        _ => Err(invalid("expiry date", "must be MM/YY")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use shopfront_core::{Price, Product};

    use super::*;
    use crate::engine::CART_KEY;
    use crate::store::MemoryStore;

    fn form() -> CheckoutForm {
        CheckoutForm {
            shipping: ShippingAddress {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: "555-0100".to_string(),
                address: "12 Analytical Way".to_string(),
                city: "London".to_string(),
                state: "LDN".to_string(),
                zip_code: "10001".to_string(),
                country: String::new(),
            },
            payment: PaymentDetails {
                card_number: SecretString::from("4242 4242 4242 4242"),
                expiry_date: "09/29".to_string(),
                cvv: SecretString::from("123"),
                card_name: "A. Lovelace".to_string(),
            },
        }
    }

    async fn engine_with_items(store: Arc<MemoryStore>) -> CartEngine<MemoryStore> {
        let mut engine = CartEngine::open(store).await;
        engine
            .add_item(&Product::new(1, Price::from_cents(1000)).with_name("Lamp"))
            .unwrap();
        engine
            .add_item(&Product::new(2, Price::from_cents(250)))
            .unwrap();
        engine
    }

    #[tokio::test]
    async fn test_place_order_clears_cart() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = engine_with_items(Arc::clone(&store)).await;

        let confirmation = place_order(&mut engine, &form(), &PricingConfig::default()).unwrap();
        assert_eq!(confirmation.items.len(), 2);
        assert_eq!(confirmation.summary.subtotal, Price::from_cents(1250));
        assert_eq!(confirmation.summary.tax, Price::from_cents(100));
        assert_eq!(confirmation.summary.total, Price::from_cents(1250 + 999 + 100));
        assert_eq!(confirmation.card_last4, "4242");
        assert_eq!(confirmation.country, "United States");
        assert!(engine.is_empty());

        engine.flush().await;
        assert_eq!(store.value(CART_KEY).as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_empty_cart_is_refused() {
        let mut engine = CartEngine::open(Arc::new(MemoryStore::new())).await;
        assert_eq!(
            place_order(&mut engine, &form(), &PricingConfig::default()).unwrap_err(),
            CheckoutError::EmptyCart
        );
    }

    #[tokio::test]
    async fn test_invalid_form_keeps_cart() {
        let mut engine = engine_with_items(Arc::new(MemoryStore::new())).await;

        let mut bad = form();
        bad.shipping.email = "not-an-email".to_string();
        let err = place_order(&mut engine, &bad, &PricingConfig::default()).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidField { field: "email", .. }));
        assert_eq!(engine.item_count(), 2);
    }

    #[tokio::test]
    async fn test_required_fields() {
        let mut engine = engine_with_items(Arc::new(MemoryStore::new())).await;
        let mut bad = form();
        bad.shipping.city = "  ".to_string();
        let err = place_order(&mut engine, &bad, &PricingConfig::default()).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidField { field: "city", .. }));
    }

    #[test]
    fn test_validate_payment() {
        let mut payment = form().payment;
        assert_eq!(validate_payment(&payment).unwrap(), "4242");

        payment.card_number = SecretString::from("4242-4242-4242-1234-5");
        assert_eq!(validate_payment(&payment).unwrap(), "2345");

        payment.card_number = SecretString::from("4242");
        assert!(validate_payment(&payment).is_err());

        payment.card_number = SecretString::from("4242 4242 4242 424x");
        assert!(validate_payment(&payment).is_err());
    }

    #[test]
    fn test_validate_cvv() {
        let mut payment = form().payment;
        payment.cvv = SecretString::from("12");
        assert!(matches!(
            validate_payment(&payment),
            Err(CheckoutError::InvalidField { field: "cvv", .. })
        ));
        payment.cvv = SecretString::from("1234");
        assert!(validate_payment(&payment).is_ok());
    }

    #[test]
    fn test_validate_expiry() {
        assert!(validate_expiry("01/30").is_ok());
        assert!(validate_expiry("12/25").is_ok());
        assert!(validate_expiry("13/25").is_err());
        assert!(validate_expiry("00/25").is_err());
        assert!(validate_expiry("1/25").is_err());
        assert!(validate_expiry("01-25").is_err());
        assert!(validate_expiry("ab/cd").is_err());
    }

    #[test]
    fn test_payment_debug_is_redacted() {
        let debug = format!("{:?}", form().payment);
        assert!(!debug.contains("4242"));
        assert!(!debug.contains("123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
