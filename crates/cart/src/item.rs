//! Cart line items.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use shopfront_core::{Attributes, PRODUCT_FIELDS, Price, Product, ProductId};

use crate::error::{CartError, Result};

/// Line item field not present on [`Product`].
const QUANTITY_FIELD: &str = "quantity";

/// One distinct product held in the cart, plus how many units of it.
///
/// Product fields are a snapshot taken when the product was first added; they
/// are not refreshed when the same product is added again. The quantity is
/// always at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unit price at the time of first addition.
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Remaining catalog columns, copied verbatim.
    #[serde(flatten)]
    pub attributes: Attributes,
    quantity: NonZeroU32,
}

impl LineItem {
    /// Create a line item with a quantity of one.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: None,
            price,
            image_url: None,
            attributes: Attributes::new(),
            quantity: NonZeroU32::MIN,
        }
    }

    /// Snapshot a catalog product as a line item with a quantity of one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingProductId`] if the product has no id.
    pub fn from_product(product: &Product) -> Result<Self> {
        let id = product.id.clone().ok_or(CartError::MissingProductId)?;

        // Attributes named like a field would be written as a duplicate key,
        // and the saved record would no longer parse.
        let mut attributes = product.attributes.clone();
        attributes.retain(|key, _| key != QUANTITY_FIELD && !PRODUCT_FIELDS.contains(&key.as_str()));

        Ok(Self {
            id,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            attributes,
            quantity: NonZeroU32::MIN,
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: NonZeroU32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Number of units of this product in the cart.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity.get())
    }

    pub(crate) fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    pub(crate) fn add_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = self.quantity.saturating_add(quantity.get());
    }

    pub(crate) fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_product_copies_fields() {
        let product = Product::new(9, Price::from_cents(450))
            .with_name("Notebook")
            .with_image_url("/img/notebook.png")
            .with_attribute("category", "stationery");

        let item = LineItem::from_product(&product).unwrap();
        assert_eq!(item.id, ProductId::from(9));
        assert_eq!(item.name.as_deref(), Some("Notebook"));
        assert_eq!(item.price, Price::from_cents(450));
        assert_eq!(item.image_url.as_deref(), Some("/img/notebook.png"));
        assert_eq!(item.attributes["category"], "stationery");
        assert_eq!(item.quantity(), 1);
    }

    #[test]
    fn test_from_product_without_id() {
        let mut product = Product::new(1, Price::ZERO);
        product.id = None;
        assert_eq!(
            LineItem::from_product(&product),
            Err(CartError::MissingProductId)
        );
    }

    #[test]
    fn test_catalog_quantity_column_is_dropped() {
        let product = Product::new(2, Price::from_cents(100)).with_attribute("quantity", 40);
        let item = LineItem::from_product(&product).unwrap();
        assert!(!item.attributes.contains_key("quantity"));

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_field_named_attributes_are_dropped() {
        let mut product = Product::new(2, Price::from_cents(500)).with_name("Tote");
        for key in ["id", "name", "price", "image_url", "quantity"] {
            product.attributes.insert(key.to_string(), serde_json::json!(1));
        }
        product.attributes.insert("color".to_string(), serde_json::json!("red"));

        let item = LineItem::from_product(&product).unwrap();
        assert_eq!(item.attributes.len(), 1);

        let json = serde_json::to_string(&item).unwrap();
        let back: LineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
        assert_eq!(back.price, Price::from_cents(500));
    }

    #[test]
    fn test_line_total() {
        let item = LineItem::new(1, Price::from_cents(999)).with_quantity(NonZeroU32::new(3).unwrap());
        assert_eq!(item.line_total(), Price::from_cents(2997));
    }

    #[test]
    fn test_increment_saturates() {
        let mut item = LineItem::new(1, Price::ZERO).with_quantity(NonZeroU32::MAX);
        item.increment();
        assert_eq!(item.quantity(), u32::MAX);
    }

    #[test]
    fn test_deserialize_stored_record() {
        let item: LineItem =
            serde_json::from_str(r#"{"id": "A", "price": 10, "quantity": 2, "color": "red"}"#)
                .unwrap();
        assert_eq!(item.id, ProductId::text("A").unwrap());
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.line_total(), Price::from_cents(2000));
        assert_eq!(item.attributes["color"], "red");
    }

    #[test]
    fn test_deserialize_rejects_non_positive_quantity() {
        assert!(serde_json::from_str::<LineItem>(r#"{"id": 1, "price": 1, "quantity": 0}"#).is_err());
        assert!(serde_json::from_str::<LineItem>(r#"{"id": 1, "price": 1, "quantity": -2}"#).is_err());
        assert!(serde_json::from_str::<LineItem>(r#"{"id": 1, "price": 1}"#).is_err());
    }
}
