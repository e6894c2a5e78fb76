//! Catalog product records.
//!
//! Products come from the remote catalog table as loosely shaped JSON rows:
//! `{id, name, price, image_url?, ...}`. Only `price` is required to parse;
//! everything the catalog adds beyond the known fields (category, stock,
//! rating, description, ...) is kept verbatim in [`Product::attributes`].

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Keys of the named product fields. An attribute with one of these keys would
/// be written twice when the product is serialized.
pub const PRODUCT_FIELDS: &[&str] = &["id", "name", "price", "image_url"];

/// Pass-through attributes copied from a catalog row.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// A product row as delivered by the catalog.
///
/// ```
/// use shopfront_core::{Product, ProductId};
///
/// let product: Product = serde_json::from_str(
///     r#"{"id": 3, "name": "Mug", "price": 12.5, "stock": 4}"#,
/// ).unwrap();
///
/// assert_eq!(product.id, Some(ProductId::from(3)));
/// assert_eq!(product.attributes["stock"], 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog primary key. Rows without one cannot be added to a cart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unit price.
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Every other column of the row.
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Product {
    /// Create a product with an id and a price and nothing else.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, price: Price) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
            price,
            image_url: None,
            attributes: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Attach an extra catalog column. Keys in [`PRODUCT_FIELDS`] are ignored.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let key = key.into();
        if !PRODUCT_FIELDS.contains(&key.as_str()) {
            self.attributes.insert(key, value.into());
        }
        self
    }

    /// The image URL, ignoring blank values the catalog sometimes stores.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
