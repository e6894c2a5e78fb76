//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! sf-cli cart add --id 1 --price 9.99 --name "Mug"
//! sf-cli cart show
//! sf-cli cart set --id 1 --quantity 0
//! ```

use shopfront_cart::{CartEngine, FileStore, PricingConfig};
use shopfront_core::{Price, Product, ProductId};
use thiserror::Error;
use tracing::info;

/// Errors from building a product out of command-line input.
#[derive(Debug, Error)]
pub enum ProductInputError {
    /// `--id` and `--price` are both needed without `--json`.
    #[error("--id and --price are required unless --json is given")]
    MissingFlags,

    /// The `--json` record is not a valid catalog product.
    #[error("invalid product JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Build a product from individual flags.
///
/// # Errors
///
/// Returns `ProductInputError::MissingFlags` if the id or price is missing.
pub fn product_from_flags(
    id: Option<ProductId>,
    price: Option<Price>,
    name: Option<String>,
    image_url: Option<String>,
) -> Result<Product, ProductInputError> {
    let (Some(id), Some(price)) = (id, price) else {
        return Err(ProductInputError::MissingFlags);
    };

    let mut product = Product::new(id, price);
    product.name = name;
    product.image_url = image_url;
    Ok(product)
}

/// Parse a catalog record given as JSON.
///
/// # Errors
///
/// Returns `ProductInputError::InvalidJson` if the record does not parse.
pub fn product_from_json(json: &str) -> Result<Product, ProductInputError> {
    Ok(serde_json::from_str(json)?)
}

/// Log the cart contents.
pub fn show(cart: &CartEngine<FileStore>) {
    if cart.is_empty() {
        info!("Cart is empty");
        return;
    }

    info!(
        "Cart: {} product(s), {} unit(s)",
        cart.len(),
        cart.item_count()
    );
    for item in cart.items() {
        info!(
            "  [{}] {} - {} x {} = {}",
            item.id,
            item.name.as_deref().unwrap_or("(unnamed)"),
            item.quantity(),
            item.price,
            item.line_total()
        );
    }
    info!("Subtotal: {}", cart.subtotal());
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the product has no id.
pub fn add(
    cart: &mut CartEngine<FileStore>,
    product: &Product,
) -> Result<(), Box<dyn std::error::Error>> {
    cart.add_item(product)?;
    if let Some(id) = &product.id {
        let quantity = cart.get(id).map_or(0, shopfront_cart::LineItem::quantity);
        info!(%id, quantity, "Added to cart");
    }
    show(cart);
    Ok(())
}

pub fn remove(cart: &mut CartEngine<FileStore>, id: &ProductId) {
    if cart.get(id).is_none() {
        info!(%id, "Product not in cart");
        return;
    }
    cart.remove_item(id);
    info!(%id, "Removed from cart");
    show(cart);
}

pub fn set_quantity(cart: &mut CartEngine<FileStore>, id: &ProductId, quantity: i64) {
    if cart.get(id).is_none() {
        info!(%id, "Product not in cart");
        return;
    }
    cart.set_quantity(id, quantity);
    show(cart);
}

pub fn clear(cart: &mut CartEngine<FileStore>) {
    cart.clear();
    info!("Cart cleared");
}

/// Log the order summary for the current cart.
pub fn summary(cart: &CartEngine<FileStore>, pricing: &PricingConfig) {
    let Some(summary) = cart.order_summary(pricing) else {
        info!("Cart is empty");
        return;
    };

    info!("Subtotal: {}", summary.subtotal);
    info!("Shipping: {}", summary.shipping);
    info!("Tax:      {}", summary.tax);
    info!("Total:    {}", summary.total);
}
