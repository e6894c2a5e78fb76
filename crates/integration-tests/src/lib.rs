//! Integration tests for Shopfront.
//!
//! These tests drive the cart engine against a real [`FileStore`] in a
//! temporary directory, so each test sees what a restarted process would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Hydration, restarts and write ordering on disk
//! - `checkout_flow` - Placing an order from a saved cart

use std::path::Path;
use std::sync::Arc;

use shopfront_cart::{CART_KEY, CartEngine, FileStore};
use shopfront_core::{Price, Product};

/// A named catalog product priced in cents.
#[must_use]
pub fn product(id: i64, name: &str, cents: u32) -> Product {
    Product::new(id, Price::from_cents(cents)).with_name(name)
}

/// Open and hydrate a cart stored under `dir`.
pub async fn open_cart(dir: &Path) -> CartEngine<FileStore> {
    CartEngine::open(Arc::new(FileStore::new(dir))).await
}

/// Path of the cart record inside `dir`.
#[must_use]
pub fn cart_file(dir: &Path) -> std::path::PathBuf {
    dir.join(format!("{CART_KEY}.json"))
}

/// Raw contents of the cart record, if it exists.
#[must_use]
pub fn read_cart_file(dir: &Path) -> Option<String> {
    std::fs::read_to_string(cart_file(dir)).ok()
}

/// Parse the cart record as generic JSON.
///
/// # Panics
///
/// Panics if the record is missing or not valid JSON.
#[must_use]
pub fn read_cart_json(dir: &Path) -> serde_json::Value {
    let raw = read_cart_file(dir).expect("cart record should exist");
    serde_json::from_str(&raw).expect("cart record should be JSON")
}
