//! Shopfront Cart - the storefront's cart state engine.
//!
//! The storefront renders on the client and keeps its cart locally. This crate
//! owns that cart: a reducer over line items, hydration from and persistence
//! to a durable key-value record, and the totals the pages display.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use shopfront_cart::{CartEngine, FileStore};
//! use shopfront_core::{Price, Product};
//!
//! # async fn demo() -> Result<(), shopfront_cart::CartError> {
//! let mut cart = CartEngine::open(Arc::new(FileStore::new(".shopfront"))).await;
//! cart.add_item(&Product::new(1, Price::from_cents(999)).with_name("Mug"))?;
//! assert_eq!(cart.item_count(), 1);
//! cart.flush().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`state`] - `CartState` and the pure reducer
//! - [`engine`] - `CartEngine`: hydration, persistence, subscriptions
//! - [`store`] - Durable key-value stores (file, memory)
//! - [`summary`] - Shipping, tax and total
//! - [`checkout`] - Simulated order placement
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod config;
pub mod engine;
pub mod error;
pub mod item;
pub mod state;
pub mod store;
pub mod summary;

pub use checkout::{CheckoutError, CheckoutForm, OrderConfirmation, place_order};
pub use config::{CartConfig, ConfigError, PricingConfig};
pub use engine::{CART_KEY, CartEngine, CartPhase, CartSnapshot};
pub use error::CartError;
pub use item::LineItem;
pub use state::{CartAction, CartState};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use summary::OrderSummary;
