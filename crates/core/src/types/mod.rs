//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use email::{Email, EmailError};
pub use id::{ProductId, ProductIdError};
pub use price::{Price, PriceError};
pub use product::{Attributes, PRODUCT_FIELDS, Product};
