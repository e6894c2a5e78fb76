//! Shopfront Core - Shared types library.
//!
//! This crate provides the types shared by all Shopfront components:
//! - `cart` - Cart engine, order summary and simulated checkout
//! - `cli` - Command-line front end driving the cart engine
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no async runtime. Catalog records enter the system through these types.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, catalog products and email addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
