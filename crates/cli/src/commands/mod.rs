//! CLI command implementations.

pub mod cart;
pub mod checkout;

use std::sync::Arc;

use shopfront_cart::{CartConfig, CartEngine, FileStore};
use tracing::debug;

/// Open the saved cart in the configured data directory.
pub async fn open_cart(config: &CartConfig) -> CartEngine<FileStore> {
    debug!(data_dir = %config.data_dir.display(), "Opening cart");
    CartEngine::open(Arc::new(FileStore::new(&config.data_dir))).await
}
