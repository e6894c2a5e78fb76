//! The cart engine: state holder, persistence and change notification.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──hydrate()──▶ Hydrating ──▶ Ready
//! ```
//!
//! An engine starts empty and [`CartPhase::Uninitialized`]. [`CartEngine::hydrate`]
//! reads the saved cart once, replaces the in-memory state with it, and only
//! then starts the background writer. Until that point nothing can be written,
//! so an empty pre-hydration cart never overwrites a saved one.
//!
//! # Writes
//!
//! After every mutation that changes the cart the engine serializes the items
//! and hands them to a single writer task. The caller never waits on the
//! store; writes land in mutation order, and a failed write is logged and
//! dropped while the in-memory cart stays authoritative.
//!
//! # Subscribers
//!
//! [`CartEngine::subscribe`] returns a `watch` receiver that is updated
//! synchronously inside each mutation with a fresh [`CartSnapshot`].

use std::sync::Arc;

use shopfront_core::{Price, Product, ProductId};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, instrument, warn};

use crate::config::PricingConfig;
use crate::error::Result;
use crate::item::LineItem;
use crate::state::{CartAction, CartState};
use crate::store::{KeyValueStore, StoreError};
use crate::summary::OrderSummary;

/// Key of the durable cart record.
pub const CART_KEY: &str = "cart";

/// Where the engine is in its one-way startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartPhase {
    /// Created; saved state not read yet. Writes are suppressed.
    Uninitialized,
    /// Reading saved state. Writes are suppressed.
    Hydrating,
    /// Saved state applied; every change is persisted.
    Ready,
}

/// What subscribers see after each change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub subtotal: Price,
    pub item_count: u64,
}

impl From<&CartState> for CartSnapshot {
    fn from(state: &CartState) -> Self {
        Self {
            items: state.items().to_vec(),
            subtotal: state.subtotal(),
            item_count: state.item_count(),
        }
    }
}

/// Outcome of reading the durable record during hydration.
enum SavedCart {
    Found(Vec<LineItem>),
    Missing,
    Corrupt,
    Unreadable,
}

enum WriteCommand {
    Save(String),
    Flush(oneshot::Sender<()>),
}

/// The process-wide cart.
///
/// There is exactly one engine per process, created at startup and handed to
/// whatever needs the cart. All mutations take `&mut self`, so they are
/// serialized by construction.
pub struct CartEngine<S> {
    state: CartState,
    phase: CartPhase,
    store: Arc<S>,
    writer: Option<mpsc::UnboundedSender<WriteCommand>>,
    updates: watch::Sender<CartSnapshot>,
}

impl<S: KeyValueStore + 'static> CartEngine<S> {
    /// Create an empty, unhydrated engine backed by `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        let state = CartState::new();
        let (updates, _) = watch::channel(CartSnapshot::from(&state));
        Self {
            state,
            phase: CartPhase::Uninitialized,
            store,
            writer: None,
            updates,
        }
    }

    /// Create an engine and hydrate it immediately.
    pub async fn open(store: Arc<S>) -> Self {
        let mut engine = Self::new(store);
        engine.hydrate().await;
        engine
    }

    /// Load the saved cart and enable persistence.
    ///
    /// Runs once; later calls return immediately. Never fails: a missing
    /// record keeps the current in-memory cart, a corrupt one resets the cart
    /// to empty, and an unreadable store is logged and treated as missing.
    ///
    /// Must be called from within a Tokio runtime, which hosts the writer task.
    #[instrument(skip(self))]
    pub async fn hydrate(&mut self) {
        if self.phase != CartPhase::Uninitialized {
            debug!(phase = ?self.phase, "Cart already hydrated");
            return;
        }
        self.phase = CartPhase::Hydrating;

        let saved = self.read_saved().await;
        let write_back = match saved {
            SavedCart::Found(items) => {
                info!(items = items.len(), "Restored saved cart");
                self.apply(CartAction::Load(items));
                true
            }
            SavedCart::Missing => {
                debug!("No saved cart");
                true
            }
            SavedCart::Corrupt => {
                self.apply(CartAction::Clear);
                true
            }
            // Leave a record we could not read alone; the next change replaces it.
            SavedCart::Unreadable => false,
        };

        self.writer = Some(spawn_writer(Arc::clone(&self.store)));
        self.phase = CartPhase::Ready;

        if write_back {
            self.persist();
        }
    }

    async fn read_saved(&self) -> SavedCart {
        match self.store.get(CART_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<LineItem>>(&raw) {
                Ok(items) => SavedCart::Found(items),
                Err(e) => {
                    warn!(error = %e, "Saved cart is malformed, starting with an empty cart");
                    SavedCart::Corrupt
                }
            },
            Ok(None) => SavedCart::Missing,
            Err(StoreError::Corrupt(reason)) => {
                warn!(%reason, "Saved cart is corrupt, starting with an empty cart");
                SavedCart::Corrupt
            }
            Err(e) => {
                warn!(error = %e, "Failed to read saved cart");
                SavedCart::Unreadable
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product`.
    ///
    /// A product already in the cart has its quantity incremented; its stored
    /// name and price are kept as they were.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingProductId`](crate::CartError::MissingProductId)
    /// if the product has no id. The cart is left unchanged.
    pub fn add_item(&mut self, product: &Product) -> Result<()> {
        let item = LineItem::from_product(product).inspect_err(|e| {
            warn!(error = %e, name = ?product.name, "Rejected product");
        })?;
        self.apply(CartAction::Add(item));
        Ok(())
    }

    /// Remove a product entirely. Does nothing if it is not in the cart.
    pub fn remove_item(&mut self, id: &ProductId) {
        self.apply(CartAction::Remove(id.clone()));
    }

    /// Set a product's quantity. Zero or less removes it. Never adds products.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) {
        self.apply(CartAction::SetQuantity {
            id: id.clone(),
            quantity,
        });
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.apply(CartAction::Clear);
    }

    fn apply(&mut self, action: CartAction) {
        let next = self.state.reduce(action);
        if next == self.state {
            return;
        }
        self.state = next;
        debug!(
            items = self.state.len(),
            units = self.state.item_count(),
            "Cart updated"
        );

        self.updates.send_replace(CartSnapshot::from(&self.state));
        self.persist();
    }

    fn persist(&self) {
        let Some(writer) = &self.writer else {
            return;
        };

        match serde_json::to_string(&self.state) {
            Ok(payload) => {
                if writer.send(WriteCommand::Save(payload)).is_err() {
                    warn!("Cart writer has stopped, change not saved");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize cart"),
        }
    }

    /// Wait until every write queued so far has been attempted.
    ///
    /// Returns immediately before hydration, when no writes can be queued.
    pub async fn flush(&self) {
        let Some(writer) = &self.writer else {
            return;
        };
        let (done, wait) = oneshot::channel();
        if writer.send(WriteCommand::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        self.state.items()
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.state.get(id)
    }

    #[must_use]
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Σ `price × quantity`; zero for an empty cart.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.state.subtotal()
    }

    /// Σ `quantity`; zero for an empty cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.state.item_count()
    }

    /// Shipping, tax and total for the current cart, or `None` when empty.
    #[must_use]
    pub fn order_summary(&self, pricing: &PricingConfig) -> Option<OrderSummary> {
        if self.state.is_empty() {
            return None;
        }
        Some(OrderSummary::from_subtotal(self.subtotal(), pricing))
    }

    #[must_use]
    pub const fn phase(&self) -> CartPhase {
        self.phase
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.phase == CartPhase::Ready
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from(&self.state)
    }

    /// Receive a new snapshot after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.updates.subscribe()
    }
}

/// Spawn the task that applies queued writes in order.
fn spawn_writer<S: KeyValueStore + 'static>(store: Arc<S>) -> mpsc::UnboundedSender<WriteCommand> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            match command {
                WriteCommand::Save(payload) => match store.set(CART_KEY, &payload).await {
                    Ok(()) => debug!(bytes = payload.len(), "Saved cart"),
                    Err(e) => warn!(error = %e, "Failed to save cart"),
                },
                WriteCommand::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        debug!("Cart writer stopped");
    });
    tx
}
