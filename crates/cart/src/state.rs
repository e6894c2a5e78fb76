//! Cart state and the reducer that transforms it.
//!
//! Every change to a cart goes through [`CartState::reduce`], a pure function
//! from `(state, action)` to the next state. The engine owns the current
//! state and is the only caller that replaces it.
//!
//! Invariants held by every state this module produces:
//! - at most one [`LineItem`] per product id;
//! - every quantity is at least one.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use shopfront_core::{Price, ProductId};

use crate::item::LineItem;

/// A state transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit of a product, appending it if it is not in the cart yet.
    Add(LineItem),
    /// Drop a product entirely. Unknown ids are ignored.
    Remove(ProductId),
    /// Replace a product's quantity. Zero or less removes it; unknown ids
    /// are ignored.
    SetQuantity { id: ProductId, quantity: i64 },
    /// Empty the cart.
    Clear,
    /// Replace the whole cart with previously saved items.
    Load(Vec<LineItem>),
}

/// The cart aggregate: an ordered list of line items, unique by id.
///
/// Serializes as a bare JSON array of line items, which is the durable
/// record format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct CartState {
    items: Vec<LineItem>,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a state from arbitrary items, merging duplicate ids.
    ///
    /// The first occurrence of an id keeps its snapshot and position; later
    /// duplicates only contribute their quantity.
    #[must_use]
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let mut merged: Vec<LineItem> = Vec::with_capacity(items.len());
        for item in items {
            match merged.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => {
                    if let Some(quantity) = NonZeroU32::new(item.quantity()) {
                        existing.add_quantity(quantity);
                    }
                }
                None => merged.push(item),
            }
        }
        Self { items: merged }
    }

    /// Apply an action and return the resulting state.
    #[must_use]
    pub fn reduce(&self, action: CartAction) -> Self {
        match action {
            CartAction::Add(item) => self.add(item),
            CartAction::Remove(id) => self.remove(&id),
            CartAction::SetQuantity { id, quantity } => self.set_quantity(&id, quantity),
            CartAction::Clear => Self::new(),
            CartAction::Load(items) => Self::from_items(items),
        }
    }

    fn add(&self, item: LineItem) -> Self {
        let mut items = self.items.clone();
        match items.iter_mut().find(|existing| existing.id == item.id) {
            // Existing snapshot wins; only the quantity moves.
            Some(existing) => existing.increment(),
            None => items.push(item.with_quantity(NonZeroU32::MIN)),
        }
        Self { items }
    }

    fn remove(&self, id: &ProductId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| &item.id != id)
                .cloned()
                .collect(),
        }
    }

    fn set_quantity(&self, id: &ProductId, quantity: i64) -> Self {
        let Some(quantity) = positive_quantity(quantity) else {
            return self.remove(id);
        };

        let mut items = self.items.clone();
        if let Some(existing) = items.iter_mut().find(|item| &item.id == id) {
            existing.set_quantity(quantity);
        }
        Self { items }
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Σ `price × quantity` over all items; zero when empty.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Σ `quantity` over all items (units, not distinct products).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity()))
            .sum()
    }
}

impl From<Vec<LineItem>> for CartState {
    fn from(items: Vec<LineItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<CartState> for Vec<LineItem> {
    fn from(state: CartState) -> Self {
        state.items
    }
}

/// Clamp a requested quantity into the representable positive range.
fn positive_quantity(quantity: i64) -> Option<NonZeroU32> {
    if quantity <= 0 {
        return None;
    }
    NonZeroU32::new(u32::try_from(quantity).unwrap_or(u32::MAX))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64, cents: u32) -> LineItem {
        LineItem::new(id, Price::from_cents(cents))
    }

    fn quantities(state: &CartState) -> Vec<(ProductId, u32)> {
        state
            .items()
            .iter()
            .map(|item| (item.id.clone(), item.quantity()))
            .collect()
    }

    #[test]
    fn test_add_new_item() {
        let state = CartState::new().reduce(CartAction::Add(item(1, 999)));
        assert_eq!(quantities(&state), vec![(ProductId::from(1), 1)]);
        assert_eq!(state.subtotal(), Price::from_cents(999));
        assert_eq!(state.item_count(), 1);
    }

    #[test]
    fn test_add_same_id_increments() {
        let state = CartState::new()
            .reduce(CartAction::Add(item(1, 999)))
            .reduce(CartAction::Add(item(1, 999)));
        assert_eq!(state.len(), 1);
        assert_eq!(state.items()[0].quantity(), 2);
        assert_eq!(state.subtotal(), Price::from_cents(1998));
        assert_eq!(state.item_count(), 2);
    }

    #[test]
    fn test_add_keeps_first_snapshot() {
        let state = CartState::new()
            .reduce(CartAction::Add(item(1, 500).with_name("Old")))
            .reduce(CartAction::Add(item(1, 800).with_name("New")));
        let stored = state.get(&ProductId::from(1)).unwrap();
        assert_eq!(stored.name.as_deref(), Some("Old"));
        assert_eq!(stored.price, Price::from_cents(500));
        assert_eq!(state.subtotal(), Price::from_cents(1000));
    }

    #[test]
    fn test_add_resets_incoming_quantity() {
        let incoming = item(4, 100).with_quantity(NonZeroU32::new(9).unwrap());
        let state = CartState::new().reduce(CartAction::Add(incoming));
        assert_eq!(state.items()[0].quantity(), 1);
    }

    #[test]
    fn test_add_many_stays_unique() {
        let ids = [3, 1, 3, 2, 1, 3];
        let state = ids
            .iter()
            .fold(CartState::new(), |state, id| state.reduce(CartAction::Add(item(*id, 100))));
        assert_eq!(
            quantities(&state),
            vec![
                (ProductId::from(3), 3),
                (ProductId::from(1), 2),
                (ProductId::from(2), 1),
            ]
        );
        assert_eq!(state.item_count(), 6);
    }

    #[test]
    fn test_remove() {
        let state = CartState::new()
            .reduce(CartAction::Add(item(1, 100)))
            .reduce(CartAction::Add(item(2, 100)))
            .reduce(CartAction::Remove(ProductId::from(1)));
        assert_eq!(quantities(&state), vec![(ProductId::from(2), 1)]);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let state = CartState::new().reduce(CartAction::Add(item(1, 100)));
        assert_eq!(state.reduce(CartAction::Remove(ProductId::from(42))), state);
    }

    #[test]
    fn test_set_quantity_replaces() {
        let state = CartState::new()
            .reduce(CartAction::Add(item(1, 250)))
            .reduce(CartAction::SetQuantity {
                id: ProductId::from(1),
                quantity: 5,
            });
        assert_eq!(state.items()[0].quantity(), 5);
        assert_eq!(state.subtotal(), Price::from_cents(1250));
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let state = CartState::new().reduce(CartAction::Add(item(1, 250)));
        for quantity in [0, -1, i64::MIN] {
            let next = state.reduce(CartAction::SetQuantity {
                id: ProductId::from(1),
                quantity,
            });
            assert!(next.is_empty());
            assert_eq!(next.item_count(), 0);
        }
    }

    #[test]
    fn test_set_quantity_never_adds() {
        let state = CartState::new().reduce(CartAction::SetQuantity {
            id: ProductId::from(1),
            quantity: 3,
        });
        assert!(state.is_empty());
    }

    #[test]
    fn test_set_quantity_clamps_huge_values() {
        let state = CartState::new()
            .reduce(CartAction::Add(item(1, 0)))
            .reduce(CartAction::SetQuantity {
                id: ProductId::from(1),
                quantity: i64::MAX,
            });
        assert_eq!(state.items()[0].quantity(), u32::MAX);
    }

    #[test]
    fn test_clear() {
        let state = CartState::new()
            .reduce(CartAction::Add(item(2, 500)))
            .reduce(CartAction::Add(item(3, 500)))
            .reduce(CartAction::Clear);
        assert!(state.is_empty());
        assert_eq!(state.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_load_replaces_and_merges_duplicates() {
        let state = CartState::new()
            .reduce(CartAction::Add(item(9, 100)))
            .reduce(CartAction::Load(vec![
                item(1, 100).with_name("first"),
                item(2, 200),
                item(1, 999).with_quantity(NonZeroU32::new(2).unwrap()),
            ]));
        assert_eq!(
            quantities(&state),
            vec![(ProductId::from(1), 3), (ProductId::from(2), 1)]
        );
        assert_eq!(
            state.get(&ProductId::from(1)).unwrap().name.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_reduce_does_not_touch_input() {
        let before = CartState::new().reduce(CartAction::Add(item(1, 100)));
        let snapshot = before.clone();
        let _ = before.reduce(CartAction::Clear);
        assert_eq!(before, snapshot);
    }

    #[test]
    fn test_empty_totals() {
        let state = CartState::new();
        assert_eq!(state.subtotal(), Price::ZERO);
        assert_eq!(state.item_count(), 0);
    }

    #[test]
    fn test_serde_is_bare_array() {
        let state = CartState::new().reduce(CartAction::Add(item(7, 300)));
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["id"], 7);
        assert_eq!(json[0]["quantity"], 1);

        let back: CartState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
