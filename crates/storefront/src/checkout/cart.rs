//! Session-scoped carts and the in-memory cart store.
//!
//! Cart IDs are stored in the session keyed by cart name; the store maps
//! IDs to cart records. Carts are not designed for concurrent mutation
//! from parallel requests of the same session (no locking beyond the map).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use redline_core::{CartId, Price};

use super::CheckoutState;

/// One line of a cart: a catalog product and a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog slug of the product.
    pub slug: String,
    /// Product display name at the time it was added.
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
}

impl CartLine {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A cart under checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    /// The name the cart was created under (e.g. `cart`).
    pub name: String,
    pub lines: Vec<CartLine>,
    pub checkout: CheckoutState,
}

impl Cart {
    fn new(name: &str) -> Self {
        Self {
            id: CartId::new(),
            name: name.to_owned(),
            lines: Vec::new(),
            checkout: CheckoutState::default(),
        }
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Total number of items across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// In-memory cart store.
///
/// The session holds the cart ID per cart name; this store holds the
/// records. Get-or-create semantics live at the session boundary (see
/// `routes::cart::get_or_create_cart_id`), so two lookups with the same
/// session always land on the same record here.
#[derive(Debug, Default)]
pub struct CartStore {
    carts: RwLock<HashMap<CartId, Cart>>,
}

impl CartStore {
    /// Create a new empty cart under the given name and return its ID.
    pub async fn create(&self, name: &str) -> CartId {
        let cart = Cart::new(name);
        let id = cart.id;
        self.carts.write().await.insert(id, cart);
        tracing::debug!(cart_id = %id, name, "cart created");
        id
    }

    /// Snapshot a cart by ID.
    pub async fn get(&self, id: CartId) -> Option<Cart> {
        self.carts.read().await.get(&id).cloned()
    }

    /// Whether a cart with this ID exists.
    pub async fn contains(&self, id: CartId) -> bool {
        self.carts.read().await.contains_key(&id)
    }

    /// Add a line to a cart, merging quantity into an existing line for
    /// the same product. Returns the updated cart, or `None` when the
    /// cart does not exist.
    pub async fn add_line(&self, id: CartId, line: CartLine) -> Option<Cart> {
        let mut carts = self.carts.write().await;
        let cart = carts.get_mut(&id)?;

        if let Some(existing) = cart.lines.iter_mut().find(|l| l.slug == line.slug) {
            existing.quantity += line.quantity;
        } else {
            cart.lines.push(line);
        }

        Some(cart.clone())
    }

    /// Apply a mutation to a cart, returning the closure's result.
    ///
    /// Returns `None` when the cart does not exist. Used by the checkout
    /// manager for step commits.
    pub(crate) async fn update<T>(
        &self,
        id: CartId,
        f: impl FnOnce(&mut Cart) -> T,
    ) -> Option<T> {
        let mut carts = self.carts.write().await;
        carts.get_mut(&id).map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(slug: &str, quantity: u32, cents: i64) -> CartLine {
        CartLine {
            slug: slug.to_owned(),
            name: slug.to_owned(),
            quantity,
            unit_price: Price::from_cents(cents),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_same_cart() {
        let store = CartStore::default();
        let id = store.create("cart").await;

        let cart = store.get(id).await.expect("cart must exist");
        assert_eq!(cart.id, id);
        assert_eq!(cart.name, "cart");
        assert!(cart.lines.is_empty());
    }

    #[tokio::test]
    async fn add_line_merges_same_product() {
        let store = CartStore::default();
        let id = store.create("cart").await;

        store.add_line(id, line("oil-filter", 1, 1500)).await;
        let cart = store
            .add_line(id, line("oil-filter", 2, 1500))
            .await
            .expect("cart must exist");

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Price::from_cents(4500));
    }

    #[tokio::test]
    async fn add_line_to_missing_cart_is_none() {
        let store = CartStore::default();
        assert!(store.add_line(CartId::new(), line("x", 1, 100)).await.is_none());
    }
}
