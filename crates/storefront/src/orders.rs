//! Orders and the order store.
//!
//! Order creation is the side effect of committing the terminal checkout
//! step. The store is an abstract seam so the in-memory backend can be
//! swapped for a persistent one without touching the checkout manager.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use redline_core::{Email, OrderId, Price};

use crate::checkout::DeliveryAddress;

/// Errors that can occur in the order store backend.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// The storage backend failed.
    #[error("order backend error: {0}")]
    Backend(String),
}

/// One purchased line on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
}

impl OrderItem {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Input for creating an order from a confirmed checkout.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub email: Email,
    pub delivery_address: DeliveryAddress,
    pub items: Vec<OrderItem>,
    pub total: Price,
}

/// A completed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Short human-readable order number, e.g. `RC-7K2M9Q`.
    pub ordernumber: String,
    pub email: Email,
    pub delivery_address: DeliveryAddress,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub created_at: DateTime<Utc>,
}

/// Order persistence seam consumed by the checkout manager.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order and return the stored record.
    async fn create(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    /// Fetch an order by ID. `Ok(None)` means not found.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderStoreError>;
}

/// Generate a short order number: `RC-` plus six alphanumerics.
fn generate_ordernumber() -> String {
    let suffix: String = rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("RC-{suffix}")
}

/// In-memory order store.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl MemoryOrderStore {
    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Whether the store holds no orders.
    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let order = Order {
            id: OrderId::new(),
            ordernumber: generate_ordernumber(),
            email: order.email,
            delivery_address: order.delivery_address,
            items: order.items,
            total: order.total,
            created_at: Utc::now(),
        };

        self.orders.write().await.insert(order.id, order.clone());
        tracing::info!(order_id = %order.id, ordernumber = %order.ordernumber, "order created");
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, OrderStoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_order() -> NewOrder {
        NewOrder {
            email: Email::parse("a@b.com").unwrap(),
            delivery_address: DeliveryAddress::default(),
            items: vec![OrderItem {
                slug: "oil-filter".to_owned(),
                name: "Oil Filter".to_owned(),
                quantity: 2,
                unit_price: Price::from_cents(1500),
            }],
            total: Price::from_cents(3000),
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let store = MemoryOrderStore::default();
        let created = store.create(new_order()).await.unwrap();

        let fetched = store.get(created.id).await.unwrap().expect("order exists");
        assert_eq!(fetched.ordernumber, created.ordernumber);
        assert_eq!(fetched.total, Price::from_cents(3000));
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let store = MemoryOrderStore::default();
        assert!(store.get(OrderId::new()).await.unwrap().is_none());
    }

    #[test]
    fn ordernumber_shape() {
        let n = generate_ordernumber();
        assert!(n.starts_with("RC-"));
        assert_eq!(n.len(), 9);
        assert!(n[3..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(!n.chars().any(|c| c.is_ascii_lowercase()));
    }
}
