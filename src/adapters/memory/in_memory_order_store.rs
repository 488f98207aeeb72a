//! In-memory order store.
//!
//! Backs the binary's demo mode and the test suites. Every write takes the
//! single write lock, so compare-and-set on status is atomic per store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId};
use crate::domain::payment::{Order, OrderStatus};
use crate::ports::{OrderStore, StatusUpdate};

#[derive(Debug, Clone)]
struct StoredOrder {
    order: Order,
    notes: Vec<String>,
}

/// Thread-safe in-memory `OrderStore`.
///
/// # Example
///
/// ```ignore
/// let store = InMemoryOrderStore::new();
/// store.insert(order).await;
///
/// let found = store.get_order(order_id).await?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, StoredOrder>>>,
    carts_cleared: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an order.
    pub async fn insert(&self, order: Order) {
        let mut orders = self.orders.write().await;
        orders.insert(
            order.id,
            StoredOrder {
                order,
                notes: Vec::new(),
            },
        );
    }

    /// Loads orders from a JSON array, replacing any with the same id.
    ///
    /// Returns the number of orders loaded.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` when the document is not an array of orders.
    pub async fn load_json(&self, json: &str) -> Result<usize, DomainError> {
        let fixtures: Vec<Order> = serde_json::from_str(json).map_err(|e| {
            DomainError::new(ErrorCode::InvalidFormat, format!("Invalid order fixtures: {}", e))
        })?;

        let count = fixtures.len();
        for order in fixtures {
            self.insert(order).await;
        }
        Ok(count)
    }

    // === Test Helpers ===

    /// Notes recorded for an order, oldest first.
    pub async fn notes(&self, id: OrderId) -> Vec<String> {
        let orders = self.orders.read().await;
        orders.get(&id).map(|s| s.notes.clone()).unwrap_or_default()
    }

    /// Number of times the customer cart was cleared.
    pub fn carts_cleared(&self) -> usize {
        self.carts_cleared.load(Ordering::SeqCst)
    }

    /// Makes every call fail with a store error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DomainError::store("Order store unavailable"))
        } else {
            Ok(())
        }
    }
}

fn not_found(id: OrderId) -> DomainError {
    DomainError::new(ErrorCode::OrderNotFound, format!("Order {} not found", id))
        .with_detail("order_id", id.to_string())
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, DomainError> {
        self.check_available()?;
        let orders = self.orders.read().await;
        Ok(orders.get(&id).map(|s| s.order.clone()))
    }

    async fn set_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
        note: &str,
    ) -> Result<StatusUpdate, DomainError> {
        self.check_available()?;
        let mut orders = self.orders.write().await;
        let stored = orders.get_mut(&id).ok_or_else(|| not_found(id))?;

        if stored.order.status != expected {
            return Ok(StatusUpdate::Conflict(stored.order.status));
        }

        stored.order.status = next;
        if !note.is_empty() {
            stored.notes.push(note.to_string());
        }
        Ok(StatusUpdate::Applied)
    }

    async fn set_transaction_id(
        &self,
        id: OrderId,
        transaction_id: &str,
    ) -> Result<(), DomainError> {
        self.check_available()?;
        let mut orders = self.orders.write().await;
        let stored = orders.get_mut(&id).ok_or_else(|| not_found(id))?;
        stored.order.transaction_id = Some(transaction_id.to_string());
        Ok(())
    }

    async fn record_refund(
        &self,
        id: OrderId,
        amount: Decimal,
        note: &str,
    ) -> Result<Decimal, DomainError> {
        self.check_available()?;
        let mut orders = self.orders.write().await;
        let stored = orders.get_mut(&id).ok_or_else(|| not_found(id))?;
        stored.order.total_refunded += amount;
        if !note.is_empty() {
            stored.notes.push(note.to_string());
        }
        Ok(stored.order.total_refunded)
    }

    async fn add_note(&self, id: OrderId, note: &str) -> Result<(), DomainError> {
        self.check_available()?;
        let mut orders = self.orders.write().await;
        let stored = orders.get_mut(&id).ok_or_else(|| not_found(id))?;
        stored.notes.push(note.to_string());
        Ok(())
    }

    async fn clear_cart(&self) -> Result<(), DomainError> {
        self.check_available()?;
        self.carts_cleared.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
