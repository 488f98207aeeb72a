//! Order store port.
//!
//! Orders live in the commerce platform. The payment core reads them and asks
//! for status changes through this contract; it never owns order persistence.
//!
//! # Design
//!
//! - **Compare-and-set**: status changes name the status they expect to
//!   replace, so two concurrent writers cannot both move an order out of
//!   `pending`
//! - **Notes are append-only**: every payment event leaves an audit note
//! - **Refunds accumulate**: the store keeps the running refunded total that
//!   bounds later refunds

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::payment::{Order, OrderStatus};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Result of a compare-and-set status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    /// Order was in the expected status and now holds the new one.
    Applied,
    /// Order was not in the expected status; carries the status found.
    Conflict(OrderStatus),
}

/// Port for reading and updating platform orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetch an order by id. Returns `None` when it does not exist.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, DomainError>;

    /// Move an order from `expected` to `next`.
    ///
    /// Implementations must apply the change atomically and return
    /// `StatusUpdate::Conflict` when the current status is not `expected`.
    /// The store does not check lifecycle rules; callers do.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order does not exist
    /// - `StoreError` on persistence failure
    async fn set_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
        note: &str,
    ) -> Result<StatusUpdate, DomainError>;

    /// Record the processor transaction id on the order.
    async fn set_transaction_id(&self, id: OrderId, transaction_id: &str)
        -> Result<(), DomainError>;

    /// Add a confirmed refund to the order's refunded total and note it.
    ///
    /// Returns the refunded total after this refund.
    async fn record_refund(
        &self,
        id: OrderId,
        amount: Decimal,
        note: &str,
    ) -> Result<Decimal, DomainError>;

    /// Append a human-readable note to the order history.
    async fn add_note(&self, id: OrderId, note: &str) -> Result<(), DomainError>;

    /// Empty the current customer's cart after a successful checkout.
    async fn clear_cart(&self) -> Result<(), DomainError>;
}
