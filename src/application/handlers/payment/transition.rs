//! Checked status changes shared by the payment handlers.

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, StateMachine};
use crate::domain::payment::OrderStatus;
use crate::ports::{OrderStore, StatusUpdate};

/// Moves `id` from `from` to `to` if the lifecycle allows it.
///
/// The lifecycle check happens here; the store only compares and sets.
pub(crate) async fn transition(
    orders: &dyn OrderStore,
    id: OrderId,
    from: OrderStatus,
    to: OrderStatus,
    note: &str,
) -> Result<StatusUpdate, DomainError> {
    from.transition_to(to).map_err(|e| {
        DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
            .with_detail("order_id", id.to_string())
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str())
    })?;

    orders.set_status(id, from, to, note).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryOrderStore;
    use crate::domain::payment::{BillingContact, Order};
    use rust_decimal_macros::dec;

    async fn store_with(status: OrderStatus) -> (InMemoryOrderStore, OrderId) {
        let store = InMemoryOrderStore::new();
        let id = OrderId::new(8).unwrap();
        store
            .insert(Order {
                id,
                total: dec!(5.00),
                currency: "USD".to_string(),
                billing: BillingContact::default(),
                status,
                transaction_id: None,
                total_refunded: dec!(0),
                return_url: String::new(),
                cancel_url: String::new(),
            })
            .await;
        (store, id)
    }

    #[tokio::test]
    async fn legal_transition_is_applied() {
        let (store, id) = store_with(OrderStatus::Pending).await;

        let update = transition(&store, id, OrderStatus::Pending, OrderStatus::Paid, "ok")
            .await
            .unwrap();

        assert_eq!(update, StatusUpdate::Applied);
    }

    #[tokio::test]
    async fn illegal_transition_never_reaches_store() {
        let (store, id) = store_with(OrderStatus::Paid).await;

        let err = transition(&store, id, OrderStatus::Paid, OrderStatus::Failed, "late")
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        let order = store.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }
}
