//! Order view and payment status state machine.
//!
//! Orders belong to the commerce platform. The core only reads them through
//! the order store port and asks for status changes; the lifecycle rules
//! below decide which of those requests are legal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, StateMachine};

/// Payment status of an order.
///
/// `pending → {paid | failed}`, then `paid → refunded`. At most one of
/// `paid` / `failed` is ever recorded for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting payment.
    Pending,

    /// Payment captured; only an explicit refund moves it further.
    Paid,

    /// Payment was declined or errored.
    Failed,

    /// Money returned to the customer.
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateMachine for OrderStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Pending => vec![Paid, Failed],
            Paid => vec![Refunded],
            Failed => vec![],
            Refunded => vec![],
        }
    }
}

/// Billing contact captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// ISO 3166 country code.
    pub country: String,
}

impl BillingContact {
    /// "First Last", trimmed; either part may be missing.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Read model of a platform order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Order total in major units.
    pub total: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    pub billing: BillingContact,
    pub status: OrderStatus,
    /// Processor transaction id, stored once a payment is confirmed.
    pub transaction_id: Option<String>,
    /// Sum of refunds already issued against this order, in major units.
    #[serde(default)]
    pub total_refunded: Decimal,
    /// Where the customer lands after a successful payment.
    pub return_url: String,
    /// Where the customer lands after abandoning payment.
    pub cancel_url: String,
}

impl Order {
    /// Stored transaction id, ignoring blank values.
    pub fn stored_transaction_id(&self) -> Option<&str> {
        self.transaction_id
            .as_deref()
            .map(str::trim)
            .filter(|tx| !tx.is_empty())
    }

    /// Amount still available for refunds, never below zero.
    pub fn refundable_amount(&self) -> Decimal {
        (self.total - self.total_refunded).max(Decimal::ZERO)
    }

    /// True once refunds cover the whole order total.
    pub fn is_fully_refunded(&self) -> bool {
        self.total_refunded >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_become_paid_or_failed() {
        assert_eq!(
            OrderStatus::Pending.transition_to(OrderStatus::Paid),
            Ok(OrderStatus::Paid)
        );
        assert_eq!(
            OrderStatus::Pending.transition_to(OrderStatus::Failed),
            Ok(OrderStatus::Failed)
        );
    }

    #[test]
    fn pending_cannot_be_refunded() {
        assert!(OrderStatus::Pending
            .transition_to(OrderStatus::Refunded)
            .is_err());
    }

    #[test]
    fn paid_only_moves_to_refunded() {
        assert_eq!(OrderStatus::Paid.valid_transitions(), vec![OrderStatus::Refunded]);
        assert!(!OrderStatus::Paid.can_transition_to(&OrderStatus::Failed));
        assert!(!OrderStatus::Paid.can_transition_to(&OrderStatus::Pending));
    }

    #[test]
    fn failed_cannot_become_paid() {
        assert!(!OrderStatus::Failed.can_transition_to(&OrderStatus::Paid));
    }

    #[test]
    fn failed_and_refunded_are_terminal() {
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Refunded.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
    }

    #[test]
    fn no_status_transitions_to_itself() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Failed,
            OrderStatus::Refunded,
        ] {
            assert!(!status.can_transition_to(&status), "{:?}", status);
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&OrderStatus::Paid).unwrap(), "\"paid\"");
        assert_eq!(OrderStatus::Refunded.to_string(), "refunded");
    }

    #[test]
    fn full_name_joins_parts() {
        let billing = BillingContact {
            first_name: " Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            ..Default::default()
        };
        assert_eq!(billing.full_name(), "Ada Lovelace");

        let only_last = BillingContact {
            last_name: "Lovelace".to_string(),
            ..Default::default()
        };
        assert_eq!(only_last.full_name(), "Lovelace");
    }

    #[test]
    fn blank_transaction_id_is_treated_as_missing() {
        let mut order = Order {
            id: OrderId::new(1).unwrap(),
            total: Decimal::new(1999, 2),
            currency: "USD".to_string(),
            billing: BillingContact::default(),
            status: OrderStatus::Paid,
            transaction_id: Some("  ".to_string()),
            total_refunded: Decimal::ZERO,
            return_url: String::new(),
            cancel_url: String::new(),
        };
        assert_eq!(order.stored_transaction_id(), None);

        order.transaction_id = Some("tx_1".to_string());
        assert_eq!(order.stored_transaction_id(), Some("tx_1"));
    }

    #[test]
    fn refundable_amount_tracks_previous_refunds() {
        let mut order: Order = serde_json::from_str(
            r#"{
                "id": 3,
                "total": "120.00",
                "currency": "EUR",
                "billing": {"first_name": "", "last_name": "", "email": "", "country": ""},
                "status": "paid",
                "transaction_id": "tx_3",
                "return_url": "",
                "cancel_url": ""
            }"#,
        )
        .unwrap();
        assert_eq!(order.total_refunded, Decimal::ZERO);
        assert_eq!(order.refundable_amount(), Decimal::new(12000, 2));
        assert!(!order.is_fully_refunded());

        order.total_refunded = Decimal::new(10000, 2);
        assert_eq!(order.refundable_amount(), Decimal::new(2000, 2));

        order.total_refunded = Decimal::new(12000, 2);
        assert_eq!(order.refundable_amount(), Decimal::ZERO);
        assert!(order.is_fully_refunded());
    }
}
