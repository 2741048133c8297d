//! Applying bank status callbacks to payout orders.
//!
//! The bank reports each payout as either settled or failed. A settled order
//! becomes `Processed` and records the bank reference. A failed order is
//! reversed and its debited amount is credited back to the merchant's Main
//! wallet, with a matching ledger credit.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::records::order_status::{self, PROCESSED, REVERSED};
use crate::records::Order;

/// Final status reported by the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BankStatus {
    Success,
    Failure,
}

/// Wallet credit returning a failed payout's funds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Refund {
    pub amount: f64,
    pub opening_balance: f64,
    pub closing_balance: f64,
}

/// State changes to apply for one callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub order_status: &'static str,
    pub transaction_status: &'static str,
    pub utr: Option<String>,
    pub refund: Option<Refund>,
}

/// Work out how a bank callback settles `order`.
///
/// Only in-flight orders can settle; a repeated or late callback for an order
/// that already reached a final state is a conflict. `wallet_balance` is the
/// merchant's current Main balance and is only read for failures.
pub fn settle_order(
    order: &Order,
    status: BankStatus,
    utr: Option<&str>,
    wallet_balance: f64,
) -> Result<Settlement, CoreError> {
    if !order_status::is_in_flight(&order.status) {
        return Err(CoreError::Conflict(format!(
            "Order {} is already {}",
            order.id, order.status
        )));
    }

    let utr = utr
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    match status {
        BankStatus::Success => Ok(Settlement {
            order_status: PROCESSED,
            transaction_status: "Success",
            utr,
            refund: None,
        }),
        BankStatus::Failure => {
            let amount = refund_amount(order);
            Ok(Settlement {
                order_status: REVERSED,
                transaction_status: "Failed",
                utr,
                refund: Some(Refund {
                    amount,
                    opening_balance: wallet_balance,
                    closing_balance: wallet_balance + amount,
                }),
            })
        }
    }
}

/// Amount debited for an order: the transaction amount, or the order amount
/// when no transaction amount was recorded.
pub fn refund_amount(order: &Order) -> f64 {
    order.transaction_amount.unwrap_or(order.order_amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn order(status: &str, transaction_amount: Option<f64>) -> Order {
        Order {
            id: "ORD-0042".into(),
            merchant: "acme@example.com".into(),
            customer_name: Some("R. Iyer".into()),
            order_amount: 1000.0,
            tax: Some(1.8),
            transaction_amount,
            fee: 10.0,
            status: status.to_string(),
            utr: None,
            client_ref_id: Some("ACME-1".into()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn success_processes_order_and_keeps_utr() {
        let s = settle_order(&order("Pending", None), BankStatus::Success, Some(" UTR9 "), 0.0)
            .unwrap();
        assert_eq!(s.order_status, "Processed");
        assert_eq!(s.transaction_status, "Success");
        assert_eq!(s.utr.as_deref(), Some("UTR9"));
        assert!(s.refund.is_none());
    }

    #[test]
    fn failure_reverses_and_refunds_transaction_amount() {
        let s = settle_order(
            &order("Processing", Some(1011.8)),
            BankStatus::Failure,
            None,
            200.0,
        )
        .unwrap();
        assert_eq!(s.order_status, "Reversed");
        assert_eq!(s.transaction_status, "Failed");
        let refund = s.refund.unwrap();
        assert_eq!(refund.amount, 1011.8);
        assert_eq!(refund.opening_balance, 200.0);
        assert_eq!(refund.closing_balance, 1211.8);
    }

    #[test]
    fn refund_falls_back_to_order_amount() {
        assert_eq!(refund_amount(&order("Queued", None)), 1000.0);
    }

    #[test]
    fn settled_orders_reject_further_callbacks() {
        for status in ["Processed", "Reversed", "Cancelled"] {
            assert_matches!(
                settle_order(&order(status, None), BankStatus::Failure, None, 0.0),
                Err(CoreError::Conflict(_))
            );
        }
    }

    #[test]
    fn bank_status_uses_uppercase_wire_names() {
        let status: BankStatus = serde_json::from_str("\"FAILURE\"").unwrap();
        assert_eq!(status, BankStatus::Failure);
    }
}
