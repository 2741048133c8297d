//! Dashboard statistics over a set of orders.

use serde::Serialize;

use crate::records::order_status::{
    CANCELLED, PENDING, PROCESSED, PROCESSING, QUEUED, REVERSED,
};
use crate::records::{Order, Wallet};

/// Order counts and amounts grouped by lifecycle bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderStats {
    pub total_orders: usize,
    pub processed_orders: usize,
    pub pending_orders: usize,
    pub cancelled_orders: usize,
    pub total_processed_amount: f64,
    pub total_pending_amount: f64,
    pub total_cancelled_amount: f64,
    pub total_orders_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Processed,
    Pending,
    Cancelled,
    Other,
}

fn bucket(status: &str) -> Bucket {
    match status {
        PROCESSED => Bucket::Processed,
        PENDING | PROCESSING | QUEUED => Bucket::Pending,
        CANCELLED | REVERSED => Bucket::Cancelled,
        _ => Bucket::Other,
    }
}

impl OrderStats {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut stats = OrderStats::default();
        for order in orders {
            stats.total_orders += 1;
            stats.total_orders_amount += order.order_amount;
            match bucket(&order.status) {
                Bucket::Processed => {
                    stats.processed_orders += 1;
                    stats.total_processed_amount += order.order_amount;
                }
                Bucket::Pending => {
                    stats.pending_orders += 1;
                    stats.total_pending_amount += order.order_amount;
                }
                Bucket::Cancelled => {
                    stats.cancelled_orders += 1;
                    stats.total_cancelled_amount += order.order_amount;
                }
                Bucket::Other => {}
            }
        }
        stats
    }
}

/// Wallet line of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletSummary {
    pub balance: f64,
    pub status: String,
}

impl WalletSummary {
    pub fn from_wallet(wallet: &Wallet) -> Self {
        Self {
            balance: wallet.balances.main,
            status: wallet.status.clone(),
        }
    }

    pub fn inactive() -> Self {
        Self {
            balance: 0.0,
            status: "Inactive".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub wallet: WalletSummary,
    pub stats: OrderStats,
}

impl DashboardStats {
    /// Stats for a user with no merchant record.
    pub fn empty() -> Self {
        Self {
            wallet: WalletSummary::inactive(),
            stats: OrderStats::default(),
        }
    }
}
