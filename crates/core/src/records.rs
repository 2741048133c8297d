//! Portal document shapes.
//!
//! These mirror the documents the portals list and edit. Status and type
//! fields are free-form strings because they come from upstream processors.

use serde::{Deserialize, Serialize};

use crate::types::{DocName, Timestamp};
use crate::validation::PricingRow;
use crate::wallet::WalletBalances;

/// Order status strings used by statistics and webhooks.
pub mod order_status {
    pub const PROCESSED: &str = "Processed";
    pub const PENDING: &str = "Pending";
    pub const PROCESSING: &str = "Processing";
    pub const QUEUED: &str = "Queued";
    pub const CANCELLED: &str = "Cancelled";
    pub const REVERSED: &str = "Reversed";

    /// Whether an order is still waiting on the bank.
    pub fn is_in_flight(status: &str) -> bool {
        matches!(status, PENDING | PROCESSING | QUEUED)
    }
}

/// A payout order placed by a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: DocName,
    pub merchant: DocName,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub order_amount: f64,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub transaction_amount: Option<f64>,
    #[serde(default)]
    pub fee: f64,
    pub status: String,
    #[serde(default)]
    pub utr: Option<String>,
    #[serde(default)]
    pub client_ref_id: Option<String>,
    pub created_at: Timestamp,
}

/// A wallet ledger movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: DocName,
    pub owner: DocName,
    #[serde(default)]
    pub order_id: Option<DocName>,
    pub transaction_type: String,
    pub transaction_amount: f64,
    pub opening_balance: f64,
    pub closing_balance: f64,
    #[serde(default)]
    pub client_ref_id: Option<String>,
    pub created_at: Timestamp,
}

/// An inbound virtual-account (VAN) credit or debit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VanLog {
    pub id: DocName,
    pub merchant: DocName,
    pub account_number: String,
    pub amount: f64,
    pub transaction_type: String,
    #[serde(default)]
    pub utr: Option<String>,
    pub status: String,
    #[serde(default)]
    pub remitter_name: Option<String>,
    #[serde(default)]
    pub remitter_account_number: Option<String>,
    #[serde(default)]
    pub remitter_ifsc_code: Option<String>,
    #[serde(default)]
    pub opening_balance: Option<f64>,
    #[serde(default)]
    pub closing_balance: Option<f64>,
    pub created_at: Timestamp,
}

/// A merchant account and its pricing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    /// Merchants are keyed by their company email.
    pub id: DocName,
    pub company_name: String,
    pub company_email: String,
    #[serde(default)]
    pub contact_detail: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub gstin: Option<String>,
    #[serde(default)]
    pub pancard: Option<String>,
    pub status: String,
    #[serde(default)]
    pub integration: Option<String>,
    #[serde(default)]
    pub webhook: Option<String>,
    #[serde(default)]
    pub pricing: Vec<PricingRow>,
}

/// A bank transaction raised for an order.
///
/// Its status follows the bank (`Success`, `Failed`), unlike the
/// order which uses portal lifecycle names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: DocName,
    pub order_id: DocName,
    pub merchant: DocName,
    #[serde(default)]
    pub product: Option<String>,
    pub amount: f64,
    pub status: String,
    #[serde(default)]
    pub utr: Option<String>,
    #[serde(default)]
    pub integration: Option<String>,
    pub created_at: Timestamp,
}

/// A payout product offered to merchants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: DocName,
    pub product_name: String,
    #[serde(default)]
    pub is_active: bool,
}

/// A bank integration that processes payouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Processor {
    pub name: DocName,
    pub integration_name: String,
    #[serde(default)]
    pub integration_type: Option<String>,
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    /// Never sent to the portal.
    #[serde(default, skip_serializing)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    /// Products this integration has pricing for.
    #[serde(default)]
    pub products: Vec<String>,
}

/// A merchant's wallet pair. The dashboard balance is the Main wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub merchant: DocName,
    #[serde(flatten)]
    pub balances: WalletBalances,
    #[serde(default = "default_wallet_status")]
    pub status: String,
}

fn default_wallet_status() -> String {
    "Active".into()
}

impl Wallet {
    pub fn new(merchant: impl Into<DocName>) -> Self {
        Self {
            merchant: merchant.into(),
            balances: WalletBalances::default(),
            status: default_wallet_status(),
        }
    }
}

/// A virtual bank account assigned to a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualAccount {
    pub name: DocName,
    pub merchant: DocName,
    pub account_number: String,
    #[serde(default)]
    pub ifsc: Option<String>,
    pub status: String,
    #[serde(default)]
    pub prefix: Option<String>,
}

impl VirtualAccount {
    pub fn is_active(&self) -> bool {
        self.status == "Active"
    }
}

/// An IP address allowed to call the payout API for a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitelistIp {
    pub id: DocName,
    pub merchant: DocName,
    pub ip: String,
    pub created_at: Timestamp,
}
