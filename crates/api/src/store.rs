//! In-memory document store.
//!
//! Holds every portal document behind a single [`RwLock`]. Mutations validate
//! their input while holding the write lock and only then touch the data, so a
//! rejected save leaves the store unchanged and concurrent saves serialize.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;

use portal_core::api_keys::GeneratedCredentials;
use portal_core::error::CoreError;
use portal_core::records::{
    LedgerEntry, Merchant, Order, Processor, Service, Transaction, VanLog, VirtualAccount, Wallet,
    WhitelistIp,
};
use portal_core::settlement::{self, BankStatus, Settlement};
use portal_core::types::{DocName, Timestamp};
use portal_core::validation::{AdjustmentRequest, PricingRow, PricingTable, RecordValidator};
use portal_core::wallet::{
    apply_adjustment, recharge_utr, validate_credit_amount, AdjustmentOutcome, AdjustmentStatus,
    WalletKind,
};
use portal_core::webhook::{plan_webhook_change, validate_webhook_url, WebhookChange};
use portal_core::whitelist::ensure_not_whitelisted;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::ValidateEmail;

const VIRTUAL_ACCOUNT_PREFIX: &str = "19685";

/// Largest seven-digit account suffix.
const MAX_ACCOUNT_SUFFIX: u32 = 9_999_999;

const NO_VIRTUAL_ACCOUNT: &str = "No Virtual Account found for this merchant. Cannot recharge.";

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// Error loading the startup seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Documents the store can be seeded with. Every collection is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub merchants: Vec<Merchant>,
    pub wallets: Vec<Wallet>,
    pub orders: Vec<Order>,
    pub transactions: Vec<Transaction>,
    pub ledger: Vec<LedgerEntry>,
    pub van_logs: Vec<VanLog>,
    pub virtual_accounts: Vec<VirtualAccount>,
    pub whitelist_ips: Vec<WhitelistIp>,
    pub services: Vec<Service>,
    pub processors: Vec<Processor>,
}

// ---------------------------------------------------------------------------
// Store-only documents
// ---------------------------------------------------------------------------

/// A merchant's API key. The secret is kept only as a hash.
#[derive(Debug, Clone, Serialize)]
pub struct ApiCredential {
    pub api_key: String,
    #[serde(skip)]
    pub secret_hash: String,
    pub created_at: Timestamp,
}

/// A recorded wallet adjustment, successful or not.
#[derive(Debug, Clone, Serialize)]
pub struct Adjustment {
    pub id: DocName,
    pub merchant: DocName,
    pub from: WalletKind,
    pub to: WalletKind,
    pub amount: f64,
    pub status: AdjustmentStatus,
    pub message: Option<String>,
    pub created_at: Timestamp,
}

/// Fields an admin may change on a merchant. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct MerchantUpdate {
    pub status: Option<String>,
    pub integration: Option<String>,
    pub webhook: Option<String>,
    pub pricing: Option<Vec<PricingRow>>,
}

/// Profile fields a merchant may edit. Blank values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub company_name: Option<String>,
    pub phone: Option<String>,
}

/// Bulk merchant operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    UpdateStatus,
    UpdateIntegration,
}

/// Result of an admin wallet recharge.
#[derive(Debug, Clone, Serialize)]
pub struct CreditReceipt {
    pub new_balance: f64,
    pub van_log: VanLog,
}

/// Result of applying a bank callback.
#[derive(Debug, Clone)]
pub struct SettledOrder {
    pub order: Order,
    pub settlement: Settlement,
    /// Webhook registered by the order's merchant, if any.
    pub webhook_url: Option<String>,
}

#[derive(Debug, Default)]
struct PortalData {
    merchants: Vec<Merchant>,
    wallets: HashMap<DocName, Wallet>,
    orders: Vec<Order>,
    transactions: Vec<Transaction>,
    ledger: Vec<LedgerEntry>,
    van_logs: Vec<VanLog>,
    virtual_accounts: Vec<VirtualAccount>,
    whitelist_ips: Vec<WhitelistIp>,
    services: Vec<Service>,
    processors: Vec<Processor>,
    api_credentials: HashMap<DocName, ApiCredential>,
    adjustments: Vec<Adjustment>,
}

impl PortalData {
    fn merchant_mut(&mut self, id: &str) -> Result<&mut Merchant, CoreError> {
        self.merchants
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| CoreError::not_found("Merchant", id))
    }

    fn has_merchant(&self, id: &str) -> bool {
        self.merchants.iter().any(|m| m.id == id)
    }
}

fn new_id(prefix: &str) -> DocName {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Prefix plus one past the highest seven-digit suffix issued so far.
///
/// Any existing number sharing the prefix parses to a suffix no larger than
/// the current maximum, so the result never collides.
fn next_account_number(accounts: &[VirtualAccount]) -> Result<String, CoreError> {
    let highest = accounts
        .iter()
        .filter_map(|va| va.account_number.strip_prefix(VIRTUAL_ACCOUNT_PREFIX))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    let next = highest.saturating_add(1);
    if next > MAX_ACCOUNT_SUFFIX {
        return Err(CoreError::Internal(
            "Virtual account numbers exhausted".into(),
        ));
    }
    Ok(format!("{VIRTUAL_ACCOUNT_PREFIX}{next:07}"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// PortalStore
// ---------------------------------------------------------------------------

/// Shared in-memory store for all portal documents.
#[derive(Debug, Default)]
pub struct PortalStore {
    data: RwLock<PortalData>,
}

impl PortalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let wallets = seed
            .wallets
            .into_iter()
            .map(|w| (w.merchant.clone(), w))
            .collect();

        Self {
            data: RwLock::new(PortalData {
                merchants: seed.merchants,
                wallets,
                orders: seed.orders,
                transactions: seed.transactions,
                ledger: seed.ledger,
                van_logs: seed.van_logs,
                virtual_accounts: seed.virtual_accounts,
                whitelist_ips: seed.whitelist_ips,
                services: seed.services,
                processors: seed.processors,
                ..Default::default()
            }),
        }
    }

    /// Load a JSON seed file.
    pub async fn load_seed(path: &Path) -> Result<Self, SeedError> {
        let raw = tokio::fs::read(path).await?;
        let seed: SeedData = serde_json::from_slice(&raw)?;
        Ok(Self::from_seed(seed))
    }

    // -- Reads ---------------------------------------------------------------

    pub async fn merchant(&self, id: &str) -> Option<Merchant> {
        let data = self.data.read().await;
        data.merchants.iter().find(|m| m.id == id).cloned()
    }

    pub async fn merchants(&self) -> Vec<Merchant> {
        self.data.read().await.merchants.clone()
    }

    pub async fn merchant_count(&self) -> usize {
        self.data.read().await.merchants.len()
    }

    pub async fn wallet(&self, merchant: &str) -> Option<Wallet> {
        self.data.read().await.wallets.get(merchant).cloned()
    }

    pub async fn wallets(&self) -> Vec<Wallet> {
        self.data.read().await.wallets.values().cloned().collect()
    }

    /// Orders for one merchant, or all orders when `merchant` is `None`.
    pub async fn orders(&self, merchant: Option<&str>) -> Vec<Order> {
        let data = self.data.read().await;
        data.orders
            .iter()
            .filter(|o| merchant.map_or(true, |m| o.merchant == m))
            .cloned()
            .collect()
    }

    /// Ledger entries of one owner, or every entry when `owner` is `None`.
    pub async fn ledger(&self, owner: Option<&str>) -> Vec<LedgerEntry> {
        let data = self.data.read().await;
        data.ledger
            .iter()
            .filter(|e| owner.map_or(true, |o| e.owner == o))
            .cloned()
            .collect()
    }

    /// Bank transactions of one merchant, or all when `merchant` is `None`.
    pub async fn transactions(&self, merchant: Option<&str>) -> Vec<Transaction> {
        let data = self.data.read().await;
        data.transactions
            .iter()
            .filter(|t| merchant.map_or(true, |m| t.merchant == m))
            .cloned()
            .collect()
    }

    /// Services sorted by product name.
    pub async fn services(&self) -> Vec<Service> {
        let mut services = self.data.read().await.services.clone();
        services.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        services
    }

    pub async fn processors(&self) -> Vec<Processor> {
        self.data.read().await.processors.clone()
    }

    /// VAN logs for one merchant, or all logs when `merchant` is `None`.
    pub async fn van_logs(&self, merchant: Option<&str>) -> Vec<VanLog> {
        let data = self.data.read().await;
        data.van_logs
            .iter()
            .filter(|l| merchant.map_or(true, |m| l.merchant == m))
            .cloned()
            .collect()
    }

    /// Virtual accounts of one merchant, or all when `merchant` is `None`.
    pub async fn virtual_accounts(&self, merchant: Option<&str>) -> Vec<VirtualAccount> {
        let data = self.data.read().await;
        data.virtual_accounts
            .iter()
            .filter(|va| merchant.map_or(true, |m| va.merchant == m))
            .cloned()
            .collect()
    }

    /// Whitelisted IPs of a merchant, newest first.
    pub async fn whitelist_ips(&self, merchant: &str) -> Vec<WhitelistIp> {
        let data = self.data.read().await;
        let mut entries: Vec<WhitelistIp> = data
            .whitelist_ips
            .iter()
            .filter(|w| w.merchant == merchant)
            .cloned()
            .collect();
        entries.sort_by_key(|w| std::cmp::Reverse(w.created_at));
        entries
    }

    pub async fn api_credential(&self, merchant: &str) -> Option<ApiCredential> {
        self.data.read().await.api_credentials.get(merchant).cloned()
    }

    pub async fn adjustments(&self, merchant: &str) -> Vec<Adjustment> {
        let data = self.data.read().await;
        data.adjustments
            .iter()
            .filter(|a| a.merchant == merchant)
            .cloned()
            .collect()
    }

    // -- Whitelist -----------------------------------------------------------

    pub async fn add_whitelist_ip(
        &self,
        merchant: &str,
        ip: IpAddr,
        now: Timestamp,
    ) -> Result<WhitelistIp, CoreError> {
        let mut data = self.data.write().await;
        let existing: Vec<WhitelistIp> = data
            .whitelist_ips
            .iter()
            .filter(|w| w.merchant == merchant)
            .cloned()
            .collect();
        ensure_not_whitelisted(&existing, &ip)?;

        let entry = WhitelistIp {
            id: new_id("WIP"),
            merchant: merchant.to_string(),
            ip: ip.to_string(),
            created_at: now,
        };
        data.whitelist_ips.push(entry.clone());
        Ok(entry)
    }

    /// Delete a whitelist entry owned by `merchant`.
    ///
    /// Entries of other merchants are reported as not found.
    pub async fn delete_whitelist_ip(&self, merchant: &str, id: &str) -> Result<(), CoreError> {
        let mut data = self.data.write().await;
        let index = data
            .whitelist_ips
            .iter()
            .position(|w| w.id == id && w.merchant == merchant)
            .ok_or_else(|| CoreError::not_found("Whitelist IP", id))?;
        data.whitelist_ips.remove(index);
        Ok(())
    }

    // -- Profile, webhook & API keys -----------------------------------------

    pub async fn update_profile(
        &self,
        merchant: &str,
        update: ProfileUpdate,
    ) -> Result<Merchant, CoreError> {
        let mut data = self.data.write().await;
        let record = data.merchant_mut(merchant)?;
        if let Some(name) = non_blank(update.company_name) {
            record.company_name = name;
        }
        if let Some(phone) = non_blank(update.phone) {
            record.contact_detail = Some(phone);
        }
        Ok(record.clone())
    }

    pub async fn set_webhook(&self, merchant: &str, url: &str) -> Result<WebhookChange, CoreError> {
        validate_webhook_url(url)?;

        let mut data = self.data.write().await;
        let record = data.merchant_mut(merchant)?;
        let change = plan_webhook_change(record.webhook.as_deref(), record.webhook.is_some(), url);
        match change {
            WebhookChange::Removed => record.webhook = None,
            WebhookChange::Created | WebhookChange::Updated => {
                record.webhook = Some(url.trim().to_string());
            }
            WebhookChange::Unchanged => {}
        }
        Ok(change)
    }

    /// Replace a merchant's API credentials.
    pub async fn rotate_api_credentials(
        &self,
        merchant: &str,
        generated: &GeneratedCredentials,
        now: Timestamp,
    ) -> Result<ApiCredential, CoreError> {
        let mut data = self.data.write().await;
        if !data.has_merchant(merchant) {
            return Err(CoreError::not_found("Merchant", merchant));
        }
        let credential = ApiCredential {
            api_key: generated.api_key.clone(),
            secret_hash: generated.secret_hash.clone(),
            created_at: now,
        };
        data.api_credentials
            .insert(merchant.to_string(), credential.clone());
        Ok(credential)
    }

    // -- Admin merchant edits ------------------------------------------------

    /// Create a merchant with an active virtual account and empty wallets.
    ///
    /// The login account itself is created by the session authority.
    pub async fn onboard_merchant(
        &self,
        company_name: &str,
        email: &str,
    ) -> Result<Merchant, CoreError> {
        let company_name = company_name.trim();
        let email = email.trim().to_lowercase();
        if company_name.is_empty() {
            return Err(CoreError::Validation("Company name is required".into()));
        }
        if !email.validate_email() {
            return Err(CoreError::Validation("Invalid email address format".into()));
        }

        let mut data = self.data.write().await;
        if data.has_merchant(&email) {
            return Err(CoreError::Conflict(
                "Merchant with this email already exists".into(),
            ));
        }

        let merchant = Merchant {
            id: email.clone(),
            company_name: company_name.to_string(),
            company_email: email.clone(),
            contact_detail: None,
            website: None,
            gstin: None,
            pancard: None,
            status: "Submitted".into(),
            integration: None,
            webhook: None,
            pricing: Vec::new(),
        };
        let account_number = next_account_number(&data.virtual_accounts)?;
        data.virtual_accounts.push(VirtualAccount {
            name: new_id("VA"),
            merchant: email.clone(),
            account_number,
            ifsc: None,
            status: "Active".into(),
            prefix: Some(VIRTUAL_ACCOUNT_PREFIX.into()),
        });
        data.wallets
            .entry(email.clone())
            .or_insert_with(|| Wallet::new(email.as_str()));
        data.merchants.push(merchant.clone());
        Ok(merchant)
    }

    /// Apply an admin edit. Pricing and webhook are validated first; a
    /// failure rejects the whole edit.
    pub async fn update_merchant(
        &self,
        id: &str,
        update: MerchantUpdate,
    ) -> Result<Merchant, CoreError> {
        if let Some(rows) = &update.pricing {
            PricingTable(rows).validate()?;
        }
        if let Some(url) = &update.webhook {
            validate_webhook_url(url)?;
        }

        let mut data = self.data.write().await;
        let record = data.merchant_mut(id)?;
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(integration) = update.integration {
            record.integration = Some(integration).filter(|i| !i.trim().is_empty());
        }
        if let Some(url) = update.webhook {
            let url = url.trim();
            record.webhook = (!url.is_empty()).then(|| url.to_string());
        }
        if let Some(rows) = update.pricing {
            record.pricing = rows;
        }
        Ok(record.clone())
    }

    /// Apply one action to several merchants. Unknown ids reject the batch.
    ///
    /// Returns how many merchants changed; repeated ids count once.
    pub async fn bulk_update_merchants(
        &self,
        ids: &[DocName],
        action: BulkAction,
        value: &str,
    ) -> Result<usize, CoreError> {
        let mut data = self.data.write().await;
        if let Some(missing) = ids.iter().find(|id| !data.has_merchant(id)) {
            return Err(CoreError::not_found("Merchant", missing.as_str()));
        }

        let mut updated = 0;
        for merchant in data.merchants.iter_mut().filter(|m| ids.contains(&m.id)) {
            match action {
                BulkAction::UpdateStatus => merchant.status = value.to_string(),
                BulkAction::UpdateIntegration => {
                    merchant.integration = Some(value.to_string()).filter(|v| !v.is_empty());
                }
            }
            updated += 1;
        }
        Ok(updated)
    }

    // -- Services ------------------------------------------------------------

    pub async fn set_service_active(&self, name: &str, active: bool) -> Result<Service, CoreError> {
        let mut data = self.data.write().await;
        let service = data
            .services
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| CoreError::not_found("Service", name))?;
        service.is_active = active;
        Ok(service.clone())
    }

    // -- Wallets -------------------------------------------------------------

    /// Recharge a merchant's Main wallet through one of its virtual accounts.
    pub async fn credit_wallet(
        &self,
        merchant: &str,
        amount: f64,
        now: Timestamp,
    ) -> Result<CreditReceipt, CoreError> {
        validate_credit_amount(amount)?;

        let mut data = self.data.write().await;
        if !data.has_merchant(merchant) {
            return Err(CoreError::not_found("Merchant", merchant));
        }

        let account_number = {
            let mut owned = data
                .virtual_accounts
                .iter()
                .filter(|va| va.merchant == merchant);
            let first = owned.clone().next();
            owned
                .find(|va| va.is_active())
                .or(first)
                .map(|va| va.account_number.clone())
                .ok_or_else(|| CoreError::Validation(NO_VIRTUAL_ACCOUNT.into()))?
        };

        let wallet = data
            .wallets
            .entry(merchant.to_string())
            .or_insert_with(|| Wallet::new(merchant));
        let opening = wallet.balances.main;
        wallet.balances.main += amount;
        let closing = wallet.balances.main;

        let van_log = VanLog {
            id: new_id("VAN"),
            merchant: merchant.to_string(),
            account_number,
            amount,
            transaction_type: "Credit".into(),
            utr: Some(recharge_utr(now)),
            status: "Success".into(),
            remitter_name: Some("Admin".into()),
            remitter_account_number: Some("ADMINWALLET".into()),
            remitter_ifsc_code: Some("ADM000".into()),
            opening_balance: Some(opening),
            closing_balance: Some(closing),
            created_at: now,
        };
        data.van_logs.push(van_log.clone());

        Ok(CreditReceipt {
            new_balance: closing,
            van_log,
        })
    }

    /// Move money between a merchant's wallets and record the attempt.
    pub async fn adjust_wallets(
        &self,
        request: &AdjustmentRequest,
        now: Timestamp,
    ) -> Result<AdjustmentOutcome, CoreError> {
        request.validate()?;

        let mut data = self.data.write().await;
        let wallet = data
            .wallets
            .get_mut(&request.merchant_id)
            .ok_or_else(|| CoreError::not_found("Wallet", request.merchant_id.as_str()))?;

        let outcome = apply_adjustment(wallet.balances, request)?;
        wallet.balances = outcome.balances;

        data.adjustments.push(Adjustment {
            id: new_id("ADJ"),
            merchant: request.merchant_id.clone(),
            from: request.from,
            to: request.to,
            amount: request.amount,
            status: outcome.status,
            message: outcome.message.clone(),
            created_at: now,
        });
        Ok(outcome)
    }

    // -- Bank callbacks ------------------------------------------------------

    /// Apply a bank status callback to an order and its bank transactions.
    ///
    /// Failures refund the Main wallet and add a ledger credit.
    pub async fn settle_order(
        &self,
        order_id: &str,
        status: BankStatus,
        utr: Option<&str>,
        now: Timestamp,
    ) -> Result<SettledOrder, CoreError> {
        let mut data = self.data.write().await;
        let index = data
            .orders
            .iter()
            .position(|o| o.id == order_id)
            .ok_or_else(|| CoreError::not_found("Order", order_id))?;

        let merchant = data.orders[index].merchant.clone();
        let balance = data
            .wallets
            .get(&merchant)
            .map(|w| w.balances.main)
            .unwrap_or(0.0);
        let settlement = settlement::settle_order(&data.orders[index], status, utr, balance)?;

        let order = &mut data.orders[index];
        order.status = settlement.order_status.to_string();
        if let Some(utr) = &settlement.utr {
            order.utr = Some(utr.clone());
        }
        let order = order.clone();

        for txn in data.transactions.iter_mut().filter(|t| t.order_id == order.id) {
            txn.status = settlement.transaction_status.to_string();
            if let Some(utr) = &settlement.utr {
                txn.utr = Some(utr.clone());
            }
        }

        if let Some(refund) = settlement.refund {
            data.wallets
                .entry(merchant.clone())
                .or_insert_with(|| Wallet::new(merchant.as_str()))
                .balances
                .main = refund.closing_balance;
            data.ledger.push(LedgerEntry {
                id: new_id("LED"),
                owner: merchant.clone(),
                order_id: Some(order.id.clone()),
                transaction_type: "Credit".into(),
                transaction_amount: refund.amount,
                opening_balance: refund.opening_balance,
                closing_balance: refund.closing_balance,
                client_ref_id: order.client_ref_id.clone(),
                created_at: now,
            });
        }

        let webhook_url = data
            .merchants
            .iter()
            .find(|m| m.id == merchant)
            .and_then(|m| m.webhook.clone());

        Ok(SettledOrder {
            order,
            settlement,
            webhook_url,
        })
    }
}
