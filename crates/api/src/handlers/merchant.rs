//! Merchant portal handlers.
//!
//! Every endpoint requires the `Merchant` role and is scoped to the caller's
//! own merchant record (the session user is the merchant id).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use portal_core::api_keys::generate_api_credentials;
use portal_core::dashboard::{DashboardStats, OrderStats, WalletSummary};
use portal_core::error::CoreError;
use portal_core::export::{
    export_filename, export_ledger_csv, export_orders_csv, export_van_logs_csv,
};
use portal_core::listing::apply_filter;
use portal_core::pagination::{paginate, Page};
use portal_core::records::{LedgerEntry, Merchant, Order, VanLog, VirtualAccount, WhitelistIp};
use portal_core::types::Timestamp;
use portal_core::webhook::WebhookChange;
use portal_core::whitelist::parse_whitelist_ip;
use serde::{Deserialize, Serialize};

use super::csv_attachment;
use crate::error::AppResult;
use crate::middleware::rbac::RequireMerchant;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::store::ProfileUpdate;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// The merchant's own view of its record.
#[derive(Debug, Serialize)]
pub struct MerchantProfile {
    pub name: String,
    pub company_name: String,
    pub company_email: String,
    pub contact_detail: Option<String>,
    pub website: Option<String>,
    pub gstin: Option<String>,
    pub pancard: Option<String>,
    pub webhook: Option<String>,
    pub status: String,
}

impl From<Merchant> for MerchantProfile {
    fn from(m: Merchant) -> Self {
        Self {
            name: m.id,
            company_name: m.company_name,
            company_email: m.company_email,
            contact_detail: m.contact_detail,
            website: m.website,
            gstin: m.gstin,
            pancard: m.pancard,
            webhook: m.webhook,
            status: m.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddWhitelistIp {
    #[serde(default)]
    pub ip_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWebhook {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhookUpdated {
    pub change: WebhookChange,
    pub message: &'static str,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyInfo {
    pub api_key: String,
    pub created_at: Timestamp,
}

/// Returned once, when credentials are generated.
#[derive(Debug, Serialize)]
pub struct ApiKeyCreated {
    pub api_key: String,
    pub api_secret: String,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/merchant/dashboard
///
/// Wallet balance and order statistics. A user without a merchant record gets
/// zeroed stats and an inactive wallet.
pub async fn dashboard(
    merchant: RequireMerchant,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let id = merchant.merchant_id();
    if state.store.merchant(id).await.is_none() {
        return Ok(Json(DataResponse {
            data: DashboardStats::empty(),
        }));
    }

    let wallet = state
        .store
        .wallet(id)
        .await
        .map(|w| WalletSummary::from_wallet(&w))
        .unwrap_or_else(WalletSummary::inactive);
    let orders = state.store.orders(Some(id)).await;

    Ok(Json(DataResponse {
        data: DashboardStats {
            wallet,
            stats: OrderStats::from_orders(&orders),
        },
    }))
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// GET /api/v1/merchant/profile
pub async fn get_profile(
    merchant: RequireMerchant,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MerchantProfile>>> {
    let id = merchant.merchant_id();
    let record = state
        .store
        .merchant(id)
        .await
        .ok_or_else(|| CoreError::not_found("Merchant", id))?;
    Ok(Json(DataResponse {
        data: record.into(),
    }))
}

/// PUT /api/v1/merchant/profile
///
/// Only the company name and phone number are editable here.
pub async fn update_profile(
    merchant: RequireMerchant,
    State(state): State<AppState>,
    Json(input): Json<ProfileUpdate>,
) -> AppResult<Json<DataResponse<MerchantProfile>>> {
    let record = state
        .store
        .update_profile(merchant.merchant_id(), input)
        .await?;
    tracing::info!(merchant = %record.id, "Merchant profile updated");
    Ok(Json(DataResponse {
        data: record.into(),
    }))
}

// ---------------------------------------------------------------------------
// Tables and exports
// ---------------------------------------------------------------------------

async fn filtered_orders(
    state: &AppState,
    merchant: &str,
    params: &ListParams,
) -> AppResult<Vec<Order>> {
    let filter = params.filter().resolve()?;
    let rows = state.store.orders(Some(merchant)).await;
    Ok(apply_filter(&rows, &filter))
}

async fn filtered_ledger(
    state: &AppState,
    merchant: &str,
    params: &ListParams,
) -> AppResult<Vec<LedgerEntry>> {
    let filter = params.filter().resolve()?;
    let rows = state.store.ledger(Some(merchant)).await;
    Ok(apply_filter(&rows, &filter))
}

async fn filtered_van_logs(
    state: &AppState,
    merchant: &str,
    params: &ListParams,
) -> AppResult<Vec<VanLog>> {
    let filter = params.filter().resolve()?;
    let rows = state.store.van_logs(Some(merchant)).await;
    Ok(apply_filter(&rows, &filter))
}

/// GET /api/v1/merchant/orders
pub async fn list_orders(
    merchant: RequireMerchant,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Page<Order>>>> {
    let rows = filtered_orders(&state, merchant.merchant_id(), &params).await?;
    Ok(Json(DataResponse {
        data: paginate(&rows, &params.page_request()),
    }))
}

/// GET /api/v1/merchant/orders/export
pub async fn export_orders(
    merchant: RequireMerchant,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let rows = filtered_orders(&state, merchant.merchant_id(), &params).await?;
    tracing::info!(merchant = %merchant.merchant_id(), rows = rows.len(), "Orders exported");
    Ok(csv_attachment(
        &export_filename("Orders", Utc::now()),
        export_orders_csv(&rows),
    ))
}

/// GET /api/v1/merchant/ledger
pub async fn list_ledger(
    merchant: RequireMerchant,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Page<LedgerEntry>>>> {
    let rows = filtered_ledger(&state, merchant.merchant_id(), &params).await?;
    Ok(Json(DataResponse {
        data: paginate(&rows, &params.page_request()),
    }))
}

/// GET /api/v1/merchant/ledger/export
pub async fn export_ledger(
    merchant: RequireMerchant,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let rows = filtered_ledger(&state, merchant.merchant_id(), &params).await?;
    Ok(csv_attachment(
        &export_filename("Ledger", Utc::now()),
        export_ledger_csv(&rows),
    ))
}

/// GET /api/v1/merchant/van-logs
pub async fn list_van_logs(
    merchant: RequireMerchant,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Page<VanLog>>>> {
    let rows = filtered_van_logs(&state, merchant.merchant_id(), &params).await?;
    Ok(Json(DataResponse {
        data: paginate(&rows, &params.page_request()),
    }))
}

/// GET /api/v1/merchant/van-logs/export
pub async fn export_van_logs(
    merchant: RequireMerchant,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let rows = filtered_van_logs(&state, merchant.merchant_id(), &params).await?;
    Ok(csv_attachment(
        &export_filename("VAN_Logs", Utc::now()),
        export_van_logs_csv(&rows),
    ))
}

/// GET /api/v1/merchant/virtual-accounts
pub async fn list_virtual_accounts(
    merchant: RequireMerchant,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<VirtualAccount>>>> {
    let accounts = state
        .store
        .virtual_accounts(Some(merchant.merchant_id()))
        .await;
    Ok(Json(DataResponse { data: accounts }))
}

// ---------------------------------------------------------------------------
// IP whitelist
// ---------------------------------------------------------------------------

/// GET /api/v1/merchant/whitelist-ips
pub async fn list_whitelist_ips(
    merchant: RequireMerchant,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<WhitelistIp>>>> {
    let entries = state.store.whitelist_ips(merchant.merchant_id()).await;
    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/merchant/whitelist-ips
pub async fn add_whitelist_ip(
    merchant: RequireMerchant,
    State(state): State<AppState>,
    Json(input): Json<AddWhitelistIp>,
) -> AppResult<impl IntoResponse> {
    let id = merchant.merchant_id();
    let ip = parse_whitelist_ip(input.ip_address.as_deref().unwrap_or_default())?;
    if state.store.merchant(id).await.is_none() {
        return Err(CoreError::not_found("Merchant", id).into());
    }

    let entry = state.store.add_whitelist_ip(id, ip, Utc::now()).await?;
    tracing::info!(merchant = %id, ip = %entry.ip, "IP whitelisted");

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// DELETE /api/v1/merchant/whitelist-ips/{id}
pub async fn delete_whitelist_ip(
    merchant: RequireMerchant,
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .store
        .delete_whitelist_ip(merchant.merchant_id(), &entry_id)
        .await?;
    tracing::info!(merchant = %merchant.merchant_id(), entry_id = %entry_id, "Whitelisted IP removed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

/// PUT /api/v1/merchant/webhook
///
/// Set, change or (with an empty URL) remove the order status webhook.
pub async fn update_webhook(
    merchant: RequireMerchant,
    State(state): State<AppState>,
    Json(input): Json<UpdateWebhook>,
) -> AppResult<Json<DataResponse<WebhookUpdated>>> {
    let id = merchant.merchant_id();
    let url = input.webhook_url.unwrap_or_default();
    let change = state.store.set_webhook(id, &url).await?;
    let webhook_url = state.store.merchant(id).await.and_then(|m| m.webhook);

    tracing::info!(merchant = %id, change = ?change, "Webhook saved");

    Ok(Json(DataResponse {
        data: WebhookUpdated {
            change,
            message: change.message(),
            webhook_url,
        },
    }))
}

// ---------------------------------------------------------------------------
// API keys
// ---------------------------------------------------------------------------

/// GET /api/v1/merchant/api-keys
///
/// The current API key. The secret is never returned after creation.
pub async fn get_api_key(
    merchant: RequireMerchant,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ApiKeyInfo>>> {
    let id = merchant.merchant_id();
    let credential = state
        .store
        .api_credential(id)
        .await
        .ok_or_else(|| CoreError::not_found("API key", id))?;

    Ok(Json(DataResponse {
        data: ApiKeyInfo {
            api_key: credential.api_key,
            created_at: credential.created_at,
        },
    }))
}

/// POST /api/v1/merchant/api-keys
///
/// Generate a new key pair, replacing any existing one. The plaintext secret
/// is returned exactly once.
pub async fn generate_api_key(
    merchant: RequireMerchant,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let id = merchant.merchant_id();
    let generated = generate_api_credentials();
    let credential = state
        .store
        .rotate_api_credentials(id, &generated, Utc::now())
        .await?;

    tracing::info!(merchant = %id, "API credentials generated");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ApiKeyCreated {
                api_key: credential.api_key,
                api_secret: generated.api_secret,
                created_at: credential.created_at,
            },
        }),
    ))
}
