//! Admin portal handlers.
//!
//! All endpoints require an admin via [`RequireAdmin`]. Saves run the record
//! validators before touching the store, so a rejected edit changes nothing.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use portal_core::dashboard::{DashboardStats, OrderStats, WalletSummary};
use portal_core::error::CoreError;
use portal_core::export::{export_all_ledger_csv, export_all_orders_csv, export_filename};
use portal_core::listing::apply_filter;
use portal_core::pagination::{paginate, Page};
use portal_core::records::{
    LedgerEntry, Merchant, Order, Processor, Service, Transaction, VanLog, VirtualAccount,
};
use portal_core::types::DocName;
use portal_core::validation::{validate_pricing_rows, AdjustmentRequest, PricingRow};
use portal_core::wallet::AdjustmentOutcome;
use serde::{Deserialize, Serialize};

use super::csv_attachment;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::store::{BulkAction, CreditReceipt, MerchantUpdate};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A merchant row in the admin merchants table.
#[derive(Debug, Serialize)]
pub struct MerchantSummary {
    #[serde(flatten)]
    pub merchant: Merchant,
    pub wallet_balance: f64,
}

#[derive(Debug, Deserialize)]
pub struct OnboardMerchant {
    pub company_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PricingPayload {
    #[serde(default)]
    pub pricing: Vec<PricingRow>,
}

#[derive(Debug, Serialize)]
pub struct PricingVerdict {
    pub valid: bool,
    pub rows: usize,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdate {
    #[serde(default)]
    pub merchants: Vec<DocName>,
    pub action: BulkAction,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct BulkUpdated {
    pub updated: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreditWallet {
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct ToggleService {
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Dashboard and tables
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/dashboard
///
/// Order statistics across every merchant. The wallet line is the sum of all
/// Main wallet balances.
pub async fn dashboard(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let orders = state.store.orders(None).await;
    let balance: f64 = state
        .store
        .wallets()
        .await
        .iter()
        .map(|w| w.balances.main)
        .sum();

    Ok(Json(DataResponse {
        data: DashboardStats {
            wallet: WalletSummary {
                balance,
                status: "Active".into(),
            },
            stats: OrderStats::from_orders(&orders),
        },
    }))
}

async fn filtered_orders(state: &AppState, params: &ListParams) -> AppResult<Vec<Order>> {
    let filter = params.filter().resolve()?;
    let rows = state.store.orders(params.merchant.as_deref()).await;
    Ok(apply_filter(&rows, &filter))
}

async fn filtered_ledger(state: &AppState, params: &ListParams) -> AppResult<Vec<LedgerEntry>> {
    let filter = params.filter().resolve()?;
    let rows = state.store.ledger(params.merchant.as_deref()).await;
    Ok(apply_filter(&rows, &filter))
}

/// GET /api/v1/admin/orders
pub async fn list_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Page<Order>>>> {
    let rows = filtered_orders(&state, &params).await?;
    Ok(Json(DataResponse {
        data: paginate(&rows, &params.page_request()),
    }))
}

/// GET /api/v1/admin/orders/export
///
/// Every matching order across merchants as CSV, ignoring pagination.
pub async fn export_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let rows = filtered_orders(&state, &params).await?;
    let filename = export_filename("All_Orders", Utc::now());
    Ok(csv_attachment(&filename, export_all_orders_csv(&rows)))
}

/// GET /api/v1/admin/ledger/export
pub async fn export_ledger(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let rows = filtered_ledger(&state, &params).await?;
    let filename = export_filename("All_Ledger", Utc::now());
    Ok(csv_attachment(&filename, export_all_ledger_csv(&rows)))
}

/// GET /api/v1/admin/transactions
///
/// Bank transactions of every merchant, newest first.
pub async fn list_transactions(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Page<Transaction>>>> {
    let filter = params.filter().resolve()?;
    let rows = state.store.transactions(params.merchant.as_deref()).await;
    let rows = apply_filter(&rows, &filter);
    Ok(Json(DataResponse {
        data: paginate(&rows, &params.page_request()),
    }))
}

/// GET /api/v1/admin/van-logs
pub async fn list_van_logs(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Page<VanLog>>>> {
    let filter = params.filter().resolve()?;
    let rows = state.store.van_logs(params.merchant.as_deref()).await;
    let rows = apply_filter(&rows, &filter);
    Ok(Json(DataResponse {
        data: paginate(&rows, &params.page_request()),
    }))
}

/// GET /api/v1/admin/virtual-accounts
pub async fn list_virtual_accounts(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<VirtualAccount>>>> {
    Ok(Json(DataResponse {
        data: state.store.virtual_accounts(None).await,
    }))
}

// ---------------------------------------------------------------------------
// Processors and services
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/processors
///
/// Bank integrations. Client secrets are never included.
pub async fn list_processors(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Processor>>>> {
    Ok(Json(DataResponse {
        data: state.store.processors().await,
    }))
}

/// GET /api/v1/admin/services
pub async fn list_services(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Service>>>> {
    Ok(Json(DataResponse {
        data: state.store.services().await,
    }))
}

/// PUT /api/v1/admin/services/{name}
pub async fn toggle_service(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(input): Json<ToggleService>,
) -> AppResult<Json<DataResponse<Service>>> {
    let service = state
        .store
        .set_service_active(&name, input.is_active)
        .await?;

    tracing::info!(
        service = %service.name,
        admin = %admin.user,
        is_active = service.is_active,
        "Service toggled",
    );

    Ok(Json(DataResponse { data: service }))
}

// ---------------------------------------------------------------------------
// Merchants
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/merchants
pub async fn list_merchants(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Page<MerchantSummary>>>> {
    let filter = params.filter().resolve()?;
    let merchants: Vec<Merchant> = state
        .store
        .merchants()
        .await
        .into_iter()
        .filter(|m| filter.status.as_deref().map_or(true, |s| m.status == s))
        .collect();
    let balances: HashMap<DocName, f64> = state
        .store
        .wallets()
        .await
        .into_iter()
        .map(|w| (w.merchant, w.balances.main))
        .collect();

    let page = paginate(&merchants, &params.page_request()).map(|merchant| {
        let wallet_balance = balances.get(&merchant.id).copied().unwrap_or(0.0);
        MerchantSummary {
            merchant,
            wallet_balance,
        }
    });

    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/admin/merchants
///
/// Onboard a merchant: record, active virtual account and empty wallets.
pub async fn onboard_merchant(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<OnboardMerchant>,
) -> AppResult<impl IntoResponse> {
    let merchant = state
        .store
        .onboard_merchant(&input.company_name, &input.email)
        .await?;

    tracing::info!(merchant = %merchant.id, admin = %admin.user, "Merchant onboarded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: merchant })))
}

/// PUT /api/v1/admin/merchants/{id}
///
/// Update status, integration, webhook and pricing. The pricing table is
/// checked for invalid and overlapping ranges first.
pub async fn update_merchant(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MerchantUpdate>,
) -> AppResult<Json<DataResponse<Merchant>>> {
    let merchant = state.store.update_merchant(&id, input).await?;

    tracing::info!(
        merchant = %merchant.id,
        admin = %admin.user,
        status = %merchant.status,
        pricing_rows = merchant.pricing.len(),
        "Merchant updated",
    );

    Ok(Json(DataResponse { data: merchant }))
}

/// POST /api/v1/admin/merchants/{id}/pricing/validate
///
/// Dry-run the pricing validator without saving.
pub async fn validate_pricing(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PricingPayload>,
) -> AppResult<Json<DataResponse<PricingVerdict>>> {
    if state.store.merchant(&id).await.is_none() {
        return Err(CoreError::not_found("Merchant", id).into());
    }
    validate_pricing_rows(&input.pricing)?;

    Ok(Json(DataResponse {
        data: PricingVerdict {
            valid: true,
            rows: input.pricing.len(),
        },
    }))
}

/// POST /api/v1/admin/merchants/bulk
pub async fn bulk_update_merchants(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BulkUpdate>,
) -> AppResult<Json<DataResponse<BulkUpdated>>> {
    if input.merchants.is_empty() {
        return Err(AppError::BadRequest("No merchants selected".into()));
    }

    let updated = state
        .store
        .bulk_update_merchants(&input.merchants, input.action, &input.value)
        .await?;

    tracing::info!(
        admin = %admin.user,
        action = ?input.action,
        value = %input.value,
        updated,
        "Merchants bulk updated",
    );

    Ok(Json(DataResponse {
        data: BulkUpdated { updated },
    }))
}

// ---------------------------------------------------------------------------
// Wallets
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/merchants/{id}/credit
///
/// Recharge a merchant's Main wallet.
pub async fn credit_wallet(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreditWallet>,
) -> AppResult<Json<DataResponse<CreditReceipt>>> {
    let receipt = state
        .store
        .credit_wallet(&id, input.amount, Utc::now())
        .await?;

    tracing::info!(
        merchant = %id,
        admin = %admin.user,
        amount = input.amount,
        new_balance = receipt.new_balance,
        "Wallet credited",
    );

    Ok(Json(DataResponse { data: receipt }))
}

/// POST /api/v1/admin/adjustments
///
/// Move money between a merchant's Main and Lean wallets. An adjustment the
/// source wallet cannot cover is recorded as failed and reported with 200.
pub async fn create_adjustment(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<AdjustmentRequest>,
) -> AppResult<Json<DataResponse<AdjustmentOutcome>>> {
    let outcome = state.store.adjust_wallets(&input, Utc::now()).await?;

    tracing::info!(
        merchant = %input.merchant_id,
        admin = %admin.user,
        from = input.from.as_str(),
        to = input.to.as_str(),
        amount = input.amount,
        status = ?outcome.status,
        "Wallet adjustment applied",
    );

    Ok(Json(DataResponse { data: outcome }))
}
