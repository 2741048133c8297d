//! Bank status callbacks for payout orders.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use portal_core::settlement::BankStatus;
use portal_core::webhook::{should_notify, WebhookPayload};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Callback body. Accepts the bank's own field names as aliases.
#[derive(Debug, Deserialize)]
pub struct BankCallback {
    #[serde(alias = "txnStatus")]
    pub status: BankStatus,
    #[serde(default, alias = "rrn")]
    pub utr: Option<String>,
    #[serde(default, alias = "messageText")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CallbackResult {
    pub order_id: String,
    pub order_status: String,
    pub transaction_status: &'static str,
    pub refunded: Option<f64>,
    pub webhook_queued: bool,
}

/// POST /api/v1/callbacks/orders/{id}/status
///
/// Settle an in-flight order from the bank's final status. Success marks it
/// processed; failure reverses it and refunds the merchant. The merchant's
/// webhook, if any, is notified in the background.
pub async fn order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(input): Json<BankCallback>,
) -> AppResult<Json<DataResponse<CallbackResult>>> {
    let settled = state
        .store
        .settle_order(&order_id, input.status, input.utr.as_deref(), Utc::now())
        .await?;

    let transaction_status = settled.settlement.transaction_status;
    tracing::info!(
        order_id = %order_id,
        bank_status = ?input.status,
        order_status = %settled.order.status,
        remark = input.message.as_deref().unwrap_or(""),
        "Bank callback applied",
    );

    let webhook_queued = match settled.webhook_url {
        Some(url) if should_notify(transaction_status) => {
            let payload = WebhookPayload::for_order(&settled.order, transaction_status);
            state.webhooks.dispatch(url, payload);
            true
        }
        _ => false,
    };

    Ok(Json(DataResponse {
        data: CallbackResult {
            order_id: settled.order.id,
            order_status: settled.order.status,
            transaction_status,
            refunded: settled.settlement.refund.map(|r| r.amount),
            webhook_queued,
        },
    }))
}
