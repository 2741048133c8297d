//! Admin portal routes mounted at `/admin`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/orders", get(admin::list_orders))
        .route("/orders/export", get(admin::export_orders))
        .route("/ledger/export", get(admin::export_ledger))
        .route("/transactions", get(admin::list_transactions))
        .route("/processors", get(admin::list_processors))
        .route("/services", get(admin::list_services))
        .route("/services/{name}", put(admin::toggle_service))
        .route("/van-logs", get(admin::list_van_logs))
        .route("/virtual-accounts", get(admin::list_virtual_accounts))
        .route(
            "/merchants",
            get(admin::list_merchants).post(admin::onboard_merchant),
        )
        .route("/merchants/bulk", post(admin::bulk_update_merchants))
        .route("/merchants/{id}", put(admin::update_merchant))
        .route(
            "/merchants/{id}/pricing/validate",
            post(admin::validate_pricing),
        )
        .route("/merchants/{id}/credit", post(admin::credit_wallet))
        .route("/adjustments", post(admin::create_adjustment))
}
