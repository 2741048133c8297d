//! Merchant portal routes mounted at `/merchant`.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::merchant;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(merchant::dashboard))
        .route(
            "/profile",
            get(merchant::get_profile).put(merchant::update_profile),
        )
        .route("/orders", get(merchant::list_orders))
        .route("/orders/export", get(merchant::export_orders))
        .route("/ledger", get(merchant::list_ledger))
        .route("/ledger/export", get(merchant::export_ledger))
        .route("/van-logs", get(merchant::list_van_logs))
        .route("/van-logs/export", get(merchant::export_van_logs))
        .route("/virtual-accounts", get(merchant::list_virtual_accounts))
        .route(
            "/whitelist-ips",
            get(merchant::list_whitelist_ips).post(merchant::add_whitelist_ip),
        )
        .route("/whitelist-ips/{id}", delete(merchant::delete_whitelist_ip))
        .route("/webhook", put(merchant::update_webhook))
        .route(
            "/api-keys",
            get(merchant::get_api_key).post(merchant::generate_api_key),
        )
}
