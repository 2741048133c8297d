pub mod admin;
pub mod callbacks;
pub mod health;
pub mod merchant;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /session/context                        caller's user context (auth)
/// /session/route                          portal route guard (optional auth)
/// /session/routes                         protected pages of a portal
///
/// /merchant/dashboard                     wallet + order stats (merchant)
/// /merchant/orders                        list; /export for CSV
/// /merchant/ledger                        list; /export for CSV
/// /merchant/van-logs                      list; /export for CSV
/// /merchant/virtual-accounts              list
/// /merchant/whitelist-ips                 list, add
/// /merchant/whitelist-ips/{id}            delete
/// /merchant/webhook                       set / remove (PUT)
/// /merchant/api-keys                      get, generate
///
/// /admin/dashboard                        global stats (admin)
/// /admin/orders                           list
/// /admin/van-logs                         list
/// /admin/virtual-accounts                 list
/// /admin/merchants                        list, onboard
/// /admin/merchants/bulk                   bulk status / integration (POST)
/// /admin/merchants/{id}                   update (PUT)
/// /admin/merchants/{id}/pricing/validate  pricing dry run (POST)
/// /admin/merchants/{id}/credit            wallet recharge (POST)
/// /admin/adjustments                      Main/Lean transfer (POST)
///
/// /callbacks/orders/{id}/status           bank status callback (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/session", session::router())
        .nest("/merchant", merchant::router())
        .nest("/admin", admin::router())
        .nest("/callbacks", callbacks::router())
}
