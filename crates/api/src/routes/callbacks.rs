use axum::routing::post;
use axum::Router;

use crate::handlers::callbacks;
use crate::state::AppState;

/// Bank callback routes mounted at `/callbacks`. No authentication.
pub fn router() -> Router<AppState> {
    Router::new().route("/orders/{id}/status", post(callbacks::order_status))
}
