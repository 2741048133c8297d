use axum::routing::get;
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Session routes mounted at `/session`.
///
/// ```text
/// GET /context -> get_context
/// GET /route   -> check_route
/// GET /routes  -> list_routes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/context", get(session::get_context))
        .route("/route", get(session::check_route))
        .route("/routes", get(session::list_routes))
}
