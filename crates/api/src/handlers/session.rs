//! Session context and portal route guarding.

use axum::extract::{Query, State};
use axum::Json;
use portal_core::session::{decide_route, Portal, PortalRoute, RouteDecision, UserContext};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub portal: Portal,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PortalQuery {
    pub portal: Portal,
}

/// Guard verdict for one navigation.
#[derive(Debug, Serialize)]
pub struct RouteCheck {
    pub portal: Portal,
    pub path: String,
    pub required_role: Option<&'static str>,
    pub decision: RouteDecision,
}

/// GET /api/v1/session/context
///
/// Who the caller is and which portals they may use.
pub async fn get_context(user: AuthUser) -> AppResult<Json<DataResponse<UserContext>>> {
    Ok(Json(DataResponse {
        data: user.context(),
    }))
}

/// GET /api/v1/session/route?portal=admin&path=/orders
///
/// Decide whether the caller may open a portal page, or where to send them.
/// Anonymous callers are allowed; they are sent to login for protected pages.
pub async fn check_route(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(query): Query<RouteQuery>,
) -> AppResult<Json<DataResponse<RouteCheck>>> {
    let path = query.path.unwrap_or_else(|| "/".to_string());
    let required_role = query.portal.required_role_for(&path);
    let roles = user.as_ref().map(|u| u.roles.clone()).unwrap_or_default();

    let decision = match decide_route(user.is_some(), &roles, required_role, query.portal) {
        RouteDecision::ExternalRedirect(target) => {
            RouteDecision::ExternalRedirect(format!("{}{target}", state.config.portal_base_url))
        }
        other => other,
    };

    tracing::debug!(
        portal = ?query.portal,
        path = %path,
        user = user.as_ref().map(|u| u.user.as_str()),
        decision = ?decision,
        "Route checked",
    );

    Ok(Json(DataResponse {
        data: RouteCheck {
            portal: query.portal,
            path,
            required_role,
            decision,
        },
    }))
}

/// GET /api/v1/session/routes?portal=merchant
///
/// Protected pages of a portal.
pub async fn list_routes(
    Query(query): Query<PortalQuery>,
) -> AppResult<Json<DataResponse<&'static [PortalRoute]>>> {
    Ok(Json(DataResponse {
        data: query.portal.routes(),
    }))
}
