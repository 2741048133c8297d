//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose roles do not
//! grant access to the portal.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use portal_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires an admin: the `Admin` role or the `Administrator` user.
/// Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.context().is_admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `Merchant` role. The user name is the merchant id.
pub struct RequireMerchant(pub AuthUser);

impl RequireMerchant {
    pub fn merchant_id(&self) -> &str {
        &self.0.user
    }
}

impl FromRequestParts<AppState> for RequireMerchant {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.context().is_merchant {
            return Err(AppError::Core(CoreError::Forbidden(
                "Merchant role required".into(),
            )));
        }
        Ok(RequireMerchant(user))
    }
}
