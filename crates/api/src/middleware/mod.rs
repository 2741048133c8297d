//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`auth::MaybeAuthUser`] -- Same, but anonymous requests are allowed.
//! - [`rbac::RequireAdmin`] -- Requires an admin (role `Admin` or `Administrator`).
//! - [`rbac::RequireMerchant`] -- Requires the `Merchant` role.

pub mod auth;
pub mod rbac;
