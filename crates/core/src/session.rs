//! Session user context and portal route guarding.
//!
//! The upstream session authority tells us who the user is and which roles
//! they hold. This module turns that into a [`UserContext`] and decides, for a
//! page in one of the two portals, whether to show it or where to send the
//! user instead.

use serde::{Deserialize, Serialize};

use crate::roles::{ROLE_ADMIN, ROLE_MERCHANT, USER_ADMINISTRATOR, USER_GUEST};

/// Where unauthenticated users are sent.
pub const LOGIN_PATH: &str = "/login";

/// Who is logged in and what they may access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub user: String,
    pub roles: Vec<String>,
    pub is_admin: bool,
    pub is_merchant: bool,
}

impl UserContext {
    pub fn new(user: impl Into<String>, roles: Vec<String>) -> Self {
        let user = user.into();
        let is_admin = has_role(&roles, ROLE_ADMIN) || user == USER_ADMINISTRATOR;
        let is_merchant = has_role(&roles, ROLE_MERCHANT);
        Self {
            user,
            roles,
            is_admin,
            is_merchant,
        }
    }
}

/// Map the raw session user to a logged-in user, if any.
///
/// The anonymous `Guest` user and empty values mean nobody is logged in.
pub fn normalize_session_user(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|user| !user.is_empty() && *user != USER_GUEST)
}

fn has_role(roles: &[String], role: &str) -> bool {
    roles.iter().any(|r| r == role)
}

/// The two front-end applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Portal {
    Admin,
    Merchant,
}

impl Portal {
    /// URL prefix the portal is served under.
    pub fn base_path(self) -> &'static str {
        match self {
            Portal::Admin => "/admin",
            Portal::Merchant => "/dashboard",
        }
    }

    /// Role every protected page of this portal requires.
    pub fn audience_role(self) -> &'static str {
        match self {
            Portal::Admin => ROLE_ADMIN,
            Portal::Merchant => ROLE_MERCHANT,
        }
    }

    pub fn other(self) -> Portal {
        match self {
            Portal::Admin => Portal::Merchant,
            Portal::Merchant => Portal::Admin,
        }
    }

    /// Protected pages, relative to [`Portal::base_path`].
    pub fn routes(self) -> &'static [PortalRoute] {
        match self {
            Portal::Admin => ADMIN_ROUTES,
            Portal::Merchant => MERCHANT_ROUTES,
        }
    }

    /// Role required to open `path`, or `None` for public pages.
    ///
    /// Login, error and unknown pages are public.
    pub fn required_role_for(self, path: &str) -> Option<&'static str> {
        let path = normalize_path(path);
        self.routes()
            .iter()
            .find(|route| route.path == path)
            .map(|_| self.audience_role())
    }
}

/// A protected page of a portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortalRoute {
    pub path: &'static str,
    pub name: &'static str,
}

const ADMIN_ROUTES: &[PortalRoute] = &[
    PortalRoute { path: "/", name: "Dashboard" },
    PortalRoute { path: "/orders", name: "Orders" },
    PortalRoute { path: "/transactions", name: "Transactions" },
    PortalRoute { path: "/merchants", name: "Merchants" },
    PortalRoute { path: "/processors", name: "Processors" },
    PortalRoute { path: "/services", name: "Services" },
    PortalRoute { path: "/van-logs", name: "VANLogs" },
    PortalRoute { path: "/virtual-accounts", name: "VirtualAccounts" },
    PortalRoute { path: "/settings", name: "Settings" },
];

const MERCHANT_ROUTES: &[PortalRoute] = &[
    PortalRoute { path: "/", name: "Dashboard" },
    PortalRoute { path: "/orders", name: "Orders" },
    PortalRoute { path: "/ledger", name: "Ledger" },
    PortalRoute { path: "/van-logs", name: "VANLogs" },
    PortalRoute { path: "/virtual-accounts", name: "VirtualAccounts" },
    PortalRoute { path: "/support", name: "Support" },
    PortalRoute { path: "/settings", name: "Settings" },
];

fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Outcome of guarding a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Show the requested page.
    Allow,
    /// Navigate within the current portal.
    RedirectTo(String),
    /// Leave the current portal (full page load).
    ExternalRedirect(String),
}

/// Decide what happens when a user navigates to a page of `portal`.
///
/// A user lacking the page's role is bounced to the portal matching their own
/// role: the current one stays an in-app redirect, the other one is a full
/// page load. Users with neither portal role go back to login.
pub fn decide_route(
    is_logged_in: bool,
    roles: &[String],
    required_role: Option<&str>,
    portal: Portal,
) -> RouteDecision {
    let Some(required) = required_role else {
        return RouteDecision::Allow;
    };

    if !is_logged_in {
        return RouteDecision::ExternalRedirect(LOGIN_PATH.to_string());
    }

    if has_role(roles, required) {
        return RouteDecision::Allow;
    }

    if has_role(roles, portal.audience_role()) {
        return RouteDecision::RedirectTo(portal.base_path().to_string());
    }

    let other = portal.other();
    if has_role(roles, other.audience_role()) {
        return RouteDecision::ExternalRedirect(other.base_path().to_string());
    }

    RouteDecision::ExternalRedirect(LOGIN_PATH.to_string())
}
