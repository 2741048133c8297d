//! Well-known role and user name constants.
//!
//! These must match the role names issued by the upstream session authority.

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_MERCHANT: &str = "Merchant";

/// Built-in superuser. Treated as an admin regardless of assigned roles.
pub const USER_ADMINISTRATOR: &str = "Administrator";

/// Anonymous session user.
pub const USER_GUEST: &str = "Guest";
