//! Authentication primitives.
//!
//! Login lives with the upstream session authority; this server only
//! verifies the HS256 access tokens it issues.

pub mod jwt;
