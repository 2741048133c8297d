//! Domain logic for the merchant and admin payment portals.
//!
//! Everything in this crate is pure: no database, no HTTP, no logging. The
//! API crate owns I/O and calls into these modules before it mutates state.

pub mod api_keys;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod listing;
pub mod pagination;
pub mod records;
pub mod roles;
pub mod session;
pub mod settlement;
pub mod types;
pub mod validation;
pub mod wallet;
pub mod webhook;
pub mod whitelist;
