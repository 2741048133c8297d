//! Outgoing merchant notifications.

pub mod webhook;

pub use webhook::{WebhookDispatcher, WebhookError};
