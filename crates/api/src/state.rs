use std::sync::Arc;

use crate::config::ServerConfig;
use crate::notifications::WebhookDispatcher;
use crate::store::PortalStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// In-memory portal documents.
    pub store: Arc<PortalStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outgoing merchant webhook delivery.
    pub webhooks: Arc<WebhookDispatcher>,
}
