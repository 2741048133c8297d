#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use portal_api::auth::jwt::{generate_access_token, JwtConfig};
use portal_api::config::ServerConfig;
use portal_api::notifications::WebhookDispatcher;
use portal_api::router::build_app_router;
use portal_api::state::AppState;
use portal_api::store::{PortalStore, SeedData};
use portal_core::records::{
    LedgerEntry, Merchant, Order, Processor, Service, Transaction, VanLog, VirtualAccount, Wallet,
    WhitelistIp,
};
use portal_core::types::Timestamp;
use portal_core::wallet::WalletBalances;

pub const ACME: &str = "acme@example.com";
pub const GLOBEX: &str = "globex@example.com";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        seed_data_path: None,
        portal_base_url: String::new(),
        webhook_signing_secret: None,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

fn at(day: u32, hour: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
}

pub fn merchant(id: &str, name: &str, status: &str) -> Merchant {
    Merchant {
        id: id.into(),
        company_name: name.into(),
        company_email: id.into(),
        contact_detail: None,
        website: None,
        gstin: None,
        pancard: None,
        status: status.into(),
        integration: None,
        webhook: None,
        pricing: Vec::new(),
    }
}

fn order(id: &str, merchant: &str, status: &str, amount: f64, day: u32) -> Order {
    Order {
        id: id.into(),
        merchant: merchant.into(),
        customer_name: Some("Jane Doe".into()),
        order_amount: amount,
        tax: None,
        transaction_amount: Some(amount + 5.0),
        fee: 5.0,
        status: status.into(),
        utr: None,
        client_ref_id: Some(format!("REF-{id}")),
        created_at: at(day, 10),
    }
}

fn transaction(id: &str, order_id: &str, merchant: &str, status: &str, day: u32) -> Transaction {
    Transaction {
        id: id.into(),
        order_id: order_id.into(),
        merchant: merchant.into(),
        product: Some("IMPS".into()),
        amount: 100.0,
        status: status.into(),
        utr: None,
        integration: Some("BANK-A".into()),
        created_at: at(day, 11),
    }
}

fn service(name: &str, is_active: bool) -> Service {
    Service {
        name: name.into(),
        product_name: name.into(),
        is_active,
    }
}

/// Two merchants with wallets, orders, ledger, VAN logs and accounts.
///
/// Acme: Main 1000 / Lean 200, orders ORD-1 (Processed), ORD-2 (Pending),
/// ORD-3 (Queued). Globex: Main 50, one Pending order ORD-9. Bank
/// transactions TXN-1 (Success), TXN-2 (Processing) and TXN-9 (Processing)
/// back ORD-1, ORD-2 and ORD-9.
pub fn seed() -> SeedData {
    SeedData {
        merchants: vec![
            merchant(ACME, "Acme Payouts", "Approved"),
            merchant(GLOBEX, "Globex", "Submitted"),
        ],
        wallets: vec![
            Wallet {
                merchant: ACME.into(),
                balances: WalletBalances {
                    main: 1000.0,
                    lean: 200.0,
                },
                status: "Active".into(),
            },
            Wallet {
                merchant: GLOBEX.into(),
                balances: WalletBalances {
                    main: 50.0,
                    lean: 0.0,
                },
                status: "Active".into(),
            },
        ],
        orders: vec![
            order("ORD-1", ACME, "Processed", 100.0, 1),
            order("ORD-2", ACME, "Pending", 200.0, 2),
            order("ORD-3", ACME, "Queued", 300.0, 3),
            order("ORD-9", GLOBEX, "Pending", 40.0, 4),
        ],
        transactions: vec![
            transaction("TXN-1", "ORD-1", ACME, "Success", 1),
            transaction("TXN-2", "ORD-2", ACME, "Processing", 2),
            transaction("TXN-9", "ORD-9", GLOBEX, "Processing", 4),
        ],
        ledger: vec![LedgerEntry {
            id: "LED-1".into(),
            owner: ACME.into(),
            order_id: Some("ORD-1".into()),
            transaction_type: "Debit".into(),
            transaction_amount: 105.0,
            opening_balance: 1105.0,
            closing_balance: 1000.0,
            client_ref_id: Some("REF-ORD-1".into()),
            created_at: at(1, 10),
        }],
        van_logs: vec![VanLog {
            id: "VAN-1".into(),
            merchant: ACME.into(),
            account_number: "19685000001".into(),
            amount: 500.0,
            transaction_type: "Credit".into(),
            utr: Some("UTR-500".into()),
            status: "Success".into(),
            remitter_name: Some("Acme Treasury".into()),
            remitter_account_number: None,
            remitter_ifsc_code: None,
            opening_balance: Some(500.0),
            closing_balance: Some(1000.0),
            created_at: at(1, 9),
        }],
        virtual_accounts: vec![
            VirtualAccount {
                name: "VA-1".into(),
                merchant: ACME.into(),
                account_number: "19685000001".into(),
                ifsc: Some("PORT0000001".into()),
                status: "Active".into(),
                prefix: Some("19685".into()),
            },
            VirtualAccount {
                name: "VA-2".into(),
                merchant: GLOBEX.into(),
                account_number: "19685000002".into(),
                ifsc: None,
                status: "Inactive".into(),
                prefix: Some("19685".into()),
            },
        ],
        whitelist_ips: vec![WhitelistIp {
            id: "WIP-1".into(),
            merchant: ACME.into(),
            ip: "10.0.0.1".into(),
            created_at: at(1, 8),
        }],
        services: vec![service("NEFT", false), service("IMPS", true)],
        processors: vec![Processor {
            name: "BANK-A".into(),
            integration_name: "Bank A Payouts".into(),
            integration_type: Some("Payout".into()),
            api_endpoint: Some("https://bank-a.example/api".into()),
            client_id: Some("client-a".into()),
            secret_key: Some("bank-a-secret".into()),
            is_active: true,
            products: vec!["IMPS".into(), "NEFT".into()],
        }],
    }
}

/// Build the full application router over the seeded store.
pub fn build_test_app() -> Router {
    build_test_app_with_store(Arc::new(PortalStore::from_seed(seed())))
}

/// Build the full application router over `store`, so tests can inspect it
/// after requests.
///
/// Uses the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) as production.
pub fn build_test_app_with_store(store: Arc<PortalStore>) -> Router {
    build_test_app_with_config(store, test_config())
}

pub fn build_test_app_with_config(store: Arc<PortalStore>, config: ServerConfig) -> Router {
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        webhooks: Arc::new(WebhookDispatcher::new(
            config.webhook_signing_secret.clone(),
        )),
    };
    build_app_router(state, &config)
}

/// Mint an access token accepted by [`test_config`].
pub fn token_for(user: &str, roles: &[&str]) -> String {
    let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
    generate_access_token(user, &roles, &test_config().jwt).unwrap()
}

pub fn admin_token() -> String {
    token_for("ops@example.com", &["Admin"])
}

pub fn merchant_token(merchant: &str) -> String {
    token_for(merchant, &["Merchant"])
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
