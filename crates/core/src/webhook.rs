//! Merchant webhook registration and notification payloads.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use validator::ValidateUrl;

use crate::error::CoreError;
use crate::records::Order;

/// Header carrying the payload signature on outgoing notifications.
pub const SIGNATURE_HEADER: &str = "X-Portal-Signature";

/// Transaction statuses that trigger a merchant notification.
const NOTIFY_STATUSES: &[&str] = &["Success", "Failed", "Reversed"];

/// Check a webhook URL submitted by a merchant or admin.
///
/// Blank input is allowed here; it means "remove the webhook". Anything else
/// must be an absolute `http` or `https` URL.
pub fn validate_webhook_url(raw: &str) -> Result<(), CoreError> {
    let url = raw.trim();
    if url.is_empty() {
        return Ok(());
    }

    let lower = url.to_ascii_lowercase();
    let has_scheme = lower.starts_with("http://") || lower.starts_with("https://");
    if !has_scheme || !url.to_string().validate_url() {
        return Err(CoreError::Validation(format!("Invalid webhook URL: {url}")));
    }
    Ok(())
}

/// What saving a webhook URL will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookChange {
    Removed,
    Created,
    Updated,
    Unchanged,
}

impl WebhookChange {
    pub fn message(self) -> &'static str {
        match self {
            WebhookChange::Removed => "Webhook removed",
            WebhookChange::Created => "Webhook created successfully",
            WebhookChange::Updated => "Webhook updated successfully",
            WebhookChange::Unchanged => "Webhook unchanged",
        }
    }
}

/// Decide how a webhook save applies.
///
/// `current` is the URL on file and `registered` whether a webhook record
/// exists at all. A blank `new` URL removes the registration.
pub fn plan_webhook_change(current: Option<&str>, registered: bool, new: &str) -> WebhookChange {
    let new = new.trim();
    if new.is_empty() {
        return WebhookChange::Removed;
    }
    if !registered {
        return WebhookChange::Created;
    }
    match current {
        Some(url) if url.trim() == new => WebhookChange::Unchanged,
        _ => WebhookChange::Updated,
    }
}

/// Body posted to a merchant's webhook when an order settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// The order id.
    pub crn: String,
    /// Bank reference for the transaction, if any.
    pub utr: Option<String>,
    pub status: String,
    #[serde(rename = "clientRefID")]
    pub client_ref_id: Option<String>,
}

impl WebhookPayload {
    pub fn for_order(order: &Order, transaction_status: &str) -> Self {
        Self {
            crn: order.id.clone(),
            utr: order.utr.clone(),
            status: transaction_status.to_string(),
            client_ref_id: order.client_ref_id.clone(),
        }
    }
}

/// Whether a transaction moving to `status` should be reported to the merchant.
pub fn should_notify(status: &str) -> bool {
    NOTIFY_STATUSES.contains(&status)
}

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 of `body` keyed by `secret`, hex encoded.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    // -- URL validation -----------------------------------------------------

    #[test]
    fn blank_url_means_removal_and_is_accepted() {
        assert!(validate_webhook_url("").is_ok());
        assert!(validate_webhook_url("   ").is_ok());
    }

    #[test]
    fn http_and_https_urls_are_accepted() {
        assert!(validate_webhook_url("https://merchant.example.com/hooks/payout").is_ok());
        assert!(validate_webhook_url("http://10.0.0.5:8080/cb").is_ok());
    }

    #[test]
    fn other_schemes_and_garbage_are_rejected() {
        assert_matches!(
            validate_webhook_url("ftp://example.com/drop"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(validate_webhook_url("not a url"), Err(CoreError::Validation(_)));
        assert_matches!(validate_webhook_url("example.com/cb"), Err(CoreError::Validation(_)));
    }

    // -- Change planning ----------------------------------------------------

    #[test]
    fn plan_covers_every_transition() {
        let url = "https://a.example.com/cb";
        assert_eq!(plan_webhook_change(Some(url), true, ""), WebhookChange::Removed);
        assert_eq!(plan_webhook_change(None, false, url), WebhookChange::Created);
        assert_eq!(
            plan_webhook_change(Some(url), true, "https://b.example.com/cb"),
            WebhookChange::Updated
        );
        assert_eq!(plan_webhook_change(Some(url), true, url), WebhookChange::Unchanged);
    }

    #[test]
    fn change_messages() {
        assert_eq!(WebhookChange::Removed.message(), "Webhook removed");
        assert_eq!(WebhookChange::Created.message(), "Webhook created successfully");
        assert_eq!(WebhookChange::Updated.message(), "Webhook updated successfully");
        assert_eq!(WebhookChange::Unchanged.message(), "Webhook unchanged");
    }

    // -- Payload ------------------------------------------------------------

    #[test]
    fn payload_uses_client_ref_id_casing() {
        let order = Order {
            id: "ORD-0001".into(),
            merchant: "acme@example.com".into(),
            customer_name: None,
            order_amount: 500.0,
            tax: None,
            transaction_amount: None,
            fee: 5.0,
            status: "Processed".into(),
            utr: Some("UTR123".into()),
            client_ref_id: Some("ACME-77".into()),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(WebhookPayload::for_order(&order, "Success")).unwrap();
        assert_eq!(json["crn"], "ORD-0001");
        assert_eq!(json["utr"], "UTR123");
        assert_eq!(json["status"], "Success");
        assert_eq!(json["clientRefID"], "ACME-77");
    }

    #[test]
    fn only_final_statuses_notify() {
        assert!(should_notify("Success"));
        assert!(should_notify("Failed"));
        assert!(should_notify("Reversed"));
        assert!(!should_notify("Pending"));
        assert!(!should_notify("Processing"));
    }

    // -- Signing ------------------------------------------------------------

    #[test]
    fn signature_is_deterministic_hex() {
        let a = sign_payload("secret", b"{\"crn\":\"ORD-1\"}");
        let b = sign_payload("secret", b"{\"crn\":\"ORD-1\"}");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_depends_on_secret_and_body() {
        let base = sign_payload("secret", b"body");
        assert_ne!(base, sign_payload("other", b"body"));
        assert_ne!(base, sign_payload("secret", b"body2"));
    }
}
