//! IP whitelist rules for the payout API.

use std::net::IpAddr;

use crate::error::CoreError;
use crate::records::WhitelistIp;

/// Parse a submitted whitelist address.
///
/// The value is required and must be a plain IPv4 or IPv6 literal. The
/// canonical text form is what gets stored, so `::0001` and `::1` collide.
pub fn parse_whitelist_ip(raw: &str) -> Result<IpAddr, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("IP Address is required".into()));
    }
    trimmed
        .parse::<IpAddr>()
        .map_err(|_| CoreError::Validation(format!("Invalid IP address: {trimmed}")))
}

/// Reject an address the merchant has already whitelisted.
pub fn ensure_not_whitelisted(existing: &[WhitelistIp], ip: &IpAddr) -> Result<(), CoreError> {
    let candidate = ip.to_string();
    if existing.iter().any(|entry| entry.ip == candidate) {
        return Err(CoreError::Conflict("IP address already whitelisted".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn entry(ip: &str) -> WhitelistIp {
        WhitelistIp {
            id: format!("WIP-{ip}"),
            merchant: "acme@example.com".into(),
            ip: ip.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn blank_address_is_required() {
        assert_matches!(
            parse_whitelist_ip("   "),
            Err(CoreError::Validation(msg)) if msg == "IP Address is required"
        );
    }

    #[test]
    fn accepts_v4_and_v6() {
        assert_eq!(
            parse_whitelist_ip(" 203.0.113.7 ").unwrap().to_string(),
            "203.0.113.7"
        );
        assert_eq!(parse_whitelist_ip("::0001").unwrap().to_string(), "::1");
    }

    #[test]
    fn rejects_hostnames_and_cidr() {
        assert_matches!(parse_whitelist_ip("example.com"), Err(CoreError::Validation(_)));
        assert_matches!(parse_whitelist_ip("10.0.0.0/8"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn duplicate_address_conflicts() {
        let existing = vec![entry("203.0.113.7")];
        let ip = parse_whitelist_ip("203.0.113.7").unwrap();
        assert_matches!(
            ensure_not_whitelisted(&existing, &ip),
            Err(CoreError::Conflict(_))
        );

        let other = parse_whitelist_ip("203.0.113.8").unwrap();
        assert!(ensure_not_whitelisted(&existing, &other).is_ok());
    }
}
