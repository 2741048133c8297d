//! Merchant API credential generation.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the public API key.
pub const API_KEY_LENGTH: usize = 30;

/// Length of the API secret.
pub const API_SECRET_LENGTH: usize = 15;

/// A freshly generated key pair.
pub struct GeneratedCredentials {
    pub api_key: String,
    /// Shown to the merchant exactly once, never stored.
    pub api_secret: String,
    /// SHA-256 hex digest of `api_secret` (stored).
    pub secret_hash: String,
}

/// Generate a new API key and secret.
///
/// Regenerating replaces any previous pair, so old secrets stop verifying.
pub fn generate_api_credentials() -> GeneratedCredentials {
    let api_key = random_alphanumeric(API_KEY_LENGTH);
    let api_secret = random_alphanumeric(API_SECRET_LENGTH);
    let secret_hash = hash_api_secret(&api_secret);

    GeneratedCredentials {
        api_key,
        api_secret,
        secret_hash,
    }
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// SHA-256 hex digest of a secret, as stored.
pub fn hash_api_secret(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}

/// Check a presented secret against the stored hash.
pub fn verify_api_secret(secret: &str, stored_hash: &str) -> bool {
    hash_api_secret(secret) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_have_expected_lengths() {
        let creds = generate_api_credentials();
        assert_eq!(creds.api_key.len(), API_KEY_LENGTH);
        assert_eq!(creds.api_secret.len(), API_SECRET_LENGTH);
        assert_eq!(creds.secret_hash.len(), 64);
    }

    #[test]
    fn hash_is_lowercase_sha256_hex() {
        assert_eq!(
            hash_api_secret(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn credentials_are_alphanumeric() {
        let creds = generate_api_credentials();
        assert!(creds.api_key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(creds.api_secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn stored_hash_verifies_only_the_issued_secret() {
        let creds = generate_api_credentials();
        assert!(verify_api_secret(&creds.api_secret, &creds.secret_hash));
        assert!(!verify_api_secret("not-the-secret", &creds.secret_hash));
    }

    #[test]
    fn regeneration_yields_a_new_pair() {
        let a = generate_api_credentials();
        let b = generate_api_credentials();
        assert_ne!(a.api_key, b.api_key);
        assert_ne!(a.secret_hash, b.secret_hash);
    }
}
