//! Session secret fingerprinting for operational visibility.
//!
//! Provides a truncated SHA-256 fingerprint of the session secret, enabling
//! operators to verify which secret is active without exposing the secret
//! itself. Fingerprints are logged on startup.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Generate a truncated SHA-256 fingerprint of the session secret.
///
/// Returns the first 8 bytes of the hash as a 16-character hex string.
///
/// # Examples
///
/// ```rust
/// use secrecy::SecretString;
/// use wp_uploader::inbound::http::session_config::fingerprint::secret_fingerprint;
///
/// let fp = secret_fingerprint(&SecretString::from("example secret"));
///
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &SecretString) -> String {
    let digest = Sha256::digest(secret.expose_secret().as_bytes());
    hex::encode(digest.iter().take(FINGERPRINT_BYTES).copied().collect::<Vec<u8>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fingerprint_is_deterministic() {
        let secret = SecretString::from("a".repeat(32));
        assert_eq!(secret_fingerprint(&secret), secret_fingerprint(&secret));
    }

    #[rstest]
    fn fingerprint_is_short_lowercase_hex() {
        let fp = secret_fingerprint(&SecretString::from("b".repeat(32)));

        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, fp.to_lowercase());
    }

    #[rstest]
    fn different_secrets_produce_different_fingerprints() {
        let first = secret_fingerprint(&SecretString::from("a".repeat(32)));
        let second = secret_fingerprint(&SecretString::from("b".repeat(32)));
        assert_ne!(first, second);
    }

    #[rstest]
    fn fingerprint_does_not_contain_the_secret() {
        let secret = "0123456789abcdef0123456789abcdef";
        let fp = secret_fingerprint(&SecretString::from(secret));
        assert!(!secret.contains(&fp));
    }
}
