//! Webhook signature verification.
//!
//! The processor signs the raw request body with HMAC-SHA256 keyed by the
//! merchant secret and sends the hex digest in a header. Verification runs
//! over the bytes exactly as received, before any JSON parsing.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Verifier for processor webhook signatures.
pub struct WebhookVerifier {
    secret: SecretString,
}

impl WebhookVerifier {
    /// Creates a verifier keyed by the secret of the configured mode.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Checks the signature header against the payload.
    ///
    /// Fails closed: a missing, empty, non-hex or mismatching signature, or an
    /// unset secret, all yield `WebhookError::Unauthorized`.
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<(), WebhookError> {
        let provided = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::Unauthorized)?;
        let provided = hex::decode(provided).map_err(|_| WebhookError::Unauthorized)?;

        let expected = compute_signature(self.secret.expose_secret(), payload)?;

        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookError::Unauthorized);
        }
        Ok(())
    }
}

/// Hex HMAC-SHA256 of `payload` under `secret`, as the processor sends it.
pub fn sign_payload(secret: &str, payload: &[u8]) -> Result<String, WebhookError> {
    compute_signature(secret, payload).map(hex::encode)
}

fn compute_signature(secret: &str, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    if secret.is_empty() {
        return Err(WebhookError::Unauthorized);
    }
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::Unauthorized)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "sk_sandbox_webhook_secret";
    const PAYLOAD: &str = r#"{"order_id":1,"status":"completed","transaction_id":"tx_1"}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(SecretString::new(TEST_SECRET.to_string()))
    }

    fn signature() -> String {
        sign_payload(TEST_SECRET, PAYLOAD.as_bytes()).unwrap()
    }

    #[test]
    fn valid_signature_is_accepted() {
        assert!(verifier().verify(PAYLOAD.as_bytes(), Some(&signature())).is_ok());
    }

    #[test]
    fn uppercase_hex_signature_is_accepted() {
        let upper = signature().to_uppercase();
        assert!(verifier().verify(PAYLOAD.as_bytes(), Some(&upper)).is_ok());
    }

    #[test]
    fn known_vector_matches() {
        // RFC 4231 test case 2
        let sig = sign_payload("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            sig,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn missing_or_empty_signature_is_rejected() {
        for sig in [None, Some(""), Some("   ")] {
            assert!(matches!(
                verifier().verify(PAYLOAD.as_bytes(), sig),
                Err(WebhookError::Unauthorized)
            ));
        }
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        assert!(matches!(
            verifier().verify(PAYLOAD.as_bytes(), Some("not-hex")),
            Err(WebhookError::Unauthorized)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = WebhookVerifier::new(SecretString::new("other".to_string()));
        assert!(matches!(
            verifier.verify(PAYLOAD.as_bytes(), Some(&signature())),
            Err(WebhookError::Unauthorized)
        ));
    }

    #[test]
    fn empty_secret_fails_closed() {
        let verifier = WebhookVerifier::new(SecretString::new(String::new()));
        let sig = sign_payload("x", PAYLOAD.as_bytes()).unwrap();
        assert!(matches!(
            verifier.verify(PAYLOAD.as_bytes(), Some(&sig)),
            Err(WebhookError::Unauthorized)
        ));
    }

    #[test]
    fn any_single_byte_payload_mutation_is_rejected() {
        let sig = signature();
        let original = PAYLOAD.as_bytes();
        for i in 0..original.len() {
            let mut mutated = original.to_vec();
            mutated[i] ^= 0x01;
            assert!(
                matches!(
                    verifier().verify(&mutated, Some(&sig)),
                    Err(WebhookError::Unauthorized)
                ),
                "mutation at byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn any_single_byte_signature_mutation_is_rejected() {
        let sig_bytes = hex::decode(signature()).unwrap();
        for i in 0..sig_bytes.len() {
            let mut mutated = sig_bytes.clone();
            mutated[i] ^= 0x80;
            let mutated_hex = hex::encode(mutated);
            assert!(matches!(
                verifier().verify(PAYLOAD.as_bytes(), Some(&mutated_hex)),
                Err(WebhookError::Unauthorized)
            ));
        }
    }

    #[test]
    fn truncated_signature_is_rejected() {
        let sig = signature();
        assert!(matches!(
            verifier().verify(PAYLOAD.as_bytes(), Some(&sig[..sig.len() - 2])),
            Err(WebhookError::Unauthorized)
        ));
    }

    #[test]
    fn constant_time_compare_behaves_like_equality() {
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 4]));
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2]));
        assert!(constant_time_compare(&[], &[]));
    }
}
