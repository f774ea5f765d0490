//! LINE webhook signature verification.
//!
//! LINE signs every webhook request with HMAC-SHA256 keyed by the channel
//! secret over the raw request body, and sends the base64 digest in the
//! `x-line-signature` header.
//! Reference: https://developers.line.biz/en/reference/messaging-api/#signature-validation

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Compute the base64 HMAC-SHA256 signature LINE would send for `body`.
pub fn compute_line_signature(channel_secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes()).ok()?;
    mac.update(body);
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verify a LINE webhook signature.
///
/// `body` must be the request body exactly as received. Re-serializing a
/// parsed payload changes whitespace and key order and breaks the digest.
///
/// Returns `true` only when the header is present and matches.
pub fn verify_line_signature(channel_secret: &str, body: &[u8], signature: Option<&str>) -> bool {
    let signature = match signature.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => {
            warn!(body_length = body.len(), "line_signature_missing");
            return false;
        }
    };

    let expected_signature = match compute_line_signature(channel_secret, body) {
        Some(s) => s,
        None => {
            warn!("line_signature_invalid_key");
            return false;
        }
    };

    // Constant-time comparison to prevent timing attacks
    let valid = constant_time_compare(&expected_signature, signature);

    if !valid {
        warn!(
            expected_length = expected_signature.len(),
            actual_length = signature.len(),
            body_length = body.len(),
            "line_signature_mismatch"
        );
    }

    valid
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-channel-secret";
    const BODY: &[u8] = br#"{"destination":"Uxxx","events":[]}"#;

    #[test]
    fn test_verify_signature_missing_header() {
        assert!(!verify_line_signature(SECRET, BODY, None));
        assert!(!verify_line_signature(SECRET, BODY, Some("")));
        assert!(!verify_line_signature(SECRET, BODY, Some("   ")));
    }

    #[test]
    fn test_verify_signature_valid() {
        let signature = compute_line_signature(SECRET, BODY).unwrap();
        assert!(verify_line_signature(SECRET, BODY, Some(&signature)));
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let signature = compute_line_signature("other-secret", BODY).unwrap();
        assert!(!verify_line_signature(SECRET, BODY, Some(&signature)));
    }

    #[test]
    fn test_single_byte_mutation_rejected() {
        let signature = compute_line_signature(SECRET, BODY).unwrap();
        for i in 0..BODY.len() {
            let mut mutated = BODY.to_vec();
            mutated[i] ^= 0x01;
            assert!(
                !verify_line_signature(SECRET, &mutated, Some(&signature)),
                "mutation at byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn test_reserialized_body_rejected() {
        let signature = compute_line_signature(SECRET, BODY).unwrap();
        let reserialized = br#"{ "destination": "Uxxx", "events": [] }"#;
        assert!(!verify_line_signature(SECRET, reserialized, Some(&signature)));
    }

    #[test]
    fn test_compute_signature_known_vector() {
        // RFC 4231 test case 2
        let signature = compute_line_signature("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(signature, "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM=");
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
