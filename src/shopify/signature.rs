//! Webhook signature verification
//!
//! The platform signs the exact raw request body with HMAC-SHA256 and sends
//! the digest base64-encoded. Verification therefore runs before any JSON
//! parsing; a re-serialized body does not round-trip byte-for-byte.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Check `header` against the HMAC-SHA256 of `body` under `secret`.
///
/// Returns false on a missing or undecodable header and on digest mismatch;
/// never errors. The comparison is constant-time via `Mac::verify_slice`.
pub fn verify(body: &[u8], header: Option<&str>, secret: &str) -> bool {
    let Some(header) = header else {
        return false;
    };
    let Ok(expected) = BASE64.decode(header) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Base64 signature for `body`, as the platform would send it.
#[cfg(test)]
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key size");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "shared-webhook-secret";

    #[test]
    fn signed_body_verifies() {
        let body = br#"{"id":632910392,"title":"IPod Nano"}"#;
        let header = sign(body, SECRET);
        assert!(verify(body, Some(&header), SECRET));
    }

    #[test]
    fn any_body_mutation_fails() {
        let body = br#"{"id":632910392,"title":"IPod Nano"}"#.to_vec();
        let header = sign(&body, SECRET);

        let mut tampered = body.clone();
        tampered[10] ^= 0x01;
        assert!(!verify(&tampered, Some(&header), SECRET));
    }

    #[test]
    fn formatting_differences_fail() {
        // Same JSON value, different bytes: the signature covers raw bytes.
        let signed = br#"{"id":1,"title":"A"}"#;
        let reserialized = br#"{ "id": 1, "title": "A" }"#;
        let header = sign(signed, SECRET);
        assert!(!verify(reserialized, Some(&header), SECRET));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"payload";
        let header = sign(body, SECRET);
        assert!(!verify(body, Some(&header), "some-other-secret"));
    }

    #[test]
    fn missing_or_garbage_header_fails() {
        let body = b"payload";
        assert!(!verify(body, None, SECRET));
        assert!(!verify(body, Some("not base64 !!!"), SECRET));
        assert!(!verify(body, Some(""), SECRET));
    }
}
