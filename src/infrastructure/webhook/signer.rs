//! HMAC-SHA256 signatures for outbound webhook bodies.
//!
//! The signature covers the exact bytes placed on the wire, hex-encoded in
//! lowercase. Receivers recompute it over the raw request body.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex signature of the request body.
pub const SIGNATURE_HEADER: &str = "X-Reel-Signature";

#[derive(Clone)]
pub struct Signer {
    secret: String,
}

impl Signer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// True when no secret was configured; receivers cannot verify anything
    /// signed with an empty key.
    pub fn is_unkeyed(&self) -> bool {
        self.secret.is_empty()
    }

    pub fn sign(&self, message: &[u8]) -> String {
        sign(&self.secret, message)
    }

    pub fn verify(&self, message: &[u8], signature: &str) -> bool {
        verify(&self.secret, message, signature)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("secret", &if self.is_unkeyed() { "<empty>" } else { "<redacted>" })
            .finish()
    }
}

fn mac_for(secret: &str) -> HmacSha256 {
    // HMAC is defined for keys of any length, including zero.
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length")
}

/// Compute the lowercase hex HMAC-SHA256 of `message` under `secret`.
pub fn sign(secret: &str, message: &[u8]) -> String {
    let mut mac = mac_for(secret);
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a hex signature. Malformed hex never verifies.
pub fn verify(secret: &str, message: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };

    let mut mac = mac_for(secret);
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}
