//! Text armoring for the encrypted payload
//!
//! The IV-plus-ciphertext body of a container is stored base64-encoded
//! (standard alphabet, with `=` padding) rather than raw. The armored
//! segment carries no prefix or length field; the container layer recovers
//! its extent by subtracting the fixed framing from the total length.

use crate::error::{ErrorCategory, ErrorKind, LockboxError, Result};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Wrap bytes in armor, returning the armored bytes
pub fn wrap(body: &[u8]) -> Vec<u8> {
    STANDARD.encode(body).into_bytes()
}

/// Unwrap an armored segment, returning the original bytes
pub fn unwrap(armored: &[u8]) -> Result<Vec<u8>> {
    STANDARD.decode(armored).map_err(|e| {
        LockboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::MalformedPayload,
            format!("base64 decoding of encrypted payload failed: {}", e),
            e,
        )
    })
}
