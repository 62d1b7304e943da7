//! Password verification digest
//!
//! A SHA-512 digest of the password mixed with a fixed application-wide
//! salt. The digest is stored in cleartext at the front of every container
//! so a decryptor can reject an obviously wrong password before paying for
//! key derivation. It is a pre-check only, not an authentication tag: an
//! attacker who can read the container sees the digest and can brute-force
//! against it offline.

use sha2::{Digest, Sha512};

/// Length of the verification digest in bytes (SHA-512)
pub const DIGEST_LEN: usize = 64;

/// Fixed application-wide salt mixed into the verification digest.
///
/// A namespacing constant, not a secret. Independent of the per-file KDF
/// salt in [`crate::kdf`]; the two are never interchangeable. Part of the
/// container format: changing it invalidates the stored digest of every
/// existing container.
pub const VERIFY_SALT: &[u8] = b"somesalt";

/// Compute the verification digest for a password
pub fn verify_digest(password: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha512::new();
    hasher.update(password);
    hasher.update(VERIFY_SALT);
    hasher.finalize().into()
}
