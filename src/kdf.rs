//! Key derivation from password and salt
//!
//! Turns a password plus a 16-byte salt into a 16-byte AES-128 key using
//! scrypt. The cost parameters are a fixed protocol constant: changing them
//! changes the on-disk format and breaks compatibility with previously
//! produced containers.

use crate::error::{ErrorCategory, ErrorKind, LockboxError, Result};
use scrypt::{Params, scrypt};

/// Length of the per-file salt in bytes
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (AES-128)
pub const KEY_LEN: usize = 16;

/// scrypt log2(N) parameter (CPU/memory cost, N = 2^14)
const SCRYPT_LOG_N: u8 = 14;

/// scrypt r parameter (block size)
const SCRYPT_R: u32 = 16;

/// scrypt p parameter (parallelization)
const SCRYPT_P: u32 = 1;

/// Derive a 16-byte key from a password and salt using scrypt
///
/// Deterministic: identical (password, salt) pairs always yield an
/// identical key.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> Result<[u8; KEY_LEN]> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN).map_err(|e| {
        LockboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::KdfFailure,
            "failed to create scrypt params",
            e,
        )
    })?;

    let mut key = [0u8; KEY_LEN];
    scrypt(password, salt, &params, &mut key).map_err(|e| {
        LockboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::KdfFailure,
            "scrypt key derivation failed",
            e,
        )
    })?;

    Ok(key)
}
