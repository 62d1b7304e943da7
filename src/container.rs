//! The on-disk container format
//!
//! A container bundles everything a later decryptor needs into one
//! artifact. The binary layout is:
//!
//! - verification digest: 64 raw bytes (SHA-512 of password || fixed salt)
//! - encrypted payload: variable length, base64(IV || ciphertext)
//! - salt: 16 raw bytes (per-file KDF salt)
//!
//! There is no version tag, magic number, or length prefix; the payload
//! extent is recovered by subtracting the fixed 64-byte and 16-byte
//! framing from the total length. Any format change is a breaking change.

use crate::cipher;
use crate::digest::{self, DIGEST_LEN};
use crate::error::{ErrorCategory, ErrorKind, LockboxError, Result};
use crate::kdf::SALT_LEN;

/// Minimum size of a container: the fixed framing with an empty payload
pub const MIN_CONTAINER_LEN: usize = DIGEST_LEN + SALT_LEN;

/// The three segments of a disassembled container
pub struct ContainerParts<'a> {
    /// Stored verification digest (first 64 bytes)
    pub digest: &'a [u8],
    /// Armored IV-plus-ciphertext segment (everything in between)
    pub payload: &'a [u8],
    /// Per-file KDF salt (last 16 bytes)
    pub salt: [u8; SALT_LEN],
}

/// Encrypt plaintext under a password into a complete container
pub fn seal(plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    let (payload, salt) = cipher::encrypt(plaintext, password)?;
    Ok(assemble(&digest::verify_digest(password), &payload, &salt))
}

/// Encrypt plaintext into a container using provided salt and IV
///
/// This function is ONLY for testing purposes to generate deterministic
/// output. NEVER use this in production - always use `seal()` which
/// generates a random salt and IV.
pub fn seal_deterministic(
    plaintext: &[u8],
    password: &[u8],
    salt: &[u8; SALT_LEN],
    iv: &[u8; cipher::IV_LEN],
) -> Result<Vec<u8>> {
    let payload = cipher::encrypt_deterministic(plaintext, password, salt, iv)?;
    Ok(assemble(&digest::verify_digest(password), &payload, salt))
}

/// Decrypt a container with a password, returning the plaintext
///
/// The stored verification digest is compared against a digest recomputed
/// from the supplied password *before* key derivation, so an obviously
/// wrong password fails fast with `WrongPassword` instead of surfacing as
/// a padding failure deep in decryption.
pub fn open(container: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    let parts = split(container)?;

    if parts.digest != digest::verify_digest(password) {
        return Err(LockboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::WrongPassword,
            "wrong password or not an encrypted file",
        ));
    }

    cipher::decrypt(parts.payload, password, &parts.salt)
}

/// Assemble the three segments into container bytes
fn assemble(digest: &[u8; DIGEST_LEN], payload: &[u8], salt: &[u8; SALT_LEN]) -> Vec<u8> {
    let mut container = Vec::with_capacity(DIGEST_LEN + payload.len() + SALT_LEN);
    container.extend_from_slice(digest);
    container.extend_from_slice(payload);
    container.extend_from_slice(salt);
    container
}

/// Disassemble container bytes into their three segments
pub fn split(container: &[u8]) -> Result<ContainerParts<'_>> {
    if container.len() < MIN_CONTAINER_LEN {
        return Err(LockboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedContainer,
            "input shorter than the minimum container framing; likely truncated or not a container",
        ));
    }

    let (digest, rest) = container.split_at(DIGEST_LEN);
    let (payload, salt_bytes) = rest.split_at(rest.len() - SALT_LEN);

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(salt_bytes);

    Ok(ContainerParts {
        digest,
        payload,
        salt,
    })
}
