//! Encryption/decryption using scrypt + AES-128-CBC
//!
//! This module implements password-based encryption using:
//! - scrypt for key derivation from password (see [`crate::kdf`])
//! - AES-128 in cipher-block-chaining mode with always-added padding
//!
//! The encrypted payload is:
//! - base64(IV (16 bytes) || ciphertext (multiple of 16 bytes))
//!
//! CBC provides confidentiality only. There is no authentication tag; a
//! wrong key or tampered ciphertext is detected (unreliably) by the
//! padding check after decryption.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128Dec, Aes128Enc, Block};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::armor;
use crate::error::{ErrorCategory, ErrorKind, LockboxError, Result};
use crate::kdf::{self, KEY_LEN, SALT_LEN};

/// AES block length in bytes
pub const BLOCK_LEN: usize = 16;

/// Length of the initialization vector in bytes (one cipher block)
pub const IV_LEN: usize = BLOCK_LEN;

/// Encrypt plaintext with a password using a random salt and IV
///
/// Returns the armored payload (base64 of IV || ciphertext) together with
/// the salt that was used for key derivation, so the caller can persist
/// the salt alongside the payload.
pub fn encrypt(plaintext: &[u8], password: &[u8]) -> Result<(Vec<u8>, [u8; SALT_LEN])> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let payload = encrypt_deterministic(plaintext, password, &salt, &iv)?;
    Ok((payload, salt))
}

/// Encrypt plaintext with a password using provided salt and IV
///
/// This function is ONLY for testing purposes to generate deterministic
/// output. NEVER use this in production - always use `encrypt()` which
/// generates a random salt and IV.
pub fn encrypt_deterministic(
    plaintext: &[u8],
    password: &[u8],
    salt: &[u8; SALT_LEN],
    iv: &[u8; IV_LEN],
) -> Result<Vec<u8>> {
    let key = kdf::derive_key(password, salt)?;
    let padded = pad(plaintext);
    let ciphertext = cbc_encrypt(&key, iv, &padded);

    let mut body = Vec::with_capacity(IV_LEN + ciphertext.len());
    body.extend_from_slice(iv);
    body.extend_from_slice(&ciphertext);

    Ok(armor::wrap(&body))
}

/// Decrypt an armored payload with a password and the salt recovered from
/// the container
///
/// The salt must be the exact salt used at encryption time; it is supplied
/// by the caller, never regenerated.
pub fn decrypt(payload: &[u8], password: &[u8], salt: &[u8; SALT_LEN]) -> Result<Vec<u8>> {
    let body = armor::unwrap(payload)?;

    if body.len() < IV_LEN {
        return Err(LockboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedPayload,
            "decoded payload shorter than the IV; likely truncated",
        ));
    }
    let (iv_bytes, ciphertext) = body.split_at(IV_LEN);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(iv_bytes);

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(LockboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedPayload,
            "ciphertext is not a whole number of cipher blocks",
        ));
    }

    let key = kdf::derive_key(password, salt)?;
    let decrypted = cbc_decrypt(&key, &iv, ciphertext);
    unpad(decrypted)
}

/// Pad plaintext to a whole number of blocks
///
/// Padding is always added, even to block-aligned input, so the unpad step
/// is unambiguous: pad_len is in [1, BLOCK_LEN] and every padding byte
/// equals pad_len.
fn pad(plaintext: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_LEN - plaintext.len() % BLOCK_LEN;
    let mut padded = Vec::with_capacity(plaintext.len() + pad_len);
    padded.extend_from_slice(plaintext);
    padded.resize(plaintext.len() + pad_len, pad_len as u8);
    padded
}

/// Strip and validate padding from a decrypted buffer
///
/// Every trailing padding byte must equal the claimed padding length, and
/// the length must lie in [1, BLOCK_LEN]. A violation means the key was
/// wrong or the ciphertext was tampered with; it is reported rather than
/// silently returning a garbage slice.
fn unpad(mut decrypted: Vec<u8>) -> Result<Vec<u8>> {
    let pad_len = match decrypted.last() {
        Some(&last) => last as usize,
        None => {
            return Err(LockboxError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CorruptedPlaintext,
                "decrypted buffer is empty",
            ));
        }
    };

    if pad_len == 0 || pad_len > BLOCK_LEN || pad_len > decrypted.len() {
        return Err(LockboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::CorruptedPlaintext,
            "padding length out of range; wrong key or corrupted data",
        ));
    }

    let body_len = decrypted.len() - pad_len;
    if decrypted[body_len..].iter().any(|&b| b as usize != pad_len) {
        return Err(LockboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::CorruptedPlaintext,
            "inconsistent padding bytes; wrong key or corrupted data",
        ));
    }

    decrypted.truncate(body_len);
    Ok(decrypted)
}

/// CBC-encrypt a padded buffer
fn cbc_encrypt(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], padded: &[u8]) -> Vec<u8> {
    debug_assert!(padded.len() % BLOCK_LEN == 0);

    let cipher = Aes128Enc::new(key.into());
    let mut output = Vec::with_capacity(padded.len());
    let mut prev = *iv;

    for chunk in padded.chunks_exact(BLOCK_LEN) {
        let mut block = [0u8; BLOCK_LEN];
        for (i, b) in block.iter_mut().enumerate() {
            *b = chunk[i] ^ prev[i];
        }

        let mut aes_block = Block::from(block);
        cipher.encrypt_block(&mut aes_block);

        prev = aes_block.into();
        output.extend_from_slice(&prev);
    }

    output
}

/// CBC-decrypt a whole number of ciphertext blocks
fn cbc_decrypt(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Vec<u8> {
    debug_assert!(ciphertext.len() % BLOCK_LEN == 0);

    let cipher = Aes128Dec::new(key.into());
    let mut output = Vec::with_capacity(ciphertext.len());
    let mut prev = *iv;

    for chunk in ciphertext.chunks_exact(BLOCK_LEN) {
        let mut current = [0u8; BLOCK_LEN];
        current.copy_from_slice(chunk);

        let mut aes_block = Block::from(current);
        cipher.decrypt_block(&mut aes_block);

        let mut plain: [u8; BLOCK_LEN] = aes_block.into();
        for (i, b) in plain.iter_mut().enumerate() {
            *b ^= prev[i];
        }

        prev = current;
        output.extend_from_slice(&plain);
    }

    output
}
