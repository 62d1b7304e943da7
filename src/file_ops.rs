//! File encryption/decryption operations
//!
//! This module provides the high-level operations for locking (encrypting)
//! and unlocking (decrypting) files using the lockbox container format.

use crate::container;
use crate::error::{ErrorCategory, ErrorKind, LockboxError, Result};
use crate::password::PasswordReader;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Encrypt a file with a password
///
/// Reads plaintext from `input_path`, encrypts it under a password from
/// `password_reader`, and writes the container to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn lock_file(
    input_path: &Path,
    output_path: &Path,
    password_reader: &mut dyn PasswordReader,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let password = password_reader.read_password()?;
    let sealed = container::seal(&plaintext, &password)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(output_path, &sealed)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    Ok(())
}

/// Decrypt a file with a password
///
/// Reads a container from `input_path`, decrypts it using a password from
/// `password_reader`, and writes the plaintext to `output_path`. The
/// stored verification digest rejects a wrong password before any key
/// derivation or decryption happens, so nothing is written on failure.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn unlock_file(
    input_path: &Path,
    output_path: &Path,
    password_reader: &mut dyn PasswordReader,
) -> Result<()> {
    let sealed = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let password = password_reader.read_password()?;
    let plaintext =
        container::open(&sealed, &password).map_err(|e| e.with_context("failed to decrypt"))?;
    write_file_secure(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                LockboxError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            LockboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            LockboxError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn read_error(path: &Path, err: io::Error) -> LockboxError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    LockboxError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::password::ConstantPasswordReader;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_lock_unlock_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.encr");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        let plaintext = b"Hello, lockbox!";
        fs::write(&plain_path, plaintext).unwrap();

        let mut reader = ConstantPasswordReader::new(b"test password".to_vec());
        lock_file(&plain_path, &crypt_path, &mut reader).unwrap();
        assert!(crypt_path.exists());

        let mut reader = ConstantPasswordReader::new(b"test password".to_vec());
        unlock_file(&crypt_path, &decrypted_path, &mut reader).unwrap();
        let decrypted = fs::read(&decrypted_path).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    #[cfg(unix)]
    fn test_file_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.encr");

        fs::write(&plain_path, b"test").unwrap();

        let mut reader = ConstantPasswordReader::new(b"test".to_vec());
        lock_file(&plain_path, &crypt_path, &mut reader).unwrap();

        let metadata = fs::metadata(&crypt_path).unwrap();
        let permissions = metadata.permissions();
        assert_eq!(permissions.mode() & 0o777, 0o600);
    }

    #[test]
    fn test_unlock_wrong_password() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.encr");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&plain_path, b"secret").unwrap();

        let mut reader = ConstantPasswordReader::new(b"correct".to_vec());
        lock_file(&plain_path, &crypt_path, &mut reader).unwrap();

        let mut reader = ConstantPasswordReader::new(b"wrong".to_vec());
        let result = unlock_file(&crypt_path, &decrypted_path, &mut reader);

        let err = result.expect_err("expected wrong password error");
        assert_eq!(err.kind, Some(ErrorKind::WrongPassword));

        // No partial output on failure.
        assert!(!decrypted_path.exists());
    }

    #[test]
    fn test_unlock_non_container_input() {
        let temp_dir = TempDir::new().unwrap();
        let bogus_path = temp_dir.path().join("bogus.encr");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&bogus_path, b"way too short").unwrap();

        let mut reader = ConstantPasswordReader::new(b"test".to_vec());
        let err = unlock_file(&bogus_path, &decrypted_path, &mut reader)
            .expect_err("expected malformed container error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedContainer));
    }

    #[test]
    fn test_lock_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("no-such-file");
        let crypt_path = temp_dir.path().join("out.encr");

        let mut reader = ConstantPasswordReader::new(b"test".to_vec());
        let err =
            lock_file(&missing, &crypt_path, &mut reader).expect_err("expected read failure");
        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("empty.txt");
        let crypt_path = temp_dir.path().join("empty.txt.encr");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&plain_path, b"").unwrap();

        let mut reader = ConstantPasswordReader::new(b"test".to_vec());
        lock_file(&plain_path, &crypt_path, &mut reader).unwrap();

        let mut reader = ConstantPasswordReader::new(b"test".to_vec());
        unlock_file(&crypt_path, &decrypted_path, &mut reader).unwrap();

        let decrypted = fs::read(&decrypted_path).unwrap();
        assert_eq!(decrypted, b"");
    }
}
