//! Lockbox - Password-based file encryption using scrypt and AES-128-CBC

#![forbid(unsafe_code)]

pub mod armor;
pub mod cipher;
pub mod container;
pub mod digest;
pub mod error;
pub mod file_ops;
pub mod kdf;
pub mod password;
