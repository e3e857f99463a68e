//! Cryptographic primitives for vault secrets
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption (current format)
//! - AES-256-CBC decryption for legacy values
//! - Base64 last-resort representation
//! - PBKDF2-HMAC-SHA512 credential hashing
//! - Key material handling with zeroize

mod credential_hash;
mod encryption;
pub(crate) mod fallback;
mod legacy;
mod secure_memory;

pub use credential_hash::{CredentialHasher, DEFAULT_ITERATIONS, HASH_LEN, SALT_LEN};
pub use encryption::{decrypt, encrypt, EncryptedData, IV_LEN, TAG_LEN, VAULT_AAD};
pub use legacy::{decrypt_legacy, LEGACY_IV_LEN};
pub use secure_memory::{MasterKey, SecretKey, KEY_LEN};

#[cfg(test)]
pub(crate) use legacy::encrypt_legacy;
