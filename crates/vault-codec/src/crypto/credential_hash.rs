//! One-way credential hashing with PBKDF2-HMAC-SHA512
//!
//! Format: `{salt_hex}:{hash_hex}` with a 16-byte salt and a 64-byte hash.
//! The iteration count is not stored, so it must match between hashing and
//! verification.

use hmac::Hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{CodecError, Result};

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Derived hash length in bytes
pub const HASH_LEN: usize = 64;

/// PBKDF2 credential hasher
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    iterations: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl CredentialHasher {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a credential with a fresh random salt
    pub fn hash(&self, credential: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| CodecError::HashingFailed(format!("random source unavailable: {}", e)))?;
        self.hash_with_salt(credential, &salt)
    }

    pub(crate) fn hash_with_salt(&self, credential: &str, salt: &[u8; SALT_LEN]) -> Result<String> {
        let hash = self.derive(credential.as_bytes(), salt)?;
        Ok(format!("{}:{}", hex::encode(salt), hex::encode(&hash[..])))
    }

    /// Check a candidate against a stored `salt_hex:hash_hex` string.
    ///
    /// Malformed stored values verify as `false`.
    pub fn verify(&self, candidate: &str, hashed: &str) -> bool {
        let Some((salt_hex, hash_hex)) = hashed.split_once(':') else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
            return false;
        };
        if salt.is_empty() {
            return false;
        }

        match self.derive(candidate.as_bytes(), &salt) {
            Ok(computed) => computed.as_slice().ct_eq(&expected).into(),
            Err(_) => false,
        }
    }

    fn derive(&self, credential: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; HASH_LEN]>> {
        let mut out = Zeroizing::new([0u8; HASH_LEN]);
        pbkdf2::pbkdf2::<Hmac<Sha512>>(credential, salt, self.iterations, &mut out[..])
            .map_err(|e| CodecError::HashingFailed(e.to_string()))?;
        Ok(out)
    }
}
