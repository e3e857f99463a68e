//! Key material with automatic zeroization

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the AES-256 key in bytes
pub const KEY_LEN: usize = 32;

/// Configured secret key string - zeroed when dropped, redacted in Debug
#[derive(Clone, Zeroize, ZeroizeOnDrop, Deserialize)]
#[serde(transparent)]
pub struct SecretKey {
    value: String,
}

impl SecretKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the key string (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Cipher key derived from a [`SecretKey`] - zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; KEY_LEN],
}

impl MasterKey {
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Get the key bytes (use carefully - avoid copying)
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// Create from a slice (must be exactly 32 bytes)
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let key: [u8; KEY_LEN] = slice.try_into().ok()?;
        Some(Self { key })
    }

    /// Take the first 32 bytes of the UTF-8 key string.
    ///
    /// Returns `None` for shorter keys; there is no padding or stretching.
    pub fn from_secret_key(secret: &SecretKey) -> Option<Self> {
        secret
            .expose()
            .as_bytes()
            .get(..KEY_LEN)
            .and_then(Self::from_slice)
    }
}

impl Clone for MasterKey {
    fn clone(&self) -> Self {
        Self { key: self.key }
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_key_truncates_long_secret() {
        let secret = SecretKey::new("0123456789abcdef0123456789abcdefEXTRA");
        let key = MasterKey::from_secret_key(&secret).unwrap();
        assert_eq!(key.as_bytes(), b"0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn test_master_key_exact_length() {
        let secret = SecretKey::new("0123456789abcdef0123456789abcdef");
        assert!(MasterKey::from_secret_key(&secret).is_some());
    }

    #[test]
    fn test_master_key_rejects_short_secret() {
        let secret = SecretKey::new("too-short");
        assert!(MasterKey::from_secret_key(&secret).is_none());
    }

    #[test]
    fn test_master_key_from_invalid_slice() {
        let bytes = [42u8; 16];
        assert!(MasterKey::from_slice(&bytes).is_none());
    }

    #[test]
    fn test_debug_redacted() {
        let key = MasterKey::new([7u8; KEY_LEN]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains('7'));

        let secret = SecretKey::new("hunter2-hunter2-hunter2-hunter2!");
        assert!(!format!("{:?}", secret).contains("hunter2"));
    }
}
