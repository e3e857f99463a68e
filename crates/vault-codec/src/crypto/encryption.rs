//! AES-256-GCM authenticated encryption (V2 wire format)
//!
//! Encryption format: `{iv_hex}:{auth_tag_hex}:{ciphertext_hex}`
//! - IV: 16 bytes, fresh per call
//! - Auth tag: 16 bytes, bound to the `vault-v1` AAD label
//! - Ciphertext: same length as the plaintext

use aes_gcm::{
    aead::{consts::U16, Aead, KeyInit, Payload},
    aes::Aes256,
    AesGcm, Nonce,
};
use rand::{rngs::OsRng, RngCore};

use super::MasterKey;
use crate::error::{CodecError, Result};
use crate::outcome::FailureReason;

/// IV length in bytes
pub const IV_LEN: usize = 16;

/// Auth tag length in bytes
pub const TAG_LEN: usize = 16;

/// Additional authenticated data bound into every tag
pub const VAULT_AAD: &[u8] = b"vault-v1";

/// AES-256-GCM with a 128-bit nonce
type VaultCipher = AesGcm<Aes256, U16>;

/// Encrypted data with IV and auth tag
#[derive(Debug, Clone)]
pub struct EncryptedData {
    pub iv: [u8; IV_LEN],
    pub auth_tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl std::fmt::Display for EncryptedData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            hex::encode(self.iv),
            hex::encode(self.auth_tag),
            hex::encode(&self.ciphertext)
        )
    }
}

impl EncryptedData {
    /// Decode the three hex fields of a V2 value
    pub fn from_parts(
        iv_hex: &str,
        auth_tag_hex: &str,
        ciphertext_hex: &str,
    ) -> std::result::Result<Self, FailureReason> {
        let iv = decode_fixed::<IV_LEN>("iv", iv_hex)?;
        let auth_tag = decode_fixed::<TAG_LEN>("auth_tag", auth_tag_hex)?;
        let ciphertext =
            hex::decode(ciphertext_hex).map_err(|_| FailureReason::MalformedHex("ciphertext"))?;

        Ok(Self {
            iv,
            auth_tag,
            ciphertext,
        })
    }
}

pub(crate) fn decode_fixed<const N: usize>(
    field: &'static str,
    value: &str,
) -> std::result::Result<[u8; N], FailureReason> {
    let bytes = hex::decode(value).map_err(|_| FailureReason::MalformedHex(field))?;
    let got = bytes.len();
    bytes.try_into().map_err(|_| FailureReason::BadLength {
        field,
        expected: N,
        got,
    })
}

/// Encrypt plaintext using AES-256-GCM with a fresh random IV
pub fn encrypt(plaintext: &[u8], key: &MasterKey) -> Result<EncryptedData> {
    let cipher = VaultCipher::new_from_slice(key.as_bytes())
        .map_err(|e| CodecError::EncodingFailed(e.to_string()))?;

    let mut iv = [0u8; IV_LEN];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|e| CodecError::EncodingFailed(format!("random source unavailable: {}", e)))?;
    let nonce = Nonce::<U16>::from_slice(&iv);

    // aes-gcm appends the auth tag to the ciphertext
    let ciphertext_with_tag = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: VAULT_AAD,
            },
        )
        .map_err(|e| CodecError::EncodingFailed(e.to_string()))?;

    if ciphertext_with_tag.len() < TAG_LEN {
        return Err(CodecError::EncodingFailed(
            "Ciphertext too short".to_string(),
        ));
    }

    let tag_start = ciphertext_with_tag.len() - TAG_LEN;
    let ciphertext = ciphertext_with_tag[..tag_start].to_vec();
    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(&ciphertext_with_tag[tag_start..]);

    Ok(EncryptedData {
        iv,
        auth_tag,
        ciphertext,
    })
}

/// Decrypt and verify a V2 value
pub fn decrypt(
    encrypted: &EncryptedData,
    key: &MasterKey,
) -> std::result::Result<Vec<u8>, FailureReason> {
    let cipher =
        VaultCipher::new_from_slice(key.as_bytes()).map_err(|_| FailureReason::NoCipherKey)?;

    let nonce = Nonce::<U16>::from_slice(&encrypted.iv);

    let mut ciphertext_with_tag = encrypted.ciphertext.clone();
    ciphertext_with_tag.extend_from_slice(&encrypted.auth_tag);

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: &ciphertext_with_tag,
                aad: VAULT_AAD,
            },
        )
        .map_err(|_| FailureReason::IntegrityCheckFailed)
}
